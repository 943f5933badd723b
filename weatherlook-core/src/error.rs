use std::fmt;

/// Category of a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Search text was empty after trimming; no request was sent.
    InvalidInput,
    /// The provider could not resolve the place.
    NotFound,
    /// The provider was reachable but answered with a failure.
    ProviderError,
    /// The request never reached the provider, or the response never came back.
    Network,
    /// Anything else, e.g. an unparseable body.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NotFound => "not found",
            ErrorKind::ProviderError => "provider error",
            ErrorKind::Network => "network error",
            ErrorKind::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed lookup failure.
///
/// Cheap to clone so it can be stored in [`crate::LookupState`] and handed to
/// every snapshot subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LookupError {
    kind: ErrorKind,
    message: String,
}

impl LookupError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput, "Please enter a city or town")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProviderError, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Provider or client message, without the kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::InvalidInput => self.message.clone(),
            ErrorKind::NotFound | ErrorKind::ProviderError => format!("Error: {}", self.message),
            ErrorKind::Network => "Network error, please try again later.".to_string(),
            ErrorKind::Unknown => "Error fetching data".to_string(),
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key as a query parameter.
        let err = err.without_url();
        if err.is_timeout() {
            LookupError::network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            LookupError::unknown(err.to_string())
        } else {
            LookupError::network(err.to_string())
        }
    }
}

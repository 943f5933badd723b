//! Single-shot "where am I" capability of the host.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::Coordinates;

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission denied: {0}")]
    Denied(String),
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Ask once for the current position. No tracking.
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Reports a position known up front (config file or command line).
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// A host without any location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocator;

#[async_trait]
impl Geolocator for NoGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Approximate position from the public IP address, via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new() -> Result<Self, GeolocationError> {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, GeolocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeolocationError::Other(e.to_string()))?;

        Ok(Self { url: url.into(), http })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let response = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                tracing::debug!("IP geolocation request failed: {}", e);
                GeolocationError::Unavailable
            }
        })?;

        if !response.status().is_success() {
            return Err(GeolocationError::Other(format!(
                "IP geolocation returned status {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| GeolocationError::Other(e.to_string()))?;

        if body.status != "success" {
            return Err(GeolocationError::Denied(
                body.message.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(GeolocationError::Other("response carried no coordinates".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_geolocator_returns_its_position() {
        let geo = FixedGeolocator(Coordinates::new(40.7, -74.0));
        assert_eq!(geo.current_position().await, Ok(Coordinates::new(40.7, -74.0)));
    }

    #[tokio::test]
    async fn no_geolocator_is_unavailable() {
        assert_eq!(NoGeolocator.current_position().await, Err(GeolocationError::Unavailable));
    }

    #[test]
    fn error_display() {
        assert!(GeolocationError::Denied("private range".into()).to_string().contains("denied"));
        assert!(GeolocationError::Timeout.to_string().contains("timed out"));
    }
}

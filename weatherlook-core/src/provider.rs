use crate::{Config, LocationQuery, LookupError, WeatherClient, WeatherObservation};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod weatherapi;
pub mod weatherstack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherStack,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherStack => "weatherstack",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherStack, ProviderId::WeatherApi]
    }

    /// Environment variable that may carry this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::WeatherStack => "WEATHERSTACK_API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_API_KEY",
        }
    }

    /// Built-in request and field-mapping table for this provider.
    pub fn profile(&self) -> ProviderProfile {
        match self {
            ProviderId::WeatherStack => weatherstack::profile(),
            ProviderId::WeatherApi => weatherapi::profile(),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherstack" => Ok(ProviderId::WeatherStack),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherstack, weatherapi."
            )),
        }
    }
}

/// JSON pointers locating each observation field in a provider payload.
///
/// Every field lists candidate pointers; the first one present wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    /// Object whose presence means the place was resolved.
    pub location: &'static str,
    pub place_name: &'static [&'static str],
    pub region: &'static [&'static str],
    pub country: &'static [&'static str],
    pub temperature_f: &'static [&'static str],
    pub condition: &'static [&'static str],
    pub humidity_pct: &'static [&'static str],
    pub wind_mph: &'static [&'static str],
    pub feels_like_f: &'static [&'static str],
}

/// Where a provider puts its structured error payload.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMap {
    pub object: &'static str,
    pub message: &'static [&'static str],
    pub code: &'static str,
    /// Provider error codes meaning "no such place".
    pub not_found_codes: &'static [i64],
}

/// Everything that differs between providers.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub id: ProviderId,
    pub base_url: String,
    pub key_param: &'static str,
    pub query_param: &'static str,
    pub extra_params: &'static [(&'static str, &'static str)],
    pub fields: FieldMap,
    pub errors: ErrorMap,
}

impl ProviderProfile {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, query: &LocationQuery)
    -> Result<WeatherObservation, LookupError>;
}

/// Construct a provider from config and explicit ProviderId.
///
/// A missing API key is not an error here; the first lookup reports it.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let mut profile = id.profile();
    if let Some(base_url) = config.provider_base_url(id) {
        profile = profile.with_base_url(base_url);
    }

    let api_key = config.provider_api_key(id).map(str::to_owned);
    if api_key.is_none() {
        tracing::warn!(provider = %id, "no API key configured");
    }

    let client = WeatherClient::new(profile, api_key, Duration::from_secs(config.timeout_secs()))?;
    Ok(Arc::new(client))
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_parse_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("WeatherStack").unwrap(), ProviderId::WeatherStack);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn profiles_match_their_ids() {
        for id in ProviderId::all() {
            assert_eq!(id.profile().id, *id);
        }
    }

    #[test]
    fn provider_from_config_tolerates_missing_api_key() {
        let cfg = Config::default();
        assert!(provider_from_config(ProviderId::WeatherStack, &cfg).is_ok());
    }

    #[test]
    fn default_provider_from_config_falls_back_to_weatherstack() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::WeatherStack);
        assert!(default_provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn default_provider_from_config_rejects_unknown_name() {
        let cfg = Config { default_provider: Some("nope".into()), ..Config::default() };
        let err = default_provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }
}

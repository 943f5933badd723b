//! The single HTTP client behind every provider.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    LocationQuery, LookupError, WeatherObservation,
    provider::{ErrorMap, FieldMap, ProviderProfile, WeatherProvider},
};

#[derive(Debug, Clone)]
pub struct WeatherClient {
    profile: ProviderProfile,
    api_key: Option<String>,
    http: Client,
}

impl WeatherClient {
    pub fn new(
        profile: ProviderProfile,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { profile, api_key, http })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch_weather(
        &self,
        query: &LocationQuery,
    ) -> Result<WeatherObservation, LookupError> {
        let id = self.profile.id;
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LookupError::provider(format!("No API key configured for provider '{id}'"))
        })?;

        let value = query.to_query_value();
        let mut params = vec![
            (self.profile.key_param, api_key),
            (self.profile.query_param, value.as_str()),
        ];
        params.extend(self.profile.extra_params.iter().map(|&(k, v)| (k, v)));

        tracing::debug!(provider = %id, url = %self.profile.base_url, query = %value, "sending lookup");

        let res = self
            .http
            .get(&self.profile.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|err| {
                let err = LookupError::from(err);
                tracing::warn!(provider = %id, "request failed: {err}");
                err
            })?;

        let status = res.status();
        let body = res.text().await.map_err(LookupError::from)?;

        let result = parse_response(&self.profile, status, &body);
        match &result {
            Ok(obs) => tracing::info!(provider = %id, place = %obs.place_name, "lookup succeeded"),
            Err(err) => tracing::warn!(provider = %id, %status, "lookup failed: {err}"),
        }
        result
    }
}

/// Classify a provider response and normalize a successful one.
pub fn parse_response(
    profile: &ProviderProfile,
    status: StatusCode,
    body: &str,
) -> Result<WeatherObservation, LookupError> {
    let parsed = serde_json::from_str::<Value>(body);

    if let Ok(json) = &parsed {
        if let Some(err) = provider_error(&profile.errors, status, json) {
            return Err(err);
        }
    }

    if !status.is_success() {
        let message = format!(
            "{} request failed with status {}: {}",
            profile.id,
            status,
            truncate_body(body),
        );
        return Err(if status == StatusCode::NOT_FOUND {
            LookupError::not_found(message)
        } else {
            LookupError::provider(message)
        });
    }

    let json = parsed.map_err(|err| {
        LookupError::unknown(format!("Failed to parse {} response JSON: {err}", profile.id))
    })?;

    normalize(&profile.fields, &json)
}

fn provider_error(errors: &ErrorMap, status: StatusCode, json: &Value) -> Option<LookupError> {
    if !json.pointer(errors.object).is_some_and(Value::is_object) {
        return None;
    }

    let message = first_str(json, errors.message)
        .unwrap_or_else(|| "The weather provider returned an error".to_string());
    let code = json.pointer(errors.code).and_then(Value::as_i64);

    let not_found = status == StatusCode::NOT_FOUND
        || code.is_some_and(|c| errors.not_found_codes.contains(&c));

    Some(if not_found {
        LookupError::not_found(message)
    } else {
        LookupError::provider(message)
    })
}

fn normalize(fields: &FieldMap, json: &Value) -> Result<WeatherObservation, LookupError> {
    let not_available = || LookupError::not_found("Location data not available");

    if !json.pointer(fields.location).is_some_and(Value::is_object) {
        return Err(not_available());
    }
    let place_name = first_str(json, fields.place_name).ok_or_else(not_available)?;

    Ok(WeatherObservation {
        place_name,
        region: first_str(json, fields.region).unwrap_or_default(),
        country: first_str(json, fields.country).unwrap_or_default(),
        temperature_f: first_f64(json, fields.temperature_f),
        condition: first_str(json, fields.condition),
        humidity_pct: first_f64(json, fields.humidity_pct)
            .filter(|h| (0.0..=100.0).contains(h))
            .map(|h| h.round() as u8),
        wind_mph: first_f64(json, fields.wind_mph),
        feels_like_f: first_f64(json, fields.feels_like_f),
    })
}

fn first_str(json: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| json.pointer(p).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_f64(json: &Value, pointers: &[&str]) -> Option<f64> {
    pointers.iter().find_map(|p| json.pointer(p).and_then(Value::as_f64))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

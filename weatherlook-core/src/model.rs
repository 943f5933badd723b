use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// A position on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What a single lookup asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    /// Always trimmed and non-empty; build it with [`LocationQuery::place_name`].
    PlaceName(String),
}

impl LocationQuery {
    /// Build a place-name query from raw user input.
    pub fn place_name(text: &str) -> Result<Self, LookupError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LookupError::invalid_input());
        }
        Ok(LocationQuery::PlaceName(trimmed.to_string()))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        LocationQuery::Coordinates(Coordinates::new(latitude, longitude))
    }

    /// Value sent as the provider's query parameter. Not percent-encoded.
    pub fn to_query_value(&self) -> String {
        match self {
            LocationQuery::Coordinates(c) => format!("{},{}", c.latitude, c.longitude),
            LocationQuery::PlaceName(text) => text.clone(),
        }
    }
}

/// Normalized current conditions for one place.
///
/// Everything after `country` may be missing from a provider payload and is
/// kept as `None` rather than failing the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub place_name: String,
    pub region: String,
    pub country: String,
    pub temperature_f: Option<f64>,
    pub condition: Option<String>,
    pub humidity_pct: Option<u8>,
    pub wind_mph: Option<f64>,
    pub feels_like_f: Option<f64>,
}

impl WeatherObservation {
    /// Placeholder shown before any real lookup has finished.
    pub fn demo() -> Self {
        Self {
            place_name: "New York".to_string(),
            region: "New York".to_string(),
            country: "United States of America".to_string(),
            temperature_f: Some(68.0),
            condition: Some("Sunny".to_string()),
            humidity_pct: Some(45),
            wind_mph: Some(7.0),
            feels_like_f: Some(68.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn place_name_is_trimmed() {
        let q = LocationQuery::place_name("  London \n").expect("non-empty input");
        assert_eq!(q, LocationQuery::PlaceName("London".to_string()));
        assert_eq!(q.to_query_value(), "London");
    }

    #[test]
    fn blank_place_name_is_invalid_input() {
        for input in ["", "   ", "\t\n"] {
            let err = LocationQuery::place_name(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn coordinates_render_as_lat_comma_lon() {
        let q = LocationQuery::coordinates(51.5074, -0.1278);
        assert_eq!(q.to_query_value(), "51.5074,-0.1278");
    }

    #[test]
    fn place_name_keeps_inner_spaces() {
        let q = LocationQuery::place_name(" New York ").expect("non-empty input");
        assert_eq!(q.to_query_value(), "New York");
    }
}

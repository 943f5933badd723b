//! weatherstack.com `current` endpoint.
//!
//! weatherstack answers failures with HTTP 200 and an `{"success": false,
//! "error": {...}}` body, so classification relies on the error object rather
//! than the status code. `units=f` makes temperatures Fahrenheit and wind mph.

use super::{ErrorMap, FieldMap, ProviderId, ProviderProfile};

const BASE_URL: &str = "https://api.weatherstack.com/current";

/// `request_failed`: the query did not resolve to a location.
const REQUEST_FAILED: i64 = 615;

pub(crate) fn profile() -> ProviderProfile {
    ProviderProfile {
        id: ProviderId::WeatherStack,
        base_url: BASE_URL.to_string(),
        key_param: "access_key",
        query_param: "query",
        extra_params: &[("units", "f")],
        fields: FieldMap {
            location: "/location",
            place_name: &["/location/name"],
            region: &["/location/region"],
            country: &["/location/country"],
            temperature_f: &["/current/temperature"],
            condition: &["/current/weather_descriptions/0"],
            humidity_pct: &["/current/humidity"],
            wind_mph: &["/current/wind_speed"],
            feels_like_f: &["/current/feelslike"],
        },
        errors: ErrorMap {
            object: "/error",
            message: &["/error/info", "/error/type"],
            code: "/error/code",
            not_found_codes: &[REQUEST_FAILED],
        },
    }
}

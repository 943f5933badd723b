//! weatherapi.com `current.json` endpoint.
//!
//! Fahrenheit and mph are reported alongside metric values, so no unit
//! parameter is needed.

use super::{ErrorMap, FieldMap, ProviderId, ProviderProfile};

const BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// "No location found matching parameter 'q'".
const NO_MATCHING_LOCATION: i64 = 1006;

pub(crate) fn profile() -> ProviderProfile {
    ProviderProfile {
        id: ProviderId::WeatherApi,
        base_url: BASE_URL.to_string(),
        key_param: "key",
        query_param: "q",
        extra_params: &[],
        fields: FieldMap {
            location: "/location",
            place_name: &["/location/name"],
            region: &["/location/region"],
            country: &["/location/country"],
            temperature_f: &["/current/temp_f"],
            condition: &["/current/condition/text"],
            humidity_pct: &["/current/humidity"],
            wind_mph: &["/current/wind_mph"],
            feels_like_f: &["/current/feelslike_f"],
        },
        errors: ErrorMap {
            object: "/error",
            message: &["/error/message", "/error/info"],
            code: "/error/code",
            not_found_codes: &[NO_MATCHING_LOCATION],
        },
    }
}

use std::fmt::Write;

use chrono::Local;
use weatherlook_core::{LookupSnapshot, LookupState, WeatherObservation};

/// Plain-text view of one snapshot: the shown observation plus a status line.
pub fn render_snapshot(snapshot: &LookupSnapshot) -> String {
    let mut out = match &snapshot.displayed {
        Some(obs) => render_observation(snapshot.place_label.as_deref(), obs),
        None => "No data available\n".to_string(),
    };

    match &snapshot.state {
        LookupState::Idle | LookupState::Success(_) => {}
        LookupState::Loading => out.push_str("Loading...\n"),
        LookupState::Failed(err) => {
            let _ = writeln!(out, "{}", err.user_message());
        }
    }

    let updated = snapshot.updated_at.with_timezone(&Local).format("%H:%M:%S");
    let _ = writeln!(out, "(updated {updated})");
    out
}

pub fn render_observation(label: Option<&str>, obs: &WeatherObservation) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", label.unwrap_or(&obs.place_name));
    let _ = writeln!(out, "{}", location_line(obs));

    let _ = match obs.temperature_f {
        Some(t) => writeln!(out, "{t}°F"),
        None => writeln!(out, "Temperature not available"),
    };
    let _ = writeln!(
        out,
        "{}",
        obs.condition.as_deref().unwrap_or("Weather description not available")
    );
    let _ = match obs.humidity_pct {
        Some(h) => writeln!(out, "Humidity: {h}%"),
        None => writeln!(out, "Humidity data not available"),
    };
    let _ = match obs.wind_mph {
        Some(w) => writeln!(out, "Wind: {w} mph"),
        None => writeln!(out, "Wind data not available"),
    };
    if let Some(f) = obs.feels_like_f {
        let _ = writeln!(out, "Feels like: {f}°F");
    }

    out
}

fn location_line(obs: &WeatherObservation) -> String {
    [obs.region.as_str(), obs.country.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

//! Shared helpers for the roadbook command line tools.

use anyhow::{bail, Context, Result};
use roadbook_core::{ErrorReporter, Route, TransitMode};

/// Error reporter that prints to stderr, for interactive use.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Parse a "LAT,LNG" argument.
pub fn parse_lat_lng(value: &str) -> Result<(f64, f64)> {
    let Some((lat, lng)) = value.split_once(',') else {
        bail!("expected LAT,LNG, got '{value}'");
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("bad latitude in '{value}'"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .with_context(|| format!("bad longitude in '{value}'"))?;
    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude {lat} out of range");
    }
    if !(-180.0..=180.0).contains(&lng) {
        bail!("longitude {lng} out of range");
    }
    Ok((lat, lng))
}

/// Parse a transit mode argument.
pub fn parse_transit_mode(value: &str) -> Result<TransitMode> {
    match value.to_ascii_lowercase().as_str() {
        "car" => Ok(TransitMode::Car),
        "bike" => Ok(TransitMode::Bike),
        "pedestrian" | "foot" => Ok(TransitMode::Pedestrian),
        "train" => Ok(TransitMode::Train),
        "line" => Ok(TransitMode::Line),
        "circle" => Ok(TransitMode::Circle),
        other => bail!("unknown transit mode '{other}'"),
    }
}

/// "12.3 km" / "850 m" style distance formatting.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{meters:.0} m")
    }
}

/// "1 h 05 min" / "12 min" style duration formatting.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round() as u64;
    if minutes >= 60 {
        format!("{} h {:02} min", minutes / 60, minutes % 60)
    } else {
        format!("{minutes} min")
    }
}

/// Render a route as a plain-text roadbook: totals, the maneuver list with
/// cumulative distances, and the attached notes.
pub fn render_roadbook(route: &Route) -> String {
    let mut out = String::new();
    let name = if route.name.is_empty() {
        "Route"
    } else {
        route.name.as_str()
    };
    out.push_str(&format!(
        "{name}: {} - {}\n",
        format_distance(route.distance),
        format_duration(route.duration)
    ));
    if route.itinerary.has_profile {
        out.push_str(&format!(
            "climb {:.0} m, drop {:.0} m\n",
            route.itinerary.ascent, route.itinerary.descent
        ));
    }

    let mut along = 0.0;
    for (index, maneuver) in route.itinerary.maneuvers.iter().enumerate() {
        along += maneuver.distance;
        out.push_str(&format!(
            "{:>3}. [{}] {} - {}\n",
            index + 1,
            format_distance(along),
            maneuver.instruction,
            format_distance(maneuver.distance)
        ));
    }

    if !route.notes.is_empty() {
        out.push_str("notes:\n");
        for note in &route.notes {
            let text = if note.tooltip.is_empty() {
                &note.icon_name
            } else {
                &note.tooltip
            };
            out.push_str(&format!("  - [{}] {text}\n", format_distance(note.distance)));
        }
    }

    out
}

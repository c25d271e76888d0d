//! Text forms of engine values, with placeholders for anything unknown.

use chrono::{DateTime, Utc};

use crate::formation::BestPass;
use crate::predict::{Aos, LookAngles};

use super::snapshot::{Snapshot, StationView};

pub const PLACEHOLDER: &str = "—";
pub const IN_PROGRESS: &str = "PASS IN PROGRESS";

pub fn timestamp(t: Option<DateTime<Utc>>) -> String {
    match t {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn aos(aos: Option<&Aos>) -> String {
    match aos {
        Some(Aos::InProgress) => IN_PROGRESS.to_string(),
        Some(Aos::Upcoming(t)) => timestamp(Some(*t)),
        None => PLACEHOLDER.to_string(),
    }
}

fn fixed(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}{}", decimals, v, unit),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn elevation(angles: Option<&LookAngles>) -> String {
    fixed(angles.map(|a| a.elevation_deg), 2, "°")
}

pub fn azimuth(angles: Option<&LookAngles>) -> String {
    fixed(angles.map(|a| a.azimuth_deg), 2, "°")
}

pub fn range(angles: Option<&LookAngles>) -> String {
    fixed(angles.map(|a| a.range_km), 0, " km")
}

pub fn velocity(angles: Option<&LookAngles>) -> String {
    fixed(angles.map(|a| a.velocity_km_s), 3, " km/s")
}

/// Multi-line card for one station. Look angles follow the selected satellite.
pub fn station_card(view: &StationView, selected: Option<&str>, formation: bool) -> String {
    let angles = selected.and_then(|name| view.look_for(name));
    let best: Option<&BestPass> = view.best_pass.as_ref();

    let mut lines = vec![
        view.station.name.clone(),
        format!("  Elevation: {}", elevation(angles)),
        format!("  Azimuth:   {}", azimuth(angles)),
        format!("  Range:     {}", range(angles)),
        format!("  Velocity:  {}", velocity(angles)),
        format!("  AOS:       {}", aos(best.map(|b| &b.window.aos))),
        format!("  LOS:       {}", timestamp(best.and_then(|b| b.window.los))),
    ];
    if formation {
        let owner = best.map(|b| b.satellite.as_str()).unwrap_or(PLACEHOLDER);
        lines.push(format!("  Satellite: {}", owner));
    }
    lines.join("\n")
}

/// Header plus one card per station.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = format!(
        "{} @ {} (tick {})",
        snapshot.mission,
        timestamp(Some(snapshot.timestamp)),
        snapshot.tick_id
    );
    if snapshot.visibility.stale {
        out.push_str(" [pass times stale]");
    }
    for sat in &snapshot.satellites {
        match (&sat.sub_point, &sat.planned_launch) {
            (Some(p), _) => out.push_str(&format!(
                "\n{}: lat {:.2}° lon {:.2}° alt {:.0} km",
                sat.name, p.latitude_deg, p.longitude_deg, p.altitude_km
            )),
            (None, Some(launch)) => {
                out.push_str(&format!("\n{}: planned launch {}", sat.name, launch))
            }
            (None, None) => out.push_str(&format!("\n{}: {}", sat.name, PLACEHOLDER)),
        }
    }
    for station in &snapshot.stations {
        out.push('\n');
        out.push_str(&station_card(
            station,
            snapshot.selected.as_deref(),
            snapshot.formation,
        ));
    }
    out
}

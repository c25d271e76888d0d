use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::dateline::{split_at_dateline, Polyline};

/// Geodetic projection of a satellite onto the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SubPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl SubPoint {
    /// Longitude first, as geographic consumers expect.
    pub fn lon_lat(&self) -> (f64, f64) {
        (self.longitude_deg, self.latitude_deg)
    }
}

/// Pointing geometry from one station to one satellite at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LookAngles {
    pub timestamp: DateTime<Utc>,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
    /// Positive while the satellite recedes.
    pub range_rate_km_s: f64,
    pub velocity_km_s: f64,
}

impl LookAngles {
    pub fn is_visible(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

/// Acquisition of signal. A pass already under way has no meaningful AOS
/// instant, so it is kept apart from an upcoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(tag = "state", content = "time", rename_all = "snake_case")]
pub enum Aos {
    InProgress,
    Upcoming(DateTime<Utc>),
}

impl Aos {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Aos::InProgress)
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            Aos::InProgress => None,
            Aos::Upcoming(t) => Some(*t),
        }
    }
}

/// Next transit of one satellite over one station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PassWindow {
    pub aos: Aos,
    /// Absent only when the pass outlasts the search horizon.
    pub los: Option<DateTime<Utc>>,
    /// Unknown when the window came from a remote oracle.
    pub max_elevation_deg: Option<f64>,
}

/// A complete pass inside a prediction window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pass {
    pub satellite: String,
    pub norad_id: u64,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub tca: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub aos_azimuth_deg: f64,
    pub los_azimuth_deg: f64,
    pub duration_seconds: i64,
}

/// Ground track snapshot around a reference instant. Regenerated wholesale,
/// never patched.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Track {
    pub past: Vec<SubPoint>,
    pub current: SubPoint,
    pub future: Vec<SubPoint>,
}

impl Track {
    pub fn reference(&self) -> DateTime<Utc> {
        self.current.timestamp
    }

    pub fn past_segments(&self) -> Vec<Polyline> {
        let mut points: Vec<(f64, f64)> = self.past.iter().map(SubPoint::lon_lat).collect();
        points.push(self.current.lon_lat());
        split_at_dateline(&points)
    }

    pub fn future_segments(&self) -> Vec<Polyline> {
        let points: Vec<(f64, f64)> = std::iter::once(&self.current)
            .chain(self.future.iter())
            .map(SubPoint::lon_lat)
            .collect();
        split_at_dateline(&points)
    }

    pub fn sample_count(&self) -> usize {
        self.past.len() + 1 + self.future.len()
    }
}

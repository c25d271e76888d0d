use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::formation::{BestPass, Role};
use crate::predict::{GroundStation, LookAngles, Polyline, SubPoint};

/// Everything the rendering consumer needs for one tick.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Snapshot {
    pub tick_id: u64,
    pub timestamp: DateTime<Utc>,
    pub mission: String,
    pub generation: u64,
    pub formation: bool,
    /// Satellite shown by single-satellite views.
    pub selected: Option<String>,
    pub satellites: Vec<SatelliteView>,
    pub stations: Vec<StationView>,
    pub visibility: VisibilityStatus,
}

impl Snapshot {
    pub fn satellite(&self, name: &str) -> Option<&SatelliteView> {
        self.satellites.iter().find(|s| s.name == name)
    }

    pub fn station(&self, name: &str) -> Option<&StationView> {
        self.stations.iter().find(|s| s.station.name == name)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteView {
    pub name: String,
    pub role: Option<Role>,
    pub epoch: Option<DateTime<Utc>>,
    /// Launch text for satellites that have no element set yet.
    pub planned_launch: Option<String>,
    /// Why the element set could not be used, if it was rejected.
    pub elements_error: Option<String>,
    pub sub_point: Option<SubPoint>,
    #[schema(value_type = Vec<Vec<Vec<f64>>>)]
    pub past_track: Vec<Polyline>,
    #[schema(value_type = Vec<Vec<Vec<f64>>>)]
    pub future_track: Vec<Polyline>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteLook {
    pub satellite: String,
    pub angles: LookAngles,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationView {
    pub station: GroundStation,
    pub look_angles: Vec<SatelliteLook>,
    pub best_pass: Option<BestPass>,
}

impl StationView {
    pub fn look_for(&self, satellite: &str) -> Option<&LookAngles> {
        self.look_angles
            .iter()
            .find(|l| l.satellite == satellite)
            .map(|l| &l.angles)
    }
}

/// State of the pass-time columns. `stale` is set when the latest lookup
/// failed and the shown passes come from an earlier tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct VisibilityStatus {
    pub stale: bool,
    pub updated_tick: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

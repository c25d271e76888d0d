pub mod display;
mod error;
mod snapshot;
mod tracker;

pub use error::TrackerError;
pub use snapshot::{SatelliteLook, SatelliteView, Snapshot, StationView, VisibilityStatus};
pub use tracker::{ActiveContext, LookupRequest, LookupResult, Tracker, TrackerSettings};

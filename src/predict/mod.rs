mod dateline;
mod elements;
mod error;
mod ground_station;
mod pass_finder;
mod propagation;
mod track;
mod types;

pub use dateline::{split_at_dateline, Polyline};
pub use elements::{parse_tle_lines, OrbitalElementSet};
pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::{is_currently_visible, next_pass, predict_passes, DEFAULT_SEARCH_HORIZON};
pub use propagation::{look_angles, position};
pub use track::{sample_track, samples_per_orbit};
pub use types::{Aos, LookAngles, Pass, PassWindow, SubPoint, Track};

#[cfg(test)]
pub(crate) use elements::fixtures;

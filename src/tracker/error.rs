use thiserror::Error;

use crate::formation::OracleError;
use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker already running")]
    AlreadyRunning,
    #[error("no missions configured")]
    NoMissions,
    #[error("unknown mission: {0}")]
    UnknownMission(String),
    #[error("mission {mission} has no satellite {satellite}")]
    UnknownSatellite { mission: String, satellite: String },
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
    #[error("predict error: {0}")]
    Predict(#[from] PredictError),
}

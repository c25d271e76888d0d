mod coordinator;
mod mission;
mod oracle;

pub use coordinator::{best_pass_per_station, merge_best_passes, resolve_best_passes, BestPass};
pub use mission::{ElementStatus, Mission, MissionCatalog, MissionKind, Role, Satellite};
pub use oracle::{
    AnyOracle, HttpOracle, LocalOracle, OracleError, OracleRequest, OracleStation, OracleTimes,
    PassOracle, StationPasses,
};

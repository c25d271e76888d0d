use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::missions::{MissionSummary, SatelliteSummary, SelectMissionRequest};
use super::api::passes::{PassListing, StationPassList};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::passes::next_pass_all,
        super::api::passes::mission_passes,
        super::api::missions::list_missions,
        super::api::missions::select_mission,
        super::api::missions::snapshot,
    ),
    components(
        schemas(
            ErrorResponse,
            MissionSummary,
            SatelliteSummary,
            SelectMissionRequest,
            PassListing,
            StationPassList,
            crate::formation::OracleRequest,
            crate::formation::OracleStation,
            crate::formation::OracleTimes,
            crate::formation::BestPass,
            crate::formation::Role,
            crate::predict::Aos,
            crate::predict::GroundStation,
            crate::predict::LookAngles,
            crate::predict::Pass,
            crate::predict::PassWindow,
            crate::predict::SubPoint,
            crate::tracker::ActiveContext,
            crate::tracker::Snapshot,
            crate::tracker::SatelliteView,
            crate::tracker::SatelliteLook,
            crate::tracker::StationView,
            crate::tracker::VisibilityStatus,
        )
    ),
    info(
        title = "Sat-O-Vis API",
        description = "Satellite visibility, ground tracks and pass prediction",
        version = "0.1.0"
    ),
    tags(
        (name = "passes", description = "AOS/LOS prediction"),
        (name = "missions", description = "Live engine state and mission selection")
    )
)]
pub struct ApiDoc;

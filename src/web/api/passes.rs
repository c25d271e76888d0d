use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::formation::{LocalOracle, Mission, OracleRequest, OracleTimes, PassOracle};
use crate::predict::{predict_passes, GroundStation, OrbitalElementSet, Pass, PredictError};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

const MAX_LISTING_HOURS: i64 = 24 * 7;

/// Next AOS/LOS per station for one element set, searched from now.
#[utoipa::path(
    post,
    path = "/next_pass_all",
    request_body = OracleRequest,
    responses(
        (status = 200, description = "Next pass per station", body = BTreeMap<String, OracleTimes>),
        (status = 400, description = "Invalid element set or station", body = ErrorResponse)
    ),
    tag = "passes"
)]
pub async fn next_pass_all(
    State(state): State<AppState>,
    Json(request): Json<OracleRequest>,
) -> ApiResult<Json<BTreeMap<String, OracleTimes>>> {
    let elements = OrbitalElementSet::from_lines("request", &request.tle1, &request.tle2)?;
    let stations = request
        .stations
        .iter()
        .map(|s| {
            let gs = GroundStation::from(s);
            gs.validate().map(|_| gs).map_err(ApiError::Validation)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now();
    let passes = LocalOracle::new(state.pass_horizon)
        .next_passes(&elements, &stations, now)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(
        passes
            .into_iter()
            .map(|(name, window)| (name, OracleTimes::from_window(window.as_ref(), now)))
            .collect(),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PassListingQuery {
    /// Window length from now, in hours (default 24).
    pub hours: Option<i64>,
    /// Minimum peak elevation in degrees (default 0).
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationPassList {
    pub station: String,
    pub passes: Vec<Pass>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassListing {
    pub mission: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub stations: Vec<StationPassList>,
}

/// Every pass of every mission member over each station, sorted by AOS.
pub fn list_passes(
    mission: &Mission,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
) -> Vec<StationPassList> {
    mission
        .stations
        .iter()
        .map(|station| {
            let mut passes = Vec::new();
            for sat in mission.members() {
                let Some(elements) = sat.elements() else {
                    continue;
                };
                match predict_passes(station, elements, start, end, min_elevation) {
                    Ok(found) => passes.extend(found),
                    Err(e) => {
                        log::warn!("Failed to predict passes for {}: {}", sat.name, e);
                    }
                }
            }
            passes.sort_by_key(|p| p.aos);
            StationPassList {
                station: station.name.clone(),
                passes,
            }
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/missions/{name}/passes",
    params(
        ("name" = String, Path, description = "Mission name"),
        PassListingQuery
    ),
    responses(
        (status = 200, description = "Pass listing", body = PassListing),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Unknown mission or no element sets", body = ErrorResponse)
    ),
    tag = "passes"
)]
pub async fn mission_passes(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PassListingQuery>,
) -> ApiResult<Json<PassListing>> {
    let hours = query.hours.unwrap_or(24);
    if !(1..=MAX_LISTING_HOURS).contains(&hours) {
        return Err(ApiError::Validation(format!(
            "hours must be between 1 and {}",
            MAX_LISTING_HOURS
        )));
    }

    let mission = {
        let tracker = state.tracker.lock().await;
        tracker
            .catalog()
            .get(&name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("unknown mission: {}", name)))?
    };
    if !mission.has_elements() {
        return Err(PredictError::NoData(mission.name.clone()).into());
    }

    let start = Utc::now();
    let end = start + Duration::hours(hours);
    let min_elevation = query.min_elevation.unwrap_or(0.0);
    let (mission, stations) = tokio::task::spawn_blocking(move || {
        let stations = list_passes(&mission, start, end, min_elevation);
        (mission, stations)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(PassListing {
        mission: mission.name,
        start,
        end,
        stations,
    }))
}

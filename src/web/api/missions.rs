use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::formation::{ElementStatus, Mission, MissionKind, Role};
use crate::predict::GroundStation;
use crate::tracker::{ActiveContext, Snapshot};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteSummary {
    pub name: String,
    pub role: Option<Role>,
    pub catalog_id: Option<String>,
    pub epoch: Option<DateTime<Utc>>,
    pub planned_launch: Option<String>,
    /// `loaded`, `missing` or `invalid`.
    pub elements: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MissionSummary {
    pub name: String,
    pub formation: bool,
    pub selected_role: Option<Role>,
    pub active: bool,
    pub satellites: Vec<SatelliteSummary>,
    pub stations: Vec<GroundStation>,
}

impl MissionSummary {
    fn new(mission: &Mission, active: bool) -> Self {
        let satellites = mission
            .members()
            .iter()
            .map(|sat| SatelliteSummary {
                name: sat.name.clone(),
                role: sat.role,
                catalog_id: sat.catalog_id.clone(),
                epoch: sat.elements().map(|el| el.epoch()),
                planned_launch: sat.planned_launch.clone(),
                elements: match sat.elements {
                    ElementStatus::Loaded(_) => "loaded",
                    ElementStatus::Missing => "missing",
                    ElementStatus::Invalid(_) => "invalid",
                }
                .to_string(),
            })
            .collect();

        Self {
            name: mission.name.clone(),
            formation: mission.is_formation(),
            selected_role: match &mission.kind {
                MissionKind::Formation { selected, .. } => Some(*selected),
                MissionKind::Single(_) => None,
            },
            active,
            satellites,
            stations: mission.stations.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/missions",
    responses(
        (status = 200, description = "Configured missions", body = Vec<MissionSummary>)
    ),
    tag = "missions"
)]
pub async fn list_missions(State(state): State<AppState>) -> ApiResult<Json<Vec<MissionSummary>>> {
    let tracker = state.tracker.lock().await;
    let active = tracker.active();
    let missions = tracker
        .catalog()
        .missions()
        .iter()
        .map(|m| MissionSummary::new(m, m.name == active.mission))
        .collect();
    Ok(Json(missions))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectMissionRequest {
    pub mission: String,
    /// Formation member to show instead of the one holding the selected role.
    #[serde(default)]
    pub satellite: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/missions/active",
    request_body = SelectMissionRequest,
    responses(
        (status = 200, description = "Mission selected", body = ActiveContext),
        (status = 404, description = "Unknown mission or satellite", body = ErrorResponse)
    ),
    tag = "missions"
)]
pub async fn select_mission(
    State(state): State<AppState>,
    Json(request): Json<SelectMissionRequest>,
) -> ApiResult<Json<ActiveContext>> {
    let mut tracker = state.tracker.lock().await;
    let active = tracker.select(&request.mission, request.satellite.as_deref())?;
    Ok(Json(active))
}

#[utoipa::path(
    get,
    path = "/api/snapshot",
    responses(
        (status = 200, description = "Latest tick, null until the first one after a mission change", body = Option<Snapshot>)
    ),
    tag = "missions"
)]
pub async fn snapshot(State(state): State<AppState>) -> ApiResult<Json<Option<Snapshot>>> {
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.snapshot()))
}

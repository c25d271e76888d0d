mod common;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sat_o_vis::config::Config;
use sat_o_vis::feed::ElementFeed;
use sat_o_vis::formation::{OracleRequest, OracleStation};
use sat_o_vis::tracker::Tracker;
use sat_o_vis::web::api::missions::{list_missions, select_mission, snapshot, SelectMissionRequest};
use sat_o_vis::web::api::passes::{mission_passes, next_pass_all, PassListingQuery};
use sat_o_vis::web::{router, AppState};

use common::*;

fn state() -> AppState {
    let config = Config::from_yaml(&config_yaml()).unwrap();
    let tracker = Tracker::from_config(&config, &ElementFeed::empty()).unwrap();
    AppState::new(config, tracker)
}

fn oracle_request(tle2: &str) -> OracleRequest {
    OracleRequest {
        tle1: DUTHSAT2_L1.to_string(),
        tle2: tle2.to_string(),
        stations: vec![
            OracleStation {
                name: "Greece (DUTH)".into(),
                lat: 41.1419,
                lng: 24.89,
                hgt_m: 76.0,
            },
            OracleStation {
                name: "Norway".into(),
                lat: 78.2244,
                lng: 15.395169,
                hgt_m: 0.0,
            },
        ],
    }
}

#[tokio::test]
async fn next_pass_all_answers_each_station() {
    let Json(body) = next_pass_all(State(state()), Json(oracle_request(DUTHSAT2_L2)))
        .await
        .unwrap();
    assert_eq!(body.len(), 2);
    // Element age makes "now" far from epoch; only the shape is checked.
    for times in body.values() {
        if let (Some(aos), Some(los)) = (times.aos, times.los) {
            assert!(los > aos);
        }
    }
}

#[tokio::test]
async fn next_pass_all_rejects_bad_elements() {
    let mut tle2 = DUTHSAT2_L2.to_string();
    tle2.replace_range(68..69, "0");
    let err = next_pass_all(State(state()), Json(oracle_request(&tle2)))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missions_are_listed_with_the_active_one_flagged() {
    let Json(missions) = list_missions(State(state())).await.unwrap();
    let names: Vec<_> = missions.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["DUTHSat-2", "Pair", "PeakSat"]);
    assert!(missions[0].active);
    assert!(missions[1].formation);
    assert_eq!(missions[2].satellites[0].elements, "missing");
}

#[tokio::test]
async fn selecting_missions() {
    let state = state();
    let Json(active) = select_mission(
        State(state.clone()),
        Json(SelectMissionRequest {
            mission: "Pair".into(),
            satellite: Some("Leader".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(active.mission, "Pair");
    assert_eq!(active.generation, 1);

    let Json(current) = snapshot(State(state.clone())).await.unwrap();
    assert!(current.is_none());

    let err = select_mission(
        State(state),
        Json(SelectMissionRequest {
            mission: "Nope".into(),
            satellite: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mission_pass_listing_validates_hours() {
    let err = mission_passes(
        State(state()),
        Path("DUTHSat-2".to_string()),
        Query(PassListingQuery {
            hours: Some(0),
            min_elevation: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

    let err = mission_passes(
        State(state()),
        Path("Nope".to_string()),
        Query(PassListingQuery {
            hours: None,
            min_elevation: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let err = mission_passes(
        State(state()),
        Path("PeakSat".to_string()),
        Query(PassListingQuery {
            hours: None,
            min_elevation: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn mission_pass_listing_lists_every_station() {
    let Json(listing) = mission_passes(
        State(state()),
        Path("DUTHSat-2".to_string()),
        Query(PassListingQuery {
            hours: Some(2),
            min_elevation: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(listing.mission, "DUTHSat-2");
    assert_eq!(listing.end - listing.start, chrono::Duration::hours(2));
    assert!(!listing.stations.is_empty());
    for station in &listing.stations {
        assert!(station.passes.windows(2).all(|w| w[0].aos <= w[1].aos));
    }
}

#[tokio::test]
async fn router_builds_with_docs() {
    let _app = router(state());
}

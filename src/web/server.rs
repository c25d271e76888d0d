use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::tracker::Tracker;

use super::api::missions as mission_handlers;
use super::api::passes as pass_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        // Pass-prediction oracle
        .route("/next_pass_all", post(pass_handlers::next_pass_all))
        // Live engine
        .route("/api/missions", get(mission_handlers::list_missions))
        .route("/api/missions/active", post(mission_handlers::select_mission))
        .route(
            "/api/missions/{name}/passes",
            get(pass_handlers::mission_passes),
        )
        .route("/api/snapshot", get(mission_handlers::snapshot));

    if let Some(dir) = &state.config.web.static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the tick loop and serves the API until the listener fails.
pub async fn run_server(config: Config, mut tracker: Tracker) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    if let Err(e) = tracker.start() {
        log::warn!("Tracker not started: {}", e);
    }

    let app = router(AppState::new(config, tracker));

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

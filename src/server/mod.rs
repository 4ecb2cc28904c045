//! HTTP JSON API behind the dashboard.

pub mod dto;
pub mod handlers;

pub use handlers::AppState;

use crate::config::ServerConfig;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::{
    education_correlation, filter_parties, filter_states, filter_years, gender_representation,
    health, highest_turnout_state, margin_distribution, narrowest_margins, national_vs_regional,
    party_seat_share, search, seat_change, state_turnout, top_parties_vote_share,
    women_percentage,
};

/// Creates the API router with all routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/party-seat-share", get(party_seat_share))
        .route("/api/state-turnout", get(state_turnout))
        .route("/api/gender-representation", get(gender_representation))
        .route("/api/top-parties-vote-share", get(top_parties_vote_share))
        .route("/api/margin-distribution", get(margin_distribution))
        .route("/api/search", get(search))
        .route("/api/filters/years", get(filter_years))
        .route("/api/filters/states", get(filter_states))
        .route("/api/filters/parties", get(filter_parties))
        .route("/api/analytics/highest-turnout-state", get(highest_turnout_state))
        .route("/api/analytics/seat-change", get(seat_change))
        .route("/api/analytics/women-percentage", get(women_percentage))
        .route("/api/analytics/narrowest-margins", get(narrowest_margins))
        .route("/api/analytics/national-vs-regional", get(national_vs_regional))
        .route("/api/analytics/education-correlation", get(education_correlation))
        .with_state(state)
}

/// Any origin when `origins` is empty, otherwise only the listed ones.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn app(state: AppState, config: &ServerConfig) -> Router {
    routes(state)
        .layer(cors_layer(&config.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, config: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "dashboard API listening");
    axum::serve(listener, app(state, config)).await
}

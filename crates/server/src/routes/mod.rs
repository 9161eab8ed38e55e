#![forbid(unsafe_code)]

mod metadata;
mod records;

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::{Value, json};

/// Routes under `/api`. Profile-specific routes are only registered for profiles that have the
/// columns (or the index) behind them.
pub fn app(state: AppState) -> Router {
    let profile = state.profile();

    let mut api = Router::new()
        .route("/health", get(health))
        .route(
            "/tests",
            get(records::list_tests).post(records::create_test),
        )
        .route(
            "/tests/:id",
            get(records::get_test).delete(records::delete_test),
        );

    if profile.is_categorized() {
        api = api
            .route("/tests/filtered", get(records::list_filtered_tests))
            .route("/topics", get(records::list_topics))
            .route("/sections", get(records::list_sections));
    } else {
        // Keeps `/tests/:id` from claiming the segment and answering 400.
        api = api.route("/tests/filtered", any(not_registered));
    }
    if profile.has_metadata_index() {
        api = api.route("/metadata", get(metadata::read_metadata));
    }

    Router::new().nest("/api", api).with_state(state)
}

async fn not_registered() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "profile": state.profile().as_str(),
    }))
}

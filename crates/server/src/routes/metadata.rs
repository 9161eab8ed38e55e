#![forbid(unsafe_code)]

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

pub(super) async fn read_metadata(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.with_store(|store| store.metadata()).await?;
    tracing::debug!(
        topics = snapshot.topics.len(),
        sections = snapshot.sections.len(),
        "metadata read"
    );
    Ok(Json(json!({
        "topics": snapshot.topics,
        "sections": snapshot.sections,
    })))
}

#![forbid(unsafe_code)]

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tb_core::model::{NewTestRecord, TestFilter, TestRecord};

#[derive(Debug, Deserialize)]
pub(super) struct CreateTestBody {
    topic: Option<String>,
    section: Option<String>,
    question: Option<String>,
    answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FilterParams {
    topic: Option<String>,
    section: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SectionParams {
    topic: Option<String>,
}

pub(super) async fn create_test(
    State(state): State<AppState>,
    payload: Result<Json<CreateTestBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) =
        payload.map_err(|rejection| ApiError::rejected(rejection.status(), rejection.body_text()))?;
    let record = NewTestRecord {
        topic: body.topic,
        section: body.section,
        question: body.question,
        answer: body.answer,
    };
    let id = state.with_store(move |store| store.create_test(record)).await?;
    Ok(Json(json!({ "id": id })))
}

pub(super) async fn list_tests(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.with_store(|store| store.list_tests()).await?;
    tracing::debug!(count = records.len(), "tests listed");
    Ok(Json(records_json(&records)))
}

pub(super) async fn list_filtered_tests(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Value>, ApiError> {
    let filter = TestFilter::new(params.topic, params.section);
    let records = state
        .with_store(move |store| store.list_filtered_tests(&filter))
        .await?;
    tracing::debug!(count = records.len(), "filtered tests listed");
    Ok(Json(records_json(&records)))
}

pub(super) async fn get_test(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(path_rejected)?;
    let record = state.with_store(move |store| store.get_test(id)).await?;
    Ok(Json(record_json(&record)))
}

pub(super) async fn delete_test(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(path_rejected)?;
    state.with_store(move |store| store.delete_test(id)).await?;
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn list_topics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let topics = state.with_store(|store| store.list_topics()).await?;
    Ok(Json(json!(topics)))
}

pub(super) async fn list_sections(
    State(state): State<AppState>,
    Query(params): Query<SectionParams>,
) -> Result<Json<Value>, ApiError> {
    let sections = state
        .with_store(move |store| store.list_sections(params.topic.as_deref()))
        .await?;
    Ok(Json(json!(sections)))
}

fn path_rejected(rejection: PathRejection) -> ApiError {
    ApiError::rejected(rejection.status(), rejection.body_text())
}

fn records_json(records: &[TestRecord]) -> Value {
    Value::Array(records.iter().map(record_json).collect())
}

/// Wire shape of a record. `topic` and `section` only appear for categorized records.
fn record_json(record: &TestRecord) -> Value {
    let mut value = json!({
        "id": record.id,
        "question": record.question,
        "answer": record.answer,
        "createdAt": record.created_at,
    });
    if let Some(topic) = &record.topic {
        value["topic"] = json!(topic);
    }
    if let Some(section) = &record.section {
        value["section"] = json!(section);
    }
    value
}

#![forbid(unsafe_code)]

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tb_storage::StoreError;

const NOT_FOUND_MESSAGE: &str = "Test not found";

/// Every failure a handler can return. Serialized as `{"error": message}`.
#[derive(Debug)]
pub(crate) enum ApiError {
    NotFound,
    Storage(String),
    Internal(String),
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub(crate) fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::NotFound => NOT_FOUND_MESSAGE,
            Self::Storage(message) | Self::Internal(message) => message.as_str(),
            Self::Rejected { message, .. } => message.as_str(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UnknownId => Self::NotFound,
            other => Self::Storage(other.engine_message()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = self.message(), "request failed");
        } else {
            tracing::debug!(%status, error = self.message(), "request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

//! Error types for the server

use crate::error::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    /// A vocabulary value the loaded encoder never saw during training
    #[error("Model does not know '{value}' in column '{column}'")]
    UnknownToModel { column: String, value: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::SchemaViolation { .. } => ServerError::Unprocessable(err.to_string()),
            PipelineError::UnseenCategory { column, value } => {
                ServerError::UnknownToModel { column, value }
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ServerError::UnknownToModel { column, value } => {
                tracing::error!(
                    column = %column,
                    value = %value,
                    "Valid request value missing from the trained encoder"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The deployed model cannot encode this request".to_string(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violation_is_client_error() {
        let err: ServerError = PipelineError::SchemaViolation {
            field: "race".to_string(),
            value: "ERROR".to_string(),
        }
        .into();
        assert!(matches!(err, ServerError::Unprocessable(_)));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unseen_category_is_server_error() {
        let err: ServerError = PipelineError::UnseenCategory {
            column: "workclass".to_string(),
            value: "Without-pay".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            ServerError::UnknownToModel { ref column, ref value }
                if column == "workclass" && value == "Without-pay"
        ));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

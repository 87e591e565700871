//! Error handling for the shelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// JSON body of every error response.
///
/// `error` is always a human-readable message; variant-specific fields
/// (`missing`, `status`, `body`, `detail`) sit next to it at the top level.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub trace_id: String,
    pub timestamp: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// Required configuration is absent; the request was not attempted
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        missing: Vec<String>,
        code: String,
    },

    /// An upstream API answered with a non-success status
    #[error("upstream error: {message} (status {status})")]
    Upstream {
        message: String,
        status: u16,
        body: String,
        code: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a configuration error naming the missing values
    pub fn configuration<S: Into<String>>(
        message: impl Into<String>,
        missing: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            missing: missing.into_iter().map(Into::into).collect(),
            code: "configuration_error".to_string(),
        }
    }

    /// Create an upstream error carrying the remote status and raw body
    pub fn upstream(message: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status,
            body: body.into(),
            code: "upstream_error".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Configuration { .. } | AppError::Upstream { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let timestamp = OffsetDateTime::now_utc().to_string();
        let status = self.status();

        let mut extra = Map::new();
        let (code, message) = match self {
            AppError::Configuration {
                message,
                missing,
                code,
            } => {
                extra.insert("missing".to_string(), Value::from(missing));
                (code, message)
            }
            AppError::Upstream {
                message,
                status: upstream_status,
                body,
                code,
            } => {
                extra.insert("status".to_string(), Value::from(upstream_status));
                extra.insert("body".to_string(), Value::from(body));
                (code, message)
            }
            AppError::NotFound { message, code } => (code, message),
            AppError::Internal(e) => {
                // Internal details stay out of release builds
                if cfg!(debug_assertions) {
                    extra.insert("detail".to_string(), Value::from(format!("{e:#}")));
                }
                tracing::error!(error = %format!("{e:#}"), "unhandled error");
                ("internal_error".to_string(), "Server error".to_string())
            }
        };

        tracing::error!(
            error_id = %error_id,
            error_code = %code,
            status_code = %status.as_u16(),
            "Request error"
        );

        let body = ErrorBody {
            error: message,
            code,
            extra,
            trace_id: error_id.to_string(),
            timestamp,
        };

        (status, Json(body)).into_response()
    }
}

//! HTTP error type for retronode-server
//!
//! Every failure leaves the API as `{"success": false, "message": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{ImportError, IdentifyError, LaunchError, ScanError};
use crate::storage::StorageError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    Validation(String),

    /// Folder outside the allowed base (403)
    #[error("{0}")]
    AccessDenied(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Duplicate id (409)
    #[error("{0}")]
    Conflict(String),

    /// Identification backend answered badly (502)
    #[error("{0}")]
    Upstream(String),

    /// Identification backend not configured (503)
    #[error("{0}")]
    Configuration(String),

    /// Emulator failed to start or exited with failure (500)
    #[error("{message}")]
    LaunchFailed {
        message: String,
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Document or folder I/O failure (500)
    #[error("{0}")]
    Io(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::LaunchFailed { .. } | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        }

        let body = match self {
            ApiError::LaunchFailed {
                message,
                command,
                exit_code,
                stdout,
                stderr,
            } => json!({
                "success": false,
                "message": message,
                "command": command,
                "exitCode": exit_code,
                "stdout": stdout,
                "stderr": stderr,
            }),
            other => json!({
                "success": false,
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => ApiError::NotFound(msg),
            StorageError::Conflict(msg) => ApiError::Conflict(msg),
            StorageError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Io(other.to_string()),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidPath(_) => ApiError::Validation(err.to_string()),
            ScanError::AccessDenied(_) => {
                ApiError::AccessDenied("Access to the specified folder is not allowed".to_string())
            }
            ScanError::PathNotFound(_) => ApiError::NotFound(err.to_string()),
            ScanError::NotADirectory(_) => ApiError::Validation(err.to_string()),
            ScanError::Io(..) => ApiError::Io(err.to_string()),
        }
    }
}

impl From<IdentifyError> for ApiError {
    fn from(err: IdentifyError) -> Self {
        match err {
            IdentifyError::Configuration(msg) => ApiError::Configuration(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::PlatformNotFound(_) => ApiError::NotFound(err.to_string()),
            ImportError::Storage(e) => e.into(),
        }
    }
}

impl From<LaunchError> for ApiError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::GameNotFound(_) | LaunchError::PlatformNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            LaunchError::NoRomPath | LaunchError::NoEmulators(_) | LaunchError::EmptyCommand(_) => {
                ApiError::Validation(err.to_string())
            }
            LaunchError::Spawn { ref command, .. } => ApiError::LaunchFailed {
                message: err.to_string(),
                command: command.clone(),
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
            },
            LaunchError::Exited {
                ref command,
                exit_code,
                ref stdout,
                ref stderr,
            } => ApiError::LaunchFailed {
                message: err.to_string(),
                command: command.clone(),
                exit_code,
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            },
            LaunchError::Storage(e) => e.into(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use keymaster::calib::CalibrationError;
use thiserror::Error;

use crate::analysis::AnalysisError;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The engine rejected the request.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// The analysis collaborator failed.
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// The request asked for more RANSAC iterations than the server allows.
    #[error("outlier_rejection.max_iterations is {requested}, the limit is {limit}")]
    TooManyIterations {
        /// Iterations in the request.
        requested: usize,
        /// Server limit.
        limit: usize,
    },

    /// No usable basic-auth credentials were sent.
    #[error("Not authenticated")]
    MissingCredentials,

    /// The credentials did not match.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// A blocking worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Calibration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooManyIterations { .. } => StatusCode::BAD_REQUEST,
            ApiError::MissingCredentials | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Analysis(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Calibration(e) => serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}

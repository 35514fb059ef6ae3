#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Fit-analysis collaborator and the `/api/analyze` handler.
pub mod analysis;

/// Basic authentication and the `/api/protected` handler.
pub mod auth;

/// The `/api/calibrate` handler.
pub mod calibrate;

/// Command-line configuration.
pub mod config;

/// Error responses.
pub mod error;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use keymaster::calib::{CalibrationBackend, FitMode};

use crate::{analysis::Analyzer, auth::CredentialVerifier};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Engine that serves calibration requests.
    pub backend: Arc<dyn CalibrationBackend>,
    /// Produces the text of `/api/analyze`.
    pub analyzer: Arc<dyn Analyzer>,
    /// Checks basic-auth credentials.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Mode used when a request does not name one.
    pub default_mode: FitMode,
    /// Largest `outlier_rejection.max_iterations` a request may ask for.
    pub max_ransac_iterations: usize,
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome to Keymaster!" }))
        .route("/api/calibrate", post(calibrate::calibrate))
        .route("/api/analyze", post(analysis::analyze))
        .route("/api/protected", get(auth::protected))
        .with_state(state)
}

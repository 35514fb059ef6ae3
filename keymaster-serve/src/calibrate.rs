use axum::{extract::State, response::Json};
use keymaster::calib::{CalibrationResult, FitMode, Point3, RansacParams};
use serde::Deserialize;

use crate::{error::ApiError, AppState};

/// Body of `POST /api/calibrate`.
#[derive(Debug, Deserialize)]
pub struct CalibrationRequest {
    /// Points in the source (ARW) frame.
    pub arw_points: Vec<Point3>,
    /// Corresponding points in the target (RWP) frame.
    pub rwp_points: Vec<Point3>,
    /// Fit mode; the server default applies when absent.
    #[serde(default)]
    pub mode: Option<FitMode>,
    /// Run RANSAC with these parameters before fitting.
    #[serde(default)]
    pub outlier_rejection: Option<RansacParams>,
}

/// Handler for `POST /api/calibrate`.
pub async fn calibrate(
    State(state): State<AppState>,
    Json(request): Json<CalibrationRequest>,
) -> Result<Json<CalibrationResult>, ApiError> {
    let mode = request.mode.unwrap_or(state.default_mode);
    log::info!(
        "Received {mode} calibration request with {} ARW points and {} RWP points",
        request.arw_points.len(),
        request.rwp_points.len()
    );

    if let Some(params) = &request.outlier_rejection {
        if params.max_iterations > state.max_ransac_iterations {
            log::warn!(
                "Rejecting calibration request asking for {} RANSAC iterations",
                params.max_iterations
            );
            return Err(ApiError::TooManyIterations {
                requested: params.max_iterations,
                limit: state.max_ransac_iterations,
            });
        }
    }

    // the solvers are CPU bound
    let backend = state.backend.clone();
    let result = tokio::task::spawn_blocking(move || {
        backend.calibrate(
            &request.arw_points,
            &request.rwp_points,
            mode,
            request.outlier_rejection.as_ref(),
        )
    })
    .await?;

    match result {
        Ok(result) => {
            log::info!(
                "Returning calibration result: RMSE={} over {} points",
                result.rmse,
                result.num_points_used
            );
            Ok(Json(result))
        }
        Err(e) => {
            log::error!("Error in /api/calibrate: {e}");
            Err(e.into())
        }
    }
}

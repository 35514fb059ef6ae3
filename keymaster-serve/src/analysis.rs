use axum::{extract::State, response::Json};
use keymaster::calib::CalibrationResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::ApiError, AppState};

/// Errors raised by an [`Analyzer`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analysis backend could not be reached.
    #[error("analysis backend unavailable: {0}")]
    Unavailable(String),
}

/// Turns a calibration result and a free-form prompt into prose.
pub trait Analyzer: Send + Sync {
    /// Describe `result`, guided by `prompt`.
    fn analyze(&self, result: &CalibrationResult, prompt: &str) -> Result<String, AnalysisError>;
}

/// Qualitative grade of a fit, by RMSE in target units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitQuality {
    /// RMSE below 0.001.
    Excellent,
    /// RMSE below 0.01.
    Good,
    /// RMSE below 0.1.
    Fair,
    /// Anything else.
    Poor,
}

impl FitQuality {
    /// Grade an RMSE value.
    pub fn from_rmse(rmse: f64) -> Self {
        if rmse < 0.001 {
            FitQuality::Excellent
        } else if rmse < 0.01 {
            FitQuality::Good
        } else if rmse < 0.1 {
            FitQuality::Fair
        } else {
            FitQuality::Poor
        }
    }

    /// Lowercase name of the grade.
    pub fn as_str(self) -> &'static str {
        match self {
            FitQuality::Excellent => "excellent",
            FitQuality::Good => "good",
            FitQuality::Fair => "fair",
            FitQuality::Poor => "poor",
        }
    }
}

/// Deterministic analyzer that fills a fixed template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnalyzer;

impl Analyzer for TemplateAnalyzer {
    fn analyze(&self, result: &CalibrationResult, prompt: &str) -> Result<String, AnalysisError> {
        let quality = FitQuality::from_rmse(result.rmse);
        Ok(format!(
            "Analysis of the {platform} calibration over {n} points: \
             the received RMSE is {rmse:.4}, a {grade} fit. Prompt: \"{prompt}\".",
            platform = result.source_platform,
            n = result.num_points_used,
            rmse = result.rmse,
            grade = quality.as_str(),
        ))
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// The result to analyze.
    pub result: CalibrationResult,
    /// Free-form instruction for the analyzer.
    pub prompt: String,
}

/// Reply of `POST /api/analyze`.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    /// The analysis text.
    pub analysis: String,
}

/// Handler for `POST /api/analyze`.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    log::info!(
        "Received analysis request with RMSE={} and prompt='{}'",
        request.result.rmse,
        request.prompt
    );

    let analyzer = state.analyzer.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        analyzer.analyze(&request.result, &request.prompt)
    })
    .await?
    .map_err(|e| {
        log::error!("Error in /api/analyze: {e}");
        ApiError::from(e)
    })?;

    Ok(Json(AnalysisResponse { analysis }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymaster::calib::Transform4x4;

    fn sample_result(rmse: f64) -> CalibrationResult {
        CalibrationResult {
            rmse,
            transform: Transform4x4::IDENTITY,
            source_platform: "python".to_string(),
            num_points_used: 12,
        }
    }

    #[test]
    fn test_fit_quality_bands() {
        assert_eq!(FitQuality::from_rmse(0.0), FitQuality::Excellent);
        assert_eq!(FitQuality::from_rmse(0.0012), FitQuality::Good);
        assert_eq!(FitQuality::from_rmse(0.05), FitQuality::Fair);
        assert_eq!(FitQuality::from_rmse(2.0), FitQuality::Poor);
    }

    #[test]
    fn test_template_analyzer() -> Result<(), AnalysisError> {
        let text = TemplateAnalyzer.analyze(&sample_result(0.0012), "Analyze this result.")?;
        assert!(text.contains("RMSE is 0.0012"));
        assert!(text.contains("12 points"));
        assert!(text.contains("python"));
        assert!(text.contains("good fit"));
        assert!(text.contains("Analyze this result."));
        Ok(())
    }
}

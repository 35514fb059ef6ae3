use std::sync::Arc;

use argh::FromArgs;
use keymaster::calib::{ClosedFormBackend, FitMode};

use crate::{
    analysis::TemplateAnalyzer,
    auth::{CredentialVerifier, DenyAll, StaticCredentials},
    AppState,
};

/// Serve the keymaster calibration API over HTTP
#[derive(Debug, FromArgs)]
pub struct Args {
    /// address to bind to
    #[argh(option, default = "String::from(\"0.0.0.0\")")]
    pub host: String,

    /// port to listen on
    #[argh(option, short = 'p', default = "8000")]
    pub port: u16,

    /// username accepted on protected routes
    #[argh(option, default = "String::from(\"admin\")")]
    pub auth_user: String,

    /// environment variable holding the password for protected routes
    #[argh(option, default = "String::from(\"KEYMASTER_PASSWORD\")")]
    pub auth_password_env: String,

    /// fit mode used when a request does not name one (rigid, similarity, affine)
    #[argh(option, short = 'm', default = "FitMode::Affine")]
    pub mode: FitMode,

    /// platform tag reported in calibration results
    #[argh(option, default = "String::from(\"rust\")")]
    pub platform: String,

    /// largest number of RANSAC iterations a request may ask for
    #[argh(option, default = "10_000")]
    pub max_ransac_iterations: usize,
}

impl Args {
    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the shared state. Protected routes reject everyone when
    /// `password` is missing or empty.
    pub fn app_state(&self, password: Option<String>) -> AppState {
        let verifier: Arc<dyn CredentialVerifier> = match password {
            Some(password) if !password.is_empty() => {
                Arc::new(StaticCredentials::new(self.auth_user.clone(), password))
            }
            _ => {
                log::warn!(
                    "{} is not set, protected routes will reject all requests",
                    self.auth_password_env
                );
                Arc::new(DenyAll)
            }
        };

        AppState {
            backend: Arc::new(ClosedFormBackend::new(self.platform.clone())),
            analyzer: Arc::new(TemplateAnalyzer),
            verifier,
            default_mode: self.mode,
            max_ransac_iterations: self.max_ransac_iterations,
        }
    }
}

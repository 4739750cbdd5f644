//! Inbound intents from a presentation layer, plus the state it renders.

pub mod acquisition;
pub mod view;

use crate::config::AnalyzerConfig;
use crate::error::AppError;
use crate::services::camera::CameraPlatform;
use crate::services::face_api::{FaceApiClient, InferenceBackend};
use crate::session::acquisition::AcquisitionController;
use std::sync::Arc;

/// Everything a host keeps alive for the lifetime of one analysis screen.
pub struct AppState {
    pub controller: AcquisitionController,
}

impl AppState {
    /// Validates `config` and wires the HTTP client for the configured endpoint.
    pub fn new(config: AnalyzerConfig, platform: Arc<dyn CameraPlatform>) -> Result<Self, AppError> {
        config.validate()?;
        let client = FaceApiClient::new(&config)?;
        tracing::info!(url = %client.predict_url(), "Face analysis endpoint configured");
        Ok(Self::with_backend(config, Arc::new(client), platform))
    }

    pub fn with_backend(
        config: AnalyzerConfig,
        backend: Arc<dyn InferenceBackend>,
        platform: Arc<dyn CameraPlatform>,
    ) -> Self {
        Self {
            controller: AcquisitionController::new(config, backend, platform),
        }
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str =
    "https://face-detction-api-hnfvf0h0cpgghjd8.canadacentral-01.azurewebsites.net";
const PREDICT_ROUTE: &str = "predict_all";

/// Video constraints sent to the platform when opening a camera stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub facing_mode: String,
    pub audio: bool,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            min_width: 640,
            min_height: 480,
            facing_mode: "user".to_string(),
            audio: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub jpeg_quality: u8,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
    pub camera: CameraConstraints,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            jpeg_quality: 90,
            use_system_proxy: true,
            camera: CameraConstraints::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults overlaid with the environment, for runs without a config file.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: AnalyzerConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config JSON: {}", e)))?;
        Ok(config)
    }

    /// Overlays `FACE_LENS_API_URL` and `FACE_LENS_TIMEOUT_SECS` when set.
    pub fn apply_env(&mut self) -> Result<(), AppError> {
        if let Ok(url) = std::env::var("FACE_LENS_API_URL") {
            self.api_base_url = url;
        }
        if let Ok(secs) = std::env::var("FACE_LENS_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                AppError::Config(format!("FACE_LENS_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config("request_timeout_secs must be positive".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AppError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        let cam = &self.camera;
        if cam.min_width > cam.ideal_width || cam.min_height > cam.ideal_height {
            return Err(AppError::Config(format!(
                "camera minimum {}x{} exceeds ideal {}x{}",
                cam.min_width, cam.min_height, cam.ideal_width, cam.ideal_height
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn predict_url(&self) -> String {
        format!("{}/{}", self.api_base_url.trim().trim_end_matches('/'), PREDICT_ROUTE)
    }
}

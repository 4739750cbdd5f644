use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Why the platform refused to hand out a camera stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraErrorKind {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    Unknown,
}

impl CameraErrorKind {
    /// Maps a platform error name (`NotAllowedError`, `NotFoundError`, ...) onto a kind.
    pub fn classify(name: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
                CameraErrorKind::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
                CameraErrorKind::DeviceNotFound
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => CameraErrorKind::DeviceBusy,
            _ => CameraErrorKind::Unknown,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            CameraErrorKind::PermissionDenied => {
                "Camera access denied. Please allow camera permissions and try again."
            }
            CameraErrorKind::DeviceNotFound => "No camera found. Please connect a camera and try again.",
            CameraErrorKind::DeviceBusy => "Camera is being used by another application.",
            CameraErrorKind::Unknown => "Unable to access camera. Please check permissions and try again.",
        }
    }
}

/// What was wrong with a response the service answered successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    /// The body is not a JSON object at all.
    InvalidFormat,
    /// A JSON object, but a required record is missing, mistyped or out of range.
    Incomplete,
}

/// Terminal failure of one analysis request. Carried by `SessionState::Failed`.
///
/// Camera-access failures never reach the analysis session: they are raised
/// by `start_camera` before any submission exists, so they live on
/// `AppError::CameraAccess` instead of here.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    /// The service answered with a non-success status.
    #[error("inference service returned {status} {reason}")]
    Transport { status: u16, reason: String },

    /// The request succeeded but the body did not describe a complete result.
    #[error("malformed response: {message}")]
    MalformedResponse { reason: MalformedReason, message: String },

    /// The request never produced a response (connection refused, timeout, ...).
    /// An empty message means the underlying failure had nothing to say.
    #[error("network error: {message}")]
    Network { message: String },
}

impl AnalysisError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AnalysisError::MalformedResponse {
            reason: MalformedReason::Incomplete,
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        AnalysisError::MalformedResponse {
            reason: MalformedReason::InvalidFormat,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        AnalysisError::Network {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Transport { status, reason } => {
                format!("Failed to analyze image: {} {}", status, reason)
                    .trim_end()
                    .to_string()
            }
            AnalysisError::MalformedResponse {
                reason: MalformedReason::InvalidFormat,
                ..
            } => "Failed to analyze image: Invalid response format from API".to_string(),
            AnalysisError::MalformedResponse { .. } => {
                "Failed to analyze image: Incomplete data received from API".to_string()
            }
            AnalysisError::Network { message } if !message.trim().is_empty() => {
                format!("Failed to analyze image: {}", message)
            }
            AnalysisError::Network { .. } => "Failed to analyze image. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::network(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A non-image file was offered for analysis.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("camera access failed: {0:?}")]
    CameraAccess(CameraErrorKind),

    /// No live camera frame was available to capture.
    #[error("capture failed: {0}")]
    Capture(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::CameraAccess(_) => "camera_access",
            AppError::Capture(_) => "capture",
            AppError::Analysis(_) => "analysis",
            AppError::Io(_) => "io",
            AppError::Image(_) => "image",
            AppError::Http(_) => "http",
            AppError::Config(_) => "config",
        }
    }

    /// Short message fit for display; never includes diagnostic payloads
    /// beyond an HTTP status line.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => "Please select a valid image file".to_string(),
            AppError::CameraAccess(kind) => kind.user_message().to_string(),
            AppError::Capture(_) => "Unable to capture photo. Please try again.".to_string(),
            AppError::Analysis(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.user_message())?;
        state.end()
    }
}

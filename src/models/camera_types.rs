use crate::error::CameraErrorKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum CameraState {
    #[default]
    Inactive,
    Requesting,
    Active,
    Errored(CameraErrorKind),
}

/// What a renderer needs to know about the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CameraView {
    pub state: CameraState,
    /// Last user-visible camera message, cleared by start/stop.
    pub error: Option<String>,
    pub frame_width: u32,
    pub frame_height: u32,
}

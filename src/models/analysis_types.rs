use crate::error::AnalysisError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderPrediction {
    pub gender: String,
    /// Confidence in [0, 1].
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionPrediction {
    pub predicted_emotion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeEstimate {
    pub predicted_age: u32,
}

/// A fully validated prediction. Only built by the response validator in
/// `services::face_api`, so every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub gender: GenderPrediction,
    pub emotion: EmotionPrediction,
    pub age: AgeEstimate,
}

impl AnalysisResult {
    /// Gender confidence as a whole percentage, e.g. 0.97 -> 97.
    pub fn confidence_percent(&self) -> u8 {
        (self.gender.probability * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Analyzing,
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Succeeded(_) | SessionState::Failed(_))
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, SessionState::Analyzing)
    }
}

/// Session state tagged with the submission that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SessionSnapshot {
    /// 0 until the first submission.
    pub generation: u64,
    pub state: SessionState,
}

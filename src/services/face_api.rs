//! Client for the remote face inference service.
//!
//! The service exposes a single `predict_all` route taking a multipart form
//! with one `file` field and answering with gender, emotion and age records.
//! Responses are validated strictly: either every record is present and
//! well-typed, or the whole response is rejected as malformed.

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, AppError};
use crate::models::analysis_types::{AgeEstimate, AnalysisResult, EmotionPrediction, GenderPrediction};
use crate::models::image_types::FileUpload;
use futures::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Instant;

/// Anything that can turn an uploaded image into an `AnalysisResult`.
pub trait InferenceBackend: Send + Sync {
    fn predict_all(&self, upload: FileUpload) -> BoxFuture<'_, Result<AnalysisResult, AnalysisError>>;
}

#[derive(Deserialize)]
struct RawPrediction {
    gender: RawGender,
    emotion: RawEmotion,
    age: RawAge,
}

#[derive(Deserialize)]
struct RawGender {
    gender: String,
    probability: f64,
}

#[derive(Deserialize)]
struct RawEmotion {
    predicted_emotion: String,
}

#[derive(Deserialize)]
struct RawAge {
    predicted_age: f64,
}

/// Parses and validates a `predict_all` response body.
pub fn parse_prediction(body: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AnalysisError::invalid_format(format!("body is not JSON: {}", e)))?;
    if !value.is_object() {
        return Err(AnalysisError::invalid_format("body is not a JSON object"));
    }
    let raw = RawPrediction::deserialize(value)
        .map_err(|e| AnalysisError::malformed(format!("Incomplete data received from API: {}", e)))?;

    let gender = raw.gender.gender.trim();
    if gender.is_empty() {
        return Err(AnalysisError::malformed("gender label is empty"));
    }
    let probability = raw.gender.probability;
    if !(0.0..=1.0).contains(&probability) {
        return Err(AnalysisError::malformed(format!(
            "gender probability {} is outside [0, 1]",
            probability
        )));
    }

    let emotion = raw.emotion.predicted_emotion.trim();
    if emotion.is_empty() {
        return Err(AnalysisError::malformed("emotion label is empty"));
    }

    let age = raw.age.predicted_age;
    if !age.is_finite() || age < 0.0 || age > u32::MAX as f64 {
        return Err(AnalysisError::malformed(format!("predicted age {} is not a valid age", age)));
    }

    Ok(AnalysisResult {
        gender: GenderPrediction {
            gender: gender.to_string(),
            probability,
        },
        emotion: EmotionPrediction {
            predicted_emotion: emotion.to_string(),
        },
        age: AgeEstimate {
            predicted_age: age.round() as u32,
        },
    })
}

pub struct FaceApiClient {
    client: reqwest::Client,
    predict_url: String,
}

impl FaceApiClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            predict_url: config.predict_url(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    async fn post_image(&self, upload: FileUpload) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let size = upload.bytes.len();

        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| AnalysisError::network(format!("invalid MIME type {}: {}", upload.mime_type, e)))?;
        let form = Form::new().part("file", part);

        tracing::debug!(url = %self.predict_url, file = %upload.file_name, bytes = size, "Sending predict_all request");
        let resp = self.client.post(&self.predict_url).multipart(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "predict_all returned non-success status");
            return Err(AnalysisError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = resp.text().await?;
        let result = parse_prediction(&body);
        match &result {
            Ok(r) => tracing::info!(
                gender = %r.gender.gender,
                emotion = %r.emotion.predicted_emotion,
                age = r.age.predicted_age,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "predict_all succeeded"
            ),
            Err(e) => tracing::warn!(error = %e, "predict_all response rejected"),
        }
        result
    }
}

impl InferenceBackend for FaceApiClient {
    fn predict_all(&self, upload: FileUpload) -> BoxFuture<'_, Result<AnalysisResult, AnalysisError>> {
        Box::pin(self.post_image(upload))
    }
}

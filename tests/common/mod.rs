#![allow(dead_code)]

use face_lens_lib::config::CameraConstraints;
use face_lens_lib::models::analysis_types::{AgeEstimate, AnalysisResult, EmotionPrediction, GenderPrediction};
use face_lens_lib::models::image_types::{FileUpload, SelectedFile, VideoFrame};
use face_lens_lib::services::camera::{CameraPlatform, CameraStream, PlatformCameraError};
use face_lens_lib::services::face_api::InferenceBackend;
use face_lens_lib::AnalysisError;
use futures::future::BoxFuture;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type Outcome = Result<AnalysisResult, AnalysisError>;

pub fn result(gender: &str, probability: f64, emotion: &str, age: u32) -> AnalysisResult {
    AnalysisResult {
        gender: GenderPrediction {
            gender: gender.to_string(),
            probability,
        },
        emotion: EmotionPrediction {
            predicted_emotion: emotion.to_string(),
        },
        age: AgeEstimate { predicted_age: age },
    }
}

pub fn png_file(name: &str) -> SelectedFile {
    let img = image::RgbImage::from_pixel(6, 4, image::Rgb([200, 150, 100]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    SelectedFile::new(name, "image/png", bytes)
}

struct Call {
    upload: FileUpload,
    reply: Option<oneshot::Sender<Outcome>>,
}

/// Backend whose replies are either fixed or released one by one by the test.
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    immediate: Option<Outcome>,
}

impl ScriptedBackend {
    pub fn gated() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            immediate: None,
        }
    }

    pub fn immediate(outcome: Outcome) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            immediate: Some(outcome),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn upload(&self, index: usize) -> FileUpload {
        self.calls.lock().unwrap()[index].upload.clone()
    }

    pub async fn wait_for_calls(&self, n: usize) {
        for _ in 0..10_000 {
            if self.call_count() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("backend saw {} calls, expected {}", self.call_count(), n);
    }

    /// Releases the pending reply for the upload named `file_name`.
    pub fn resolve(&self, file_name: &str, outcome: Outcome) {
        let mut calls = self.calls.lock().unwrap();
        let call = calls
            .iter_mut()
            .find(|c| c.upload.file_name == file_name && c.reply.is_some())
            .unwrap_or_else(|| panic!("no pending call for {}", file_name));
        let _ = call.reply.take().unwrap().send(outcome);
    }
}

impl InferenceBackend for ScriptedBackend {
    fn predict_all(&self, upload: FileUpload) -> BoxFuture<'_, Outcome> {
        if let Some(outcome) = &self.immediate {
            self.calls.lock().unwrap().push(Call { upload, reply: None });
            let outcome = outcome.clone();
            return Box::pin(async move { outcome });
        }
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(Call {
            upload,
            reply: Some(tx),
        });
        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(AnalysisError::network("reply dropped")))
        })
    }
}

#[derive(Default)]
pub struct StreamCounters {
    pub opened: AtomicUsize,
    pub released: AtomicUsize,
    pub live: AtomicUsize,
    pub max_live: AtomicUsize,
}

struct FakeStream {
    width: u32,
    height: u32,
    counters: Arc<StreamCounters>,
    stopped: bool,
}

impl CameraStream for FakeStream {
    fn frame_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Option<VideoFrame> {
        if self.stopped || self.width == 0 || self.height == 0 {
            return None;
        }
        Some(VideoFrame {
            width: self.width,
            height: self.height,
            rgb: vec![90u8; (self.width * self.height * 3) as usize],
        })
    }

    fn stop_tracks(&mut self) {
        assert!(!self.stopped, "tracks stopped twice");
        self.stopped = true;
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Camera platform that counts how many streams are alive at once.
pub struct FakeCamera {
    pub counters: Arc<StreamCounters>,
    width: u32,
    height: u32,
    failure: Mutex<Option<PlatformCameraError>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub last_constraints: Mutex<Option<CameraConstraints>>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::with_dimensions(32, 24)
    }

    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            counters: Arc::new(StreamCounters::default()),
            width,
            height,
            failure: Mutex::new(None),
            gate: Mutex::new(None),
            last_constraints: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, name: &str) {
        *self.failure.lock().unwrap() = Some(PlatformCameraError::new(name, "simulated"));
    }

    /// The next `open_stream` waits until the returned sender fires.
    pub fn hold_next_open(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }
}

impl CameraPlatform for FakeCamera {
    fn open_stream(
        &self,
        constraints: &CameraConstraints,
    ) -> BoxFuture<'_, Result<Box<dyn CameraStream>, PlatformCameraError>> {
        *self.last_constraints.lock().unwrap() = Some(constraints.clone());
        let gate = self.gate.lock().unwrap().take();
        let failure = self.failure.lock().unwrap().clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if let Some(err) = failure {
                return Err(err);
            }
            let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.max_live.fetch_max(live, Ordering::SeqCst);
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            let stream: Box<dyn CameraStream> = Box::new(FakeStream {
                width: self.width,
                height: self.height,
                counters: Arc::clone(&self.counters),
                stopped: false,
            });
            Ok(stream)
        })
    }
}

//! Acquisition Controller: turns file picks, drops and camera captures into
//! image payloads, and owns the camera device lifecycle.
//!
//! Every async resumption (preview encoding, camera negotiation, JPEG
//! encoding) re-checks a generation counter before touching shared state, so
//! a user action taken while the task was suspended always takes precedence.

use crate::config::AnalyzerConfig;
use crate::error::AppError;
use crate::models::camera_types::{CameraState, CameraView};
use crate::models::image_types::{FileUpload, ImagePayload, SelectedFile};
use crate::services::camera::{CameraPlatform, CameraSession};
use crate::services::face_api::InferenceBackend;
use crate::services::image_service;
use crate::session::analysis::{AnalysisSession, SubmissionTicket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";
const CAPTURE_MIME: &str = "image/jpeg";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct ImageSlot {
    /// Generation of the most recent selection; previews for older ones are dropped.
    latest: u64,
    payload: Option<Arc<ImagePayload>>,
}

#[derive(Default)]
struct CameraSlot {
    /// Bumped by every start/stop/capture so in-flight requests can tell they were superseded.
    generation: u64,
    session: Option<CameraSession>,
    view: CameraView,
}

impl CameraSlot {
    fn release(&mut self, reason: &str) {
        self.generation += 1;
        if let Some(session) = self.session.take() {
            session.release();
            tracing::info!(reason, "Camera released");
        }
    }
}

/// The two independent tasks started by one image selection.
pub struct PendingAnalysis {
    pub ticket: SubmissionTicket,
    preview: JoinHandle<()>,
    analysis: JoinHandle<bool>,
}

impl PendingAnalysis {
    /// Waits for both the display preview and the analysis request. Returns
    /// whether the analysis outcome was applied (false if superseded).
    pub async fn settle(self) -> bool {
        if let Err(e) = self.preview.await {
            tracing::warn!(error = %e, "Preview task failed");
        }
        match self.analysis.await {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(error = %e, "Analysis task failed");
                false
            }
        }
    }
}

pub struct AcquisitionController {
    config: AnalyzerConfig,
    analysis: Arc<AnalysisSession>,
    platform: Arc<dyn CameraPlatform>,
    image: Arc<Mutex<ImageSlot>>,
    camera: Mutex<CameraSlot>,
    dragging: AtomicBool,
}

impl AcquisitionController {
    pub fn new(
        config: AnalyzerConfig,
        backend: Arc<dyn InferenceBackend>,
        platform: Arc<dyn CameraPlatform>,
    ) -> Self {
        Self {
            config,
            analysis: Arc::new(AnalysisSession::new(backend)),
            platform,
            image: Arc::new(Mutex::new(ImageSlot::default())),
            camera: Mutex::new(CameraSlot::default()),
            dragging: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Arc<AnalysisSession> {
        &self.analysis
    }

    pub fn selected_image(&self) -> Option<Arc<ImagePayload>> {
        lock(&self.image).payload.clone()
    }

    pub fn camera_view(&self) -> CameraView {
        let slot = lock(&self.camera);
        let mut view = slot.view.clone();
        if let Some(session) = slot.session.as_ref() {
            let (w, h) = session.frame_dimensions();
            view.frame_width = w;
            view.frame_height = h;
        }
        view
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.load(Ordering::Relaxed)
    }

    /// Accepts a user-picked file. Non-image files are rejected without any
    /// state change. Must be called from within a tokio runtime.
    pub fn select_from_file(&self, file: SelectedFile) -> Result<PendingAnalysis, AppError> {
        if !file.is_image() {
            tracing::warn!(file = %file.name, mime = %file.mime_type, "Rejected non-image file");
            return Err(AppError::InvalidInput(format!(
                "{} has MIME type {}",
                file.name, file.mime_type
            )));
        }
        Ok(self.submit(file))
    }

    pub fn handle_drag_enter(&self) {
        self.dragging.store(true, Ordering::Relaxed);
    }

    pub fn handle_drag_over(&self) {
        self.dragging.store(true, Ordering::Relaxed);
    }

    pub fn handle_drag_leave(&self) {
        self.dragging.store(false, Ordering::Relaxed);
    }

    /// Only the first dropped file is used; the rest are ignored.
    pub fn handle_drop(&self, files: Vec<SelectedFile>) -> Result<Option<PendingAnalysis>, AppError> {
        self.dragging.store(false, Ordering::Relaxed);
        let mut files = files.into_iter();
        let Some(first) = files.next() else {
            return Ok(None);
        };
        let ignored = files.count();
        if ignored > 0 {
            tracing::debug!(ignored, "Ignoring extra dropped files");
        }
        self.select_from_file(first).map(Some)
    }

    /// Opens a camera stream, releasing any existing one first.
    pub async fn start_camera(&self) -> Result<(), AppError> {
        let generation = {
            let mut slot = lock(&self.camera);
            slot.release("restart");
            slot.view = CameraView {
                state: CameraState::Requesting,
                ..CameraView::default()
            };
            slot.generation
        };

        tracing::debug!(generation, "Requesting camera stream");
        let result = self.platform.open_stream(&self.config.camera).await;

        let mut slot = lock(&self.camera);
        if slot.generation != generation {
            tracing::debug!(generation, latest = slot.generation, "Camera request superseded");
            if let Ok(stream) = result {
                CameraSession::new(stream).release();
            }
            return Ok(());
        }

        match result {
            Ok(stream) => {
                let session = CameraSession::new(stream);
                let (w, h) = session.frame_dimensions();
                slot.session = Some(session);
                slot.view = CameraView {
                    state: CameraState::Active,
                    error: None,
                    frame_width: w,
                    frame_height: h,
                };
                tracing::info!(generation, width = w, height = h, "Camera active");
                Ok(())
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(name = %e.name, detail = %e.message, ?kind, "Camera access failed");
                slot.view = CameraView {
                    state: CameraState::Errored(kind),
                    error: Some(kind.user_message().to_string()),
                    ..CameraView::default()
                };
                Err(AppError::CameraAccess(kind))
            }
        }
    }

    /// Releases the camera and clears any camera error. No-op when inactive.
    pub fn stop_camera(&self) {
        let mut slot = lock(&self.camera);
        slot.release("stop");
        slot.view = CameraView::default();
    }

    /// Grabs the current frame, submits it as a JPEG and closes the camera.
    ///
    /// The frame is encoded off the async runtime. If the camera is stopped,
    /// restarted or captured again, or another image is submitted, while the
    /// encode runs, the capture is dropped and `AppError::Capture` returned.
    pub async fn capture_photo(&self) -> Result<PendingAnalysis, AppError> {
        let (frame, camera_generation, analysis_generation) = {
            let mut slot = lock(&self.camera);
            let frame = slot.session.as_mut().and_then(|session| {
                let (w, h) = session.frame_dimensions();
                if w == 0 || h == 0 {
                    return None;
                }
                session.grab_frame().filter(|f| !f.is_empty())
            });
            match frame {
                Some(frame) => (frame, slot.generation, self.analysis.current_generation()),
                None => {
                    drop(slot);
                    return Err(self.capture_failed("no active camera frame"));
                }
            }
        };

        let quality = self.config.jpeg_quality;
        let encoded = tokio::task::spawn_blocking(move || image_service::encode_frame_jpeg(&frame, quality))
            .await
            .map_err(|e| AppError::Capture(format!("encoder task failed: {}", e)))
            .and_then(|r| r);
        let jpeg = match encoded {
            Ok(jpeg) => jpeg,
            Err(e) => return Err(self.capture_failed(&e.to_string())),
        };

        let ticket = {
            let mut slot = lock(&self.camera);
            if slot.generation != camera_generation {
                tracing::debug!(
                    generation = camera_generation,
                    latest = slot.generation,
                    "Capture superseded by a camera change"
                );
                return Err(AppError::Capture("camera changed while encoding".into()));
            }
            let mut image = lock(&self.image);
            if self.analysis.current_generation() != analysis_generation {
                tracing::debug!(generation = analysis_generation, "Capture superseded by a newer image");
                return Err(AppError::Capture("a newer image was selected while encoding".into()));
            }
            let ticket = self.begin_submission(&mut image);
            drop(image);
            slot.release("capture");
            slot.view = CameraView::default();
            ticket
        };

        Ok(self.spawn_submission(
            ticket,
            SelectedFile::new(CAPTURE_FILE_NAME, CAPTURE_MIME, jpeg),
        ))
    }

    /// Releases every held device. Also happens implicitly on drop.
    pub fn shutdown(&self) {
        let mut slot = lock(&self.camera);
        slot.release("teardown");
        slot.view = CameraView::default();
        self.dragging.store(false, Ordering::Relaxed);
    }

    fn capture_failed(&self, detail: &str) -> AppError {
        tracing::warn!(detail, "Photo capture failed");
        let err = AppError::Capture(detail.to_string());
        lock(&self.camera).view.error = Some(err.user_message());
        err
    }

    fn submit(&self, file: SelectedFile) -> PendingAnalysis {
        let ticket = self.begin_submission(&mut lock(&self.image));
        self.spawn_submission(ticket, file)
    }

    /// Caller holds the image lock so generation checks and bumps stay atomic.
    fn begin_submission(&self, slot: &mut ImageSlot) -> SubmissionTicket {
        let ticket = self.analysis.begin();
        slot.latest = ticket.generation;
        ticket
    }

    fn spawn_submission(&self, ticket: SubmissionTicket, file: SelectedFile) -> PendingAnalysis {
        tracing::info!(
            generation = ticket.generation,
            file = %file.name,
            mime = %file.mime_type,
            bytes = file.bytes.len(),
            "Image selected"
        );

        let upload = FileUpload::from(&file);
        let session = Arc::clone(&self.analysis);
        let analysis = tokio::spawn(async move { session.run(ticket, upload).await });

        let image = Arc::clone(&self.image);
        let preview = tokio::spawn(async move {
            let built = tokio::task::spawn_blocking(move || build_payload(ticket.generation, file)).await;
            match built {
                Ok(payload) => {
                    let mut slot = lock(&image);
                    if slot.latest == ticket.generation {
                        slot.payload = Some(Arc::new(payload));
                    } else {
                        tracing::debug!(generation = ticket.generation, latest = slot.latest, "Discarding stale preview");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Preview encoding task failed"),
            }
        });

        PendingAnalysis {
            ticket,
            preview,
            analysis,
        }
    }
}

fn build_payload(generation: u64, file: SelectedFile) -> ImagePayload {
    let data_uri = image_service::to_data_uri(&file.mime_type, &file.bytes);
    let dims = image_service::probe_dimensions(&file.bytes);
    ImagePayload {
        generation,
        file_name: file.name,
        mime_type: file.mime_type,
        bytes: file.bytes,
        data_uri,
        width: dims.map(|(w, _)| w),
        height: dims.map(|(_, h)| h),
    }
}

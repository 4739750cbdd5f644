use crate::config::CameraConstraints;
use crate::error::CameraErrorKind;
use crate::models::image_types::VideoFrame;
use futures::future::BoxFuture;

/// Error as reported by the host platform, e.g. `NotAllowedError`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformCameraError {
    pub name: String,
    pub message: String,
}

impl PlatformCameraError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> CameraErrorKind {
        CameraErrorKind::classify(&self.name)
    }
}

/// A live video stream handed out by the platform.
pub trait CameraStream: Send {
    /// Current frame size; `(0, 0)` until the first frame has arrived.
    fn frame_dimensions(&self) -> (u32, u32);

    fn grab_frame(&mut self) -> Option<VideoFrame>;

    /// Stops every track of the stream.
    fn stop_tracks(&mut self);
}

/// Host capability for acquiring camera streams.
pub trait CameraPlatform: Send + Sync {
    fn open_stream(
        &self,
        constraints: &CameraConstraints,
    ) -> BoxFuture<'_, Result<Box<dyn CameraStream>, PlatformCameraError>>;
}

/// Platform for hosts without any camera, e.g. the headless CLI.
pub struct NoCameraPlatform;

impl CameraPlatform for NoCameraPlatform {
    fn open_stream(
        &self,
        _constraints: &CameraConstraints,
    ) -> BoxFuture<'_, Result<Box<dyn CameraStream>, PlatformCameraError>> {
        Box::pin(async {
            Err(PlatformCameraError::new(
                "NotFoundError",
                "no camera is available on this host",
            ))
        })
    }
}

/// Owns one acquired stream and releases it exactly once, either through
/// `release()` or on drop.
pub struct CameraSession {
    stream: Box<dyn CameraStream>,
    released: bool,
}

impl CameraSession {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    pub fn frame_dimensions(&self) -> (u32, u32) {
        self.stream.frame_dimensions()
    }

    pub fn grab_frame(&mut self) -> Option<VideoFrame> {
        self.stream.grab_frame()
    }

    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if !self.released {
            self.stream.stop_tracks();
            self.released = true;
            tracing::debug!("Camera tracks stopped");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

use crate::commands::AppState;
use crate::models::analysis_types::{SessionSnapshot, SessionState};
use crate::models::camera_types::CameraView;
use crate::models::image_types::ImagePayload;
use serde::Serialize;

/// Snapshot of both controllers, ready to serialize for a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub image: Option<ImagePayload>,
    pub camera: CameraView,
    pub session: SessionSnapshot,
    pub dragging: bool,
    /// False while the preview of the latest selection is still being encoded.
    pub image_is_current: bool,
    /// Display text for `Failed`, if any.
    pub error_message: Option<String>,
}

pub fn get_view(state: &AppState) -> ViewState {
    let controller = &state.controller;
    let image = controller.selected_image().map(|p| (*p).clone());
    let session = controller.session().snapshot();
    let image_is_current = image
        .as_ref()
        .map(|p| p.generation == session.generation)
        .unwrap_or(false);
    let error_message = match &session.state {
        SessionState::Failed(err) => Some(err.user_message()),
        _ => None,
    };

    ViewState {
        image,
        camera: controller.camera_view(),
        session,
        dragging: controller.is_dragging(),
        image_is_current,
        error_message,
    }
}

/// Resolves once submission `generation` reaches a terminal state, or once a
/// newer submission replaces it. Returns the snapshot observed at that point.
pub async fn wait_for_result(state: &AppState, generation: u64) -> SessionSnapshot {
    let mut rx = state.controller.session().subscribe();
    let observed = rx
        .wait_for(|snap| snap.generation != generation || snap.state.is_terminal())
        .await
        .map(|snap| (*snap).clone());
    match observed {
        Ok(snap) => snap,
        Err(_) => state.controller.session().snapshot(),
    }
}

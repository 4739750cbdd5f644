use crate::commands::AppState;
use crate::error::AppError;
use crate::models::image_types::SelectedFile;
use crate::services::image_service;
use std::path::Path;

/// Returns the generation of the started submission. Analysis continues in
/// the background; poll `view::get_view` or await `view::wait_for_result`.
pub async fn select_file(state: &AppState, path: &Path) -> Result<u64, AppError> {
    let file = image_service::read_selected_file(path).await?;
    let pending = state.controller.select_from_file(file)?;
    Ok(pending.ticket.generation)
}

/// `None` when nothing was dropped.
pub fn drop_files(state: &AppState, files: Vec<SelectedFile>) -> Result<Option<u64>, AppError> {
    let pending = state.controller.handle_drop(files)?;
    Ok(pending.map(|p| p.ticket.generation))
}

pub fn drag_enter(state: &AppState) {
    state.controller.handle_drag_enter();
}

pub fn drag_over(state: &AppState) {
    state.controller.handle_drag_over();
}

pub fn drag_leave(state: &AppState) {
    state.controller.handle_drag_leave();
}

pub async fn start_camera(state: &AppState) -> Result<(), AppError> {
    state.controller.start_camera().await
}

pub fn stop_camera(state: &AppState) {
    state.controller.stop_camera();
}

pub async fn capture_photo(state: &AppState) -> Result<u64, AppError> {
    let pending = state.controller.capture_photo().await?;
    Ok(pending.ticket.generation)
}

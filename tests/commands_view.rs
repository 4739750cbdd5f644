mod common;

use common::{png_file, result, FakeCamera, ScriptedBackend};
use face_lens_lib::commands::{acquisition, view};
use face_lens_lib::services::camera::NoCameraPlatform;
use face_lens_lib::{AnalysisError, AnalyzerConfig, AppError, AppState, SessionState};
use std::sync::Arc;

#[tokio::test]
async fn test_dropped_file_resolves_and_renders() {
    let expected = result("female", 0.97, "happy", 29);
    let backend = Arc::new(ScriptedBackend::immediate(Ok(expected.clone())));
    let state = AppState::with_backend(AnalyzerConfig::default(), backend, Arc::new(FakeCamera::new()));

    acquisition::drag_enter(&state);
    assert!(view::get_view(&state).dragging);

    let generation = acquisition::drop_files(&state, vec![png_file("face.png")])
        .unwrap()
        .unwrap();
    let snapshot = view::wait_for_result(&state, generation).await;
    assert_eq!(snapshot.generation, generation);
    assert_eq!(snapshot.state, SessionState::Succeeded(expected));

    let rendered = serde_json::to_value(view::get_view(&state)).unwrap();
    assert_eq!(rendered["dragging"], false);
    assert_eq!(rendered["session"]["state"]["status"], "succeeded");
    assert_eq!(rendered["session"]["state"]["detail"]["age"]["predicted_age"], 29);
    assert_eq!(rendered["camera"]["state"]["state"], "inactive");
    assert!(rendered["error_message"].is_null());
}

#[tokio::test]
async fn test_failed_analysis_exposes_display_message() {
    let backend = Arc::new(ScriptedBackend::immediate(Err(AnalysisError::Transport {
        status: 503,
        reason: "Service Unavailable".to_string(),
    })));
    let state = AppState::with_backend(AnalyzerConfig::default(), backend, Arc::new(FakeCamera::new()));

    let generation = acquisition::drop_files(&state, vec![png_file("face.png")])
        .unwrap()
        .unwrap();
    view::wait_for_result(&state, generation).await;

    let rendered = view::get_view(&state);
    assert_eq!(
        rendered.error_message.as_deref(),
        Some("Failed to analyze image: 503 Service Unavailable")
    );
}

#[tokio::test]
async fn test_wait_returns_when_superseded() {
    let backend = Arc::new(ScriptedBackend::gated());
    let state = AppState::with_backend(AnalyzerConfig::default(), backend.clone(), Arc::new(FakeCamera::new()));

    let first = acquisition::drop_files(&state, vec![png_file("one.png")]).unwrap().unwrap();
    let second = acquisition::drop_files(&state, vec![png_file("two.png")]).unwrap().unwrap();
    assert!(second > first);

    let snapshot = view::wait_for_result(&state, first).await;
    assert_eq!(snapshot.generation, second);
    assert_eq!(snapshot.state, SessionState::Analyzing);

    backend.wait_for_calls(2).await;
    backend.resolve("one.png", Ok(result("male", 0.5, "sad", 70)));
    backend.resolve("two.png", Ok(result("female", 0.8, "happy", 30)));
    let snapshot = view::wait_for_result(&state, second).await;
    assert_eq!(snapshot.state, SessionState::Succeeded(result("female", 0.8, "happy", 30)));
}

#[tokio::test]
async fn test_select_file_from_disk() {
    let dir = std::env::temp_dir().join(format!("face-lens-cmd-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("portrait.png");
    std::fs::write(&path, &*png_file("portrait.png").bytes).unwrap();
    let notes = dir.join("notes.txt");
    std::fs::write(&notes, b"not a face").unwrap();

    let expected = result("male", 0.66, "neutral", 45);
    let backend = Arc::new(ScriptedBackend::immediate(Ok(expected.clone())));
    let state = AppState::with_backend(AnalyzerConfig::default(), backend.clone(), Arc::new(FakeCamera::new()));

    let err = acquisition::select_file(&state, &notes).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let generation = acquisition::select_file(&state, &path).await.unwrap();
    let snapshot = view::wait_for_result(&state, generation).await;
    assert_eq!(snapshot.state, SessionState::Succeeded(expected));
    assert_eq!(backend.upload(0).mime_type, "image/png");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_dropping_state_releases_camera() {
    let camera = Arc::new(FakeCamera::new());
    {
        let state = AppState::with_backend(
            AnalyzerConfig::default(),
            Arc::new(ScriptedBackend::gated()),
            camera.clone(),
        );
        acquisition::start_camera(&state).await.unwrap();
        assert_eq!(camera.live(), 1);
        assert_eq!(view::get_view(&state).camera.frame_width, 32);
    }
    assert_eq!(camera.live(), 0);
    assert_eq!(camera.released(), 1);
}

#[tokio::test]
async fn test_camera_commands_round_trip() {
    let camera = Arc::new(FakeCamera::new());
    let backend = Arc::new(ScriptedBackend::immediate(Ok(result("female", 0.9, "happy", 22))));
    let state = AppState::with_backend(AnalyzerConfig::default(), backend, camera.clone());

    acquisition::start_camera(&state).await.unwrap();
    let generation = acquisition::capture_photo(&state).await.unwrap();
    assert_eq!(camera.live(), 0);

    let snapshot = view::wait_for_result(&state, generation).await;
    assert!(snapshot.state.is_terminal());

    acquisition::stop_camera(&state);
    let err = acquisition::capture_photo(&state).await.unwrap_err();
    assert!(matches!(err, AppError::Capture(_)));
}

#[tokio::test]
async fn test_headless_platform_reports_missing_camera() {
    let state = AppState::with_backend(
        AnalyzerConfig::default(),
        Arc::new(ScriptedBackend::gated()),
        Arc::new(NoCameraPlatform),
    );
    let err = acquisition::start_camera(&state).await.unwrap_err();
    assert_eq!(err.user_message(), "No camera found. Please connect a camera and try again.");
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = AnalyzerConfig {
        api_base_url: "not a url".to_string(),
        ..AnalyzerConfig::default()
    };
    let err = AppState::new(config, Arc::new(NoCameraPlatform)).err().unwrap();
    assert!(matches!(err, AppError::Config(_)));
}

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use commands::AppState;
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, AppError, CameraErrorKind, MalformedReason};
pub use models::analysis_types::{AnalysisResult, SessionSnapshot, SessionState};
pub use session::acquisition::AcquisitionController;
pub use session::analysis::AnalysisSession;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global fmt subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "face_lens=info,face_lens_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

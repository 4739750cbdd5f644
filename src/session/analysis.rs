use crate::error::AnalysisError;
use crate::models::analysis_types::{SessionSnapshot, SessionState};
use crate::models::image_types::FileUpload;
use crate::services::face_api::InferenceBackend;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Identifies one submission. Results are only applied while the ticket is
/// still the latest one handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub generation: u64,
}

/// Owns the single current analysis attempt.
///
/// Every submission bumps a generation counter and resets the state to
/// `Analyzing` before any I/O starts. A response is written back only if its
/// generation still matches, so the last submission always wins regardless of
/// the order in which requests complete.
pub struct AnalysisSession {
    backend: Arc<dyn InferenceBackend>,
    state: watch::Sender<SessionSnapshot>,
}

impl AnalysisSession {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { backend, state }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state.clone()
    }

    pub fn current_generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub fn is_current(&self, ticket: SubmissionTicket) -> bool {
        self.current_generation() == ticket.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Starts a new submission: discards any previous result and moves to
    /// `Analyzing` synchronously.
    pub fn begin(&self) -> SubmissionTicket {
        let mut generation = 0;
        self.state.send_modify(|snap| {
            snap.generation += 1;
            snap.state = SessionState::Analyzing;
            generation = snap.generation;
        });
        tracing::debug!(generation, "Analysis started");
        SubmissionTicket { generation }
    }

    /// Performs the request for `ticket` and records its outcome if the ticket
    /// is still current. Returns whether the outcome was applied.
    pub async fn run(&self, ticket: SubmissionTicket, upload: FileUpload) -> bool {
        let file_name = upload.file_name.clone();
        let outcome = AssertUnwindSafe(self.backend.predict_all(upload))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(AnalysisError::network("")));

        let next = match outcome {
            Ok(result) => SessionState::Succeeded(result),
            Err(err) => {
                tracing::warn!(generation = ticket.generation, file = %file_name, error = %err, "Analysis failed");
                SessionState::Failed(err)
            }
        };
        self.apply(ticket, next)
    }

    /// `begin` followed by `run` on a spawned task.
    pub fn submit(self: &Arc<Self>, upload: FileUpload) -> (SubmissionTicket, JoinHandle<bool>) {
        let ticket = self.begin();
        let session = Arc::clone(self);
        let handle = tokio::spawn(async move { session.run(ticket, upload).await });
        (ticket, handle)
    }

    fn apply(&self, ticket: SubmissionTicket, next: SessionState) -> bool {
        let applied = self.state.send_if_modified(|snap| {
            if snap.generation != ticket.generation {
                return false;
            }
            snap.state = next;
            true
        });
        if !applied {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.current_generation(),
                "Discarding stale analysis outcome"
            );
        }
        applied
    }
}

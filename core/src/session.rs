//! Lifecycle of a generation cycle: `Idle -> Submitting -> Ready | Failed`.
//!
//! The single result slot lives in a `watch` channel. Every write goes
//! through the sender, so writers are serialised and readers always see a
//! whole result. Submissions carry an increasing token; a completion whose
//! token is no longer the latest is dropped.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use slidegen_common::{FormFields, GenerationRequest, PreviewImage, ValidationError};

use crate::client::{Artifact, GenerationClient, GenerationOutcome};
use crate::download::DownloadHandoff;
use crate::error::{GenerationError, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    Submitting,
    Ready,
    Failed,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationStatus::Idle => "Idle",
            GenerationStatus::Submitting => "Generating...",
            GenerationStatus::Ready => "Ready",
            GenerationStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Snapshot of the result slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    status: GenerationStatus,
    token: u64,
    artifact: Option<Artifact>,
    preview_images: Vec<PreviewImage>,
    error: Option<GenerationError>,
}

impl GenerationResult {
    fn idle() -> Self {
        Self {
            status: GenerationStatus::Idle,
            token: 0,
            artifact: None,
            preview_images: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn submitting(token: u64) -> Self {
        Self {
            status: GenerationStatus::Submitting,
            token,
            ..Self::idle()
        }
    }

    pub(crate) fn from_outcome(token: u64, outcome: GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Success { artifact, previews } => Self {
                status: GenerationStatus::Ready,
                token,
                artifact: Some(artifact),
                preview_images: previews,
                error: None,
            },
            GenerationOutcome::Failure(error) => Self {
                status: GenerationStatus::Failed,
                token,
                artifact: None,
                preview_images: Vec::new(),
                error: Some(error),
            },
        }
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    /// Token of the submission this result belongs to; `0` before the first one.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn preview_images(&self) -> &[PreviewImage] {
        &self.preview_images
    }

    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }
}

/// Returned by a successful `submit`; resolves once that submission's
/// completion has been applied or discarded.
pub struct SubmissionHandle {
    token: u64,
    task: JoinHandle<GenerationResult>,
    inner: Arc<Inner>,
}

impl SubmissionHandle {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// The slot as it stood right after this submission completed. If a
    /// newer submission superseded it, that is the newer submission's state.
    pub async fn wait(self) -> GenerationResult {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Generation task {} did not complete: {e}", self.token);
                self.inner.state.borrow().result.clone()
            }
        }
    }
}

/// Owns the generation lifecycle and its result slot.
#[derive(Clone)]
pub struct GenerationSession {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn GenerationClient>,
    state: watch::Sender<SessionState>,
}

#[derive(Debug, Clone)]
struct SessionState {
    /// Latest token issued; only its completion may land.
    latest: u64,
    result: GenerationResult,
}

impl GenerationSession {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        let (state, _) = watch::channel(SessionState {
            latest: 0,
            result: GenerationResult::idle(),
        });
        Self {
            inner: Arc::new(Inner { client, state }),
        }
    }

    /// Validate `fields` and start a cycle. Validation failures leave the
    /// slot untouched and never reach the network.
    pub fn submit(&self, fields: &FormFields) -> Result<SubmissionHandle, ValidationError> {
        let request = GenerationRequest::build(fields).inspect_err(|e| {
            tracing::info!("Submission rejected: {e}");
        })?;
        Ok(self.submit_request(request))
    }

    /// Start a cycle with an already validated request. Accepted in every
    /// state; a cycle still in flight is superseded.
    pub fn submit_request(&self, request: GenerationRequest) -> SubmissionHandle {
        let mut token = 0;
        self.inner.state.send_modify(|state| {
            state.latest += 1;
            token = state.latest;
            if state.result.status == GenerationStatus::Submitting {
                tracing::info!("Submission {token} supersedes {}", state.result.token);
            }
            state.result = GenerationResult::submitting(token);
        });
        tracing::info!(
            "Submission {token}: \"{}\" by {} ({} slides, {:?})",
            request.title(),
            request.author(),
            request.slide_count(),
            request.content_mode()
        );

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let client = Arc::clone(&inner.client);
            // A panicking client must still move the slot out of Submitting.
            let call = tokio::spawn(async move { client.generate(&request).await });
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Generation call for submission {token} aborted: {e}");
                    GenerationOutcome::Failure(GenerationError::GenerationFailed(
                        TransportError::Network(format!("generation task aborted: {e}")),
                    ))
                }
            };
            inner.complete(token, outcome);
            inner.state.borrow().result.clone()
        });

        SubmissionHandle {
            token,
            task,
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn snapshot(&self) -> GenerationResult {
        self.inner.state.borrow().result.clone()
    }

    pub fn status(&self) -> GenerationStatus {
        self.inner.state.borrow().result.status
    }

    /// Observe result changes, e.g. to redraw a view.
    pub fn subscribe(&self) -> ResultWatcher {
        ResultWatcher {
            rx: self.inner.state.subscribe(),
        }
    }

    /// Present only once the current cycle is `Ready`.
    pub fn download(&self) -> Option<DownloadHandoff> {
        DownloadHandoff::from_result(&self.inner.state.borrow().result)
    }
}

impl Inner {
    /// Land `outcome` if `token` is still the latest; returns whether it did.
    fn complete(&self, token: u64, outcome: GenerationOutcome) -> bool {
        self.state.send_if_modified(|state| {
            if state.latest != token {
                tracing::info!(
                    "Discarding stale result of submission {token} (latest is {})",
                    state.latest
                );
                return false;
            }
            state.result = GenerationResult::from_outcome(token, outcome);
            match &state.result.error {
                Some(e) => tracing::warn!("Submission {token} failed: {e}"),
                None => tracing::info!(
                    "Submission {token} ready with {} previews",
                    state.result.preview_images.len()
                ),
            }
            true
        })
    }
}

/// Read side of the result slot.
pub struct ResultWatcher {
    rx: watch::Receiver<SessionState>,
}

impl ResultWatcher {
    /// Wait for the next change; `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<GenerationResult> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().result.clone())
    }

    pub fn current(&self) -> GenerationResult {
        self.rx.borrow().result.clone()
    }
}

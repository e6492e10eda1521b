//! Session controller.
//!
//! Each `begin` spawns one session task that walks
//! `ModelsLoading -> AwaitingReference -> CameraActive -> Succeeded | Failed`
//! and reports exactly one outcome. Camera, timer, and comparison loop are
//! all owned by that task's stack: the camera by an [`ActiveCamera`] guard,
//! the timer and loop by a single `select!`, so every exit path (return,
//! error, cancellation) releases all three together.

use crate::comparison::{ComparisonLoop, RecognitionError};
use crate::config::{ConfigError, SessionConfig};
use crate::http::HttpClient;
use crate::outcome::{Callbacks, Outcome, SessionState};
use crate::reference::{ReferenceAcquirer, ReferenceError};
use crate::timer::SessionTimer;
use crate::validation::{ValidationError, ValidationSubmitter};
use faceid_core::{DescriptorExtractor, ExtractorError};
use faceid_media::{ActiveCamera, CameraError, MediaSource};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, watch, OnceCell};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Terminal failure of a session. `Display` is the reason passed to `on_error`.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to load models")]
    ModelLoad(#[source] ExtractorError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error("Failed to access camera")]
    Camera(#[source] CameraError),
    #[error("recognition failed")]
    Recognition(#[from] RecognitionError),
    #[error("Face not recognized within {} seconds", .0.as_secs_f64())]
    Timeout(Duration),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// State shared between the controller and its session tasks.
struct SessionContext {
    config: SessionConfig,
    extractor: Arc<dyn DescriptorExtractor>,
    media: Arc<dyn MediaSource>,
    http: Arc<dyn HttpClient>,
    /// Set once the extractor's models have loaded; a failed load stays unset.
    models: OnceCell<()>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    fn set_state(&self, state: SessionState) {
        tracing::debug!(?state, "session state");
        self.state.send_replace(state);
    }
}

struct ActiveSession {
    id: Uuid,
    /// Dropping the sender cancels the session as well.
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

/// Drives face verification attempts, one at a time.
///
/// Dropping the controller cancels the active session without a callback.
pub struct SessionController {
    ctx: Arc<SessionContext>,
    active: Option<ActiveSession>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        extractor: Arc<dyn DescriptorExtractor>,
        media: Arc<dyn MediaSource>,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state, _) = watch::channel(SessionState::Idle);
        Ok(Self {
            ctx: Arc::new(SessionContext {
                config,
                extractor,
                media,
                http,
                models: OnceCell::new(),
                state,
            }),
            active: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.ctx.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.ctx.state.subscribe()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Start a new attempt, tearing down any session still running.
    ///
    /// A replaced session is cancelled and reports nothing.
    pub async fn begin(&mut self, callbacks: Callbacks) -> Uuid {
        self.teardown().await;

        let id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let ctx = Arc::clone(&self.ctx);
        let span = tracing::info_span!("session", id = %id);
        let task = tokio::spawn(run_to_completion(ctx, cancel_rx, callbacks).instrument(span));

        tracing::info!(session = %id, "session started");
        self.active = Some(ActiveSession {
            id,
            cancel: Some(cancel_tx),
            task: Some(task),
        });
        id
    }

    /// Cancel the active session, if any, and return to `Idle`.
    ///
    /// Resources are released before this returns; no callback fires.
    pub async fn cancel(&mut self) {
        self.teardown().await;
    }

    /// Wait for the active session to finish and return the resulting state.
    pub async fn finished(&mut self) -> SessionState {
        if let Some(task) = self.active.as_mut().and_then(|s| s.task.take()) {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "session task ended abnormally");
            }
        }
        self.state()
    }

    async fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Some(cancel) = active.cancel.take() {
                // Err means the session already finished on its own.
                let _ = cancel.send(());
            }
            if let Some(task) = active.task.take() {
                if let Err(err) = task.await {
                    tracing::warn!(session = %active.id, error = %err, "session task ended abnormally");
                }
            }
            tracing::debug!(session = %active.id, "session torn down");
        }
        self.ctx.set_state(SessionState::Idle);
    }
}

async fn run_to_completion(
    ctx: Arc<SessionContext>,
    cancel: oneshot::Receiver<()>,
    callbacks: Callbacks,
) {
    let result = tokio::select! {
        biased;
        _ = cancel => {
            tracing::info!("session cancelled");
            return;
        }
        result = run_session(&ctx) => result,
    };

    let outcome = match result {
        Ok(token) => {
            tracing::info!("session succeeded");
            ctx.set_state(SessionState::Succeeded);
            Outcome::Success { token }
        }
        Err(err) => {
            let reason = err.to_string();
            tracing::warn!(error = ?err, %reason, "session failed");
            ctx.set_state(SessionState::Failed {
                reason: reason.clone(),
            });
            Outcome::Failure { reason }
        }
    };
    callbacks.dispatch(outcome);
}

/// One attempt, start to token. Returns only after the camera is stopped.
async fn run_session(ctx: &SessionContext) -> Result<String, SessionError> {
    ctx.set_state(SessionState::ModelsLoading);
    ctx.models
        .get_or_try_init(|| async {
            ctx.extractor
                .load_models(&ctx.config.model_dir)
                .await
                .map(|()| tracing::info!(model_dir = %ctx.config.model_dir, "models loaded"))
        })
        .await
        .map_err(SessionError::ModelLoad)?;

    ctx.set_state(SessionState::AwaitingReference);
    let reference = ReferenceAcquirer::new(ctx.http.as_ref(), ctx.extractor.as_ref())
        .acquire(&ctx.config.reference)
        .await?;

    ctx.set_state(SessionState::CameraActive);
    let mut camera = ActiveCamera::acquire(ctx.media.as_ref())
        .await
        .map_err(SessionError::Camera)?;

    let mut timer = SessionTimer::start(ctx.config.timeout());
    let mut comparison = ComparisonLoop::new(
        reference,
        ctx.config.match_threshold,
        ctx.config.tick_interval(),
    );

    let timeout = timer.duration();
    let verdict = tokio::select! {
        biased;
        matched = comparison.run_until_match(ctx.extractor.as_ref(), &mut camera) => {
            matched.map_err(SessionError::from)
        }
        () = timer.expired() => Err(SessionError::Timeout(timeout)),
    };
    // Both the loop and the timer are gone past this point.
    timer.cancel();

    let evidence = match verdict {
        Ok(evidence) => evidence,
        Err(err) => {
            camera.stop();
            return Err(err);
        }
    };

    tracing::info!(
        distance = evidence.distance,
        tick = evidence.tick,
        "match confirmed; submitting validation"
    );
    let token = ValidationSubmitter::new(ctx.http.as_ref())
        .submit(&ctx.config.validation)
        .await;
    camera.stop();

    Ok(token?)
}

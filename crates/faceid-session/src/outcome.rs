/// Observable phase of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ModelsLoading,
    AwaitingReference,
    /// Camera requested or granted; the comparison loop and timer are running.
    CameraActive,
    Succeeded,
    Failed { reason: String },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Succeeded | SessionState::Failed { .. })
    }
}

/// Terminal result of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { token: String },
    Failure { reason: String },
}

type Callback = Box<dyn FnOnce(String) + Send>;

/// Caller-supplied `on_success` / `on_error` pair.
///
/// `dispatch` consumes the pair, so a session can report at most once.
pub struct Callbacks {
    on_success: Callback,
    on_error: Callback,
}

impl Callbacks {
    pub fn new(
        on_success: impl FnOnce(String) + Send + 'static,
        on_error: impl FnOnce(String) + Send + 'static,
    ) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        }
    }

    pub fn dispatch(self, outcome: Outcome) {
        match outcome {
            Outcome::Success { token } => (self.on_success)(token),
            Outcome::Failure { reason } => (self.on_error)(reason),
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

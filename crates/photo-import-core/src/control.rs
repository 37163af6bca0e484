use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Token for cooperative cancellation, shared between the caller and a run.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The run stops before its next file.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Control options for an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportControl {
    /// Checked once per file.
    pub cancel_token: Option<CancellationToken>,
}

impl ImportControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .map_or(false, CancellationToken::is_cancelled)
    }
}

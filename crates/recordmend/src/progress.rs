//! Collaborator seams: coarse progress notifications and cooperative
//! cancellation.
//!
//! The engine runs as a single sequential pass. Progress is reported as
//! coarse string checkpoints rather than percentages, because the work is
//! not reliably divisible in advance. Cancellation is checked at most once
//! per logical record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receiver for coarse progress checkpoints emitted during sniffing and
/// analysis. Implement this to surface engine progress in a UI or log.
pub trait ProgressSink {
    /// Called with a short human-readable label at each checkpoint.
    fn emit(&self, label: &str);
}

/// A sink that discards all progress notifications.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _label: &str) {}
}

/// Clone-able handle for cooperatively cancelling an analysis pass.
///
/// The orchestrator polls the token once per logical record; a cancelled
/// pass discards its partial output artifact and returns
/// [`RecordmendError::Cancelled`](crate::RecordmendError::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from another thread, e.g. a
    /// Ctrl-C handler.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

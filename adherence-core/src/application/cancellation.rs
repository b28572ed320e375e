//! Cancellation signal (§5) — observed at each patient boundary and before
//! each observation write. A cancelled batch leaves already-written patients
//! durable; there is no rollback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation signal, checked rather than forcibly aborted.
pub trait CancellationSignal: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// A signal that never cancels, for callers that don't need one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancellationSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A flag-backed signal a caller can trip from another thread or task.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationSignal for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

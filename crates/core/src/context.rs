//! Cooperative cancellation and progress reporting for long scans.
//!
//! A `ScanContext` is passed by reference into every scanning routine. Loops
//! check it once per iteration; when cancelled they stop and return what they
//! have collected so far.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Receives progress ticks. Implementations must tolerate any call order.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, slot: u32, count: u64);
}

/// Simple atomic counter sink (ignores the slot).
#[derive(Debug, Default)]
pub struct ProgressCounter {
    count: AtomicU64,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ProgressCounter {
    fn advance(&self, _slot: u32, count: u64) {
        self.count.fetch_add(count, Ordering::Relaxed);
    }
}

/// Cancellation token plus an optional progress sink and caller slot.
#[derive(Clone, Default)]
pub struct ScanContext<'a> {
    cancel: CancelToken,
    progress: Option<&'a dyn ProgressSink>,
    slot: u32,
}

impl<'a> ScanContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, sink: &'a dyn ProgressSink, slot: u32) -> Self {
        self.progress = Some(sink);
        self.slot = slot;
        self
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Reports one processed unit (object, entry or stream).
    #[inline]
    pub fn step(&self) {
        if let Some(sink) = self.progress {
            sink.advance(self.slot, 1);
        }
    }
}

impl std::fmt::Debug for ScanContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("cancelled", &self.is_cancelled())
            .field("has_progress", &self.progress.is_some())
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let ctx = ScanContext::new().with_cancel(token.clone());
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_progress_counter_counts_steps() {
        let counter = ProgressCounter::new();
        let ctx = ScanContext::new().with_progress(&counter, 3);
        ctx.step();
        ctx.step();
        assert_eq!(counter.get(), 2);
    }
}

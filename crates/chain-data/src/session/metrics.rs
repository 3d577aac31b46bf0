use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single binder session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionMetrics {
    /// Values stored into the bound value slot.
    pub updates: u64,
    /// Absent deliveries that were ignored.
    pub absent: u64,
    /// Deliveries discarded because the session was closed.
    pub late: u64,
    /// Values stored with an unrecognized shape.
    pub diagnostics: u64,
    /// Rejected calls or subscriptions.
    pub failures: u64,
    /// Cancel handles released.
    pub cancellations: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) updates: AtomicU64,
    pub(crate) absent: AtomicU64,
    pub(crate) late: AtomicU64,
    pub(crate) diagnostics: AtomicU64,
    pub(crate) failures: AtomicU64,
    pub(crate) cancellations: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SessionMetrics {
        SessionMetrics {
            updates: self.updates.load(Ordering::Relaxed),
            absent: self.absent.load(Ordering::Relaxed),
            late: self.late.load(Ordering::Relaxed),
            diagnostics: self.diagnostics.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}

//! Per-path dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct DispatchStats {
    forwarded: AtomicU64,
    rejected: AtomicU64,
    gated: AtomicU64,
    unrouted: AtomicU64,
}

impl DispatchStats {
    #[inline]
    pub(crate) fn forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn gated(&self) {
        self.gated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn unrouted(&self) {
        self.unrouted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            gated: self.gated.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
        }
    }
}

/// Message counts for one dispatch path since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    /// Delivered to a receiver.
    pub forwarded: u64,
    /// Failed validation.
    pub rejected: u64,
    /// Discarded while transmission was disabled.
    pub gated: u64,
    /// Discarded because no receiver was set.
    pub unrouted: u64,
}

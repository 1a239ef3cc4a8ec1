//! Atomic Region - Per-Processor Nesting Counter
//!
//! Brackets a span of code a processor wants the collector to treat as
//! indivisible: entering the outermost span tightens the processor's
//! allocation limit to force a safepoint check soon; leaving it relaxes
//! the limit again, unless a signal arrived while the span was open, in
//! which case the limit stays pinned at zero so the very next check
//! trips. Mirrors `beginAtomic`/`endAtomic`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// How much slop to carve out of the allocation limit while inside an
/// atomic region, forcing the next allocation to hit the limit and
/// check in. Mirrors the original's `limitPlusSlop - slop` tightening.
const DEFAULT_SLOP: usize = 4096;

/// One processor's atomic-region nesting state. Not `Clone`: a
/// processor owns exactly one of these for its own lifetime.
pub struct AtomicRegion {
    depth: AtomicUsize,
    signal_pending: AtomicBool,
    limit_plus_slop: AtomicUsize,
    limit: AtomicUsize,
    slop: usize,
}

impl AtomicRegion {
    pub fn new(limit_plus_slop: usize) -> Self {
        AtomicRegion::with_slop(limit_plus_slop, DEFAULT_SLOP)
    }

    pub fn with_slop(limit_plus_slop: usize, slop: usize) -> Self {
        AtomicRegion {
            depth: AtomicUsize::new(0),
            signal_pending: AtomicBool::new(false),
            limit_plus_slop: AtomicUsize::new(limit_plus_slop),
            limit: AtomicUsize::new(limit_plus_slop.saturating_sub(slop)),
            slop,
        }
    }

    /// Enter one more level of atomic nesting. Mirrors `beginAtomic`.
    pub fn begin(&self) {
        let previous_depth = self.depth.fetch_add(1, Ordering::AcqRel);
        if previous_depth == 0 {
            let limit_plus_slop = self.limit_plus_slop.load(Ordering::Acquire);
            self.limit
                .store(limit_plus_slop.saturating_sub(self.slop), Ordering::Release);
        }
    }

    /// Leave one level of atomic nesting. Mirrors `endAtomic`.
    ///
    /// # Panics
    /// Panics on an unbalanced `end()` with no matching `begin()` —
    /// this is always a caller bug, never a runtime condition.
    pub fn end(&self) {
        let previous_depth = self.depth.fetch_sub(1, Ordering::AcqRel);
        assert!(previous_depth > 0, "endAtomic without a matching beginAtomic");

        if previous_depth == 1 {
            if self.signal_pending.swap(false, Ordering::AcqRel) {
                self.limit.store(0, Ordering::Release);
            } else {
                let limit_plus_slop = self.limit_plus_slop.load(Ordering::Acquire);
                self.limit.store(limit_plus_slop, Ordering::Release);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn is_in_atomic(&self) -> bool {
        self.depth() > 0
    }

    /// Record that a signal arrived while a region might be open. If
    /// the processor is currently outside any region the limit is
    /// pinned immediately; otherwise it's deferred until `end()` drops
    /// back to depth zero.
    pub fn signal(&self) {
        if self.is_in_atomic() {
            self.signal_pending.store(true, Ordering::Release);
        } else {
            self.limit.store(0, Ordering::Release);
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::Acquire)
    }

    pub fn set_limit_plus_slop(&self, limit_plus_slop: usize) {
        self.limit_plus_slop.store(limit_plus_slop, Ordering::Release);
        if !self.is_in_atomic() {
            self.limit.store(limit_plus_slop, Ordering::Release);
        }
    }
}

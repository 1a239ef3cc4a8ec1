//! Stats Module - Substrate Performance Monitoring
//!
//! Atomic counters the chunk substrate, free-chunk pool, forwarding
//! walk, and coordinator update as they run. Nothing here drives
//! behavior; it only observes it, for production monitoring and
//! debugging.

pub mod histogram;

pub use histogram::Histogram;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Central counter set for one substrate instance.
pub struct SubstrateStats {
    chunks_mapped: AtomicU64,
    chunks_split: AtomicU64,
    chunks_coalesced: AtomicU64,
    chunks_freed: AtomicU64,

    bytes_copied: AtomicU64,
    objects_copied: AtomicU64,
    stacks_copied: AtomicU64,

    bsp_rounds: AtomicU64,
    critical_sections_entered: AtomicU64,

    copy_bytes_histogram: Arc<Histogram>,
}

impl SubstrateStats {
    pub fn new() -> Self {
        SubstrateStats {
            chunks_mapped: AtomicU64::new(0),
            chunks_split: AtomicU64::new(0),
            chunks_coalesced: AtomicU64::new(0),
            chunks_freed: AtomicU64::new(0),
            bytes_copied: AtomicU64::new(0),
            objects_copied: AtomicU64::new(0),
            stacks_copied: AtomicU64::new(0),
            bsp_rounds: AtomicU64::new(0),
            critical_sections_entered: AtomicU64::new(0),
            copy_bytes_histogram: Arc::new(Histogram::new()),
        }
    }

    pub fn record_chunk_mapped(&self) {
        self.chunks_mapped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk_split(&self) {
        self.chunks_split.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk_coalesced(&self) {
        self.chunks_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk_freed(&self) {
        self.chunks_freed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one forwarding-walk tracing sample (§4.H fires this every
    /// 1024 objects, not per object).
    pub fn record_tracing_sample(&self, bytes_copied: u64, objects_copied: u64, stacks_copied: u64) {
        self.bytes_copied.store(bytes_copied, Ordering::Relaxed);
        self.objects_copied.store(objects_copied, Ordering::Relaxed);
        self.stacks_copied.store(stacks_copied, Ordering::Relaxed);
        self.copy_bytes_histogram.record(bytes_copied);
    }

    pub fn record_bsp_round(&self) {
        self.bsp_rounds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_critical_section_entered(&self) {
        self.critical_sections_entered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn copy_bytes_histogram(&self) -> Arc<Histogram> {
        self.copy_bytes_histogram.clone()
    }

    pub fn summary(&self) -> SubstrateSummary {
        SubstrateSummary {
            chunks_mapped: self.chunks_mapped.load(Ordering::Relaxed),
            chunks_split: self.chunks_split.load(Ordering::Relaxed),
            chunks_coalesced: self.chunks_coalesced.load(Ordering::Relaxed),
            chunks_freed: self.chunks_freed.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            objects_copied: self.objects_copied.load(Ordering::Relaxed),
            stacks_copied: self.stacks_copied.load(Ordering::Relaxed),
            bsp_rounds: self.bsp_rounds.load(Ordering::Relaxed),
            critical_sections_entered: self.critical_sections_entered.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.chunks_mapped.store(0, Ordering::Relaxed);
        self.chunks_split.store(0, Ordering::Relaxed);
        self.chunks_coalesced.store(0, Ordering::Relaxed);
        self.chunks_freed.store(0, Ordering::Relaxed);
        self.bytes_copied.store(0, Ordering::Relaxed);
        self.objects_copied.store(0, Ordering::Relaxed);
        self.stacks_copied.store(0, Ordering::Relaxed);
        self.bsp_rounds.store(0, Ordering::Relaxed);
        self.critical_sections_entered.store(0, Ordering::Relaxed);
        self.copy_bytes_histogram.clear();
    }
}

impl Default for SubstrateStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SubstrateSummary {
    pub chunks_mapped: u64,
    pub chunks_split: u64,
    pub chunks_coalesced: u64,
    pub chunks_freed: u64,
    pub bytes_copied: u64,
    pub objects_copied: u64,
    pub stacks_copied: u64,
    pub bsp_rounds: u64,
    pub critical_sections_entered: u64,
}

/// Global counter set the substrate's own modules (`chunk`, `pool`,
/// `sync`, `forward`) update directly, mirroring `logging`'s
/// `GLOBAL_LOGGER`. Callers that want an isolated counter set for a
/// single run still construct their own `SubstrateStats` and ignore
/// this one.
lazy_static::lazy_static! {
    static ref GLOBAL_STATS: SubstrateStats = SubstrateStats::new();
}

pub fn global() -> &'static SubstrateStats {
    &GLOBAL_STATS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reflects_recorded_events() {
        let stats = SubstrateStats::new();
        stats.record_chunk_mapped();
        stats.record_chunk_split();
        stats.record_chunk_split();
        stats.record_bsp_round();
        stats.record_critical_section_entered();
        stats.record_tracing_sample(4096, 128, 2);

        let summary = stats.summary();
        assert_eq!(summary.chunks_mapped, 1);
        assert_eq!(summary.chunks_split, 2);
        assert_eq!(summary.bsp_rounds, 1);
        assert_eq!(summary.critical_sections_entered, 1);
        assert_eq!(summary.bytes_copied, 4096);
        assert_eq!(summary.objects_copied, 128);
        assert_eq!(summary.stacks_copied, 2);
    }

    #[test]
    fn reset_clears_every_counter() {
        let stats = SubstrateStats::new();
        stats.record_chunk_mapped();
        stats.reset();
        assert_eq!(stats.summary().chunks_mapped, 0);
    }

    #[test]
    fn global_is_a_single_shared_instance() {
        let before = global().summary().chunks_mapped;
        global().record_chunk_mapped();
        assert_eq!(global().summary().chunks_mapped, before + 1);
    }
}

//! Shared fixtures for the integration test suites.
//!
//! Trimmed down to what this crate's scenario tests actually need: a
//! `HeapConfig`-backed chunk substrate fixture, and a harness that spins
//! up a `Coordinator` plus one `ProcessorHandle` per simulated processor,
//! already past the initialization barrier.

use fgc::chunk::directory::ChunkDirectory;
use fgc::config::HeapConfig;
use fgc::pool::FreeChunkPool;
use fgc::sync::{Coordinator, ProcessorHandle};
use std::sync::Arc;
use std::thread;

/// A chunk substrate wired up from a validated `HeapConfig`, ready for a
/// test to pull chunks from.
pub struct SubstrateFixture {
    pub config: HeapConfig,
    pub directory: Arc<ChunkDirectory>,
    pub pool: FreeChunkPool,
}

impl SubstrateFixture {
    pub fn new() -> Self {
        let config = HeapConfig::default();
        config.validate().expect("default HeapConfig must validate");

        let directory = Arc::new(ChunkDirectory::new());
        let pool = FreeChunkPool::new(config.block_size, config.alloc_size, directory.clone());

        SubstrateFixture { config, directory, pool }
    }
}

/// Spin up a `Coordinator` for `num_processors` simulated processors and
/// run every one of them through the initialization barrier, returning
/// handles ready for critical-section or BSP use.
pub fn spawn_initialized_processors(num_processors: usize) -> (Arc<Coordinator>, Vec<ProcessorHandle>) {
    let coordinator = Coordinator::new(num_processors);
    let handles: Vec<_> =
        (0..num_processors).map(|ordinal| ProcessorHandle::new(coordinator.clone(), ordinal)).collect();

    let threads: Vec<_> =
        handles.clone().into_iter().map(|handle| thread::spawn(move || handle.signal_initialization())).collect();
    for t in threads {
        t.join().unwrap();
    }

    (coordinator, handles)
}

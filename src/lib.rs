//! # fgc - Chunked Hierarchical-Heap Memory Substrate
//!
//! `fgc` is the memory substrate underneath a parallel generational
//! collector for a compiled functional-language runtime: block-aligned
//! **chunks**, organized into per-level **chunk lists** headed by a
//! union-find forest, plus the multi-processor synchronization
//! primitives (init barrier, rotating critical section, BSP pipeline
//! coordinator) that let many processors share it safely.
//!
//! This crate provides no collection policy of its own — no marking,
//! no generation promotion rules, no allocation-site heuristics. It
//! gives an external collector the building blocks those policies are
//! built from: where chunks come from, how they're organized and
//! merged, how a live object's pointer resolves back to its owning
//! heap, and how many processors stay synchronized while walking it.
//!
//! ## Overview
//!
//! - **Chunk substrate** ([`chunk`], [`mapper`], [`pool`]): block-aligned
//!   memory regions with in-band headers, organized into
//!   strictly-descending per-heap level lists, path-compressed via
//!   union-find so any chunk resolves to its level head in near-constant
//!   time. A [`chunk::directory::ChunkDirectory`] maps any address back
//!   to its chunk; a per-processor [`pool::FreeChunkPool`] recycles
//!   chunks without a lock.
//! - **Hierarchical heaps** ([`heap`]): an opaque external collaborator
//!   handle ([`heap::HierarchicalHeap`]) addressed through
//!   [`heap::get_objptr_info`], [`heap::get_objptr_heap_lock`], and
//!   [`heap::is_objptr_in_to_space`].
//! - **Iteration & forwarding** ([`forward`]): walks live objects across
//!   a chunk list or a whole level list, exposing [`forward::ObjectModel`]
//!   and [`forward::TracingSink`] as the seams an external mark/evacuate
//!   policy plugs into.
//! - **Atomic regions** ([`atomic_region`]): per-processor nesting
//!   counter bracketing spans the collector must treat as indivisible.
//! - **Multi-processor synchronization** ([`sync`]): a single explicitly
//!   constructed [`sync::Coordinator`], addressed per processor through
//!   a [`sync::ProcessorHandle`], backing the initialization barrier,
//!   the rotating critical section, and the BSP pipeline coordinator.
//!
//! ## Quick Start
//!
//! ```rust
//! use fgc::config::HeapConfig;
//! use fgc::chunk::directory::ChunkDirectory;
//! use fgc::pool::FreeChunkPool;
//! use std::sync::Arc;
//!
//! let config = HeapConfig::default();
//! config.validate().unwrap();
//!
//! let directory = Arc::new(ChunkDirectory::new());
//! let mut pool = FreeChunkPool::new(config.block_size, config.alloc_size, directory);
//!
//! let chunk = pool.get_free_chunk(256).unwrap();
//! unsafe {
//!     assert!(chunk.as_ref().bytes_free() >= 256);
//! }
//! ```
//!
//! ## Concurrency model
//!
//! N processors run in parallel, each addressed by ordinal `0..N`. The
//! free-chunk pool is per-processor and needs no lock; a level list and
//! its chunks are exclusively owned by whichever heap's external lock
//! the caller already holds. All cross-processor coordination goes
//! through one [`sync::Coordinator`] value and bounded busy-waiting —
//! there is no blocking scheduler inside this crate.
//!
//! ## Modules
//!
//! - [`atomic_region`]: per-processor atomic-region nesting counter
//! - [`chunk`]: chunk headers, per-level chunk lists, union-find,
//!   splitting/coalescing, and the address-to-chunk directory
//! - [`config`]: substrate tuning parameters and validation
//! - [`error`]: error types for all substrate operations
//! - [`forward`]: iteration and object-pointer forwarding hook
//! - [`heap`]: the hierarchical-heap external collaborator
//! - [`logging`]: substrate event logging and tracing
//! - [`mapper`]: block-aligned anonymous memory mapping
//! - [`pool`]: per-processor free-chunk pool
//! - [`stats`]: substrate counters and histograms
//! - [`sync`]: processor registry, rotating critical section, BSP
//!   coordinator
//! - [`util`]: alignment and atomic helpers
//!
pub mod atomic_region;
pub mod chunk;
pub mod config;
pub mod error;
pub mod forward;
pub mod heap;
pub mod logging;
pub mod mapper;
pub mod pool;
pub mod stats;
pub mod sync;
pub mod util;

pub use config::HeapConfig;
pub use error::{FgcError, Result};
pub use heap::HierarchicalHeap;
pub use sync::{Coordinator, ProcessorHandle};

/// Crate version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

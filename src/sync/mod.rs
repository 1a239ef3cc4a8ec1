//! Multi-Processor Synchronization Core
//!
//! A [`Coordinator`] is the single explicitly constructed value backing
//! three primitives every processor shares: the initialization barrier
//! (§ processor registry), the rotating critical section, and the BSP
//! pipeline coordinator. Each processor addresses it through a
//! [`ProcessorHandle`] carrying its own ordinal, never by looking
//! itself up.

pub mod bsp;
pub mod critical;
pub mod registry;

pub use bsp::{BspOutcome, BspState};
pub use critical::CriticalSectionGuard;
pub use registry::{Coordinator, PipelineFn, ProcessorHandle};

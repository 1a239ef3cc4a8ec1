//! Util Module - Shared Utilities
//!
//! Alignment and atomic helpers used throughout the substrate.

pub mod alignment;
pub mod atomic;
pub mod debug;

pub use alignment::Alignment;
pub use atomic::AtomicUtils;

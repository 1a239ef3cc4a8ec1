//! Block Mapper - Aligned OS Memory Mapping
//!
//! The only memory source for fresh chunks: requests one extra block
//! from the OS so the returned region can be aligned up to a block
//! boundary, the way `mmapNewChunk` does. The waste between the raw
//! mapping and the aligned region is never reclaimed — it stays mapped
//! but outside any chunk's header, exactly as the original leaves it.

use crate::error::{FgcError, Result};
use crate::util::Alignment;
use memmap2::MmapOptions;
use std::ptr::NonNull;

/// Maps fresh, block-aligned regions from anonymous memory.
pub struct BlockMapper {
    block_size: usize,
}

impl BlockMapper {
    pub fn new(block_size: usize) -> Self {
        BlockMapper { block_size }
    }

    /// Map a fresh region of exactly `width_bytes`, block-aligned at both
    /// ends. `width_bytes` must already be a multiple of the configured
    /// block size. Mirrors `mapBlocks`.
    ///
    /// Returns `Err` on mapping failure; this is non-fatal to the caller,
    /// who is expected to fall back to reclamation (§4.A).
    pub fn map_blocks(&self, width_bytes: usize) -> Result<NonNull<u8>> {
        debug_assert!(Alignment::is_aligned(width_bytes, self.block_size));

        let raw_len = width_bytes + self.block_size;
        let mmap = MmapOptions::new()
            .len(raw_len)
            .map_anon()
            .map_err(|e| FgcError::ChunkMappingFailed { reason: e.to_string() })?;

        let raw_base = mmap.as_ptr() as usize;
        let aligned_base = Alignment::align_up(raw_base, self.block_size);
        debug_assert!(aligned_base + width_bytes <= raw_base + raw_len);

        // The mapping must outlive this call; chunks carved from it are
        // addressed through raw pointers with no owning Rust value.
        std::mem::forget(mmap);

        NonNull::new(aligned_base as *mut u8)
            .ok_or_else(|| FgcError::ChunkMappingFailed { reason: "aligned base was null".into() })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

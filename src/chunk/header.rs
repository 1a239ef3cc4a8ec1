//! Chunk Header - In-Band Metadata for Heap Chunks
//!
//! Chunk Header Layout
//! ┌─────────────────────────────────────────┐
//! │ start / limit / frontier (3 * usize)    │
//! ├─────────────────────────────────────────┤
//! │ level_head (raw pointer, union-find)    │
//! ├─────────────────────────────────────────┤
//! │ next_chunk / prev_chunk                 │  <- siblings within one level head
//! ├─────────────────────────────────────────┤
//! │ next_adjacent / prev_adjacent           │  <- physical memory neighbors
//! ├─────────────────────────────────────────┤
//! │ might_contain_multiple_objects (bool)   │
//! └─────────────────────────────────────────┘
//!
//! The header sits at the very start of the chunk's own memory (an
//! "in-band" header): `start` always equals the header's own address.
//! `frontier` is the bump pointer for whatever lives above the header;
//! `limit` is one past the last usable byte.

use crate::chunk::list::LevelHead;
use std::ptr::NonNull;

/// Poison byte written over a chunk's unused region in debug builds,
/// mirroring `HM_initializeChunk`'s `0xAE` fill.
pub const UNUSED_POISON: u8 = 0xAE;

/// Poison byte written over a chunk's body when it is returned to the
/// free pool, mirroring `HM_freeChunks`'s `0xBF` fill.
pub const FREED_POISON: u8 = 0xBF;

/// In-band header placed at the start of every chunk.
///
/// `ChunkHeader` is not `Send`/`Sync` by itself: a hierarchical heap's
/// chunks are mutated by whichever processor currently owns that heap,
/// with cross-processor ordering supplied externally by the
/// [`crate::sync`] primitives, not by this type.
#[repr(C)]
pub struct ChunkHeader {
    /// Address of this chunk, i.e. the address of this header.
    pub start: usize,
    /// Bump-allocation frontier; always in `[start + header size, limit]`.
    pub frontier: usize,
    /// One past the last usable byte of this chunk.
    pub limit: usize,
    /// Immediate union-find parent. Not necessarily the level head root;
    /// resolve via [`crate::chunk::union_find::find_head`].
    pub level_head: NonNull<LevelHead>,
    /// Next chunk belonging to the same level head.
    pub next_chunk: Option<NonNull<ChunkHeader>>,
    /// Previous chunk belonging to the same level head.
    pub prev_chunk: Option<NonNull<ChunkHeader>>,
    /// Next chunk physically adjacent in the backing mapping, regardless
    /// of level head membership.
    pub next_adjacent: Option<NonNull<ChunkHeader>>,
    /// Previous chunk physically adjacent in the backing mapping.
    pub prev_adjacent: Option<NonNull<ChunkHeader>>,
    /// Whether this chunk might hold more than one object. Cleared by
    /// pools that know a chunk was carved for a single large object.
    pub might_contain_multiple_objects: bool,
}

/// Size of the in-band header itself, rounded to `usize` alignment.
pub const HEADER_SIZE: usize = std::mem::size_of::<ChunkHeader>();

impl ChunkHeader {
    /// Initialize a fresh header in place at `start..end`.
    ///
    /// Mirrors `HM_initializeChunk`: the frontier starts right after the
    /// header, all links are null, and `might_contain_multiple_objects`
    /// starts true. `level_head` must be filled in by the caller (the
    /// header is written before its owning level head is necessarily
    /// known, exactly as in `mmapNewChunk`/`splitChunkAt`).
    ///
    /// # Safety
    /// `start..end` must be valid, writable memory at least `HEADER_SIZE`
    /// bytes long, and the caller must not alias it while the returned
    /// header is live.
    pub unsafe fn initialize(
        start: NonNull<u8>,
        end: usize,
        level_head: NonNull<LevelHead>,
    ) -> NonNull<ChunkHeader> {
        let header_ptr = start.as_ptr() as *mut ChunkHeader;
        let header = ChunkHeader {
            start: start.as_ptr() as usize,
            frontier: start.as_ptr() as usize + HEADER_SIZE,
            limit: end,
            level_head,
            next_chunk: None,
            prev_chunk: None,
            next_adjacent: None,
            prev_adjacent: None,
            might_contain_multiple_objects: true,
        };
        std::ptr::write(header_ptr, header);

        #[cfg(debug_assertions)]
        {
            let body_start = start.as_ptr() as usize + HEADER_SIZE;
            if end > body_start {
                std::ptr::write_bytes(body_start as *mut u8, UNUSED_POISON, end - body_start);
            }
        }

        NonNull::new_unchecked(header_ptr)
    }

    /// Size of this chunk in bytes: `limit - start`.
    pub fn size(&self) -> usize {
        self.limit - self.start
    }

    /// First usable byte of the chunk body (just past the header).
    pub fn body_start(&self) -> usize {
        self.start + HEADER_SIZE
    }

    /// Bytes still free between the frontier and the limit.
    pub fn bytes_free(&self) -> usize {
        self.limit.saturating_sub(self.frontier)
    }

    /// Update the frontier after a bump allocation.
    ///
    /// Mirrors `HM_updateChunkValues`'s assertion that the frontier only
    /// ever moves forward within `[old frontier, limit]`.
    pub fn set_frontier(&mut self, frontier: usize) {
        debug_assert!(frontier >= self.frontier && frontier <= self.limit);
        self.frontier = frontier;
    }

    /// Reset the chunk to an empty, reusable state: frontier rewound to
    /// the body start and `might_contain_multiple_objects` restored.
    /// Used when a chunk is unlinked and returned to the free pool.
    pub fn reset(&mut self) {
        self.frontier = self.body_start();
        self.might_contain_multiple_objects = true;
    }

    /// Check the basic per-chunk invariants `HM_assertChunkInvariants`
    /// enforces: ordering of start/frontier/limit and adjacency
    /// consistency.
    pub fn assert_invariants(&self) {
        debug_assert!(self.start <= self.frontier);
        debug_assert!(self.frontier <= self.limit);
        unsafe {
            if let Some(next) = self.next_adjacent {
                debug_assert_eq!(next.as_ref().start, self.limit);
            }
            if let Some(prev) = self.prev_adjacent {
                debug_assert_eq!(prev.as_ref().limit, self.start);
            }
        }
    }
}

//! Split and Coalesce - Dividing and Rejoining Chunks
//!
//! [`split_at`] is the single primitive behind both split directions:
//! it always shrinks the chunk passed in down to `[start, split_point)`
//! and creates a brand-new sibling chunk covering
//! `[split_point, old_limit)`, rewiring both the chunk-list
//! (`next_chunk`/`prev_chunk`) and physical-adjacency
//! (`next_adjacent`/`prev_adjacent`) links on both sides, and assigning
//! the new chunk to the same (path-compressed) level head.
//!
//! [`split_for_request`] and [`split_front_of_chunk`] differ only in
//! where they place `split_point`, which determines which of the two
//! resulting pieces is "the new one the caller wanted":
//! - `split_for_request` carves a fresh, exactly-sized piece off the
//!   *end* of a larger chunk and hands back the new piece.
//! - `split_front_of_chunk` carves the *front* of a chunk down to
//!   exactly the requested size and hands back the new piece as the
//!   leftover residual, leaving the original (now-shrunk) chunk as the
//!   one that satisfies the request.

use crate::chunk::header::{ChunkHeader, HEADER_SIZE};
use crate::chunk::union_find::find_head_compress;
use crate::logging::{log_event, GcEvent};
use crate::stats;
use crate::util::Alignment;
use std::ptr::NonNull;

/// Split `chunk` at `split_point`, shrinking it to `[start, split_point)`
/// and returning a new chunk covering `[split_point, old_limit)`.
/// Mirrors `splitChunkAt`.
///
/// # Safety
/// `split_point` must lie strictly between `chunk.start` and
/// `chunk.limit`, and `chunk` must be a valid, currently-linked chunk.
pub unsafe fn split_at(mut chunk: NonNull<ChunkHeader>, split_point: usize) -> NonNull<ChunkHeader> {
    debug_assert!(split_point > chunk.as_ref().start && split_point < chunk.as_ref().limit);

    let mut level_head = find_head_compress(chunk.as_ref().level_head);
    let old_limit = chunk.as_ref().limit;

    chunk.as_mut().limit = split_point;

    let new_start = NonNull::new(split_point as *mut u8).expect("split_point is non-null");
    let mut new_chunk = ChunkHeader::initialize(new_start, old_limit, level_head);

    new_chunk.as_mut().next_chunk = chunk.as_ref().next_chunk;
    new_chunk.as_mut().prev_chunk = Some(chunk);
    match chunk.as_ref().next_chunk {
        Some(mut next) => next.as_mut().prev_chunk = Some(new_chunk),
        None => level_head.as_mut().last_chunk = Some(new_chunk),
    }
    chunk.as_mut().next_chunk = Some(new_chunk);
    if level_head.as_ref().last_chunk == Some(chunk) {
        level_head.as_mut().last_chunk = Some(new_chunk);
    }

    new_chunk.as_mut().next_adjacent = chunk.as_ref().next_adjacent;
    new_chunk.as_mut().prev_adjacent = Some(chunk);
    if let Some(mut next_adj) = chunk.as_ref().next_adjacent {
        next_adj.as_mut().prev_adjacent = Some(new_chunk);
    }
    chunk.as_mut().next_adjacent = Some(new_chunk);

    log_event(GcEvent::ChunkSplit {
        address: chunk.as_ref().start,
        split_point,
        retained_size: chunk.as_ref().size(),
    });
    stats::global().record_chunk_split();

    new_chunk
}

/// Carve a fresh chunk of exactly `bytes_requested` usable bytes off the
/// *end* of `chunk`, returning the new (end) piece. Returns `None` if
/// `chunk` doesn't have that much unused room. Mirrors `HM_splitChunk`.
///
/// # Safety
/// `chunk` must be a valid, currently-linked chunk.
pub unsafe fn split_for_request(
    chunk: NonNull<ChunkHeader>,
    bytes_requested: usize,
    block_size: usize,
) -> Option<NonNull<ChunkHeader>> {
    let total_size = Alignment::align_up(bytes_requested + HEADER_SIZE, block_size);
    let split_point = chunk.as_ref().limit.checked_sub(total_size)?;
    if split_point < chunk.as_ref().frontier {
        return None;
    }
    Some(split_at(chunk, split_point))
}

/// Shrink `chunk` down to exactly cover its already-used frontier plus
/// `bytes_requested`, returning the new (residual) tail piece. Returns
/// `None` if the request would consume the whole chunk (no residual to
/// split off). Mirrors `HM_splitChunkFront`.
///
/// # Safety
/// `chunk` must be a valid, currently-linked chunk.
pub unsafe fn split_front_of_chunk(
    chunk: NonNull<ChunkHeader>,
    bytes_requested: usize,
    block_size: usize,
) -> Option<NonNull<ChunkHeader>> {
    let split_point = Alignment::align_up(chunk.as_ref().frontier + bytes_requested, block_size);
    if split_point >= chunk.as_ref().limit {
        return None;
    }
    Some(split_at(chunk, split_point))
}

/// Merge `right` into `left`, requiring that `right` is exactly `left`'s
/// physical successor and that both are freshly reset (unused) chunks.
/// Mirrors `HM_coalesceChunks`.
///
/// # Safety
/// Both chunks must be unlinked from any chunk list, `left.next_adjacent
/// == Some(right)`, and both must have `frontier == start + HEADER_SIZE`.
pub unsafe fn coalesce(mut left: NonNull<ChunkHeader>, right: NonNull<ChunkHeader>) -> NonNull<ChunkHeader> {
    debug_assert_eq!(left.as_ref().next_adjacent, Some(right));
    debug_assert_eq!(left.as_ref().frontier, left.as_ref().start + HEADER_SIZE);
    debug_assert_eq!(right.as_ref().frontier, right.as_ref().start + HEADER_SIZE);

    left.as_mut().limit = right.as_ref().limit;
    left.as_mut().next_adjacent = right.as_ref().next_adjacent;
    if let Some(mut next) = right.as_ref().next_adjacent {
        next.as_mut().prev_adjacent = Some(left);
    }

    log_event(GcEvent::ChunkCoalesced {
        left: left.as_ref().start,
        right: right.as_ref().start,
        merged_size: left.as_ref().size(),
    });
    stats::global().record_chunk_coalesced();

    left
}

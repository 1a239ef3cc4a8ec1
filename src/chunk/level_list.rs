//! Level List - Strictly-Descending Chains of Level Heads
//!
//! A heap's level list is a singly-linked chain of [`LevelHead`]s,
//! threaded through `next_head`, with strictly descending `level`
//! numbers: the head of the list is the heap's highest (youngest)
//! level, and each step down is an older generation.

use crate::chunk::header::{FREED_POISON, HEADER_SIZE};
use crate::chunk::list::{append_chunk, append_chunk_list, unlink_chunk, ChunkListOwner, LevelHead};
use crate::chunk::split::coalesce;
use crate::chunk::union_find::find_head_compress;
use crate::logging::{log_event, GcEvent};
use crate::stats;
use std::ptr::NonNull;

/// Highest level present in `level_list`, or `None` if it is empty.
/// Mirrors `HM_getHighestLevel`'s `CHUNK_INVALID_LEVEL` sentinel, spelled
/// idiomatically as an `Option`.
pub unsafe fn highest_level(level_list: Option<NonNull<LevelHead>>) -> Option<u32> {
    level_list.map(|head| head.as_ref().level)
}

/// Total chunk bytes owned by the level head at exactly `level`, or 0 if
/// no such level head exists. A deliberate linear scan: the number of
/// live levels in one heap is small. Mirrors `HM_getLevelSize`.
pub unsafe fn level_size(level_list: Option<NonNull<LevelHead>>, level: u32) -> usize {
    let mut cursor = level_list;
    while let Some(node) = cursor {
        let node_level = node.as_ref().level;
        if node_level == level {
            return node.as_ref().size;
        }
        if node_level < level {
            return 0;
        }
        cursor = node.as_ref().next_head;
    }
    0
}

/// Merge `source` into `*destination`, keeping the result in strictly
/// descending level order. Where both lists have a head at the same
/// level, the destination's head is retained and the source's head is
/// unioned into it as a non-root node (so callers resolving chunks
/// through the old source head still land on the right place). Every
/// surviving head's `containing_hh` is overwritten to `owner`. Mirrors
/// `HM_mergeLevelList`.
///
/// # Safety
/// Every node reachable from `*destination` or `source` must be valid,
/// and `source` must not alias `*destination`.
pub unsafe fn merge_level_lists(
    destination: &mut Option<NonNull<LevelHead>>,
    source: Option<NonNull<LevelHead>>,
    owner: ChunkListOwner,
) {
    let mut merged_head: Option<NonNull<LevelHead>> = None;
    let mut merged_tail: Option<NonNull<LevelHead>> = None;
    let mut c1 = *destination;
    let mut c2 = source;

    while c1.is_some() || c2.is_some() {
        let next = match (c1, c2) {
            (Some(mut n1), Some(n2)) => {
                if n1.as_ref().level >= n2.as_ref().level {
                    if n1.as_ref().level == n2.as_ref().level {
                        append_chunk_list(n1, n2);
                        c2 = n2.as_ref().next_head;
                    }
                    c1 = n1.as_ref().next_head;
                    n1.as_mut().next_head = None;
                    n1
                } else {
                    c2 = n2.as_ref().next_head;
                    let mut n2 = n2;
                    n2.as_mut().next_head = None;
                    n2
                }
            },
            (Some(mut n1), None) => {
                c1 = n1.as_ref().next_head;
                n1.as_mut().next_head = None;
                n1
            },
            (None, Some(mut n2)) => {
                c2 = n2.as_ref().next_head;
                n2.as_mut().next_head = None;
                n2
            },
            (None, None) => unreachable!(),
        };

        let mut next = next;
        next.as_mut().containing_hh = owner.clone();

        match merged_tail {
            Some(mut tail) => tail.as_mut().next_head = Some(next),
            None => merged_head = Some(next),
        }
        merged_tail = Some(next);
    }

    *destination = merged_head;
}

/// Promote the level head at exactly `level` down to `level - 1`,
/// merging it into an existing `level - 1` head if one is already
/// present. A no-op if no head exists at `level`. Mirrors
/// `HM_promoteChunks`.
///
/// # Safety
/// Every node reachable from `*level_list` must be valid. `level` is
/// assumed to be > 0; promoting level 0 further is a no-op.
pub unsafe fn promote_chunks(level_list: &mut Option<NonNull<LevelHead>>, level: u32) {
    let mut cursor: *mut Option<NonNull<LevelHead>> = level_list;

    loop {
        match *cursor {
            Some(node) if node.as_ref().level > level => {
                cursor = &mut (*node.as_ptr()).next_head as *mut _;
            },
            _ => break,
        }
    }

    match *cursor {
        Some(node) if node.as_ref().level < level => {
            // nothing at this level; nothing to promote
        },
        Some(mut node) if node.as_ref().level == level => {
            *cursor = node.as_ref().next_head;
            node.as_mut().next_head = None;

            match *cursor {
                Some(next) if level > 0 && next.as_ref().level == level - 1 => {
                    append_chunk_list(next, node);
                },
                _ => {
                    node.as_mut().level = level.saturating_sub(1);
                    node.as_mut().next_head = *cursor;
                    *cursor = Some(node);
                },
            }

            log_event(GcEvent::LevelPromoted { from_level: level, to_level: level.saturating_sub(1) });
        },
        _ => {},
    }
}

/// Return every chunk at or above `min_level` to `free_list`, optionally
/// coalescing each freed chunk with physically adjacent chunks that are
/// themselves already free. Returns the number of bytes freed, and
/// leaves `*level_list` pointing at the first retained (lower-level)
/// head. Mirrors `HM_freeChunks`.
///
/// # Safety
/// Every node reachable from `*level_list` must be valid, and `free_list`
/// must be a valid, distinct level head.
pub unsafe fn free_chunks(
    level_list: &mut Option<NonNull<LevelHead>>,
    free_list: NonNull<LevelHead>,
    min_level: u32,
    coalesce_adjacent: bool,
) -> usize {
    let mut bytes_freed = 0usize;

    while let Some(node) = *level_list {
        if node.as_ref().level < min_level {
            break;
        }

        let mut chunk_cursor = node.as_ref().first_chunk;
        while let Some(mut chunk) = chunk_cursor {
            chunk_cursor = chunk.as_ref().next_chunk;

            bytes_freed += chunk.as_ref().size();
            chunk.as_mut().next_chunk = None;
            chunk.as_mut().prev_chunk = None;
            chunk.as_mut().reset();
            stats::global().record_chunk_freed();

            if coalesce_adjacent {
                if let Some(prev_adj) = chunk.as_ref().prev_adjacent {
                    if is_free_and_empty(prev_adj, free_list) {
                        unlink_chunk(prev_adj);
                        chunk = coalesce(prev_adj, chunk);
                    }
                }
                if let Some(next_adj) = chunk.as_ref().next_adjacent {
                    if is_free_and_empty(next_adj, free_list) {
                        unlink_chunk(next_adj);
                        chunk = coalesce(chunk, next_adj);
                    }
                }
            }

            append_chunk(free_list, chunk);

            #[cfg(debug_assertions)]
            {
                let body = chunk.as_ref().body_start();
                let len = chunk.as_ref().limit - body;
                if len > 0 {
                    std::ptr::write_bytes(body as *mut u8, FREED_POISON, len);
                }
            }
        }

        *level_list = node.as_ref().next_head;
    }

    if bytes_freed > 0 {
        log_event(GcEvent::LevelFreed { min_level, bytes_freed });
    }

    bytes_freed
}

unsafe fn is_free_and_empty(chunk: NonNull<crate::chunk::header::ChunkHeader>, free_list: NonNull<LevelHead>) -> bool {
    find_head_compress(chunk.as_ref().level_head) == free_list
        && chunk.as_ref().frontier == chunk.as_ref().start + HEADER_SIZE
}

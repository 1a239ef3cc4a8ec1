//! Chunk Substrate Scenario Tests
//!
//! Black-box coverage of the chunk substrate's cross-module scenarios:
//! allocate-split-free through the pool and directory together, level
//! promotion, level-list merge, and union-find compression under a
//! realistic chain depth. Unit tests colocated with each module cover
//! the primitives in isolation; these exercise them the way a caller
//! actually strings them together.

mod common;

use fgc::chunk::directory::ChunkDirectory;
use fgc::chunk::level_list::{free_chunks, merge_level_lists, promote_chunks};
use fgc::chunk::list::{append_chunk, ChunkListOwner, LevelHead};
use fgc::chunk::union_find::find_head_compress;
use fgc::pool::FreeChunkPool;
use std::ptr::NonNull;
use std::sync::Arc;

use common::SubstrateFixture;

unsafe fn leaked_head(level: u32, owner: ChunkListOwner) -> NonNull<LevelHead> {
    NonNull::from(Box::leak(Box::new(LevelHead::new_root(level, owner))))
}

/// S1: allocate a chunk from an empty pool, split off a residual, then
/// free the allocated chunk back and confirm the directory still
/// resolves both pieces correctly throughout.
#[test]
fn allocate_split_then_free_round_trips_through_directory() {
    let mut fixture = SubstrateFixture::new();
    let directory = fixture.directory.clone();

    let allocated = fixture.pool.get_free_chunk(1000).unwrap();
    unsafe {
        assert!(allocated.as_ref().bytes_free() >= 1000);
        assert_eq!(directory.chunk_of(allocated.as_ref().start), Some(allocated));
    }

    let level_head = unsafe { leaked_head(0, ChunkListOwner::ToSpace) };
    unsafe { append_chunk(level_head, allocated) };
    let mut level_list = Some(level_head);

    let free_list = unsafe { leaked_head(0, ChunkListOwner::Pool) };
    let freed_bytes = unsafe { free_chunks(&mut level_list, free_list, 0, false) };

    assert!(freed_bytes > 0);
    assert!(level_list.is_none());
    unsafe {
        assert_eq!(free_list.as_ref().first_chunk, Some(allocated));
        assert!(directory.chunk_of(allocated.as_ref().start).is_some());
    }
}

/// S2: a level head at level 2 with one chunk gets promoted, landing at
/// level 1 and merging into an already-present level-1 head rather than
/// staying a standalone level.
#[test]
fn promote_merges_allocated_level_into_existing_lower_level() {
    unsafe {
        let directory = Arc::new(ChunkDirectory::new());
        let mut pool = FreeChunkPool::new(4096, 8192, directory.clone());

        let lower = leaked_head(1, ChunkListOwner::ToSpace);
        let mut top_head = leaked_head(2, ChunkListOwner::ToSpace);
        top_head.as_mut().next_head = Some(lower);
        let mut top: Option<NonNull<LevelHead>> = Some(top_head);

        let chunk = pool.get_free_chunk(512).unwrap();
        append_chunk(top_head, chunk);
        directory.register(chunk);

        promote_chunks(&mut top, 2);

        let head = top.unwrap();
        assert_eq!(head, lower);
        assert_eq!(head.as_ref().level, 1);
        assert!(head.as_ref().size >= 512);
    }
}

/// S3: merging two level lists that share a level unions the shared
/// heads rather than producing two entries at the same level, and every
/// chunk originally reachable through either head still resolves
/// through the merged head via the directory.
#[test]
fn merge_unions_shared_level_and_directory_still_resolves() {
    unsafe {
        let directory = Arc::new(ChunkDirectory::new());
        let mut pool = FreeChunkPool::new(4096, 8192, directory.clone());

        let mut dest: Option<NonNull<LevelHead>> = Some(leaked_head(2, ChunkListOwner::ToSpace));
        let dest_chunk = pool.get_free_chunk(256).unwrap();
        append_chunk(dest.unwrap(), dest_chunk);
        directory.register(dest_chunk);

        let src = leaked_head(2, ChunkListOwner::ToSpace);
        let src_chunk = pool.get_free_chunk(256).unwrap();
        append_chunk(src, src_chunk);
        directory.register(src_chunk);

        merge_level_lists(&mut dest, Some(src), ChunkListOwner::ToSpace);

        let merged_head = dest.unwrap();
        assert_eq!(merged_head.as_ref().level, 2);

        let resolved_from_src = find_head_compress(src_chunk.as_ref().level_head);
        assert_eq!(resolved_from_src, merged_head);
        assert_eq!(directory.chunk_of(src_chunk.as_ref().start), Some(src_chunk));
        assert_eq!(directory.chunk_of(dest_chunk.as_ref().start), Some(dest_chunk));
    }
}

/// S4: a long chain of unioned interior nodes compresses to a single
/// hop on lookup, and every node along the old chain now points
/// directly at the root.
#[test]
fn union_find_compresses_a_long_chain_in_one_pass() {
    unsafe {
        let depth = 64;
        let heads: Vec<NonNull<LevelHead>> =
            (0..depth).map(|lvl| leaked_head(lvl as u32, ChunkListOwner::ToSpace)).collect();

        for window in (0..heads.len() - 1).rev() {
            let mut child = heads[window];
            child.as_mut().parent = Some(heads[window + 1]);
        }

        let root = heads[depth - 1];
        let leaf = heads[0];

        let resolved = find_head_compress(leaf);
        assert_eq!(resolved, root);

        for &node in &heads[..depth - 1] {
            assert_eq!(node.as_ref().parent, Some(root));
        }
    }
}

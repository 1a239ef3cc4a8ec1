//! Free-Chunk Pool - Per-Processor Chunk Reuse
//!
//! Each processor owns one pool, so no lock guards it (§5). On a miss,
//! the pool maps fresh memory in exponentially growing widths —
//! `nextAllocSize` doubles after every fresh map, so a processor that
//! keeps outgrowing its pool converges on mapping in big-enough chunks
//! rather than thrashing the mapper.

use crate::chunk::directory::ChunkDirectory;
use crate::chunk::header::{ChunkHeader, HEADER_SIZE};
use crate::chunk::list::{append_chunk, prepend_chunk, unlink_chunk, ChunkListOwner, LevelHead};
use crate::chunk::level_list::merge_level_lists;
use crate::chunk::split::split_front_of_chunk;
use crate::error::{FgcError, Result};
use crate::logging::{log_event, GcEvent};
use crate::mapper::BlockMapper;
use crate::stats;
use crate::util::Alignment;
use std::ptr::NonNull;
use std::sync::Arc;

/// A processor-private pool of unused chunks, backed by a dedicated
/// [`LevelHead`] that plays the role of a level head but belongs to no
/// heap. Not `Send`/`Sync`: ownership is exclusive to the processor that
/// created it.
pub struct FreeChunkPool {
    free_list: NonNull<LevelHead>,
    next_alloc_size: usize,
    block_size: usize,
    mapper: BlockMapper,
    directory: Arc<ChunkDirectory>,
}

impl FreeChunkPool {
    pub fn new(block_size: usize, initial_alloc_size: usize, directory: Arc<ChunkDirectory>) -> Self {
        let free_list = Box::leak(Box::new(LevelHead::new_root(0, ChunkListOwner::Pool)));
        FreeChunkPool {
            free_list: NonNull::from(free_list),
            next_alloc_size: initial_alloc_size,
            block_size,
            mapper: BlockMapper::new(block_size),
            directory,
        }
    }

    /// Obtain a chunk with at least `n_bytes` of usable capacity, fresh
    /// from the pool's first chunk if it already has room, or freshly
    /// mapped otherwise. Mirrors `HM_getFreeChunk`.
    pub fn get_free_chunk(&mut self, n_bytes: usize) -> Result<NonNull<ChunkHeader>> {
        let candidate = unsafe { self.free_list.as_ref().first_chunk };

        let chunk = match candidate {
            Some(chunk) if unsafe { chunk.as_ref().bytes_free() } >= n_bytes => chunk,
            _ => unsafe { self.map_fresh_chunk(n_bytes)? },
        };

        unsafe {
            if let Some(residual) = split_front_of_chunk(chunk, n_bytes, self.block_size) {
                self.directory.register(residual);
            }
            unlink_chunk(chunk);
        }

        Ok(chunk)
    }

    unsafe fn map_fresh_chunk(&mut self, n_bytes: usize) -> Result<NonNull<ChunkHeader>> {
        let need = Alignment::align_up(n_bytes + HEADER_SIZE, self.block_size);
        let alloc_width = need.max(self.next_alloc_size);
        self.next_alloc_size = self.next_alloc_size.saturating_mul(2);

        let region = self.mapper.map_blocks(alloc_width)?;
        let end = region.as_ptr() as usize + alloc_width;
        let chunk = ChunkHeader::initialize(region, end, self.free_list);

        self.directory.register(chunk);
        prepend_chunk(self.free_list, chunk);

        log_event(GcEvent::ChunkMapped { address: region.as_ptr() as usize, size: alloc_width });
        stats::global().record_chunk_mapped();

        Ok(chunk)
    }

    /// Obtain a chunk and append it to an existing level head.
    /// Mirrors `HM_allocateChunk`.
    pub fn allocate_chunk(&mut self, head: NonNull<LevelHead>, n_bytes: usize) -> Result<NonNull<ChunkHeader>> {
        let chunk = self.get_free_chunk(n_bytes)?;
        unsafe { append_chunk(head, chunk) };
        Ok(chunk)
    }

    /// Obtain a chunk, wrap it in a freshly created level head at
    /// `level`, and merge that head into `level_list`. Mirrors
    /// `HM_allocateLevelHeadChunk`.
    pub fn allocate_level_head_chunk(
        &mut self,
        level_list: &mut Option<NonNull<LevelHead>>,
        n_bytes: usize,
        level: u32,
        owner: ChunkListOwner,
    ) -> Result<NonNull<ChunkHeader>> {
        let new_head = Box::leak(Box::new(LevelHead::new_root(level, owner.clone())));
        let new_head = NonNull::from(new_head);

        let chunk = self.get_free_chunk(n_bytes)?;
        unsafe { append_chunk(new_head, chunk) };
        unsafe { merge_level_lists(level_list, Some(new_head), owner) };

        Ok(chunk)
    }

    pub fn next_alloc_size(&self) -> usize {
        self.next_alloc_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> FreeChunkPool {
        FreeChunkPool::new(4096, 16384, Arc::new(ChunkDirectory::new()))
    }

    #[test]
    fn get_free_chunk_maps_on_first_request() {
        let mut pool = pool();
        let chunk = pool.get_free_chunk(3000).unwrap();
        unsafe {
            assert!(chunk.as_ref().bytes_free() >= 3000);
        }
        assert_eq!(pool.next_alloc_size(), 32768);
    }

    #[test]
    fn residual_stays_in_pool_after_split() {
        let mut pool = pool();
        let _first = pool.get_free_chunk(3000).unwrap();

        unsafe {
            let residual = pool.free_list.as_ref().first_chunk;
            assert!(residual.is_some());
            assert!(residual.unwrap().as_ref().bytes_free() >= 4096);
        }
    }

    #[test]
    fn allocate_chunk_appends_to_given_head() {
        let mut pool = pool();
        let head = Box::leak(Box::new(LevelHead::new_root(2, ChunkListOwner::ToSpace)));
        let head = NonNull::from(head);

        let chunk = pool.allocate_chunk(head, 512).unwrap();
        unsafe {
            assert_eq!(head.as_ref().first_chunk, Some(chunk));
            assert_eq!(chunk.as_ref().level_head, head);
        }
    }

    #[test]
    fn unlink_after_allocate_chunk_mutates_the_caller_supplied_head() {
        let mut pool = pool();
        let head = Box::leak(Box::new(LevelHead::new_root(2, ChunkListOwner::ToSpace)));
        let head = NonNull::from(head);

        let chunk = pool.allocate_chunk(head, 512).unwrap();
        unsafe {
            assert_eq!(pool.free_list.as_ref().first_chunk, None);
            unlink_chunk(chunk);
            assert_eq!(head.as_ref().first_chunk, None);
            assert_eq!(pool.free_list.as_ref().first_chunk, None);
        }
    }

    #[test]
    fn allocate_level_head_chunk_merges_into_list() {
        let mut pool = pool();
        let mut list: Option<NonNull<LevelHead>> = None;

        let chunk = pool
            .allocate_level_head_chunk(&mut list, 512, 3, ChunkListOwner::ToSpace)
            .unwrap();

        let head = list.unwrap();
        unsafe {
            assert_eq!(head.as_ref().level, 3);
            assert_eq!(head.as_ref().first_chunk, Some(chunk));
            assert_eq!(chunk.as_ref().level_head, head);
        }
    }
}

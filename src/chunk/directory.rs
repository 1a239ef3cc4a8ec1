//! Chunk Directory - Pointer to Owning Chunk Lookup
//!
//! Stands in for the block-indexing table the wider runtime keeps
//! externally. Keyed by chunk start address and queried with a single
//! `BTreeMap` range lookup over committed extents. This is ambient
//! plumbing: it answers "which header owns this byte", never "is this
//! byte live".

use crate::chunk::header::ChunkHeader;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ptr::NonNull;

struct ChunkEntry {
    header: NonNull<ChunkHeader>,
    limit: usize,
}

unsafe impl Send for ChunkEntry {}
unsafe impl Sync for ChunkEntry {}

/// Maps any address inside a mapped chunk back to its header.
pub struct ChunkDirectory {
    entries: RwLock<BTreeMap<usize, ChunkEntry>>,
}

impl ChunkDirectory {
    pub fn new() -> Self {
        ChunkDirectory {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a freshly mapped or split-off chunk.
    ///
    /// # Safety
    /// `chunk` must be a valid, currently live chunk header.
    pub unsafe fn register(&self, chunk: NonNull<ChunkHeader>) {
        let start = chunk.as_ref().start;
        let limit = chunk.as_ref().limit;
        self.entries.write().insert(start, ChunkEntry { header: chunk, limit });
    }

    /// Remove a chunk that no longer exists as a distinct unit, e.g. one
    /// absorbed into its neighbor by `coalesce`.
    pub fn unregister(&self, start: usize) {
        self.entries.write().remove(&start);
    }

    /// Update the recorded extent of a chunk whose `limit` changed (a
    /// split shrank it, or a coalesce grew it) without it losing its own
    /// directory entry.
    ///
    /// # Safety
    /// `chunk` must already be registered under its current `start`.
    pub unsafe fn update_extent(&self, chunk: NonNull<ChunkHeader>) {
        let start = chunk.as_ref().start;
        let limit = chunk.as_ref().limit;
        if let Some(entry) = self.entries.write().get_mut(&start) {
            entry.limit = limit;
        }
    }

    /// Resolve `address` to the chunk header that owns it, if any.
    /// Mirrors `HM_getChunkOf`.
    pub fn chunk_of(&self, address: usize) -> Option<NonNull<ChunkHeader>> {
        let entries = self.entries.read();
        entries
            .range(..=address)
            .next_back()
            .filter(|(_, entry)| address < entry.limit)
            .map(|(_, entry)| entry.header)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ChunkDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::list::{ChunkListOwner, LevelHead};

    unsafe fn leaked_head() -> NonNull<LevelHead> {
        NonNull::from(Box::leak(Box::new(LevelHead::new_root(0, ChunkListOwner::ToSpace))))
    }

    #[test]
    fn resolves_address_within_registered_chunk() {
        unsafe {
            let head = leaked_head();
            let mut buf = vec![0u8; 4096];
            let start = NonNull::new(buf.as_mut_ptr()).unwrap();
            let end = start.as_ptr() as usize + buf.len();
            let chunk = ChunkHeader::initialize(start, end, head);

            let dir = ChunkDirectory::new();
            dir.register(chunk);

            let mid = start.as_ptr() as usize + 100;
            assert_eq!(dir.chunk_of(mid), Some(chunk));
            assert_eq!(dir.chunk_of(end), None);
            assert_eq!(dir.chunk_of(start.as_ptr() as usize - 1), None);
        }
    }

    #[test]
    fn unregister_removes_entry() {
        unsafe {
            let head = leaked_head();
            let mut buf = vec![0u8; 4096];
            let start = NonNull::new(buf.as_mut_ptr()).unwrap();
            let end = start.as_ptr() as usize + buf.len();
            let chunk = ChunkHeader::initialize(start, end, head);

            let dir = ChunkDirectory::new();
            dir.register(chunk);
            dir.unregister(chunk.as_ref().start);

            assert!(dir.is_empty());
        }
    }
}

//! Hierarchical Heap - External Collaborator
//!
//! The substrate treats a hierarchical heap as an opaque handle: an
//! owned level-list head behind a lock, addressed by every level head
//! whose `containing_hh` points at it. Everything else about a heap
//! (its task, its parent/child nesting) lives outside this crate.

use crate::chunk::directory::ChunkDirectory;
use crate::chunk::list::{ChunkListOwner, LevelHead};
use crate::chunk::union_find::find_head_compress;
use crate::error::{FgcError, Result};
use parking_lot::Mutex;
use std::ptr::NonNull;
use std::sync::Arc;

/// An externally managed memory region composed of per-level chunk
/// lists. The substrate's only obligation to a `HierarchicalHeap` is
/// back-pointer consistency: every level head that names this heap as
/// its owner must be reachable from `level_list_head`.
pub struct HierarchicalHeap {
    id: usize,
    level_list_head: Mutex<Option<NonNull<LevelHead>>>,
}

// `LevelHead` pointers are mutated only by the processor that currently
// owns this heap; the lock above is what makes crossing that boundary
// safe, not any property of the pointers themselves.
unsafe impl Send for HierarchicalHeap {}
unsafe impl Sync for HierarchicalHeap {}

impl HierarchicalHeap {
    pub fn new(id: usize) -> Arc<Self> {
        Arc::new(HierarchicalHeap {
            id,
            level_list_head: Mutex::new(None),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn level_list_head(&self) -> Option<NonNull<LevelHead>> {
        *self.level_list_head.lock()
    }

    pub fn set_level_list_head(&self, head: Option<NonNull<LevelHead>>) {
        *self.level_list_head.lock() = head;
    }

    /// Acquire the lock substrate routines assume the caller already
    /// holds while mutating this heap's chunks (§5). Exposed so
    /// `get_objptr_heap_lock` can hand it back out to callers.
    pub fn lock(&self) -> parking_lot::MutexGuard<'_, Option<NonNull<LevelHead>>> {
        self.level_list_head.lock()
    }
}

impl std::fmt::Debug for HierarchicalHeap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalHeap").field("id", &self.id).finish()
    }
}

/// Result of resolving an object pointer back to its owning level head.
/// Mirrors `getObjectPointerInfo`.
pub struct ObjptrInfo {
    pub level_head: NonNull<LevelHead>,
    pub level: u32,
    pub owner: ChunkListOwner,
}

unsafe impl Send for ObjptrInfo {}

/// Resolve `objptr` to the chunk that owns it and, through path
/// compression, the level head at the root of that chunk's union-find
/// tree. Mirrors `HM_getObjptrInfo`/`getObjectPointerInfo`.
pub fn get_objptr_info(directory: &ChunkDirectory, objptr: usize) -> Result<ObjptrInfo> {
    let chunk = directory
        .chunk_of(objptr)
        .ok_or(FgcError::InvalidPointer { address: objptr })?;

    unsafe {
        let level_head = find_head_compress(chunk.as_ref().level_head);
        Ok(ObjptrInfo {
            level_head,
            level: level_head.as_ref().level,
            owner: level_head.as_ref().containing_hh.clone(),
        })
    }
}

/// Obtain the `HierarchicalHeap` that owns `objptr`, if it belongs to a
/// live heap rather than to-space or a free pool. Mirrors
/// `getObjectPointerHeapLock` minus the actual lock acquisition, which
/// callers perform on the returned handle themselves.
pub fn get_objptr_heap_lock(directory: &ChunkDirectory, objptr: usize) -> Result<Option<Arc<HierarchicalHeap>>> {
    let info = get_objptr_info(directory, objptr)?;
    Ok(match info.owner {
        ChunkListOwner::Heap(hh) => Some(hh),
        ChunkListOwner::ToSpace | ChunkListOwner::Pool => None,
    })
}

/// Whether `objptr` currently lives in to-space. Mirrors
/// `isObjectPointerInToSpace`; the sole predicate per the Open Question
/// in §9 (there is no separate boolean to drift out of sync).
pub fn is_objptr_in_to_space(directory: &ChunkDirectory, objptr: usize) -> Result<bool> {
    Ok(get_objptr_info(directory, objptr)?.owner.is_to_space())
}

//! Chunk List - Per-Level Collections of Chunks
//!
//! A [`LevelHead`] is both the head of a doubly-linked list of chunks at
//! one generational level, and a node in the union-find forest used to
//! resolve a chunk back to its level head in near-constant time (see
//! [`crate::chunk::union_find`]).

use crate::chunk::header::ChunkHeader;
use crate::heap::HierarchicalHeap;
use std::ptr::NonNull;
use std::sync::Arc;

/// Identifies which collaborator currently owns a level head's chunks:
/// a live hierarchical heap, the collector's to-space, or a processor's
/// free-chunk pool.
///
/// This is the single source of truth for "is this chunk in to-space" —
/// there is deliberately no separate boolean flag that could drift out
/// of sync with it.
#[derive(Clone)]
pub enum ChunkListOwner {
    Heap(Arc<HierarchicalHeap>),
    ToSpace,
    /// Unlinked chunks sitting in a processor's free pool, not yet
    /// handed out to any heap.
    Pool,
}

impl ChunkListOwner {
    pub fn is_to_space(&self) -> bool {
        matches!(self, ChunkListOwner::ToSpace)
    }
}

/// Head of a per-level chunk list, and a union-find node.
///
/// `parent == None` marks this node as a union-find root; otherwise it
/// points at the node this one was merged into. Interior (non-root)
/// nodes are never freed once created — see the note on
/// [`crate::chunk::union_find::find_head_compress`].
pub struct LevelHead {
    /// Union-find parent. `None` means this node is its own root.
    pub parent: Option<NonNull<LevelHead>>,
    /// Next (lower) level head in the level list this head belongs to.
    pub next_head: Option<NonNull<LevelHead>>,
    pub first_chunk: Option<NonNull<ChunkHeader>>,
    pub last_chunk: Option<NonNull<ChunkHeader>>,
    /// Sum of `HM_getChunkSize` over every chunk owned by this head.
    pub size: usize,
    pub level: u32,
    pub containing_hh: ChunkListOwner,
}

impl LevelHead {
    /// Create a fresh, empty level head that is its own union-find root.
    /// Mirrors `HM_newChunkList`.
    pub fn new_root(level: u32, containing_hh: ChunkListOwner) -> Self {
        LevelHead {
            parent: None,
            next_head: None,
            first_chunk: None,
            last_chunk: None,
            size: 0,
            level,
            containing_hh,
        }
    }

    pub fn is_in_to_space(&self) -> bool {
        self.containing_hh.is_to_space()
    }
}

/// Append `chunk` to the tail of `level_head`'s chunk list.
/// Mirrors `HM_appendChunk`.
///
/// # Safety
/// `level_head` and `chunk` must be valid, non-aliased pointers, and
/// `chunk` must not currently belong to any chunk list.
pub unsafe fn append_chunk(mut level_head: NonNull<LevelHead>, mut chunk: NonNull<ChunkHeader>) {
    let size = chunk.as_ref().size();
    chunk.as_mut().level_head = level_head;
    let head = level_head.as_mut();

    chunk.as_mut().prev_chunk = head.last_chunk;
    chunk.as_mut().next_chunk = None;

    match head.last_chunk {
        Some(mut last) => last.as_mut().next_chunk = Some(chunk),
        None => head.first_chunk = Some(chunk),
    }
    head.last_chunk = Some(chunk);
    head.size += size;
}

/// Prepend `chunk` to the head of `level_head`'s chunk list.
/// Mirrors `HM_prependChunk`.
///
/// # Safety
/// Same requirements as [`append_chunk`].
pub unsafe fn prepend_chunk(mut level_head: NonNull<LevelHead>, mut chunk: NonNull<ChunkHeader>) {
    let size = chunk.as_ref().size();
    chunk.as_mut().level_head = level_head;
    let head = level_head.as_mut();

    chunk.as_mut().next_chunk = head.first_chunk;
    chunk.as_mut().prev_chunk = None;

    match head.first_chunk {
        Some(mut first) => first.as_mut().prev_chunk = Some(chunk),
        None => head.last_chunk = Some(chunk),
    }
    head.first_chunk = Some(chunk);
    head.size += size;
}

/// Detach `chunk` from whichever level head `chunk.level_head` resolves
/// to (after path compression) and restore its links to null.
/// Mirrors `HM_unlinkChunk`.
///
/// # Safety
/// `chunk` must currently belong to the chunk list whose root its
/// `level_head` field resolves to.
pub unsafe fn unlink_chunk(mut chunk: NonNull<ChunkHeader>) {
    let root = crate::chunk::union_find::find_head_compress(chunk.as_ref().level_head);
    let mut root = root;
    let size = chunk.as_ref().size();

    match chunk.as_ref().prev_chunk {
        Some(mut prev) => prev.as_mut().next_chunk = chunk.as_ref().next_chunk,
        None => root.as_mut().first_chunk = chunk.as_ref().next_chunk,
    }
    match chunk.as_ref().next_chunk {
        Some(mut next) => next.as_mut().prev_chunk = chunk.as_ref().prev_chunk,
        None => root.as_mut().last_chunk = chunk.as_ref().prev_chunk,
    }

    root.as_mut().size -= size;
    chunk.as_mut().next_chunk = None;
    chunk.as_mut().prev_chunk = None;
}

/// Splice `list2`'s chunks onto the tail of `list1` and union `list2`
/// into `list1`: `list2` becomes a non-root union-find node whose parent
/// is `list1`. This is the single workhorse behind both "concatenate two
/// chunk lists" and the equal-level case of merging two level lists.
/// Mirrors `appendChunkList`.
///
/// # Safety
/// `list1` and `list2` must be distinct, valid level heads, and `list2`
/// must currently be a union-find root.
pub unsafe fn append_chunk_list(mut list1: NonNull<LevelHead>, mut list2: NonNull<LevelHead>) {
    debug_assert!(list2.as_ref().parent.is_none());

    let l1 = list1.as_mut();
    let l2 = list2.as_mut();

    match (l1.last_chunk, l2.first_chunk) {
        (Some(mut last), Some(mut first)) => {
            last.as_mut().next_chunk = Some(first);
            first.as_mut().prev_chunk = Some(last);
            l1.last_chunk = l2.last_chunk;
        },
        (None, Some(_)) => {
            l1.first_chunk = l2.first_chunk;
            l1.last_chunk = l2.last_chunk;
        },
        (_, None) => {},
    }

    l1.size += l2.size;
    l2.parent = Some(list1);

    #[cfg(debug_assertions)]
    {
        l2.first_chunk = None;
        l2.last_chunk = None;
        l2.size = usize::MAX;
    }
}

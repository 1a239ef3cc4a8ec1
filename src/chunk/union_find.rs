//! Union-Find - Resolving a Chunk to Its Level Head
//!
//! Chunks don't point directly at their level head; they point at a
//! union-find node that may itself have been merged into another node
//! (see [`crate::chunk::list::append_chunk_list`]). `find_head` walks
//! the parent chain to the root without mutating anything;
//! `find_head_compress` does the same walk and then rewrites every
//! visited node's parent straight to the root, so repeated lookups after
//! a long chain of merges stay close to O(1).

use crate::chunk::list::LevelHead;
use std::ptr::NonNull;

/// Resolve `node` to its union-find root without path compression.
/// Mirrors `HM_getLevelHead`.
///
/// # Safety
/// `node` and every node reachable by following `parent` must be valid.
pub unsafe fn find_head(mut node: NonNull<LevelHead>) -> NonNull<LevelHead> {
    while let Some(parent) = node.as_ref().parent {
        node = parent;
    }
    node
}

// TODO: interior (non-root) LevelHead nodes are never freed once
// created; reference counting them was never implemented upstream
// either (see the leaked-node note on `LevelHead`).
/// Resolve `node` to its union-find root, rewriting every visited
/// node's parent to point directly at the root. Mirrors
/// `HM_getLevelHeadPathCompress`.
///
/// # Safety
/// Same requirements as [`find_head`].
pub unsafe fn find_head_compress(node: NonNull<LevelHead>) -> NonNull<LevelHead> {
    let root = find_head(node);

    let mut cursor = node;
    loop {
        let next = cursor.as_ref().parent;
        cursor.as_mut().parent = Some(root);
        match next {
            Some(parent) if parent != root => cursor = parent,
            _ => break,
        }
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::list::ChunkListOwner;

    #[test]
    fn single_root_resolves_to_itself() {
        unsafe {
            let mut head = LevelHead::new_root(0, ChunkListOwner::ToSpace);
            let ptr = NonNull::new(&mut head as *mut LevelHead).unwrap();
            assert_eq!(find_head(ptr), ptr);
            assert_eq!(find_head_compress(ptr), ptr);
        }
    }

    #[test]
    fn chain_compresses_to_root() {
        unsafe {
            let mut a = LevelHead::new_root(2, ChunkListOwner::ToSpace);
            let mut b = LevelHead::new_root(1, ChunkListOwner::ToSpace);
            let mut c = LevelHead::new_root(0, ChunkListOwner::ToSpace);

            let a_ptr = NonNull::new(&mut a as *mut LevelHead).unwrap();
            let b_ptr = NonNull::new(&mut b as *mut LevelHead).unwrap();
            let c_ptr = NonNull::new(&mut c as *mut LevelHead).unwrap();

            b.parent = Some(a_ptr);
            c.parent = Some(b_ptr);

            assert_eq!(find_head(c_ptr), a_ptr);

            let root = find_head_compress(c_ptr);
            assert_eq!(root, a_ptr);
            assert_eq!(c.parent, Some(a_ptr));
            assert_eq!(b.parent, Some(a_ptr));
        }
    }
}

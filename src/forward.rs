//! Iteration & Forwarding Hook
//!
//! Walks live objects across a chunk list (or a whole level list) and
//! invokes caller-supplied hooks per object. The mark/evacuate *policy*
//! — which objects get copied where — is deliberately not implemented
//! here; [`ObjectModel`] and [`TracingSink`] are the seams an external
//! collector plugs into.

use crate::chunk::directory::ChunkDirectory;
use crate::chunk::list::LevelHead;
use crate::error::{FgcError, Result};
use crate::logging::{log_event, GcEvent};
use crate::stats as substrate_stats;
use std::ptr::NonNull;

/// Object-layout operations the forwarding walk needs from its caller.
/// Mirrors `advancePastObjectHeader`/`forEachObjectPointerInObject`.
pub trait ObjectModel {
    /// Skip past an object's header, returning the address its payload
    /// (and the caller's pointer-iteration) starts at.
    ///
    /// # Safety
    /// `pointer` must address a live object header.
    unsafe fn advance_past_object_header(&self, pointer: usize) -> usize;

    /// Visit the pointers inside the object at `object`, rewriting
    /// those `predicate` accepts through `rewrite`. Returns the address
    /// just past the end of this object.
    ///
    /// # Safety
    /// `object` must be a live object's payload start.
    unsafe fn for_each_object_pointer_in_object(
        &self,
        object: usize,
        recurse: bool,
        predicate: &mut dyn FnMut(usize) -> bool,
        rewrite: &mut dyn FnMut(usize) -> usize,
    ) -> usize;
}

/// Periodic tracing sink. Mirrors `tracingEvent`.
pub trait TracingSink {
    fn tracing_event(&self, copy_bytes: usize, copy_objects: usize, copy_stacks: usize);
}

/// Running totals sampled into a [`TracingSink`] every `sample_interval`
/// objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardStats {
    pub bytes_copied: usize,
    pub objects_copied: usize,
    pub stacks_copied: usize,
}

impl ForwardStats {
    fn merge(&mut self, other: ForwardStats) {
        self.bytes_copied += other.bytes_copied;
        self.objects_copied += other.objects_copied;
        self.stacks_copied += other.stacks_copied;
    }
}

/// Walk live objects starting at `start_addr` through to the end of its
/// chunk list, rewriting sub-pointers `predicate` accepts.
///
/// If `start_addr` lands exactly on a chunk's base address, the walk
/// backs up one byte first so the chunk directory resolves to the
/// *preceding* chunk — which must be fully consumed, with `frontier ==
/// limit == start_addr` — rather than treating the next chunk's base as
/// live data already scanned. Mirrors `forwardObjptrsInChunkList`.
///
/// # Safety
/// `start_addr` must address memory inside a chunk registered in
/// `directory`, and every chunk reachable via `next_chunk` from it must
/// be valid.
pub unsafe fn forward_objptrs_in_chunk_list(
    directory: &ChunkDirectory,
    start_addr: usize,
    object_model: &dyn ObjectModel,
    sink: &dyn TracingSink,
    sample_interval: usize,
    predicate: &mut dyn FnMut(usize) -> bool,
    rewrite: &mut dyn FnMut(usize) -> usize,
) -> Result<ForwardStats> {
    let lookup_addr = match directory.chunk_of(start_addr) {
        Some(chunk) if chunk.as_ref().start == start_addr => start_addr.wrapping_sub(1),
        _ => start_addr,
    };

    let mut chunk = directory
        .chunk_of(lookup_addr)
        .ok_or(FgcError::InvalidPointer { address: start_addr })?;
    let mut cursor = start_addr;
    let mut stats = ForwardStats::default();

    loop {
        let frontier = chunk.as_ref().frontier;
        while cursor < frontier {
            let object = object_model.advance_past_object_header(cursor);
            let past_object = object_model.for_each_object_pointer_in_object(object, true, predicate, rewrite);
            debug_assert!(past_object > cursor);

            stats.objects_copied += 1;
            stats.bytes_copied += past_object - cursor;
            cursor = past_object;

            if sample_interval > 0 && stats.objects_copied % sample_interval == 0 {
                sink.tracing_event(stats.bytes_copied, stats.objects_copied, stats.stacks_copied);
                log_event(GcEvent::TraceStats {
                    objects_copied: stats.objects_copied as u64,
                    bytes_copied: stats.bytes_copied as u64,
                });
                substrate_stats::global().record_tracing_sample(
                    stats.bytes_copied as u64,
                    stats.objects_copied as u64,
                    stats.stacks_copied as u64,
                );
            }
        }

        match chunk.as_ref().next_chunk {
            Some(next) => {
                chunk = next;
                cursor = next.as_ref().body_start();
            },
            None => break,
        }
    }

    Ok(stats)
}

/// Walk every level head in `list`, descending, forwarding each head's
/// chunk list. `make_predicate(ceiling)` builds the per-object predicate
/// for a level from the current `maxLevel` ceiling: when
/// `expect_entanglement` is false the ceiling resets to each head's own
/// level (only references into strictly older levels are followed);
/// when true, the ceiling from the first head is carried through every
/// subsequent, lower level. Mirrors `forwardObjptrsInLevelList`.
///
/// # Safety
/// Every head reachable from `list` must be valid, and no mutation
/// visible to this walk may introduce a level lower than one already
/// visited (checked with `debug_assert!`).
pub unsafe fn forward_objptrs_in_level_list(
    list: Option<NonNull<LevelHead>>,
    directory: &ChunkDirectory,
    object_model: &dyn ObjectModel,
    sink: &dyn TracingSink,
    sample_interval: usize,
    expect_entanglement: bool,
    mut make_predicate: impl FnMut(u32) -> Box<dyn FnMut(usize) -> bool>,
    rewrite: &mut dyn FnMut(usize) -> usize,
) -> Result<ForwardStats> {
    let mut cursor = list;
    let mut ceiling: Option<u32> = None;
    let mut previous_level: Option<u32> = None;
    let mut totals = ForwardStats::default();

    while let Some(head) = cursor {
        let level = head.as_ref().level;
        debug_assert!(
            previous_level.map_or(true, |p| level < p),
            "level list must strictly descend while the forwarding walk is in progress"
        );
        previous_level = Some(level);

        let this_ceiling = if expect_entanglement { ceiling.unwrap_or(level) } else { level };
        ceiling = Some(this_ceiling);

        let mut predicate = make_predicate(this_ceiling);
        if let Some(first) = head.as_ref().first_chunk {
            let stats = forward_objptrs_in_chunk_list(
                directory,
                first.as_ref().body_start(),
                object_model,
                sink,
                sample_interval,
                &mut *predicate,
                rewrite,
            )?;
            totals.merge(stats);
        }

        cursor = head.as_ref().next_head;
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::header::ChunkHeader;
    use crate::chunk::list::{append_chunk, ChunkListOwner};

    struct FixedSizeObjects {
        object_size: usize,
    }

    impl ObjectModel for FixedSizeObjects {
        unsafe fn advance_past_object_header(&self, pointer: usize) -> usize {
            pointer
        }
        unsafe fn for_each_object_pointer_in_object(
            &self,
            object: usize,
            _recurse: bool,
            _predicate: &mut dyn FnMut(usize) -> bool,
            _rewrite: &mut dyn FnMut(usize) -> usize,
        ) -> usize {
            object + self.object_size
        }
    }

    struct NullSink;
    impl TracingSink for NullSink {
        fn tracing_event(&self, _: usize, _: usize, _: usize) {}
    }

    unsafe fn leaked_head(level: u32) -> NonNull<LevelHead> {
        NonNull::from(Box::leak(Box::new(LevelHead::new_root(level, ChunkListOwner::ToSpace))))
    }

    #[test]
    fn chunk_list_walk_counts_fixed_size_objects() {
        unsafe {
            let head = leaked_head(0);
            let mut buf = vec![0u8; 4096];
            let start = NonNull::new(buf.as_mut_ptr()).unwrap();
            let end = start.as_ptr() as usize + buf.len();
            let mut chunk = ChunkHeader::initialize(start, end, head);
            chunk.as_mut().frontier = chunk.as_ref().body_start() + 320;
            append_chunk(head, chunk);

            let directory = ChunkDirectory::new();
            directory.register(chunk);

            let model = FixedSizeObjects { object_size: 32 };
            let sink = NullSink;
            let mut predicate = |_: usize| true;
            let mut rewrite = |p: usize| p;

            let stats = forward_objptrs_in_chunk_list(
                &directory,
                chunk.as_ref().body_start(),
                &model,
                &sink,
                1024,
                &mut predicate,
                &mut rewrite,
            )
            .unwrap();

            assert_eq!(stats.objects_copied, 10);
            assert_eq!(stats.bytes_copied, 320);
        }
    }

    #[test]
    fn level_list_walk_sets_ceiling_per_expect_entanglement() {
        unsafe {
            let mut top = leaked_head(3);
            let lower = leaked_head(1);
            top.as_mut().next_head = Some(lower);

            let directory = ChunkDirectory::new();
            let model = FixedSizeObjects { object_size: 16 };
            let sink = NullSink;
            let mut rewrite = |p: usize| p;

            let mut seen_ceilings = Vec::new();
            let stats = forward_objptrs_in_level_list(
                Some(top),
                &directory,
                &model,
                &sink,
                1024,
                false,
                |ceiling| {
                    seen_ceilings.push(ceiling);
                    Box::new(|_: usize| true)
                },
                &mut rewrite,
            )
            .unwrap();

            assert_eq!(seen_ceilings, vec![3, 1]);
            assert_eq!(stats.objects_copied, 0);
        }
    }
}

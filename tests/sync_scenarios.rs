//! Multi-Processor Synchronization Scenario Tests
//!
//! Black-box coverage of the coordinator across a full processor count,
//! going beyond what the colocated unit tests in `sync::critical` and
//! `sync::bsp` already check: a five-processor rotating critical
//! section running multiple rounds back to back, and a BSP round where
//! a participant opts out partway through the pipeline.

mod common;

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use common::spawn_initialized_processors;

/// S5: five processors take the rotating critical section across two
/// back-to-back rounds; each round admits them in ordinal order and
/// leaves the coordinator back at its resting state before the next
/// round starts.
#[test]
fn five_processors_rotate_through_two_rounds_in_order() {
    let (_coordinator, handles) = spawn_initialized_processors(5);

    for _round in 0..2 {
        let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let threads: Vec<_> = handles
            .clone()
            .into_iter()
            .map(|h| {
                let order = order.clone();
                thread::spawn(move || {
                    let _guard = h.enter_critical_section();
                    order.lock().push(h.ordinal());
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        // A second round completing in the same strict order is only
        // possible if the first round left the coordinator back at its
        // resting state (sync_count == 0, critical_ticket == -1).
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }
}

/// S6: a BSP round where one participant opts out midway through the
/// pipeline gets `OptedOut` back while everyone else still completes,
/// and the coordinator returns to `Done` for the next round.
#[test]
fn bsp_participant_opting_out_does_not_block_the_others() {
    let (coordinator, handles) = spawn_initialized_processors(3);

    let step_one_calls = Arc::new(AtomicUsize::new(0));
    let calls = step_one_calls.clone();
    let pipeline = vec![
        Arc::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        }) as fgc::sync::registry::PipelineFn,
        Arc::new(|| false) as fgc::sync::registry::PipelineFn,
    ];

    let mut iter = handles.into_iter();
    let initiator = iter.next().unwrap();
    let participants: Vec<_> = iter.collect();

    let t_init = thread::spawn(move || initiator.run_bsp(Some(pipeline)));
    let participant_threads: Vec<_> = participants.into_iter().map(|h| thread::spawn(move || h.run_bsp(None))).collect();

    let init_outcome = t_init.join().unwrap();
    let participant_outcomes: Vec<_> = participant_threads.into_iter().map(|t| t.join().unwrap()).collect();

    assert_eq!(step_one_calls.load(Ordering::SeqCst), 3);
    assert!(std::iter::once(init_outcome).chain(participant_outcomes).all(|o| o == fgc::sync::BspOutcome::OptedOut));
    assert_eq!(coordinator.bsp_state(), fgc::sync::BspState::Done);
}

//! BSP Coordinator
//!
//! Runs an ordered function pipeline across every processor with
//! initiator election, a join barrier, and a rendezvous after each
//! step. One caller per round supplies the pipeline (the initiator);
//! the rest call in as participants. State machine: `Done → Waiting →
//! InProgress → Done`.

use crate::logging::{log_event, GcEvent};
use crate::stats;
use crate::sync::registry::{Coordinator, PipelineFn, ProcessorHandle};
use std::sync::atomic::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BspState {
    Done,
    Waiting,
    InProgress,
}

/// State guarded by [`Coordinator::bsp`]: the state machine value, the
/// arrival counter used for both election and the join barrier, and the
/// initiator's published pipeline.
pub(crate) struct BspShared {
    pub state: BspState,
    pub counter: usize,
    pub pipeline: Option<Vec<PipelineFn>>,
}

impl BspShared {
    pub(crate) fn new() -> Self {
        BspShared { state: BspState::Done, counter: 0, pipeline: None }
    }
}

/// What happened to one caller's `run_bsp` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BspOutcome {
    /// Ran every pipeline step this caller was still participating in.
    Completed,
    /// A pipeline step returned `false`; this caller opted out early.
    OptedOut,
    /// Coordinator misuse: called at the wrong time, or lost the
    /// initiator race.
    Rejected,
}

impl Coordinator {
    /// Run one BSP round. `pipeline = Some(steps)` makes this call the
    /// initiator; `None` makes it a participant only.
    pub fn run_bsp(&self, ordinal: usize, pipeline: Option<Vec<PipelineFn>>) -> BspOutcome {
        let is_initiator = pipeline.is_some();
        let mut became_initiator = false;
        let mut joined_barrier = false;

        {
            let mut shared = self.bsp.lock();

            match (shared.state, is_initiator) {
                (BspState::InProgress, _) => return BspOutcome::Rejected,
                (BspState::Waiting, true) => return BspOutcome::Rejected,
                (BspState::Done, false) => return BspOutcome::Rejected,
                _ => {},
            }

            shared.counter += 1;
            let count = shared.counter;

            if count == 1 {
                if !is_initiator {
                    shared.counter -= 1;
                    return BspOutcome::Rejected;
                }
                shared.state = BspState::Waiting;
                shared.pipeline = pipeline;
                became_initiator = true;
            } else if is_initiator {
                shared.counter -= 1;
                return BspOutcome::Rejected;
            }

            if count == self.num_processors {
                shared.state = BspState::InProgress;
                joined_barrier = true;
            }
        }

        if became_initiator {
            log_event(GcEvent::CoordinatorStateChange { from: "Done".to_string(), to: "Waiting".to_string() });
        }

        if joined_barrier {
            log_event(GcEvent::CoordinatorStateChange { from: "Waiting".to_string(), to: "InProgress".to_string() });
            self.bsp_num_participants.store(self.num_processors, Ordering::SeqCst);
            self.bsp_num_participants_finished.store(0, Ordering::SeqCst);
            self.bsp_initiator_start.store(true, Ordering::Release);
        }

        if became_initiator {
            while !self.bsp_initiator_start.load(Ordering::Acquire) {
                std::hint::spin_loop();
            }
            self.bsp_participant_start.store(true, Ordering::Release);
        } else {
            while !self.bsp_participant_start.load(Ordering::Acquire) {
                std::hint::spin_loop();
            }
        }

        let outcome = self.run_pipeline_steps();

        if became_initiator {
            while self.bsp_num_participants.load(Ordering::Acquire) > 0 {
                std::hint::spin_loop();
            }

            let mut shared = self.bsp.lock();
            shared.state = BspState::Done;
            shared.counter = 0;
            shared.pipeline = None;
            self.bsp_initiator_start.store(false, Ordering::Release);
            self.bsp_participant_start.store(false, Ordering::Release);

            log_event(GcEvent::CoordinatorStateChange { from: "InProgress".to_string(), to: "Done".to_string() });
            stats::global().record_bsp_round();
        }

        let _ = ordinal;
        outcome
    }

    fn run_pipeline_steps(&self) -> BspOutcome {
        let steps = {
            let shared = self.bsp.lock();
            shared.pipeline.clone().unwrap_or_default()
        };

        for (index, step) in steps.into_iter().enumerate() {
            let continued = step();
            let participants = self.bsp_num_participants.load(Ordering::Acquire);
            if !continued {
                self.bsp_num_participants.fetch_sub(1, Ordering::AcqRel);
            }
            log_event(GcEvent::BspStep { step: index, participants, continued });
            if !continued {
                return BspOutcome::OptedOut;
            }
            self.rendezvous_step();
        }

        BspOutcome::Completed
    }

    /// Block until every still-participating caller has finished the
    /// current step, then let them all proceed to the next one.
    ///
    /// `bsp_num_participants` can shrink concurrently (another caller
    /// opting out mid-step), so the target is re-read live on every
    /// spin rather than captured once: a caller snapshotting a
    /// pre-decrement target could otherwise wait on an arrival count
    /// nobody still in the round will ever reach.
    fn rendezvous_step(&self) {
        let generation = self.bsp_step_generation.load(Ordering::Acquire);
        let finished = self.bsp_num_participants_finished.fetch_add(1, Ordering::AcqRel) + 1;

        loop {
            let target = self.bsp_num_participants.load(Ordering::Acquire);
            if finished >= target {
                if self
                    .bsp_step_generation
                    .compare_exchange(generation, generation + 1, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    self.bsp_num_participants_finished.store(0, Ordering::Release);
                }
                return;
            }
            if self.bsp_step_generation.load(Ordering::Acquire) != generation {
                return;
            }
            std::hint::spin_loop();
        }
    }
}

impl ProcessorHandle {
    /// Call into the BSP coordinator as this processor.
    pub fn run_bsp(&self, pipeline: Option<Vec<PipelineFn>>) -> BspOutcome {
        self.coordinator.run_bsp(self.ordinal, pipeline)
    }
}

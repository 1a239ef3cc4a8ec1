//! Processor Registry & Initialization Barrier
//!
//! A distinguished primary (ordinal 0) calls `signal_initialization`,
//! clearing all coordinator state and spin-waiting until every
//! registered processor has checked in; every other processor spins on
//! the begin flag, registers, then spins until all N have joined.
//! Mirrors `signalInitialization`.

use crate::sync::bsp::{BspShared, BspState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering};
use std::sync::Arc;

/// A pipeline step handed to the BSP coordinator by its initiator.
pub type PipelineFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Owns every piece of state the init barrier, rotating critical
/// section, and BSP coordinator share across processors. A single
/// value, explicitly constructed once at startup and handed to every
/// processor through a [`ProcessorHandle`] — never module-level static
/// state.
pub struct Coordinator {
    pub(crate) num_processors: usize,

    pub(crate) is_initialized: AtomicBool,
    pub(crate) init_lock: Mutex<()>,
    pub(crate) init_counter: AtomicUsize,
    pub(crate) init_begin: AtomicBool,

    pub(crate) crit_lock: Mutex<()>,
    pub(crate) sync_count: AtomicUsize,
    pub(crate) critical_ticket: AtomicIsize,

    pub(crate) bsp: Mutex<BspShared>,
    pub(crate) bsp_num_participants: AtomicUsize,
    pub(crate) bsp_num_participants_finished: AtomicUsize,
    pub(crate) bsp_step_generation: AtomicUsize,
    pub(crate) bsp_initiator_start: AtomicBool,
    pub(crate) bsp_participant_start: AtomicBool,
}

impl Coordinator {
    pub fn new(num_processors: usize) -> Arc<Self> {
        assert!(num_processors > 0, "a coordinator needs at least one processor");
        Arc::new(Coordinator {
            num_processors,
            is_initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
            init_counter: AtomicUsize::new(0),
            init_begin: AtomicBool::new(false),
            crit_lock: Mutex::new(()),
            sync_count: AtomicUsize::new(0),
            critical_ticket: AtomicIsize::new(-1),
            bsp: Mutex::new(BspShared::new()),
            bsp_num_participants: AtomicUsize::new(0),
            bsp_num_participants_finished: AtomicUsize::new(0),
            bsp_step_generation: AtomicUsize::new(0),
            bsp_initiator_start: AtomicBool::new(false),
            bsp_participant_start: AtomicBool::new(false),
        })
    }

    pub fn num_processors(&self) -> usize {
        self.num_processors
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized.load(Ordering::Acquire)
    }

    pub fn bsp_state(&self) -> BspState {
        self.bsp.lock().state
    }

    /// Primary-side (ordinal 0) half of the initialization barrier.
    pub fn signal_initialization(&self) {
        let _guard = self.init_lock.lock();

        self.sync_count.store(0, Ordering::SeqCst);
        self.critical_ticket.store(-1, Ordering::SeqCst);
        {
            let mut bsp = self.bsp.lock();
            bsp.state = BspState::Done;
            bsp.counter = 0;
            bsp.pipeline = None;
        }
        self.bsp_num_participants.store(0, Ordering::SeqCst);
        self.bsp_num_participants_finished.store(0, Ordering::SeqCst);

        self.init_counter.store(1, Ordering::SeqCst);
        self.init_begin.store(true, Ordering::Release);

        while self.init_counter.load(Ordering::Acquire) < self.num_processors {
            std::hint::spin_loop();
        }

        self.is_initialized.store(true, Ordering::Release);
    }

    /// Non-primary half of the initialization barrier.
    pub fn await_initialization(&self) {
        while !self.init_begin.load(Ordering::Acquire) {
            std::hint::spin_loop();
        }
        self.init_counter.fetch_add(1, Ordering::AcqRel);
        while self.init_counter.load(Ordering::Acquire) < self.num_processors {
            std::hint::spin_loop();
        }
        self.is_initialized.store(true, Ordering::Release);
    }
}

/// A processor's handle onto the shared coordinator, carrying its own
/// ordinal so no operation ever needs to look itself up by identity —
/// the only class of "own-processor lookup failure" error the original
/// taxonomy had to account for is structurally impossible here.
#[derive(Clone)]
pub struct ProcessorHandle {
    pub(crate) coordinator: Arc<Coordinator>,
    pub(crate) ordinal: usize,
}

impl ProcessorHandle {
    pub fn new(coordinator: Arc<Coordinator>, ordinal: usize) -> Self {
        assert!(ordinal < coordinator.num_processors());
        ProcessorHandle { coordinator, ordinal }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn is_primary(&self) -> bool {
        self.ordinal == 0
    }

    /// Run this processor's side of the initialization barrier.
    pub fn signal_initialization(&self) {
        if self.is_primary() {
            self.coordinator.signal_initialization();
        } else {
            self.coordinator.await_initialization();
        }
    }
}

//! Rotating Critical Section
//!
//! Each round admits every initialized processor to a single-processor
//! critical region exactly once, in increasing processor-number order.
//! State is a monotone `syncCount` (how many processors have entered
//! this round) and a `criticalTicket` (whose turn it is). Before the
//! coordinator has finished its init barrier, the primitive degenerates
//! to plain assignment rather than the full protocol.

use crate::logging::{log_event, GcEvent};
use crate::stats;
use crate::sync::registry::{Coordinator, ProcessorHandle};
use std::sync::atomic::Ordering;

impl Coordinator {
    /// Enter this processor's exclusive slot in the current round.
    pub fn begin_critical_section(&self, ordinal: usize) {
        if !self.is_initialized() {
            self.sync_count.store(1, Ordering::SeqCst);
            return;
        }

        {
            let _guard = self.crit_lock.lock();
            let count = self.sync_count.fetch_add(1, Ordering::SeqCst) + 1;
            if count == self.num_processors {
                self.critical_ticket.store(0, Ordering::SeqCst);
            }
        }

        while self.critical_ticket.load(Ordering::Acquire) != ordinal as isize {
            std::hint::spin_loop();
        }
    }

    /// Leave this processor's exclusive slot.
    pub fn end_critical_section(&self) {
        if !self.is_initialized() {
            self.sync_count.store(0, Ordering::SeqCst);
            return;
        }

        let post = self.critical_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        if post == self.num_processors as isize {
            self.sync_count.store(0, Ordering::SeqCst);
            self.critical_ticket.store(-1, Ordering::SeqCst);
        }

        while self.critical_ticket.load(Ordering::Acquire) >= 0 {
            std::hint::spin_loop();
        }
    }
}

/// RAII guard for a processor's slot in the rotating critical section.
/// Dropping it calls `end_critical_section`.
pub struct CriticalSectionGuard<'a> {
    handle: &'a ProcessorHandle,
}

impl ProcessorHandle {
    pub fn enter_critical_section(&self) -> CriticalSectionGuard<'_> {
        self.coordinator.begin_critical_section(self.ordinal);
        log_event(GcEvent::CriticalSection { processor: self.ordinal, entered: true });
        stats::global().record_critical_section_entered();
        CriticalSectionGuard { handle: self }
    }
}

impl Drop for CriticalSectionGuard<'_> {
    fn drop(&mut self) {
        self.handle.coordinator.end_critical_section();
        log_event(GcEvent::CriticalSection { processor: self.handle.ordinal, entered: false });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::registry::Coordinator;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn rotating_critical_section_admits_in_processor_order() {
        let coordinator = Coordinator::new(3);
        let handles: Vec<_> = (0..3).map(|o| ProcessorHandle::new(coordinator.clone(), o)).collect();

        let init_threads: Vec<_> = handles
            .clone()
            .into_iter()
            .map(|h| thread::spawn(move || h.signal_initialization()))
            .collect();
        for t in init_threads {
            t.join().unwrap();
        }

        let order = Arc::new(Mutex::new(Vec::new()));
        let threads: Vec<_> = handles
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

        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(coordinator.sync_count.load(Ordering::Acquire), 0);
        assert_eq!(coordinator.critical_ticket.load(Ordering::Acquire), -1);
    }

    #[test]
    fn degenerates_to_plain_assignment_before_initialization() {
        let coordinator = Coordinator::new(2);
        coordinator.begin_critical_section(0);
        assert_eq!(coordinator.sync_count.load(Ordering::Acquire), 1);
        coordinator.end_critical_section();
        assert_eq!(coordinator.sync_count.load(Ordering::Acquire), 0);
    }
}

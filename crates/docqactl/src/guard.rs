//! RAII guards for the loading indicator and the re-entrancy flags

use std::sync::atomic::{AtomicBool, Ordering};

use crate::events::{EventSink, Operation, UiEvent};

/// Shows the loading indicator for `op` until dropped
pub struct BusyGuard {
    sink: EventSink,
    op: Operation,
}

impl BusyGuard {
    pub fn new(sink: &EventSink, op: Operation) -> Self {
        sink.emit(UiEvent::Busy { op, active: true });
        Self {
            sink: sink.clone(),
            op,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.sink.emit(UiEvent::Busy {
            op: self.op,
            active: false,
        });
    }
}

/// Holds an in-flight flag; at most one holder per flag
pub struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    pub fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

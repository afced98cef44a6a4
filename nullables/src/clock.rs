//! Controllable time source.
//!
//! The engine takes `now` as an argument on every call; tests read it from a
//! `NullClock` so deadlines and voting windows can be stepped through exactly.

use diva_types::Timestamp;
use std::cell::Cell;

pub struct NullClock {
    current: Cell<Timestamp>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(Timestamp::new(initial_secs)),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.current.get()
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().plus_secs(secs));
    }

    /// Jump to an absolute time (may go backwards).
    pub fn set(&self, secs: u64) {
        self.current.set(Timestamp::new(secs));
    }

    /// `secs` after the current time; handy for permit deadlines.
    pub fn in_secs(&self, secs: u64) -> Timestamp {
        self.now().plus_secs(secs)
    }
}

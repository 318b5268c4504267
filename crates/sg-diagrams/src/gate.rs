//! Counting admission gate for render jobs.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct GateState {
    in_flight: usize,
    peak: usize,
}

/// Blocking counting semaphore that also records its high-water mark.
///
/// At most `capacity` permits are outstanding at once. A permit is returned
/// when dropped, so a job releases its slot on every exit path.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    state: Mutex<GateState>,
    released: Condvar,
}

impl AdmissionGate {
    /// Create a gate admitting up to `capacity` jobs (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(GateState::default()),
            released: Condvar::new(),
        }
    }

    /// Block until a slot is free, then take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self
            .released
            .wait_while(self.lock(), |s| s.in_flight >= self.capacity)
            .unwrap_or_else(PoisonError::into_inner);
        state.in_flight += 1;
        state.peak = state.peak.max(state.in_flight);
        Permit { gate: self }
    }

    /// Maximum number of permits ever held at the same time.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.lock().peak
    }

    /// Number of permits currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        self.lock().in_flight -= 1;
        self.released.notify_one();
    }
}

/// Admission slot held by a running job.
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

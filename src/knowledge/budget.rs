// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared byte budget for one aggregation request
//!
//! Workers ask [`BudgetCoordinator::try_admit`] before fetching and hand their
//! text to [`BudgetCoordinator::reserve`] afterwards. `reserve` is the only
//! place bytes are charged, so concurrent workers can never overshoot the cap.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::utils::text::truncate_to_char_boundary;

#[derive(Debug, Default)]
struct BudgetState {
    consumed_bytes: u64,
    stopped: bool,
}

impl BudgetState {
    fn exhausted(&self, cap_bytes: u64) -> bool {
        self.stopped || self.consumed_bytes >= cap_bytes
    }
}

/// Lock-guarded consumed-bytes counter plus stop flag
#[derive(Debug)]
pub struct BudgetCoordinator {
    cap_bytes: u64,
    state: Mutex<BudgetState>,
}

impl BudgetCoordinator {
    pub fn new(cap_bytes: u64) -> Self {
        Self {
            cap_bytes,
            state: Mutex::new(BudgetState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BudgetState> {
        // State stays consistent even if a holder panicked mid-update
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a new fetch may start. Latches the stop flag once exhausted.
    pub fn try_admit(&self) -> bool {
        let mut state = self.lock();
        if state.exhausted(self.cap_bytes) {
            state.stopped = true;
            return false;
        }
        true
    }

    /// Charge `candidate` against the budget
    ///
    /// Returns the part of `candidate` that fits (possibly empty), or `None`
    /// when the budget was already exhausted. Truncation never splits a
    /// UTF-8 code point. The budget stops once the cap is reached.
    pub fn reserve(&self, candidate: &str) -> Option<String> {
        let mut state = self.lock();
        if state.exhausted(self.cap_bytes) {
            state.stopped = true;
            return None;
        }

        let remaining = self.cap_bytes - state.consumed_bytes;
        let limit = usize::try_from(remaining).unwrap_or(usize::MAX);
        let chunk = truncate_to_char_boundary(candidate, limit);

        state.consumed_bytes += chunk.len() as u64;
        if state.consumed_bytes >= self.cap_bytes {
            state.stopped = true;
        }

        Some(chunk.to_string())
    }

    pub fn consumed_bytes(&self) -> u64 {
        self.lock().consumed_bytes
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Whether the whole budget has been charged
    pub fn is_capped(&self) -> bool {
        self.consumed_bytes() >= self.cap_bytes
    }
}

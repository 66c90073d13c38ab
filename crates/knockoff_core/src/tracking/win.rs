//! Win condition: every tracked entity knocked off the platform.
//!
//! `Pending -> Won` fires at most once per epoch. Only `reset()` leaves `Won`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WinPhase {
    Pending,
    Won,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
pub struct WinState {
    pub has_won: bool,
}

/// Result of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinEvaluation {
    /// Already won this epoch; nothing checked.
    AlreadyWon,
    /// Population below the configured minimum (or empty); check deferred.
    InsufficientPopulation { tracked: usize, required: usize },
    /// Some entities still on the platform.
    Pending { on_platform: usize },
    /// Transitioned to `Won` on this call.
    Fired,
}

impl WinEvaluation {
    pub fn fired(self) -> bool {
        matches!(self, WinEvaluation::Fired)
    }
}

#[derive(Debug, Clone)]
pub struct WinConditionEvaluator {
    minimum_objects_to_track: usize,
    phase: WinPhase,
}

impl WinConditionEvaluator {
    pub fn new(minimum_objects_to_track: usize) -> Self {
        Self {
            minimum_objects_to_track,
            phase: WinPhase::Pending,
        }
    }

    pub fn phase(&self) -> WinPhase {
        self.phase
    }

    pub fn state(&self) -> WinState {
        WinState {
            has_won: self.phase == WinPhase::Won,
        }
    }

    pub fn minimum_objects_to_track(&self) -> usize {
        self.minimum_objects_to_track
    }

    /// Apply the win predicate to the current aggregate counts.
    pub fn evaluate(&mut self, on_platform: usize, tracked: usize) -> WinEvaluation {
        if self.phase == WinPhase::Won {
            return WinEvaluation::AlreadyWon;
        }

        if tracked < self.minimum_objects_to_track || tracked == 0 {
            log::debug!(
                "Not enough objects to check win condition. Have {}, need {}",
                tracked,
                self.minimum_objects_to_track.max(1)
            );
            return WinEvaluation::InsufficientPopulation {
                tracked,
                required: self.minimum_objects_to_track,
            };
        }

        log::debug!(
            "Win condition check: {}/{} objects off platform",
            tracked.saturating_sub(on_platform),
            tracked
        );

        if on_platform == 0 {
            self.phase = WinPhase::Won;
            log::info!("Win condition met: all {} objects knocked off", tracked);
            WinEvaluation::Fired
        } else {
            WinEvaluation::Pending { on_platform }
        }
    }

    /// Start a new epoch. Does not touch entity membership.
    pub fn reset(&mut self) {
        self.phase = WinPhase::Pending;
    }
}

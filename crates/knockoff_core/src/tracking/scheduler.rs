//! Periodic re-classification of tracked entities.
//!
//! - interval `0.0`: every call is processed
//! - interval `> 0`: a call runs only if at least `interval` seconds of host
//!   time passed since the last processed call; otherwise nothing is
//!   classified at all.

use serde::Serialize;

use super::bounds::{Membership, PlatformBounds};
use super::entity::EntityId;
use super::events::{EventChannel, TrackingEvent};
use super::registry::{EntityRegistry, PositionMap};

/// Outcome of one [`TrackingScheduler::tick`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// False when the call was rate limited.
    pub processed: bool,
    /// Membership changes in id order.
    pub transitions: Vec<(EntityId, Membership)>,
    /// Tracked entities that had no position this tick.
    pub missing: usize,
    /// True only on the tick that fired the win.
    pub won: bool,
}

impl TickReport {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn count_changed(&self) -> bool {
        !self.transitions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TrackingScheduler {
    check_interval_seconds: f64,
    last_run: Option<f64>,
}

impl Default for TrackingScheduler {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl TrackingScheduler {
    pub fn new(check_interval_seconds: f64) -> Self {
        Self {
            check_interval_seconds: check_interval_seconds.max(0.0),
            last_run: None,
        }
    }

    pub fn check_interval(&self) -> f64 {
        self.check_interval_seconds
    }

    /// Make the next call run regardless of the interval.
    pub fn rearm(&mut self) {
        self.last_run = None;
    }

    fn is_due(&mut self, now: f64) -> bool {
        if self.check_interval_seconds > 0.0 {
            if let Some(last) = self.last_run {
                // A clock that went backwards re-arms the limiter.
                if now >= last && now - last < self.check_interval_seconds {
                    return false;
                }
            }
        }
        self.last_run = Some(now);
        true
    }

    /// Re-classify every tracked entity that has a position in `positions`.
    ///
    /// Publishes one `EntityTransitioned` per change, then a single
    /// `TrackedCountChanged` if anything changed.
    pub fn tick(
        &mut self,
        now: f64,
        registry: &mut EntityRegistry,
        bounds: &PlatformBounds,
        positions: &PositionMap,
        events: &mut EventChannel,
    ) -> TickReport {
        if !self.is_due(now) {
            return TickReport::skipped();
        }

        let mut missing = 0;
        let mut changes = Vec::new();
        for entity in registry.tracked() {
            let Some(position) = positions.get(&entity.id) else {
                missing += 1;
                continue;
            };
            let membership = bounds.classify(position);
            if membership != entity.membership {
                changes.push((entity.id.clone(), membership, *position));
            }
        }

        let mut transitions = Vec::with_capacity(changes.len());
        for (id, membership, position) in changes {
            if !registry.transition(&id, membership) {
                continue;
            }
            match membership {
                Membership::OffPlatform => log::debug!(
                    "Entity '{}' fell off the platform at ({:.2}, {:.2}, {:.2})",
                    id,
                    position.x,
                    position.y,
                    position.z
                ),
                Membership::OnPlatform => log::debug!("Entity '{}' returned to the platform", id),
            }
            events.publish(TrackingEvent::EntityTransitioned {
                entity: id.clone(),
                membership,
            });
            transitions.push((id, membership));
        }

        if !transitions.is_empty() {
            registry.publish_count(events);
        }

        TickReport {
            processed: true,
            transitions,
            missing,
            won: false,
        }
    }
}

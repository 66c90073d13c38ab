//! Typed event channel.
//!
//! Three closed event kinds, delivered synchronously to every subscriber in
//! the call that produced them. Nothing is queued across ticks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::bounds::Membership;
use super::entity::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingEvent {
    /// An entity's membership changed.
    EntityTransitioned {
        entity: EntityId,
        membership: Membership,
    },
    /// Aggregate on-platform count after a registry change or transition.
    TrackedCountChanged { on_platform: usize },
    /// Every tracked entity is off the platform. Fires once per epoch.
    WinConditionMet,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EntityTransitioned,
    TrackedCountChanged,
    WinConditionMet,
}

impl TrackingEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TrackingEvent::EntityTransitioned { .. } => EventKind::EntityTransitioned,
            TrackingEvent::TrackedCountChanged { .. } => EventKind::TrackedCountChanged,
            TrackingEvent::WinConditionMet => EventKind::WinConditionMet,
        }
    }
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::EntityTransitioned => "entity_transitioned",
            EventKind::TrackedCountChanged => "tracked_count_changed",
            EventKind::WinConditionMet => "win_condition_met",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TrackingEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackingEvent::EntityTransitioned { entity, membership } => {
                write!(f, "{} -> {:?}", entity, membership)
            }
            TrackingEvent::TrackedCountChanged { on_platform } => {
                write!(f, "on platform: {}", on_platform)
            }
            TrackingEvent::WinConditionMet => write!(f, "win condition met"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&TrackingEvent) + Send>;

/// Fan-out of [`TrackingEvent`]s to any number of subscribers.
#[derive(Default)]
pub struct EventChannel {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribers are called in subscription order from inside [`publish`].
    /// Whatever lock guards the owner of this channel is held during the call.
    ///
    /// [`publish`]: EventChannel::publish
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&TrackingEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Subscribe a recorder and hand back its shared log.
    pub fn subscribe_log(&mut self) -> (SubscriptionId, EventLog) {
        let log = EventLog::default();
        let sink = log.clone();
        let id = self.subscribe(move |event| sink.push(event.clone()));
        (id, log)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&mut self, event: TrackingEvent) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }
}

/// Shared, clonable recording of published events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TrackingEvent>>>,
}

impl EventLog {
    fn guard(&self) -> MutexGuard<'_, Vec<TrackingEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: TrackingEvent) {
        self.guard().push(event);
    }

    pub fn snapshot(&self) -> Vec<TrackingEvent> {
        self.guard().clone()
    }

    pub fn drain(&self) -> Vec<TrackingEvent> {
        std::mem::take(&mut *self.guard())
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.guard().iter().filter(|e| e.kind() == kind).count()
    }
}

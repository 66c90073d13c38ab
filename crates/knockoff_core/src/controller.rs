//! Session controller
//!
//! One `PlatformTracker` per game session owns the registry, scheduler, win
//! evaluator and event channel. Hosts hold it (or a [`SharedTracker`]) and
//! pass it where it is needed; there is no global instance.
//!
//! [`SharedTracker`]: crate::shared::SharedTracker

use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::tracking::{
    detect_bounds, EntityId, EntityIdAllocator, EntityRegistry, EventChannel, EventLog, Membership,
    PlatformBounds, PlatformGeometry, PlatformProbe, Point3, PositionMap, SubscriptionId,
    TickReport, TrackableEntity, TrackingEvent, TrackingScheduler, WinConditionEvaluator, WinState,
};

/// Aggregate counts for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStats {
    pub registered: usize,
    pub tracked: usize,
    pub on_platform: usize,
    pub off_platform: usize,
    pub has_won: bool,
}

#[derive(Debug)]
pub struct PlatformTracker {
    config: TrackerConfig,
    bounds: PlatformBounds,
    registry: EntityRegistry,
    scheduler: TrackingScheduler,
    win: WinConditionEvaluator,
    events: EventChannel,
    ids: EntityIdAllocator,
}

impl PlatformTracker {
    /// Build a tracker from configuration alone (no platform lookup).
    pub fn new(config: TrackerConfig) -> Result<Self> {
        Self::initialize(config, &None::<PlatformGeometry>)
    }

    /// Build a tracker, deriving bounds from `probe` when auto-detect is on.
    pub fn initialize(config: TrackerConfig, probe: &dyn PlatformProbe) -> Result<Self> {
        config.validate()?;
        let mut bounds = config.bounds()?;
        if config.platform.auto_detect_platform {
            bounds = detect_bounds(bounds, probe, config.platform.auto_detect_margin)?;
        }

        Ok(Self {
            scheduler: TrackingScheduler::new(config.tracking.check_interval_seconds),
            win: WinConditionEvaluator::new(config.win.minimum_objects_to_track),
            config,
            bounds,
            registry: EntityRegistry::new(),
            events: EventChannel::new(),
            ids: EntityIdAllocator::new(),
        })
    }

    // ========================
    // Subscriptions
    // ========================

    /// Subscribers run synchronously inside the call that produced the event.
    /// When the tracker sits in a [`SharedTracker`] its lock is held at that
    /// point, so a subscriber must not call back into the same tracker.
    ///
    /// [`SharedTracker`]: crate::shared::SharedTracker
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&TrackingEvent) + Send + 'static,
    {
        self.events.subscribe(subscriber)
    }

    pub fn subscribe_log(&mut self) -> (SubscriptionId, EventLog) {
        self.events.subscribe_log()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ========================
    // Entity lifecycle
    // ========================

    /// Next `"{name}_{n}"` id for this session that is not already registered.
    pub fn allocate_id(&mut self, name: &str) -> EntityId {
        let registry = &self.registry;
        self.ids.allocate_unique(name, |id| registry.contains(id))
    }

    /// Create an entity with an id derived from `name` and register it.
    pub fn spawn(&mut self, name: &str) -> EntityId {
        let id = self.allocate_id(name);
        self.register(TrackableEntity::new(id.clone(), name));
        id
    }

    pub fn register(&mut self, entity: TrackableEntity) -> bool {
        let added = self.registry.register(entity, &mut self.events);
        if added {
            self.evaluate_win();
        }
        added
    }

    pub fn unregister(&mut self, id: &EntityId) -> bool {
        let removed = self.registry.unregister(id, &mut self.events);
        if removed {
            self.evaluate_win();
        }
        removed
    }

    /// Replace the registered set (e.g. after a scene reload), classifying
    /// each entity from `positions`.
    pub fn refresh<I>(&mut self, entities: I, positions: &PositionMap)
    where
        I: IntoIterator<Item = TrackableEntity>,
    {
        self.registry
            .refresh(entities, positions, &self.bounds, &mut self.events);
        self.evaluate_win();
    }

    pub fn set_tracked(&mut self, id: &EntityId, tracked: bool) -> bool {
        let changed = self.registry.set_tracked(id, tracked, &mut self.events);
        if changed {
            self.evaluate_win();
        }
        changed
    }

    // ========================
    // Evaluation
    // ========================

    /// Run one evaluation with the host's clock `now` (seconds).
    pub fn tick(&mut self, now: f64, positions: &PositionMap) -> TickReport {
        let mut report = self.scheduler.tick(
            now,
            &mut self.registry,
            &self.bounds,
            positions,
            &mut self.events,
        );
        if report.count_changed() {
            report.won = self.evaluate_win();
        }
        report
    }

    /// Restart signal: every entity back on the platform, new win epoch.
    pub fn restart(&mut self) {
        let moved = self.registry.reset();
        self.win.reset();
        self.scheduler.rearm();
        if self.registry.tracked_count() > 0 {
            self.registry.publish_count(&mut self.events);
        }
        log::info!("Game reset ({} objects returned to the platform)", moved);
    }

    /// Run the win predicate after a count change. Returns true if it fired.
    fn evaluate_win(&mut self) -> bool {
        let on_platform = self.registry.on_platform_count();
        let tracked = self.registry.tracked_count();
        let fired = self.win.evaluate(on_platform, tracked).fired();
        if fired {
            self.events.publish(TrackingEvent::WinConditionMet);
        }
        fired
    }

    // ========================
    // Queries
    // ========================

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn bounds(&self) -> &PlatformBounds {
        &self.bounds
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn is_position_on_platform(&self, position: &Point3) -> bool {
        self.bounds.contains(position)
    }

    pub fn membership(&self, id: &EntityId) -> Option<Membership> {
        self.registry.membership(id)
    }

    pub fn on_platform_ids(&self) -> Vec<EntityId> {
        self.registry.on_platform().iter().cloned().collect()
    }

    pub fn off_platform_ids(&self) -> Vec<EntityId> {
        self.registry.off_platform().iter().cloned().collect()
    }

    pub fn on_platform_count(&self) -> usize {
        self.registry.on_platform_count()
    }

    pub fn off_platform_count(&self) -> usize {
        self.registry.off_platform_count()
    }

    pub fn tracked_count(&self) -> usize {
        self.registry.tracked_count()
    }

    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    pub fn has_won(&self) -> bool {
        self.win.state().has_won
    }

    pub fn win_state(&self) -> WinState {
        self.win.state()
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            registered: self.registry.len(),
            tracked: self.registry.tracked_count(),
            on_platform: self.registry.on_platform_count(),
            off_platform: self.registry.off_platform_count(),
            has_won: self.has_won(),
        }
    }
}

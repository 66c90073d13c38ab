//! Registry of trackable entities and their platform membership.
//!
//! Every tracked entity sits in exactly one of `on_platform` / `off_platform`;
//! untracked entities sit in neither.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::bounds::{Membership, PlatformBounds};
use super::entity::{EntityId, TrackableEntity};
use super::events::{EventChannel, TrackingEvent};
use super::geometry::Point3;

/// Positions supplied by the host for one evaluation.
pub type PositionMap = HashMap<EntityId, Point3>;

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, TrackableEntity>,
    on_platform: BTreeSet<EntityId>,
    off_platform: BTreeSet<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. Tracked entities start on the platform.
    ///
    /// Returns false (and emits nothing) if the id is already registered.
    pub fn register(&mut self, mut entity: TrackableEntity, events: &mut EventChannel) -> bool {
        if self.entities.contains_key(&entity.id) {
            log::debug!("Entity '{}' already registered, ignoring", entity.id);
            return false;
        }
        entity.membership = Membership::OnPlatform;
        self.insert(entity);
        self.publish_count(events);
        true
    }

    /// Remove an entity from tracking. Unknown ids are ignored.
    pub fn unregister(&mut self, id: &EntityId, events: &mut EventChannel) -> bool {
        if self.entities.remove(id).is_none() {
            log::debug!("Entity '{}' is not registered, nothing to remove", id);
            return false;
        }
        self.on_platform.remove(id);
        self.off_platform.remove(id);
        self.publish_count(events);
        true
    }

    /// Replace the whole registry with `entities`, classifying each one
    /// against `bounds` where a position is known (on-platform otherwise).
    pub fn refresh<I>(
        &mut self,
        entities: I,
        positions: &PositionMap,
        bounds: &PlatformBounds,
        events: &mut EventChannel,
    ) where
        I: IntoIterator<Item = TrackableEntity>,
    {
        self.entities.clear();
        self.on_platform.clear();
        self.off_platform.clear();

        for mut entity in entities {
            if self.entities.contains_key(&entity.id) {
                log::debug!(
                    "Duplicate entity '{}' in refresh set, keeping the first",
                    entity.id
                );
                continue;
            }
            entity.membership = positions
                .get(&entity.id)
                .map(|p| bounds.classify(p))
                .unwrap_or(Membership::OnPlatform);
            self.insert(entity);
        }

        self.publish_count(events);
    }

    /// Force every registered entity back on the platform without
    /// classifying. Returns how many tracked entities changed set.
    pub fn reset(&mut self) -> usize {
        let moved = self.off_platform.len();
        for entity in self.entities.values_mut() {
            entity.membership = Membership::OnPlatform;
        }
        let off = std::mem::take(&mut self.off_platform);
        self.on_platform.extend(off);
        moved
    }

    /// Toggle whether an entity takes part in classification.
    pub fn set_tracked(&mut self, id: &EntityId, tracked: bool, events: &mut EventChannel) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            log::debug!("Entity '{}' is not registered, tracking unchanged", id);
            return false;
        };
        if entity.is_tracked == tracked {
            return false;
        }
        entity.is_tracked = tracked;
        entity.membership = Membership::OnPlatform;
        if tracked {
            self.on_platform.insert(id.clone());
        } else {
            self.on_platform.remove(id);
            self.off_platform.remove(id);
        }
        self.publish_count(events);
        true
    }

    /// Move a tracked entity to `membership`. Returns true if it changed.
    pub(crate) fn transition(&mut self, id: &EntityId, membership: Membership) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        if !entity.is_tracked || entity.membership == membership {
            return false;
        }
        entity.membership = membership;
        match membership {
            Membership::OnPlatform => {
                self.off_platform.remove(id);
                self.on_platform.insert(id.clone());
            }
            Membership::OffPlatform => {
                self.on_platform.remove(id);
                self.off_platform.insert(id.clone());
            }
        }
        true
    }

    pub(crate) fn publish_count(&self, events: &mut EventChannel) {
        let on_platform = self.on_platform_count();
        events.publish(TrackingEvent::TrackedCountChanged { on_platform });
    }

    fn insert(&mut self, entity: TrackableEntity) {
        if entity.is_tracked {
            match entity.membership {
                Membership::OnPlatform => self.on_platform.insert(entity.id.clone()),
                Membership::OffPlatform => self.off_platform.insert(entity.id.clone()),
            };
        }
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn get(&self, id: &EntityId) -> Option<&TrackableEntity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Membership of a tracked entity; `None` if unknown or untracked.
    pub fn membership(&self, id: &EntityId) -> Option<Membership> {
        self.entities
            .get(id)
            .filter(|e| e.is_tracked)
            .map(|e| e.membership)
    }

    /// Tracked entities in id order.
    pub fn tracked(&self) -> impl Iterator<Item = &TrackableEntity> {
        self.entities.values().filter(|e| e.is_tracked)
    }

    pub fn entities(&self) -> impl Iterator<Item = &TrackableEntity> {
        self.entities.values()
    }

    pub fn on_platform(&self) -> &BTreeSet<EntityId> {
        &self.on_platform
    }

    pub fn off_platform(&self) -> &BTreeSet<EntityId> {
        &self.off_platform
    }

    pub fn on_platform_count(&self) -> usize {
        self.on_platform.len()
    }

    pub fn off_platform_count(&self) -> usize {
        self.off_platform.len()
    }

    pub fn tracked_count(&self) -> usize {
        self.on_platform.len() + self.off_platform.len()
    }

    /// All registered entities, tracked or not.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check the partition invariant. Used by tests.
    pub fn is_consistent(&self) -> bool {
        let tracked: BTreeSet<&EntityId> = self.tracked().map(|e| &e.id).collect();
        let union: BTreeSet<&EntityId> = self.on_platform.union(&self.off_platform).collect();
        let disjoint = self.on_platform.is_disjoint(&self.off_platform);
        let memberships_match = self.tracked().all(|e| match e.membership {
            Membership::OnPlatform => self.on_platform.contains(&e.id),
            Membership::OffPlatform => self.off_platform.contains(&e.id),
        });
        disjoint && tracked == union && memberships_match
    }
}

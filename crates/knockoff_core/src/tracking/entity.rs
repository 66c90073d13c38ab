use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bounds::Membership;

/// Stable identifier of a trackable entity, unique within one registry.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Hands out `"{name}_{n}"` ids in creation order.
#[derive(Debug, Clone, Default)]
pub struct EntityIdAllocator {
    next_suffix: u64,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, name: &str) -> EntityId {
        self.allocate_unique(name, |_| false)
    }

    /// Next `"{name}_{n}"` id for which `is_taken` is false.
    ///
    /// Suffixes skipped over are consumed, so the sequence stays a pure
    /// function of creation order and of the ids already taken.
    pub fn allocate_unique<F>(&mut self, name: &str, is_taken: F) -> EntityId
    where
        F: Fn(&EntityId) -> bool,
    {
        loop {
            let id = EntityId(format!("{}_{}", name, self.next_suffix));
            self.next_suffix += 1;
            if !is_taken(&id) {
                return id;
            }
            log::debug!("Id '{}' is taken, trying the next suffix", id);
        }
    }
}

/// An object the host wants watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackableEntity {
    pub id: EntityId,
    pub name: String,
    /// Untracked entities are registered but never classified.
    pub is_tracked: bool,
    pub membership: Membership,
}

impl TrackableEntity {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_tracked: true,
            membership: Membership::OnPlatform,
        }
    }

    /// Entity whose id is derived from its name.
    pub fn named(name: &str, ids: &mut EntityIdAllocator) -> Self {
        Self::new(ids.allocate(name), name)
    }

    pub fn untracked(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        let mut entity = Self::new(id, name);
        entity.is_tracked = false;
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 3] = ["crate", "barrel", "crate"];

    #[test]
    fn test_allocator_is_deterministic() {
        let mut a = EntityIdAllocator::new();
        let mut b = EntityIdAllocator::new();
        let first: Vec<_> = NAMES.iter().map(|n| a.allocate(n)).collect();
        let second: Vec<_> = NAMES.iter().map(|n| b.allocate(n)).collect();
        assert_eq!(first, second);
        assert_eq!(first[0].as_str(), "crate_0");
        assert_eq!(first[2].as_str(), "crate_2");
    }

    #[test]
    fn test_same_name_gets_distinct_ids() {
        let mut ids = EntityIdAllocator::new();
        let a = TrackableEntity::named("knight", &mut ids);
        let b = TrackableEntity::named("knight", &mut ids);
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn test_allocate_unique_skips_taken_ids() {
        let mut ids = EntityIdAllocator::new();
        let taken = [EntityId::new("crate_0"), EntityId::new("crate_1")];
        let id = ids.allocate_unique("crate", |id| taken.contains(id));
        assert_eq!(id.as_str(), "crate_2");
        assert_eq!(ids.allocate("crate").as_str(), "crate_3");
    }

    #[test]
    fn test_untracked_flag() {
        let e = TrackableEntity::untracked("banner", "Banner");
        assert!(!e.is_tracked);
        assert_eq!(e.membership, Membership::OnPlatform);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = EntityId::new("crate_3");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"crate_3\"");
    }
}

//! Ordered entity storage
//!
//! Entities keep insertion order (ascending id), which is the iteration order
//! for motion updates and collision resolution.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, Lifecycle};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
    /// Next entity ID (never reused within a session)
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Append an entity; returns its id
    pub fn insert(&mut self, entity: Entity) -> u32 {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Remove an entity immediately
    pub fn remove(&mut self, id: u32) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Entities still in play
    pub fn active(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Count active entities matching a predicate on their kind
    pub fn count_where(&self, f: impl Fn(&EntityKind) -> bool) -> usize {
        self.active().filter(|e| f(&e.kind)).count()
    }

    /// Drop everything that was collected or expired; returns how many went
    pub fn prune(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.lifecycle == Lifecycle::Active);
        before - self.entities.len()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Full reset for a new session
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Motion;
    use glam::Vec2;

    fn cloud(store: &mut EntityStore) -> u32 {
        let id = store.next_entity_id();
        store.insert(Entity::new(
            id,
            EntityKind::Cloud,
            Vec2::ZERO,
            Vec2::ONE,
            Motion::Fixed,
        ))
    }

    #[test]
    fn test_ids_are_monotonic_and_ordered() {
        let mut store = EntityStore::new();
        let a = cloud(&mut store);
        let b = cloud(&mut store);
        let c = cloud(&mut store);
        assert!(a < b && b < c);
        let ids: Vec<u32> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_prune_removes_resolved_entities() {
        let mut store = EntityStore::new();
        let a = cloud(&mut store);
        let b = cloud(&mut store);
        if let Some(e) = store.get_mut(a) {
            e.lifecycle = Lifecycle::Collected;
        }
        assert_eq!(store.active_count(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.prune(), 1);
        assert!(store.get(a).is_none());
        assert!(store.get(b).is_some());
    }

    #[test]
    fn test_clear_resets_ids() {
        let mut store = EntityStore::new();
        cloud(&mut store);
        cloud(&mut store);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(cloud(&mut store), 1);
    }

    #[test]
    fn test_remove() {
        let mut store = EntityStore::new();
        let a = cloud(&mut store);
        assert!(store.remove(a).is_some());
        assert!(store.remove(a).is_none());
    }
}

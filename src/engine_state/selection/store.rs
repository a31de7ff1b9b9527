//! Per-actor selection table.

use std::collections::HashMap;

use super::Selection;
use crate::engine_state::voxels::grid::{Position, WorldId};
use crate::engine_state::ActorId;

/// Every actor's current selection. Entries are created empty on first
/// access and live until [`SelectionStore::remove`] is called at session end.
#[derive(Default)]
pub struct SelectionStore {
    selections: HashMap<ActorId, Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The actor's selection, created empty if the actor has none yet.
    pub fn selection(&mut self, actor: ActorId) -> &mut Selection {
        self.selections.entry(actor).or_default()
    }

    /// The actor's selection, without creating one.
    pub fn get(&self, actor: ActorId) -> Option<&Selection> {
        self.selections.get(&actor)
    }

    pub fn set_first_position(&mut self, actor: ActorId, world: WorldId, pos: Position) {
        self.selection(actor).set_corner_a(world, pos);
    }

    pub fn set_second_position(&mut self, actor: ActorId, world: WorldId, pos: Position) {
        self.selection(actor).set_corner_b(world, pos);
    }

    /// Drops the actor's selection, returning it if one existed.
    pub fn remove(&mut self, actor: ActorId) -> Option<Selection> {
        self.selections.remove(&actor)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn selections_are_created_on_first_access() {
        let mut store = SelectionStore::new();
        let alice = ActorId(1);
        assert!(store.get(alice).is_none());

        assert!(!store.selection(alice).is_complete());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn actors_do_not_share_selections() {
        let mut store = SelectionStore::new();
        let (alice, bob) = (ActorId(1), ActorId(2));

        store.set_first_position(alice, WorldId(0), Point3::new(0, 0, 0));
        store.set_second_position(alice, WorldId(0), Point3::new(3, 0, 0));
        store.set_first_position(bob, WorldId(0), Point3::new(9, 9, 9));

        assert_eq!(store.get(alice).and_then(Selection::volume), Some(4));
        assert_eq!(store.get(bob).and_then(Selection::volume), None);

        assert!(store.remove(alice).is_some());
        assert!(store.get(alice).is_none());
    }
}

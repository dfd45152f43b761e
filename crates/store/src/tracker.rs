//! Change tracking for a single unit of work.

use crate::entity::Entity;

/// Lifecycle state of a tracked entity within a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Registered for insertion on the next save.
    Added,
    /// Loaded and not changed since.
    Unchanged,
    /// Loaded and changed; written on the next save.
    Modified,
}

/// A tracked entity together with its state.
#[derive(Debug, Clone)]
pub struct EntityEntry<E> {
    entity: E,
    state: EntityState,
    owned_changed: bool,
}

impl<E: Entity> EntityEntry<E> {
    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut E {
        &mut self.entity
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// True when a value owned by this entity changed even though the
    /// entity's own columns did not.
    pub fn has_changed_owned_entities(&self) -> bool {
        self.owned_changed
    }

    /// True when the entry will be written on the next save.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, EntityState::Added | EntityState::Modified) || self.owned_changed
    }
}

/// Entities registered with a unit of work, in registration order.
#[derive(Debug, Clone)]
pub struct ChangeTracker<E> {
    entries: Vec<EntityEntry<E>>,
}

impl<E> Default for ChangeTracker<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: Entity> ChangeTracker<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: E::Id) -> Option<usize> {
        self.entries.iter().position(|e| e.entity.id() == id)
    }

    /// Returns the tracked copy of an entity, if any.
    pub fn find(&self, id: E::Id) -> Option<&E> {
        self.position(id).map(|i| &self.entries[i].entity)
    }

    /// Registers a new entity for insertion.
    pub fn track_added(&mut self, entity: E) {
        match self.position(entity.id()) {
            Some(i) => {
                self.entries[i].entity = entity;
                self.entries[i].state = EntityState::Added;
            }
            None => self.entries.push(EntityEntry {
                entity,
                state: EntityState::Added,
                owned_changed: false,
            }),
        }
    }

    /// Registers a freshly loaded entity.
    ///
    /// If the entity is already tracked the tracked copy wins, so pending
    /// changes are not overwritten by a re-read.
    pub fn track_unchanged(&mut self, entity: E) -> E {
        if let Some(existing) = self.find(entity.id()) {
            return existing.clone();
        }
        let copy = entity.clone();
        self.entries.push(EntityEntry {
            entity,
            state: EntityState::Unchanged,
            owned_changed: false,
        });
        copy
    }

    /// Replaces the tracked copy with `entity` and marks it modified.
    ///
    /// Untracked entities are attached as modified. Entities still waiting
    /// to be inserted stay `Added`.
    pub fn mark_modified(&mut self, entity: E) {
        match self.position(entity.id()) {
            Some(i) => {
                let entry = &mut self.entries[i];
                entry.entity = entity;
                if entry.state != EntityState::Added {
                    entry.state = EntityState::Modified;
                }
            }
            None => self.entries.push(EntityEntry {
                entity,
                state: EntityState::Modified,
                owned_changed: false,
            }),
        }
    }

    /// Flags that a value owned by a tracked entity changed.
    ///
    /// Returns false if the entity is not tracked.
    pub fn mark_owned_changed(&mut self, id: E::Id) -> bool {
        match self.position(id) {
            Some(i) => {
                self.entries[i].owned_changed = true;
                true
            }
            None => false,
        }
    }

    /// Stops tracking an entity.
    pub fn detach(&mut self, id: E::Id) {
        self.entries.retain(|e| e.entity.id() != id);
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntityEntry<E>> {
        self.entries.iter()
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut EntityEntry<E>> {
        self.entries.iter_mut()
    }

    /// Entries that will be written on the next save.
    pub fn pending(&self) -> impl Iterator<Item = &EntityEntry<E>> {
        self.entries.iter().filter(|e| e.is_pending())
    }

    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(EntityEntry::is_pending)
    }

    /// Marks every entry unchanged after a successful save.
    pub fn accept_all_changes(&mut self) {
        for entry in &mut self.entries {
            entry.state = EntityState::Unchanged;
            entry.owned_changed = false;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Per-run compilation state
//!
//! Tracks which entities have been declared and which many-to-many
//! relationships are waiting for a junction entity. A context belongs to one
//! compilation run and is never shared between runs.

use indexmap::IndexSet;

use crate::schema::types::{EntityId, RelationshipId};

#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    emitted: IndexSet<EntityId>,
    many_to_many: IndexSet<RelationshipId>,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the entity's declaration has been written
    pub fn mark_emitted(&mut self, entity: EntityId) {
        self.emitted.insert(entity);
    }

    pub fn is_emitted(&self, entity: EntityId) -> bool {
        self.emitted.contains(&entity)
    }

    /// Queue a many-to-many relationship; returns false if already queued
    pub fn defer(&mut self, relationship: RelationshipId) -> bool {
        self.many_to_many.insert(relationship)
    }

    /// Queued many-to-many relationships in first-deferral order
    pub fn deferred(&self) -> impl Iterator<Item = RelationshipId> + '_ {
        self.many_to_many.iter().copied()
    }
}

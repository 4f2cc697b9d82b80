//! Dependency graph and declaration order
//!
//! Edges are derived from classifier decisions: when an entity owns a key to
//! another entity, the target is its parent and must be declared first.
//! Forward references remain available as a fallback, so a cycle is resolved
//! by dropping edges rather than failing.
//!
//! Cycle breaking is a greedy policy, not a minimum feedback arc set. Each
//! stall removes exactly one edge between entities still waiting to be
//! placed: the first soft edge found, otherwise the edge into the waiting
//! entity with the fewest waiting parents. A break costs O(n²) and is fully
//! deterministic for a given input order.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::classifier::{decide, dependency_kind, Decision, DependencyKind};
use crate::schema::normalize::CompiledModel;
use crate::schema::types::{EntityId, Side};

/// Parent -> children map over the compiled entities
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    children: IndexMap<EntityId, IndexMap<EntityId, DependencyKind>>,
}

/// An edge removed to break a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenEdge {
    pub parent: EntityId,
    pub child: EntityId,
    pub kind: DependencyKind,
}

/// Declaration order plus the edges given up to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    pub order: Vec<EntityId>,
    pub broken: Vec<BrokenEdge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from the owner decision of every relationship end
    pub fn build(model: &CompiledModel<'_>) -> Self {
        let mut graph = Self::new();

        for rel in model.relationships() {
            for side in [Side::End1, Side::End2] {
                if decide(model, rel, side) != Decision::Own {
                    continue;
                }
                if let Some(kind) = dependency_kind(rel, side) {
                    let parent = rel.end(side.opposite()).entity;
                    let child = rel.end(side).entity;
                    tracing::debug!(
                        parent = model.name(parent),
                        child = model.name(child),
                        kind = ?kind,
                        "Dependency edge"
                    );
                    graph.add_edge(parent, child, kind);
                }
            }
        }

        graph
    }

    /// Record that `child` depends on `parent`; a hard edge wins over a soft one
    pub fn add_edge(&mut self, parent: EntityId, child: EntityId, kind: DependencyKind) {
        if parent == child {
            return;
        }
        let entry = self
            .children
            .entry(parent)
            .or_default()
            .entry(child)
            .or_insert(kind);
        *entry = (*entry).max(kind);
    }

    pub fn edge(&self, parent: EntityId, child: EntityId) -> Option<DependencyKind> {
        self.children
            .get(&parent)
            .and_then(|children| children.get(&child))
            .copied()
    }

    pub fn has_edge(&self, parent: EntityId, child: EntityId) -> bool {
        self.edge(parent, child).is_some()
    }

    pub fn remove_edge(&mut self, parent: EntityId, child: EntityId) -> Option<DependencyKind> {
        self.children
            .get_mut(&parent)
            .and_then(|children| children.shift_remove(&child))
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(IndexMap::len).sum()
    }

    /// All edges as `(parent, child, kind)`
    pub fn edges(&self) -> impl Iterator<Item = (EntityId, EntityId, DependencyKind)> + '_ {
        self.children.iter().flat_map(|(&parent, children)| {
            children
                .iter()
                .map(move |(&child, &kind)| (parent, child, kind))
        })
    }
}

/// Compute the declaration order of the compiled entities
pub fn topological_sort(model: &CompiledModel<'_>) -> Result<TopologicalOrder> {
    let graph = DependencyGraph::build(model);
    let sorted = sort(model.entity_ids().collect(), graph)?;

    for edge in &sorted.broken {
        tracing::debug!(
            parent = model.name(edge.parent),
            child = model.name(edge.child),
            kind = ?edge.kind,
            "Broke dependency cycle"
        );
    }

    Ok(sorted)
}

/// Linearize `entities` with respect to `graph`
///
/// Each round places every entity no waiting entity is a parent of. When no
/// such entity exists the remaining ones form a cycle and one edge is removed
/// before retrying.
pub fn sort(entities: Vec<EntityId>, mut graph: DependencyGraph) -> Result<TopologicalOrder> {
    let mut remaining = entities;
    let mut order = Vec::with_capacity(remaining.len());
    let mut broken = Vec::new();

    while !remaining.is_empty() {
        let roots: Vec<EntityId> = remaining
            .iter()
            .copied()
            .filter(|&e| !remaining.iter().any(|&p| p != e && graph.has_edge(p, e)))
            .collect();

        if roots.is_empty() {
            broken.push(break_cycle(&mut graph, &remaining)?);
            continue;
        }

        remaining.retain(|e| !roots.contains(e));
        order.extend(roots);
    }

    Ok(TopologicalOrder { order, broken })
}

fn break_cycle(graph: &mut DependencyGraph, remaining: &[EntityId]) -> Result<BrokenEdge> {
    for &child in remaining {
        let soft_parent = remaining
            .iter()
            .copied()
            .find(|&parent| graph.edge(parent, child) == Some(DependencyKind::Soft));
        if let Some(parent) = soft_parent {
            graph.remove_edge(parent, child);
            return Ok(BrokenEdge {
                parent,
                child,
                kind: DependencyKind::Soft,
            });
        }
    }

    let parent_count = |e: EntityId| {
        remaining
            .iter()
            .filter(|&&p| graph.has_edge(p, e))
            .count()
    };
    let mut ranked = remaining.to_vec();
    ranked.sort_by_key(|&e| parent_count(e));

    for child in ranked {
        let parent = remaining.iter().copied().find(|&p| graph.has_edge(p, child));
        if let Some(parent) = parent {
            if let Some(kind) = graph.remove_edge(parent, child) {
                return Ok(BrokenEdge {
                    parent,
                    child,
                    kind,
                });
            }
        }
    }

    Err(Error::InvariantViolation(format!(
        "no removable dependency edge among {} stalled entities",
        remaining.len()
    )))
}

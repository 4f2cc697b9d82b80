//! Schema module for erd_peewee
//!
//! This module compiles an entity-relationship model into an ordered
//! PeeWee module: normalization, field mapping, relationship classification,
//! junction synthesis, dependency ordering and emission.

pub mod classifier;
pub mod context;
pub mod emitter;
pub mod fields;
pub mod junction;
pub mod normalize;
pub mod ordering;
pub mod types;

// Re-export key types
pub use classifier::{classify, Classification, DependencyKind, ForeignKey};
pub use context::CompileContext;
pub use emitter::{GeneratedModule, SchemaEmitter};
pub use fields::map_column;
pub use junction::synthesize;
pub use normalize::CompiledModel;
pub use ordering::{topological_sort, DependencyGraph, TopologicalOrder};
pub use types::{
    Cardinality, ColumnType, EntityId, FieldDescriptor, ManyToManyDescriptor, RelationshipId,
};

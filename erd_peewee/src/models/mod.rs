//! Models module for erd_peewee
//!
//! This module holds the host entity-relationship model and the read-only
//! repository interface the compiler queries it through.

pub mod repository;
pub mod types;

// Re-export key types
pub use repository::{InMemoryRepository, ModelRepository};
pub use types::{
    Column, Entity, ModelDocument, Package, Relationship, RelationshipEnd, Tag, TagValue,
};

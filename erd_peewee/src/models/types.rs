//! Type definitions for the host entity-relationship model
//!
//! These mirror what a modelling tool stores for an ERD: packages (data
//! models) holding entities, entities holding columns, and binary
//! relationships between entities. They are read-only to the compiler.

use serde::{Deserialize, Serialize};

/// A complete model file: packages plus the relationships between their entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// A data model grouping the entities compiled together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// An entity (table) of the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Entity {
    /// Create a new entity with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a column to the entity
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the entity documentation
    pub fn documentation(mut self, text: &str) -> Self {
        self.documentation = text.to_string();
        self
    }

    /// Add a tag to the entity
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// A column of an entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Abstract type tag such as `VARCHAR` or `INTEGER`
    #[serde(rename = "type")]
    pub data_type: String,
    /// Declared length, 0 when unspecified
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl Column {
    /// Create a new column with the given name and type tag
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            ..Default::default()
        }
    }

    /// Set the declared length
    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set whether the column is unique
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set whether the column is the primary key
    pub fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }
}

/// A binary relationship between two entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub name: Option<String>,
    pub end1: RelationshipEnd,
    pub end2: RelationshipEnd,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Relationship {
    /// Create a new relationship between two ends
    pub fn new(end1: RelationshipEnd, end2: RelationshipEnd) -> Self {
        Self {
            name: None,
            end1,
            end2,
            tags: Vec::new(),
        }
    }

    /// Set the relationship name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add a tag to the relationship
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Whether either end attaches to the named entity
    pub fn touches(&self, entity: &str) -> bool {
        self.end1.reference == entity || self.end2.reference == entity
    }
}

/// One side of a relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEnd {
    /// Name of the entity this end attaches to
    pub reference: String,
    /// Raw cardinality: `1`, `0..1`, `0..*`, `1..*` or `*`
    pub cardinality: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Carried from the modelling tool; not consulted by the compiler
    #[serde(default = "default_navigable")]
    pub navigable: bool,
}

impl RelationshipEnd {
    /// Create a new unnamed end
    pub fn new(reference: &str, cardinality: &str) -> Self {
        Self {
            reference: reference.to_string(),
            cardinality: cardinality.to_string(),
            name: None,
            navigable: true,
        }
    }

    /// Set the end name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

fn default_navigable() -> bool {
    true
}

/// A free-form tag rendered as a keyword argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(flatten)]
    pub value: TagValue,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: &str, value: TagValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// Value carried by a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TagValue {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    /// Name of a referenced model element, rendered unquoted
    Reference(String),
}

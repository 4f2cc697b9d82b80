//! Type definitions used by the schema compiler

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::types::Tag;

/// Position of an entity in the compiled set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// Position of a relationship in the compiled set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(pub usize);

/// Which end of a relationship is being looked at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    End1,
    End2,
}

impl Side {
    /// The opposite end
    pub fn opposite(self) -> Self {
        match self {
            Side::End1 => Side::End2,
            Side::End2 => Side::End1,
        }
    }
}

/// Multiplicity marker on a relationship end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality {
    /// `1`
    One,
    /// `0..1`
    ZeroOrOne,
    /// Any marker containing `*`, kept verbatim
    Many(String),
}

impl Cardinality {
    /// At most one instance on this end
    pub fn is_to_one(&self) -> bool {
        !self.is_many()
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Cardinality::Many(_))
    }

    /// The marker admits zero instances
    pub fn is_optional(&self) -> bool {
        self.as_str().contains('0')
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cardinality::One => "1",
            Cardinality::ZeroOrOne => "0..1",
            Cardinality::Many(marker) => marker,
        }
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Cardinality::One),
            "0..1" => Ok(Cardinality::ZeroOrOne),
            marker if marker.contains('*') => Ok(Cardinality::Many(marker.to_string())),
            other => Err(format!("unrecognized cardinality `{}`", other)),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract column type tags understood by the field mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Varchar,
    Boolean,
    Integer,
    Char,
    Blob,
    Text,
    SmallInt,
    BigInt,
    Decimal,
    Numeric,
    Float,
    Double,
    Bit,
    Date,
    Time,
    DateTime,
    Timestamp,
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let column_type = match s.trim().to_ascii_uppercase().as_str() {
            "VARCHAR" => ColumnType::Varchar,
            "BOOLEAN" => ColumnType::Boolean,
            "INTEGER" => ColumnType::Integer,
            "CHAR" => ColumnType::Char,
            "BLOB" => ColumnType::Blob,
            "TEXT" => ColumnType::Text,
            "SMALLINT" => ColumnType::SmallInt,
            "BIGINT" => ColumnType::BigInt,
            "DECIMAL" => ColumnType::Decimal,
            "NUMERIC" => ColumnType::Numeric,
            "FLOAT" => ColumnType::Float,
            "DOUBLE" => ColumnType::Double,
            "BIT" => ColumnType::Bit,
            "DATE" => ColumnType::Date,
            "TIME" => ColumnType::Time,
            "DATETIME" => ColumnType::DateTime,
            "TIMESTAMP" => ColumnType::Timestamp,
            _ => {
                return Err(Error::TypeMappingError(format!(
                    "Unsupported column type: {}",
                    s
                )))
            }
        };

        Ok(column_type)
    }
}

/// A relationship end after defaults have been resolved
#[derive(Debug, Clone)]
pub struct ResolvedEnd {
    pub entity: EntityId,
    pub cardinality: Cardinality,
    /// Name given in the model, if any
    pub explicit_name: Option<String>,
    /// Explicit name, or the entity name lower-cased
    pub name: String,
}

impl ResolvedEnd {
    pub fn is_named(&self) -> bool {
        self.explicit_name.is_some()
    }
}

/// An immutable, validated relationship between two compiled entities
#[derive(Debug, Clone)]
pub struct ResolvedRelationship {
    pub id: RelationshipId,
    pub name: Option<String>,
    pub end1: ResolvedEnd,
    pub end2: ResolvedEnd,
    pub tags: Vec<Tag>,
}

impl ResolvedRelationship {
    pub fn end(&self, side: Side) -> &ResolvedEnd {
        match side {
            Side::End1 => &self.end1,
            Side::End2 => &self.end2,
        }
    }

    /// Ends attached to the entity; both for a self-relationship
    pub fn sides_of(&self, entity: EntityId) -> Vec<Side> {
        [Side::End1, Side::End2]
            .into_iter()
            .filter(|&side| self.end(side).entity == entity)
            .collect()
    }

    pub fn is_self_referential(&self) -> bool {
        self.end1.entity == self.end2.entity
    }
}

/// A target field: type name plus ordered keyword arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub type_name: String,
    pub args: Vec<(String, String)>,
}

impl FieldDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.args.push((String::new(), value.into()));
        self
    }

    /// Append a keyword argument
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|(key, value)| {
                if key.is_empty() {
                    value.clone()
                } else {
                    format!("{}={}", key, value)
                }
            })
            .collect();

        write!(f, "{}({})", self.type_name, args.join(", "))
    }
}

/// One of the two foreign keys of a junction entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionField {
    pub entity: EntityId,
    pub field_name: String,
    pub backref: String,
}

/// Junction entity synthesized for a many-to-many relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyToManyDescriptor {
    pub relationship: RelationshipId,
    pub name: String,
    /// Fields for end1 then end2
    pub fields: [JunctionField; 2],
}

//! Relationship normalization
//!
//! Runs once per compilation, before classification and ordering. It assigns
//! entity ids, parses every cardinality and column type (failing fast on bad
//! data), drops relationships that leave the compiled set, and resolves end
//! names so every later stage observes the same immutable values.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::models::types::{Entity, Relationship, RelationshipEnd};
use crate::schema::types::{
    Cardinality, ColumnType, EntityId, RelationshipId, ResolvedEnd, ResolvedRelationship,
};
use crate::utils::naming::default_end_name;

/// The validated entity set of a single compilation run
#[derive(Debug, Clone)]
pub struct CompiledModel<'a> {
    entities: Vec<&'a Entity>,
    index: IndexMap<&'a str, EntityId>,
    relationships: Vec<ResolvedRelationship>,
}

impl<'a> CompiledModel<'a> {
    /// Normalize entities and the relationships among them
    pub fn build(entities: Vec<&'a Entity>, relationships: &[&Relationship]) -> Result<Self> {
        let mut index = IndexMap::new();
        for (i, entity) in entities.iter().enumerate() {
            if index.insert(entity.name.as_str(), EntityId(i)).is_some() {
                return Err(Error::data_model(
                    entity.name.clone(),
                    "entity name is declared more than once",
                ));
            }
            validate_columns(entity)?;
        }

        let mut model = Self {
            entities,
            index,
            relationships: Vec::with_capacity(relationships.len()),
        };

        for rel in relationships {
            let (Some(entity1), Some(entity2)) = (
                model.id_of(&rel.end1.reference),
                model.id_of(&rel.end2.reference),
            ) else {
                tracing::debug!(
                    end1 = %rel.end1.reference,
                    end2 = %rel.end2.reference,
                    "Ignoring relationship leaving the compiled set"
                );
                continue;
            };

            let id = RelationshipId(model.relationships.len());
            let label = relationship_label(id, rel);

            model.relationships.push(ResolvedRelationship {
                id,
                name: rel.name.clone().filter(|n| !n.trim().is_empty()),
                end1: resolve_end(&rel.end1, entity1, &label)?,
                end2: resolve_end(&rel.end2, entity2, &label)?,
                tags: rel.tags.clone(),
            });
        }

        tracing::debug!(
            entities = model.entities.len(),
            relationships = model.relationships.len(),
            "Normalized model"
        );

        Ok(model)
    }

    /// Number of entities in the compiled set
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity ids in input order
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        (0..self.entities.len()).map(EntityId)
    }

    pub fn entity(&self, id: EntityId) -> &'a Entity {
        self.entities[id.0]
    }

    pub fn name(&self, id: EntityId) -> &'a str {
        self.entities[id.0].name.as_str()
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.index.get(name).copied()
    }

    /// All relationships between compiled entities
    pub fn relationships(&self) -> &[ResolvedRelationship] {
        &self.relationships
    }

    pub fn relationship(&self, id: RelationshipId) -> &ResolvedRelationship {
        &self.relationships[id.0]
    }

    /// Relationships touching the entity, in model order
    pub fn relationships_of(
        &self,
        entity: EntityId,
    ) -> impl Iterator<Item = &ResolvedRelationship> + '_ {
        self.relationships
            .iter()
            .filter(move |rel| rel.end1.entity == entity || rel.end2.entity == entity)
    }
}

fn resolve_end(end: &RelationshipEnd, entity: EntityId, label: &str) -> Result<ResolvedEnd> {
    let cardinality: Cardinality = end
        .cardinality
        .parse()
        .map_err(|message| Error::data_model(label, message))?;

    let explicit_name = end
        .name
        .as_ref()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let name = explicit_name
        .clone()
        .unwrap_or_else(|| default_end_name(&end.reference));

    Ok(ResolvedEnd {
        entity,
        cardinality,
        explicit_name,
        name,
    })
}

fn validate_columns(entity: &Entity) -> Result<()> {
    for column in &entity.columns {
        column.data_type.parse::<ColumnType>().map_err(|_| {
            Error::TypeMappingError(format!(
                "Unsupported column type `{}` for {}.{}",
                column.data_type, entity.name, column.name
            ))
        })?;
    }

    Ok(())
}

fn relationship_label(id: RelationshipId, rel: &Relationship) -> String {
    match &rel.name {
        Some(name) if !name.trim().is_empty() => format!("relationship {}", name),
        _ => format!(
            "relationship #{} ({} - {})",
            id.0 + 1,
            rel.end1.reference,
            rel.end2.reference
        ),
    }
}

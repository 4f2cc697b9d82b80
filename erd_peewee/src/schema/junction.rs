//! Many-to-many synthesizer
//!
//! Turns a many-to-many relationship into a junction entity holding one
//! foreign key per end. Junction entities are declared after every regular
//! entity and never take part in the dependency graph.

use crate::schema::normalize::CompiledModel;
use crate::schema::types::{
    FieldDescriptor, JunctionField, ManyToManyDescriptor, ResolvedEnd, ResolvedRelationship,
};
use crate::utils::naming::{default_end_name, junction_name, pluralize, python_string};

/// Build the junction entity descriptor for a relationship
pub fn synthesize(model: &CompiledModel<'_>, rel: &ResolvedRelationship) -> ManyToManyDescriptor {
    let label = |end: &ResolvedEnd| {
        end.explicit_name
            .clone()
            .unwrap_or_else(|| model.name(end.entity).to_string())
    };

    let name = rel
        .name
        .clone()
        .unwrap_or_else(|| junction_name(&label(&rel.end1), &label(&rel.end2)));

    let field = |end: &ResolvedEnd, opposite: &ResolvedEnd| JunctionField {
        entity: end.entity,
        field_name: default_end_name(model.name(end.entity)),
        backref: opposite
            .explicit_name
            .clone()
            .unwrap_or_else(|| pluralize(&default_end_name(model.name(opposite.entity)))),
    };

    ManyToManyDescriptor {
        relationship: rel.id,
        name,
        fields: [field(&rel.end1, &rel.end2), field(&rel.end2, &rel.end1)],
    }
}

/// PeeWee field for one side of a junction entity
///
/// Junctions follow every regular entity, so the target is always declared.
pub fn junction_field(model: &CompiledModel<'_>, field: &JunctionField) -> FieldDescriptor {
    FieldDescriptor::new("ForeignKeyField")
        .positional(model.name(field.entity))
        .arg("backref", python_string(&field.backref))
}

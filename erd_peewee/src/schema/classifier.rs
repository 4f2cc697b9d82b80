//! Relationship classifier
//!
//! Decides, for each end of a relationship, whether the entity at that end
//! owns a foreign key, leaves the key to the other end, or must wait for a
//! junction entity. Both the emitter and the dependency graph go through
//! [`decide`], so the declared order and the emitted keys always agree.

use crate::models::types::Tag;
use crate::schema::context::CompileContext;
use crate::schema::normalize::CompiledModel;
use crate::schema::types::{
    Cardinality, EntityId, FieldDescriptor, RelationshipId, ResolvedEnd, ResolvedRelationship,
    Side,
};
use crate::utils::naming::{python_bool, python_string, tag_arguments};

/// Outcome of looking at a relationship from one end, without run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// This end's entity holds the key to the opposite entity
    Own,
    /// The opposite end holds the key, or the pair is emitted from there
    Skip,
    /// Many-to-many; realized by a junction entity
    Defer,
}

/// Strength of the ordering constraint implied by an owned key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DependencyKind {
    /// One-to-zero-or-one; the key could live on the other side instead
    Soft,
    /// Many-to-one; the owner must follow the target
    Hard,
}

/// How a foreign key refers to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Target already declared
    Direct,
    /// Target declared later; resolved by name
    Forward,
    /// Self-relationship
    Itself,
}

/// A foreign key owned by an entity
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub relationship: RelationshipId,
    pub owner: EntityId,
    pub field_name: String,
    pub target: EntityId,
    pub reference: Reference,
    pub backref: Option<String>,
    pub nullable: bool,
    pub tags: Vec<Tag>,
}

impl ForeignKey {
    /// Whether the key points at an entity not yet declared
    pub fn is_forward(&self) -> bool {
        self.reference == Reference::Forward
    }

    /// PeeWee field for this key
    pub fn descriptor(&self, model: &CompiledModel<'_>) -> FieldDescriptor {
        let target = model.name(self.target);
        let mut field = match self.reference {
            Reference::Direct => FieldDescriptor::new("ForeignKeyField").positional(target),
            Reference::Forward => {
                FieldDescriptor::new("DeferredForeignKey").positional(python_string(target))
            }
            Reference::Itself => {
                FieldDescriptor::new("ForeignKeyField").positional(python_string("self"))
            }
        };

        if let Some(backref) = &self.backref {
            field = field.arg("backref", python_string(backref));
        }
        if self.nullable {
            field = field.arg("null", python_bool(true));
        }
        for (key, value) in tag_arguments(&self.tags) {
            field = field.arg(key, value);
        }

        field
    }
}

/// Result of classifying a relationship from one end during emission
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Emit(ForeignKey),
    Skip,
    Defer(RelationshipId),
}

/// Decide ownership for the end at `side`
pub fn decide(model: &CompiledModel<'_>, rel: &ResolvedRelationship, side: Side) -> Decision {
    let this_end = rel.end(side);
    let other_end = rel.end(side.opposite());

    if other_end.cardinality.is_to_one() {
        if this_end.cardinality.is_to_one() && one_to_one_owner(model, rel) != side {
            return Decision::Skip;
        }
        Decision::Own
    } else if this_end.cardinality.is_to_one() {
        Decision::Skip
    } else {
        Decision::Defer
    }
}

/// The end that carries the key of a one-to-one relationship
///
/// Rules apply in order and are evaluated identically from both ends, so
/// exactly one end owns the key:
/// 1. unnamed end over named end when exactly one end is named,
/// 2. `0..1` end facing a mandatory `1`,
/// 3. the end whose resolved name sorts first, then by entity name, then end1.
pub fn one_to_one_owner(model: &CompiledModel<'_>, rel: &ResolvedRelationship) -> Side {
    let (end1, end2) = (&rel.end1, &rel.end2);

    match (end1.is_named(), end2.is_named()) {
        (true, false) => return Side::End2,
        (false, true) => return Side::End1,
        _ => {}
    }

    match (&end1.cardinality, &end2.cardinality) {
        (Cardinality::ZeroOrOne, Cardinality::One) => return Side::End1,
        (Cardinality::One, Cardinality::ZeroOrOne) => return Side::End2,
        _ => {}
    }

    let sort_key = |end: &ResolvedEnd| (end.name.clone(), model.name(end.entity));
    if sort_key(end2) < sort_key(end1) {
        Side::End2
    } else {
        Side::End1
    }
}

/// Ordering constraint created when the end at `side` owns the key
///
/// `None` for self-relationships and for one-to-one pairs that do not have
/// the `1` / `0..1` shape.
pub fn dependency_kind(rel: &ResolvedRelationship, side: Side) -> Option<DependencyKind> {
    let this_end = rel.end(side);
    let other_end = rel.end(side.opposite());

    if rel.is_self_referential() {
        return None;
    }
    if this_end.cardinality.is_many() {
        return Some(DependencyKind::Hard);
    }

    match (&this_end.cardinality, &other_end.cardinality) {
        (Cardinality::ZeroOrOne, Cardinality::One) | (Cardinality::One, Cardinality::ZeroOrOne) => {
            Some(DependencyKind::Soft)
        }
        _ => None,
    }
}

/// Classify the relationship from the end at `side`
///
/// Many-to-many relationships are queued on the context at most once no
/// matter how often they are deferred.
pub fn classify(
    model: &CompiledModel<'_>,
    ctx: &mut CompileContext,
    rel: &ResolvedRelationship,
    side: Side,
) -> Classification {
    let this_end = rel.end(side);
    let other_end = rel.end(side.opposite());

    let classification = match decide(model, rel, side) {
        Decision::Own => {
            let owner = this_end.entity;
            let target = other_end.entity;
            let reference = if owner == target {
                Reference::Itself
            } else if ctx.is_emitted(target) {
                Reference::Direct
            } else {
                Reference::Forward
            };

            Classification::Emit(ForeignKey {
                relationship: rel.id,
                owner,
                field_name: other_end.name.clone(),
                target,
                reference,
                backref: this_end.explicit_name.clone(),
                nullable: other_end.cardinality.is_optional(),
                tags: rel.tags.clone(),
            })
        }
        Decision::Skip => Classification::Skip,
        Decision::Defer => {
            ctx.defer(rel.id);
            Classification::Defer(rel.id)
        }
    };

    tracing::trace!(
        entity = model.name(this_end.entity),
        relationship = rel.id.0,
        outcome = classification_label(&classification),
        "Classified relationship end"
    );

    classification
}

fn classification_label(classification: &Classification) -> &'static str {
    match classification {
        Classification::Emit(_) => "emit",
        Classification::Skip => "skip",
        Classification::Defer(_) => "defer",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Entity, Relationship, RelationshipEnd, TagValue};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn compile<'a>(entities: &'a [Entity], rels: &[Relationship]) -> CompiledModel<'a> {
        let refs: Vec<&Relationship> = rels.iter().collect();
        CompiledModel::build(entities.iter().collect(), &refs).unwrap()
    }

    fn both_sides(
        model: &CompiledModel<'_>,
        ctx: &mut CompileContext,
    ) -> (Classification, Classification) {
        let rel = &model.relationships()[0];
        (
            classify(model, ctx, rel, Side::End1),
            classify(model, ctx, rel, Side::End2),
        )
    }

    #[test]
    fn test_many_to_one_key_lives_on_many_side() {
        let entities = [Entity::new("Author"), Entity::new("Book")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Author", "1"),
            RelationshipEnd::new("Book", "0..*"),
        )];
        let model = compile(&entities, &rels);
        let mut ctx = CompileContext::new();
        ctx.mark_emitted(EntityId(0));

        let (author_side, book_side) = both_sides(&model, &mut ctx);
        assert_eq!(author_side, Classification::Skip);

        let Classification::Emit(fk) = book_side else {
            panic!("expected Book to own the key");
        };
        assert_eq!(fk.owner, EntityId(1));
        assert_eq!(fk.field_name, "author");
        assert_eq!(fk.reference, Reference::Direct);
        assert!(!fk.nullable);
        assert_eq!(fk.backref, None);
        assert_eq!(fk.descriptor(&model).to_string(), "ForeignKeyField(Author)");
    }

    #[test]
    fn test_optional_target_and_backref() {
        let entities = [Entity::new("Team"), Entity::new("Player")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Team", "0..1").named("club"),
            RelationshipEnd::new("Player", "*").named("squad"),
        )
        .tag(crate::models::types::Tag::new(
            "on_delete",
            TagValue::String("SET NULL".to_string()),
        ))];
        let model = compile(&entities, &rels);
        let mut ctx = CompileContext::new();

        let (_, player_side) = both_sides(&model, &mut ctx);
        let Classification::Emit(fk) = player_side else {
            panic!("expected Player to own the key");
        };

        assert!(fk.is_forward());
        assert_eq!(
            fk.descriptor(&model).to_string(),
            "DeferredForeignKey('Team', backref='squad', null=True, on_delete='SET NULL')"
        );
        assert_eq!(fk.field_name, "club");
    }

    #[test]
    fn test_one_to_zero_or_one_keeps_key_on_optional_end() {
        let entities = [Entity::new("Profile"), Entity::new("User")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Profile", "1"),
            RelationshipEnd::new("User", "0..1"),
        )];
        let model = compile(&entities, &rels);
        let mut ctx = CompileContext::new();

        let (profile_side, user_side) = both_sides(&model, &mut ctx);
        assert_eq!(profile_side, Classification::Skip);
        let Classification::Emit(fk) = user_side else {
            panic!("expected User to own the key");
        };
        assert_eq!(fk.owner, EntityId(1));
        assert_eq!(fk.field_name, "profile");
        assert!(!fk.nullable);
        assert_eq!(
            dependency_kind(&model.relationships()[0], Side::End2),
            Some(DependencyKind::Soft)
        );
    }

    #[test]
    fn test_symmetric_one_to_one_breaks_tie_by_name() {
        let entities = [Entity::new("Y"), Entity::new("X")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Y", "1"),
            RelationshipEnd::new("X", "1"),
        )];
        let model = compile(&entities, &rels);
        let mut ctx = CompileContext::new();

        let (y_side, x_side) = both_sides(&model, &mut ctx);
        assert_eq!(y_side, Classification::Skip);
        let Classification::Emit(fk) = x_side else {
            panic!("expected X to own the key");
        };
        assert_eq!(fk.field_name, "y");
        assert_eq!(dependency_kind(&model.relationships()[0], Side::End2), None);
    }

    #[test]
    fn test_named_end_defers_ownership_to_unnamed_end() {
        let entities = [Entity::new("Passport"), Entity::new("Citizen")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Passport", "0..1").named("document"),
            RelationshipEnd::new("Citizen", "1"),
        )];
        let model = compile(&entities, &rels);

        assert_eq!(one_to_one_owner(&model, &model.relationships()[0]), Side::End2);
        assert_eq!(decide(&model, &model.relationships()[0], Side::End1), Decision::Skip);
        assert_eq!(decide(&model, &model.relationships()[0], Side::End2), Decision::Own);
    }

    #[test]
    fn test_many_to_many_is_queued_once() {
        let entities = [Entity::new("Student"), Entity::new("Course")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Student", "0..*"),
            RelationshipEnd::new("Course", "0..*"),
        )
        .named("Enrollment")];
        let model = compile(&entities, &rels);
        let mut ctx = CompileContext::new();

        let (a, b) = both_sides(&model, &mut ctx);
        assert_eq!(a, Classification::Defer(RelationshipId(0)));
        assert_eq!(b, Classification::Defer(RelationshipId(0)));
        assert_eq!(ctx.deferred().count(), 1);
    }

    #[test]
    fn test_self_relationship_uses_self_reference() {
        let entities = [Entity::new("Employee")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Employee", "1").named("manager"),
            RelationshipEnd::new("Employee", "0..*").named("reports"),
        )];
        let model = compile(&entities, &rels);
        let mut ctx = CompileContext::new();

        let (manager_side, reports_side) = both_sides(&model, &mut ctx);
        assert_eq!(manager_side, Classification::Skip);
        let Classification::Emit(fk) = reports_side else {
            panic!("expected the reports end to own the key");
        };
        assert_eq!(fk.reference, Reference::Itself);
        assert_eq!(
            fk.descriptor(&model).to_string(),
            "ForeignKeyField('self', backref='reports')"
        );
        assert_eq!(dependency_kind(&model.relationships()[0], Side::End2), None);
    }

    #[rstest]
    fn test_exactly_one_outcome_per_relationship(
        #[values("1", "0..1", "0..*", "1..*", "*")] card1: &str,
        #[values("1", "0..1", "0..*", "1..*", "*")] card2: &str,
        #[values(None, Some("left"))] name1: Option<&str>,
        #[values(None, Some("right"))] name2: Option<&str>,
    ) {
        let entities = [Entity::new("Left"), Entity::new("Right")];
        let mut end1 = RelationshipEnd::new("Left", card1);
        let mut end2 = RelationshipEnd::new("Right", card2);
        end1.name = name1.map(str::to_string);
        end2.name = name2.map(str::to_string);
        let rels = [Relationship::new(end1, end2)];
        let model = compile(&entities, &rels);
        let rel = &model.relationships()[0];

        let decisions = [decide(&model, rel, Side::End1), decide(&model, rel, Side::End2)];
        let owns = decisions.iter().filter(|d| **d == Decision::Own).count();
        let defers = decisions.iter().filter(|d| **d == Decision::Defer).count();

        if rel.end1.cardinality.is_many() && rel.end2.cardinality.is_many() {
            assert_eq!((owns, defers), (0, 2));
        } else {
            assert_eq!((owns, defers), (1, 0));
        }
    }
}

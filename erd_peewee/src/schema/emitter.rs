//! Schema emitter
//!
//! Walks the ordered entities and writes the PeeWee module line by line.
//! Nothing is persisted here; the caller receives the complete module.

use crate::config::GeneratorConfig;
use indexmap::IndexSet;

use crate::error::Result;
use crate::models::types::{Entity, Tag};
use crate::schema::classifier::{classify, Classification};
use crate::schema::context::CompileContext;
use crate::schema::fields::map_column;
use crate::schema::junction::{junction_field, synthesize};
use crate::schema::normalize::CompiledModel;
use crate::schema::ordering::TopologicalOrder;
use crate::schema::types::{EntityId, ManyToManyDescriptor};
use crate::utils::naming::{has_text, python_string, tag_value};
use crate::utils::writer::CodeWriter;

const BANNER: &str =
    "#===============================================================================";
const SEPARATOR: &str =
    "#-------------------------------------------------------------------------------";
const BASE_MODEL: &str = "BaseModel";

/// A fully generated module, ready for the host to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub file_name: String,
    pub lines: Vec<String>,
}

impl GeneratedModule {
    /// Module text, newline-terminated
    pub fn content(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }
}

/// Writes PeeWee source for a compiled model
pub struct SchemaEmitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> SchemaEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Emit every entity in `order`, then one junction per many-to-many relationship
    pub fn emit(
        &self,
        model: &CompiledModel<'_>,
        order: &TopologicalOrder,
    ) -> Result<GeneratedModule> {
        let mut writer = CodeWriter::new(self.config.indent_string());
        let mut ctx = CompileContext::new();

        self.write_preamble(&mut writer)?;

        for &id in &order.order {
            self.write_entity(&mut writer, &mut ctx, model, id)?;
            ctx.mark_emitted(id);
        }

        let deferred: Vec<_> = ctx.deferred().collect();
        for rel_id in deferred {
            let descriptor = synthesize(model, model.relationship(rel_id));
            self.write_junction(&mut writer, model, &descriptor);
        }

        tracing::info!(
            entities = order.order.len(),
            junctions = ctx.deferred().count(),
            lines = writer.lines().len(),
            "Emitted schema module"
        );

        Ok(GeneratedModule {
            file_name: self.config.output_file.clone(),
            lines: writer.into_lines(),
        })
    }

    fn write_preamble(&self, writer: &mut CodeWriter) -> Result<()> {
        let db_filename = self.config.db_filename()?;
        let db_variable = self.config.db_variable()?;

        writer
            .writeln(BANNER)
            .writeln("# PeeWee Database Model")
            .writeln(BANNER)
            .blank()
            .blank()
            .writeln("from peewee import *")
            .blank()
            .writeln(format!(
                "{} = SqliteDatabase({})",
                db_variable,
                python_string(db_filename)
            ))
            .blank()
            .blank()
            .writeln(SEPARATOR)
            .blank()
            .blank()
            .writeln(format!("class {}(Model):", BASE_MODEL))
            .indent()
            .writeln("class Meta:")
            .indent()
            .writeln(format!("database = {}", db_variable))
            .dedent()
            .dedent()
            .blank()
            .blank()
            .writeln(SEPARATOR)
            .blank()
            .blank();

        Ok(())
    }

    fn write_entity(
        &self,
        writer: &mut CodeWriter,
        ctx: &mut CompileContext,
        model: &CompiledModel<'_>,
        id: EntityId,
    ) -> Result<()> {
        let entity = model.entity(id);

        writer.writeln(format!("class {}({}):", entity.name, BASE_MODEL));
        writer.indent();
        let body = writer.mark();

        if self.config.doc_string {
            write_doc(writer, &entity.documentation);
        }

        let mut fields = IndexSet::new();
        self.write_columns(writer, &mut fields, entity)?;

        for rel in model.relationships_of(id) {
            for side in rel.sides_of(id) {
                match classify(model, ctx, rel, side) {
                    Classification::Emit(fk) => {
                        if fk.is_forward() {
                            tracing::debug!(
                                owner = %entity.name,
                                target = model.name(fk.target),
                                "Forward reference"
                            );
                        }
                        record_field(&mut fields, &entity.name, &fk.field_name);
                        writer.writeln(format!("{} = {}", fk.field_name, fk.descriptor(model)));
                    }
                    Classification::Skip | Classification::Defer(_) => {}
                }
            }
        }

        if !entity.tags.is_empty() {
            write_meta(writer, &entity.tags);
        }

        if !writer.written_since(body) {
            writer.writeln("pass");
        }

        writer.dedent().blank().blank();
        Ok(())
    }

    fn write_columns(
        &self,
        writer: &mut CodeWriter,
        fields: &mut IndexSet<String>,
        entity: &Entity,
    ) -> Result<()> {
        for column in &entity.columns {
            let field = map_column(column)?;
            record_field(fields, &entity.name, &column.name);
            writer.writeln(format!("{} = {}", column.name, field));
        }

        Ok(())
    }

    fn write_junction(
        &self,
        writer: &mut CodeWriter,
        model: &CompiledModel<'_>,
        descriptor: &ManyToManyDescriptor,
    ) {
        writer.writeln(format!("class {}({}):", descriptor.name, BASE_MODEL));
        writer.indent();
        for field in &descriptor.fields {
            writer.writeln(format!(
                "{} = {}",
                field.field_name,
                junction_field(model, field)
            ));
        }
        writer.dedent().blank().blank();
    }
}

/// Track a field name of the class being written; false when it repeats
///
/// A repeated name is still emitted, and Python keeps only the last binding.
fn record_field(fields: &mut IndexSet<String>, entity: &str, field: &str) -> bool {
    let fresh = fields.insert(field.to_string());
    if !fresh {
        tracing::warn!(
            entity,
            field,
            "Field name repeats in class; name the relationship ends to disambiguate"
        );
    }
    fresh
}

/// Write documentation as a docstring; multi-line text gets a `"""` block
fn write_doc(writer: &mut CodeWriter, text: &str) {
    if !has_text(text) {
        return;
    }

    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() > 1 {
        writer.writeln("\"\"\"");
        for line in lines {
            writer.writeln(line);
        }
        writer.writeln("\"\"\"");
    } else {
        writer.writeln(format!("\"\"\"{}\"\"\"", lines[0]));
    }
}

fn write_meta(writer: &mut CodeWriter, tags: &[Tag]) {
    writer.writeln("class Meta:").indent();
    for tag in tags {
        writer.writeln(format!("{} = {}", tag.name, tag_value(&tag.value)));
    }
    writer.dedent();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Column, Relationship, RelationshipEnd, TagValue};
    use crate::schema::ordering::topological_sort;
    use pretty_assertions::assert_eq;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            db_filename: Some("library.db".to_string()),
            db_variable: Some("db".to_string()),
            ..Default::default()
        }
    }

    fn emit(config: &GeneratorConfig, entities: &[Entity], rels: &[Relationship]) -> Vec<String> {
        let refs: Vec<&Relationship> = rels.iter().collect();
        let model = CompiledModel::build(entities.iter().collect(), &refs).unwrap();
        let order = topological_sort(&model).unwrap();
        SchemaEmitter::new(config)
            .emit(&model, &order)
            .unwrap()
            .lines
    }

    /// Lines after the preamble
    fn body(lines: &[String]) -> Vec<String> {
        let start = lines
            .iter()
            .rposition(|line| line == SEPARATOR)
            .unwrap();
        lines[start + 3..].to_vec()
    }

    #[test]
    fn test_preamble_names_database_handle() {
        let mut config = config();
        config.db_variable = Some("library_db".to_string());
        config.use_tab = true;

        let lines = emit(&config, &[], &[]);
        assert!(lines.contains(&"library_db = SqliteDatabase('library.db')".to_string()));
        assert!(lines.contains(&"class BaseModel(Model):".to_string()));
        assert!(lines.contains(&"\tclass Meta:".to_string()));
        assert!(lines.contains(&"\t\tdatabase = library_db".to_string()));
        assert!(body(&lines).is_empty());
    }

    #[test]
    fn test_entity_with_documentation_and_tags() {
        let entities = [Entity::new("Author")
            .documentation("People who write books.\nAlso editors.")
            .column(Column::new("name", "VARCHAR").length(100))
            .tag(Tag::new("table_name", TagValue::String("authors".to_string())))];

        let lines = emit(&config(), &entities, &[]);
        assert_eq!(
            body(&lines),
            vec![
                "class Author(BaseModel):",
                "    \"\"\"",
                "    People who write books.",
                "    Also editors.",
                "    \"\"\"",
                "    name = CharField(max_length=100)",
                "    class Meta:",
                "        table_name = 'authors'",
                "",
                "",
            ]
        );
    }

    #[test]
    fn test_doc_string_can_be_disabled() {
        let mut config = config();
        config.doc_string = false;
        let entities = [Entity::new("Note").documentation("Free text")];

        let lines = emit(&config, &entities, &[]);
        assert_eq!(body(&lines), vec!["class Note(BaseModel):", "    pass", "", ""]);
    }

    #[test]
    fn test_cycle_falls_back_to_forward_reference() {
        let entities = [Entity::new("A"), Entity::new("B")];
        let rels = [
            Relationship::new(RelationshipEnd::new("B", "1"), RelationshipEnd::new("A", "*")),
            Relationship::new(RelationshipEnd::new("A", "1"), RelationshipEnd::new("B", "*")),
        ];

        let lines = emit(&config(), &entities, &rels);
        assert_eq!(
            body(&lines),
            vec![
                "class A(BaseModel):",
                "    b = DeferredForeignKey('B')",
                "",
                "",
                "class B(BaseModel):",
                "    a = ForeignKeyField(A)",
                "",
                "",
            ]
        );
    }

    #[test]
    fn test_repeated_field_name_is_reported() {
        let mut fields = IndexSet::new();
        assert!(record_field(&mut fields, "Message", "body"));
        assert!(record_field(&mut fields, "Message", "user"));
        assert!(!record_field(&mut fields, "Message", "user"));
    }

    #[test]
    fn test_two_unnamed_keys_to_same_target_share_a_name() {
        let entities = [Entity::new("User"), Entity::new("Message")];
        let rels = [
            Relationship::new(RelationshipEnd::new("User", "1"), RelationshipEnd::new("Message", "*")),
            Relationship::new(RelationshipEnd::new("User", "1"), RelationshipEnd::new("Message", "*")),
        ];

        let lines = emit(&config(), &entities, &rels);
        assert_eq!(
            body(&lines)[4..].to_vec(),
            vec![
                "class Message(BaseModel):",
                "    user = ForeignKeyField(User)",
                "    user = ForeignKeyField(User)",
                "",
                "",
            ]
        );
    }

    #[test]
    fn test_junctions_follow_regular_entities() {
        let entities = [Entity::new("Student"), Entity::new("Course")];
        let rels = [Relationship::new(
            RelationshipEnd::new("Student", "0..*").named("attendees"),
            RelationshipEnd::new("Course", "0..*"),
        )];

        let lines = emit(&config(), &entities, &rels);
        assert_eq!(
            body(&lines),
            vec![
                "class Student(BaseModel):",
                "    pass",
                "",
                "",
                "class Course(BaseModel):",
                "    pass",
                "",
                "",
                "class attendees_Course(BaseModel):",
                "    student = ForeignKeyField(Student, backref='courses')",
                "    course = ForeignKeyField(Course, backref='attendees')",
                "",
                "",
            ]
        );
    }
}

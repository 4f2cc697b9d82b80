//! Model repository for erd_peewee
//!
//! The compiler never reaches for ambient model state. Everything it needs is
//! queried through [`ModelRepository`], which the host implements over
//! whatever store it has. [`InMemoryRepository`] is the implementation used
//! for model files.

use indexmap::IndexMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::types::{Entity, ModelDocument, Package, Relationship};

/// Read-only access to the host model
pub trait ModelRepository {
    /// Entities belonging to the named package, in declaration order
    fn entities_of(&self, package: &str) -> Result<Vec<&Entity>>;

    /// Relationships touching the entity that satisfy the predicate
    fn relationships_of(
        &self,
        entity: &str,
        predicate: &dyn Fn(&Relationship) -> bool,
    ) -> Vec<&Relationship>;

    /// Relationships whose two ends both lie inside the given entity set
    ///
    /// Each relationship appears once, ordered by the first entity of the set
    /// it touches.
    fn relationships_between<'a>(&'a self, entities: &[&Entity]) -> Vec<&'a Relationship> {
        let inside = |name: &str| entities.iter().any(|e| e.name == name);
        let mut between: Vec<&Relationship> = Vec::new();

        for entity in entities {
            let touching = self.relationships_of(&entity.name, &|rel: &Relationship| {
                inside(rel.end1.reference.as_str()) && inside(rel.end2.reference.as_str())
            });
            for rel in touching {
                if !between.iter().any(|seen| std::ptr::eq(*seen, rel)) {
                    between.push(rel);
                }
            }
        }

        between
    }
}

/// Load a model document, choosing the format from the file extension
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ModelDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let document: ModelDocument = match extension.as_str() {
        "json" => serde_json::from_str(&content)?,
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)
            .map_err(|e| Error::SerializationError(format!("Failed to parse model: {}", e)))?,
        other => {
            return Err(Error::SerializationError(format!(
                "Unsupported model format `{}` for {}",
                other,
                path.display()
            )))
        }
    };

    tracing::debug!(path = %path.display(), "Loaded model document");
    Ok(document)
}

/// Repository over a fully loaded [`ModelDocument`]
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    document: ModelDocument,
    /// Entity name -> (package index, entity index)
    entity_index: IndexMap<String, (usize, usize)>,
}

impl InMemoryRepository {
    /// Index a document, rejecting duplicate entity names and dangling ends
    pub fn new(document: ModelDocument) -> Result<Self> {
        let mut entity_index = IndexMap::new();

        for (p, package) in document.packages.iter().enumerate() {
            for (e, entity) in package.entities.iter().enumerate() {
                if entity.name.trim().is_empty() {
                    return Err(Error::data_model(
                        format!("package {}", package.name),
                        format!("entity #{} has no name", e + 1),
                    ));
                }
                if entity_index.insert(entity.name.clone(), (p, e)).is_some() {
                    return Err(Error::data_model(
                        entity.name.clone(),
                        "entity name is declared more than once",
                    ));
                }
            }
        }

        for (i, rel) in document.relationships.iter().enumerate() {
            for end in [&rel.end1, &rel.end2] {
                if !entity_index.contains_key(&end.reference) {
                    return Err(Error::data_model(
                        relationship_label(i, rel),
                        format!("end references unknown entity `{}`", end.reference),
                    ));
                }
            }
        }

        Ok(Self {
            document,
            entity_index,
        })
    }

    /// Load and index a model file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(load_from_file(path)?)
    }

    /// The underlying document
    pub fn document(&self) -> &ModelDocument {
        &self.document
    }

    /// All packages in declaration order
    pub fn packages(&self) -> &[Package] {
        &self.document.packages
    }

    /// Resolve the package to compile
    ///
    /// Without an explicit request the model must contain exactly one package.
    pub fn select_package(&self, requested: Option<&str>) -> Result<&Package> {
        let packages = &self.document.packages;

        if let Some(name) = requested {
            return packages
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| Error::data_model(name, "no such package in model"));
        }

        match packages.as_slice() {
            [only] => Ok(only),
            [] => Err(Error::data_model(
                self.document.name.clone(),
                "model contains no packages",
            )),
            many => Err(Error::data_model(
                self.document.name.clone(),
                format!(
                    "model contains several packages, choose one of: {}",
                    many.iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }

    /// Look up an entity by name
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entity_index
            .get(name)
            .map(|&(p, e)| &self.document.packages[p].entities[e])
    }
}

impl ModelRepository for InMemoryRepository {
    fn entities_of(&self, package: &str) -> Result<Vec<&Entity>> {
        self.document
            .packages
            .iter()
            .find(|p| p.name == package)
            .map(|p| p.entities.iter().collect())
            .ok_or_else(|| Error::data_model(package, "no such package in model"))
    }

    fn relationships_of(
        &self,
        entity: &str,
        predicate: &dyn Fn(&Relationship) -> bool,
    ) -> Vec<&Relationship> {
        self.document
            .relationships
            .iter()
            .filter(|rel| rel.touches(entity) && predicate(*rel))
            .collect()
    }
}

/// Human-readable identity of a relationship for error messages
pub fn relationship_label(index: usize, rel: &Relationship) -> String {
    match &rel.name {
        Some(name) => format!("relationship #{} ({})", index + 1, name),
        None => format!(
            "relationship #{} ({} - {})",
            index + 1,
            rel.end1.reference,
            rel.end2.reference
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::RelationshipEnd;
    use pretty_assertions::assert_eq;

    fn library() -> ModelDocument {
        ModelDocument {
            name: "Library".to_string(),
            packages: vec![
                Package {
                    name: "Catalog".to_string(),
                    documentation: String::new(),
                    entities: vec![Entity::new("Author"), Entity::new("Book")],
                },
                Package {
                    name: "Lending".to_string(),
                    documentation: String::new(),
                    entities: vec![Entity::new("Loan")],
                },
            ],
            relationships: vec![
                Relationship::new(
                    RelationshipEnd::new("Author", "1"),
                    RelationshipEnd::new("Book", "0..*"),
                ),
                Relationship::new(
                    RelationshipEnd::new("Book", "1"),
                    RelationshipEnd::new("Loan", "0..*"),
                ),
            ],
        }
    }

    #[test]
    fn test_entities_of_package() {
        let repo = InMemoryRepository::new(library()).unwrap();
        let names: Vec<_> = repo
            .entities_of("Catalog")
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();

        assert_eq!(names, vec!["Author", "Book"]);
        assert!(repo.entities_of("Billing").is_err());
    }

    #[test]
    fn test_relationships_crossing_packages_are_excluded() {
        let repo = InMemoryRepository::new(library()).unwrap();
        let catalog = repo.entities_of("Catalog").unwrap();

        let between = repo.relationships_between(&catalog);
        assert_eq!(between.len(), 1);
        assert_eq!(between[0].end2.reference, "Book");

        let touching_book = repo.relationships_of("Book", &|_| true);
        assert_eq!(touching_book.len(), 2);
    }

    #[test]
    fn test_select_package() {
        let repo = InMemoryRepository::new(library()).unwrap();
        assert_eq!(repo.select_package(Some("Lending")).unwrap().name, "Lending");

        let err = repo.select_package(None).unwrap_err();
        assert!(err.to_string().contains("Catalog, Lending"));

        let mut single = library();
        single.packages.truncate(1);
        single.relationships.truncate(1);
        let repo = InMemoryRepository::new(single).unwrap();
        assert_eq!(repo.select_package(None).unwrap().name, "Catalog");
    }

    #[test]
    fn test_duplicate_entity_names_are_rejected() {
        let mut doc = library();
        doc.packages[1].entities.push(Entity::new("Author"));

        let err = InMemoryRepository::new(doc).unwrap_err();
        assert!(matches!(err, Error::DataModelError { ref element, .. } if element == "Author"));
    }

    #[test]
    fn test_dangling_relationship_end_is_rejected() {
        let mut doc = library();
        doc.relationships.push(Relationship::new(
            RelationshipEnd::new("Book", "1"),
            RelationshipEnd::new("Review", "*"),
        ));

        let err = InMemoryRepository::new(doc).unwrap_err();
        assert!(err.to_string().contains("Review"));
    }

    #[test]
    fn test_load_json_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(
            &path,
            r#"{
                "name": "Library",
                "packages": [{
                    "name": "Catalog",
                    "entities": [{
                        "name": "Author",
                        "columns": [{ "name": "name", "type": "VARCHAR", "length": 100 }]
                    }]
                }],
                "relationships": []
            }"#,
        )
        .unwrap();

        let repo = InMemoryRepository::from_file(&path).unwrap();
        let author = repo.entity("Author").unwrap();
        assert_eq!(author.columns[0].data_type, "VARCHAR");
        assert_eq!(author.columns[0].length, 100);
        assert!(!author.columns[0].nullable);
    }

    #[test]
    fn test_unknown_model_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.xml");
        fs::write(&path, "<model/>").unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(Error::SerializationError(_))
        ));
    }
}

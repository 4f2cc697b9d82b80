//! erd_peewee: compiles entity-relationship models into PeeWee ORM modules
//!
//! Relationships are classified into one-to-one, many-to-one and
//! many-to-many, foreign keys are placed on the owning entity, junction
//! entities are synthesized for many-to-many relationships, and entities are
//! declared in dependency order so most keys reference already-declared
//! classes.

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod schema;
pub mod utils;

use std::path::Path;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use models::repository::{InMemoryRepository, ModelRepository};
pub use schema::emitter::{GeneratedModule, SchemaEmitter};
pub use schema::normalize::CompiledModel;
pub use schema::ordering::topological_sort;

use config::GeneratorConfig;

/// Compile one package of the model into a PeeWee module
///
/// Configuration is checked before anything else; any error aborts the run
/// without producing partial output.
pub fn compile<R>(repo: &R, package: &str, config: &GeneratorConfig) -> Result<GeneratedModule>
where
    R: ModelRepository + ?Sized,
{
    config.validate()?;

    let entities = repo.entities_of(package)?;
    let relationships = repo.relationships_between(&entities);
    let model = CompiledModel::build(entities, &relationships)?;
    let order = topological_sort(&model)?;

    tracing::info!(
        package,
        entities = model.len(),
        relationships = model.relationships().len(),
        cycles_broken = order.broken.len(),
        "Compiled package"
    );

    SchemaEmitter::new(config).emit(&model, &order)
}

/// Initialize a generator with the specified configuration file
pub fn init(config_path: impl AsRef<Path>) -> Result<CodeGenerator> {
    let config = config::load_from_file(config_path)?;
    CodeGenerator::new(config)
}

/// The main entry point for generating modules from a model
pub struct CodeGenerator {
    config: Config,
}

impl CodeGenerator {
    /// Create a generator, rejecting incomplete configuration up front
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate the module for a package
    pub fn generate<R>(&self, repo: &R, package: &str) -> Result<GeneratedModule>
    where
        R: ModelRepository + ?Sized,
    {
        compile(repo, package, &self.config.generator)
    }

    /// Generate a package and write it under `base/<package lower-cased>`
    pub fn generate_to<R>(
        &self,
        repo: &R,
        package: &str,
        base: &Path,
        overwrite: bool,
    ) -> Result<std::path::PathBuf>
    where
        R: ModelRepository + ?Sized,
    {
        let module = self.generate(repo, package)?;
        let dir = output::package_dir(base, package);
        output::prepare_dir(&dir, overwrite)?;
        output::write_module(&dir, &module)
    }
}

//! Command-line host for erd_peewee

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use erd_peewee::utils::logging::init_logging;
use erd_peewee::{config, output, InMemoryRepository};

#[derive(Debug, Parser)]
#[command(name = "erd_peewee", version, about = "Generate PeeWee models from an ER model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the PeeWee module for one package
    Generate {
        /// Model file (.json, .yaml, .yml or .toml)
        #[arg(long)]
        model: PathBuf,
        /// Configuration file
        #[arg(long = "config", default_value = "erd_peewee.toml")]
        config_path: PathBuf,
        /// Package to generate; optional when the model has a single package
        #[arg(long)]
        package: Option<String>,
        /// Base directory; the module goes into <output>/<package>
        #[arg(long = "output")]
        output_base: PathBuf,
        /// Replace an existing package directory instead of reusing it
        #[arg(long)]
        overwrite: bool,
        /// Print the module instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the packages of a model
    Packages {
        #[arg(long)]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            model,
            config_path,
            package,
            output_base,
            overwrite,
            dry_run,
        } => {
            let config = config::load_from_file(&config_path)
                .with_context(|| format!("loading {}", config_path.display()))?;
            init_logging(&config.logging)?;
            config.validate()?;

            let repo = InMemoryRepository::from_file(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let package = repo.select_package(package.as_deref())?.name.clone();

            let module = erd_peewee::compile(&repo, &package, &config.generator)
                .with_context(|| format!("compiling package {}", package))?;

            if dry_run {
                print!("{}", module.content());
                return Ok(());
            }

            let dir = output::package_dir(&output_base, &package);
            output::prepare_dir(&dir, overwrite)
                .with_context(|| format!("preparing {}", dir.display()))?;
            let path = output::write_module(&dir, &module)?;
            println!("Generated {}", path.display());
        }
        Command::Packages { model } => {
            let repo = InMemoryRepository::from_file(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            for package in repo.packages() {
                println!("{} ({} entities)", package.name, package.entities.len());
            }
        }
    }

    Ok(())
}

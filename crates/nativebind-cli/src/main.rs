//! nativebind CLI - Native binding generator
//!
//! Commands:
//! - `nativebind generate` - Generate headers and implementation units
//! - `nativebind check` - Validate a generator configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod generate;
mod loader;
mod writer;

#[derive(Parser)]
#[command(name = "nativebind")]
#[command(author, version, about = "Native binding generator for OpenRPC APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C headers, wire containers and C++ implementations
    Generate {
        /// Directory or file of shared JSON-Schema documents (repeatable)
        #[arg(short, long = "schemas")]
        schemas: Vec<PathBuf>,

        /// Directory or file of OpenRPC module documents (repeatable)
        #[arg(short, long = "modules")]
        modules: Vec<PathBuf>,

        /// Output directory for generated files
        #[arg(short, long)]
        output: PathBuf,

        /// Path to generator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only generate the named module (repeatable)
        #[arg(long = "module")]
        module: Vec<String>,
    },

    /// Validate a generator configuration file
    Check {
        /// Path to configuration (default: ./nativebind.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            schemas,
            modules,
            output,
            config,
            module,
        } => {
            let options = generate::GenerateOptions {
                inputs: schemas.into_iter().chain(modules).collect(),
                output,
                config,
                only: module,
            };
            if !generate::run(&options)? {
                std::process::exit(1);
            }
        }
        Commands::Check { config } => {
            check::run(config)?;
        }
    }

    Ok(())
}

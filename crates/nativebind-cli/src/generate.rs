//! Generate command implementation

use crate::{loader, writer};
use anyhow::{Context, Result};
use nativebind_core::{GeneratorConfig, LogLevel, ModuleStatus};
use nativebind_logging::{DiagnosticCounter, init_logging};
use std::path::{Path, PathBuf};

/// Inputs of one `nativebind generate` run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Schema and module directories or files, in load order
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    /// Replaces the configured include list when non-empty
    pub only: Vec<String>,
}

/// Load the configuration at `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run generation, returning `false` when any module failed
pub fn run(options: &GenerateOptions) -> Result<bool> {
    let config = load_config(options.config.as_deref())?;

    let level = config.log_level.parse().unwrap_or(LogLevel::Info);
    init_logging(level);

    let index = loader::load_index(&options.inputs)?;
    println!("Loaded {} documents", index.len());

    let mut selection = config.modules.clone();
    if !options.only.is_empty() {
        selection.include = options.only.clone();
    }

    let output = nativebind_codegen::generate(&index, &selection, &config);

    for artifacts in &output.modules {
        for path in writer::write_module(&options.output, artifacts)? {
            tracing::debug!(path = %path.display(), "wrote file");
        }
    }

    for outcome in &output.report.outcomes {
        match &outcome.status {
            ModuleStatus::Generated => println!("  ✓ {}", outcome.module),
            ModuleStatus::Failed(err) => println!("  ✗ {}: {err}", outcome.module),
            ModuleStatus::Skipped => {}
        }
        for diagnostic in &outcome.diagnostics {
            println!("      ! {}: {}", diagnostic.path, diagnostic.message);
        }
    }

    let counts = DiagnosticCounter::global().snapshot();
    println!();
    println!(
        "Generated {} modules into {} ({} warnings, {} errors logged)",
        output.report.generated_count(),
        options.output.display(),
        output.report.warning_count(),
        counts.errors
    );

    Ok(!output.report.has_failures())
}

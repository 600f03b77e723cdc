//! Check command implementation

use crate::generate::load_config;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a configuration file and print its effective settings
pub fn run(config: Option<PathBuf>) -> Result<()> {
    let path = config.unwrap_or_else(|| PathBuf::from("nativebind.toml"));
    println!("Checking configuration: {}", path.display());

    let config = load_config(Some(&path))?;

    println!("  ✓ SDK namespace: {}", config.runtime.sdk_namespace);
    println!("  ✓ Runtime header: {}", config.runtime.runtime_header);
    if config.modules.include.is_empty() {
        println!("  ✓ Modules: all");
    } else {
        println!("  ✓ Modules: {}", config.modules.include.join(", "));
    }
    if !config.modules.exclude.is_empty() {
        println!("  ✓ Excluded: {}", config.modules.exclude.join(", "));
    }
    println!("  ✓ Log level: {}", config.log_level);

    println!();
    println!("Configuration is valid!");
    Ok(())
}

#[cfg(test)]
#[path = "check/check_tests.rs"]
mod check_tests;

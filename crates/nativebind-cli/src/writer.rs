//! Writing generated files to disk

use anyhow::{Context, Result};
use nativebind_codegen::ModuleArtifacts;
use std::path::{Path, PathBuf};

/// Write every file of `artifacts` under `root`, returning the written paths
pub fn write_module(root: &Path, artifacts: &ModuleArtifacts) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in artifacts.files() {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, &file.contents).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

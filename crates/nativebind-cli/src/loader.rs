//! Schema document loading

use anyhow::{Context, Result, bail};
use nativebind_core::{Module, SchemaIndex};
use std::path::{Path, PathBuf};

/// `.json` files under `path`, sorted; `path` itself when it is a file
pub fn json_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Input path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).with_context(|| format!("Failed to read directory: {}", path.display()))? {
        let entry_path = entry?.path();
        if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "json") {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every document under `inputs` into one index
pub fn load_index(inputs: &[PathBuf]) -> Result<SchemaIndex> {
    let mut index = SchemaIndex::new();
    for input in inputs {
        for file in json_files(input)? {
            let content =
                std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let module = Module::from_json(&content).with_context(|| format!("Failed to parse {}", file.display()))?;
            tracing::debug!(module = %module.title, uri = %module.uri, file = %file.display(), "loaded document");
            if let Some(previous) = index.insert(module) {
                tracing::warn!(uri = %previous.uri, file = %file.display(), "document replaces an earlier one with the same URI");
            }
        }
    }
    Ok(index)
}

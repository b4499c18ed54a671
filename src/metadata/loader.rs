use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::metadata::types::*;

/// Loads assembly descriptions from their JSON form and links the member graph.
pub struct AssemblyLoader;

impl AssemblyLoader {
    pub fn load_file(path: &Path) -> Result<LoadedAssembly> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
        let fallback_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json(&json, &fallback_name)
            .with_context(|| format!("Failed to load metadata from {}", path.display()))
    }

    /// Parse `json`, using `fallback_name` when the document carries no file name.
    pub fn from_json(json: &str, fallback_name: &str) -> Result<LoadedAssembly> {
        let mut assembly: LoadedAssembly =
            serde_json::from_str(json).context("Failed to parse assembly JSON")?;
        if assembly.file_name.is_empty() {
            assembly.file_name = fallback_name.to_string();
        }
        assembly.link();
        debug!(
            file = %assembly.file_name,
            types = assembly.module.types.len(),
            references = assembly.module.assembly_refs.len(),
            "loaded assembly"
        );
        Ok(assembly)
    }
}

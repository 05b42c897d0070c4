use crate::engine::EngineOptions;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Charge des options moteur depuis un fichier JSON ; les champs absents gardent leur défaut.
pub fn load_options_from_file<P: AsRef<Path>>(path: P) -> Result<EngineOptions> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let options: EngineOptions = serde_json::from_slice(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    options
        .validate()
        .with_context(|| format!("validating config {}", path.display()))?;
    Ok(options)
}

pub fn export_options_json<P: AsRef<Path>>(path: P, options: &EngineOptions) -> Result<()> {
    let json = serde_json::to_string_pretty(options)?;
    fs::write(path, json)?;
    Ok(())
}

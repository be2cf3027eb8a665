//! Dataset loading. The format is picked by file extension.

use std::fs;
use std::path::Path;

use sieve_core::error::{Error, Result};
use sieve_core::model::DataSource;

enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Ok(Format::Yaml)
        }
        _ => Err(Error::Load(format!(
            "{}: unsupported dataset format (expected .json, .yaml or .yml)",
            path.display()
        ))),
    }
}

pub fn load(path: &Path) -> Result<DataSource> {
    let format = format_of(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Load(format!("{}: {}", path.display(), e)))?;
    parse(&content, format).map_err(|msg| Error::Load(format!("{}: {}", path.display(), msg)))
}

fn parse(content: &str, format: Format) -> std::result::Result<DataSource, String> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    }
}

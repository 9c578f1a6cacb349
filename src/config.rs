//! JSON configuration files, one per tool, loaded once at startup and
//! passed by reference into everything that needs them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::parse::SchemaPolicy;
use crate::types::Field;

fn default_separator() -> String {
    "-".to_string()
}

/// Configuration for the cataloging step.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root directory to scan.
    pub source: PathBuf,
    /// Delimiter between encoded fields in a filename.
    pub delimiter: String,
    /// Positional field schema the filenames follow.
    pub schema: Vec<Field>,
    /// Extension of the files to catalog, without dot.
    pub extension: String,
    #[serde(default)]
    pub recurse: bool,
    #[serde(default)]
    pub policy: SchemaPolicy,
    /// Separator between track number and title in short names.
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl CatalogConfig {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

/// Configuration for the conversion driver.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub input: InputConfig,
    pub output: Vec<OutputProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Root of the cataloged tree.
    pub path: PathBuf,
    #[serde(default)]
    pub recurse: bool,
}

/// One configured conversion target, selected by name.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputProfile {
    /// Profile name, doubling as the target extension (e.g. "mp3").
    #[serde(rename = "type")]
    pub kind: String,
    /// Output root the rendered paths live under.
    pub path: PathBuf,
    /// Destination path template with `{field}` placeholders.
    pub format: String,
    pub converter: ConverterSpec,
}

/// External conversion command with positional placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterSpec {
    pub bin: String,
    /// Arguments, passed through verbatim except for the `%input%` and
    /// `%output%` placeholders.
    pub args: Vec<String>,
}

impl ConvertConfig {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Look up the requested output profile by name.
    pub fn profile(&self, kind: &str) -> Result<&OutputProfile> {
        self.output
            .iter()
            .find(|profile| profile.kind == kind)
            .ok_or_else(|| Error::Config(format!("output profile \"{kind}\" not found")))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .map_err(|err| Error::Config(format!("cannot read {}: {err}", path.display())))?;
    serde_json::from_str(&data)
        .map_err(|err| Error::Config(format!("malformed configuration {}: {err}", path.display())))
}

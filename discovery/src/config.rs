//! Run configuration.
//!
//! A YAML file (typically `typegen.yaml`) can hold every setting of a
//! generation run. All fields are optional; command-line flags layered on
//! top override file values.
//!
//! # Example YAML
//!
//! ```yaml
//! inputs:
//!   - models/
//! recursive: true
//! output: web/src/types.ts
//! case: camel
//! mode: combined
//! exports: []
//! require_marker: false
//! strict: false
//! strip_property_titles: true
//! generator:
//!   executable: json2ts
//!   timeout_ms: 30000
//!   additional_properties: false
//!   unknown_any: true
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use model_typegen_core::{CaseRule, MergeOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractor::ExportSelection;
use crate::generator::GeneratorConfig;

/// How generated text is produced from the exported models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Merge every model into one combined schema and generate once.
    #[default]
    Combined,
    /// Generate each model on its own and concatenate the results.
    PerModel,
}

/// Settings of one generation run.
///
/// # Examples
///
/// ```
/// use model_typegen_discovery::config::{GenerationMode, TypegenConfig};
///
/// let config: TypegenConfig = serde_yaml::from_str("inputs: [models]\ncase: camel\n").unwrap();
/// assert_eq!(config.inputs.len(), 1);
/// assert_eq!(config.mode, GenerationMode::Combined);
/// assert!(config.strip_property_titles);
/// assert_eq!(config.generator.executable, "json2ts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypegenConfig {
    /// Schema files and/or directories to scan.
    pub inputs: Vec<PathBuf>,
    /// Descend into subdirectories of input directories.
    pub recursive: bool,
    /// Destination of the generated file.
    pub output: Option<PathBuf>,
    /// Property-name casing. `None` keeps names as they are.
    pub case: Option<CaseRule>,
    pub mode: GenerationMode,
    /// Export only these model titles. Empty exports all.
    pub exports: Vec<String>,
    /// Export only documents marked with `"x-export": true`.
    pub require_marker: bool,
    /// Fail on documents that have neither a title nor `$defs`.
    pub strict: bool,
    /// Drop `title` from property schemas before generation.
    pub strip_property_titles: bool,
    pub generator: GeneratorConfig,
}

impl Default for TypegenConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            recursive: false,
            output: None,
            case: None,
            mode: GenerationMode::default(),
            exports: Vec::new(),
            require_marker: false,
            strict: false,
            strip_property_titles: true,
            generator: GeneratorConfig::default(),
        }
    }
}

impl TypegenConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::TypegenError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::TypegenError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Merge options derived from this configuration.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            strip_property_titles: self.strip_property_titles,
            strict: self.strict,
        }
    }

    /// Export selection derived from this configuration.
    pub fn export_selection(&self) -> ExportSelection {
        ExportSelection {
            names: self.exports.clone(),
            require_marker: self.require_marker,
        }
    }
}

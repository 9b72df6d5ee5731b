//! Configuration file support
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments (--segment, --max-rows)
//! 2. Project config (./.disclosure.toml)
//! 3. User config (~/.disclosure.toml)
//! 4. Built-in defaults
//!
//! An explicit `--config <FILE>` replaces discovery entirely.
//!
//! ```toml
//! [extract]
//! segment = true
//!
//! [output]
//! max_rows_per_sheet = 500000
//! workbook_name = "tax_information.xlsx"
//! ```

use disclosure_core::{DisclosureError, RunOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the home and current directories
pub const CONFIG_FILE_NAME: &str = ".disclosure.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extraction defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractConfig>,

    /// Workbook defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Use sentence-boundary segmentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Data rows per sheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows_per_sheet: Option<usize>,

    /// Workbook file name inside the target directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook_name: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self, DisclosureError> {
        let content = fs::read_to_string(path).map_err(|e| {
            DisclosureError::InvalidInput(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        // TOML errors carry line/column information
        toml::from_str(&content).map_err(|e| {
            DisclosureError::InvalidInput(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Load the explicit config if given, otherwise discover and merge the
    /// user and project configs.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, DisclosureError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let user = dirs::home_dir()
                    .and_then(|home| Self::load_optional(&home.join(CONFIG_FILE_NAME)));
                let project = Self::load_optional(&PathBuf::from(CONFIG_FILE_NAME));
                Ok(Self::merge(user, project))
            }
        }
    }

    /// Load a discovered config; a malformed file is skipped with a warning.
    fn load_optional(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                log::warn!("Ignoring config file: {e}");
                None
            }
        }
    }

    /// Merge configs field by field; project values override user values.
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = user_config.unwrap_or_default();
        let Some(project) = project_config else {
            return merged;
        };

        if let Some(extract) = project.extract {
            let merged_extract = merged.extract.get_or_insert_with(ExtractConfig::default);
            if let Some(segment) = extract.segment {
                merged_extract.segment = Some(segment);
            }
        }

        if let Some(output) = project.output {
            let merged_output = merged.output.get_or_insert_with(OutputConfig::default);
            if let Some(max_rows) = output.max_rows_per_sheet {
                merged_output.max_rows_per_sheet = Some(max_rows);
            }
            if let Some(name) = output.workbook_name {
                merged_output.workbook_name = Some(name);
            }
        }

        merged
    }

    /// Apply configured defaults on top of `options`
    pub fn apply(&self, mut options: RunOptions) -> RunOptions {
        if let Some(segment) = self.extract.as_ref().and_then(|e| e.segment) {
            options = options.with_advanced_segmentation(segment);
        }
        if let Some(output) = &self.output {
            if let Some(max_rows) = output.max_rows_per_sheet {
                options = options.with_max_rows_per_sheet(max_rows);
            }
            if let Some(name) = &output.workbook_name {
                options = options.with_workbook_name(name.as_str());
            }
        }
        options
    }
}

//! Configuration loading from depscan.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{DepscanError, DepscanResult};
use crate::report::OutputFormat;

/// Name of the optional configuration file at the scan root.
pub const CONFIG_FILE: &str = "depscan.toml";

/// Recognized extensions, in resolution priority order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".vue"];

/// Directory-name substrings excluded from discovery.
pub const DEFAULT_IGNORE: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "coverage",
    ".git",
    ".next",
    ".nuxt",
];

/// Number of external packages listed in the statistics ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Main configuration structure for depscan.toml.
#[derive(Debug, Deserialize, Default)]
pub struct DepscanConfig {
    /// Replaces the default extension list (order is resolution priority).
    pub extensions: Option<Vec<String>>,
    /// Extra ignore substrings, added to the defaults.
    pub ignore: Option<Vec<String>>,
    /// Whether `.test.`/`.spec.` files are scanned.
    pub include_tests: Option<bool>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "tree", "json" or "both".
    pub format: Option<String>,
    /// Size of the external package ranking in the statistics view.
    pub top: Option<usize>,
}

impl DepscanConfig {
    /// Parsed output format, if one is configured.
    pub fn output_format(&self) -> DepscanResult<Option<OutputFormat>> {
        match self.output.as_ref().and_then(|o| o.format.as_deref()) {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map(Some)
                .map_err(|message| DepscanError::config(CONFIG_FILE, message)),
            None => Ok(None),
        }
    }

    /// Configured ranking size, if any.
    pub fn top(&self) -> Option<usize> {
        self.output.as_ref().and_then(|o| o.top)
    }
}

/// Loads configuration from depscan.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DepscanConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content).context("Invalid depscan.toml")?;
    Ok(Some(cfg))
}

//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use depscan_core::prelude::*;
//! ```

// Core analysis types
pub use crate::builder::{AnalysisResult, Depscan};
pub use crate::error::{DepscanError, DepscanResult};

// Graph and classification
pub use crate::detect::UnusedFile;
pub use crate::graph::DependencyGraph;

// Configuration
pub use crate::config::{load_config, DepscanConfig};

// Reporting
pub use crate::report::{
    analysis_timestamp, render_json, render_statistics, render_tree, OutputFormat,
};

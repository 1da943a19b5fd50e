//! depscan-core: file-level dependency graphs and unused file detection
//! for JavaScript and TypeScript source trees.
//!
//! The analysis is a single batch pass:
//!
//! 1. [`scan`] discovers candidate files under a root
//! 2. [`extract`] pulls module references out of each file's text
//! 3. [`resolve`] maps internal references to files on disk
//! 4. [`graph`] builds forward edges in parallel, then inverts them
//! 5. [`entry`] and [`detect`] classify entry points and unused files
//! 6. [`report`] renders a tree, statistics, or a JSON export
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use depscan_core::prelude::*;
//!
//! let result = Depscan::new("/path/to/project").analyze()?;
//! print!("{}", render_tree(&result, false));
//! ```
//!
//! Extraction is regex based. Template literal specifiers and computed
//! `require` arguments are not recognized.

pub mod builder;
pub mod config;
pub mod detect;
pub mod entry;
pub mod error;
pub mod extract;
pub mod graph;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod scan;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{DepscanError, DepscanResult, IoResultExt};

// Builder API
pub use builder::{AnalysisResult, Depscan};

// Configuration
pub use config::{
    load_config, DepscanConfig, OutputConfig, CONFIG_FILE, DEFAULT_EXTENSIONS, DEFAULT_IGNORE,
    DEFAULT_TOP_N,
};

// Discovery
pub use scan::{discover_files, is_test_file, Discovery, FileRecord, ScanOptions, SourceFile};

// Extraction and resolution
pub use extract::{extract_references, is_external, package_name, References};
pub use resolve::PathResolver;

// Graph building
pub use graph::{analyze_file, build_graph, invert, DependencyGraph, Edges, FileAnalysis, GraphBuild};

// Classification
pub use detect::{confidence_score, find_unused, UnusedFile};
pub use entry::{classify_entry_points, is_entry_point};

// Reporting
pub use report::{
    analysis_timestamp, build_json_report, render_json, render_statistics, render_tree,
    JsonReport, OutputFormat,
};

// Logging
pub use logging::{init_structured_logging, log_error, log_event, log_info, log_warn};

#[cfg(test)]
mod tests;

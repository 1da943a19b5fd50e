//! Builder pattern API for depscan analysis.
//!
//! ```rust,ignore
//! use depscan_core::prelude::*;
//!
//! let result = Depscan::new("/path/to/project")
//!     .extensions([".ts", ".tsx", ".js"])
//!     .ignore(["generated"])
//!     .include_tests(false)
//!     .analyze()?;
//!
//! for unused in &result.unused {
//!     println!("{} ({}%)", unused.path, unused.confidence);
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{DepscanConfig, DEFAULT_EXTENSIONS, DEFAULT_IGNORE};
use crate::detect::{find_unused, is_unused, UnusedFile};
use crate::entry::classify_entry_points;
use crate::error::DepscanError;
use crate::graph::{build_graph, DependencyGraph};
use crate::resolve::PathResolver;
use crate::scan::{discover_files, FileRecord, ScanOptions};

/// Builder for configuring an analysis run.
#[derive(Debug, Clone)]
pub struct Depscan {
    /// Root directory to scan
    root: PathBuf,

    /// Recognized extensions in resolution priority order
    extensions: Vec<String>,

    /// Ignore substrings for path segments
    ignore: Vec<String>,

    /// Whether test/spec files are scanned
    include_tests: bool,
}

impl Depscan {
    /// Create a new analysis builder with default extensions and ignore rules.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore: DEFAULT_IGNORE.iter().map(|i| i.to_string()).collect(),
            include_tests: false,
        }
    }

    /// Replace the recognized extension list. Order is resolution priority.
    ///
    /// Entries without a leading dot get one.
    pub fn extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions = exts
            .into_iter()
            .map(Into::into)
            .map(|e| if e.starts_with('.') { e } else { format!(".{}", e) })
            .collect();
        self
    }

    /// Add ignore substrings on top of the defaults.
    pub fn ignore(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Scan `.test.`/`.spec.` files too.
    pub fn include_tests(mut self, enabled: bool) -> Self {
        self.include_tests = enabled;
        self
    }

    /// Apply settings from a loaded depscan.toml.
    pub fn with_config(mut self, config: &DepscanConfig) -> Self {
        if let Some(exts) = &config.extensions {
            self = self.extensions(exts.iter().cloned());
        }
        if let Some(ignore) = &config.ignore {
            self = self.ignore(ignore.iter().cloned());
        }
        if let Some(include) = config.include_tests {
            self.include_tests = include;
        }
        self
    }

    /// Run the analysis and return results.
    ///
    /// Fails only when the root itself is unusable. Unreadable directories
    /// and files are recorded in [`AnalysisResult::errors`].
    pub fn analyze(&self) -> Result<AnalysisResult> {
        // 1. Canonical root
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("Cannot access root directory {}", self.root.display()))?;
        if !root.is_dir() {
            return Err(DepscanError::invalid_argument(format!(
                "{} is not a directory",
                root.display()
            ))
            .into());
        }

        // 2. Discover files
        let options = ScanOptions {
            extensions: self.extensions.clone(),
            ignore: self.ignore.clone(),
            include_tests: self.include_tests,
        };
        let discovery = discover_files(&root, &options);

        // 3. Build the graph (parallel pass 1, inversion pass 2)
        let resolver = PathResolver::new(&root, self.extensions.clone());
        let build = build_graph(&discovery.files, &resolver);

        // 4. Classify
        let entry_points = classify_entry_points(build.files.values());
        let reachable = build.graph.reachable_from(&entry_points);
        let unused = find_unused(&build.files, &build.graph, &entry_points);

        let mut errors = discovery.errors;
        errors.extend(build.errors);

        tracing::info!(
            files = build.files.len(),
            entry_points = entry_points.len(),
            reachable = reachable.len(),
            unused = unused.len(),
            errors = errors.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            root,
            files: build.files,
            graph: build.graph,
            entry_points,
            reachable,
            unused,
            errors,
        })
    }
}

/// Immutable outcome of one analysis run.
#[derive(Debug)]
pub struct AnalysisResult {
    /// Canonical scan root
    pub root: PathBuf,
    /// Successfully read files, keyed by absolute path
    pub files: BTreeMap<PathBuf, FileRecord>,
    pub graph: DependencyGraph,
    pub entry_points: BTreeSet<PathBuf>,
    /// Files reachable from any entry point (entry points included)
    pub reachable: BTreeSet<PathBuf>,
    /// Sorted by descending confidence, then relative path
    pub unused: Vec<UnusedFile>,
    /// Recorded enumeration and read failures
    pub errors: Vec<DepscanError>,
}

impl AnalysisResult {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn total_lines(&self) -> usize {
        self.files.values().map(|f| f.lines).sum()
    }

    pub fn is_entry_point(&self, path: &Path) -> bool {
        self.entry_points.contains(path)
    }

    pub fn is_unused(&self, path: &Path) -> bool {
        self.files.contains_key(path) && is_unused(&self.graph, &self.entry_points, path)
    }

    /// Relative display path for a graph node.
    pub fn relative(&self, path: &Path) -> String {
        match self.files.get(path) {
            Some(record) => record.relative.clone(),
            None => crate::scan::relative_path(&self.root, path),
        }
    }

    /// Sorted relative paths of the files `path` imports.
    pub fn imports_of(&self, path: &Path) -> Vec<String> {
        let mut out: Vec<String> = self.graph.imports(path).map(|p| self.relative(p)).collect();
        out.sort();
        out
    }

    /// Sorted relative paths of the files importing `path`.
    pub fn importers_of(&self, path: &Path) -> Vec<String> {
        let mut out: Vec<String> = self.graph.importers(path).map(|p| self.relative(p)).collect();
        out.sort();
        out
    }

    /// Number of files referencing each external package, sorted by count
    /// descending then name.
    pub fn external_usage(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for packages in self.graph.external_refs().values() {
            for pkg in packages {
                *counts.entry(pkg.as_str()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Sum of line counts across unused files.
    pub fn unused_lines(&self) -> usize {
        self.unused.iter().map(|u| u.lines).sum()
    }

    /// Share of scanned files that are unused, in percent.
    pub fn unused_percentage(&self) -> f64 {
        if self.files.is_empty() {
            0.0
        } else {
            self.unused.len() as f64 * 100.0 / self.files.len() as f64
        }
    }
}

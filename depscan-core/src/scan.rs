//! Deterministic source file discovery with early directory pruning.
//!
//! - Segments are pruned via `WalkDir::filter_entry` before they are read
//! - Entries are visited in file-name order so every run lists files identically
//! - Unreadable directories are recorded and skipped; the walk carries on

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DepscanError, DepscanResult, IoResultExt};

/// Symlinks are not followed, but the depth is still bounded.
const MAX_WALK_DEPTH: usize = 64;

/// Name fragments that mark a test or spec file.
const TEST_MARKERS: &[&str] = &[".test.", ".spec."];

/// Rules applied while walking the tree.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Recognized extensions including the leading dot.
    pub extensions: Vec<String>,
    /// Path segments containing any of these are pruned.
    pub ignore: Vec<String>,
    /// Keep files carrying a test/spec marker.
    pub include_tests: bool,
}

/// A discovered file before its content is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub relative: String,
}

/// Output of a discovery walk.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<SourceFile>,
    pub errors: Vec<DepscanError>,
}

/// A scanned source file with its content.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub relative: String,
    pub name: String,
    /// Extension with its leading dot, e.g. `.tsx`
    pub extension: String,
    /// Size in bytes
    pub size: u64,
    pub lines: usize,
    pub content: String,
    pub is_test: bool,
}

impl FileRecord {
    /// Reads a discovered file into a record.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. `size` is the byte
    /// length on disk.
    pub fn read(file: &SourceFile) -> DepscanResult<Self> {
        let bytes = fs::read(&file.path).with_path(&file.path)?;
        let size = bytes.len() as u64;
        let content = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        Ok(Self::with_size(file, content, size))
    }

    /// Builds a record from already loaded content.
    pub fn from_content(file: &SourceFile, content: String) -> Self {
        let size = content.len() as u64;
        Self::with_size(file, content, size)
    }

    fn with_size(file: &SourceFile, content: String, size: u64) -> Self {
        let name = file_name(&file.path);
        let extension = file
            .path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        Self {
            path: file.path.clone(),
            relative: file.relative.clone(),
            is_test: is_test_file(&name),
            name,
            extension,
            size,
            lines: content.lines().count(),
            content,
        }
    }
}

/// True when the file name carries a test/spec marker.
pub fn is_test_file(name: &str) -> bool {
    TEST_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Convert a path relative to `root` to a `/`-separated string.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Checks if an entry should be pruned together with its subtree.
///
/// Applies to every segment below the root, file names included. The root
/// itself is never pruned, so scanning a hidden directory works.
#[inline]
fn is_pruned(entry: &walkdir::DirEntry, ignore: &[String]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    ignore.iter().any(|pattern| name.contains(pattern.as_str()))
}

fn has_extension(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Recursively lists candidate source files under `root`.
///
/// Files come back in walk order (sorted by name within each directory).
/// Directory read failures are recorded in [`Discovery::errors`].
pub fn discover_files(root: &Path, options: &ScanOptions) -> Discovery {
    let mut discovery = Discovery::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(MAX_WALK_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_pruned(e, &options.ignore));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable directory");
                discovery
                    .errors
                    .push(DepscanError::enumeration(path, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !has_extension(&name, &options.extensions) {
            continue;
        }
        if !options.include_tests && is_test_file(&name) {
            continue;
        }

        let path = entry.path().to_path_buf();
        discovery.files.push(SourceFile {
            relative: relative_path(root, &path),
            path,
        });
    }

    tracing::info!(
        root = %root.display(),
        files = discovery.files.len(),
        errors = discovery.errors.len(),
        "discovery complete"
    );

    discovery
}

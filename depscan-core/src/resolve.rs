//! Internal reference resolution to files on disk.
//!
//! Resolution order, first hit wins:
//! 1. the path as written
//! 2. the path with each recognized extension appended
//! 3. `index` plus each recognized extension inside the path
//!
//! The extension list is probed in order, so `./a` with both `a.js` and
//! `a.ts` present resolves to whichever extension comes first.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Resolves internal references relative to a scan root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    extensions: Vec<String>,
}

impl PathResolver {
    /// `extensions` is the probing priority order, each with a leading dot.
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve `spec` as referenced from the file at `from`.
    ///
    /// Returns `None` for external specifiers and for references that match
    /// nothing on disk.
    pub fn resolve(&self, from: &Path, spec: &str) -> Option<PathBuf> {
        let base = if spec.starts_with('.') {
            from.parent()?.join(spec)
        } else if let Some(stripped) = spec.strip_prefix('/') {
            self.root.join(stripped.trim_start_matches('/'))
        } else {
            return None;
        };
        let base = normalize_lexically(&base);

        if base.is_file() {
            return Some(base);
        }

        if let Some(found) = self
            .extensions
            .iter()
            .map(|ext| with_suffix(&base, ext))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }

        self.extensions
            .iter()
            .map(|ext| base.join(format!("index{}", ext)))
            .find(|candidate| candidate.is_file())
    }
}

/// Append a raw suffix to the last path component (`a/b` + `.js` → `a/b.js`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Remove `.` and `..` components without touching the filesystem.
///
/// Keeps resolved paths in the same form as the paths produced by discovery,
/// so they can be used as graph keys directly.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

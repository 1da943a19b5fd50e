//! Unused file detection and confidence scoring.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::scan::FileRecord;

/// Files longer than this lose confidence.
const LARGE_FILE_LINES: usize = 100;

const ENTRY_LIKE_MARKERS: &[&str] = &["main", "app"];
const CONFIG_MARKERS: &[&str] = &["config", "setup"];
const DECLARATION_SUFFIX: &str = ".d.ts";
const LEFTOVER_MARKERS: &[&str] = &["backup", "old", "temp", "unused"];

/// A file with no importers that is not an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedFile {
    /// Path relative to the scan root
    pub path: String,
    pub lines: usize,
    pub size: u64,
    /// 0-100, higher means safer to delete
    pub confidence: u8,
}

/// Heuristic confidence that an unused-looking file can be removed.
///
/// Adjustments are additive and the result is clamped to 0..=100. Name
/// markers are matched literally, so `MyAppWidget.js` carries no `app` marker.
pub fn confidence_score(name: &str, lines: usize) -> u8 {
    let has_any = |markers: &[&str]| markers.iter().any(|m| name.contains(m));

    let mut score: i32 = 100;
    if has_any(ENTRY_LIKE_MARKERS) {
        score -= 30;
    }
    if lines > LARGE_FILE_LINES {
        score -= 20;
    }
    if has_any(CONFIG_MARKERS) || name.ends_with(DECLARATION_SUFFIX) {
        score -= 40;
    }
    if has_any(LEFTOVER_MARKERS) {
        score += 20;
    }

    score.clamp(0, 100) as u8
}

/// True when nothing imports `path` and it is not an entry point.
pub fn is_unused(graph: &DependencyGraph, entry_points: &BTreeSet<PathBuf>, path: &Path) -> bool {
    !graph.has_importers(path) && !entry_points.contains(path)
}

/// Derive the unused list, sorted by descending confidence then relative path.
pub fn find_unused(
    files: &BTreeMap<PathBuf, FileRecord>,
    graph: &DependencyGraph,
    entry_points: &BTreeSet<PathBuf>,
) -> Vec<UnusedFile> {
    let mut unused: Vec<UnusedFile> = files
        .iter()
        .filter(|(path, _)| is_unused(graph, entry_points, path))
        .map(|(_, record)| UnusedFile {
            path: record.relative.clone(),
            lines: record.lines,
            size: record.size,
            confidence: confidence_score(&record.name, record.lines),
        })
        .collect();

    unused.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.path.cmp(&b.path))
    });

    unused
}

//! Output formatting: dependency tree, statistics and JSON export.
//!
//! Renderers only read the finished [`AnalysisResult`]. Every collection is
//! emitted in sorted order, so identical trees give identical output.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{self, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::builder::AnalysisResult;
use crate::detect::UnusedFile;
use crate::scan::FileRecord;

/// Report format selected on the command line or in depscan.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tree view followed by statistics
    #[default]
    Tree,
    /// Structured JSON export only
    Json,
    /// Tree and statistics, plus the JSON export
    Both,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "invalid format '{}' (expected one of: tree, json, both)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tree => "tree",
            Self::Json => "json",
            Self::Both => "both",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Tree view
// ============================================================================

/// Render entry points, other imported files and unused files as a tree.
///
/// Each file is expanded at most once. Later occurrences are marked
/// `(see above)`, which also stops recursion on cyclic imports.
pub fn render_tree(result: &AnalysisResult, show_external: bool) -> String {
    let mut out = String::with_capacity(result.files.len() * 96 + 256);
    if let Err(e) = write_tree(&mut out, result, show_external) {
        tracing::error!(error = %e, "failed to render tree");
    }
    out
}

fn write_tree(out: &mut String, result: &AnalysisResult, show_external: bool) -> fmt::Result {
    let mut visited: HashSet<&Path> = HashSet::new();

    writeln!(out, "=== Dependency Tree: {} ===", result.root.display())?;
    writeln!(out)?;

    writeln!(out, "ENTRY POINTS ({}):", result.entry_points.len())?;
    if result.entry_points.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for entry in &result.entry_points {
        write_top_level(out, result, entry, "[entry]", &mut visited, show_external)?;
    }

    let others: Vec<&Path> = result
        .files
        .keys()
        .map(|p| p.as_path())
        .filter(|p| {
            !result.is_entry_point(p) && result.graph.has_importers(p) && !visited.contains(p)
        })
        .collect();

    // Expanding one file can cover a later one, so count what is printed
    let mut section = String::new();
    let mut shown = 0;
    for path in others {
        if visited.contains(path) {
            continue;
        }
        write_top_level(&mut section, result, path, "[file]", &mut visited, show_external)?;
        shown += 1;
    }

    writeln!(out)?;
    writeln!(out, "IMPORTED FILES NOT SHOWN ABOVE ({}):", shown)?;
    if shown == 0 {
        writeln!(out, "  (none)")?;
    }
    out.push_str(&section);

    writeln!(out)?;
    write_unused(out, result, show_external)
}

fn write_top_level<'a>(
    out: &mut String,
    result: &'a AnalysisResult,
    path: &'a Path,
    tag: &str,
    visited: &mut HashSet<&'a Path>,
    show_external: bool,
) -> fmt::Result {
    visited.insert(path);

    writeln!(out, "{} {}", tag, result.relative(path))?;
    write_list(out, "    imports", &result.imports_of(path))?;
    write_list(out, "    imported by", &result.importers_of(path))?;
    if show_external {
        let externals: Vec<String> = result.graph.externals(path).cloned().collect();
        write_list(out, "    external", &externals)?;
    }

    write_children(out, result, path, "    ", visited, show_external)
}

fn write_children<'a>(
    out: &mut String,
    result: &'a AnalysisResult,
    path: &'a Path,
    prefix: &str,
    visited: &mut HashSet<&'a Path>,
    show_external: bool,
) -> fmt::Result {
    let mut children: Vec<&'a Path> = result.graph.imports(path).map(|p| p.as_path()).collect();
    children.sort_by_key(|p| result.relative(p));

    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        let rel = result.relative(child);

        let note = if result.is_entry_point(child) {
            Some("(entry point)")
        } else if visited.contains(child) {
            Some("(see above)")
        } else {
            None
        };

        match note {
            Some(note) => writeln!(out, "{}{}{} {}", prefix, connector, rel, note)?,
            None => {
                visited.insert(child);
                if show_external {
                    let externals: Vec<&str> =
                        result.graph.externals(child).map(String::as_str).collect();
                    if externals.is_empty() {
                        writeln!(out, "{}{}{}", prefix, connector, rel)?;
                    } else {
                        writeln!(
                            out,
                            "{}{}{} [ext: {}]",
                            prefix,
                            connector,
                            rel,
                            externals.join(", ")
                        )?;
                    }
                } else {
                    writeln!(out, "{}{}{}", prefix, connector, rel)?;
                }
                let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
                write_children(out, result, child, &child_prefix, visited, show_external)?;
            }
        }
    }

    Ok(())
}

fn write_list(out: &mut String, label: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        writeln!(out, "{} (0): -", label)
    } else {
        writeln!(out, "{} ({}): {}", label, items.len(), items.join(", "))
    }
}

fn write_unused(out: &mut String, result: &AnalysisResult, show_external: bool) -> fmt::Result {
    let by_relative: HashMap<&str, &FileRecord> = result
        .files
        .values()
        .map(|r| (r.relative.as_str(), r))
        .collect();

    writeln!(out, "UNUSED FILES ({}):", result.unused.len())?;
    if result.unused.is_empty() {
        writeln!(out, "  No unused files found.")?;
        return Ok(());
    }

    for unused in &result.unused {
        let record = by_relative.get(unused.path.as_str());
        let extension = record.map(|r| r.extension.as_str()).unwrap_or("");
        writeln!(
            out,
            "  {}  [{}, {} lines, {}, confidence {}%]",
            unused.path,
            extension,
            unused.lines,
            format_size(unused.size),
            unused.confidence
        )?;
        if show_external {
            if let Some(record) = record {
                let externals: Vec<&str> =
                    result.graph.externals(&record.path).map(String::as_str).collect();
                if !externals.is_empty() {
                    writeln!(out, "      external: {}", externals.join(", "))?;
                }
            }
        }
    }

    Ok(())
}

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Statistics view
// ============================================================================

/// Render totals and the top-N external package ranking.
pub fn render_statistics(result: &AnalysisResult, top: usize) -> String {
    let mut out = String::with_capacity(512 + top * 48);
    if let Err(e) = write_statistics(&mut out, result, top) {
        tracing::error!(error = %e, "failed to render statistics");
    }
    out
}

fn write_statistics(out: &mut String, result: &AnalysisResult, top: usize) -> fmt::Result {
    writeln!(out, "=== Statistics ===")?;
    writeln!(out, "Total files:       {}", result.total_files())?;
    writeln!(out, "Total lines:       {}", result.total_lines())?;
    writeln!(out, "Entry points:      {}", result.entry_points.len())?;
    writeln!(out, "Reachable files:   {}", result.reachable.len())?;
    writeln!(out, "Dependency edges:  {}", result.graph.edge_count())?;
    writeln!(
        out,
        "Unused files:      {} ({:.1}%)",
        result.unused.len(),
        result.unused_percentage()
    )?;
    writeln!(out, "Unused lines:      {}", result.unused_lines())?;
    writeln!(out, "Recorded errors:   {}", result.errors.len())?;

    let usage = result.external_usage();
    writeln!(out)?;
    writeln!(out, "TOP EXTERNAL PACKAGES:")?;
    if usage.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (rank, (name, count)) in usage.iter().take(top).enumerate() {
        let unit = if *count == 1 { "file" } else { "files" };
        writeln!(out, "  {:>2}. {} ({} {})", rank + 1, name, count, unit)?;
    }

    Ok(())
}

// ============================================================================
// Structured export
// ============================================================================

/// Top-level JSON document.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub directory: String,
    pub analysis_date: String,
    pub summary: JsonSummary,
    pub files: BTreeMap<String, JsonFileEntry>,
    pub unused_files: Vec<UnusedFile>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub unused_files_count: usize,
    pub unused_files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonFileEntry {
    pub full_path: String,
    pub extension: String,
    pub lines: usize,
    pub size: u64,
    pub imports: Vec<String>,
    pub imported_by: Vec<String>,
    pub external_imports: Vec<String>,
    pub is_unused: bool,
}

/// Timestamp for the export.
///
/// Honors `SOURCE_DATE_EPOCH` (seconds since the Unix epoch) so repeated runs
/// can produce byte-identical output.
pub fn analysis_timestamp() -> DateTime<Utc> {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now)
}

/// Assemble the export document.
pub fn build_json_report(result: &AnalysisResult, analysis_date: DateTime<Utc>) -> JsonReport {
    let files = result
        .files
        .values()
        .map(|record| {
            let entry = JsonFileEntry {
                full_path: record.path.display().to_string(),
                extension: record.extension.clone(),
                lines: record.lines,
                size: record.size,
                imports: result.imports_of(&record.path),
                imported_by: result.importers_of(&record.path),
                external_imports: result.graph.externals(&record.path).cloned().collect(),
                is_unused: result.is_unused(&record.path),
            };
            (record.relative.clone(), entry)
        })
        .collect();

    JsonReport {
        directory: result.root.display().to_string(),
        analysis_date: analysis_date.to_rfc3339_opts(SecondsFormat::Secs, true),
        summary: JsonSummary {
            total_files: result.total_files(),
            unused_files_count: result.unused.len(),
            unused_files: result.unused.iter().map(|u| u.path.clone()).collect(),
        },
        files,
        unused_files: result.unused.clone(),
        errors: result.errors.iter().map(ToString::to_string).collect(),
    }
}

/// Serialize the export as pretty-printed JSON.
pub fn render_json(result: &AnalysisResult, analysis_date: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build_json_report(result, analysis_date))
}

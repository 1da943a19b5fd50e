//! End-to-end test suite for depscan-core.

use crate::*;
use chrono::{TimeZone, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("depscan_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn lines(n: usize) -> String {
    (0..n).map(|i| format!("// line {}\n", i)).collect()
}

fn unused_paths(result: &AnalysisResult) -> Vec<&str> {
    result.unused.iter().map(|u| u.path.as_str()).collect()
}

fn fixed_date() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn export(result: &AnalysisResult) -> serde_json::Value {
    serde_json::from_str(&render_json(result, fixed_date()).unwrap()).unwrap()
}

// Scenario A: shallow entry imports one of two deep files
#[test]
fn test_shallow_entry_leaves_unreferenced_file_unused() {
    let root = setup_temp_project();
    write_file(&root.join("a.js"), "import b from './lib/deep/b';\n");
    write_file(&root.join("lib/deep/b.js"), "export default 1;\n");
    write_file(&root.join("lib/deep/c.js"), "export default 2;\n");

    let result = Depscan::new(&root).analyze().unwrap();

    assert!(result.is_entry_point(&result.root.join("a.js")));
    assert_eq!(unused_paths(&result), vec!["lib/deep/c.js"]);
}

// Scenario B: external references never become graph nodes
#[test]
fn test_external_reference_is_not_a_node() {
    let root = setup_temp_project();
    write_file(&root.join("a.js"), "import 'left-pad';\n");

    let result = Depscan::new(&root).analyze().unwrap();
    let json = export(&result);

    assert_eq!(json["files"]["a.js"]["external_imports"], serde_json::json!(["left-pad"]));
    assert_eq!(result.graph.nodes().count(), 1);
    assert!(result
        .graph
        .nodes()
        .all(|n| !n.to_string_lossy().contains("left-pad")));
}

// Scenario C: summary count agrees with per-file flags
#[test]
fn test_export_unused_count_matches_flags() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import './src/ui/used';\n");
    write_file(&root.join("src/ui/used.js"), "");
    write_file(&root.join("src/ui/orphan_a.js"), "");
    write_file(&root.join("src/ui/orphan_b.ts"), "import x from './used';\n");

    let result = Depscan::new(&root).analyze().unwrap();
    let json = export(&result);

    let flagged = json["files"]
        .as_object()
        .unwrap()
        .values()
        .filter(|f| f["is_unused"].as_bool().unwrap())
        .count();
    assert_eq!(flagged, 2);
    assert_eq!(json["summary"]["unused_files_count"].as_u64().unwrap() as usize, flagged);
    assert_eq!(json["unused_files"].as_array().unwrap().len(), flagged);
    assert_eq!(json["summary"]["total_files"], 4);
}

// Scenario D: leftover marker pushes the score past 100, clamped
#[test]
fn test_backup_file_confidence_is_clamped() {
    let root = setup_temp_project();
    write_file(
        &root.join("src/features/legacy/old_backup_widget.js"),
        &lines(20),
    );

    let result = Depscan::new(&root).analyze().unwrap();

    assert_eq!(result.unused.len(), 1);
    assert_eq!(result.unused[0].path, "src/features/legacy/old_backup_widget.js");
    assert_eq!(result.unused[0].lines, 20);
    assert_eq!(result.unused[0].confidence, 100);
}

#[test]
fn test_unused_iff_no_importers_and_not_entry() {
    let root = setup_temp_project();
    write_file(&root.join("src/main.ts"), "import { a } from './core/a';\n");
    write_file(&root.join("src/core/a.ts"), "import b from './b';\n");
    write_file(&root.join("src/core/b.ts"), "import a from './a';\n");
    write_file(&root.join("src/core/c.ts"), "import a from './a';\n");
    write_file(&root.join("src/core/router.ts"), "");
    write_file(&root.join("src/core/d/index.ts"), "");

    let result = Depscan::new(&root).analyze().unwrap();
    let unused: BTreeSet<&str> = unused_paths(&result).into_iter().collect();

    for (path, record) in &result.files {
        let expected = !result.graph.has_importers(path) && !result.entry_points.contains(path);
        assert_eq!(
            unused.contains(record.relative.as_str()),
            expected,
            "{}",
            record.relative
        );
    }
    assert_eq!(unused, ["src/core/c.ts"].into_iter().collect());
}

#[test]
fn test_inversion_holds_on_real_tree() {
    let root = setup_temp_project();
    write_file(&root.join("index.js"), "import './src/x/a';\nrequire('./src/x/b');\n");
    write_file(&root.join("src/x/a.js"), "import('./b');\n");
    write_file(&root.join("src/x/b.js"), "import a from './a';\n");

    let result = Depscan::new(&root).analyze().unwrap();
    let g = &result.graph;

    assert_eq!(g.edge_count(), 4);
    for (a, targets) in g.forward() {
        for b in targets {
            assert!(g.reverse()[b].contains(a));
        }
    }
    for (b, sources) in g.reverse() {
        for a in sources {
            assert!(g.forward()[a].contains(b));
        }
    }
}

#[test]
fn test_exports_are_deterministic() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import r from 'react';\nimport './src/a/b';\n");
    write_file(&root.join("src/a/b.js"), "import x from '@scope/pkg/deep';\n");
    write_file(&root.join("src/a/z.js"), "");
    write_file(&root.join("src/a/y.js"), "");

    let first = render_json(&Depscan::new(&root).analyze().unwrap(), fixed_date()).unwrap();
    let second = render_json(&Depscan::new(&root).analyze().unwrap(), fixed_date()).unwrap();

    assert_eq!(first, second);
    assert!(first.contains("\"analysis_date\": \"2023-11-14T22:13:20Z\""));
}

#[test]
fn test_cycle_renders_once() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import './src/app/shell';\n");
    write_file(&root.join("src/app/shell.js"), "import './panel';\n");
    write_file(&root.join("src/app/panel.js"), "import './shell';\n");

    let result = Depscan::new(&root).analyze().unwrap();
    let tree = render_tree(&result, false);

    assert!(tree.contains("[entry] main.js"));
    assert!(tree.contains("    └── src/app/shell.js\n"));
    assert!(tree.contains("        └── src/app/panel.js\n"));
    assert!(tree.contains("└── src/app/shell.js (see above)"));
    assert!(tree.contains("No unused files found."));
}

#[test]
fn test_tree_lists_unused_with_annotations() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "");
    write_file(
        &root.join("src/lib/util/stale.js"),
        "import _ from 'lodash';\n",
    );

    let result = Depscan::new(&root).analyze().unwrap();
    let tree = render_tree(&result, true);

    assert!(tree.contains("UNUSED FILES (1):"));
    assert!(tree.contains("src/lib/util/stale.js  [.js, 1 lines, 24 B, confidence 100%]"));
    assert!(tree.contains("      external: lodash"));
}

#[test]
fn test_imported_files_outside_entry_trees_are_listed() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "");
    write_file(&root.join("src/lib/x/orphan.js"), "import './helper';\n");
    write_file(&root.join("src/lib/x/helper.js"), "");

    let result = Depscan::new(&root).analyze().unwrap();
    let tree = render_tree(&result, false);

    assert!(tree.contains("IMPORTED FILES NOT SHOWN ABOVE (1):"));
    assert!(tree.contains("[file] src/lib/x/helper.js"));
    assert!(!result.reachable.contains(&result.root.join("src/lib/x/helper.js")));
    assert_eq!(unused_paths(&result), vec!["src/lib/x/orphan.js"]);
}

#[test]
fn test_imported_files_count_matches_listed_files() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "");
    write_file(&root.join("src/lib/x/orphan.js"), "import './a';\n");
    write_file(&root.join("src/lib/x/a.js"), "import './b';\n");
    write_file(&root.join("src/lib/x/b.js"), "");

    let result = Depscan::new(&root).analyze().unwrap();
    let tree = render_tree(&result, false);

    // b.js is drawn under a.js, so it gets no header line of its own
    assert!(tree.contains("IMPORTED FILES NOT SHOWN ABOVE (1):"));
    assert_eq!(tree.matches("[file] ").count(), 1);
    assert!(tree.contains("[file] src/lib/x/a.js"));
    assert!(tree.contains("    └── src/lib/x/b.js\n"));
}

#[test]
fn test_lazy_component_marks_file_used() {
    let root = setup_temp_project();
    write_file(
        &root.join("src/App.jsx"),
        "const Page = React.lazy(() => import('./pages/admin/Page'));\n",
    );
    write_file(&root.join("src/pages/admin/Page.jsx"), "");

    let result = Depscan::new(&root).analyze().unwrap();
    assert!(result.unused.is_empty());
}

#[test]
fn test_root_relative_and_index_resolution() {
    let root = setup_temp_project();
    write_file(&root.join("main.ts"), "import { w } from '/src/widgets';\n");
    write_file(&root.join("src/widgets/index.ts"), "");

    let result = Depscan::new(&root).analyze().unwrap();
    let json = export(&result);

    assert_eq!(json["files"]["main.ts"]["imports"], serde_json::json!(["src/widgets/index.ts"]));
    assert_eq!(
        json["files"]["src/widgets/index.ts"]["imported_by"],
        serde_json::json!(["main.ts"])
    );
}

#[test]
fn test_unreadable_file_is_recorded_and_skipped() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import './src/a/b/kept';\n");
    write_file(&root.join("src/a/b/kept.js"), "");
    write_file(&root.join("src/a/b/vanished.js"), "");

    let options = ScanOptions {
        extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        ignore: DEFAULT_IGNORE.iter().map(|i| i.to_string()).collect(),
        include_tests: false,
    };
    let discovery = discover_files(&root, &options);
    assert_eq!(discovery.files.len(), 3);

    // Removed between discovery and reading
    fs::remove_file(root.join("src/a/b/vanished.js")).unwrap();

    let resolver = PathResolver::new(&root, options.extensions.clone());
    let build = build_graph(&discovery.files, &resolver);

    assert_eq!(build.files.len(), 2);
    assert_eq!(build.errors.len(), 1);
    assert!(matches!(build.errors[0], DepscanError::Io { .. }));
    assert!(build.errors[0].to_string().contains("vanished.js"));
    assert!(!build.graph.contains(&root.join("src/a/b/vanished.js")));
    assert!(build.graph.has_importers(&root.join("src/a/b/kept.js")));
}

#[test]
fn test_invalid_utf8_file_still_links_its_imports() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import './src/a/b/view';\n");
    fs::create_dir_all(root.join("src/a/b")).unwrap();
    fs::write(
        root.join("src/a/b/view.js"),
        b"// r\xe9sum\xe9 widget\nimport h from './helper';\n",
    )
    .unwrap();
    write_file(&root.join("src/a/b/helper.js"), "");

    let result = Depscan::new(&root).analyze().unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.total_files(), 3);
    assert!(unused_paths(&result).is_empty());
    assert_eq!(
        result.imports_of(&result.root.join("src/a/b/view.js")),
        vec!["src/a/b/helper.js"]
    );
}

#[test]
fn test_excluded_test_file_edge_is_pruned() {
    let root = setup_temp_project();
    write_file(&root.join("src/deep/x/widget.js"), "");
    write_file(
        &root.join("src/deep/x/widget.test.js"),
        "import w from './widget';\n",
    );

    let without = Depscan::new(&root).analyze().unwrap();
    assert_eq!(unused_paths(&without), vec!["src/deep/x/widget.js"]);

    let with = Depscan::new(&root).include_tests(true).analyze().unwrap();
    assert_eq!(unused_paths(&with), vec!["src/deep/x/widget.test.js"]);
}

#[test]
fn test_custom_extension_priority() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import './src/p/q/dual';\n");
    write_file(&root.join("src/p/q/dual.js"), "");
    write_file(&root.join("src/p/q/dual.ts"), "");

    let js_first = Depscan::new(&root).analyze().unwrap();
    assert_eq!(unused_paths(&js_first), vec!["src/p/q/dual.ts"]);

    let ts_first = Depscan::new(&root).extensions(["ts", "js"]).analyze().unwrap();
    assert_eq!(unused_paths(&ts_first), vec!["src/p/q/dual.js"]);
}

#[test]
fn test_statistics_view() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "import React from 'react';\nimport 'axios';\n");
    write_file(&root.join("src/a/b/one.js"), "import React from 'react';\n");
    write_file(&root.join("src/a/b/two.js"), &lines(3));

    let result = Depscan::new(&root).analyze().unwrap();
    let stats = render_statistics(&result, 1);

    assert!(stats.contains("Total files:       3"));
    assert!(stats.contains("Total lines:       6"));
    assert!(stats.contains("Unused files:      2 (66.7%)"));
    assert!(stats.contains("Unused lines:      4"));
    assert!(stats.contains(" 1. react (2 files)"));
    assert!(!stats.contains("axios"));
    assert_eq!(
        result.external_usage(),
        vec![("react".to_string(), 2), ("axios".to_string(), 1)]
    );
}

#[test]
fn test_empty_tree_is_success() {
    let root = setup_temp_project();
    write_file(&root.join("README.md"), "# nothing to see");

    let result = Depscan::new(&root).analyze().unwrap();
    let json = export(&result);

    assert_eq!(result.total_files(), 0);
    assert_eq!(result.unused_percentage(), 0.0);
    assert_eq!(json["summary"]["total_files"], 0);
    assert!(render_statistics(&result, DEFAULT_TOP_N).contains("Unused files:      0 (0.0%)"));
}

#[test]
fn test_missing_root_fails() {
    let root = setup_temp_project().join("nope");
    assert!(Depscan::new(&root).analyze().is_err());
}

#[test]
fn test_ignore_rules_apply() {
    let root = setup_temp_project();
    write_file(&root.join("main.js"), "");
    write_file(&root.join("node_modules/pkg/index.js"), "");
    write_file(&root.join("src/generated/api/client.js"), "");
    write_file(&root.join("src/ui/x/buildMenu.js"), "");

    let result = Depscan::new(&root).ignore(["generated"]).analyze().unwrap();
    assert_eq!(result.total_files(), 1);
}

#[test]
fn test_config_loading_and_application() {
    let root = setup_temp_project();
    write_file(
        &root.join("depscan.toml"),
        r#"
extensions = [".ts"]
ignore = ["fixtures"]
include_tests = true

[output]
format = "both"
top = 5
"#,
    );
    write_file(&root.join("main.ts"), "");
    write_file(&root.join("main.js"), "");
    write_file(&root.join("src/fixtures/f.ts"), "");
    write_file(&root.join("src/x/y/a.spec.ts"), "");

    let cfg = load_config(&root).unwrap().unwrap();
    assert_eq!(cfg.output_format().unwrap(), Some(OutputFormat::Both));
    assert_eq!(cfg.top(), Some(5));

    let result = Depscan::new(&root).with_config(&cfg).analyze().unwrap();
    let rels: Vec<&str> = result.files.values().map(|f| f.relative.as_str()).collect();
    assert_eq!(rels, vec!["main.ts", "src/x/y/a.spec.ts"]);
}

#[test]
fn test_config_not_found() {
    let root = setup_temp_project();
    assert!(load_config(&root).unwrap().is_none());
}

#[test]
fn test_logging_does_not_panic() {
    init_structured_logging();
    init_structured_logging();
    log_info("test info");
    log_warn("test warn");
    log_error("test error");
    log_event("CUSTOM", "custom detail");
}

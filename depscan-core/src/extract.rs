//! Module reference extraction from source text.
//!
//! Extraction is pattern based, not a parser. Each recognized form is matched
//! independently and the results are unioned:
//!
//! - `import x from './a'` (including multi-line and `import type`)
//! - `import('./a')`
//! - `require('./a')`
//! - `import './a'`
//! - `lazy(() => import('./a'))` and `defineAsyncComponent(() => import('./a'))`
//!
//! Not recognized: template literal specifiers, computed or conditional
//! `require` arguments, and `export ... from` re-exports.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// References found in one file, before resolution.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct References {
    /// Specifiers starting with `.` or `/`
    pub internal: BTreeSet<String>,
    /// Canonical package names
    pub external: BTreeSet<String>,
}

/// Pre-compiled patterns, each capturing the specifier in group 1.
struct Patterns {
    static_import: Regex,
    dynamic_import: Regex,
    require: Regex,
    side_effect: Regex,
    lazy_component: Regex,
}

impl Patterns {
    fn all(&self) -> [&Regex; 5] {
        [
            &self.static_import,
            &self.dynamic_import,
            &self.require,
            &self.side_effect,
            &self.lazy_component,
        ]
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    // SAFETY: These regex patterns are hardcoded and covered by the tests below.
    PATTERNS.get_or_init(|| Patterns {
        static_import: Regex::new(r#"\bimport\s+[^'";]*?\s*from\s*['"]([^'"]+)['"]"#)
            .expect("Hardcoded regex pattern is valid"),
        dynamic_import: Regex::new(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
            .expect("Hardcoded regex pattern is valid"),
        require: Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
            .expect("Hardcoded regex pattern is valid"),
        side_effect: Regex::new(r#"\bimport\s+['"]([^'"]+)['"]"#)
            .expect("Hardcoded regex pattern is valid"),
        lazy_component: Regex::new(
            r#"\b(?:lazy|defineAsyncComponent)\s*\(\s*(?:async\s*)?\(\s*\)\s*=>\s*\{?\s*(?:return\s+)?import\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        )
        .expect("Hardcoded regex pattern is valid"),
    })
}

/// A reference is external unless it starts with `.` or `/`.
#[inline]
pub fn is_external(spec: &str) -> bool {
    !spec.starts_with('.') && !spec.starts_with('/')
}

/// Canonical package name for an external specifier.
///
/// - `@scope/pkg/sub/path` → `@scope/pkg`
/// - `pkg/sub/path` → `pkg`
pub fn package_name(spec: &str) -> String {
    let mut segments = spec.split('/');
    let first = segments.next().unwrap_or_default();
    if first.starts_with('@') {
        match segments.next() {
            Some(pkg) => format!("{}/{}", first, pkg),
            None => first.to_string(),
        }
    } else {
        first.to_string()
    }
}

/// Extracts all module references from one file's text.
pub fn extract_references(content: &str) -> References {
    let mut refs = References::default();

    for pattern in patterns().all() {
        for caps in pattern.captures_iter(content) {
            let Some(spec) = caps.get(1).map(|m| m.as_str().trim()) else {
                continue;
            };
            if spec.is_empty() {
                continue;
            }
            if is_external(spec) {
                refs.external.insert(package_name(spec));
            } else {
                refs.internal.insert(spec.to_string());
            }
        }
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(content: &str) -> Vec<String> {
        extract_references(content).internal.into_iter().collect()
    }

    fn external(content: &str) -> Vec<String> {
        extract_references(content).external.into_iter().collect()
    }

    #[test]
    fn test_static_import_forms() {
        let src = r#"
import React from 'react';
import { a, b } from "./utils";
import * as api from './api/client'
import type { Props } from '../types'
import Default, { named } from './mixed';
"#;
        assert_eq!(
            internal(src),
            vec!["../types", "./api/client", "./mixed", "./utils"]
        );
        assert_eq!(external(src), vec!["react"]);
    }

    #[test]
    fn test_multiline_static_import() {
        let src = "import {\n  one,\n  two,\n} from './multi';\n";
        assert_eq!(internal(src), vec!["./multi"]);
    }

    #[test]
    fn test_dynamic_import_and_require() {
        let src = r#"
const mod = await import('./lazy/thing');
const fs = require('fs');
const helper = require( "./helper" );
"#;
        assert_eq!(internal(src), vec!["./helper", "./lazy/thing"]);
        assert_eq!(external(src), vec!["fs"]);
    }

    #[test]
    fn test_side_effect_import() {
        let src = "import './styles.css';\nimport 'core-js/stable';\n";
        assert_eq!(internal(src), vec!["./styles.css"]);
        assert_eq!(external(src), vec!["core-js"]);
    }

    #[test]
    fn test_lazy_component_forms() {
        let src = r#"
const Page = React.lazy(() => import('./pages/Page'));
const Modal = defineAsyncComponent(() => import("./Modal.vue"));
const Other = lazy(async () => { return import('./Other') });
"#;
        assert_eq!(internal(src), vec!["./Modal.vue", "./Other", "./pages/Page"]);
    }

    #[test]
    fn test_absolute_reference_is_internal() {
        assert_eq!(internal("import x from '/src/x'"), vec!["/src/x"]);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let src = "import a from './a';\nconst b = require('./a');\nimport('./a');";
        assert_eq!(internal(src), vec!["./a"]);
    }

    #[test]
    fn test_scoped_and_deep_package_names() {
        assert_eq!(package_name("@scope/pkg/sub/path"), "@scope/pkg");
        assert_eq!(package_name("pkg/sub/path"), "pkg");
        assert_eq!(package_name("left-pad"), "left-pad");
        assert_eq!(package_name("@scope"), "@scope");

        let src = "import { x } from '@vue/reactivity/dist/x';\nimport 'lodash/fp';";
        assert_eq!(external(src), vec!["@vue/reactivity", "lodash"]);
    }

    #[test]
    fn test_template_literal_not_recognized() {
        let src = "const m = import(`./pages/${name}`);\nrequire(path);";
        let refs = extract_references(src);
        assert!(refs.internal.is_empty());
        assert!(refs.external.is_empty());
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("react"));
        assert!(is_external("@scope/pkg"));
        assert!(!is_external("./a"));
        assert!(!is_external("../a"));
        assert!(!is_external("/abs"));
    }
}

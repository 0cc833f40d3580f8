//! Hygiene — source-level rules for the canvas crate.
//!
//! The engine runs inside the browser through wasm and inside the host
//! session on tokio, so it must never panic, never read a clock of its own,
//! and never print. Each rule has a budget (zero for all of them). A budget
//! only ever goes down.

use std::fs;
use std::path::{Path, PathBuf};

struct Rule {
    pattern: &'static str,
    budget: usize,
    what: &'static str,
}

const RULES: &[Rule] = &[
    // Panics.
    Rule { pattern: ".unwrap()", budget: 0, what: "panicking unwrap" },
    Rule { pattern: ".expect(", budget: 0, what: "panicking expect" },
    Rule { pattern: "panic!(", budget: 0, what: "explicit panic" },
    Rule { pattern: "unreachable!(", budget: 0, what: "unreachable" },
    Rule { pattern: "todo!(", budget: 0, what: "todo stub" },
    Rule { pattern: "unimplemented!(", budget: 0, what: "unimplemented stub" },
    // Swallowed errors.
    Rule { pattern: "let _ =", budget: 0, what: "discarded result" },
    Rule { pattern: ".ok()", budget: 0, what: "error turned into None" },
    // Time comes from the host as `now_ms`.
    Rule { pattern: "Instant::now", budget: 0, what: "wall clock read" },
    Rule { pattern: "SystemTime", budget: 0, what: "wall clock read" },
    Rule { pattern: "Date::now", budget: 0, what: "browser clock read" },
    // Output goes through returned actions.
    Rule { pattern: "println!(", budget: 0, what: "stdout print" },
    Rule { pattern: "eprintln!(", budget: 0, what: "stderr print" },
    Rule { pattern: "#[allow(dead_code)]", budget: 0, what: "dead code allowance" },
];

struct SourceFile {
    path: PathBuf,
    content: String,
}

/// Production `.rs` files under `canvas/src/`. `_test.rs` files are skipped.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let is_source = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.file_name().is_some_and(|n| n.to_string_lossy().ends_with("_test.rs"));
        if !is_source || is_test {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path, content });
        }
    }
}

/// `(file, line number, line)` for every line containing `pattern`.
fn hits<'a>(files: &'a [SourceFile], pattern: &str) -> Vec<(&'a Path, usize, &'a str)> {
    files
        .iter()
        .flat_map(|file| {
            file.content
                .lines()
                .enumerate()
                .filter(move |(_, line)| line.contains(pattern))
                .map(move |(n, line)| (file.path.as_path(), n + 1, line.trim()))
        })
        .collect()
}

#[test]
fn source_tree_is_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "run from the canvas crate root");
}

#[test]
fn rules_stay_within_budget() {
    let files = source_files();
    let mut report = Vec::new();
    for rule in RULES {
        let found = hits(&files, rule.pattern);
        if found.len() > rule.budget {
            report.push(format!("{} `{}`: found {}, max {}", rule.what, rule.pattern, found.len(), rule.budget));
            for (path, line, text) in found {
                report.push(format!("  {}:{line}: {text}", path.display()));
            }
        }
    }
    assert!(report.is_empty(), "hygiene budget exceeded:\n{}", report.join("\n"));
}

#[test]
fn only_the_wasm_bridge_touches_wasm_bindgen() {
    let files = source_files();
    let outside: Vec<_> = hits(&files, "wasm_bindgen")
        .into_iter()
        .filter(|(path, _, _)| !path.ends_with("wasm.rs") && !path.ends_with("lib.rs"))
        .collect();
    assert!(outside.is_empty(), "wasm_bindgen used outside the bridge: {outside:?}");
}

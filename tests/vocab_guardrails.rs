//! Keeps keyword and permit spellings out of ad hoc string comparisons.
//!
//! The parser and macro layer look words up through `gopp_core::lang` (`keywords::from_str`, `permits::from_str`).
//! A line such as `if word == "defer"` or a match arm `"deferStmt" => ...` in front-end code bypasses the registry,
//! so a renamed keyword or permit would silently stop matching. This test scans the workspace sources for those
//! shapes. It is deliberately shallow: one line at a time, code lines only.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use gopp_core::lang::{keywords, permits};

/// One offending source line.
struct Hit {
    file: PathBuf,
    line: usize,
    text: String,
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.text.trim())
    }
}

/// Every word the registries own: keyword spellings, their ideographic aliases and permit names.
fn registry_words() -> BTreeSet<&'static str> {
    let keyword_words = keywords::KEYWORDS
        .iter()
        .flat_map(|k| std::iter::once(k.canonical).chain(k.aliases.iter().copied()));
    let permit_words = permits::PERMITS.iter().map(|p| p.name);
    keyword_words.chain(permit_words).collect()
}

/// Source files that may spell registry words literally, relative to the workspace root.
fn exempt(rel: &str) -> bool {
    let registry = rel.starts_with("crates/gopp_core/src/lang/");
    let reference_generator = rel == "crates/gopp_core/src/bin/generate_lang_reference.rs";
    let test_code = rel.starts_with("tests/") || rel.contains("/tests/") || rel.ends_with("/tests.rs");
    registry || reference_generator || test_code
}

/// Comparison shapes that spell `word` directly.
fn comparison_shapes(word: &str) -> [String; 3] {
    [format!("== \"{word}\""), format!("!= \"{word}\""), format!("\"{word}\" =>")]
}

fn rust_sources(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            rust_sources(&path, found);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            found.push(path);
        }
    }
}

fn hits_in(rel: &Path, contents: &str, shapes: &[String]) -> Vec<Hit> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .filter(|(_, line)| shapes.iter().any(|shape| line.contains(shape.as_str())))
        .map(|(index, line)| Hit {
            file: rel.to_path_buf(),
            line: index + 1,
            text: line.to_string(),
        })
        .collect()
}

#[test]
fn front_end_compares_vocabulary_through_registries() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let shapes: Vec<String> = registry_words().into_iter().flat_map(comparison_shapes).collect();

    let mut files = Vec::new();
    for dir in ["src", "crates"] {
        rust_sources(&root.join(dir), &mut files);
    }
    assert!(!files.is_empty(), "no Rust sources found under {}", root.display());

    let mut hits = Vec::new();
    for file in files {
        let rel = file.strip_prefix(&root).unwrap_or(&file).to_path_buf();
        if exempt(&rel.to_string_lossy()) {
            continue;
        }
        if let Ok(contents) = fs::read_to_string(&file) {
            hits.extend(hits_in(&rel, &contents, &shapes));
        }
    }

    let listing: Vec<String> = hits.iter().take(80).map(Hit::to_string).collect();
    assert!(
        hits.is_empty(),
        "{} line(s) compare registry words as strings; look them up through gopp_core::lang instead:\n{}",
        hits.len(),
        listing.join("\n")
    );
}

#[test]
fn comparison_shapes_catch_equality_and_match_arms() {
    let shapes = comparison_shapes("deferStmt");
    let rel = Path::new("crates/gopp_syntax/src/x.rs");
    let source = "if name == \"deferStmt\" {}\n// name == \"deferStmt\"\nmatch s { \"deferStmt\" => 1 }\n";
    let lines: Vec<usize> = hits_in(rel, source, &shapes).iter().map(|h| h.line).collect();
    assert_eq!(lines, [1, 3]);
    assert!(registry_words().contains("函"));
    assert!(exempt("crates/gopp_syntax/src/parser/tests.rs"));
    assert!(!exempt("crates/gopp_syntax/src/parser/expr.rs"));
}

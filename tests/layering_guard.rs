//! Layering guardrails for the workspace crates.
//!
//! - `gopp_core` holds vocabulary only and must not depend on the front end.
//! - `gopp_syntax` is a library: CLI parsing and subscriber setup belong to the `gopp` binary crate.
//!
//! Each test scans a crate's `Cargo.toml` `[dependencies]` table.

/// Dependency names listed in the `[dependencies]` table of `manifest`.
fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn vocabulary_crate_does_not_depend_on_front_end() {
    let deps = dependencies(include_str!("../crates/gopp_core/Cargo.toml"));
    assert!(
        !deps.iter().any(|d| d == "gopp_syntax" || d == "gopp"),
        "`gopp_core` must stay below the front end, found: {deps:?}"
    );
}

#[test]
fn front_end_does_not_depend_on_cli_stack() {
    let deps = dependencies(include_str!("../crates/gopp_syntax/Cargo.toml"));
    for forbidden in ["clap", "tracing-subscriber", "gopp"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "`{forbidden}` must not appear in gopp_syntax [dependencies]"
        );
    }
    assert!(deps.iter().any(|d| d == "gopp_core"));
}

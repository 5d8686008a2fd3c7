//! Generate Markdown reference docs from `gopp_core::lang` registries.
//!
//! This binary renders the vocabulary registries (keywords, operators, punctuation, permits, libraries) into a
//! human-readable Markdown page at `docs/language/reference/language.md`.
//!
//! ## Notes
//! - The generated file is meant to be checked into the repo and treated as a derived artifact.
//! - Do not edit the generated Markdown by hand; update the registries instead.
//!
//! ## Examples
//! Run from the workspace root:
//! ```bash
//! cargo run -p gopp_core --bin generate_lang_reference
//! ```
//!
//! ## Panics
//! - If the workspace root cannot be resolved.
//! - If output files cannot be written.

use std::fs;
use std::path::{Path, PathBuf};

use gopp_core::lang::permits::Dialect;
use gopp_core::lang::{keywords, libraries, operators, permits, punctuation};

fn start_section(out: &mut String, heading: &str) {
    while out.ends_with("\n\n\n") {
        out.pop();
    }
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
    out.push_str(heading);
    out.push_str("\n\n");
}

fn code_list(items: &[&str]) -> String {
    items.iter().map(|a| format!("`{a}`")).collect::<Vec<_>>().join(", ")
}

fn main() {
    let root = workspace_root();

    let out_dir = root.join("docs/language/reference");
    fs::create_dir_all(&out_dir).expect("create docs/language/reference/");

    write_language_reference(&out_dir.join("language.md"));
}

/// Write `docs/language/reference/language.md`.
fn write_language_reference(path: &Path) {
    let mut out = String::new();
    out.push_str("# gopp language reference\n\n");
    out.push_str("> Generated file. Regenerate with `cargo run -p gopp_core --bin generate_lang_reference`.\n\n");

    out.push_str("## Contents\n\n");
    out.push_str("- [Keywords](#keywords)\n");
    out.push_str("- [Macro ideographs](#macro-ideographs)\n");
    out.push_str("- [Operators](#operators)\n");
    out.push_str("- [Punctuation](#punctuation)\n");
    out.push_str("- [Permits](#permits)\n");
    out.push_str("- [Libraries](#libraries)\n\n");

    render_keywords_section(&mut out);
    render_operators_section(&mut out);
    render_punctuation_section(&mut out);
    render_permits_section(&mut out);
    render_libraries_section(&mut out);

    while out.ends_with("\n\n") {
        out.pop();
    }
    fs::write(path, out).expect("write language.md");
}

fn render_keywords_section(out: &mut String) {
    start_section(out, "## Keywords");
    out.push_str("| Id | Canonical | Aliases | Category | Ends statement |\n");
    out.push_str("|----|---|---|---|---|\n");
    for k in keywords::KEYWORDS {
        out.push_str(&format!(
            "| {:?} | `{}` | {} | {:?} | {} |\n",
            k.id,
            k.canonical,
            code_list(k.aliases),
            k.category,
            if k.ends_statement { "yes" } else { "" }
        ));
    }

    start_section(out, "## Macro ideographs");
    out.push_str("| Ideograph | Macro |\n");
    out.push_str("|---|---|\n");
    for (c, name) in keywords::MACRO_IDEOGRAPHS {
        out.push_str(&format!("| `{c}` | `{name}` |\n"));
    }
}

fn render_operators_section(out: &mut String) {
    start_section(out, "## Operators");
    out.push_str("| Id | Spelling | Kind | Precedence | Dynamic | Dynamic (unary) |\n");
    out.push_str("|----|---|---|---|---|---|\n");
    for o in operators::OPERATORS {
        let precedence = if o.precedence == 0 {
            String::new()
        } else {
            o.precedence.to_string()
        };
        out.push_str(&format!(
            "| {:?} | `{}` | {:?} | {} | {} | {} |\n",
            o.id,
            o.spelling,
            o.kind,
            precedence,
            o.dynamic.unwrap_or(""),
            o.dynamic_unary.unwrap_or("")
        ));
    }
}

fn render_punctuation_section(out: &mut String) {
    start_section(out, "## Punctuation");
    out.push_str("| Id | Canonical | Category | Origin |\n");
    out.push_str("|----|---|---|---|\n");
    for p in punctuation::PUNCTUATION {
        out.push_str(&format!("| {:?} | `{}` | {:?} | {:?} |\n", p.id, p.canonical, p.category, p.origin));
    }
}

fn render_permits_section(out: &mut String) {
    start_section(out, "## Permits");
    for dialect in Dialect::ALL {
        out.push_str(&format!("\n### Layer `{dialect}`\n\n"));
        out.push_str("| Permit | Gates |\n");
        out.push_str("|---|---|\n");
        for p in permits::PERMITS.iter().filter(|p| p.layer == dialect) {
            out.push_str(&format!("| `{}` | {} |\n", p.name, p.description));
        }
    }
}

fn render_libraries_section(out: &mut String) {
    start_section(out, "## Libraries");
    out.push_str("| Id | Alias | Path |\n");
    out.push_str("|----|---|---|\n");
    for l in libraries::LIBRARIES {
        out.push_str(&format!("| {:?} | `{}` | `{}` |\n", l.id, l.alias, l.path));
    }
    out.push_str("\n| Command macro | Method |\n");
    out.push_str("|---|---|\n");
    for (name, method) in libraries::COMMAND_MACROS {
        out.push_str(&format!("| `{name}` | `system.{method}` |\n"));
    }
}

/// Resolve the workspace root directory.
///
/// ## Panics
/// - If the path cannot be resolved (this indicates a broken workspace layout).
fn workspace_root() -> PathBuf {
    // crates/gopp_core -> crates -> workspace root
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .expect("workspace root (two levels above crates/gopp_core)")
}

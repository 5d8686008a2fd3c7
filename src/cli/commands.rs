//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use gopp_syntax::source::SourceMap;
use gopp_syntax::{Diagnostic, Parsed, lexer, parse_file};

use super::{CliError, CliResult, ExitCode, ParseArgs};

/// Maximum source file size (10 MB) to prevent memory exhaustion
const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

// ============================================================================
// Shared helpers
// ============================================================================

/// Read a source file, rejecting oversized inputs.
pub fn read_source(file_path: &Path) -> CliResult<String> {
    let name = file_path.display();
    let metadata =
        fs::metadata(file_path).map_err(|e| CliError::failure(format!("Cannot access file '{name}': {e}")))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{name}' is too large ({} bytes, max {MAX_SOURCE_SIZE} bytes)",
            metadata.len(),
        )));
    }

    let bytes = fs::read(file_path).map_err(|e| CliError::failure(format!("Error reading file '{name}': {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render a diagnostic, with labeled source when it points into `source`.
pub fn render_diagnostic(diag: &Diagnostic, file_name: &str, source: &str) -> String {
    if diag.position.file == file_name && diag.position.is_valid() {
        format!("{:?}", diag.to_report(source))
    } else {
        diag.to_string()
    }
}

/// Parse `file` with the CLI flags.
///
/// With `--keep-going` every diagnostic is collected; otherwise the first one ends the parse. Either way the
/// rendered diagnostics come back as the error.
fn parse_with(file: &Path, args: &ParseArgs) -> CliResult<Parsed> {
    let source = read_source(file)?;
    let name = file.display().to_string();

    let seen: Rc<RefCell<Vec<Diagnostic>>> = Rc::new(RefCell::new(Vec::new()));
    let mut options = args.to_options();
    if args.keep_going {
        let sink = Rc::clone(&seen);
        options = options.with_error_handler(move |d| sink.borrow_mut().push(d.clone()));
    }

    let result = parse_file(file, options);
    let mut diags = seen.take();
    let parsed = match result {
        Ok(parsed) => parsed,
        Err(first) => {
            diags.push(first);
            Parsed {
                files: Default::default(),
                first_error: None,
            }
        }
    };

    if diags.is_empty() {
        return Ok(parsed);
    }
    tracing::debug!(count = diags.len(), "parse reported diagnostics");
    let rendered: Vec<String> = diags.iter().map(|d| render_diagnostic(d, &name, &source)).collect();
    let summary = match diags.len() {
        1 => "1 error".to_string(),
        n => format!("{n} errors"),
    };
    Err(CliError::failure(format!("{}\n{summary}", rendered.join("\n"))))
}

// ============================================================================
// Commands
// ============================================================================

/// Parse a file and list its output files.
pub fn check_file(file: &Path, args: &ParseArgs) -> CliResult<ExitCode> {
    let parsed = parse_with(file, args)?;
    for (key, out) in &parsed.files {
        let mut notes = Vec::new();
        if out.has_entry {
            notes.push("entry");
        }
        if out.excluded {
            notes.push("excluded");
        }
        if notes.is_empty() {
            println!("{key}");
        } else {
            println!("{key} ({})", notes.join(", "));
        }
    }
    println!("✓ {} file(s)", parsed.files.len());
    Ok(ExitCode::SUCCESS)
}

/// Print the token stream, one token per line with its position.
pub fn tokens_file(file: &Path) -> CliResult<ExitCode> {
    let source = read_source(file)?;
    let name = file.display().to_string();
    let map = SourceMap::new(name.clone(), &source);
    let lexed = lexer::lex(&source);

    for token in &lexed.tokens {
        let position = map.position(token.span.start);
        let marker = if token.ideograph { " (ideograph)" } else { "" };
        println!("{}:{}\t{:?}{marker}", position.line, position.column, token.kind);
    }

    if lexed.errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    let rendered: Vec<String> = lexed
        .errors
        .iter()
        .map(|e| render_diagnostic(&e.clone().at(map.position(e.span.start)), &name, &source))
        .collect();
    Err(CliError::failure(rendered.join("\n")))
}

/// Parse a file and print every output file's tree.
pub fn ast_file(file: &Path, args: &ParseArgs) -> CliResult<ExitCode> {
    let parsed = parse_with(file, args)?;
    for (key, out) in &parsed.files {
        println!("// {key}");
        println!("{out:#?}");
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gopp_syntax::ast::Span;
    use gopp_syntax::source::Position;

    #[test]
    fn read_source_reports_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.gopp")).unwrap_err();
        assert!(err.message.starts_with("Cannot access file"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn diagnostics_from_other_inputs_render_plainly() {
        let diag = Diagnostic::syntax("oops", Span::new(0, 1)).at(Position::new("lib.gopp", 2, 3));
        assert_eq!(render_diagnostic(&diag, "main.gopp", "x"), "lib.gopp:2:3: oops");
    }
}

//! CLI module for the gopp front end
//!
//! A thin inspection tool over the front-end entry points.
//!
//! ## Commands
//!
//! - `check <file>` - Parse a file and list the output files it produces
//! - `tokens <file>` - Print the token stream
//! - `ast <file>` - Print the finalized syntax trees
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use gopp_core::lang::permits::Dialect;
use gopp_syntax::{Mode, ParseOptions};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Front end for gopp, an extended dialect of Go
#[derive(Parser, Debug)]
#[command(name = "gopp")]
#[command(version = VERSION)]
#[command(about = "Parse gopp sources into Go syntax trees", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a file and list the output files it produces
    Check {
        /// Source file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        options: ParseArgs,
    },

    /// Print the token stream of a file
    Tokens {
        /// Source file to scan
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the finalized syntax trees of a file
    Ast {
        /// Source file to parse
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        options: ParseArgs,
    },
}

/// Flags mapped onto [`ParseOptions`].
#[derive(Args, Debug, Clone, Default)]
pub struct ParseArgs {
    /// Grammar profile (minimal, go, extended, experimental); defaults to the file extension's
    #[arg(long, value_name = "DIALECT", value_parser = parse_dialect)]
    pub dialect: Option<Dialect>,

    /// Output root used when the input has no `project` header
    #[arg(long, value_name = "DIR", default_value = "")]
    pub root: String,

    /// Check labels and branch statements in every function body
    #[arg(long = "check-branches")]
    pub check_branches: bool,

    /// Report every error instead of stopping at the first
    #[arg(long = "keep-going")]
    pub keep_going: bool,
}

impl ParseArgs {
    /// Parse options for these flags. The error handler, if any, is installed by the command.
    pub fn to_options(&self) -> ParseOptions {
        let mut options = ParseOptions::default().with_root(self.root.clone());
        if let Some(dialect) = self.dialect {
            options = options.with_dialect(dialect);
        }
        if self.check_branches {
            options = options.with_mode(Mode::CHECK_BRANCHES);
        }
        options
    }
}

fn parse_dialect(name: &str) -> Result<Dialect, String> {
    Dialect::from_name(name).ok_or_else(|| {
        let known: Vec<_> = Dialect::ALL.iter().map(|d| d.as_str()).collect();
        format!("unknown dialect '{name}' (expected one of: {})", known.join(", "))
    })
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Check { file, options } => commands::check_file(&file, &options),
        Command::Tokens { file } => commands::tokens_file(&file),
        Command::Ast { file, options } => commands::ast_file(&file, &options),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["gopp", "check", "main.gopp"]).unwrap();
        let Command::Check { file, options } = cli.command else {
            panic!("Expected Check command");
        };
        assert_eq!(file, PathBuf::from("main.gopp"));
        assert!(options.dialect.is_none());
        assert!(!options.keep_going);
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::try_parse_from([
            "gopp",
            "ast",
            "lib.go",
            "--dialect",
            "experimental",
            "--root",
            "out",
            "--check-branches",
            "--keep-going",
        ])
        .unwrap();
        let Command::Ast { options, .. } = cli.command else {
            panic!("Expected Ast command");
        };
        assert_eq!(options.dialect, Some(Dialect::Experimental));
        assert_eq!(options.root, "out");
        assert!(options.check_branches);
        assert!(options.keep_going);
        let parse = options.to_options();
        assert!(parse.mode.contains(Mode::CHECK_BRANCHES));
        assert_eq!(parse.dialect, Some(Dialect::Experimental));
    }

    #[test]
    fn test_cli_rejects_unknown_dialect() {
        let err = Cli::try_parse_from(["gopp", "check", "x.go", "--dialect", "rust"]).unwrap_err();
        assert!(err.to_string().contains("unknown dialect 'rust'"));
    }

    #[test]
    fn test_cli_parse_tokens() {
        let cli = Cli::try_parse_from(["gopp", "tokens", "x.go"]).unwrap();
        assert!(matches!(cli.command, Command::Tokens { .. }));
    }
}

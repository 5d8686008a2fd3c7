//! Front end for gopp, a superset of Go: scanner, permits, macros, parser, branch checker and project composition.
//!
//! The crate turns gopp source into Go syntax trees keyed by output path. Printing those trees, driving the Go
//! toolchain and walking directories are left to callers.
//!
//! ## Notes
//! - The accepted grammar is not fixed: a [`permits::PermitSet`] derived from the input's dialect decides which
//!   constructs parse, and `use` directives adjust it per section.
//! - Vocabulary identity (keywords/operators/punctuation/permits) comes from `gopp_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use gopp_syntax::{ParseOptions, parse_bytes};
//!
//! let parsed = parse_bytes("hello.gopp", b"println(\"hi\")\n", ParseOptions::default()).unwrap();
//! let file = &parsed.files["hello.go"];
//! assert_eq!(file.package, "main");
//! assert!(file.has_entry);
//! ```
//!
//! ## See also
//! - `gopp_core::lang` for registry-backed language vocabulary.

pub mod api;
pub mod ast;
pub mod branches;
pub mod diagnostics;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod permits;
pub mod project;
pub mod source;
pub mod token_helpers;
pub mod walk;

pub use api::{Mode, OutputMap, ParseOptions, Parsed, parse_bytes, parse_file};
pub use diagnostics::Diagnostic;

#![forbid(unsafe_code)]
//! gopp: front end for an extended dialect of Go.
//!
//! gopp adds user macros, feature-gated grammar subsets, parameterized packages and a dynamically-typed arithmetic
//! mode to Go. This crate bundles the front end with a small inspection CLI; the front end itself lives in
//! `gopp_syntax` and the vocabulary registries in `gopp_core`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a front-end bug (logic error), use `unreachable!` with a clear
//!   explanation.

pub mod cli;

pub use gopp_syntax::{ast, branches, diagnostics, lexer, macros, parser, permits, project, source, walk};
pub use gopp_syntax::{Diagnostic, Mode, OutputMap, ParseOptions, Parsed, parse_bytes, parse_file};

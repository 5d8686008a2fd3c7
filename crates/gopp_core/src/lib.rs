//! Provide the canonical language vocabulary for the gopp front end.
//!
//! This crate is intentionally small and dependency-light. It holds the registries that both the scanner/parser and
//! tooling (CLI, docs generator) consult:
//! - reserved keywords, including single-codepoint ideographic aliases,
//! - operators with precedence and dynamic-mode method names,
//! - punctuation,
//! - grammar permits and the dialect profiles that enable them,
//! - import paths of the collaborator libraries that macros rewrite into.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global mutable state, and no AST types.

pub mod lang;

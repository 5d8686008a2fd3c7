//! gopp language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators, punctuation,
//! grammar permits and collaborator libraries.
//!
//! The design goal is to avoid stringly-typed checks scattered across the front end. Instead, callers work with
//! **stable IDs** (e.g. `KeywordId`, `OperatorId`, `PermitId`) and look up spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The scanner/parser enforce syntax; registries provide spellings and metadata for shared use (diagnostics, docs,
//!   profile activation).
//!
//! ## Examples
//! ```rust
//! use gopp_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("func"), Some(KeywordId::Func));
//! assert_eq!(keywords::as_str(KeywordId::Func), "func");
//! ```
//!
//! ## See also
//! - `cargo run -p gopp_core --bin generate_lang_reference` to generate Markdown reference tables.

pub mod keywords;
pub mod libraries;
pub mod operators;
pub mod permits;
pub mod punctuation;
pub mod registry;

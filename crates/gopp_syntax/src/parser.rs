//! Parser for gopp source.
//!
//! A stateful recursive-descent parser whose grammar is reconfigured per input by a [`PermitSet`] and extended by the
//! [`MacroRegistry`]. One parser handles one input; `include` directives start nested parsers over the same session.
//!
//! ## Examples
//!
//! ```rust
//! use gopp_syntax::ast::Expr;
//! use gopp_syntax::api::ParseOptions;
//! use gopp_syntax::parser;
//!
//! let expr = parser::parse_expression("a + b*c", ParseOptions::default()).unwrap();
//! assert!(matches!(expr.node, Expr::Binary { .. }));
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use gopp_core::lang::keywords::KeywordId;
use gopp_core::lang::libraries::{self, LibraryId};
use gopp_core::lang::operators::{self, OperatorId};
use gopp_core::lang::permits::{self, Dialect, PermitId};
use gopp_core::lang::punctuation::PunctuationId;

use crate::api::{Mode, ParseOptions, Session};
use crate::ast::*;
use crate::branches;
use crate::diagnostics::Diagnostic;
use crate::lexer::{self, Lit, Token, TokenKind};
use crate::macros::{ExprMacro, MacroRegistry, StmtMacro, UseDirective, UseMacro, builtins};
use crate::permits::PermitSet;
use crate::source::{Position, SourceMap};
use crate::walk;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/structure.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/dynamic.rs");
include!("parser/context.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");

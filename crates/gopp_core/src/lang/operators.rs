//! Operator vocabulary.
//!
//! This module defines the canonical operator set along with the metadata the parser needs: binary precedence,
//! fixity, the base operator of compound assignments, and the runtime-library method each operator maps to in
//! dynamic mode.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Precedence follows the base language: `||` = 1, `&&` = 2, comparisons = 3, additive = 4, multiplicative = 5.
//!   Operators that never appear in binary position have precedence 0.
//!
//! ## Examples
//! ```rust
//! use gopp_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("+"), Some(OperatorId::Add));
//! assert_eq!(operators::info_for(OperatorId::Add).precedence, 4);
//! assert_eq!(operators::dynamic_method(OperatorId::Add), Some("Plus"));
//! ```

/// How an operator may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Infix only (`==`, `/`, ...).
    Binary,
    /// Prefix only (`!`).
    Unary,
    /// Both infix and prefix (`-`, `*`, `&`, `^`, `+`).
    BinaryOrUnary,
    /// Receive (prefix) and send (statement-level infix): `<-`.
    Arrow,
    /// Plain or compound assignment (`=`, `:=`, `+=`, ...).
    Assign,
    /// Statement-level increment/decrement.
    IncDec,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Logical
    LogicalOr,
    LogicalAnd,
    Not,

    // Comparison
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,

    // Additive
    Add,
    Sub,
    Or,
    Xor,

    // Multiplicative
    Mul,
    Quo,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,

    // Channels
    Arrow,

    // Assignment
    Assign,
    Define,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,

    // Increment / decrement
    Inc,
    Dec,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `dynamic` is the method called on the dynamic block for the binary form, `dynamic_unary` for the prefix form.
/// - `assign_base` links a compound assignment (`+=`) to its binary operator (`+`).
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub precedence: u8,
    pub kind: OperatorKind,
    pub dynamic: Option<&'static str>,
    pub dynamic_unary: Option<&'static str>,
    pub assign_base: Option<OperatorId>,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Logical
    bin(OperatorId::LogicalOr, "||", 1, Some("Or")),
    bin(OperatorId::LogicalAnd, "&&", 2, Some("And")),
    OperatorInfo {
        id: OperatorId::Not,
        spelling: "!",
        precedence: 0,
        kind: OperatorKind::Unary,
        dynamic: None,
        dynamic_unary: Some("Not"),
        assign_base: None,
    },
    // Comparison
    bin(OperatorId::Eql, "==", 3, Some("IsEqual")),
    bin(OperatorId::Neq, "!=", 3, Some("IsNotEqual")),
    bin(OperatorId::Lss, "<", 3, Some("IsLess")),
    bin(OperatorId::Leq, "<=", 3, Some("IsLessOrEqual")),
    bin(OperatorId::Gtr, ">", 3, Some("IsGreater")),
    bin(OperatorId::Geq, ">=", 3, Some("IsGreaterOrEqual")),
    // Additive
    both(OperatorId::Add, "+", 4, Some("Plus"), None),
    both(OperatorId::Sub, "-", 4, Some("Minus"), Some("Negate")),
    bin(OperatorId::Or, "|", 4, Some("BitOr")),
    both(OperatorId::Xor, "^", 4, Some("BitXor"), Some("BitNot")),
    // Multiplicative
    both(OperatorId::Mul, "*", 5, Some("Times"), None),
    bin(OperatorId::Quo, "/", 5, Some("Divide")),
    bin(OperatorId::Rem, "%", 5, Some("Modulo")),
    bin(OperatorId::Shl, "<<", 5, Some("ShiftLeft")),
    bin(OperatorId::Shr, ">>", 5, Some("ShiftRight")),
    both(OperatorId::And, "&", 5, Some("BitAnd"), None),
    bin(OperatorId::AndNot, "&^", 5, Some("BitClear")),
    // Channels
    OperatorInfo {
        id: OperatorId::Arrow,
        spelling: "<-",
        precedence: 0,
        kind: OperatorKind::Arrow,
        dynamic: None,
        dynamic_unary: None,
        assign_base: None,
    },
    // Assignment
    assign(OperatorId::Assign, "=", None),
    assign(OperatorId::Define, ":=", None),
    assign(OperatorId::AddAssign, "+=", Some(OperatorId::Add)),
    assign(OperatorId::SubAssign, "-=", Some(OperatorId::Sub)),
    assign(OperatorId::MulAssign, "*=", Some(OperatorId::Mul)),
    assign(OperatorId::QuoAssign, "/=", Some(OperatorId::Quo)),
    assign(OperatorId::RemAssign, "%=", Some(OperatorId::Rem)),
    assign(OperatorId::AndAssign, "&=", Some(OperatorId::And)),
    assign(OperatorId::OrAssign, "|=", Some(OperatorId::Or)),
    assign(OperatorId::XorAssign, "^=", Some(OperatorId::Xor)),
    assign(OperatorId::ShlAssign, "<<=", Some(OperatorId::Shl)),
    assign(OperatorId::ShrAssign, ">>=", Some(OperatorId::Shr)),
    assign(OperatorId::AndNotAssign, "&^=", Some(OperatorId::AndNot)),
    // Increment / decrement
    OperatorInfo {
        id: OperatorId::Inc,
        spelling: "++",
        precedence: 0,
        kind: OperatorKind::IncDec,
        dynamic: None,
        dynamic_unary: None,
        assign_base: Some(OperatorId::Add),
    },
    OperatorInfo {
        id: OperatorId::Dec,
        spelling: "--",
        precedence: 0,
        kind: OperatorKind::IncDec,
        dynamic: None,
        dynamic_unary: None,
        assign_base: Some(OperatorId::Sub),
    },
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Canonical spelling.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

/// Binary precedence (0 when the operator is never infix).
pub fn precedence(id: OperatorId) -> u8 {
    info_for(id).precedence
}

/// Dynamic-mode method for the binary form.
pub fn dynamic_method(id: OperatorId) -> Option<&'static str> {
    info_for(id).dynamic
}

/// Dynamic-mode method for the prefix form.
pub fn dynamic_unary_method(id: OperatorId) -> Option<&'static str> {
    info_for(id).dynamic_unary
}

/// Return `true` for operators usable as an assignment (`=`, `:=`, `op=`).
pub fn is_assign(id: OperatorId) -> bool {
    info_for(id).kind == OperatorKind::Assign
}

/// Return `true` for operators usable in prefix position.
pub fn is_unary(id: OperatorId) -> bool {
    matches!(
        info_for(id).kind,
        OperatorKind::Unary | OperatorKind::BinaryOrUnary | OperatorKind::Arrow
    )
}

/// Resolve an operator spelling to its identifier.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.spelling == spelling).map(|o| o.id)
}

// --- helpers -----------------------------------------------------------------

const fn bin(id: OperatorId, spelling: &'static str, precedence: u8, dynamic: Option<&'static str>) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        kind: OperatorKind::Binary,
        dynamic,
        dynamic_unary: None,
        assign_base: None,
    }
}

const fn both(
    id: OperatorId,
    spelling: &'static str,
    precedence: u8,
    dynamic: Option<&'static str>,
    dynamic_unary: Option<&'static str>,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        kind: OperatorKind::BinaryOrUnary,
        dynamic,
        dynamic_unary,
        assign_base: None,
    }
}

const fn assign(id: OperatorId, spelling: &'static str, base: Option<OperatorId>) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence: 0,
        kind: OperatorKind::Assign,
        dynamic: None,
        dynamic_unary: None,
        assign_base: base,
    }
}

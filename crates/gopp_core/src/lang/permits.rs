//! Grammar permits and dialect profiles.
//!
//! A *permit* is a named boolean feature flag that gates one grammar construct. Permits are grouped into ordered
//! *layers* (dialects). Activating a dialect enables its own layer and every layer below it:
//!
//! ```text
//! experimental → extended → go → minimal
//! ```
//!
//! ## Notes
//! - Names are canonical camelCase spellings; they appear in diagnostics (`"goto is not permitted"`) and in
//!   `use "blacklist" (...)` / `use "whitelist" (...)` directives.
//! - The minimal layer enables exactly what a valid empty program needs.
//!
//! ## Examples
//! ```rust
//! use gopp_core::lang::permits::{self, Dialect, PermitId};
//!
//! assert_eq!(permits::from_str("goto"), Some(PermitId::Goto));
//! assert_eq!(Dialect::from_extension("main.gopp"), Dialect::Extended);
//! assert!(permits::enabled_by(Dialect::Extended).any(|p| p == PermitId::Goto));
//! assert!(!permits::enabled_by(Dialect::Go).any(|p| p == PermitId::Macros));
//! ```

use super::registry::Origin;

/// Ordered permit layers.
///
/// `Ord` follows the layer order: a dialect includes every dialect that compares less than it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialect {
    Minimal,
    Go,
    Extended,
    Experimental,
}

impl Dialect {
    /// All dialects from the lowest layer up.
    pub const ALL: [Dialect; 4] = [Dialect::Minimal, Dialect::Go, Dialect::Extended, Dialect::Experimental];

    /// Pick the dialect for an input name.
    ///
    /// `.go` selects [`Dialect::Go`], `.gopp` [`Dialect::Extended`], `.goppx` [`Dialect::Experimental`]; anything
    /// else defaults to [`Dialect::Extended`].
    pub fn from_extension(name: &str) -> Dialect {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "go" => Dialect::Go,
            "goppx" => Dialect::Experimental,
            _ => Dialect::Extended,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Minimal => "minimal",
            Dialect::Go => "go",
            Dialect::Extended => "extended",
            Dialect::Experimental => "experimental",
        }
    }

    pub fn from_name(name: &str) -> Option<Dialect> {
        Dialect::ALL.into_iter().find(|d| d.as_str() == name)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier for every permit.
///
/// The discriminant doubles as the bit index used by permit sets, so the enum must stay below 64 variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PermitId {
    // minimal
    PackageClause,
    FuncDecls,

    // go
    Imports,
    ConstDecls,
    VarDecls,
    TypeDecls,
    Methods,
    Labels,
    Goto,
    Select,
    Channels,
    GoStmt,
    DeferStmt,
    Fallthrough,
    SwitchStmt,
    TypeSwitch,
    RangeLoops,
    CompositeLiterals,
    FuncLiterals,
    StructTypes,
    InterfaceTypes,
    MapTypes,
    Pointers,
    ImaginaryLiterals,
    RuneLiterals,
    RawStrings,
    ShortVarDecl,
    IncDec,
    TypeAssertions,
    FullSlices,
    Variadics,

    // extended
    ProjectHeader,
    Sections,
    Include,
    UseDirectives,
    Macros,
    TopLevelStatements,
    HeaderlessPackages,
    InferredImports,
    Ideographs,
    AnonymousParams,

    // experimental
    Generics,
    Dynamic,
    DateLiterals,
    EscapeEscapeInStrings,
    LineDirectives,
}

impl PermitId {
    /// Bit index of this permit.
    pub const fn bit(self) -> u32 {
        self as u32
    }
}

/// Metadata for a permit.
#[derive(Debug, Clone, Copy)]
pub struct PermitInfo {
    pub id: PermitId,
    pub name: &'static str,
    pub layer: Dialect,
    pub description: &'static str,
}

impl PermitInfo {
    pub fn origin(&self) -> Origin {
        if self.layer <= Dialect::Go {
            Origin::Go
        } else {
            Origin::Gopp
        }
    }
}

/// Registry of all permits, ordered by layer.
pub const PERMITS: &[PermitInfo] = &[
    // minimal
    info(PermitId::PackageClause, "packageClause", Dialect::Minimal, "`package name` header"),
    info(PermitId::FuncDecls, "funcDecls", Dialect::Minimal, "function declarations"),
    // go
    info(PermitId::Imports, "imports", Dialect::Go, "import declarations"),
    info(PermitId::ConstDecls, "constDecls", Dialect::Go, "const declarations"),
    info(PermitId::VarDecls, "varDecls", Dialect::Go, "var declarations"),
    info(PermitId::TypeDecls, "typeDecls", Dialect::Go, "type declarations"),
    info(PermitId::Methods, "methods", Dialect::Go, "functions with a receiver"),
    info(PermitId::Labels, "labels", Dialect::Go, "labeled statements"),
    info(PermitId::Goto, "goto", Dialect::Go, "goto statements"),
    info(PermitId::Select, "select", Dialect::Go, "select statements"),
    info(PermitId::Channels, "channels", Dialect::Go, "channel types, send and receive"),
    info(PermitId::GoStmt, "goStmt", Dialect::Go, "go statements"),
    info(PermitId::DeferStmt, "deferStmt", Dialect::Go, "defer statements"),
    info(PermitId::Fallthrough, "fallthrough", Dialect::Go, "fallthrough statements"),
    info(PermitId::SwitchStmt, "switchStmt", Dialect::Go, "expression switch statements"),
    info(PermitId::TypeSwitch, "typeSwitch", Dialect::Go, "type switch statements"),
    info(PermitId::RangeLoops, "rangeLoops", Dialect::Go, "for ... range loops"),
    info(PermitId::CompositeLiterals, "compositeLiterals", Dialect::Go, "composite literals"),
    info(PermitId::FuncLiterals, "funcLiterals", Dialect::Go, "function literals"),
    info(PermitId::StructTypes, "structTypes", Dialect::Go, "struct types"),
    info(PermitId::InterfaceTypes, "interfaceTypes", Dialect::Go, "interface types"),
    info(PermitId::MapTypes, "mapTypes", Dialect::Go, "map types"),
    info(PermitId::Pointers, "pointers", Dialect::Go, "pointer types, `&x` and `*p`"),
    info(PermitId::ImaginaryLiterals, "imaginaryLiterals", Dialect::Go, "imaginary number literals"),
    info(PermitId::RuneLiterals, "runeLiterals", Dialect::Go, "rune literals"),
    info(PermitId::RawStrings, "rawStrings", Dialect::Go, "raw string literals"),
    info(PermitId::ShortVarDecl, "shortVarDecl", Dialect::Go, "`:=` declarations"),
    info(PermitId::IncDec, "incDec", Dialect::Go, "`++` and `--` statements"),
    info(PermitId::TypeAssertions, "typeAssertions", Dialect::Go, "`x.(T)` assertions"),
    info(PermitId::FullSlices, "fullSlices", Dialect::Go, "three-index slices"),
    info(PermitId::Variadics, "variadics", Dialect::Go, "variadic parameters and `f(xs...)`"),
    // extended
    info(PermitId::ProjectHeader, "projectHeader", Dialect::Extended, "`project name` header"),
    info(PermitId::Sections, "sections", Dialect::Extended, "`section`, `main` and `testcode` headers"),
    info(PermitId::Include, "include", Dialect::Extended, "`include \"path\"` directives"),
    info(PermitId::UseDirectives, "useDirectives", Dialect::Extended, "`use \"name\" (args) -> rets` directives"),
    info(PermitId::Macros, "macros", Dialect::Extended, "statement and expression macros"),
    info(PermitId::TopLevelStatements, "topLevelStatements", Dialect::Extended, "bare statements at file scope"),
    info(PermitId::HeaderlessPackages, "headerlessPackages", Dialect::Extended, "packages without a header"),
    info(PermitId::InferredImports, "inferredImports", Dialect::Extended, "`\"path\".Sel` references"),
    info(PermitId::Ideographs, "ideographs", Dialect::Extended, "single code point keyword aliases"),
    info(PermitId::AnonymousParams, "anonymousParams", Dialect::Extended, "`_` placeholders in function literals"),
    // experimental
    info(PermitId::Generics, "generics", Dialect::Experimental, "parameterized packages"),
    info(PermitId::Dynamic, "dynamic", Dialect::Experimental, "dynamic operator mode"),
    info(PermitId::DateLiterals, "dateLiterals", Dialect::Experimental, "`2024.01.15` date literals"),
    info(PermitId::EscapeEscapeInStrings, "escapeEscapeInStrings", Dialect::Experimental, "`\\e` string escape"),
    info(PermitId::LineDirectives, "lineDirectives", Dialect::Experimental, "`//line` position remapping"),
];

/// Return the full metadata entry for a permit.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PermitId) -> &'static PermitInfo {
    PERMITS.iter().find(|p| p.id == id).expect("permit info missing")
}

/// Canonical camelCase name.
pub fn as_str(id: PermitId) -> &'static str {
    info_for(id).name
}

/// Resolve a canonical name to its permit.
pub fn from_str(name: &str) -> Option<PermitId> {
    PERMITS.iter().find(|p| p.name == name).map(|p| p.id)
}

/// Permits introduced by exactly this layer.
pub fn layer(dialect: Dialect) -> impl Iterator<Item = PermitId> {
    PERMITS.iter().filter(move |p| p.layer == dialect).map(|p| p.id)
}

/// Permits enabled when `dialect` is activated: its own layer plus every lower layer.
pub fn enabled_by(dialect: Dialect) -> impl Iterator<Item = PermitId> {
    PERMITS.iter().filter(move |p| p.layer <= dialect).map(|p| p.id)
}

const fn info(id: PermitId, name: &'static str, layer: Dialect, description: &'static str) -> PermitInfo {
    PermitInfo {
        id,
        name,
        layer,
        description,
    }
}

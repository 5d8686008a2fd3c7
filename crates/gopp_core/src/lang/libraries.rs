//! Collaborator runtime libraries referenced by expanded code.
//!
//! Built-in macros and dynamic mode rewrite source into calls against small runtime libraries. This registry records
//! the default alias and import path of each library, plus the method every command macro maps to.
//!
//! ## Examples
//! ```rust
//! use gopp_core::lang::libraries::{self, LibraryId};
//!
//! assert_eq!(libraries::path(LibraryId::System), "gopp/lib/system");
//! assert_eq!(libraries::command_method("prepare"), Some("Prepare"));
//! ```

/// Stable identifier for collaborator libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryId {
    /// Process and file system helpers used by command macros.
    System,
    /// Assertion helpers used by `assert`.
    Assert,
    /// Runtime for dynamic operator mode.
    Dynamic,
}

/// Metadata for a collaborator library.
#[derive(Debug, Clone, Copy)]
pub struct LibraryInfo {
    pub id: LibraryId,
    /// Alias the inferred import binds.
    pub alias: &'static str,
    /// Import path.
    pub path: &'static str,
}

pub const LIBRARIES: &[LibraryInfo] = &[
    LibraryInfo {
        id: LibraryId::System,
        alias: "system",
        path: "gopp/lib/system",
    },
    LibraryInfo {
        id: LibraryId::Assert,
        alias: "assert",
        path: "gopp/lib/assert",
    },
    LibraryInfo {
        id: LibraryId::Dynamic,
        alias: "dyn",
        path: "gopp/lib/dynamic",
    },
];

/// Command macros and the `system` method each one calls.
pub const COMMAND_MACROS: &[(&str, &str)] = &[("prepare", "Prepare"), ("exec", "Exec"), ("cd", "Cd")];

/// Method `assert` calls for each checked condition.
pub const ASSERT_METHOD: &str = "True";

/// Return the full metadata entry for a library.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: LibraryId) -> &'static LibraryInfo {
    LIBRARIES.iter().find(|l| l.id == id).expect("library info missing")
}

pub fn alias(id: LibraryId) -> &'static str {
    info_for(id).alias
}

pub fn path(id: LibraryId) -> &'static str {
    info_for(id).path
}

/// Method name for a command macro, if `name` is one.
pub fn command_method(name: &str) -> Option<&'static str> {
    COMMAND_MACROS.iter().find(|(m, _)| *m == name).map(|(_, method)| *method)
}

//! Public entry points and parse configuration.
//!
//! [`parse_bytes`] and [`parse_file`] run a whole parse: scanning, parsing with permits and macros, package
//! composition, optional branch checking and finalization into an [`OutputMap`]. [`ParseOptions`] carries every knob.
//!
//! ## Examples
//! ```rust
//! use gopp_syntax::api::{self, ParseOptions};
//!
//! let parsed = api::parse_bytes("hello.go", b"package hello\n", ParseOptions::default()).unwrap();
//! assert_eq!(parsed.files.len(), 1);
//! assert!(parsed.files.contains_key("hello/hello.go"));
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::ops::BitOr;
use std::path::Path;
use std::sync::Arc;

use gopp_core::lang::permits::Dialect;

use crate::ast::{ArgImport, File, Package, Project, Span};
use crate::diagnostics::{Diagnostic, DiagnosticSink, ErrorHandler};
use crate::macros::MacroRegistry;
use crate::parser::Parser;
use crate::project;
use crate::source::Position;

// ============================================================================
// Options
// ============================================================================

/// Parse mode bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Mode(u32);

impl Mode {
    /// Run the branch checker on every function body.
    pub const CHECK_BRANCHES: Mode = Mode(1);

    pub const fn empty() -> Mode {
        Mode(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Mode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

/// Callback for `//line` and `//word:` directives: (position of the comment, text after `//`).
pub type DirectiveHandler = Box<dyn FnMut(&Position, &str)>;

/// Fetches the bytes of an `include "path"` target.
pub type IncludeResolver = Box<dyn FnMut(&str) -> io::Result<Vec<u8>>>;

/// Default bound on nested `include` directives.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Everything a parse can be configured with.
pub struct ParseOptions {
    /// Invoked once per diagnostic. Without one, the first diagnostic aborts the parse.
    pub error_handler: Option<ErrorHandler>,
    pub directive_handler: Option<DirectiveHandler>,
    pub mode: Mode,
    pub include_resolver: Option<IncludeResolver>,
    /// Overrides the dialect derived from the input name's extension.
    pub dialect: Option<Dialect>,
    /// Output root used when the input has no `project` header.
    pub root: String,
    pub macros: Arc<MacroRegistry>,
    pub max_include_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_handler: None,
            directive_handler: None,
            mode: Mode::empty(),
            include_resolver: None,
            dialect: None,
            root: String::new(),
            macros: Arc::new(MacroRegistry::default()),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_error_handler(mut self, handler: impl FnMut(&Diagnostic) + 'static) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }

    pub fn with_directive_handler(mut self, handler: impl FnMut(&Position, &str) + 'static) -> Self {
        self.directive_handler = Some(Box::new(handler));
        self
    }

    pub fn with_include_resolver(mut self, resolver: impl FnMut(&str) -> io::Result<Vec<u8>> + 'static) -> Self {
        self.include_resolver = Some(Box::new(resolver));
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_macros(mut self, macros: impl Into<Arc<MacroRegistry>>) -> Self {
        self.macros = macros.into();
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("error_handler", &self.error_handler.is_some())
            .field("directive_handler", &self.directive_handler.is_some())
            .field("mode", &self.mode)
            .field("include_resolver", &self.include_resolver.is_some())
            .field("dialect", &self.dialect)
            .field("root", &self.root)
            .field("macros", &self.macros)
            .field("max_include_depth", &self.max_include_depth)
            .finish()
    }
}

// ============================================================================
// Results
// ============================================================================

/// Finalized files keyed by output path (`<root>/<dir>/<name>.go`).
pub type OutputMap = BTreeMap<String, File>;

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub files: OutputMap,
    /// First diagnostic seen, when an error handler kept the parse going.
    pub first_error: Option<Diagnostic>,
}

// ============================================================================
// Session
// ============================================================================

/// State shared by the parser of the top-level input and the parsers of its includes.
pub(crate) struct Session {
    pub(crate) sink: DiagnosticSink,
    pub(crate) directive_handler: Option<DirectiveHandler>,
    pub(crate) include_resolver: Option<IncludeResolver>,
    pub(crate) mode: Mode,
    pub(crate) dialect: Option<Dialect>,
    pub(crate) macros: Arc<MacroRegistry>,
    pub(crate) max_include_depth: usize,
    pub(crate) depth: usize,
    pub(crate) project: Project,
    next_group: u32,
}

impl Session {
    pub(crate) fn new(options: ParseOptions) -> Self {
        Self {
            sink: DiagnosticSink::new(options.error_handler),
            directive_handler: options.directive_handler,
            include_resolver: options.include_resolver,
            mode: options.mode,
            dialect: options.dialect,
            macros: options.macros,
            max_include_depth: options.max_include_depth,
            depth: 0,
            project: Project {
                root: options.root,
                ..Project::default()
            },
            next_group: 0,
        }
    }

    /// A declaration-group id unique across every input of this parse.
    pub(crate) fn next_group(&mut self) -> u32 {
        self.next_group += 1;
        self.next_group
    }

    /// Add a finished package, merging it into an earlier one with the same name and directory.
    ///
    /// `arg_imports` lists `(file, decl, span, position)` of every argument import, indexed within `pkg`.
    pub(crate) fn add_package(&mut self, pkg: Package, arg_imports: Vec<(usize, usize, Span, Position)>) {
        let packages = &mut self.project.packages;
        let (index, file_offset) = match packages.iter().position(|p| p.name == pkg.name && p.dir == pkg.dir) {
            Some(index) => {
                let existing = &mut packages[index];
                let offset = existing.files.len();
                existing.files.extend(pkg.files);
                existing.bound.extend(pkg.bound);
                existing.excluded |= pkg.excluded;
                if existing.type_params.is_empty() {
                    existing.type_params = pkg.type_params;
                }
                (index, offset)
            }
            None => {
                packages.push(pkg);
                (packages.len() - 1, 0)
            }
        };
        self.project
            .pending
            .extend(arg_imports.into_iter().map(|(file, decl, span, position)| ArgImport {
                package: index,
                file: file + file_offset,
                decl,
                span,
                position,
            }));
    }

    /// Turn the collected project into the caller-visible result.
    fn finish(mut self) -> Result<Parsed, Diagnostic> {
        if self.sink.aborted() {
            if let Some(first) = self.sink.take_first() {
                return Err(first);
            }
        }
        let files = project::finalize(&mut self.project, &mut self.sink);
        if self.sink.aborted() {
            if let Some(first) = self.sink.take_first() {
                return Err(first);
            }
        }
        Ok(Parsed {
            files,
            first_error: self.sink.take_first(),
        })
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Parse one input held in memory.
///
/// ## Parameters
/// - `name`: input name; its extension selects the dialect unless [`ParseOptions::dialect`] is set, and its stem names
///   the first headerless section's output file.
/// - `bytes`: source text. Invalid UTF-8 is reported and decoded lossily.
///
/// ## Errors
/// Without an error handler, the first diagnostic.
#[tracing::instrument(skip_all, fields(name = %name, len = bytes.len()))]
pub fn parse_bytes(name: &str, bytes: &[u8], options: ParseOptions) -> Result<Parsed, Diagnostic> {
    let mut session = Session::new(options);
    let text = String::from_utf8_lossy(bytes);
    {
        let mut parser = Parser::new(&mut session, name, &text);
        if matches!(text, Cow::Owned(_)) {
            let offset = std::str::from_utf8(bytes).err().map_or(0, |e| e.valid_up_to());
            parser.report(Diagnostic::lexical("invalid UTF-8 encoding", Span::new(offset, offset)));
        }
        parser.pkgs();
    }
    session.finish()
}

/// Read and parse one file.
///
/// Without an explicit [`ParseOptions::include_resolver`], includes are read relative to the file's directory.
///
/// ## Errors
/// An `Io` diagnostic when the file cannot be read; otherwise as [`parse_bytes`].
pub fn parse_file(path: impl AsRef<Path>, mut options: ParseOptions) -> Result<Parsed, Diagnostic> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| {
        Diagnostic::io(format!("{name}: {e}"), Span::default()).at(Position::new(name.clone(), 0, 0))
    })?;
    if options.include_resolver.is_none() {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        options.include_resolver = Some(Box::new(move |target: &str| std::fs::read(dir.join(target))));
    }
    parse_bytes(&name, &bytes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn mode_flags_combine() {
        let mode = Mode::empty() | Mode::CHECK_BRANCHES;
        assert!(mode.contains(Mode::CHECK_BRANCHES));
        assert!(!Mode::empty().contains(Mode::CHECK_BRANCHES));
        assert_eq!(Mode::default(), Mode::empty());
    }

    #[test]
    fn without_handler_first_error_is_returned() {
        let err = parse_bytes("x.go", b"package p\nfunc f() { x := }\n", ParseOptions::default()).unwrap_err();
        assert_eq!(err.position.line, 2);
        assert!(err.message.contains("expected expression"), "{}", err.message);
    }

    #[test]
    fn with_handler_every_error_is_seen_and_good_files_survive() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = ParseOptions::default().with_error_handler(move |d| sink.borrow_mut().push(d.message.clone()));
        let source = b"package p\nsection good\nfunc f() {}\nsection bad\nfunc g() { ) }\n";
        let parsed = parse_bytes("x.gopp", source, options).unwrap();
        assert_eq!(seen.borrow().len(), 1);
        assert!(parsed.first_error.is_some());
        assert!(parsed.files.contains_key("p/good.go"));
        assert!(!parsed.files.contains_key("p/bad.go"));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let err = parse_bytes("x.go", b"package p\n\xff\n", ParseOptions::default()).unwrap_err();
        assert_eq!(err.message, "invalid UTF-8 encoding");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = parse_file("/definitely/not/here.go", ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, crate::diagnostics::DiagnosticKind::Io);
    }
}

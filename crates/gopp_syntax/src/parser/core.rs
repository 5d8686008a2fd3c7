/// Parser core types and construction.
///
/// This chunk defines the [`Parser`] type, the small internal helper types shared across the other parser chunks,
/// and the reporting primitives every rule funnels its diagnostics through.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.

/// Result type of every internal parsing rule.
pub type PResult<T> = Result<T, Diagnostic>;

/// Which statement list is being parsed; decides where the list ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListContext {
    /// `{ ... }`: ends at `}`.
    Block,
    /// A `case`/`default` clause: also ends at the next clause.
    Clause,
    /// Bare statements at file scope: end at the next declaration, directive or header.
    TopLevel,
}

/// The active dynamic-mode block: operators become calls on `name`, imported from `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DynamicBlock {
    name: Ident,
    path: String,
}

/// Deepest nesting of parentheses, blocks, literals, types and unary operators the parser descends into.
const MAX_NESTING: u32 = 100;

/// Argument imports of the package being parsed: (file index, decl index, span, position).
type ArgImports = Vec<(usize, usize, Span, Position)>;

/// Parser state for one input.
///
/// ## Notes
/// - `expr_lev` is the expression-nesting counter: `-1` inside control clause headers (where `T{` opens a block),
///   `>= 0` elsewhere, incremented inside parentheses and brackets.
/// - `depth` bounds the recursion itself; past [`MAX_NESTING`] the rule fails instead of growing the stack.
/// - Lexical errors are buffered and reported as the parser moves past them, so diagnostics come out in source order.
/// - Recovery is local: a failed statement or declaration becomes a `Bad` node and the parser resynchronizes at the
///   next statement boundary.
pub struct Parser<'a> {
    session: &'a mut Session,
    tokens: Vec<Token>,
    leads: BTreeMap<usize, CommentGroup>,
    pos: usize,
    map: SourceMap,
    name: String,
    permits: PermitSet,
    expr_lev: i32,
    depth: u32,

    // Package and section state
    file: File,
    bound: BTreeSet<Ident>,
    list_stack: Vec<ListContext>,
    dynamic: Option<DynamicBlock>,
    input_dynamic: Option<DynamicBlock>,
    in_section: bool,
    bare: Vec<Spanned<Stmt>>,
    bare_file: Option<usize>,
    arg_imports: ArgImports,

    lex_errors: VecDeque<Diagnostic>,
    floating: VecDeque<CommentGroup>,
}

impl<'a> Parser<'a> {
    /// Scan `source` and prepare to parse it.
    ///
    /// The dialect comes from the session override or from `name`'s extension. Directives found by the scanner are
    /// handed to the session's directive handler here, and `//line` directives feed the source map.
    pub(crate) fn new(session: &'a mut Session, name: &str, source: &str) -> Parser<'a> {
        let lexed = lexer::lex(source);
        let dialect = session.dialect.unwrap_or_else(|| Dialect::from_extension(name));
        let mut map = SourceMap::new(name, source);
        for directive in &lexed.directives {
            if let Some(line) = directive.line.clone() {
                map.add_line_directive(line);
            }
            if let Some(handler) = session.directive_handler.as_mut() {
                handler(&map.position(directive.offset), &directive.text);
            }
        }
        tracing::debug!(name, %dialect, tokens = lexed.tokens.len(), "parser created");

        Parser {
            session,
            tokens: lexed.tokens,
            leads: lexed.leads,
            pos: 0,
            map,
            name: name.to_string(),
            permits: PermitSet::for_dialect(dialect),
            expr_lev: 0,
            depth: 0,
            file: File {
                source: name.to_string(),
                ..File::default()
            },
            bound: BTreeSet::new(),
            list_stack: Vec::new(),
            dynamic: None,
            input_dynamic: None,
            in_section: false,
            bare: Vec::new(),
            bare_file: None,
            arg_imports: Vec::new(),
            lex_errors: lexed.errors.into(),
            floating: lexed.floating.into(),
        }
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Position of a byte offset, remapped through `//line` directives when `lineDirectives` is on.
    fn position_of(&self, offset: usize) -> Position {
        if self.permits.is_permit(PermitId::LineDirectives) {
            if let Some(position) = self.map.remapped(offset) {
                return position;
            }
        }
        self.map.position(offset)
    }

    /// Send a diagnostic to the session sink, filling in its position.
    pub(crate) fn report(&mut self, diag: Diagnostic) {
        let diag = if diag.position.is_valid() {
            diag
        } else {
            let position = self.position_of(diag.span.start);
            diag.at(position)
        };
        self.file.had_errors = true;
        let at_eof = diag.span.start >= self.eof_offset();
        self.session.sink.report(diag, at_eof);
    }

    fn eof_offset(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.span.start)
    }

    /// `true` once the sink wants parsing to stop.
    fn aborted(&self) -> bool {
        self.session.sink.aborted()
    }

    /// Report buffered lexical errors that start before `offset`.
    fn flush_lex_errors(&mut self, offset: usize) {
        while self.lex_errors.front().is_some_and(|d| d.span.start < offset) {
            if let Some(diag) = self.lex_errors.pop_front() {
                self.report(diag);
            }
        }
    }

    /// Run a recursive rule one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(Diagnostic::syntax("exceeded max nesting depth", self.current_span()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Fail with `"<permit> is not permitted"` unless `id` is enabled.
    fn require(&self, id: PermitId, span: Span) -> PResult<()> {
        if self.permits.is_permit(id) {
            Ok(())
        } else {
            Err(not_permitted(id, span))
        }
    }

    /// Like [`Parser::require`], but reports and lets the caller keep going. Returns whether `id` is enabled.
    fn gate(&mut self, id: PermitId, span: Span) -> bool {
        if self.permits.is_permit(id) {
            true
        } else {
            self.report(not_permitted(id, span));
            false
        }
    }
}

fn not_permitted(id: PermitId, span: Span) -> Diagnostic {
    Diagnostic::syntax(format!("{} is not permitted", permits::as_str(id)), span)
}

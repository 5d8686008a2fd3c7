//! Branch and label checking.
//!
//! Runs once per function body after parsing, when [`crate::api::Mode::CHECK_BRANCHES`] is set. Every function
//! literal is its own label scope. A body that already contains error-recovery placeholders is skipped.
//!
//! ## Notes
//! - Unlabeled `break`/`continue` bind to the innermost enclosing loop, switch or select.
//! - Labeled `break`/`continue` must name an enclosing statement of the right kind.
//! - `goto` may jump backwards to any label in an enclosing block, or forwards to a label declared later in the same
//!   or an enclosing block, as long as it does not jump over a variable declaration.

use std::collections::HashMap;

use gopp_core::lang::operators::OperatorId;

use crate::ast::*;
use crate::diagnostics::Diagnostic;
use crate::source::Position;
use crate::walk::{self, Visitor};

/// Check every function body in `decl`, returning one diagnostic per problem.
///
/// `position` maps a byte offset of the decl's input to a reportable position.
#[tracing::instrument(skip_all)]
pub fn check_decl(decl: &Spanned<Decl>, position: &dyn Fn(usize) -> Position) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    match &decl.node {
        Decl::Func(f) => {
            if let Some(body) = &f.body {
                check_function(body, position, &mut diags);
            }
        }
        _ => {
            let mut lits = FuncLits::default();
            lits.visit_decl(decl);
            for body in lits.bodies {
                check_function(body, position, &mut diags);
            }
        }
    }
    diags
}

/// Check one function body and, recursively, the literals it contains.
pub fn check_function(body: &Block, position: &dyn Fn(usize) -> Position, diags: &mut Vec<Diagnostic>) {
    if has_bad_nodes(body) {
        tracing::trace!(start = body.span.start, "skipping body with syntax errors");
        return;
    }

    let mut scope = LabelScope {
        position,
        diags: &mut *diags,
        labels: HashMap::new(),
        declared: Vec::new(),
        blocks: Vec::new(),
        next_stmt: 0,
    };
    let forward = scope.block_branches(None, Targets::default(), None, body.span.start, &body.stmts);
    scope.finish(forward);

    let mut lits = FuncLits::default();
    walk::inspect_block(&mut lits, body);
    for lit in lits.bodies {
        check_function(lit, position, diags);
    }
}

// ============================================================================
// Checker state
// ============================================================================

/// What a labeled statement labels, as far as branch targets care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Loop,
    Switch,
    Select,
    Other,
}

fn target_kind(stmt: &Stmt) -> TargetKind {
    match stmt {
        Stmt::For { .. } | Stmt::Range { .. } => TargetKind::Loop,
        Stmt::Switch { .. } | Stmt::TypeSwitch { .. } => TargetKind::Switch,
        Stmt::Select { .. } => TargetKind::Select,
        _ => TargetKind::Other,
    }
}

#[derive(Debug)]
struct Label {
    name: Ident,
    span: Span,
    /// Block declaring the label.
    parent: usize,
    /// Id of the labeled statement.
    stmt: usize,
    kind: TargetKind,
    used: bool,
}

#[derive(Debug)]
struct BlockInfo {
    parent: Option<usize>,
    start: usize,
    /// Id of the labeled statement owning this block, if any.
    labeled: Option<usize>,
}

/// The statement an unlabeled `break` would leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Breakable {
    Loop,
    Switch { type_switch: bool, cases: usize },
    Select,
}

/// Targets valid for unlabeled branches at the current point.
#[derive(Debug, Clone, Copy, Default)]
struct Targets {
    breaks: Option<Breakable>,
    continues: bool,
    /// Index of the case clause directly containing the statement list, if any.
    case_index: Option<usize>,
}

impl Targets {
    fn nested(self) -> Targets {
        Targets {
            case_index: None,
            ..self
        }
    }
}

/// A `goto` whose label has not been seen yet.
#[derive(Debug)]
struct ForwardGoto {
    id: usize,
    name: Ident,
    span: Span,
}

enum Enclosing {
    NotDefined,
    Invalid,
    Found(TargetKind),
}

struct LabelScope<'c> {
    position: &'c dyn Fn(usize) -> Position,
    diags: &'c mut Vec<Diagnostic>,
    labels: HashMap<Ident, usize>,
    declared: Vec<Label>,
    blocks: Vec<BlockInfo>,
    next_stmt: usize,
}

impl LabelScope<'_> {
    fn error(&mut self, span: Span, message: String) {
        let position = (self.position)(span.start);
        self.diags.push(Diagnostic::semantic(message, span).at(position));
    }

    fn fresh_id(&mut self) -> usize {
        self.next_stmt += 1;
        self.next_stmt
    }

    /// Declare `label` in `block`. A duplicate is reported and the first declaration is returned.
    fn declare(&mut self, block: usize, label: &Spanned<Ident>, stmt: usize, kind: TargetKind) -> usize {
        if let Some(&existing) = self.labels.get(&label.node) {
            let at = (self.position)(self.declared[existing].span.start);
            self.error(label.span, format!("label {} already defined at {at}", label.node));
            return existing;
        }
        let index = self.declared.len();
        self.declared.push(Label {
            name: label.node.clone(),
            span: label.span,
            parent: block,
            stmt,
            kind,
            used: false,
        });
        self.labels.insert(label.node.clone(), index);
        index
    }

    fn ancestors(&self, block: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(block), |&b| self.blocks[b].parent)
    }

    /// `true` if `name` is declared in `block` or an enclosing block.
    fn goto_target(&mut self, block: usize, name: &str) -> bool {
        let Some(&index) = self.labels.get(name) else {
            return false;
        };
        self.declared[index].used = true;
        let parent = self.declared[index].parent;
        self.ancestors(block).any(|b| b == parent)
    }

    /// The innermost enclosing statement labeled `name`.
    fn enclosing_target(&mut self, block: usize, name: &str) -> Enclosing {
        let Some(&index) = self.labels.get(name) else {
            return Enclosing::NotDefined;
        };
        self.declared[index].used = true;
        let label = &self.declared[index];
        if self.ancestors(block).any(|b| self.blocks[b].labeled == Some(label.stmt)) {
            Enclosing::Found(label.kind)
        } else {
            Enclosing::Invalid
        }
    }

    /// Process one statement list, returning the gotos it could not resolve.
    fn block_branches(
        &mut self,
        parent: Option<usize>,
        ctxt: Targets,
        labeled: Option<usize>,
        start: usize,
        body: &[Spanned<Stmt>],
    ) -> Vec<ForwardGoto> {
        let block = self.blocks.len();
        self.blocks.push(BlockInfo { parent, start, labeled });

        let mut var_decl: Option<usize> = None;
        let mut forward: Vec<ForwardGoto> = Vec::new();
        // Gotos seen before the latest variable declaration.
        let mut jumped: Vec<usize> = Vec::new();

        for (index, stmt) in body.iter().enumerate() {
            let mut owner = None;
            let mut stmt = stmt;
            while let Stmt::Labeled { label, stmt: inner } = &stmt.node {
                if label.node != "_" {
                    let id = self.fresh_id();
                    let decl = self.declare(block, label, id, target_kind(&inner.node));
                    let (resolved, pending): (Vec<_>, Vec<_>) =
                        forward.into_iter().partition(|g| g.name == label.node);
                    forward = pending;
                    for goto in resolved {
                        self.declared[decl].used = true;
                        if let Some(offset) = var_decl {
                            if jumped.contains(&goto.id) {
                                let line = (self.position)(offset).line;
                                self.error(
                                    goto.span,
                                    format!("goto {} jumps over variable declaration at line {line}", goto.name),
                                );
                            }
                        }
                    }
                    owner = Some(id);
                }
                stmt = &**inner;
            }

            match &stmt.node {
                Stmt::Decl(decls) => {
                    if decls.iter().any(|d| matches!(d.node, Decl::Var(_))) {
                        var_decl = Some(stmt.span.start);
                        jumped = forward.iter().map(|g| g.id).collect();
                    }
                }
                Stmt::Assign {
                    op: OperatorId::Define, ..
                } => {
                    var_decl = Some(stmt.span.start);
                    jumped = forward.iter().map(|g| g.id).collect();
                }
                Stmt::Branch { kind, label: None } => self.unlabeled_branch(*kind, stmt.span, ctxt, index, body.len()),
                Stmt::Branch {
                    kind,
                    label: Some(label),
                } => match kind {
                    BranchKind::Break => match self.enclosing_target(block, &label.node) {
                        Enclosing::Found(TargetKind::Loop | TargetKind::Switch | TargetKind::Select) => {}
                        Enclosing::Found(TargetKind::Other) | Enclosing::Invalid => {
                            self.error(label.span, format!("invalid break label {}", label.node))
                        }
                        Enclosing::NotDefined => {
                            self.error(label.span, format!("break label not defined: {}", label.node))
                        }
                    },
                    BranchKind::Continue => match self.enclosing_target(block, &label.node) {
                        Enclosing::Found(TargetKind::Loop) => {}
                        Enclosing::Found(_) | Enclosing::Invalid => {
                            self.error(label.span, format!("invalid continue label {}", label.node))
                        }
                        Enclosing::NotDefined => {
                            self.error(label.span, format!("continue label not defined: {}", label.node))
                        }
                    },
                    BranchKind::Goto => {
                        if !self.goto_target(block, &label.node) {
                            let id = self.fresh_id();
                            forward.push(ForwardGoto {
                                id,
                                name: label.node.clone(),
                                span: label.span,
                            });
                        }
                    }
                    BranchKind::Fallthrough => {
                        self.error(stmt.span, "fallthrough statement out of place".to_string())
                    }
                },
                Stmt::Block(inner) => {
                    forward.extend(self.block_branches(Some(block), ctxt.nested(), owner, stmt.span.start, &inner.stmts));
                }
                Stmt::If { then, els, .. } => {
                    forward.extend(self.block_branches(Some(block), ctxt.nested(), owner, then.span.start, &then.stmts));
                    if let Some(els) = els {
                        forward.extend(self.block_branches(
                            Some(block),
                            ctxt.nested(),
                            owner,
                            els.span.start,
                            std::slice::from_ref(&**els),
                        ));
                    }
                }
                Stmt::For { body, .. } | Stmt::Range { body, .. } => {
                    let inner = Targets {
                        breaks: Some(Breakable::Loop),
                        continues: true,
                        case_index: None,
                    };
                    forward.extend(self.block_branches(Some(block), inner, owner, body.span.start, &body.stmts));
                }
                Stmt::Switch { body, .. } | Stmt::TypeSwitch { body, .. } => {
                    let breaks = Breakable::Switch {
                        type_switch: matches!(stmt.node, Stmt::TypeSwitch { .. }),
                        cases: body.stmts.len(),
                    };
                    for (case_index, clause) in body.stmts.iter().enumerate() {
                        let Stmt::Case { body: stmts, .. } = &clause.node else {
                            continue;
                        };
                        let inner = Targets {
                            breaks: Some(breaks),
                            continues: ctxt.continues,
                            case_index: Some(case_index),
                        };
                        forward.extend(self.block_branches(Some(block), inner, owner, clause.span.start, stmts));
                    }
                }
                Stmt::Select { body } => {
                    let inner = Targets {
                        breaks: Some(Breakable::Select),
                        continues: ctxt.continues,
                        case_index: None,
                    };
                    for clause in &body.stmts {
                        if let Stmt::Comm { body: stmts, .. } = &clause.node {
                            forward.extend(self.block_branches(Some(block), inner, owner, clause.span.start, stmts));
                        }
                    }
                }
                _ => {}
            }
        }

        forward
    }

    fn unlabeled_branch(&mut self, kind: BranchKind, span: Span, ctxt: Targets, index: usize, len: usize) {
        match kind {
            BranchKind::Break => {
                if ctxt.breaks.is_none() {
                    self.error(span, "break is not in a loop, switch, or select".to_string());
                }
            }
            BranchKind::Continue => {
                if !ctxt.continues {
                    self.error(span, "continue is not in a loop".to_string());
                }
            }
            BranchKind::Fallthrough => {
                let message = match (ctxt.breaks, ctxt.case_index) {
                    (Some(Breakable::Switch { type_switch: true, .. }), _) => Some("cannot fallthrough in type switch"),
                    (Some(Breakable::Switch { cases, .. }), Some(case)) if index + 1 == len => {
                        (case + 1 == cases).then_some("cannot fallthrough final case in switch")
                    }
                    _ => Some("fallthrough statement out of place"),
                };
                if let Some(message) = message {
                    self.error(span, message.to_string());
                }
            }
            // The parser never produces a goto without a label.
            BranchKind::Goto => self.error(span, "missing label in goto".to_string()),
        }
    }

    /// Report gotos that never found their label and labels that were never used.
    fn finish(&mut self, forward: Vec<ForwardGoto>) {
        for goto in forward {
            match self.labels.get(&goto.name).copied() {
                Some(index) => {
                    self.declared[index].used = true;
                    let start = self.blocks[self.declared[index].parent].start;
                    let at = (self.position)(start);
                    self.error(goto.span, format!("goto {} jumps into block starting at {at}", goto.name));
                }
                None => self.error(goto.span, format!("label {} not defined", goto.name)),
            }
        }
        let unused: Vec<(Span, String)> = self
            .declared
            .iter()
            .filter(|l| !l.used)
            .map(|l| (l.span, format!("label {} defined and not used", l.name)))
            .collect();
        for (span, message) in unused {
            self.error(span, message);
        }
    }
}

// ============================================================================
// Tree queries
// ============================================================================

/// Function literal bodies directly inside a subtree; nested literals are left to the recursive check.
#[derive(Default)]
struct FuncLits<'ast> {
    bodies: Vec<&'ast Block>,
}

impl<'ast> Visitor<'ast> for FuncLits<'ast> {
    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        match &expr.node {
            Expr::FuncLit { body, .. } => self.bodies.push(body),
            _ => walk::inspect_expr(self, expr),
        }
    }
}

#[derive(Default)]
struct BadNodes {
    found: bool,
}

impl<'ast> Visitor<'ast> for BadNodes {
    fn visit_decl(&mut self, decl: &'ast Spanned<Decl>) {
        if matches!(decl.node, Decl::Bad) {
            self.found = true;
        } else {
            walk::inspect_decl(self, decl);
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast Spanned<Stmt>) {
        if matches!(stmt.node, Stmt::Bad) {
            self.found = true;
        } else {
            walk::inspect_stmt(self, stmt);
        }
    }

    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        if matches!(expr.node, Expr::Bad) {
            self.found = true;
        } else {
            walk::inspect_expr(self, expr);
        }
    }
}

fn has_bad_nodes(body: &Block) -> bool {
    let mut bad = BadNodes::default();
    walk::inspect_block(&mut bad, body);
    bad.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ParseOptions;
    use crate::parser::parse_declaration;

    fn position_in(source: &str) -> impl Fn(usize) -> Position + '_ {
        move |offset| {
            let before = &source[..offset];
            let line = before.matches('\n').count() + 1;
            let column = offset - before.rfind('\n').map_or(0, |i| i + 1) + 1;
            Position::new("t.go", line as u32, column as u32)
        }
    }

    fn check_with(source: &str, options: ParseOptions) -> Vec<String> {
        let decls = parse_declaration(source, options).unwrap();
        let position = position_in(source);
        decls
            .iter()
            .flat_map(|d| check_decl(d, &position))
            .map(|d| d.message)
            .collect()
    }

    fn check(source: &str) -> Vec<String> {
        check_with(source, ParseOptions::default())
    }

    #[test]
    fn continue_outside_loop() {
        assert_eq!(check("func f() { continue }"), ["continue is not in a loop"]);
    }

    #[test]
    fn break_outside_breakable() {
        assert_eq!(
            check("func f() { if true { break } }"),
            ["break is not in a loop, switch, or select"]
        );
    }

    #[test]
    fn break_inside_switch_and_select_is_fine() {
        assert!(check("func f(x int) {\n\tswitch x {\n\tcase 1:\n\t\tbreak\n\t}\n}").is_empty());
        assert!(check("func f() {\n\tselect {\n\tdefault:\n\t\tbreak\n\t}\n}").is_empty());
    }

    #[test]
    fn undefined_goto_label() {
        assert_eq!(check("func f() { goto L }"), ["label L not defined"]);
    }

    #[test]
    fn unused_label() {
        assert_eq!(check("func f() {\nL:\n\tfor {\n\t}\n}"), ["label L defined and not used"]);
    }

    #[test]
    fn labeled_break_and_continue() {
        let source = "func f() {\nL:\n\tfor {\n\t\tfor {\n\t\t\tcontinue L\n\t\t}\n\t\tbreak L\n\t}\n}";
        assert!(check(source).is_empty());
    }

    #[test]
    fn continue_label_must_name_a_loop() {
        let source = "func f(x int) {\nL:\n\tswitch x {\n\tcase 1:\n\t\tfor {\n\t\t\tcontinue L\n\t\t}\n\t}\n}";
        assert_eq!(check(source), ["invalid continue label L"]);
    }

    #[test]
    fn goto_over_variable_declaration() {
        let source = "func f() {\n\tgoto L\n\tx := 1\n\t_ = x\nL:\n\tprintln()\n}";
        assert_eq!(check(source), ["goto L jumps over variable declaration at line 3"]);
    }

    #[test]
    fn backward_goto_is_fine() {
        let source = "func f() {\nL:\n\tprintln()\n\tgoto L\n}";
        assert!(check(source).is_empty());
    }

    #[test]
    fn goto_into_block() {
        let source = "func f() {\n\tgoto L\n\t{\n\tL:\n\t\tprintln()\n\t}\n}";
        let messages = check(source);
        assert_eq!(messages.len(), 1);
        assert!(
            messages[0].starts_with("goto L jumps into block starting at t.go:3"),
            "{}",
            messages[0]
        );
    }

    #[test]
    fn duplicate_label() {
        let source = "func f() {\nL:\n\tfor {\n\t\tbreak L\n\t}\nL:\n\tfor {\n\t\tbreak L\n\t}\n}";
        assert_eq!(
            check(source),
            ["label L already defined at t.go:2:1", "invalid break label L"]
        );
    }

    #[test]
    fn fallthrough_placement() {
        let source = "func f(x int) {\n\tswitch x {\n\tcase 1:\n\t\tfallthrough\n\tcase 2:\n\t\tfallthrough\n\t}\n}";
        assert_eq!(check(source), ["cannot fallthrough final case in switch"]);
        assert_eq!(
            check("func f() {\n\tfor {\n\t\tfallthrough\n\t}\n}"),
            ["fallthrough statement out of place"]
        );
    }

    #[test]
    fn function_literals_are_separate_scopes() {
        let source = "func f() {\n\tfor {\n\t\tg := func() {\n\t\t\tbreak\n\t\t}\n\t\tg()\n\t}\n}";
        assert_eq!(check(source), ["break is not in a loop, switch, or select"]);
    }

    #[test]
    fn package_level_literals_are_checked() {
        assert_eq!(check("var f = func() { continue }"), ["continue is not in a loop"]);
    }

    #[test]
    fn bodies_with_syntax_errors_are_skipped() {
        let options = ParseOptions::default().with_error_handler(|_| {});
        assert!(check_with("func f() {\n\tx := )\n\tcontinue\n}", options).is_empty());
    }
}

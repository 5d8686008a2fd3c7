/// Dynamic mode and inferred imports.
///
/// Inside a `use "dynamic"` block every operator with a registered dynamic method becomes a call on the dynamic
/// library: `a + b` → `dyn.Plus(a, b)`, `-a` → `dyn.Negate(a)`. The short-circuit operators keep their laziness by
/// wrapping the right operand in a closure: `a && b` → `dyn.And(a, func() any { return b })`.
///
/// The library reference and `"path".Name` expressions both record an inferred import on the current file.
impl<'a> Parser<'a> {
    // ========================================================================
    // Operator nodes
    // ========================================================================

    fn make_binary(
        &mut self,
        op: OperatorId,
        x: Spanned<Expr>,
        y: Spanned<Expr>,
        op_span: Span,
    ) -> PResult<Spanned<Expr>> {
        let span = x.span.merge(y.span);
        let method = operators::dynamic_method(op);
        let (Some(block), Some(method)) = (self.dynamic.clone(), method) else {
            return Ok(Spanned::new(
                Expr::Binary {
                    op,
                    x: Box::new(x),
                    y: Box::new(y),
                },
                span,
            ));
        };

        let receiver = self.dynamic_receiver(block, op_span)?;
        let y = if matches!(op, OperatorId::LogicalAnd | OperatorId::LogicalOr) {
            lazy(y)
        } else {
            y
        };
        Ok(dynamic_call(receiver, method, vec![x, y], span))
    }

    fn make_unary(&mut self, op: OperatorId, x: Spanned<Expr>, span: Span) -> PResult<Spanned<Expr>> {
        let method = operators::dynamic_unary_method(op);
        let (Some(block), Some(method)) = (self.dynamic.clone(), method) else {
            return Ok(Spanned::new(Expr::Unary { op, x: Box::new(x) }, span));
        };
        let receiver = self.dynamic_receiver(block, span)?;
        Ok(dynamic_call(receiver, method, vec![x], span))
    }

    fn dynamic_receiver(&mut self, block: DynamicBlock, span: Span) -> PResult<Spanned<Expr>> {
        self.infer_import(block.name.clone(), block.path, span)?;
        Ok(Spanned::new(Expr::name(block.name), span))
    }

    // ========================================================================
    // Inferred imports
    // ========================================================================

    /// Make `alias` refer to `path` in the current file.
    ///
    /// Re-inferring the same pair is a no-op. An alias already bound to another path, by an explicit import or an
    /// earlier inference, is an error.
    fn infer_import(&mut self, alias: Ident, path: String, span: Span) -> PResult<()> {
        if let Some(explicit) = self.file.imports().find(|spec| spec.local_name() == alias) {
            if explicit.path == path {
                return Ok(());
            }
            return Err(Diagnostic::semantic(
                format!("import alias \"{alias}\" already refers to \"{}\"", explicit.path),
                span,
            ));
        }
        match self.file.aliases.get(&alias) {
            Some(existing) if *existing == path => Ok(()),
            Some(existing) => Err(Diagnostic::semantic(
                format!("import alias \"{alias}\" already refers to \"{existing}\""),
                span,
            )),
            None => {
                tracing::trace!(alias = %alias, path = %path, "inferred import");
                self.file.aliases.insert(alias.clone(), path.clone());
                self.file.inferred.push(InferredImport { alias, path });
                Ok(())
            }
        }
    }
}

/// `receiver.method(args)`
fn dynamic_call(receiver: Spanned<Expr>, method: &str, args: Vec<Spanned<Expr>>, span: Span) -> Spanned<Expr> {
    let sel_span = receiver.span;
    let fun = Spanned::new(
        Expr::Selector {
            x: Box::new(receiver),
            sel: Spanned::new(method.to_string(), sel_span),
        },
        sel_span,
    );
    Spanned::new(
        Expr::Call {
            fun: Box::new(fun),
            args,
            spread: false,
        },
        span,
    )
}

/// `func() any { return y }`
fn lazy(y: Spanned<Expr>) -> Spanned<Expr> {
    let span = y.span;
    let ty = FuncType {
        params: Vec::new(),
        results: vec![Field {
            names: Vec::new(),
            ty: Spanned::new(Expr::name("any"), span),
            tag: None,
        }],
    };
    let body = Block::new(vec![Spanned::new(Stmt::Return(vec![y]), span)], span);
    Spanned::new(Expr::FuncLit { ty, body }, span)
}

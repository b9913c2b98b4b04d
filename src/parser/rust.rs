use super::SourceParser;
use crate::core::{
    Error, LineSpan, NodeId, NodeKind, ParseOptions, Result, StructuralTree, TreeBuilder,
};
use std::path::Path;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Block, Expr, ImplItem, Stmt, TraitItem};

const CLOSURE_NAME: &str = "{closure}";

/// Structural parser for Rust sources built on `syn`.
///
/// Inline modules become namespaces, `impl` and `trait` blocks become
/// classes, functions and closures become function nodes. Executable code
/// is modelled as coverable statement nodes; for branching constructs only
/// the head (condition, iterator, scrutinee) is a statement, the bodies are
/// descended into.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustParser;

impl RustParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for RustParser {
    fn parse(&self, source: &str, path: &Path, options: ParseOptions) -> Result<StructuralTree> {
        let file = syn::parse_file(source)
            .map_err(|e| Error::parse(path, e.span().start().line, e.to_string()))?;

        let mut collector = TreeCollector::default();
        collector.visit_file(&file);
        Ok(collector.builder.finish(source.lines().count(), options))
    }

    fn language(&self) -> &str {
        "rust"
    }
}

#[derive(Default)]
struct TreeCollector {
    builder: TreeBuilder,
    parents: Vec<NodeId>,
}

impl TreeCollector {
    fn enter(&mut self, kind: NodeKind, name: impl Into<String>, span: LineSpan, coverable: bool) {
        let parent = self.parents.last().copied();
        let id = self.builder.push(parent, kind, name, span, coverable);
        self.parents.push(id);
    }

    fn leave(&mut self) {
        self.parents.pop();
    }

    fn function(&mut self, name: String, span: LineSpan, is_method: bool, block: &Block) {
        self.enter(
            NodeKind::Function {
                is_method,
                is_closure: false,
            },
            name,
            span,
            false,
        );
        self.visit_block(block);
        self.leave();
    }

    /// Coverable head of a branching construct, e.g. `if cond` or `for x in it`
    fn head(&mut self, keyword: proc_macro2::Span, expr: &Expr) {
        let span = LineSpan::new(keyword.start().line, expr.span().end().line);
        self.enter(NodeKind::Statement, "", span, true);
        self.visit_expr(expr);
        self.leave();
    }

    /// Coverable statement for an expression that is not itself a block
    fn expression_statement(&mut self, expr: &Expr) {
        if is_branching(expr) {
            self.visit_expr(expr);
        } else {
            self.enter(NodeKind::Statement, "", span_lines(expr.span()), true);
            self.visit_expr(expr);
            self.leave();
        }
    }
}

fn span_lines(span: proc_macro2::Span) -> LineSpan {
    LineSpan::new(span.start().line, span.end().line)
}

fn brace_span(open: proc_macro2::Span, close: proc_macro2::Span) -> LineSpan {
    LineSpan::new(open.start().line, close.end().line)
}

fn is_branching(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::If(_)
            | Expr::While(_)
            | Expr::ForLoop(_)
            | Expr::Loop(_)
            | Expr::Match(_)
            | Expr::Block(_)
            | Expr::Unsafe(_)
    )
}

fn type_name(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        syn::Type::Reference(type_ref) => type_name(&type_ref.elem),
        syn::Type::Paren(paren) => type_name(&paren.elem),
        syn::Type::Group(group) => type_name(&group.elem),
        _ => "{impl}".to_string(),
    }
}

/// `Type` for inherent impls, `Type as Trait` for trait impls
fn impl_name(item: &syn::ItemImpl) -> String {
    let self_name = type_name(&item.self_ty);
    match item
        .trait_
        .as_ref()
        .and_then(|(_, path, _)| path.segments.last())
    {
        Some(segment) => format!("{} as {}", self_name, segment.ident),
        None => self_name,
    }
}

impl<'ast> Visit<'ast> for TreeCollector {
    fn visit_item_mod(&mut self, item: &'ast syn::ItemMod) {
        // Out-of-line modules live in their own file
        if let Some((brace, items)) = &item.content {
            let span = brace_span(item.mod_token.span, brace.span.close());
            self.enter(NodeKind::Namespace, item.ident.to_string(), span, false);
            for item in items {
                self.visit_item(item);
            }
            self.leave();
        }
    }

    fn visit_item_impl(&mut self, item: &'ast syn::ItemImpl) {
        let span = brace_span(item.impl_token.span, item.brace_token.span.close());
        self.enter(NodeKind::Class, impl_name(item), span, false);
        for impl_item in &item.items {
            if let ImplItem::Fn(method) = impl_item {
                let span = brace_span(method.sig.fn_token.span, method.block.brace_token.span.close());
                self.function(method.sig.ident.to_string(), span, true, &method.block);
            }
        }
        self.leave();
    }

    fn visit_item_trait(&mut self, item: &'ast syn::ItemTrait) {
        let span = brace_span(item.trait_token.span, item.brace_token.span.close());
        self.enter(NodeKind::Class, item.ident.to_string(), span, false);
        for trait_item in &item.items {
            if let TraitItem::Fn(method) = trait_item {
                if let Some(block) = &method.default {
                    let span = brace_span(method.sig.fn_token.span, block.brace_token.span.close());
                    self.function(method.sig.ident.to_string(), span, true, block);
                }
            }
        }
        self.leave();
    }

    // Initializers are evaluated at compile time
    fn visit_item_const(&mut self, _item: &'ast syn::ItemConst) {}

    fn visit_item_static(&mut self, _item: &'ast syn::ItemStatic) {}

    fn visit_item_fn(&mut self, item: &'ast syn::ItemFn) {
        let span = brace_span(item.sig.fn_token.span, item.block.brace_token.span.close());
        self.function(item.sig.ident.to_string(), span, false, &item.block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Item(item) => self.visit_item(item),
            Stmt::Expr(expr, _) if is_branching(expr) => self.visit_expr(expr),
            _ => {
                self.enter(NodeKind::Statement, "", span_lines(stmt.span()), true);
                visit::visit_stmt(self, stmt);
                self.leave();
            }
        }
    }

    fn visit_expr_if(&mut self, expr: &'ast syn::ExprIf) {
        self.head(expr.if_token.span, &expr.cond);
        self.visit_block(&expr.then_branch);
        if let Some((_, else_branch)) = &expr.else_branch {
            self.visit_expr(else_branch);
        }
    }

    fn visit_expr_while(&mut self, expr: &'ast syn::ExprWhile) {
        self.head(expr.while_token.span, &expr.cond);
        self.visit_block(&expr.body);
    }

    fn visit_expr_for_loop(&mut self, expr: &'ast syn::ExprForLoop) {
        self.head(expr.for_token.span, &expr.expr);
        self.visit_block(&expr.body);
    }

    fn visit_expr_loop(&mut self, expr: &'ast syn::ExprLoop) {
        self.visit_block(&expr.body);
    }

    fn visit_expr_match(&mut self, expr: &'ast syn::ExprMatch) {
        self.head(expr.match_token.span, &expr.expr);
        for arm in &expr.arms {
            self.expression_statement(&arm.body);
        }
    }

    fn visit_expr_closure(&mut self, expr: &'ast syn::ExprClosure) {
        self.enter(
            NodeKind::Function {
                is_method: false,
                is_closure: true,
            },
            CLOSURE_NAME,
            span_lines(expr.span()),
            false,
        );
        match expr.body.as_ref() {
            Expr::Block(body) => self.visit_block(&body.block),
            body => self.expression_statement(body),
        }
        self.leave();
    }
}

//! Read-only traversal (spec §3.2 "visitor").
//!
//! One method per concrete node kind; each has a default body that walks
//! the node's children, so a caller only overrides the kinds it cares
//! about. Modeled on the walker shape used throughout the Rust compiler
//! ecosystem (`syn::visit`), not on anything in the teacher repo, which has
//! no comparable AST layer of its own.

use super::{ClassDef, Expr, ExprKind, FnDef, ImportDef, Root, Stmt, StmtKind, TopLevelDef, VarDecl};

pub trait Visitor {
    fn visit_root(&mut self, root: &Root) {
        walk_root(self, root);
    }

    fn visit_top_level(&mut self, def: &TopLevelDef) {
        walk_top_level(self, def);
    }

    fn visit_fn_def(&mut self, f: &FnDef) {
        walk_fn_def(self, f);
    }

    fn visit_class_def(&mut self, c: &ClassDef) {
        walk_class_def(self, c);
    }

    fn visit_import_def(&mut self, _i: &ImportDef) {}

    fn visit_var_decl(&mut self, v: &VarDecl) {
        walk_var_decl(self, v);
    }

    fn visit_stmt(&mut self, s: &Stmt) {
        walk_stmt(self, s);
    }

    fn visit_expr(&mut self, e: &Expr) {
        walk_expr(self, e);
    }
}

pub fn walk_root<V: Visitor + ?Sized>(v: &mut V, root: &Root) {
    for def in &root.defs {
        v.visit_top_level(def);
    }
}

pub fn walk_top_level<V: Visitor + ?Sized>(v: &mut V, def: &TopLevelDef) {
    match def {
        TopLevelDef::Fn(f) => v.visit_fn_def(f),
        TopLevelDef::Class(c) => v.visit_class_def(c),
        TopLevelDef::Import(i) => v.visit_import_def(i),
    }
}

pub fn walk_fn_def<V: Visitor + ?Sized>(v: &mut V, f: &FnDef) {
    for p in &f.params {
        // Parameters have no initializer to visit; nothing to recurse into
        // beyond their declared type, which isn't itself an `Expr`/`Stmt`.
        let _ = p;
    }
    v.visit_stmt(&f.body);
}

pub fn walk_class_def<V: Visitor + ?Sized>(v: &mut V, c: &ClassDef) {
    for m in &c.members {
        v.visit_var_decl(m);
    }
    for m in &c.methods {
        v.visit_fn_def(m);
    }
}

pub fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, decl: &VarDecl) {
    if let Some(init) = &decl.init {
        v.visit_expr(init);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Compound(stmts) => {
            for s in stmts {
                v.visit_stmt(s);
            }
        }
        StmtKind::Decl(decl) => v.visit_var_decl(decl),
        StmtKind::Expr(e) => v.visit_expr(e),
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            v.visit_expr(cond);
            v.visit_stmt(then_branch);
            if let Some(e) = else_branch {
                v.visit_stmt(e);
            }
        }
        StmtKind::While { cond, body } => {
            v.visit_expr(cond);
            v.visit_stmt(body);
        }
        StmtKind::Return(value) => {
            if let Some(e) = value {
                v.visit_expr(e);
            }
        }
        StmtKind::IncDec { target, .. } => v.visit_expr(target),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::IntLit { .. }
        | ExprKind::FloatLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::StrLit(_)
        | ExprKind::NullLit
        | ExprKind::UninitLit
        | ExprKind::RefExpr { .. }
        | ExprKind::SelfExpr { .. } => {}
        ExprKind::ParenExpr(inner) => v.visit_expr(inner),
        ExprKind::UnaryOp { operand, .. } => v.visit_expr(operand),
        ExprKind::BinOp { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::CallExpr { callee, args } => {
            v.visit_expr(callee);
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::CastExpr { expr, .. } => v.visit_expr(expr),
        ExprKind::CoercionExpr { expr, .. } => v.visit_expr(expr),
        ExprKind::AccessExpr { outer, .. } => v.visit_expr(outer),
        ExprKind::MemberAccess { instance, .. } => v.visit_expr(instance),
        ExprKind::MethodCall { instance, args, .. } => {
            v.visit_expr(instance);
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::ConstructExpr { inits, .. } => {
            for (_, e) in inits {
                v.visit_expr(e);
            }
        }
        ExprKind::ArrayLit { elements } => {
            for e in elements {
                v.visit_expr(e);
            }
        }
        ExprKind::ArraySubscript { target, index } => {
            v.visit_expr(target);
            v.visit_expr(index);
        }
        ExprKind::ArraySlice { target, start, end } => {
            v.visit_expr(target);
            v.visit_expr(start);
            v.visit_expr(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOpKind, NodeIdGen};
    use crate::lexer::Span;

    #[derive(Default)]
    struct RefCounter(usize);

    impl Visitor for RefCounter {
        fn visit_expr(&mut self, e: &Expr) {
            if matches!(e.kind, ExprKind::RefExpr { .. }) {
                self.0 += 1;
            }
            walk_expr(self, e);
        }
    }

    #[test]
    fn counts_nested_refs() {
        let mut ids = NodeIdGen::new();
        let a = Expr::new(
            ids.next(),
            Span::default(),
            ExprKind::RefExpr {
                name: "a".into(),
                resolved: None,
            },
        );
        let b = Expr::new(
            ids.next(),
            Span::default(),
            ExprKind::RefExpr {
                name: "b".into(),
                resolved: None,
            },
        );
        let sum = Expr::new(
            ids.next(),
            Span::default(),
            ExprKind::BinOp {
                op: BinOpKind::Add,
                lhs: Box::new(a),
                rhs: Box::new(b),
            },
        );
        let mut counter = RefCounter::default();
        counter.visit_expr(&sum);
        assert_eq!(counter.0, 2);
    }
}

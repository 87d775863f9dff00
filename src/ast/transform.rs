//! Rewriting traversal (spec §3.2 "transformer").
//!
//! Same dispatch shape as [`super::visit`], but each method takes the node
//! by value and returns its replacement. The default implementation
//! transforms children and reconstructs the same kind of node; overriding
//! `transform_expr` for `AccessExpr` (as `sema::resolve` does) is how
//! `outer.inner` becomes `MemberAccess`, `MethodCall`, or a bare `RefExpr`
//! once name resolution knows which it is.

use super::{ClassDef, Expr, ExprKind, FnDef, Root, Stmt, StmtKind, TopLevelDef, VarDecl};

pub trait Transformer {
    fn transform_root(&mut self, root: Root) -> Root {
        walk_root(self, root)
    }

    fn transform_top_level(&mut self, def: TopLevelDef) -> TopLevelDef {
        walk_top_level(self, def)
    }

    fn transform_fn_def(&mut self, f: FnDef) -> FnDef {
        walk_fn_def(self, f)
    }

    fn transform_class_def(&mut self, c: ClassDef) -> ClassDef {
        walk_class_def(self, c)
    }

    fn transform_var_decl(&mut self, v: VarDecl) -> VarDecl {
        walk_var_decl(self, v)
    }

    fn transform_stmt(&mut self, s: Stmt) -> Stmt {
        walk_stmt(self, s)
    }

    fn transform_expr(&mut self, e: Expr) -> Expr {
        walk_expr(self, e)
    }
}

pub fn walk_root<T: Transformer + ?Sized>(t: &mut T, root: Root) -> Root {
    Root {
        file: root.file,
        defs: root
            .defs
            .into_iter()
            .map(|d| t.transform_top_level(d))
            .collect(),
    }
}

pub fn walk_top_level<T: Transformer + ?Sized>(t: &mut T, def: TopLevelDef) -> TopLevelDef {
    match def {
        TopLevelDef::Fn(f) => {
            let inner = std::rc::Rc::try_unwrap(f).unwrap_or_else(|rc| (*rc).clone());
            TopLevelDef::Fn(std::rc::Rc::new(t.transform_fn_def(inner)))
        }
        TopLevelDef::Class(c) => TopLevelDef::Class(t.transform_class_def(c)),
        TopLevelDef::Import(i) => TopLevelDef::Import(i),
    }
}

pub fn walk_fn_def<T: Transformer + ?Sized>(t: &mut T, f: FnDef) -> FnDef {
    FnDef {
        body: t.transform_stmt(f.body),
        ..f
    }
}

pub fn walk_class_def<T: Transformer + ?Sized>(t: &mut T, c: ClassDef) -> ClassDef {
    ClassDef {
        members: c
            .members
            .into_iter()
            .map(|m| t.transform_var_decl(m))
            .collect(),
        methods: c
            .methods
            .into_iter()
            .map(|m| t.transform_fn_def(m))
            .collect(),
        ..c
    }
}

pub fn walk_var_decl<T: Transformer + ?Sized>(t: &mut T, decl: VarDecl) -> VarDecl {
    VarDecl {
        init: decl.init.map(|e| t.transform_expr(e)),
        ..decl
    }
}

pub fn walk_stmt<T: Transformer + ?Sized>(t: &mut T, stmt: Stmt) -> Stmt {
    let kind = match stmt.kind {
        StmtKind::Compound(stmts) => {
            StmtKind::Compound(stmts.into_iter().map(|s| t.transform_stmt(s)).collect())
        }
        StmtKind::Decl(decl) => StmtKind::Decl(t.transform_var_decl(decl)),
        StmtKind::Expr(e) => StmtKind::Expr(t.transform_expr(e)),
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => StmtKind::If {
            cond: t.transform_expr(cond),
            then_branch: Box::new(t.transform_stmt(*then_branch)),
            else_branch: else_branch.map(|e| Box::new(t.transform_stmt(*e))),
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond: t.transform_expr(cond),
            body: Box::new(t.transform_stmt(*body)),
        },
        StmtKind::Return(value) => StmtKind::Return(value.map(|e| t.transform_expr(e))),
        StmtKind::IncDec {
            target,
            is_increment,
        } => StmtKind::IncDec {
            target: t.transform_expr(target),
            is_increment,
        },
    };
    Stmt { kind, ..stmt }
}

pub fn walk_expr<T: Transformer + ?Sized>(t: &mut T, expr: Expr) -> Expr {
    let kind = match expr.kind {
        k @ (ExprKind::IntLit { .. }
        | ExprKind::FloatLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::StrLit(_)
        | ExprKind::NullLit
        | ExprKind::UninitLit
        | ExprKind::RefExpr { .. }
        | ExprKind::SelfExpr { .. }) => k,
        ExprKind::ParenExpr(inner) => ExprKind::ParenExpr(Box::new(t.transform_expr(*inner))),
        ExprKind::UnaryOp { op, operand } => ExprKind::UnaryOp {
            op,
            operand: Box::new(t.transform_expr(*operand)),
        },
        ExprKind::BinOp { op, lhs, rhs } => ExprKind::BinOp {
            op,
            lhs: Box::new(t.transform_expr(*lhs)),
            rhs: Box::new(t.transform_expr(*rhs)),
        },
        ExprKind::CallExpr { callee, args } => ExprKind::CallExpr {
            callee: Box::new(t.transform_expr(*callee)),
            args: args.into_iter().map(|a| t.transform_expr(a)).collect(),
        },
        ExprKind::CastExpr { expr, target } => ExprKind::CastExpr {
            expr: Box::new(t.transform_expr(*expr)),
            target,
        },
        ExprKind::CoercionExpr { expr, kind } => ExprKind::CoercionExpr {
            expr: Box::new(t.transform_expr(*expr)),
            kind,
        },
        ExprKind::AccessExpr { outer, inner } => ExprKind::AccessExpr {
            outer: Box::new(t.transform_expr(*outer)),
            inner,
        },
        ExprKind::MemberAccess {
            instance,
            member,
            symbol,
        } => ExprKind::MemberAccess {
            instance: Box::new(t.transform_expr(*instance)),
            member,
            symbol,
        },
        ExprKind::MethodCall {
            instance,
            method,
            args,
            symbol,
            is_builtin,
        } => ExprKind::MethodCall {
            instance: Box::new(t.transform_expr(*instance)),
            method,
            args: args.into_iter().map(|a| t.transform_expr(a)).collect(),
            symbol,
            is_builtin,
        },
        ExprKind::ConstructExpr { class, inits } => ExprKind::ConstructExpr {
            class,
            inits: inits
                .into_iter()
                .map(|(n, e)| (n, t.transform_expr(e)))
                .collect(),
        },
        ExprKind::ArrayLit { elements } => ExprKind::ArrayLit {
            elements: elements.into_iter().map(|e| t.transform_expr(e)).collect(),
        },
        ExprKind::ArraySubscript { target, index } => ExprKind::ArraySubscript {
            target: Box::new(t.transform_expr(*target)),
            index: Box::new(t.transform_expr(*index)),
        },
        ExprKind::ArraySlice { target, start, end } => ExprKind::ArraySlice {
            target: Box::new(t.transform_expr(*target)),
            start: Box::new(t.transform_expr(*start)),
            end: Box::new(t.transform_expr(*end)),
        },
    };
    Expr { kind, ..expr }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeIdGen;
    use crate::lexer::Span;

    struct AccessToMember;

    impl Transformer for AccessToMember {
        fn transform_expr(&mut self, e: Expr) -> Expr {
            let e = walk_expr(self, e);
            match e.kind {
                ExprKind::AccessExpr { outer, inner } => Expr {
                    kind: ExprKind::MemberAccess {
                        instance: outer,
                        member: inner,
                        symbol: None,
                    },
                    ..e
                },
                _ => e,
            }
        }
    }

    #[test]
    fn rewrites_access_expr_into_member_access() {
        let mut ids = NodeIdGen::new();
        let outer = Expr::new(
            ids.next(),
            Span::default(),
            ExprKind::RefExpr {
                name: "obj".into(),
                resolved: None,
            },
        );
        let access = Expr::new(
            ids.next(),
            Span::default(),
            ExprKind::AccessExpr {
                outer: Box::new(outer),
                inner: "field".into(),
            },
        );
        let mut xf = AccessToMember;
        let result = xf.transform_expr(access);
        assert!(matches!(result.kind, ExprKind::MemberAccess { .. }));
    }
}

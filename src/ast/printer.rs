//! Indented-outline printer and one-line presenter (SPEC_FULL.md §4,
//! grounded on `original_source/src/ast/util/{printer,presenter}.c`).
//!
//! `Printer::print_root` is deterministic: formatting the same `Root` twice
//! produces byte-identical output (testable property P2).

use std::fmt::Write;

use super::{ClassDef, Expr, ExprKind, FnDef, Root, Stmt, StmtKind, TopLevelDef, VarDecl};

pub struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    pub fn print_root(root: &Root) -> String {
        let mut p = Printer::new();
        p.root(root);
        p.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn root(&mut self, root: &Root) {
        self.line(&format!("Root {}", root.file));
        self.indented(|p| {
            for def in &root.defs {
                p.top_level(def);
            }
        });
    }

    fn top_level(&mut self, def: &TopLevelDef) {
        match def {
            TopLevelDef::Fn(f) => self.fn_def(f),
            TopLevelDef::Class(c) => self.class_def(c),
            TopLevelDef::Import(i) => {
                self.line(&format!("Import {}.{}", i.namespace, i.module));
            }
        }
    }

    fn fn_def(&mut self, f: &FnDef) {
        self.line(&format!(
            "FnDef {}({}){}{}",
            f.name,
            f.params
                .iter()
                .map(|p| p.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
            if f.exported { " export" } else { "" },
            if f.extern_abi.is_some() { " extern" } else { "" },
        ));
        self.indented(|p| p.stmt(&f.body));
    }

    fn class_def(&mut self, c: &ClassDef) {
        self.line(&format!("ClassDef {}", c.name));
        self.indented(|p| {
            for m in &c.members {
                p.var_decl(m);
            }
            for m in &c.methods {
                p.fn_def(m);
            }
        });
    }

    fn var_decl(&mut self, v: &VarDecl) {
        self.line(&format!("VarDecl {}", v.name));
        if let Some(init) = &v.init {
            self.indented(|p| p.expr(init));
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Compound(stmts) => {
                self.line("Compound");
                self.indented(|p| {
                    for s in stmts {
                        p.stmt(s);
                    }
                });
            }
            StmtKind::Decl(v) => self.var_decl(v),
            StmtKind::Expr(e) => self.expr(e),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.line("If");
                self.indented(|p| {
                    p.expr(cond);
                    p.stmt(then_branch);
                    if let Some(e) = else_branch {
                        p.stmt(e);
                    }
                });
            }
            StmtKind::While { cond, body } => {
                self.line("While");
                self.indented(|p| {
                    p.expr(cond);
                    p.stmt(body);
                });
            }
            StmtKind::Return(value) => {
                self.line("Return");
                if let Some(e) = value {
                    self.indented(|p| p.expr(e));
                }
            }
            StmtKind::IncDec {
                target,
                is_increment,
            } => {
                self.line(if *is_increment { "Inc" } else { "Dec" });
                self.indented(|p| p.expr(target));
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        self.line(&present(expr));
        match &expr.kind {
            ExprKind::ParenExpr(inner)
            | ExprKind::UnaryOp { operand: inner, .. }
            | ExprKind::CastExpr { expr: inner, .. }
            | ExprKind::CoercionExpr { expr: inner, .. }
            | ExprKind::AccessExpr { outer: inner, .. }
            | ExprKind::MemberAccess {
                instance: inner, ..
            } => self.indented(|p| p.expr(inner)),
            ExprKind::BinOp { lhs, rhs, .. } => self.indented(|p| {
                p.expr(lhs);
                p.expr(rhs);
            }),
            ExprKind::CallExpr { callee, args } => self.indented(|p| {
                p.expr(callee);
                for a in args {
                    p.expr(a);
                }
            }),
            ExprKind::MethodCall { instance, args, .. } => self.indented(|p| {
                p.expr(instance);
                for a in args {
                    p.expr(a);
                }
            }),
            ExprKind::ConstructExpr { inits, .. } => self.indented(|p| {
                for (_, e) in inits {
                    p.expr(e);
                }
            }),
            ExprKind::ArrayLit { elements } => self.indented(|p| {
                for e in elements {
                    p.expr(e);
                }
            }),
            ExprKind::ArraySubscript { target, index } => self.indented(|p| {
                p.expr(target);
                p.expr(index);
            }),
            ExprKind::ArraySlice { target, start, end } => self.indented(|p| {
                p.expr(target);
                p.expr(start);
                p.expr(end);
            }),
            _ => {}
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-line rendering of one node, used by the printer and available
/// standalone for the code generator to annotate its output.
pub fn present(expr: &Expr) -> String {
    let mut s = String::new();
    match &expr.kind {
        ExprKind::IntLit {
            magnitude,
            negative,
            suffix,
        } => {
            let _ = write!(
                s,
                "IntLit {}{}{}",
                if *negative { "-" } else { "" },
                magnitude,
                suffix.as_deref().unwrap_or("")
            );
        }
        ExprKind::FloatLit(v) => {
            let _ = write!(s, "FloatLit {v}");
        }
        ExprKind::BoolLit(v) => {
            let _ = write!(s, "BoolLit {v}");
        }
        ExprKind::StrLit(v) => {
            let _ = write!(s, "StrLit {v:?}");
        }
        ExprKind::NullLit => s.push_str("NullLit"),
        ExprKind::UninitLit => s.push_str("UninitLit"),
        ExprKind::RefExpr { name, .. } => {
            let _ = write!(s, "RefExpr {name}");
        }
        ExprKind::SelfExpr { .. } => s.push_str("SelfExpr"),
        ExprKind::ParenExpr(_) => s.push_str("ParenExpr"),
        ExprKind::UnaryOp { op, .. } => {
            let _ = write!(s, "UnaryOp {op:?}");
        }
        ExprKind::BinOp { op, .. } => {
            let _ = write!(s, "BinOp {op:?}");
        }
        ExprKind::CallExpr { .. } => s.push_str("CallExpr"),
        ExprKind::CastExpr { target, .. } => {
            let _ = write!(s, "CastExpr as {target:?}");
        }
        ExprKind::CoercionExpr { kind, .. } => {
            let _ = write!(s, "CoercionExpr {kind:?}");
        }
        ExprKind::AccessExpr { inner, .. } => {
            let _ = write!(s, "AccessExpr .{inner}");
        }
        ExprKind::MemberAccess { member, .. } => {
            let _ = write!(s, "MemberAccess .{member}");
        }
        ExprKind::MethodCall { method, .. } => {
            let _ = write!(s, "MethodCall .{method}()");
        }
        ExprKind::ConstructExpr { .. } => s.push_str("ConstructExpr"),
        ExprKind::ArrayLit { .. } => s.push_str("ArrayLit"),
        ExprKind::ArraySubscript { .. } => s.push_str("ArraySubscript"),
        ExprKind::ArraySlice { .. } => s.push_str("ArraySlice"),
    }
    if let Some(ty) = &expr.ty {
        let _ = write!(s, " : {ty}");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeIdGen;
    use crate::lexer::Span;

    #[test]
    fn printing_is_deterministic() {
        let root = Root {
            file: "test.shiro".into(),
            defs: vec![],
        };
        assert_eq!(Printer::print_root(&root), Printer::print_root(&root));
    }

    #[test]
    fn presents_int_lit_with_suffix() {
        let mut ids = NodeIdGen::new();
        let e = Expr::new(
            ids.next(),
            Span::default(),
            ExprKind::IntLit {
                magnitude: 256,
                negative: false,
                suffix: Some("u8".into()),
            },
        );
        assert_eq!(present(&e), "IntLit 256u8");
    }
}

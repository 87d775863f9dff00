//! Type-expression parsing (spec §3.2 `TypeExpr`, grounded in
//! `original_source/src/tests/ut/parser/test_parser_{pointers,arrays}.c`):
//! postfix pointers (`T*`, `T**`), `[T, N]` fixed arrays, `[T]` heap arrays,
//! `view[T]` views, and `Name<T1, T2>` generic user types.
//!
//! Every function here is "soft": on a structural mismatch it returns `None`
//! without pushing a diagnostic. That makes it safe to call from the
//! expression parser's speculative generics-disambiguation (a failed
//! attempt rolls the cursor back and must leave no trace), and the one
//! context that actually requires a type — a declared annotation, parameter,
//! or return type — goes through [`Parser::parse_type_expr_required`], which
//! emits a single "expected a type" diagnostic if the soft parse fails.

use super::Parser;
use crate::ast::{ArraySize, ExprKind, TypeExpr};
use crate::lexer::{Keyword, TokenKind};

impl Parser {
    pub(super) fn parse_type_expr_required(&mut self) -> TypeExpr {
        match self.parse_type_expr() {
            Some(t) => t,
            None => {
                let span = self.current_span();
                self.error(span, format!("expected a type, found {:?}", self.peek_kind()));
                TypeExpr::Invalid
            }
        }
    }

    pub(super) fn parse_type_expr(&mut self) -> Option<TypeExpr> {
        let mut ty = self.parse_type_primary()?;
        while self.eat(TokenKind::Star) {
            ty = TypeExpr::Pointer(Box::new(ty));
        }
        Some(ty)
    }

    fn parse_type_primary(&mut self) -> Option<TypeExpr> {
        match self.peek_kind()?.clone() {
            TokenKind::Keyword(kw) if kw.as_builtin().is_some() => {
                self.cursor.next();
                Some(TypeExpr::Builtin(kw.as_builtin().unwrap()))
            }
            TokenKind::Keyword(Keyword::View) => {
                self.cursor.next();
                if !self.eat(TokenKind::LBracket) {
                    return None;
                }
                let inner = self.parse_type_expr()?;
                if !self.eat(TokenKind::RBracket) {
                    return None;
                }
                Some(TypeExpr::View(Box::new(inner)))
            }
            TokenKind::Ident(name) => {
                self.cursor.next();
                let type_args = if self.at(TokenKind::Lt) {
                    self.cursor.next();
                    let mut args = Vec::new();
                    loop {
                        args.push(self.parse_type_expr()?);
                        if self.eat(TokenKind::Comma) {
                            continue;
                        }
                        break;
                    }
                    if !self.eat(TokenKind::Gt) {
                        return None;
                    }
                    args
                } else {
                    Vec::new()
                };
                Some(TypeExpr::Named { name, type_args })
            }
            TokenKind::LBracket => {
                self.cursor.next();
                let elem = self.parse_type_expr()?;
                if self.eat(TokenKind::Comma) {
                    let size_expr = self.parse_array_size_expr_soft()?;
                    if !self.eat(TokenKind::RBracket) {
                        return None;
                    }
                    Some(TypeExpr::Array(Box::new(elem), ArraySize::Expr(Box::new(size_expr))))
                } else {
                    if !self.eat(TokenKind::RBracket) {
                        return None;
                    }
                    Some(TypeExpr::HeapArray(Box::new(elem)))
                }
            }
            _ => None,
        }
    }

    /// The array-size sub-language resolved later by
    /// `sema::templates::resolve_array_sizes`: integer literals, references
    /// to const template type-parameters, and `+ - * /` between them. Never
    /// emits a diagnostic — an unrecognized token here just means "not an
    /// array type", handled by the (possibly-speculative) caller.
    fn parse_array_size_expr_soft(&mut self) -> Option<crate::ast::Expr> {
        self.parse_array_size_additive()
    }

    fn parse_array_size_additive(&mut self) -> Option<crate::ast::Expr> {
        use crate::ast::{BinOpKind, Expr};
        let mut lhs = self.parse_array_size_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOpKind::Add,
                Some(TokenKind::Minus) => BinOpKind::Sub,
                _ => break,
            };
            let span = lhs.span;
            self.cursor.next();
            let rhs = self.parse_array_size_multiplicative()?;
            let id = self.next_id();
            lhs = Expr::new(
                id,
                span,
                ExprKind::BinOp {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            );
        }
        Some(lhs)
    }

    fn parse_array_size_multiplicative(&mut self) -> Option<crate::ast::Expr> {
        use crate::ast::{BinOpKind, Expr};
        let mut lhs = self.parse_array_size_primary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOpKind::Mul,
                Some(TokenKind::Slash) => BinOpKind::Div,
                _ => break,
            };
            let span = lhs.span;
            self.cursor.next();
            let rhs = self.parse_array_size_primary()?;
            let id = self.next_id();
            lhs = Expr::new(
                id,
                span,
                ExprKind::BinOp {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            );
        }
        Some(lhs)
    }

    fn parse_array_size_primary(&mut self) -> Option<crate::ast::Expr> {
        use crate::ast::Expr;
        let span = self.current_span();
        match self.peek_kind()?.clone() {
            TokenKind::Integer(magnitude, suffix) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(
                    id,
                    span,
                    ExprKind::IntLit {
                        magnitude,
                        negative: false,
                        suffix,
                    },
                ))
            }
            TokenKind::Ident(name) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::RefExpr { name, resolved: None }))
            }
            _ => None,
        }
    }
}

//! Pratt/precedence-climbing expression parser (spec §3.2, §4.4).
//!
//! Precedence, loosest to tightest: assignment family (right-assoc) →
//! equality (`== !=`) → relational (`< <= > >=`) → additive (`+ -`) →
//! multiplicative (`* / %`) → unary prefix (`+ - ! * & ++ --`) → postfix
//! (call / index / slice / member-access / `as`-cast), with primaries at the
//! bottom. Matches the ladder `original_source`'s precedence-climbing parser
//! implements (one priority level per token class, widest-binds-loosest).
//!
//! Generics disambiguation (`a < b` vs `Foo<T>`) happens once, at the
//! identifier primary: after an `Ident`, if a `<` follows, the parser
//! speculatively tries to parse a full type-argument list; on success (and
//! only if followed by `{` or `(`, ruling out `a < b > c`) it commits,
//! otherwise it rolls back and the bare `RefExpr` falls through to the
//! ordinary relational-precedence loop, which then parses the very same `<`
//! as a comparison operator.

use super::Parser;
use crate::ast::{BinOpKind, Expr, ExprKind, TypeExpr, UnaryOpKind};
use crate::lexer::{Keyword, TokenKind};

impl Parser {
    pub(super) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Option<Expr> {
        let lhs = self.parse_equality()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => BinOpKind::Assign,
            Some(TokenKind::PlusEq) => BinOpKind::AddAssign,
            Some(TokenKind::MinusEq) => BinOpKind::SubAssign,
            Some(TokenKind::StarEq) => BinOpKind::MulAssign,
            Some(TokenKind::SlashEq) => BinOpKind::DivAssign,
            Some(TokenKind::PercentEq) => BinOpKind::RemAssign,
            _ => return Some(lhs),
        };
        let span = lhs.span;
        self.cursor.next();
        let rhs = self.parse_assignment()?; // right-associative
        let id = self.next_id();
        Some(Expr::new(
            id,
            span,
            ExprKind::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        ))
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::EqEq) => BinOpKind::Eq,
                Some(TokenKind::BangEq) => BinOpKind::Ne,
                _ => break,
            };
            lhs = self.fold_binop(lhs, op, Self::parse_relational)?;
        }
        Some(lhs)
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Lt) => BinOpKind::Lt,
                Some(TokenKind::LtEq) => BinOpKind::Le,
                Some(TokenKind::Gt) => BinOpKind::Gt,
                Some(TokenKind::GtEq) => BinOpKind::Ge,
                _ => break,
            };
            lhs = self.fold_binop(lhs, op, Self::parse_additive)?;
        }
        Some(lhs)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOpKind::Add,
                Some(TokenKind::Minus) => BinOpKind::Sub,
                _ => break,
            };
            lhs = self.fold_binop(lhs, op, Self::parse_multiplicative)?;
        }
        Some(lhs)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOpKind::Mul,
                Some(TokenKind::Slash) => BinOpKind::Div,
                Some(TokenKind::Percent) => BinOpKind::Rem,
                _ => break,
            };
            lhs = self.fold_binop(lhs, op, Self::parse_unary)?;
        }
        Some(lhs)
    }

    /// Consume the already-peeked operator token, parse the next operand
    /// with `next_level`, and fold `lhs op rhs` left-associatively.
    fn fold_binop(&mut self, lhs: Expr, op: BinOpKind, next_level: fn(&mut Self) -> Option<Expr>) -> Option<Expr> {
        let span = lhs.span;
        self.cursor.next();
        let rhs = next_level(self)?;
        let id = self.next_id();
        Some(Expr::new(
            id,
            span,
            ExprKind::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        ))
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind() {
            Some(TokenKind::Plus) => {
                // Unary plus is a no-op; it never wraps the operand in a node.
                self.cursor.next();
                self.parse_unary()
            }
            Some(TokenKind::Minus) => self.parse_unary_minus(span),
            Some(TokenKind::Bang) => self.parse_unary_op(span, UnaryOpKind::Not),
            Some(TokenKind::Star) => self.parse_unary_op(span, UnaryOpKind::Deref),
            Some(TokenKind::Amp) => self.parse_unary_op(span, UnaryOpKind::AddrOf),
            Some(TokenKind::PlusPlus) => self.parse_unary_op(span, UnaryOpKind::PreInc),
            Some(TokenKind::MinusMinus) => self.parse_unary_op(span, UnaryOpKind::PreDec),
            _ => self.parse_postfix(),
        }
    }

    fn parse_unary_op(&mut self, span: crate::lexer::Span, op: UnaryOpKind) -> Option<Expr> {
        self.cursor.next();
        let operand = self.parse_unary()?;
        let id = self.next_id();
        Some(Expr::new(
            id,
            span,
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
        ))
    }

    /// `-1u32` is a single negative `IntLit`/`FloatLit`, not `UnaryOp(Neg,
    /// IntLit)` — needed so `i64::MIN`'s magnitude (which has no positive
    /// counterpart in 64 bits) can ever be written at all, and so the
    /// has-minus-sign range check in `sema` sees one literal, not a wrapped
    /// expression (spec's numeric-literal semantics notes).
    fn parse_unary_minus(&mut self, span: crate::lexer::Span) -> Option<Expr> {
        if let Some(next) = self.cursor.peek_n(1) {
            match next.kind.clone() {
                TokenKind::Integer(magnitude, suffix) => {
                    self.cursor.next(); // '-'
                    self.cursor.next(); // literal
                    let id = self.next_id();
                    return Some(Expr::new(
                        id,
                        span,
                        ExprKind::IntLit {
                            magnitude,
                            negative: true,
                            suffix,
                        },
                    ));
                }
                TokenKind::Float(v) => {
                    self.cursor.next();
                    self.cursor.next();
                    let id = self.next_id();
                    return Some(Expr::new(id, span, ExprKind::FloatLit(-v)));
                }
                _ => {}
            }
        }
        self.parse_unary_op(span, UnaryOpKind::Neg)
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Dot) => {
                    self.cursor.next();
                    let name = self.expect_ident()?;
                    let id = self.next_id();
                    let span = expr.span;
                    expr = Expr::new(
                        id,
                        span,
                        ExprKind::AccessExpr {
                            outer: Box::new(expr),
                            inner: name,
                        },
                    );
                }
                Some(TokenKind::LParen) => {
                    self.cursor.next();
                    let mut args = Vec::new();
                    if !self.at(TokenKind::RParen) {
                        loop {
                            args.push(self.with_struct_lit_enabled(Self::parse_expr)?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    let id = self.next_id();
                    let span = expr.span;
                    expr = Expr::new(
                        id,
                        span,
                        ExprKind::CallExpr {
                            callee: Box::new(expr),
                            args,
                        },
                    );
                }
                Some(TokenKind::LBracket) => {
                    self.cursor.next();
                    let first = self.with_struct_lit_enabled(Self::parse_expr)?;
                    let span = expr.span;
                    if self.eat(TokenKind::DotDot) {
                        let end = self.with_struct_lit_enabled(Self::parse_expr)?;
                        self.expect(TokenKind::RBracket)?;
                        let id = self.next_id();
                        expr = Expr::new(
                            id,
                            span,
                            ExprKind::ArraySlice {
                                target: Box::new(expr),
                                start: Box::new(first),
                                end: Box::new(end),
                            },
                        );
                    } else {
                        self.expect(TokenKind::RBracket)?;
                        let id = self.next_id();
                        expr = Expr::new(
                            id,
                            span,
                            ExprKind::ArraySubscript {
                                target: Box::new(expr),
                                index: Box::new(first),
                            },
                        );
                    }
                }
                Some(TokenKind::Keyword(Keyword::As)) => {
                    self.cursor.next();
                    let target = self.parse_type_expr_required();
                    let id = self.next_id();
                    let span = expr.span;
                    expr = Expr::new(
                        id,
                        span,
                        ExprKind::CastExpr {
                            expr: Box::new(expr),
                            target,
                        },
                    );
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.cursor.peek()?.clone();
        let span = token.span;
        match token.kind {
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
            TokenKind::Float(v) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::FloatLit(v)))
            }
            TokenKind::Str(s) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::StrLit(s)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::BoolLit(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::BoolLit(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::NullLit))
            }
            TokenKind::Keyword(Keyword::Uninit) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::UninitLit))
            }
            TokenKind::Keyword(Keyword::SelfKw) => {
                self.cursor.next();
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::SelfExpr { resolved: None }))
            }
            TokenKind::LParen => {
                self.cursor.next();
                let inner = self.with_struct_lit_enabled(Self::parse_expr)?;
                self.expect(TokenKind::RParen)?;
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::ParenExpr(Box::new(inner))))
            }
            TokenKind::LBracket => {
                self.cursor.next();
                let mut elements = Vec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        elements.push(self.with_struct_lit_enabled(Self::parse_expr)?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket)?;
                let id = self.next_id();
                Some(Expr::new(id, span, ExprKind::ArrayLit { elements }))
            }
            TokenKind::Ident(name) => {
                self.cursor.next();
                self.parse_ident_primary(name, span)
            }
            other => {
                self.error(span, format!("expected an expression, found {other:?}"));
                None
            }
        }
    }

    fn parse_ident_primary(&mut self, name: String, span: crate::lexer::Span) -> Option<Expr> {
        if self.struct_lit_allowed && self.at(TokenKind::LBrace) {
            return self.parse_construct_expr_body(name, Vec::new(), span);
        }
        if self.at(TokenKind::Lt) {
            if let Some(type_args) = self.try_parse_generic_args() {
                if self.struct_lit_allowed && self.at(TokenKind::LBrace) {
                    return self.parse_construct_expr_body(name, type_args, span);
                }
                // Explicit type args on a bare call (`f<T>(args)`): the AST
                // has no slot for them (see DESIGN.md — function templates
                // are instantiated from argument types during sema instead),
                // so the reference is left plain and the following `(...)`
                // is picked up by the ordinary postfix call-parsing loop.
                let id = self.next_id();
                return Some(Expr::new(id, span, ExprKind::RefExpr { name, resolved: None }));
            }
        }
        let id = self.next_id();
        Some(Expr::new(id, span, ExprKind::RefExpr { name, resolved: None }))
    }

    fn parse_construct_expr_body(&mut self, name: String, type_args: Vec<TypeExpr>, span: crate::lexer::Span) -> Option<Expr> {
        self.expect(TokenKind::LBrace)?;
        let mut inits = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.cursor.is_eof() {
            let field_name = self.expect_ident()?;
            self.expect(TokenKind::Eq)?;
            let value = self.with_struct_lit_enabled(Self::parse_expr)?;
            inits.push((field_name, value));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        let id = self.next_id();
        Some(Expr::new(
            id,
            span,
            ExprKind::ConstructExpr {
                class: TypeExpr::Named { name, type_args },
                inits,
            },
        ))
    }

    /// Speculatively attempt `'<' Type (',' Type)* '>'` followed by `{` or
    /// `(`. Never pushes a diagnostic (the inner type parse is the "soft"
    /// [`Parser::parse_type_expr`]), so a failed attempt rolls back with no
    /// trace, leaving the `<` to be reparsed as a relational operator.
    fn try_parse_generic_args(&mut self) -> Option<Vec<TypeExpr>> {
        self.cursor.enter_speculative_mode();
        if !self.eat(TokenKind::Lt) {
            self.cursor.rollback_speculation();
            return None;
        }
        let mut args = Vec::new();
        loop {
            match self.parse_type_expr() {
                Some(t) => args.push(t),
                None => {
                    self.cursor.rollback_speculation();
                    return None;
                }
            }
            if self.eat(TokenKind::Comma) {
                continue;
            }
            break;
        }
        if !self.eat(TokenKind::Gt) {
            self.cursor.rollback_speculation();
            return None;
        }
        if matches!(self.peek_kind(), Some(TokenKind::LBrace) | Some(TokenKind::LParen)) {
            self.cursor.commit_speculation();
            Some(args)
        } else {
            self.cursor.rollback_speculation();
            None
        }
    }
}

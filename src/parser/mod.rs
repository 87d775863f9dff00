//! Recursive-descent parser (spec §3.2, §4.4).
//!
//! A `Parser` owns a [`TokenCursor`] over the whole (pre-lexed) token stream,
//! a [`NodeIdGen`] so every node it builds gets a stable id, and a flat
//! [`DiagnosticList`] it accumulates into as it goes — mirroring the
//! teacher's `ParseState`/parser-combinator shape, generalized to a classic
//! hand-written recursive descent since Shiro's grammar needs the
//! speculative generics-disambiguation and statement-level error recovery
//! the teacher's combinator parser doesn't.
//!
//! This module handles top-level definitions, statements, and type
//! expressions; [`expr`] holds the Pratt expression parser built on top of
//! the same `Parser` struct.

mod expr;
mod type_expr;

use std::rc::Rc;

use crate::ast::{
    ClassDef, FnDef, ImportDef, MemberDecl, NodeId, NodeIdGen, ParamDecl, Root, Stmt, StmtKind,
    TopLevelDef, TypeParamDecl, VarDecl,
};
use crate::diagnostics::{Diagnostic, DiagnosticList};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenCursor, TokenKind};

/// Parse a whole source file into a `Root`, merging lexer and parser
/// diagnostics into one list (spec §3.4: lexing and parsing are separate
/// phases, but the driver only cares whether the combined result has
/// errors).
pub fn parse_file(file: impl Into<String>, source: &str) -> (Root, DiagnosticList) {
    let file = file.into();
    let (tokens, lex_diagnostics) = Lexer::new(source).lex();
    let mut parser = Parser::new(file.clone(), tokens);
    for d in lex_diagnostics {
        parser
            .diagnostics
            .push(Diagnostic::error(file.clone(), d.span, d.message));
    }
    let root = parser.parse_root();
    (root, parser.diagnostics)
}

pub struct Parser {
    file: String,
    cursor: TokenCursor,
    ids: NodeIdGen,
    /// `false` inside `if (...)`/`while (...)` condition heads, so `Foo {` is
    /// never mistaken for a construct-expression there; re-enabled the
    /// moment a delimiter (`(`, `[`, call args, ...) makes the parse
    /// unambiguous again.
    struct_lit_allowed: bool,
    pub diagnostics: DiagnosticList,
}

impl Parser {
    pub fn new(file: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            file: file.into(),
            cursor: TokenCursor::new(tokens),
            ids: NodeIdGen::new(),
            struct_lit_allowed: true,
            diagnostics: DiagnosticList::new(),
        }
    }

    fn next_id(&mut self) -> NodeId {
        self.ids.next()
    }

    fn error(&mut self, span: Span, msg: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(self.file.clone(), span, msg));
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.cursor.peek().map(|t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.cursor.peek().map(|t| t.span).unwrap_or_else(|| self.cursor.last_span())
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(&kind)
    }

    fn at_kw(&self, kw: Keyword) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Keyword(k)) if *k == kw)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.cursor.next();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        if self.at_kw(kw) {
            self.cursor.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind.clone()) {
            self.cursor.next()
        } else {
            let span = self.current_span();
            self.error(span, format!("expected {:?}, found {:?}", kind, self.peek_kind()));
            None
        }
    }

    fn expect_ident(&mut self) -> Option<String> {
        match self.peek_kind().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.cursor.next();
                Some(name)
            }
            other => {
                let span = self.current_span();
                self.error(span, format!("expected an identifier, found {other:?}"));
                None
            }
        }
    }

    fn with_struct_lit_enabled<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let prev = self.struct_lit_allowed;
        self.struct_lit_allowed = true;
        let result = f(self);
        self.struct_lit_allowed = prev;
        result
    }

    fn with_struct_lit_disabled<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let prev = self.struct_lit_allowed;
        self.struct_lit_allowed = false;
        let result = f(self);
        self.struct_lit_allowed = prev;
        result
    }

    /// Skip tokens until one that plausibly starts a new top-level
    /// definition, so one malformed `fn`/`class` doesn't poison the rest of
    /// the file (spec §4.4 "Error recovery").
    fn synchronize_top_level(&mut self) {
        while !self.cursor.is_eof() {
            if matches!(
                self.peek_kind(),
                Some(TokenKind::Keyword(
                    Keyword::Fn | Keyword::Class | Keyword::Import | Keyword::Export | Keyword::Extern
                ))
            ) {
                return;
            }
            self.cursor.next();
        }
    }

    /// Skip to the statement-terminating `;` (consuming it) or a `}` that
    /// closes the enclosing block (left for the caller to consume).
    fn synchronize_stmt(&mut self) {
        while !self.cursor.is_eof() {
            match self.peek_kind() {
                Some(TokenKind::Semi) => {
                    self.cursor.next();
                    return;
                }
                Some(TokenKind::RBrace) => return,
                _ => {
                    self.cursor.next();
                }
            }
        }
    }

    pub fn parse_root(&mut self) -> Root {
        let mut defs = Vec::new();
        let mut seen_non_import = false;
        while !self.cursor.is_eof() {
            match self.parse_top_level_def(&mut seen_non_import) {
                Some(def) => defs.push(def),
                None => self.synchronize_top_level(),
            }
        }
        Root {
            file: self.file.clone(),
            defs,
        }
    }

    fn parse_top_level_def(&mut self, seen_non_import: &mut bool) -> Option<TopLevelDef> {
        let exported = self.eat_kw(Keyword::Export);

        if self.at_kw(Keyword::Extern) {
            self.cursor.next();
            let abi = match self.peek_kind().cloned() {
                Some(TokenKind::Str(s)) => {
                    self.cursor.next();
                    s
                }
                _ => String::new(),
            };
            if !self.at_kw(Keyword::Fn) {
                let span = self.current_span();
                self.error(span, "expected 'fn' after 'extern'");
                return None;
            }
            *seen_non_import = true;
            let f = self.parse_fn_def(exported, Some(abi))?;
            return Some(TopLevelDef::Fn(Rc::new(f)));
        }

        if self.at_kw(Keyword::Import) {
            if *seen_non_import {
                let span = self.current_span();
                self.error(span, "import declarations must appear before any other definition");
            }
            let import = self.parse_import_def()?;
            return Some(TopLevelDef::Import(import));
        }

        if self.at_kw(Keyword::Fn) {
            *seen_non_import = true;
            let f = self.parse_fn_def(exported, None)?;
            return Some(TopLevelDef::Fn(Rc::new(f)));
        }

        if self.at_kw(Keyword::Class) {
            *seen_non_import = true;
            let c = self.parse_class_def(exported)?;
            return Some(TopLevelDef::Class(c));
        }

        let span = self.current_span();
        self.error(
            span,
            format!("expected a top-level definition, found {:?}", self.peek_kind()),
        );
        None
    }

    fn parse_import_def(&mut self) -> Option<ImportDef> {
        let span = self.current_span();
        self.cursor.next(); // 'import'
        let namespace = self.expect_ident()?;
        self.expect(TokenKind::Dot)?;
        let module = self.expect_ident()?;
        self.expect(TokenKind::Semi)?;
        Some(ImportDef {
            id: self.next_id(),
            span,
            namespace,
            module,
        })
    }

    fn parse_optional_type_params(&mut self) -> Vec<TypeParamDecl> {
        let mut params = Vec::new();
        if !self.eat(TokenKind::Lt) {
            return params;
        }
        loop {
            let span = self.current_span();
            match self.expect_ident() {
                Some(name) => params.push(TypeParamDecl {
                    id: self.next_id(),
                    span,
                    name,
                    symbol: None,
                }),
                None => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt);
        params
    }

    fn parse_param_list(&mut self) -> Vec<ParamDecl> {
        let mut params = Vec::new();
        if self.at(TokenKind::RParen) {
            return params;
        }
        loop {
            let span = self.current_span();
            let Some(name) = self.expect_ident() else {
                break;
            };
            if self.expect(TokenKind::Colon).is_none() {
                break;
            }
            let type_expr = self.parse_type_expr_required();
            params.push(ParamDecl {
                id: self.next_id(),
                span,
                name,
                type_expr,
                symbol: None,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        params
    }

    fn parse_fn_def(&mut self, exported: bool, extern_abi: Option<String>) -> Option<FnDef> {
        let span = self.current_span();
        self.cursor.next(); // 'fn'
        let name = self.expect_ident()?;
        let type_params = self.parse_optional_type_params();
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list();
        self.expect(TokenKind::RParen)?;
        let return_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type_expr_required())
        } else {
            None
        };
        let body = if extern_abi.is_some() && self.at(TokenKind::Semi) {
            self.cursor.next();
            Stmt::new(self.next_id(), span, StmtKind::Compound(vec![]))
        } else {
            self.parse_compound_stmt()?
        };
        Some(FnDef {
            id: self.next_id(),
            span,
            name,
            params,
            return_type,
            body,
            type_params,
            exported,
            extern_abi,
            symbol: None,
        })
    }

    fn parse_member_decl(&mut self) -> Option<MemberDecl> {
        let span = self.current_span();
        self.cursor.next(); // 'var'
        let name = self.expect_ident()?;
        let type_expr = if self.eat(TokenKind::Colon) {
            Some(self.parse_type_expr_required())
        } else {
            None
        };
        let init = if self.eat(TokenKind::Eq) {
            Some(self.with_struct_lit_enabled(Self::parse_expr)?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;
        Some(VarDecl {
            id: self.next_id(),
            span,
            name,
            type_expr,
            init,
            symbol: None,
        })
    }

    fn parse_class_def(&mut self, exported: bool) -> Option<ClassDef> {
        let span = self.current_span();
        self.cursor.next(); // 'class'
        let name = self.expect_ident()?;
        let type_params = self.parse_optional_type_params();
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        let mut methods = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.cursor.is_eof() {
            if self.at_kw(Keyword::Var) {
                match self.parse_member_decl() {
                    Some(m) => members.push(m),
                    None => self.synchronize_stmt(),
                }
            } else if self.at_kw(Keyword::Fn) {
                match self.parse_fn_def(false, None) {
                    Some(m) => methods.push(m),
                    None => self.synchronize_stmt(),
                }
            } else {
                let span = self.current_span();
                self.error(span, format!("expected a class member, found {:?}", self.peek_kind()));
                self.synchronize_stmt();
            }
        }
        self.expect(TokenKind::RBrace)?;
        Some(ClassDef {
            id: self.next_id(),
            span,
            name,
            members,
            methods,
            type_params,
            exported,
            symbol: None,
        })
    }

    fn parse_compound_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.cursor.is_eof() {
            match self.parse_stmt() {
                Some(s) => stmts.push(s),
                None => self.synchronize_stmt(),
            }
        }
        self.expect(TokenKind::RBrace)?;
        Some(Stmt::new(self.next_id(), span, StmtKind::Compound(stmts)))
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        if self.at(TokenKind::LBrace) {
            return self.parse_compound_stmt();
        }
        if self.at_kw(Keyword::Var) {
            return self.parse_var_decl_stmt();
        }
        if self.at_kw(Keyword::If) {
            return self.parse_if_stmt();
        }
        if self.at_kw(Keyword::While) {
            return self.parse_while_stmt();
        }
        if self.at_kw(Keyword::Return) {
            return self.parse_return_stmt();
        }
        self.parse_expr_or_incdec_stmt()
    }

    fn parse_var_decl_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.cursor.next(); // 'var'
        let name = self.expect_ident()?;
        let type_expr = if self.eat(TokenKind::Colon) {
            Some(self.parse_type_expr_required())
        } else {
            None
        };
        let init = if self.eat(TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;
        let decl = VarDecl {
            id: self.next_id(),
            span,
            name,
            type_expr,
            init,
            symbol: None,
        };
        Some(Stmt::new(self.next_id(), span, StmtKind::Decl(decl)))
    }

    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.cursor.next(); // 'if'
        self.expect(TokenKind::LParen)?;
        let cond = self.with_struct_lit_disabled(Self::parse_expr)?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.eat_kw(Keyword::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Some(Stmt::new(
            self.next_id(),
            span,
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
        ))
    }

    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.cursor.next(); // 'while'
        self.expect(TokenKind::LParen)?;
        let cond = self.with_struct_lit_disabled(Self::parse_expr)?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Some(Stmt::new(self.next_id(), span, StmtKind::While { cond, body }))
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.cursor.next(); // 'return'
        let value = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi)?;
        Some(Stmt::new(self.next_id(), span, StmtKind::Return(value)))
    }

    fn parse_expr_or_incdec_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        let target = self.parse_expr()?;
        if self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus) {
            let is_increment = self.at(TokenKind::PlusPlus);
            self.cursor.next();
            self.expect(TokenKind::Semi)?;
            return Some(Stmt::new(
                self.next_id(),
                span,
                StmtKind::IncDec { target, is_increment },
            ));
        }
        self.expect(TokenKind::Semi)?;
        Some(Stmt::new(self.next_id(), span, StmtKind::Expr(target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, TypeExpr};
    use crate::types::Builtin;

    fn parse_ok(src: &str) -> Root {
        let (root, diagnostics) = parse_file("t.shiro", src);
        assert!(
            diagnostics.succeeded(),
            "expected no errors, got: {:?}",
            diagnostics.iter().collect::<Vec<_>>()
        );
        root
    }

    #[test]
    fn parses_empty_fn() {
        let root = parse_ok("fn main() { }");
        assert_eq!(root.defs.len(), 1);
        assert!(matches!(&root.defs[0], TopLevelDef::Fn(_)));
    }

    #[test]
    fn parses_fn_with_params_and_return_type() {
        let root = parse_ok("fn add(a: i32, b: i32) -> i32 { return a + b; }");
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.return_type, Some(TypeExpr::Builtin(Builtin::I32)));
    }

    #[test]
    fn parses_pointer_and_array_types() {
        let root = parse_ok("fn f(a: i32*, b: [i32, 4], c: []i32, d: view[i32]) { }");
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        assert!(matches!(f.params[0].type_expr, TypeExpr::Pointer(_)));
        assert!(matches!(f.params[1].type_expr, TypeExpr::Array(_, _)));
        assert!(matches!(f.params[2].type_expr, TypeExpr::HeapArray(_)));
        assert!(matches!(f.params[3].type_expr, TypeExpr::View(_)));
    }

    #[test]
    fn parses_class_with_members_and_methods() {
        let root = parse_ok(
            r#"
            class Pair<T, U> {
                var first: T;
                var second: U;

                fn swap(self) { }
            }
            "#,
        );
        let TopLevelDef::Class(c) = &root.defs[0] else {
            panic!("expected class")
        };
        assert_eq!(c.type_params.len(), 2);
        assert_eq!(c.members.len(), 2);
        assert_eq!(c.methods.len(), 1);
    }

    #[test]
    fn generic_instantiation_disambiguated_from_comparison() {
        let root = parse_ok("fn f() { var x = Pair<i32, i32> { first = 1, second = 2 }; }");
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        let StmtKind::Compound(stmts) = &f.body.kind else {
            panic!()
        };
        let StmtKind::Decl(decl) = &stmts[0].kind else {
            panic!()
        };
        let init = decl.init.as_ref().unwrap();
        assert!(matches!(init.kind, ExprKind::ConstructExpr { .. }));
    }

    #[test]
    fn less_than_stays_a_comparison_when_generics_dont_fit() {
        let root = parse_ok("fn f(a: i32, b: i32) -> bool { return a < b; }");
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        let StmtKind::Compound(stmts) = &f.body.kind else {
            panic!()
        };
        let StmtKind::Return(Some(e)) = &stmts[0].kind else {
            panic!()
        };
        assert!(matches!(
            e.kind,
            ExprKind::BinOp {
                op: crate::ast::BinOpKind::Lt,
                ..
            }
        ));
    }

    #[test]
    fn no_struct_literal_inside_if_condition() {
        let root = parse_ok("fn f(x: i32) -> bool { if (x < 1) { return true; } return false; }");
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        let StmtKind::Compound(stmts) = &f.body.kind else {
            panic!()
        };
        assert!(matches!(stmts[0].kind, StmtKind::If { .. }));
    }

    #[test]
    fn extern_fn_has_no_body() {
        let root = parse_ok(r#"extern "C" fn puts(s: string) -> i32;"#);
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        assert_eq!(f.extern_abi.as_deref(), Some("C"));
        assert!(matches!(&f.body.kind, StmtKind::Compound(v) if v.is_empty()));
    }

    #[test]
    fn recovers_after_malformed_top_level_item() {
        let (root, diagnostics) = parse_file("t.shiro", "fn ( ) { } fn good() { }");
        assert!(diagnostics.has_errors());
        assert_eq!(root.defs.len(), 1);
        let TopLevelDef::Fn(f) = &root.defs[0] else {
            panic!("expected fn")
        };
        assert_eq!(f.name, "good");
    }
}

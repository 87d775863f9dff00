//! Semantic analyzer (spec §4.5): declaration collection, name/type
//! resolution, definite-assignment analysis, and template instantiation.
//!
//! Mirrors the teacher's `Typechecker` (`typechecker/mod.rs`) in spirit — a
//! struct holding onto shared state while a family of `check_*` methods
//! walks the tree and returns an elaborated copy — but the teacher's
//! checker is a single untyped pass over an already-parsed AST with a
//! single `TypeScope`. Shiro needs two passes (names must all exist before
//! any of them can be type-checked, since classes and functions may
//! forward-reference each other) plus template instantiation, so the state
//! that used to live on `Typechecker` directly is split across
//! `SemanticContext` (owns the arenas, long-lived across modules) and the
//! per-pass helpers in [`collect`], [`resolve`], [`definite_assign`], and
//! [`templates`].

pub mod collect;
pub mod definite_assign;
pub mod resolve;
pub mod templates;

use std::collections::HashMap;

use crate::ast::{NodeId, Root};
use crate::diagnostics::{Diagnostic, DiagnosticList};
use crate::lexer::Span;
use crate::symbol::{ScopeId, ScopeKind, SymbolTable};
use crate::types::{Builtin, Type, TypeInterner};

/// A builtin method's signature, e.g. `[T, N].len() -> usize`. These never
/// go through [`SymbolTable::declare`] — they aren't declared anywhere in
/// source, so they have no `Symbol`/`SymbolId` of their own; `resolve`
/// stamps `MethodCall::is_builtin = true` instead of a symbol reference.
pub struct BuiltinMethodSig {
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Owns every arena a compilation run needs: the type interner, the symbol
/// table, and the accumulated diagnostics. One `SemanticContext` is created
/// per [`crate::driver::Builder`] run and threaded through every module, so
/// that types and symbols declared in one module compare equal (by `Rc`
/// identity) against uses of them in a dependent module.
pub struct SemanticContext {
    pub interner: TypeInterner,
    pub symbols: SymbolTable,
    pub global: ScopeId,
    pub diagnostics: DiagnosticList,
    /// `NodeId -> SymbolId` produced by declaration collection. Kept
    /// separate from the AST nodes themselves (rather than mutating each
    /// node's `symbol` field in place) since pass 1 only ever sees `&Root`;
    /// `resolve::check_root` consumes this map while rebuilding the tree by
    /// value and writes the final answer into each node's `symbol` field.
    node_symbols: HashMap<NodeId, crate::symbol::SymbolId>,
}

impl SemanticContext {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let global = symbols.new_scope(ScopeKind::Global, None);
        Self {
            interner: TypeInterner::new(),
            symbols,
            global,
            diagnostics: DiagnosticList::new(),
            node_symbols: HashMap::new(),
        }
    }

    pub fn error(&mut self, file: &str, span: Span, msg: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(file, span, msg));
    }

    pub fn error_at(&mut self, file: &str, span: Span, node: NodeId, msg: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(file, span, msg).with_offender(node));
    }

    pub fn warning(&mut self, file: &str, span: Span, msg: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(file, span, msg));
    }

    pub(crate) fn bind(&mut self, node: NodeId, symbol: crate::symbol::SymbolId) {
        self.node_symbols.insert(node, symbol);
    }

    pub(crate) fn binding(&self, node: NodeId) -> Option<crate::symbol::SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// Builtin methods available on array/view/string receivers (spec
    /// §4.5.3: "a short, hardcoded table of builtin methods per builtin
    /// type" — `[T, N].len`, `view[T].len`, `string.len`, `string.raw`).
    pub fn builtin_method(&mut self, receiver: &Type, name: &str) -> Option<BuiltinMethodSig> {
        if receiver.is_subscriptable() && name == "len" {
            return Some(BuiltinMethodSig {
                params: vec![],
                return_type: self.interner.builtin(Builtin::Usize),
            });
        }
        if receiver.is_builtin(Builtin::Str) {
            match name {
                "len" => {
                    return Some(BuiltinMethodSig {
                        params: vec![],
                        return_type: self.interner.builtin(Builtin::Usize),
                    })
                }
                "raw" => {
                    let u8_t = self.interner.builtin(Builtin::U8);
                    return Some(BuiltinMethodSig {
                        params: vec![],
                        return_type: self.interner.pointer(u8_t),
                    });
                }
                _ => {}
            }
        }
        None
    }
}

impl Default for SemanticContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every pass over one already-parsed file, in the order the build
/// driver needs (spec §4.6 steps 3 and 5): callers that need to merge
/// imported exports between declaration collection and checking should call
/// [`collect::collect_declarations`] and [`resolve::check_root`]
/// separately instead of this convenience wrapper (see `driver::Builder`).
pub fn analyze_standalone(ctx: &mut SemanticContext, file: &str, root: Root) -> Root {
    collect::collect_declarations(ctx, file, &root);
    resolve::resolve_signatures(ctx, file, &root);
    resolve::check_root(ctx, file, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    #[test]
    fn empty_module_has_no_diagnostics() {
        let mut ctx = SemanticContext::new();
        let (root, parse_diags) = parse_file("a.shiro", "");
        assert!(parse_diags.succeeded());
        let root = analyze_standalone(&mut ctx, "a.shiro", root);
        assert!(root.defs.is_empty());
        assert!(ctx.diagnostics.succeeded());
    }
}

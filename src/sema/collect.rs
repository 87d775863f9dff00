//! Pass 1: declaration collection (spec §4.5.1).
//!
//! Walks every top-level definition and declares a bare symbol for it —
//! functions, classes, their members/methods, and (for templates) their
//! type parameters — without resolving a single `TypeExpr` yet. Types are
//! filled in afterwards by [`super::resolve::resolve_signatures`], once
//! every name in the module exists and a `Named` type can be looked up
//! regardless of which order things were declared in (so `class A { var b:
//! B*; } class B { var a: A*; }` just works). Bodies aren't visited at all
//! here — definite-assignment and expression type-checking are entirely a
//! pass-2 concern.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{ClassDef, FnDef, MemberDecl, Root, TopLevelDef, TypeParamDecl};
use crate::lexer::Span;
use crate::symbol::{
    ClassData, DeclareError, FunctionData, MemberData, ScopeId, ScopeKind, Symbol, SymbolId,
    SymbolKind, TemplateData, TemplateDef,
};

use super::SemanticContext;

pub fn collect_declarations(ctx: &mut SemanticContext, file: &str, root: &Root) {
    for def in &root.defs {
        match def {
            TopLevelDef::Fn(f) => collect_fn(ctx, file, ctx.global, f),
            TopLevelDef::Class(c) => collect_class(ctx, file, ctx.global, c),
            TopLevelDef::Import(_) => {
                // Resolved by the build driver before this module's exports
                // are merged in; imports themselves declare no symbol here.
            }
        }
    }
}

fn declare_or_diagnose(
    ctx: &mut SemanticContext,
    file: &str,
    scope: ScopeId,
    symbol: Symbol,
    span: Span,
) -> Option<SymbolId> {
    let name = symbol.name.clone();
    match ctx.symbols.declare(scope, symbol) {
        Ok(id) => Some(id),
        Err(DeclareError::Redeclared) => {
            let prev = ctx
                .symbols
                .first_existing(scope, &name)
                .map(|id| ctx.symbols.symbol(id).span);
            let suffix = prev
                .map(|s| format!(", previously declared at {s}"))
                .unwrap_or_default();
            ctx.error(file, span, format!("redeclaration of '{name}'{suffix}"));
            None
        }
    }
}

fn declare_type_params(
    ctx: &mut SemanticContext,
    file: &str,
    scope: ScopeId,
    type_params: &[TypeParamDecl],
) -> Vec<SymbolId> {
    let mut ids = Vec::new();
    for tp in type_params {
        let mut symbol = Symbol::new(&tp.name, SymbolKind::TypeParameter, tp.span);
        symbol.ty = Some(ctx.interner.variable(tp.name.clone()));
        if let Some(id) = declare_or_diagnose(ctx, file, scope, symbol, tp.span) {
            ctx.bind(tp.id, id);
            ids.push(id);
        }
    }
    ids
}

fn collect_fn(ctx: &mut SemanticContext, file: &str, scope: ScopeId, f: &Rc<FnDef>) {
    let is_template = !f.type_params.is_empty();
    let mut symbol = Symbol::new(&f.name, SymbolKind::TemplateFunction, f.span);

    if is_template {
        let template_scope = ctx.symbols.new_scope(ScopeKind::Function, Some(scope));
        let type_params = declare_type_params(ctx, file, template_scope, &f.type_params);
        symbol.data = template_symbol_data(TemplateDef::Fn(f.clone()), template_scope, type_params);
    } else {
        symbol.kind = SymbolKind::Function;
        symbol.data = crate::symbol::SymbolData::Function(FunctionData {
            params: Vec::new(),
            return_type: ctx.interner.invalid(),
            overload_index: 0,
            extern_abi: f.extern_abi.clone(),
            is_builtin: false,
        });
    }

    if let Some(id) = declare_or_diagnose(ctx, file, scope, symbol, f.span) {
        ctx.bind(f.id, id);
    }
}

fn collect_class(ctx: &mut SemanticContext, file: &str, scope: ScopeId, c: &ClassDef) {
    let is_template = !c.type_params.is_empty();

    let template_scope = is_template.then(|| ctx.symbols.new_scope(ScopeKind::Class, Some(scope)));
    let type_params = template_scope
        .map(|ts| declare_type_params(ctx, file, ts, &c.type_params))
        .unwrap_or_default();

    let members_scope = ctx
        .symbols
        .new_scope(ScopeKind::Class, Some(template_scope.unwrap_or(scope)));

    for m in &c.members {
        collect_member(ctx, file, members_scope, m);
    }
    for m in &c.methods {
        collect_method(ctx, file, members_scope, m);
    }

    let mut symbol = Symbol::new(&c.name, SymbolKind::Class, c.span);
    symbol.data = if let Some(template_scope) = template_scope {
        symbol.kind = SymbolKind::TemplateClass;
        template_symbol_data(TemplateDef::Class(Rc::new(c.clone())), template_scope, type_params)
    } else {
        crate::symbol::SymbolData::Class(ClassData { members: members_scope })
    };

    if let Some(id) = declare_or_diagnose(ctx, file, scope, symbol, c.span) {
        ctx.bind(c.id, id);
    }
}

fn template_symbol_data(
    def: TemplateDef,
    template_scope: ScopeId,
    type_params: Vec<SymbolId>,
) -> crate::symbol::SymbolData {
    crate::symbol::SymbolData::Template(TemplateData {
        type_params,
        template_scope,
        def,
        instances: HashMap::new(),
    })
}

fn collect_member(ctx: &mut SemanticContext, file: &str, scope: ScopeId, m: &MemberDecl) {
    let mut symbol = Symbol::new(&m.name, SymbolKind::Member, m.span);
    symbol.data = crate::symbol::SymbolData::Member(MemberData {
        default_value: m.init.clone().map(Rc::new),
    });
    if let Some(id) = declare_or_diagnose(ctx, file, scope, symbol, m.span) {
        ctx.bind(m.id, id);
    }
}

fn collect_method(ctx: &mut SemanticContext, file: &str, scope: ScopeId, m: &FnDef) {
    let mut symbol = Symbol::new(&m.name, SymbolKind::Method, m.span);
    symbol.data = crate::symbol::SymbolData::Function(FunctionData {
        params: Vec::new(),
        return_type: ctx.interner.invalid(),
        overload_index: 0,
        extern_abi: m.extern_abi.clone(),
        is_builtin: false,
    });
    if let Some(id) = declare_or_diagnose(ctx, file, scope, symbol, m.span) {
        ctx.bind(m.id, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn collect_src(src: &str) -> (SemanticContext, Root) {
        let mut ctx = SemanticContext::new();
        let (root, diags) = parse_file("a.shiro", src);
        assert!(diags.succeeded(), "{diags:?}");
        collect_declarations(&mut ctx, "a.shiro", &root);
        (ctx, root)
    }

    #[test]
    fn declares_top_level_function() {
        let (ctx, _root) = collect_src("fn add(a: i32, b: i32) -> i32 { return a + b; }");
        assert_eq!(ctx.symbols.lookup_local(ctx.global, "add").len(), 1);
        assert!(ctx.diagnostics.succeeded());
    }

    #[test]
    fn redeclaration_of_function_is_an_error() {
        let (ctx, _) = collect_src("fn add() -> void {} fn add() -> void {}");
        assert!(!ctx.diagnostics.succeeded());
    }

    #[test]
    fn forward_referencing_classes_both_declare() {
        let (ctx, _) = collect_src(
            "class A { var b: B*; } class B { var a: A*; }",
        );
        assert!(ctx.diagnostics.succeeded());
        assert_eq!(ctx.symbols.lookup_local(ctx.global, "A").len(), 1);
        assert_eq!(ctx.symbols.lookup_local(ctx.global, "B").len(), 1);
    }

    #[test]
    fn template_class_gets_type_parameter_scope() {
        let (ctx, root) = collect_src("class Pair<A, B> { var first: A; var second: B; }");
        let TopLevelDef::Class(c) = &root.defs[0] else {
            panic!("expected class");
        };
        let id = ctx.binding(c.id).expect("class symbol bound");
        assert_eq!(ctx.symbols.symbol(id).kind, SymbolKind::TemplateClass);
    }
}

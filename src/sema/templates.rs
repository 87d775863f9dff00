//! Template instantiation (spec §4.5.6), grounded in
//! `original_source/src/sema/template_instantiator.c`: clone the template's
//! AST, substitute each type parameter for its concrete argument, declare a
//! fresh `*Instance` symbol, and re-run signature resolution plus body
//! checking against the clone. The original drives substitution with its own
//! `ast_transformer_t` walking the cloned tree in place; here the clone never
//! needs a dedicated `Transformer` impl, since every place a type parameter's
//! name can appear is a `TypeExpr`, and [`super::resolve::resolve_type_expr`]
//! already takes a `subst` map and consults it before falling back to scope
//! lookup. Substitution therefore falls out of calling the ordinary
//! signature/body resolution functions with a non-empty `subst`, rather than
//! a second tree walk.
//!
//! Each instantiation gets its own home scope purely so its instance symbol
//! (and, for a class, its member scope) can be declared without colliding
//! with any other instantiation's — `SymbolTable::declare` only rejects a
//! name that already exists *in the same scope*, so parking every instance
//! alone in a fresh scope sidesteps needing to mangle a unique name per
//! instantiation the way a linker would.

use std::collections::HashMap;

use crate::ast::{BinOpKind, Expr, ExprKind, TypeExpr};
use crate::symbol::{
    FunctionData, InstanceData, MemberData, ScopeKind, Symbol, SymbolData, SymbolId, SymbolKind,
    TemplateDef,
};
use crate::types::{Builtin, Type};

use super::resolve::{check_fn_def, resolve_type_expr, Substitution};
use super::SemanticContext;

/// Instantiate a function template for one concrete argument list, or return
/// the cached instance from an earlier call with the same arguments.
pub(crate) fn instantiate_function(
    ctx: &mut SemanticContext,
    file: &str,
    template: SymbolId,
    type_args: Vec<Type>,
) -> Option<SymbolId> {
    let (type_param_names, template_span, fn_def) = match &ctx.symbols.symbol(template).data {
        SymbolData::Template(data) => match &data.def {
            TemplateDef::Fn(f) => (
                type_param_names(ctx, &data.type_params),
                f.span,
                f.clone(),
            ),
            TemplateDef::Class(_) => return None,
        },
        _ => return None,
    };

    if type_args.len() != type_param_names.len() {
        ctx.error(
            file,
            template_span,
            format!(
                "'{}' expects {} type argument(s), found {}",
                fn_def.name,
                type_param_names.len(),
                type_args.len()
            ),
        );
        return None;
    }

    if let Some(cached) = lookup_cached(ctx, template, &type_args) {
        return Some(cached);
    }

    let subst: Substitution = type_param_names
        .into_iter()
        .zip(type_args.iter().cloned())
        .collect();

    let home_scope = ctx.symbols.new_scope(ScopeKind::Block, Some(ctx.global));
    let mut instance_symbol = Symbol::new(format!("{}<...>", fn_def.name), SymbolKind::FunctionInstance, fn_def.span);
    instance_symbol.data = SymbolData::Instance(InstanceData {
        template,
        type_args: type_args.clone(),
        members: None,
        function: None,
    });
    let instance_id = ctx.symbols.declare(home_scope, instance_symbol).ok()?;
    cache_instance(ctx, template, type_args.clone(), instance_id);

    let params: Vec<Type> = fn_def
        .params
        .iter()
        .map(|p| resolve_type_expr(ctx, file, ctx.global, &p.type_expr, &subst))
        .collect();
    let return_type = match &fn_def.return_type {
        Some(t) => resolve_type_expr(ctx, file, ctx.global, t, &subst),
        None => ctx.interner.builtin(Builtin::Void),
    };

    if let SymbolData::Instance(inst) = &mut ctx.symbols.symbol_mut(instance_id).data {
        inst.function = Some(FunctionData {
            params,
            return_type,
            overload_index: 0,
            extern_abi: fn_def.extern_abi.clone(),
            is_builtin: false,
        });
    }

    // The checked clone is discarded once its diagnostics have been emitted:
    // shiroc has no codegen stage, and `--dump-ast` only prints each module's
    // originally-parsed top-level defs, so there is nowhere downstream that
    // would read an instantiated body back out of the symbol table.
    let cloned = (*fn_def).clone();
    check_fn_def(ctx, file, ctx.global, cloned, None, &subst);

    Some(instance_id)
}

/// Instantiate a class template for one concrete argument list, or return
/// the cached instance from an earlier call with the same arguments.
pub(crate) fn instantiate_class(
    ctx: &mut SemanticContext,
    file: &str,
    template: SymbolId,
    type_args: Vec<Type>,
) -> Option<SymbolId> {
    let (type_param_names, template_span, class_def) = match &ctx.symbols.symbol(template).data {
        SymbolData::Template(data) => match &data.def {
            TemplateDef::Class(c) => (
                type_param_names(ctx, &data.type_params),
                c.span,
                c.clone(),
            ),
            TemplateDef::Fn(_) => return None,
        },
        _ => return None,
    };

    if type_args.len() != type_param_names.len() {
        ctx.error(
            file,
            template_span,
            format!(
                "'{}' expects {} type argument(s), found {}",
                class_def.name,
                type_param_names.len(),
                type_args.len()
            ),
        );
        return None;
    }

    if let Some(cached) = lookup_cached(ctx, template, &type_args) {
        return Some(cached);
    }

    let subst: Substitution = type_param_names
        .into_iter()
        .zip(type_args.iter().cloned())
        .collect();

    let home_scope = ctx.symbols.new_scope(ScopeKind::Block, Some(ctx.global));
    let members_scope = ctx.symbols.new_scope(ScopeKind::Class, Some(ctx.global));

    let display_name = format!("{}<...>", class_def.name);
    let mut instance_symbol = Symbol::new(display_name.clone(), SymbolKind::ClassInstance, class_def.span);
    instance_symbol.data = SymbolData::Instance(InstanceData {
        template,
        type_args: type_args.clone(),
        members: Some(members_scope),
        function: None,
    });
    let instance_id = ctx.symbols.declare(home_scope, instance_symbol).ok()?;
    cache_instance(ctx, template, type_args.clone(), instance_id);

    for m in &class_def.members {
        let type_expr = m
            .type_expr
            .as_ref()
            .expect("class members always carry a required type annotation");
        let ty = resolve_type_expr(ctx, file, ctx.global, type_expr, &subst);
        if ty.is_builtin(Builtin::Void) {
            ctx.error(file, m.span, format!("member '{}' cannot have type 'void'", m.name));
        }
        let mut sym = Symbol::new(&m.name, SymbolKind::Member, m.span);
        sym.ty = Some(ty);
        sym.data = SymbolData::Member(MemberData {
            default_value: m.init.clone().map(std::rc::Rc::new),
        });
        let _ = ctx.symbols.declare(members_scope, sym);
    }

    for method in &class_def.methods {
        let params: Vec<Type> = method
            .params
            .iter()
            .map(|p| resolve_type_expr(ctx, file, ctx.global, &p.type_expr, &subst))
            .collect();
        let return_type = match &method.return_type {
            Some(t) => resolve_type_expr(ctx, file, ctx.global, t, &subst),
            None => ctx.interner.builtin(Builtin::Void),
        };
        let mut sym = Symbol::new(&method.name, SymbolKind::Method, method.span);
        sym.data = SymbolData::Function(FunctionData {
            params,
            return_type,
            overload_index: 0,
            extern_abi: method.extern_abi.clone(),
            is_builtin: false,
        });
        let _ = ctx.symbols.declare(members_scope, sym);
    }

    let self_class_ty = ctx.interner.class(instance_id, display_name.as_str());
    let self_ty = ctx.interner.pointer(self_class_ty);
    for method in &class_def.methods {
        let cloned = method.clone();
        check_fn_def(ctx, file, members_scope, cloned, Some(self_ty.clone()), &subst);
    }

    Some(instance_id)
}

/// Infer a call's type arguments from the concrete types of its already
/// type-checked arguments by structurally matching each parameter's
/// `TypeExpr` against the corresponding argument's resolved `Type` (spec
/// §4.5.6: "type arguments may be inferred from the call's argument types
/// when not given explicitly"). A type parameter that appears in no
/// parameter position — or whose argument's type could not itself be
/// determined — resolves to `invalid`, which then fails the arity/type
/// checks `instantiate_function`'s caller performs on the result anyway.
pub(crate) fn infer_template_args(ctx: &mut SemanticContext, template: SymbolId, args: &[Expr]) -> Vec<Type> {
    let (names, params) = match &ctx.symbols.symbol(template).data {
        SymbolData::Template(data) => match &data.def {
            TemplateDef::Fn(f) => (type_param_names(ctx, &data.type_params), f.params.clone()),
            TemplateDef::Class(_) => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let name_set: std::collections::HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut found: HashMap<String, Type> = HashMap::new();
    for (param, arg) in params.iter().zip(args.iter()) {
        if let Some(ty) = &arg.ty {
            unify(&param.type_expr, ty, &name_set, &mut found);
        }
    }

    names
        .into_iter()
        .map(|n| found.get(&n).cloned().unwrap_or_else(|| ctx.interner.invalid()))
        .collect()
}

/// Structurally match a parameter's syntactic `TypeExpr` against the
/// argument's resolved `Type`, recording a binding the first time a type
/// parameter's name is encountered under a matching composite shape (a
/// pointer against a pointer, an array/view/heap-array against one with an
/// element type). Shapes that don't match (e.g. a `Named` non-parameter type
/// against anything) contribute nothing; `instantiate_function` reports the
/// resulting mismatch once the instance's parameter types are resolved.
fn unify(texpr: &TypeExpr, actual: &Type, type_params: &std::collections::HashSet<&str>, out: &mut HashMap<String, Type>) {
    match texpr {
        TypeExpr::Named { name, type_args } if type_args.is_empty() && type_params.contains(name.as_str()) => {
            out.entry(name.clone()).or_insert_with(|| actual.clone());
        }
        TypeExpr::Pointer(inner) => {
            if let Some(pointee) = actual.pointee() {
                unify(inner, &pointee, type_params, out);
            }
        }
        TypeExpr::Array(inner, _) | TypeExpr::HeapArray(inner) | TypeExpr::View(inner) => {
            if let Some(elem) = actual.element() {
                unify(inner, &elem, type_params, out);
            }
        }
        _ => {}
    }
}

/// Fold the restricted constant sub-language `parse_array_size_expr_soft`
/// produces (int literals and `+ - * /` over them) into a concrete size.
/// Shiro's type parameters bind types, not values, so an identifier can
/// never itself fold to a number; encountering one here is always reported
/// rather than silently treated as zero (the 0-sized-array fallback still
/// happens at the `resolve_type_expr` call site once this returns `None`).
pub(crate) fn resolve_array_size(
    ctx: &mut SemanticContext,
    file: &str,
    expr: &Expr,
    _subst: &Substitution,
) -> Option<u64> {
    fold_const(ctx, file, expr)
}

fn fold_const(ctx: &mut SemanticContext, file: &str, expr: &Expr) -> Option<u64> {
    match &expr.kind {
        ExprKind::IntLit { magnitude, negative, .. } => {
            if *negative {
                ctx.error(file, expr.span, "array size cannot be negative");
                None
            } else {
                Some(*magnitude)
            }
        }
        ExprKind::ParenExpr(inner) => fold_const(ctx, file, inner),
        ExprKind::BinOp { op, lhs, rhs } => {
            let l = fold_const(ctx, file, lhs)?;
            let r = fold_const(ctx, file, rhs)?;
            match op {
                BinOpKind::Add => Some(l.wrapping_add(r)),
                BinOpKind::Sub => Some(l.saturating_sub(r)),
                BinOpKind::Mul => Some(l.wrapping_mul(r)),
                BinOpKind::Div if r != 0 => Some(l / r),
                BinOpKind::Div => {
                    ctx.error(file, expr.span, "division by zero in array size expression");
                    None
                }
                _ => {
                    ctx.error(file, expr.span, "invalid operator in array size expression");
                    None
                }
            }
        }
        ExprKind::RefExpr { name, .. } => {
            ctx.error(
                file,
                expr.span,
                format!("array size must be a constant expression, found reference to '{name}'"),
            );
            None
        }
        _ => {
            ctx.error(file, expr.span, "array size must be a constant expression");
            None
        }
    }
}

fn type_param_names(ctx: &SemanticContext, type_params: &[SymbolId]) -> Vec<String> {
    type_params
        .iter()
        .map(|id| ctx.symbols.symbol(*id).name.clone())
        .collect()
}

fn lookup_cached(ctx: &SemanticContext, template: SymbolId, type_args: &[Type]) -> Option<SymbolId> {
    match &ctx.symbols.symbol(template).data {
        SymbolData::Template(data) => data.instances.get(type_args).copied(),
        _ => None,
    }
}

fn cache_instance(ctx: &mut SemanticContext, template: SymbolId, type_args: Vec<Type>, instance: SymbolId) {
    if let SymbolData::Template(data) = &mut ctx.symbols.symbol_mut(template).data {
        data.instances.insert(type_args, instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TopLevelDef;
    use crate::parser::parse_file;

    fn checked(src: &str) -> (SemanticContext, crate::ast::Root) {
        let mut ctx = SemanticContext::new();
        let (root, diags) = parse_file("a.shiro", src);
        assert!(diags.succeeded(), "{diags:?}");
        let root = crate::sema::analyze_standalone(&mut ctx, "a.shiro", root);
        (ctx, root)
    }

    #[test]
    fn instantiating_same_args_twice_returns_cached_symbol() {
        let (mut ctx, root) = checked(
            "class Box<T> { var value: T; } \
             fn first(b: Box<i32>) -> i32 { return b.value; } \
             fn second(b: Box<i32>) -> i32 { return b.value; }",
        );
        assert!(ctx.diagnostics.succeeded(), "{:?}", ctx.diagnostics.iter().collect::<Vec<_>>());

        let class_symbol = ctx
            .symbols
            .lookup_local(ctx.global, "Box")
            .first()
            .copied()
            .expect("Box declared");
        let i32_t = ctx.interner.builtin(Builtin::I32);
        let first = instantiate_class(&mut ctx, "a.shiro", class_symbol, vec![i32_t.clone()]);
        let second = instantiate_class(&mut ctx, "a.shiro", class_symbol, vec![i32_t]);
        assert_eq!(first, second);
        let _ = root.defs.iter().find(|d| matches!(d, TopLevelDef::Fn(f) if f.name == "first"));
    }

    #[test]
    fn wrong_arity_type_argument_list_is_an_error() {
        let (mut ctx, _root) = checked("class Pair<A, B> { var a: A; var b: B; }");
        let class_symbol = ctx
            .symbols
            .lookup_local(ctx.global, "Pair")
            .first()
            .copied()
            .expect("Pair declared");
        let i32_t = ctx.interner.builtin(Builtin::I32);
        let result = instantiate_class(&mut ctx, "a.shiro", class_symbol, vec![i32_t]);
        assert!(result.is_none());
        assert!(!ctx.diagnostics.succeeded());
    }

    #[test]
    fn distinct_type_arguments_produce_distinct_instances() {
        let (mut ctx, _root) = checked("class Box<T> { var value: T; }");
        let class_symbol = ctx
            .symbols
            .lookup_local(ctx.global, "Box")
            .first()
            .copied()
            .expect("Box declared");
        let i32_t = ctx.interner.builtin(Builtin::I32);
        let bool_t = ctx.interner.builtin(Builtin::Bool);
        let a = instantiate_class(&mut ctx, "a.shiro", class_symbol, vec![i32_t]);
        let b = instantiate_class(&mut ctx, "a.shiro", class_symbol, vec![bool_t]);
        assert_ne!(a, b);
    }
}

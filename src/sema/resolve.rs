//! Pass 2: name/type resolution and type-checking (spec §4.5.2-§4.5.5).
//!
//! Grounded in `original_source/src/sema/{type_resolver,semantic_analyzer,
//! access_transformer}.c`, but reshaped from the original's "analyzer struct
//! with mutable fields for current scope / current function / init tracker"
//! into plain functions threading that state as explicit parameters (current
//! scope, the enclosing function's return type, the active
//! [`super::definite_assign::DefiniteAssign`] tracker, whether we're checking
//! an lvalue, and — inside a method — the `self` symbol). Nothing here is
//! global or `thread_local`; two calls into this module for two different
//! modules of the same build never interfere with each other.
//!
//! Two entry points, run in order by [`super::analyze_standalone`] and by
//! `driver::Builder`:
//!   - [`resolve_signatures`] fills in every non-template function/method's
//!     parameter and return types, and every non-template class's member
//!     types, from the raw `TypeExpr`s the parser left behind. This has to
//!     happen before any body is checked, because Shiro lets classes and
//!     functions forward-reference each other within a module.
//!   - [`check_root`] walks every body, resolving names, inserting
//!     `Coercion` nodes, and rewriting `AccessExpr` into `MemberAccess` /
//!     `MethodCall` / a bare `RefExpr`, exactly as `access_transformer.c`
//!     does it.
//!
//! Template bodies are deliberately skipped by both passes here — a
//! template's parameter/member/return types mention its own type parameters,
//! which don't resolve to anything until an instantiation supplies concrete
//! arguments, so template signatures and bodies are only ever resolved by
//! [`super::templates::instantiate_function`] /
//! [`super::templates::instantiate_class`], once per distinct argument list.

use std::collections::HashMap;

use crate::ast::{
    ArraySize, ClassDef, Expr, ExprKind, FnDef, ParamDecl, Root, Stmt, StmtKind, TopLevelDef,
    TypeExpr, UnaryOpKind, VarDecl,
};
use crate::lexer::Span;
use crate::symbol::{Symbol, SymbolData, SymbolId, SymbolKind, ScopeId, ScopeKind};
use crate::types::{classify_coercion, float_fits, int_fits, Builtin, CoercionKind, Type};

use super::definite_assign::DefiniteAssign;
use super::templates;
use super::SemanticContext;

/// Concrete type substituted in for a template's type-parameter name, used
/// only while resolving/checking a clone produced by [`super::templates`].
/// Empty everywhere else.
pub(crate) type Substitution = HashMap<String, Type>;

// ---------------------------------------------------------------------
// Signature resolution
// ---------------------------------------------------------------------

pub fn resolve_signatures(ctx: &mut SemanticContext, file: &str, root: &Root) {
    let subst = Substitution::new();
    for def in &root.defs {
        match def {
            TopLevelDef::Fn(f) if f.type_params.is_empty() => {
                resolve_fn_signature(ctx, file, ctx.global, f, &subst);
            }
            TopLevelDef::Class(c) if c.type_params.is_empty() => {
                resolve_class_signature(ctx, file, ctx.global, c, &subst);
            }
            _ => {}
        }
    }
}

pub(crate) fn resolve_fn_signature(
    ctx: &mut SemanticContext,
    file: &str,
    scope: ScopeId,
    f: &FnDef,
    subst: &Substitution,
) {
    let Some(symbol_id) = ctx.binding(f.id) else { return };
    let params: Vec<Type> = f
        .params
        .iter()
        .map(|p| resolve_type_expr(ctx, file, scope, &p.type_expr, subst))
        .collect();
    let return_type = match &f.return_type {
        Some(t) => resolve_type_expr(ctx, file, scope, t, subst),
        None => ctx.interner.builtin(Builtin::Void),
    };
    if let SymbolData::Function(data) = &mut ctx.symbols.symbol_mut(symbol_id).data {
        data.params = params;
        data.return_type = return_type;
    }
}

pub(crate) fn resolve_class_signature(
    ctx: &mut SemanticContext,
    file: &str,
    scope: ScopeId,
    c: &ClassDef,
    subst: &Substitution,
) {
    let Some(class_symbol) = ctx.binding(c.id) else { return };
    let members_scope = match &ctx.symbols.symbol(class_symbol).data {
        SymbolData::Class(data) => data.members,
        _ => return,
    };
    for m in &c.members {
        let ty = resolve_type_expr(ctx, file, scope, m.type_expr.as_ref().unwrap(), subst);
        if ty.is_builtin(Builtin::Void) {
            ctx.error(file, m.span, format!("member '{}' cannot have type 'void'", m.name));
        }
        if let Some(id) = ctx.binding(m.id) {
            ctx.symbols.symbol_mut(id).ty = Some(ty);
        }
    }
    for method in &c.methods {
        resolve_fn_signature(ctx, file, members_scope, method, subst);
    }
    let _ = members_scope;
}

/// Resolve a parsed `TypeExpr` into a canonical [`Type`]. `subst` supplies
/// the concrete type bound to each template type-parameter name when this is
/// called while resolving a template instantiation's cloned signature;
/// it is empty for every ordinary (non-generic) resolution.
pub(crate) fn resolve_type_expr(
    ctx: &mut SemanticContext,
    file: &str,
    scope: ScopeId,
    texpr: &TypeExpr,
    subst: &Substitution,
) -> Type {
    match texpr {
        TypeExpr::Invalid => ctx.interner.invalid(),
        TypeExpr::Builtin(b) => ctx.interner.builtin(*b),
        TypeExpr::Pointer(inner) => {
            let t = resolve_type_expr(ctx, file, scope, inner, subst);
            ctx.interner.pointer(t)
        }
        TypeExpr::HeapArray(inner) => {
            let t = resolve_type_expr(ctx, file, scope, inner, subst);
            ctx.interner.heap_array(t)
        }
        TypeExpr::View(inner) => {
            let t = resolve_type_expr(ctx, file, scope, inner, subst);
            ctx.interner.view(t)
        }
        TypeExpr::Array(inner, size) => {
            let elem = resolve_type_expr(ctx, file, scope, inner, subst);
            let n = match size {
                ArraySize::Literal(n) => *n,
                ArraySize::Expr(e) => match templates::resolve_array_size(ctx, file, e, subst) {
                    Some(n) => n,
                    None => 0,
                },
            };
            ctx.interner.array(elem, n)
        }
        TypeExpr::Named { name, type_args } => {
            if type_args.is_empty() {
                if let Some(t) = subst.get(name) {
                    return t.clone();
                }
            }
            let candidates: Vec<SymbolId> = ctx
                .symbols
                .lookup(scope, name)
                .into_iter()
                .filter(|id| {
                    matches!(
                        ctx.symbols.symbol(*id).kind,
                        SymbolKind::Class | SymbolKind::TemplateClass
                    )
                })
                .collect();
            let Some(&class_symbol) = candidates.first() else {
                let span = Span::default();
                ctx.error(file, span, format!("undefined type '{name}'"));
                return ctx.interner.invalid();
            };
            if candidates.len() > 1 {
                ctx.error(file, Span::default(), format!("ambiguous type '{name}'"));
            }
            let is_template = matches!(
                ctx.symbols.symbol(class_symbol).kind,
                SymbolKind::TemplateClass
            );
            if !is_template {
                if !type_args.is_empty() {
                    ctx.error(file, Span::default(), format!("'{name}' is not generic"));
                }
                return ctx.interner.class(class_symbol, name.as_str());
            }
            let args: Vec<Type> = type_args
                .iter()
                .map(|a| resolve_type_expr(ctx, file, scope, a, subst))
                .collect();
            match templates::instantiate_class(ctx, file, class_symbol, args) {
                Some(instance_id) => {
                    let display = format!("{name}<...>");
                    ctx.interner.class(instance_id, display)
                }
                None => ctx.interner.invalid(),
            }
        }
    }
}

pub(crate) fn class_members_scope(ctx: &SemanticContext, ty: &Type) -> Option<ScopeId> {
    let sym_id = ty.class_symbol()?;
    match &ctx.symbols.symbol(sym_id).data {
        SymbolData::Class(c) => Some(c.members),
        SymbolData::Instance(inst) => inst.members,
        _ => None,
    }
}

pub(crate) fn function_signature(ctx: &SemanticContext, symbol: SymbolId) -> Option<(Vec<Type>, Type)> {
    match &ctx.symbols.symbol(symbol).data {
        SymbolData::Function(f) => Some((f.params.clone(), f.return_type.clone())),
        SymbolData::Instance(inst) => inst.function.as_ref().map(|f| (f.params.clone(), f.return_type.clone())),
        _ => None,
    }
}

// ---------------------------------------------------------------------
// Body checking
// ---------------------------------------------------------------------

/// Checked function/method bodies in the order they appear in the root.
/// Templates are skipped; their bodies are checked lazily, once per
/// instantiation, by [`super::templates`].
pub fn check_root(ctx: &mut SemanticContext, file: &str, root: Root) -> Root {
    let defs = root
        .defs
        .into_iter()
        .map(|def| match def {
            TopLevelDef::Fn(f) if f.type_params.is_empty() => {
                let inner = std::rc::Rc::try_unwrap(f).unwrap_or_else(|rc| (*rc).clone());
                let checked = check_fn_def(ctx, file, ctx.global, inner, None, &Substitution::new());
                TopLevelDef::Fn(std::rc::Rc::new(checked))
            }
            TopLevelDef::Class(c) if c.type_params.is_empty() => {
                TopLevelDef::Class(check_class_def(ctx, file, c, &Substitution::new()))
            }
            other => other,
        })
        .collect();
    Root { file: root.file, defs }
}

pub(crate) fn check_class_def(
    ctx: &mut SemanticContext,
    file: &str,
    c: ClassDef,
    subst: &Substitution,
) -> ClassDef {
    let class_symbol = ctx.binding(c.id);
    let self_ty = class_symbol.map(|id| {
        let name: std::rc::Rc<str> = c.name.as_str().into();
        let class_ty = ctx.interner.class(id, name);
        ctx.interner.pointer(class_ty)
    });
    let methods = c
        .methods
        .into_iter()
        .map(|m| check_fn_def(ctx, file, ctx.global, m, self_ty.clone(), subst))
        .collect();
    ClassDef { methods, ..c }
}

pub(crate) fn check_fn_def(
    ctx: &mut SemanticContext,
    file: &str,
    outer_scope: ScopeId,
    f: FnDef,
    self_ty: Option<Type>,
    subst: &Substitution,
) -> FnDef {
    let fn_scope = ctx.symbols.new_scope(ScopeKind::Function, Some(outer_scope));
    let mut tracker = DefiniteAssign::new();

    let self_symbol = self_ty.clone().map(|ty| {
        let mut sym = Symbol::new("self", SymbolKind::Parameter, f.span);
        sym.ty = Some(ty);
        ctx.symbols.declare(fn_scope, sym).ok()
    }).flatten();

    let params: Vec<ParamDecl> = f
        .params
        .into_iter()
        .map(|p| {
            let ty = resolve_type_expr(ctx, file, outer_scope, &p.type_expr, subst);
            let mut sym = Symbol::new(&p.name, SymbolKind::Parameter, p.span);
            sym.ty = Some(ty);
            let id = ctx.symbols.declare(fn_scope, sym).ok();
            if let Some(id) = id {
                ctx.bind(p.id, id);
                tracker.mark_initialized(id);
            }
            ParamDecl { symbol: id, ..p }
        })
        .collect();

    let return_type = match &f.return_type {
        Some(t) => resolve_type_expr(ctx, file, outer_scope, t, subst),
        None => ctx.interner.builtin(Builtin::Void),
    };

    let mut checker = FnChecker {
        file: file.to_string(),
        return_type: return_type.clone(),
        self_symbol,
    };
    let body = checker.check_stmt(ctx, fn_scope, &mut tracker, f.body);

    if !return_type.is_builtin(Builtin::Void) && !last_statement_returns(&body) {
        ctx.error(
            file,
            f.span,
            format!("function '{}' must end in a return statement", f.name),
        );
    }

    FnDef {
        params,
        body,
        ..f
    }
}

fn last_statement_returns(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Compound(stmts) => stmts.last().is_some_and(last_statement_returns),
        StmtKind::If { then_branch, else_branch, .. } => {
            else_branch.as_ref().is_some_and(|e| {
                last_statement_returns(then_branch) && last_statement_returns(e)
            })
        }
        _ => false,
    }
}

/// Carries the handful of things that stay fixed for the whole body of one
/// function — its own return type and (for a method) its `self` symbol —
/// while scope and the definite-assignment tracker vary per-statement and
/// are threaded as plain parameters instead.
struct FnChecker {
    file: String,
    return_type: Type,
    self_symbol: Option<SymbolId>,
}

impl FnChecker {
    fn check_stmt(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        stmt: Stmt,
    ) -> Stmt {
        let kind = match stmt.kind {
            StmtKind::Compound(stmts) => {
                let block_scope = ctx.symbols.new_scope(ScopeKind::Block, Some(scope));
                StmtKind::Compound(
                    stmts
                        .into_iter()
                        .map(|s| self.check_stmt(ctx, block_scope, tracker, s))
                        .collect(),
                )
            }
            StmtKind::Decl(decl) => StmtKind::Decl(self.check_var_decl(ctx, scope, tracker, decl)),
            StmtKind::Expr(e) => StmtKind::Expr(self.check_expr(ctx, scope, tracker, false, e)),
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond = self.check_expr(ctx, scope, tracker, false, cond);
                self.require_bool(ctx, &cond);

                let mut then_tracker = tracker.clone();
                let then_branch = Box::new(self.check_stmt(ctx, scope, &mut then_tracker, *then_branch));

                let (else_branch, else_tracker) = match else_branch {
                    Some(e) => {
                        let mut else_tracker = tracker.clone();
                        let checked = Box::new(self.check_stmt(ctx, scope, &mut else_tracker, *e));
                        (Some(checked), else_tracker)
                    }
                    None => (None, tracker.clone()),
                };
                *tracker = DefiniteAssign::merge(then_tracker, else_tracker);
                StmtKind::If { cond, then_branch, else_branch }
            }
            StmtKind::While { cond, body } => {
                let cond = self.check_expr(ctx, scope, tracker, false, cond);
                self.require_bool(ctx, &cond);
                let mut body_tracker = tracker.clone();
                let body = Box::new(self.check_stmt(ctx, scope, &mut body_tracker, *body));
                StmtKind::While { cond, body }
            }
            StmtKind::Return(value) => {
                let value = value.map(|e| self.check_expr(ctx, scope, tracker, false, e));
                match (&value, self.return_type.is_builtin(Builtin::Void)) {
                    (Some(_), true) => {
                        ctx.error(&self.file.clone(), stmt.span, "cannot return a value from a void function");
                    }
                    (None, false) => {
                        ctx.error(&self.file.clone(), stmt.span, "missing return value");
                    }
                    _ => {}
                }
                let value = value.map(|e| self.coerce_to(ctx, e, &self.return_type.clone()));
                StmtKind::Return(value)
            }
            StmtKind::IncDec { target, is_increment } => {
                let target = self.check_expr(ctx, scope, tracker, true, target);
                if !target.ty.as_ref().is_some_and(|t| t.is_arithmetic() || t.is_pointer_like()) {
                    ctx.error(&self.file.clone(), target.span, "increment/decrement requires an arithmetic or pointer operand");
                }
                self.mark_assignment_target(tracker, &target);
                StmtKind::IncDec { target, is_increment }
            }
        };
        Stmt { kind, ..stmt }
    }

    fn check_var_decl(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        decl: VarDecl,
    ) -> VarDecl {
        let shadows = !ctx.symbols.lookup(scope, &decl.name).is_empty();

        let declared_ty = decl
            .type_expr
            .as_ref()
            .map(|t| resolve_type_expr(ctx, &self.file.clone(), scope, t, &Substitution::new()));

        let init = decl.init.map(|e| self.check_expr(ctx, scope, tracker, false, e));

        let (final_ty, init) = match (declared_ty, init) {
            (Some(declared), Some(init)) => {
                if declared.is_builtin(Builtin::Void) {
                    ctx.error(&self.file.clone(), decl.span, "cannot instantiate type 'void'");
                }
                if init.ty.as_ref() == Some(&declared) {
                    ctx.warning(
                        &self.file.clone(),
                        decl.span,
                        format!("redundant type annotation on '{}'", decl.name),
                    );
                }
                let init = self.coerce_to(ctx, init, &declared);
                (declared, Some(init))
            }
            (Some(declared), None) => {
                if declared.is_builtin(Builtin::Void) {
                    ctx.error(&self.file.clone(), decl.span, "cannot instantiate type 'void'");
                }
                (declared, None)
            }
            (None, Some(init)) => {
                let ty = init.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                (ty, Some(init))
            }
            (None, None) => {
                ctx.error(&self.file.clone(), decl.span, format!("variable '{}' needs a type or an initializer", decl.name));
                (ctx.interner.invalid(), None)
            }
        };

        let mut symbol = Symbol::new(&decl.name, SymbolKind::Variable, decl.span);
        symbol.ty = Some(final_ty);
        let id = ctx.symbols.declare(scope, symbol).ok();
        if shadows {
            ctx.warning(&self.file.clone(), decl.span, format!("declaration of '{}' shadows an outer binding", decl.name));
        }
        if let Some(id) = id {
            ctx.bind(decl.id, id);
            if init.is_some() {
                tracker.mark_initialized(id);
            } else {
                tracker.declare_uninitialized(id);
            }
        }

        VarDecl { init, symbol: id, ..decl }
    }

    fn require_bool(&mut self, ctx: &mut SemanticContext, cond: &Expr) {
        if let Some(ty) = &cond.ty {
            if ty.is_invalid() {
                return;
            }
            if !ty.is_builtin(Builtin::Bool) {
                ctx.error(&self.file.clone(), cond.span, "condition must have type 'bool'");
            }
        }
    }

    fn mark_assignment_target(&self, tracker: &mut DefiniteAssign, target: &Expr) {
        if let ExprKind::RefExpr { resolved: Some(id), .. } = &target.kind {
            tracker.mark_initialized(*id);
        }
    }

    /// Insert a `CoercionExpr` if `from -> to` needs one, or just return
    /// `expr` unchanged for an identity coercion. Emits the single type
    /// mismatch diagnostic on failure and poisons the result to `Invalid`.
    fn coerce_to(&mut self, ctx: &mut SemanticContext, expr: Expr, to: &Type) -> Expr {
        let Some(from) = expr.ty.clone() else { return expr };
        if from.is_invalid() || to.is_invalid() {
            return expr;
        }
        match classify_coercion(&from, to) {
            Some(CoercionKind::Identity) => expr,
            Some(CoercionKind::IntLiteralToInt) => self.wrap_coercion(expr, to.clone(), CoercionKind::IntLiteralToInt),
            Some(kind @ (CoercionKind::NullToPointer | CoercionKind::ArrayToView | CoercionKind::UninitToAny)) => {
                self.wrap_coercion(expr, to.clone(), kind)
            }
            None => {
                if let ExprKind::IntLit { magnitude, negative, .. } = &expr.kind {
                    if let Some(target_b) = to.as_builtin() {
                        if int_fits(*magnitude, *negative, target_b) {
                            return self.wrap_coercion(expr, to.clone(), CoercionKind::IntLiteralToInt);
                        }
                    }
                }
                if let ExprKind::FloatLit(v) = &expr.kind {
                    if let Some(target_b) = to.as_builtin() {
                        if float_fits(*v, target_b) {
                            return self.wrap_coercion(expr, to.clone(), CoercionKind::IntLiteralToInt);
                        }
                    }
                }
                ctx.error(
                    &self.file.clone(),
                    expr.span,
                    format!("type mismatch: expected '{to}', found '{from}'"),
                );
                let mut e = expr;
                e.ty = Some(ctx.interner.invalid());
                e
            }
        }
    }

    fn wrap_coercion(&self, expr: Expr, to: Type, kind: CoercionKind) -> Expr {
        let span = expr.span;
        let id = expr.id;
        Expr {
            id,
            span,
            ty: Some(to),
            kind: ExprKind::CoercionExpr { expr: Box::new(expr), kind },
        }
    }

    fn check_expr(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        in_lvalue: bool,
        expr: Expr,
    ) -> Expr {
        let span = expr.span;
        let id = expr.id;
        let (kind, ty) = match expr.kind {
            ExprKind::IntLit { magnitude, negative, suffix } => {
                let b = suffix
                    .as_deref()
                    .and_then(builtin_from_suffix)
                    .unwrap_or(Builtin::I32);
                let ty = if suffix.is_some() && !int_fits(magnitude, negative, b) {
                    let msg = if negative {
                        format!("negative literal cannot target unsigned type '{}'", b.name())
                    } else {
                        format!("literal '{magnitude}' does not fit in type '{}'", b.name())
                    };
                    ctx.error(&self.file.clone(), span, msg);
                    ctx.interner.invalid()
                } else {
                    ctx.interner.builtin(b)
                };
                (ExprKind::IntLit { magnitude, negative, suffix }, ty)
            }
            ExprKind::FloatLit(v) => (ExprKind::FloatLit(v), ctx.interner.builtin(Builtin::F64)),
            ExprKind::BoolLit(v) => (ExprKind::BoolLit(v), ctx.interner.builtin(Builtin::Bool)),
            ExprKind::StrLit(v) => (ExprKind::StrLit(v), ctx.interner.builtin(Builtin::Str)),
            ExprKind::NullLit => (ExprKind::NullLit, ctx.interner.builtin(Builtin::Null)),
            ExprKind::UninitLit => (ExprKind::UninitLit, ctx.interner.builtin(Builtin::Uninit)),
            ExprKind::SelfExpr { .. } => match self.self_symbol {
                Some(sym) => {
                    let ty = ctx.symbols.symbol(sym).ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                    (ExprKind::SelfExpr { resolved: Some(sym) }, ty)
                }
                None => {
                    ctx.error(&self.file.clone(), span, "'self' used outside of a method");
                    (ExprKind::SelfExpr { resolved: None }, ctx.interner.invalid())
                }
            },
            ExprKind::RefExpr { name, .. } => {
                let candidates = ctx.symbols.lookup(scope, &name);
                match candidates.as_slice() {
                    [] => {
                        ctx.error(&self.file.clone(), span, format!("undefined reference to '{name}'"));
                        (ExprKind::RefExpr { name, resolved: None }, ctx.interner.invalid())
                    }
                    [single] => {
                        let sym = ctx.symbols.symbol(*single);
                        let ty = sym.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                        let kind_ok = matches!(
                            sym.kind,
                            SymbolKind::Variable | SymbolKind::Parameter | SymbolKind::Member
                        );
                        if kind_ok && !in_lvalue && !tracker.is_initialized(*single) {
                            ctx.error(&self.file.clone(), span, format!("use of possibly uninitialized variable '{name}'"));
                        }
                        if kind_ok && in_lvalue {
                            // lvalue context bypasses the read-before-init check;
                            // the enclosing assignment marks it initialized.
                        }
                        (ExprKind::RefExpr { name, resolved: Some(*single) }, ty)
                    }
                    many => {
                        // Overloaded functions referenced without a call:
                        // defer resolution to whichever call site uses this
                        // name, same as `access_transformer.c`'s "only a call
                        // context disambiguates overloads" rule.
                        (
                            ExprKind::RefExpr { name, resolved: Some(many[0]) },
                            ctx.interner.invalid(),
                        )
                    }
                }
            }
            ExprKind::ParenExpr(inner) => {
                let inner = self.check_expr(ctx, scope, tracker, in_lvalue, *inner);
                let ty = inner.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                (ExprKind::ParenExpr(Box::new(inner)), ty)
            }
            ExprKind::UnaryOp { op, operand } => self.check_unary(ctx, scope, tracker, op, *operand),
            ExprKind::BinOp { op, lhs, rhs } if op.is_assignment() => {
                self.check_assignment(ctx, scope, tracker, op, *lhs, *rhs)
            }
            ExprKind::BinOp { op, lhs, rhs } => self.check_binop(ctx, scope, tracker, op, *lhs, *rhs),
            ExprKind::CallExpr { callee, args } => return self.check_call(ctx, scope, tracker, *callee, args, span, id),
            ExprKind::CastExpr { expr: inner, target } => {
                let inner = self.check_expr(ctx, scope, tracker, false, *inner);
                let target_ty = resolve_type_expr(ctx, &self.file.clone(), scope, &target, &Substitution::new());
                if let Some(from) = &inner.ty {
                    if !from.is_invalid() && !target_ty.is_invalid() && !cast_is_legal(from, &target_ty) {
                        ctx.error(&self.file.clone(), span, format!("cannot cast '{from}' to '{target_ty}'"));
                    }
                }
                (ExprKind::CastExpr { expr: Box::new(inner), target }, target_ty)
            }
            ExprKind::CoercionExpr { expr, kind } => {
                let ty = expr.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                (ExprKind::CoercionExpr { expr, kind }, ty)
            }
            ExprKind::AccessExpr { outer, inner } => {
                return self.check_access(ctx, scope, tracker, false, *outer, inner, span, id)
            }
            ExprKind::MemberAccess { instance, member, .. } => {
                let instance = self.check_expr(ctx, scope, tracker, in_lvalue, *instance);
                let (kind, ty) = self.resolve_member(ctx, instance, member, span);
                (kind, ty)
            }
            ExprKind::MethodCall { instance, method, args, .. } => {
                return self.check_call(
                    ctx,
                    scope,
                    tracker,
                    Expr::new(id, span, ExprKind::AccessExpr { outer: instance, inner: method }),
                    args,
                    span,
                    id,
                )
            }
            ExprKind::ConstructExpr { class, inits } => {
                let target_ty = resolve_type_expr(ctx, &self.file.clone(), scope, &class, &Substitution::new());
                let members_scope = class_members_scope(ctx, &target_ty);
                let inits = inits
                    .into_iter()
                    .map(|(name, e)| {
                        let e = self.check_expr(ctx, scope, tracker, false, e);
                        let member_ty = members_scope.and_then(|ms| {
                            ctx.symbols
                                .lookup_local(ms, &name)
                                .first()
                                .map(|id| ctx.symbols.symbol(*id).ty.clone().unwrap_or_else(|| ctx.interner.invalid()))
                        });
                        match member_ty {
                            Some(member_ty) => (name, self.coerce_to(ctx, e, &member_ty)),
                            None => {
                                ctx.error(&self.file.clone(), e.span, format!("no member named '{name}' on '{target_ty}'"));
                                (name, e)
                            }
                        }
                    })
                    .collect();
                (ExprKind::ConstructExpr { class, inits }, target_ty)
            }
            ExprKind::ArrayLit { elements } => {
                let mut checked: Vec<Expr> = elements
                    .into_iter()
                    .map(|e| self.check_expr(ctx, scope, tracker, false, e))
                    .collect();
                if checked.is_empty() {
                    ctx.error(&self.file.clone(), span, "cannot infer the type of an empty array literal");
                    (ExprKind::ArrayLit { elements: checked }, ctx.interner.invalid())
                } else {
                    let elem_ty = checked[0].ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                    for e in checked.iter_mut().skip(1) {
                        let owned = std::mem::replace(e, Expr::new(id, span, ExprKind::NullLit));
                        *e = self.coerce_to(ctx, owned, &elem_ty);
                    }
                    let n = checked.len() as u64;
                    let ty = ctx.interner.array(elem_ty, n);
                    (ExprKind::ArrayLit { elements: checked }, ty)
                }
            }
            ExprKind::ArraySubscript { target, index } => {
                let target = self.check_expr(ctx, scope, tracker, in_lvalue, *target);
                let index = self.check_expr(ctx, scope, tracker, false, *index);
                let usize_ty = ctx.interner.builtin(Builtin::Usize);
                let index = self.coerce_to(ctx, index, &usize_ty);
                let elem_ty = target
                    .ty
                    .as_ref()
                    .and_then(|t| t.element().or_else(|| t.pointee()))
                    .unwrap_or_else(|| ctx.interner.invalid());
                if let Some(t) = &target.ty {
                    if !t.is_invalid() && !t.is_subscriptable() && t.pointee().is_none() {
                        ctx.error(&self.file.clone(), span, format!("type '{t}' is not subscriptable"));
                    }
                }
                (ExprKind::ArraySubscript { target: Box::new(target), index: Box::new(index) }, elem_ty)
            }
            ExprKind::ArraySlice { target, start, end } => {
                let target = self.check_expr(ctx, scope, tracker, false, *target);
                let usize_ty = ctx.interner.builtin(Builtin::Usize);
                let start = self.coerce_to(ctx, self.check_expr(ctx, scope, tracker, false, *start), &usize_ty);
                let end = self.coerce_to(ctx, self.check_expr(ctx, scope, tracker, false, *end), &usize_ty);
                let elem_ty = target.ty.as_ref().and_then(|t| t.element()).unwrap_or_else(|| ctx.interner.invalid());
                let ty = ctx.interner.view(elem_ty);
                (ExprKind::ArraySlice { target: Box::new(target), start: Box::new(start), end: Box::new(end) }, ty)
            }
        };
        Expr { id, span, ty: Some(ty), kind }
    }

    fn check_unary(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        op: UnaryOpKind,
        operand: Expr,
    ) -> (ExprKind, Type) {
        match op {
            UnaryOpKind::AddrOf => {
                let operand = self.check_expr(ctx, scope, tracker, true, operand);
                let ty = operand.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                let ptr = ctx.interner.pointer(ty);
                (ExprKind::UnaryOp { op, operand: Box::new(operand) }, ptr)
            }
            UnaryOpKind::Deref => {
                let operand = self.check_expr(ctx, scope, tracker, false, operand);
                let ty = operand
                    .ty
                    .as_ref()
                    .and_then(|t| t.pointee())
                    .unwrap_or_else(|| {
                        if !operand.ty.as_ref().is_some_and(|t| t.is_invalid()) {
                            ctx.error(&self.file.clone(), operand.span, "cannot dereference a non-pointer type");
                        }
                        ctx.interner.invalid()
                    });
                (ExprKind::UnaryOp { op, operand: Box::new(operand) }, ty)
            }
            UnaryOpKind::Not => {
                let operand = self.check_expr(ctx, scope, tracker, false, operand);
                let bool_ty = ctx.interner.builtin(Builtin::Bool);
                let operand = self.coerce_to(ctx, operand, &bool_ty);
                (ExprKind::UnaryOp { op, operand: Box::new(operand) }, bool_ty)
            }
            UnaryOpKind::Neg => {
                let operand = self.check_expr(ctx, scope, tracker, false, operand);
                let ty = operand.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                if !ty.is_invalid() && !ty.is_arithmetic() {
                    ctx.error(&self.file.clone(), operand.span, "unary '-' requires an arithmetic operand");
                }
                (ExprKind::UnaryOp { op, operand: Box::new(operand) }, ty)
            }
            UnaryOpKind::PreInc | UnaryOpKind::PreDec => {
                let operand = self.check_expr(ctx, scope, tracker, false, operand);
                let ty = operand.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                if !ty.is_invalid() && !ty.is_arithmetic() && !ty.is_pointer_like() {
                    ctx.error(&self.file.clone(), operand.span, "increment/decrement requires an arithmetic or pointer operand");
                }
                self.mark_assignment_target(tracker, &operand);
                (ExprKind::UnaryOp { op, operand: Box::new(operand) }, ty)
            }
        }
    }

    fn check_assignment(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        op: crate::ast::BinOpKind,
        lhs: Expr,
        rhs: Expr,
    ) -> (ExprKind, Type) {
        let lhs = self.check_expr(ctx, scope, tracker, true, lhs);
        if !is_assignable(&lhs.kind) {
            ctx.error(&self.file.clone(), lhs.span, "left-hand side of assignment is not assignable");
        }
        let rhs = self.check_expr(ctx, scope, tracker, false, rhs);
        let lhs_ty = lhs.ty.clone().unwrap_or_else(|| ctx.interner.invalid());

        let rhs = if let Some(arith) = op.underlying_arith() {
            if !lhs_ty.is_invalid() && !lhs_ty.is_arithmetic() {
                ctx.error(&self.file.clone(), lhs.span, format!("'{arith:?}' requires an arithmetic operand"));
            }
            self.coerce_to(ctx, rhs, &lhs_ty)
        } else {
            self.coerce_to(ctx, rhs, &lhs_ty)
        };

        self.mark_assignment_target(tracker, &lhs);
        (ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, lhs_ty)
    }

    fn check_binop(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        op: crate::ast::BinOpKind,
        lhs: Expr,
        rhs: Expr,
    ) -> (ExprKind, Type) {
        use crate::ast::BinOpKind::*;
        let lhs = self.check_expr(ctx, scope, tracker, false, lhs);
        let rhs = self.check_expr(ctx, scope, tracker, false, rhs);
        let lhs_ty = lhs.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
        let rhs_ty = rhs.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
        let poisoned = lhs_ty.is_invalid() || rhs_ty.is_invalid();

        match op {
            Eq | Ne => {
                let bool_ty = ctx.interner.builtin(Builtin::Bool);
                let rhs = if !poisoned && lhs_ty != rhs_ty {
                    let coerced = self.coerce_to(ctx, rhs, &lhs_ty);
                    coerced
                } else {
                    rhs
                };
                (ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, bool_ty)
            }
            Lt | Le | Gt | Ge => {
                let bool_ty = ctx.interner.builtin(Builtin::Bool);
                if !poisoned && (!lhs_ty.is_arithmetic() || !rhs_ty.is_arithmetic()) {
                    ctx.error(&self.file.clone(), lhs.span, "relational operators require arithmetic operands");
                }
                let rhs = if !poisoned && lhs_ty != rhs_ty {
                    self.coerce_to(ctx, rhs, &lhs_ty)
                } else {
                    rhs
                };
                (ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, bool_ty)
            }
            _ => {
                if !poisoned && (!lhs_ty.is_arithmetic() || !rhs_ty.is_arithmetic()) {
                    ctx.error(&self.file.clone(), lhs.span, "arithmetic operators require arithmetic operands");
                }
                let rhs = if !poisoned && lhs_ty != rhs_ty {
                    self.coerce_to(ctx, rhs, &lhs_ty)
                } else {
                    rhs
                };
                let result_ty = if poisoned { ctx.interner.invalid() } else { lhs_ty.clone() };
                (ExprKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, result_ty)
            }
        }
    }

    /// `outer.inner`, grounded in `access_transformer.c`'s
    /// `transform_access_expr`/`transform_ref_expr`: a bare name naming an
    /// imported namespace is resolved against that namespace's exports
    /// *before* falling back to "treat `outer` as an ordinary expression and
    /// look `inner` up as a member of its type".
    fn check_access(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        in_call_context: bool,
        outer: Expr,
        inner: String,
        span: Span,
        id: crate::ast::NodeId,
    ) -> Expr {
        if let ExprKind::RefExpr { name, resolved: None } = &outer.kind {
            let candidates = ctx.symbols.lookup(scope, name);
            if let Some(ns) = candidates.iter().find_map(|c| match &ctx.symbols.symbol(*c).data {
                SymbolData::Namespace(ns) => Some(ns.exports),
                _ => None,
            }) {
                let members = ctx.symbols.lookup_local(ns, &inner);
                return match members.as_slice() {
                    [] => {
                        ctx.error(&self.file.clone(), span, format!("module has no export named '{inner}'"));
                        Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::RefExpr { name: inner, resolved: None } }
                    }
                    found => {
                        let sym = ctx.symbols.symbol(found[0]);
                        let ty = sym.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                        Expr { id, span, ty: Some(ty), kind: ExprKind::RefExpr { name: inner, resolved: Some(found[0]) } }
                    }
                };
            }
        }

        let outer = self.check_expr(ctx, scope, tracker, false, outer);
        self.resolve_member_or_method(ctx, outer, inner, span, id, in_call_context)
    }

    fn resolve_member(&mut self, ctx: &mut SemanticContext, instance: Expr, member: String, span: Span) -> (ExprKind, Type) {
        let id = instance.id;
        let e = self.resolve_member_or_method(ctx, instance, member, span, id, false);
        (e.kind, e.ty.unwrap_or_else(|| ctx.interner.invalid()))
    }

    fn resolve_member_or_method(
        &mut self,
        ctx: &mut SemanticContext,
        outer: Expr,
        inner: String,
        span: Span,
        id: crate::ast::NodeId,
        in_call_context: bool,
    ) -> Expr {
        let outer_ty = outer.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
        if outer_ty.is_invalid() {
            return Expr {
                id,
                span,
                ty: Some(ctx.interner.invalid()),
                kind: ExprKind::MemberAccess { instance: Box::new(outer), member: inner, symbol: None },
            };
        }
        let effective = outer_ty.pointee().unwrap_or_else(|| outer_ty.clone());

        if let Some(members_scope) = class_members_scope(ctx, &effective) {
            let candidates = ctx.symbols.lookup_local(members_scope, &inner);
            if let Some(&found) = candidates.first() {
                let sym = ctx.symbols.symbol(found);
                return match sym.kind {
                    SymbolKind::Member => {
                        let ty = sym.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                        Expr { id, span, ty: Some(ty), kind: ExprKind::MemberAccess { instance: Box::new(outer), member: inner, symbol: Some(found) } }
                    }
                    SymbolKind::Method => {
                        if !in_call_context {
                            ctx.error(&self.file.clone(), span, format!("method '{inner}' must be called"));
                        }
                        Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::MethodCall { instance: Box::new(outer), method: inner, args: Vec::new(), symbol: Some(found), is_builtin: false } }
                    }
                    _ => {
                        ctx.error(&self.file.clone(), span, format!("'{inner}' is not a member of '{effective}'"));
                        Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::MemberAccess { instance: Box::new(outer), member: inner, symbol: None } }
                    }
                };
            }
        }

        if let Some(sig) = ctx.builtin_method(&effective, &inner) {
            if !in_call_context {
                ctx.error(&self.file.clone(), span, format!("method '{inner}' must be called"));
            }
            let _ = sig;
            return Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::MethodCall { instance: Box::new(outer), method: inner, args: Vec::new(), symbol: None, is_builtin: true } };
        }

        ctx.error(&self.file.clone(), span, format!("no member named '{inner}' on type '{effective}'"));
        Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::MemberAccess { instance: Box::new(outer), member: inner, symbol: None } }
    }

    fn check_call(
        &mut self,
        ctx: &mut SemanticContext,
        scope: ScopeId,
        tracker: &mut DefiniteAssign,
        callee: Expr,
        args: Vec<Expr>,
        span: Span,
        id: crate::ast::NodeId,
    ) -> Expr {
        let args: Vec<Expr> = args.into_iter().map(|a| self.check_expr(ctx, scope, tracker, false, a)).collect();

        match callee.kind {
            ExprKind::RefExpr { name, .. } => {
                let candidates: Vec<SymbolId> = ctx
                    .symbols
                    .lookup(scope, &name)
                    .into_iter()
                    .filter(|c| {
                        matches!(
                            ctx.symbols.symbol(*c).kind,
                            SymbolKind::Function | SymbolKind::TemplateFunction
                        )
                    })
                    .collect();
                let Some(&chosen) = candidates
                    .iter()
                    .find(|c| function_signature(ctx, **c).is_some_and(|(p, _)| p.len() == args.len()))
                    .or_else(|| candidates.first())
                else {
                    ctx.error(&self.file.clone(), span, format!("undefined function '{name}'"));
                    return Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::CallExpr { callee: Box::new(Expr { id: callee.id, span: callee.span, ty: Some(ctx.interner.invalid()), kind: ExprKind::RefExpr { name, resolved: None } }), args } };
                };

                let (resolved_symbol, params, return_type) = if ctx.symbols.symbol(chosen).kind == SymbolKind::TemplateFunction {
                    let type_args = templates::infer_template_args(ctx, chosen, &args);
                    match templates::instantiate_function(ctx, &self.file.clone(), chosen, type_args) {
                        Some(instance) => {
                            let (p, r) = function_signature(ctx, instance).unwrap_or((Vec::new(), ctx.interner.invalid()));
                            (instance, p, r)
                        }
                        None => (chosen, Vec::new(), ctx.interner.invalid()),
                    }
                } else {
                    let (p, r) = function_signature(ctx, chosen).unwrap_or((Vec::new(), ctx.interner.invalid()));
                    (chosen, p, r)
                };

                if params.len() != args.len() {
                    ctx.error(&self.file.clone(), span, format!("'{name}' expects {} argument(s), found {}", params.len(), args.len()));
                }
                let args: Vec<Expr> = args
                    .into_iter()
                    .zip(params.iter().map(Some).chain(std::iter::repeat(None)))
                    .map(|(a, p)| match p {
                        Some(p) => self.coerce_to(ctx, a, p),
                        None => a,
                    })
                    .collect();

                Expr {
                    id,
                    span,
                    ty: Some(return_type),
                    kind: ExprKind::CallExpr {
                        callee: Box::new(Expr { id: callee.id, span: callee.span, ty: None, kind: ExprKind::RefExpr { name, resolved: Some(resolved_symbol) } }),
                        args,
                    },
                }
            }
            ExprKind::AccessExpr { outer, inner } => {
                let resolved = self.check_access(ctx, scope, tracker, true, *outer, inner, callee.span, callee.id);
                self.finish_method_call(ctx, resolved, args, span, id)
            }
            ExprKind::MethodCall { instance, method, .. } => {
                let resolved = self.resolve_member_or_method(ctx, self.check_expr(ctx, scope, tracker, false, *instance), method, callee.span, callee.id, true);
                self.finish_method_call(ctx, resolved, args, span, id)
            }
            other => {
                let callee = self.check_expr(ctx, scope, tracker, false, Expr { id: callee.id, span: callee.span, ty: None, kind: other });
                ctx.error(&self.file.clone(), span, "expression is not callable");
                Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::CallExpr { callee: Box::new(callee), args } }
            }
        }
    }

    fn finish_method_call(&mut self, ctx: &mut SemanticContext, resolved: Expr, args: Vec<Expr>, span: Span, id: crate::ast::NodeId) -> Expr {
        match resolved.kind {
            ExprKind::MethodCall { instance, method, symbol, is_builtin, .. } => {
                let (params, return_type) = if is_builtin {
                    let receiver_ty = instance.ty.clone().unwrap_or_else(|| ctx.interner.invalid());
                    let effective = receiver_ty.pointee().unwrap_or(receiver_ty);
                    match ctx.builtin_method(&effective, &method) {
                        Some(sig) => (sig.params, sig.return_type),
                        None => (Vec::new(), ctx.interner.invalid()),
                    }
                } else {
                    symbol.and_then(|s| function_signature(ctx, s)).unwrap_or((Vec::new(), ctx.interner.invalid()))
                };
                if params.len() != args.len() {
                    ctx.error(&self.file.clone(), span, format!("'{method}' expects {} argument(s), found {}", params.len(), args.len()));
                }
                let args: Vec<Expr> = args
                    .into_iter()
                    .zip(params.iter().map(Some).chain(std::iter::repeat(None)))
                    .map(|(a, p)| match p {
                        Some(p) => self.coerce_to(ctx, a, p),
                        None => a,
                    })
                    .collect();
                Expr { id, span, ty: Some(return_type), kind: ExprKind::MethodCall { instance, method, args, symbol, is_builtin } }
            }
            other => {
                ctx.error(&self.file.clone(), span, "expression is not callable");
                Expr { id, span, ty: Some(ctx.interner.invalid()), kind: ExprKind::CallExpr { callee: Box::new(Expr { id: resolved.id, span: resolved.span, ty: resolved.ty, kind: other }), args } }
            }
        }
    }
}

fn is_assignable(kind: &ExprKind) -> bool {
    matches!(
        kind,
        ExprKind::RefExpr { .. }
            | ExprKind::MemberAccess { .. }
            | ExprKind::ArraySubscript { .. }
            | ExprKind::UnaryOp { op: UnaryOpKind::Deref, .. }
    )
}

fn cast_is_legal(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    if from.is_arithmetic() && to.is_arithmetic() {
        return true;
    }
    if from.pointee().is_some() && to.pointee().is_some() {
        return true;
    }
    if from.pointee().is_some() && to.as_builtin().is_some_and(|b| matches!(b, Builtin::Isize | Builtin::Usize)) {
        return true;
    }
    if to.pointee().is_some() && from.as_builtin().is_some_and(|b| matches!(b, Builtin::Isize | Builtin::Usize)) {
        return true;
    }
    false
}

fn builtin_from_suffix(suffix: &str) -> Option<Builtin> {
    use Builtin::*;
    Some(match suffix {
        "i8" => I8,
        "i16" => I16,
        "i32" => I32,
        "i64" => I64,
        "u8" => U8,
        "u16" => U16,
        "u32" => U32,
        "u64" => U64,
        "isize" => Isize,
        "usize" => Usize,
        "f32" => F32,
        "f64" => F64,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn check(src: &str) -> (SemanticContext, DiagnosticSnapshot) {
        let mut ctx = SemanticContext::new();
        let (root, diags) = parse_file("a.shiro", src);
        assert!(diags.succeeded(), "{diags:?}");
        let root = super::super::analyze_standalone(&mut ctx, "a.shiro", root);
        let _ = root;
        let snap = DiagnosticSnapshot { succeeded: ctx.diagnostics.succeeded() };
        (ctx, snap)
    }

    struct DiagnosticSnapshot {
        succeeded: bool,
    }

    #[test]
    fn simple_function_type_checks() {
        let (_ctx, snap) = check("fn add(a: i32, b: i32) -> i32 { return a + b; }");
        assert!(snap.succeeded);
    }

    #[test]
    fn return_type_mismatch_is_an_error() {
        let (_ctx, snap) = check("fn f() -> i32 { return true; }");
        assert!(!snap.succeeded);
    }

    #[test]
    fn use_of_uninitialized_variable_is_an_error() {
        let (_ctx, snap) = check("fn f() -> i32 { var x: i32; return x; }");
        assert!(!snap.succeeded);
    }

    #[test]
    fn variable_initialized_on_both_if_branches_is_definitely_assigned() {
        let (_ctx, snap) = check(
            "fn f(cond: bool) -> i32 { var x: i32; if (cond) { x = 1; } else { x = 2; } return x; }",
        );
        assert!(snap.succeeded);
    }

    #[test]
    fn variable_initialized_on_only_one_branch_is_an_error() {
        let (_ctx, snap) = check(
            "fn f(cond: bool) -> i32 { var x: i32; if (cond) { x = 1; } return x; }",
        );
        assert!(!snap.succeeded);
    }

    #[test]
    fn class_member_access_type_checks() {
        let (_ctx, snap) = check(
            "class Point { var x: i32; var y: i32; } fn f() -> i32 { var p: Point = Point { x = 1, y = 2 }; return p.x; }",
        );
        assert!(snap.succeeded);
    }

    #[test]
    fn calling_undefined_function_is_an_error() {
        let (_ctx, snap) = check("fn f() -> void { g(); }");
        assert!(!snap.succeeded);
    }
}

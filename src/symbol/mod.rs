//! Symbols and scoped, overload-aware symbol tables (spec §3.3).
//!
//! Symbols and AST nodes naturally want to point at each other (a class
//! symbol's member table points at member declarations; a resolved
//! reference expression points at its symbol). Rather than let that become
//! a real ownership cycle, every cross-reference here is a plain `Copy`
//! index (`SymbolId`, `ScopeId`) into arenas owned by the
//! [`crate::sema::SemanticContext`] for the duration of one compilation run
//! (see Design Notes in `DESIGN.md`: arena indices instead of back-pointers).

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{ClassDef, Expr, FnDef};
use crate::lexer::Span;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Method,
    Class,
    Member,
    Namespace,
    TypeParameter,
    TemplateClass,
    TemplateFunction,
    ClassInstance,
    FunctionInstance,
}

#[derive(Debug, Clone)]
pub struct FunctionData {
    pub params: Vec<Type>,
    pub return_type: Type,
    pub overload_index: usize,
    pub extern_abi: Option<String>,
    pub is_builtin: bool,
}

#[derive(Debug, Clone)]
pub struct ClassData {
    /// Unified scope holding both `Member` and `Method` symbols.
    pub members: ScopeId,
}

#[derive(Debug, Clone)]
pub struct MemberData {
    pub default_value: Option<Rc<Expr>>,
}

#[derive(Debug, Clone)]
pub struct NamespaceData {
    pub exports: ScopeId,
}

/// A template's original definition: shared, read-only, cloned per
/// instantiation rather than mutated in place. Function templates
/// (`fn f<T>(...)`) and class templates (`class Pair<A, B> { ... }`) are
/// both represented here since either may carry type parameters.
#[derive(Debug, Clone)]
pub enum TemplateDef {
    Fn(Rc<FnDef>),
    Class(Rc<ClassDef>),
}

#[derive(Debug, Clone)]
pub struct TemplateData {
    pub type_params: Vec<SymbolId>,
    /// Scope containing the template's own type-parameter symbols.
    pub template_scope: ScopeId,
    pub def: TemplateDef,
    pub instances: HashMap<Vec<Type>, SymbolId>,
}

/// A concrete instantiation of a template. Carries provenance (which
/// template, which arguments — the cache key in `TemplateData::instances`)
/// alongside the same operational data a plain, non-generic symbol of the
/// matching kind would carry, so callers needing "the member scope of this
/// class" or "the signature of this function" don't need to branch on
/// whether they hold a `Class`/`Function` symbol or an instantiated one
/// (see `sema::resolve::class_members_scope` / `function_signature`).
#[derive(Debug, Clone)]
pub struct InstanceData {
    pub template: SymbolId,
    pub type_args: Vec<Type>,
    /// Set for a `ClassInstance`.
    pub members: Option<ScopeId>,
    /// Set for a `FunctionInstance`.
    pub function: Option<FunctionData>,
}

#[derive(Debug, Clone)]
pub enum SymbolData {
    None,
    Function(FunctionData),
    Class(ClassData),
    Member(MemberData),
    Namespace(NamespaceData),
    Template(TemplateData),
    Instance(InstanceData),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub span: Span,
    /// Type of the binding; absent for namespaces and templates.
    pub ty: Option<Type>,
    pub parent_namespace: Option<SymbolId>,
    pub data: SymbolData,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
            ty: None,
            parent_namespace: None,
            data: SymbolData::None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, SymbolKind::Function | SymbolKind::Method)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Class,
    Method,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub kind_: Option<ScopeKind>,
    pub parent: Option<ScopeId>,
    names: HashMap<String, Vec<SymbolId>>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind_: Some(kind),
            parent,
            names: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind_.unwrap_or(ScopeKind::Block)
    }

    pub fn local(&self, name: &str) -> &[SymbolId] {
        self.names.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, &[SymbolId])> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Owns every [`Symbol`] and [`Scope`] created during one compilation run.
/// `SymbolId`/`ScopeId` are indices into this arena; they are only
/// meaningful paired with the table that produced them.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclareError {
    /// (I1) a non-overloadable name already exists in this *local* scope.
    Redeclared,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope::new(kind, parent));
        ScopeId((self.scopes.len() - 1) as u32)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    /// Insert a symbol into `scope`. Enforces (I1): a local name may have
    /// more than one binding only if every existing binding, and the new
    /// one, is a `Function`/`Method` (overloading).
    pub fn declare(&mut self, scope: ScopeId, mut symbol: Symbol) -> Result<SymbolId, DeclareError> {
        let overloadable = symbol.is_callable();
        {
            let s = self.scope(scope);
            let existing = s.local(&symbol.name);
            if !existing.is_empty() {
                let all_overloadable = overloadable
                    && existing
                        .iter()
                        .all(|id| self.symbol(*id).is_callable());
                if !all_overloadable {
                    return Err(DeclareError::Redeclared);
                }
            }
        }
        if let SymbolData::Function(ref mut f) = symbol.data {
            f.overload_index = self.scope(scope).local(&symbol.name).len();
        }
        self.symbols.push(symbol);
        let id = SymbolId((self.symbols.len() - 1) as u32);
        let name = self.symbols[id.0 as usize].name.clone();
        self.scope_mut(scope).names.entry(name).or_default().push(id);
        Ok(id)
    }

    /// First existing symbol under `name`, if any, in the given scope's
    /// chain. Used to report "previously from <loc>" on redeclaration.
    pub fn first_existing(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).local(name).first().copied()
    }

    /// Local-only lookup (spec 3.3: "*local* lookup checks only the current
    /// scope").
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Vec<SymbolId> {
        self.scope(scope).local(name).to_vec()
    }

    /// Walk up the parent chain, returning the first scope (innermost to
    /// outermost) that binds `name`, plus its candidate list.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Vec<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            let found = s.local(name);
            if !found.is_empty() {
                return found.to_vec();
            }
            current = s.parent;
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::default()
    }

    #[test]
    fn redeclaration_of_variable_is_rejected() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(ScopeKind::Global, None);
        table
            .declare(global, Symbol::new("x", SymbolKind::Variable, span()))
            .unwrap();
        let err = table.declare(global, Symbol::new("x", SymbolKind::Variable, span()));
        assert_eq!(err, Err(DeclareError::Redeclared));
    }

    #[test]
    fn function_overloads_are_tolerated() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(ScopeKind::Global, None);
        let mut a = Symbol::new("f", SymbolKind::Function, span());
        a.data = SymbolData::Function(FunctionData {
            params: vec![],
            return_type: {
                let mut i = crate::types::TypeInterner::new();
                i.builtin(crate::types::Builtin::Void)
            },
            overload_index: 0,
            extern_abi: None,
            is_builtin: false,
        });
        let mut b = a.clone();
        b.span = span();
        table.declare(global, a).unwrap();
        assert!(table.declare(global, b).is_ok());
        assert_eq!(table.lookup_local(global, "f").len(), 2);
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(ScopeKind::Global, None);
        let child = table.new_scope(ScopeKind::Block, Some(global));
        table
            .declare(global, Symbol::new("x", SymbolKind::Variable, span()))
            .unwrap();
        assert_eq!(table.lookup(child, "x").len(), 1);
        assert!(table.lookup_local(child, "x").is_empty());
    }
}

//! AST node kinds (spec §3.2).
//!
//! Every node is a small struct carrying the common fields the spec
//! requires — a stable `NodeId` (used by [`crate::diagnostics`] to attach a
//! diagnostic to a node without the node owning a `Vec<Diagnostic>`; see
//! `DESIGN.md` for why a flat, id-keyed diagnostic list was chosen over
//! nodes owning their own diagnostics), a source span, and (on expressions)
//! a `ty` slot filled in by the type-checker pass — plus a `kind` enum
//! distinguishing the concrete variant. Dispatch over `kind` is a plain
//! `match`; see [`visit`] and [`transform`] for the visitor/transformer
//! traits built on top of that.

pub mod printer;
pub mod transform;
pub mod visit;

use std::rc::Rc;

use crate::lexer::Span;
use crate::symbol::SymbolId;
use crate::types::{Builtin, CoercionKind, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Hands out increasing `NodeId`s for one parse. Not `Clone`: a single
/// parser instance owns it so ids stay unique within one `Root`.
#[derive(Debug, Default)]
pub struct NodeIdGen(u32);

impl NodeIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.0);
        self.0 += 1;
        id
    }
}

/// Unresolved, syntactic type reference as written by the programmer. Name
/// resolution (§4.5.3) later turns `Named` into a canonical `Type` via
/// `TypeInterner::user_unresolved` / `class`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Builtin(Builtin),
    Named {
        name: String,
        type_args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Array(Box<TypeExpr>, ArraySize),
    HeapArray(Box<TypeExpr>),
    View(Box<TypeExpr>),
    /// Recovery placeholder left by the parser where a type was expected but
    /// the token stream didn't contain one; resolves to `Type::invalid()`.
    Invalid,
}

/// An array's compile-time size, either already a literal or an expression
/// to be folded by `sema::templates::resolve_array_sizes`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArraySize {
    Literal(u64),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Neg,
    Not,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
}

impl BinOpKind {
    pub fn is_assignment(self) -> bool {
        use BinOpKind::*;
        matches!(
            self,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | RemAssign
        )
    }

    /// The arithmetic operator a compound assignment desugars to when
    /// checked "as if `lhs = lhs op rhs`" (spec §4.5.5).
    pub fn underlying_arith(self) -> Option<BinOpKind> {
        use BinOpKind::*;
        Some(match self {
            AddAssign => Add,
            SubAssign => Sub,
            MulAssign => Mul,
            DivAssign => Div,
            RemAssign => Rem,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub ty: Option<Type>,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: NodeId, span: Span, kind: ExprKind) -> Self {
        Self {
            id,
            span,
            ty: None,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit {
        magnitude: u64,
        negative: bool,
        suffix: Option<String>,
    },
    FloatLit(f64),
    BoolLit(bool),
    StrLit(String),
    NullLit,
    UninitLit,
    RefExpr {
        name: String,
        resolved: Option<SymbolId>,
    },
    SelfExpr {
        resolved: Option<SymbolId>,
    },
    ParenExpr(Box<Expr>),
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<Expr>,
    },
    BinOp {
        op: BinOpKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    CallExpr {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    CastExpr {
        expr: Box<Expr>,
        target: TypeExpr,
    },
    /// Compiler-inserted; never produced by the parser.
    CoercionExpr {
        expr: Box<Expr>,
        kind: CoercionKind,
    },
    /// Parser form of `outer.inner`; resolved by pass 2 into
    /// `MemberAccess`, `MethodCall`, or a bare `RefExpr`.
    AccessExpr {
        outer: Box<Expr>,
        inner: String,
    },
    MemberAccess {
        instance: Box<Expr>,
        member: String,
        symbol: Option<SymbolId>,
    },
    MethodCall {
        instance: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        symbol: Option<SymbolId>,
        is_builtin: bool,
    },
    ConstructExpr {
        class: TypeExpr,
        inits: Vec<(String, Expr)>,
    },
    ArrayLit {
        elements: Vec<Expr>,
    },
    ArraySubscript {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    ArraySlice {
        target: Box<Expr>,
        start: Box<Expr>,
        end: Box<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub type_expr: Option<TypeExpr>,
    pub init: Option<Expr>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub type_expr: TypeExpr,
    pub symbol: Option<SymbolId>,
}

pub type MemberDecl = VarDecl;

#[derive(Debug, Clone)]
pub struct TypeParamDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct FnDef {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub return_type: Option<TypeExpr>,
    pub body: Stmt,
    pub type_params: Vec<TypeParamDecl>,
    pub exported: bool,
    pub extern_abi: Option<String>,
    pub symbol: Option<SymbolId>,
}

pub type MethodDef = FnDef;

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub members: Vec<MemberDecl>,
    pub methods: Vec<MethodDef>,
    pub type_params: Vec<TypeParamDecl>,
    pub exported: bool,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct ImportDef {
    pub id: NodeId,
    pub span: Span,
    pub namespace: String,
    pub module: String,
}

#[derive(Debug, Clone)]
pub enum TopLevelDef {
    Fn(Rc<FnDef>),
    Class(ClassDef),
    Import(ImportDef),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(id: NodeId, span: Span, kind: StmtKind) -> Self {
        Self { id, span, kind }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Compound(Vec<Stmt>),
    Decl(VarDecl),
    Expr(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    IncDec {
        target: Expr,
        is_increment: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Root {
    pub file: String,
    pub defs: Vec<TopLevelDef>,
}

//! Canonical, hash-consed representation of Shiro types.
//!
//! Two `Type` values are semantically equal iff they are the *same*
//! allocation: every constructor goes through a [`TypeInterner`] so that
//! equality checks downstream degrade to a pointer comparison (`Rc::ptr_eq`).
//! The interner's lifetime is bound to a single compilation run; it is never
//! a process-wide singleton (see `SemanticContext::new`), so tests can build
//! a fresh one per case without cross-test contamination.

mod coerce;

pub use coerce::{classify_coercion, float_fits, int_fits, CoercionKind};

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::symbol::SymbolId;

/// The fixed set of builtin scalar kinds, plus the two pseudo-types used
/// only during inference (`null`, `uninit`); those never survive into a
/// validated tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Isize,
    Usize,
    F32,
    F64,
    Str,
    Null,
    Uninit,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        use Builtin::*;
        match self {
            Void => "void",
            Bool => "bool",
            I8 => "i8",
            I16 => "i16",
            I32 => "i32",
            I64 => "i64",
            U8 => "u8",
            U16 => "u16",
            U32 => "u32",
            U64 => "u64",
            Isize => "isize",
            Usize => "usize",
            F32 => "f32",
            F64 => "f64",
            Str => "string",
            Null => "null",
            Uninit => "uninit",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Builtin::I8
                | Builtin::I16
                | Builtin::I32
                | Builtin::I64
                | Builtin::U8
                | Builtin::U16
                | Builtin::U32
                | Builtin::U64
                | Builtin::Isize
                | Builtin::Usize
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Builtin::F32 | Builtin::F64)
    }

    pub fn is_arithmetic(self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Builtin::I8 | Builtin::I16 | Builtin::I32 | Builtin::I64 | Builtin::Isize
        )
    }

    /// Magnitude of the most negative value representable, as an unsigned
    /// 64-bit quantity (e.g. `i8::MIN` has magnitude 128). Panics for
    /// non-integer or unsigned kinds; callers only invoke this after
    /// checking `is_signed()`.
    pub fn min_magnitude(self) -> u64 {
        match self {
            Builtin::I8 => 1u64 << 7,
            Builtin::I16 => 1u64 << 15,
            Builtin::I32 => 1u64 << 31,
            Builtin::I64 => 1u64 << 63,
            Builtin::Isize => 1u64 << 63,
            _ => unreachable!("min_magnitude on non-signed builtin {self:?}"),
        }
    }

    pub fn max_magnitude(self) -> u64 {
        match self {
            Builtin::I8 => i8::MAX as u64,
            Builtin::I16 => i16::MAX as u64,
            Builtin::I32 => i32::MAX as u64,
            Builtin::I64 => i64::MAX as u64,
            Builtin::Isize => i64::MAX as u64,
            Builtin::U8 => u8::MAX as u64,
            Builtin::U16 => u16::MAX as u64,
            Builtin::U32 => u32::MAX as u64,
            Builtin::U64 => u64::MAX,
            Builtin::Usize => u64::MAX,
            _ => unreachable!("max_magnitude on non-integer builtin {self:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Invalid,
    Builtin(Builtin),
    Pointer(Type),
    Array(Type, u64),
    HeapArray(Type),
    View(Type),
    /// Created by the parser when the referenced class is not yet known.
    UserUnresolved { name: String, type_args: Vec<Type> },
    /// A resolved user type; carries the class name purely for diagnostics
    /// (the symbol table is the source of truth for anything else).
    Class { symbol: SymbolId, name: Rc<str> },
    /// Valid only inside a template scope.
    Variable(String),
}

/// A hash-consed handle. Cloning is an `Rc` bump; equality and hashing are
/// by allocation identity, never structural.
#[derive(Debug, Clone)]
pub struct Type(Rc<TypeKind>);

impl Type {
    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    pub fn is_invalid(&self) -> bool {
        matches!(*self.0, TypeKind::Invalid)
    }

    pub fn is_builtin(&self, b: Builtin) -> bool {
        matches!(*self.0, TypeKind::Builtin(k) if k == b)
    }

    pub fn as_builtin(&self) -> Option<Builtin> {
        match *self.0 {
            TypeKind::Builtin(k) => Some(k),
            _ => None,
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        self.as_builtin().is_some_and(Builtin::is_arithmetic)
    }

    pub fn is_integer(&self) -> bool {
        self.as_builtin().is_some_and(Builtin::is_integer)
    }

    pub fn is_float(&self) -> bool {
        self.as_builtin().is_some_and(Builtin::is_float)
    }

    pub fn is_signed(&self) -> bool {
        self.as_builtin().is_some_and(Builtin::is_signed)
    }

    /// A pointer, or the `null` pseudo-type used during inference.
    pub fn is_pointer_like(&self) -> bool {
        matches!(*self.0, TypeKind::Pointer(_)) || self.is_builtin(Builtin::Null)
    }

    pub fn is_subscriptable(&self) -> bool {
        matches!(
            *self.0,
            TypeKind::Array(..) | TypeKind::HeapArray(_) | TypeKind::View(_)
        )
    }

    /// Element type for array/heap-array/view; `None` otherwise.
    pub fn element(&self) -> Option<Type> {
        match &*self.0 {
            TypeKind::Array(t, _) | TypeKind::HeapArray(t) | TypeKind::View(t) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<Type> {
        match &*self.0 {
            TypeKind::Pointer(t) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn class_symbol(&self) -> Option<SymbolId> {
        match &*self.0 {
            TypeKind::Class { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            TypeKind::Invalid => write!(f, "<invalid>"),
            TypeKind::Builtin(b) => write!(f, "{}", b.name()),
            TypeKind::Pointer(t) => write!(f, "*{t}"),
            TypeKind::Array(t, n) => write!(f, "[{t}, {n}]"),
            TypeKind::HeapArray(t) => write!(f, "[]{t}"),
            TypeKind::View(t) => write!(f, "view[{t}]"),
            TypeKind::UserUnresolved { name, type_args } => {
                write!(f, "{name}")?;
                if !type_args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in type_args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{a}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeKind::Class { name, .. } => write!(f, "{name}"),
            TypeKind::Variable(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct TypeInterner {
    invalid: Option<Type>,
    builtins: HashMap<Builtin, Type>,
    pointers: HashMap<Type, Type>,
    arrays: HashMap<(Type, u64), Type>,
    heap_arrays: HashMap<Type, Type>,
    views: HashMap<Type, Type>,
    user_unresolved: HashMap<(String, Vec<Type>), Type>,
    classes: HashMap<SymbolId, Type>,
    variables: HashMap<String, Type>,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalid(&mut self) -> Type {
        if let Some(t) = &self.invalid {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::Invalid));
        self.invalid = Some(t.clone());
        t
    }

    pub fn builtin(&mut self, b: Builtin) -> Type {
        if let Some(t) = self.builtins.get(&b) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::Builtin(b)));
        self.builtins.insert(b, t.clone());
        t
    }

    pub fn pointer(&mut self, pointee: Type) -> Type {
        if let Some(t) = self.pointers.get(&pointee) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::Pointer(pointee.clone())));
        self.pointers.insert(pointee, t.clone());
        t
    }

    pub fn array(&mut self, elem: Type, size: u64) -> Type {
        let key = (elem.clone(), size);
        if let Some(t) = self.arrays.get(&key) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::Array(elem, size)));
        self.arrays.insert(key, t.clone());
        t
    }

    pub fn heap_array(&mut self, elem: Type) -> Type {
        if let Some(t) = self.heap_arrays.get(&elem) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::HeapArray(elem.clone())));
        self.heap_arrays.insert(elem, t.clone());
        t
    }

    pub fn view(&mut self, elem: Type) -> Type {
        if let Some(t) = self.views.get(&elem) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::View(elem.clone())));
        self.views.insert(elem, t.clone());
        t
    }

    pub fn user_unresolved(&mut self, name: impl Into<String>, type_args: Vec<Type>) -> Type {
        let name = name.into();
        let key = (name.clone(), type_args.clone());
        if let Some(t) = self.user_unresolved.get(&key) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::UserUnresolved { name, type_args }));
        self.user_unresolved.insert(key, t.clone());
        t
    }

    pub fn class(&mut self, symbol: SymbolId, name: impl Into<Rc<str>>) -> Type {
        if let Some(t) = self.classes.get(&symbol) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::Class {
            symbol,
            name: name.into(),
        }));
        self.classes.insert(symbol, t.clone());
        t
    }

    pub fn variable(&mut self, name: impl Into<String>) -> Type {
        let name = name.into();
        if let Some(t) = self.variables.get(&name) {
            return t.clone();
        }
        let t = Type(Rc::new(TypeKind::Variable(name.clone())));
        self.variables.insert(name, t.clone());
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_canonicalized() {
        let mut interner = TypeInterner::new();
        let a = interner.builtin(Builtin::I32);
        let b = interner.builtin(Builtin::I32);
        assert_eq!(a, b);
    }

    #[test]
    fn pointers_are_canonicalized() {
        let mut interner = TypeInterner::new();
        let i32_t = interner.builtin(Builtin::I32);
        let p1 = interner.pointer(i32_t.clone());
        let p2 = interner.pointer(i32_t);
        assert_eq!(p1, p2);
    }

    #[test]
    fn arrays_distinguish_size() {
        let mut interner = TypeInterner::new();
        let i32_t = interner.builtin(Builtin::I32);
        let a5 = interner.array(i32_t.clone(), 5);
        let a6 = interner.array(i32_t, 6);
        assert_ne!(a5, a6);
    }

    #[test]
    fn distinct_kinds_are_not_equal() {
        let mut interner = TypeInterner::new();
        let i32_t = interner.builtin(Builtin::I32);
        let i64_t = interner.builtin(Builtin::I64);
        assert_ne!(i32_t, i64_t);
    }

    #[test]
    fn invalid_equals_itself_and_nothing_else() {
        let mut interner = TypeInterner::new();
        let inv1 = interner.invalid();
        let inv2 = interner.invalid();
        let i32_t = interner.builtin(Builtin::I32);
        assert_eq!(inv1, inv2);
        assert_ne!(inv1, i32_t);
    }
}

//! Implicit coercion rules (spec §3.1, §4.5.5).
//!
//! These helpers are pure predicates; the AST node that actually wraps an
//! expression in a `Coercion` lives in `sema::check`, since that is where
//! the expression tree is available to mutate.

use super::{Builtin, Type, TypeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
    /// Source and target are already the same type; no node is inserted.
    Identity,
    IntLiteralToInt,
    NullToPointer,
    ArrayToView,
    UninitToAny,
}

/// Decide whether `from -> to` is legal without considering literal-specific
/// magnitude checks (those require the literal's value, see [`int_fits`] /
/// [`float_fits`] and are applied by the caller for `IntLiteralToInt`).
pub fn classify_coercion(from: &Type, to: &Type) -> Option<CoercionKind> {
    if from == to {
        return Some(CoercionKind::Identity);
    }

    if from.is_builtin(Builtin::Uninit) {
        return Some(CoercionKind::UninitToAny);
    }

    if from.is_builtin(Builtin::Null) && matches!(to.kind(), TypeKind::Pointer(_)) {
        return Some(CoercionKind::NullToPointer);
    }

    if let (TypeKind::Array(from_elem, _), TypeKind::View(to_elem)) = (from.kind(), to.kind()) {
        if from_elem == to_elem {
            return Some(CoercionKind::ArrayToView);
        }
    }

    None
}

/// Range check for an integer literal coercing into `target`: magnitude is
/// stored unsigned with a separate sign flag (spec §4.1 "Numeric semantics").
pub fn int_fits(magnitude: u64, negative: bool, target: Builtin) -> bool {
    if !target.is_integer() {
        return false;
    }
    if negative {
        target.is_signed() && magnitude <= target.min_magnitude()
    } else {
        magnitude <= target.max_magnitude()
    }
}

/// Range check for a float literal: must be <= the target's finite maximum.
pub fn float_fits(value: f64, target: Builtin) -> bool {
    match target {
        Builtin::F32 => value.abs() <= f32::MAX as f64,
        Builtin::F64 => value.abs() <= f64::MAX,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_rejects_256() {
        assert!(!int_fits(256, false, Builtin::U8));
        assert!(int_fits(255, false, Builtin::U8));
    }

    #[test]
    fn negative_literal_requires_signed_target() {
        assert!(!int_fits(1, true, Builtin::U32));
        assert!(int_fits(1, true, Builtin::I32));
    }

    #[test]
    fn i32_min_boundary() {
        assert!(int_fits(1u64 << 31, true, Builtin::I32));
        assert!(!int_fits((1u64 << 31) + 1, true, Builtin::I32));
    }
}

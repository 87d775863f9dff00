//! Definite-assignment tracking (spec §4.5.4), grounded in
//! `original_source/src/sema/init_tracker.c`: a flat map from variable symbol
//! to "has this been assigned on every path reaching here". The C original
//! keys by pointer identity into a `hash_table`; `SymbolId` already gives us
//! that identity for free, so the whole thing degrades to a `HashMap`.
//!
//! `if`/`while` need to fork the tracker for one branch, analyze both
//! branches against their own fork, then recombine (`merge`) before
//! continuing past the statement — a variable is definitely assigned after
//! an `if` only if both arms assigned it, and a `while` body's assignments
//! never escape past the loop (the merge is against the *entry* state, not
//! the body's exit state, since the loop may execute zero times).

use std::collections::HashMap;

use crate::symbol::SymbolId;

#[derive(Debug, Clone, Default)]
pub struct DefiniteAssign {
    assigned: HashMap<SymbolId, bool>,
}

impl DefiniteAssign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_uninitialized(&mut self, symbol: SymbolId) {
        self.assigned.entry(symbol).or_insert(false);
    }

    pub fn mark_initialized(&mut self, symbol: SymbolId) {
        self.assigned.insert(symbol, true);
    }

    pub fn is_initialized(&self, symbol: SymbolId) -> bool {
        self.assigned.get(&symbol).copied().unwrap_or(false)
    }

    /// Combine two trackers that diverged at a branch point: a symbol is
    /// initialized in the result only if it was initialized on both sides.
    /// Symbols tracked by only one side carry over as whatever that side
    /// says (mirrors `init_tracker_merge`'s key-union behavior — a variable
    /// declared inside only one arm is still "known" afterward, just never
    /// definitely assigned unless that one arm is the only one reached).
    pub fn merge(a: DefiniteAssign, b: DefiniteAssign) -> DefiniteAssign {
        let mut result = HashMap::new();
        for (sym, a_init) in &a.assigned {
            let b_init = b.assigned.get(sym).copied().unwrap_or(false);
            result.insert(*sym, *a_init && b_init);
        }
        for (sym, b_init) in &b.assigned {
            result.entry(*sym).or_insert(*b_init && a.assigned.get(sym).copied().unwrap_or(false));
        }
        DefiniteAssign { assigned: result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(n: u32) -> SymbolId {
        SymbolId(n)
    }

    #[test]
    fn unset_variable_is_not_initialized() {
        let mut t = DefiniteAssign::new();
        t.declare_uninitialized(sym(0));
        assert!(!t.is_initialized(sym(0)));
    }

    #[test]
    fn merge_requires_both_branches_to_initialize() {
        let mut then_branch = DefiniteAssign::new();
        then_branch.declare_uninitialized(sym(0));
        then_branch.mark_initialized(sym(0));

        let mut else_branch = DefiniteAssign::new();
        else_branch.declare_uninitialized(sym(0));

        let merged = DefiniteAssign::merge(then_branch, else_branch);
        assert!(!merged.is_initialized(sym(0)));
    }

    #[test]
    fn merge_keeps_assignment_when_both_branches_assign() {
        let mut then_branch = DefiniteAssign::new();
        then_branch.mark_initialized(sym(1));
        let mut else_branch = DefiniteAssign::new();
        else_branch.mark_initialized(sym(1));

        let merged = DefiniteAssign::merge(then_branch, else_branch);
        assert!(merged.is_initialized(sym(1)));
    }

    #[test]
    fn while_body_assignments_do_not_leak_past_loop() {
        let entry = DefiniteAssign::new();
        let mut body = entry.clone();
        body.declare_uninitialized(sym(2));
        body.mark_initialized(sym(2));
        // The checker restores `entry` after analyzing the body rather than
        // keeping `body` around, since the loop may run zero times.
        assert!(!entry.is_initialized(sym(2)));
    }
}

// cloven-vm - Constant pool
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Interned constant pool referenced by chunks.
//!
//! The pool is append-only: indices stay stable for its whole life. A
//! compiler and the child contexts it spawns share one pool, so a chunk
//! compiled later can reference constants interned earlier.

use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::value::ClovenVal;

/// A shared, append-only pool of constant values.
#[derive(Clone)]
pub struct ConstPool {
    consts: Arc<RwLock<Vec<ClovenVal>>>,
}

impl ConstPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        ConstPool {
            consts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Intern a value, returning its index.
    ///
    /// Simple values deduplicate by structural equality; function values
    /// and collections are appended as-is (two textually identical `fn*`
    /// forms are distinct functions).
    pub fn intern(&self, value: ClovenVal) -> usize {
        let mut consts = self.consts.write().expect("constant pool lock poisoned");
        if Self::dedupable(&value) {
            for (i, existing) in consts.iter().enumerate() {
                if *existing == value {
                    return i;
                }
            }
        }
        consts.push(value);
        consts.len() - 1
    }

    fn dedupable(value: &ClovenVal) -> bool {
        matches!(
            value,
            ClovenVal::Nil
                | ClovenVal::Bool(_)
                | ClovenVal::Int(_)
                | ClovenVal::Char(_)
                | ClovenVal::String(_)
                | ClovenVal::Keyword(_)
                | ClovenVal::Symbol(..)
                | ClovenVal::Var(_)
                | ClovenVal::Void
        )
    }

    /// Get the constant at the given index.
    pub fn get(&self, index: usize) -> Result<ClovenVal> {
        self.consts
            .read()
            .expect("constant pool lock poisoned")
            .get(index)
            .cloned()
            .ok_or_else(|| Error::execution(format!("constant lookup out of bounds: {}", index)))
    }

    /// Number of interned constants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consts.read().expect("constant pool lock poisoned").len()
    }

    /// True if no constants have been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConstPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConstPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConstPool(len={})", self.len())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedups_atoms() {
        let pool = ConstPool::new();
        let a = pool.intern(ClovenVal::int(42));
        let b = pool.intern(ClovenVal::int(42));
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_distinct_values_get_distinct_indices() {
        let pool = ConstPool::new();
        let a = pool.intern(ClovenVal::int(1));
        let b = pool.intern(ClovenVal::string("1"));
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_indices_stable() {
        let pool = ConstPool::new();
        let a = pool.intern(ClovenVal::int(1));
        pool.intern(ClovenVal::int(2));
        pool.intern(ClovenVal::int(3));
        assert_eq!(pool.get(a).unwrap(), ClovenVal::int(1));
    }

    #[test]
    fn test_out_of_bounds() {
        let pool = ConstPool::new();
        assert!(pool.get(0).is_err());
    }
}

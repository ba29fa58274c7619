// cloven-vm - Var reference type
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Vars: named mutable cells bound in namespaces.
//!
//! A Var's root may stay `nil` until `def` sets it, which is how forward
//! references work. Defining a function value propagates the Var's name
//! into the callable for diagnostics. Vars may carry macro/dynamic/private
//! flags; the macro flag makes the compiler run the root at compile time.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::symbol::Symbol;
use crate::value::ClovenVal;

struct VarInner {
    ns: Arc<str>,
    name: Arc<str>,
    root: RwLock<ClovenVal>,
    is_macro: AtomicBool,
    is_dynamic: AtomicBool,
    is_private: AtomicBool,
}

/// A named mutable cell in a namespace.
#[derive(Clone)]
pub struct ClovenVar {
    inner: Arc<VarInner>,
}

impl ClovenVar {
    /// Create a Var with a `nil` root.
    #[must_use]
    pub fn new(ns: &str, name: &str) -> Self {
        ClovenVar {
            inner: Arc::new(VarInner {
                ns: Arc::from(ns),
                name: Arc::from(name),
                root: RwLock::new(ClovenVal::Nil),
                is_macro: AtomicBool::new(false),
                is_dynamic: AtomicBool::new(false),
                is_private: AtomicBool::new(false),
            }),
        }
    }

    /// The Var's namespace name.
    #[must_use]
    pub fn ns(&self) -> &str {
        &self.inner.ns
    }

    /// The Var's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The fully qualified `ns/name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.inner.ns, self.inner.name)
    }

    /// Read the root value.
    #[must_use]
    pub fn deref(&self) -> ClovenVal {
        self.inner
            .root
            .read()
            .expect("var root lock poisoned")
            .clone()
    }

    /// Set the root value.
    ///
    /// When the new root is a callable without a name, the Var's name is
    /// propagated into it for diagnostics.
    pub fn set_root(&self, value: ClovenVal) {
        let name = Symbol::new(&self.inner.name);
        match &value {
            ClovenVal::Fn(f) => f.name_once(name),
            ClovenVal::Closure(c) => c.func.name_once(name),
            ClovenVal::MultiFn(m) => m.name_once(name),
            ClovenVal::NativeFn(nf) => nf.name_once(&self.inner.name),
            _ => {}
        }
        *self.inner.root.write().expect("var root lock poisoned") = value;
    }

    /// True if this Var names a macro.
    #[inline]
    #[must_use]
    pub fn is_macro(&self) -> bool {
        self.inner.is_macro.load(Ordering::Acquire)
    }

    /// Flag this Var as a macro.
    pub fn set_macro(&self, flag: bool) {
        self.inner.is_macro.store(flag, Ordering::Release);
    }

    /// True if this Var is dynamic.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.inner.is_dynamic.load(Ordering::Acquire)
    }

    /// Flag this Var as dynamic.
    pub fn set_dynamic(&self, flag: bool) {
        self.inner.is_dynamic.store(flag, Ordering::Release);
    }

    /// True if this Var is private to its namespace.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.inner.is_private.load(Ordering::Acquire)
    }

    /// Flag this Var as private.
    pub fn set_private(&self, flag: bool) {
        self.inner.is_private.store(flag, Ordering::Release);
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address for ordering.
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl PartialEq for ClovenVar {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ClovenVar {}

impl fmt::Display for ClovenVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#'{}/{}", self.inner.ns, self.inner.name)
    }
}

impl fmt::Debug for ClovenVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var({})", self.qualified_name())
    }
}

// cloven-vm - Namespace system for global bindings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespaces and the namespace registry.
//!
//! A namespace owns a map from symbols to Vars plus a refer table into
//! other namespaces. The registry maps names to namespaces and holds the
//! current namespace as a single mutable reference shared through runtime
//! handles — there is no process-wide global.
//!
//! Symbol resolution order: explicit namespace part via the refer table
//! (then globally by name), then the local registry, then refer-all
//! namespaces in insertion order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::symbol::Symbol;
use crate::value::ClovenVal;
use crate::var::ClovenVar;

/// An entry in a namespace's refer table: another namespace, optionally
/// with all of its vars visible unqualified.
#[derive(Clone)]
pub struct Refer {
    pub ns: Namespace,
    pub refer_all: bool,
}

struct NamespaceInner {
    name: Arc<str>,
    vars: HashMap<String, ClovenVar>,
    // Insertion-ordered: refer-all scanning takes the first match
    refers: Vec<(String, Refer)>,
}

/// A namespace containing Var bindings.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<RwLock<NamespaceInner>>,
}

impl Namespace {
    /// Create a new namespace with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            inner: Arc::new(RwLock::new(NamespaceInner {
                name: Arc::from(name.into()),
                vars: HashMap::new(),
                refers: Vec::new(),
            })),
        }
    }

    /// Get the namespace name.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.read().expect("namespace lock poisoned").name.to_string()
    }

    /// Intern a Var with the given name, creating it with a `nil` root if
    /// it doesn't exist. Returns the existing Var otherwise.
    pub fn intern(&self, name: &str) -> ClovenVar {
        let mut inner = self.inner.write().expect("namespace lock poisoned");
        if let Some(var) = inner.vars.get(name) {
            return var.clone();
        }
        let var = ClovenVar::new(&inner.name, name);
        inner.vars.insert(name.to_string(), var.clone());
        var
    }

    /// Create or update a Var with the given root value.
    pub fn def(&self, name: &str, value: ClovenVal) -> ClovenVar {
        let var = self.intern(name);
        var.set_root(value);
        var
    }

    /// Register a native function under the given name.
    pub fn define_native(
        &self,
        name: &str,
        f: impl Fn(&[ClovenVal]) -> crate::error::Result<ClovenVal> + Send + Sync + 'static,
    ) -> ClovenVar {
        self.def(name, ClovenVal::NativeFn(crate::func::NativeFn::new(name, f)))
    }

    /// Look up a Var by name in this namespace only.
    #[must_use]
    pub fn find_var(&self, name: &str) -> Option<ClovenVar> {
        self.inner
            .read()
            .expect("namespace lock poisoned")
            .vars
            .get(name)
            .cloned()
    }

    /// Resolve a symbol against this namespace.
    ///
    /// 1. Qualified symbols go through the refer table by alias.
    /// 2. Unqualified symbols check the local registry.
    /// 3. Then refer-all referred namespaces in insertion order.
    #[must_use]
    pub fn lookup(&self, sym: &Symbol) -> Option<ClovenVar> {
        let inner = self.inner.read().expect("namespace lock poisoned");

        if let Some(ns_part) = sym.namespace() {
            for (alias, refer) in &inner.refers {
                if alias == ns_part {
                    return refer.ns.find_var(sym.name());
                }
            }
            return None;
        }

        if let Some(var) = inner.vars.get(sym.name()) {
            return Some(var.clone());
        }

        for (_, refer) in &inner.refers {
            if refer.refer_all {
                if let Some(var) = refer.ns.find_var(sym.name()) {
                    return Some(var.clone());
                }
            }
        }

        None
    }

    /// Resolve a symbol, defining a `nil`-rooted Var locally when it is
    /// absent everywhere. Free-variable references compile through this,
    /// which is how forward references work.
    pub fn lookup_or_add(&self, sym: &Symbol) -> ClovenVar {
        if let Some(var) = self.lookup(sym) {
            return var;
        }
        self.intern(sym.name())
    }

    /// Add a refer entry for another namespace under the given alias.
    pub fn refer(&self, alias: impl Into<String>, ns: Namespace, refer_all: bool) {
        let alias = alias.into();
        let mut inner = self.inner.write().expect("namespace lock poisoned");
        // Re-referring the same alias replaces the entry
        if let Some(entry) = inner.refers.iter_mut().find(|(a, _)| *a == alias) {
            entry.1 = Refer { ns, refer_all };
            return;
        }
        inner.refers.push((alias, Refer { ns, refer_all }));
    }

    /// Names of all Vars interned in this namespace.
    #[must_use]
    pub fn var_names(&self) -> Vec<String> {
        self.inner
            .read()
            .expect("namespace lock poisoned")
            .vars
            .keys()
            .cloned()
            .collect()
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.name() == other.name()
    }
}

impl Eq for Namespace {}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Namespace({})", self.name())
    }
}

// ============================================================================
// Registry
// ============================================================================

struct RegistryInner {
    namespaces: HashMap<String, Namespace>,
    current: Arc<str>,
}

/// Registry of all namespaces, holding the current namespace.
///
/// The registry is a cheap handle; cloning it shares the same state.
/// Namespaces are registered lazily on first lookup and live for the rest
/// of the process.
#[derive(Clone)]
pub struct NamespaceRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl NamespaceRegistry {
    /// The name of the core namespace.
    pub const CORE_NS: &'static str = "cloven.core";

    /// Create a registry with `cloven.core` and `user` namespaces, with
    /// `user` current and referring all of core.
    #[must_use]
    pub fn new() -> Self {
        let core = Namespace::new(Self::CORE_NS);
        let user = Namespace::new("user");
        user.refer(Self::CORE_NS, core.clone(), true);

        let mut namespaces = HashMap::new();
        namespaces.insert(Self::CORE_NS.to_string(), core);
        namespaces.insert("user".to_string(), user);

        NamespaceRegistry {
            inner: Arc::new(RwLock::new(RegistryInner {
                namespaces,
                current: Arc::from("user"),
            })),
        }
    }

    /// Find a namespace by name, or create it if absent.
    ///
    /// New namespaces (except core itself) automatically refer all of
    /// `cloven.core`.
    pub fn find_or_create(&self, name: &str) -> Namespace {
        {
            let inner = self.inner.read().expect("registry lock poisoned");
            if let Some(ns) = inner.namespaces.get(name) {
                return ns.clone();
            }
        }
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if let Some(ns) = inner.namespaces.get(name) {
            return ns.clone();
        }
        let ns = Namespace::new(name);
        if name != Self::CORE_NS {
            if let Some(core) = inner.namespaces.get(Self::CORE_NS) {
                ns.refer(Self::CORE_NS, core.clone(), true);
            }
        }
        inner.namespaces.insert(name.to_string(), ns.clone());
        ns
    }

    /// Find a namespace by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Namespace> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .namespaces
            .get(name)
            .cloned()
    }

    /// The core namespace.
    #[must_use]
    pub fn core(&self) -> Namespace {
        self.find_or_create(Self::CORE_NS)
    }

    /// The current namespace.
    #[must_use]
    pub fn current(&self) -> Namespace {
        let name = self.current_name();
        self.find_or_create(&name)
    }

    /// The current namespace name.
    #[must_use]
    pub fn current_name(&self) -> String {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .current
            .to_string()
    }

    /// Switch the current namespace, creating it if necessary.
    pub fn set_current(&self, name: &str) -> Namespace {
        let ns = self.find_or_create(name);
        self.inner.write().expect("registry lock poisoned").current = Arc::from(name);
        ns
    }

    /// Resolve a symbol: qualified symbols try the current namespace's
    /// refer table, then a global namespace of that name; unqualified
    /// symbols resolve through the current namespace.
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> Option<ClovenVar> {
        let current = self.current();
        if let Some(var) = current.lookup(sym) {
            return Some(var);
        }
        if let Some(ns_part) = sym.namespace() {
            if let Some(ns) = self.find(ns_part) {
                return ns.find_var(sym.name());
            }
        }
        None
    }

    /// All registered namespace names.
    #[must_use]
    pub fn all_names(&self) -> Vec<String> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .namespaces
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

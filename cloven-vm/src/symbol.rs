// cloven-vm - Symbol type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers that may be optionally namespaced.
//!
//! Symbols are unevaluated names: the compiler resolves them against
//! lexical scope and namespaces. A symbol whose name starts with `.` and
//! is longer than one character denotes member access (`.length`), which
//! the compiler rewrites into a receiver call.
//!
//! Name and namespace parts are interned (see `intern`), so equal symbols
//! share storage; equality still compares by value.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::intern::intern;

/// A symbol with optional namespace.
#[derive(Clone)]
pub struct Symbol {
    namespace: Option<Arc<str>>,
    name: Arc<str>,
}

impl Symbol {
    /// Create a new symbol with no namespace.
    pub fn new(name: &str) -> Self {
        Symbol {
            namespace: None,
            name: intern(name),
        }
    }

    /// Create a new symbol with a namespace.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Symbol {
            namespace: Some(intern(namespace)),
            name: intern(name),
        }
    }

    /// Parse a symbol from a string like "foo" or "ns/foo".
    pub fn parse(s: &str) -> Self {
        match s.find('/') {
            // "/" on its own is the division symbol, not a separator
            Some(_) if s == "/" => Symbol::new("/"),
            Some(pos) => Symbol::with_namespace(&s[..pos], &s[pos + 1..]),
            None => Symbol::new(s),
        }
    }

    /// Get the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this symbol has a namespace.
    #[must_use]
    pub fn has_namespace(&self) -> bool {
        self.namespace.is_some()
    }

    /// Check if this symbol denotes member access (`.name` with a
    /// non-empty member part).
    #[must_use]
    pub fn is_member_access(&self) -> bool {
        self.namespace.is_none() && self.name.len() > 1 && self.name.starts_with('.')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}/{}", ns, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (&self.namespace, &other.namespace) {
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => self.name.cmp(&other.name),
            (Some(a), Some(b)) => match a.cmp(b) {
                std::cmp::Ordering::Equal => self.name.cmp(&other.name),
                other => other,
            },
        }
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.as_deref().hash(state);
        self.name.hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================

// cloven-vm - Keyword type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Keywords are self-evaluating identifiers that may be optionally
//! namespaced. They always print with a leading colon and are callable as
//! lookup functions (`(:key map)`).
//!
//! Name and namespace parts are interned (see `intern`); equality compares
//! by value.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::intern::intern;

/// A keyword with optional namespace.
#[derive(Clone)]
pub struct Keyword {
    namespace: Option<Arc<str>>,
    name: Arc<str>,
}

impl Keyword {
    /// Create a new keyword with no namespace.
    pub fn new(name: &str) -> Self {
        Keyword {
            namespace: None,
            name: intern(name),
        }
    }

    /// Create a new keyword with a namespace.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Keyword {
            namespace: Some(intern(namespace)),
            name: intern(name),
        }
    }

    /// Parse a keyword from a string like ":foo" or ":ns/foo".
    /// The leading colon is optional.
    pub fn parse(s: &str) -> Self {
        let s = s.strip_prefix(':').unwrap_or(s);
        match s.find('/') {
            Some(pos) => Keyword::with_namespace(&s[..pos], &s[pos + 1..]),
            None => Keyword::new(s),
        }
    }

    /// Get the namespace, if any.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this keyword has a namespace.
    #[inline]
    #[must_use]
    pub fn has_namespace(&self) -> bool {
        self.namespace.is_some()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, ":{}/{}", ns, self.name)
        } else {
            write!(f, ":{}", self.name)
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

impl PartialEq for Keyword {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }
}

impl Eq for Keyword {}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
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

impl Hash for Keyword {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.as_deref().hash(state);
        self.name.hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keyword() {
        let kw = Keyword::new("foo");
        assert_eq!(kw.name(), "foo");
        assert!(kw.namespace().is_none());
        assert_eq!(format!("{}", kw), ":foo");
    }

    #[test]
    fn test_namespaced_keyword() {
        let kw = Keyword::with_namespace("user", "foo");
        assert_eq!(kw.namespace(), Some("user"));
        assert_eq!(format!("{}", kw), ":user/foo");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Keyword::parse(":foo"), Keyword::new("foo"));
        assert_eq!(Keyword::parse("foo"), Keyword::new("foo"));
        assert_eq!(
            Keyword::parse(":user/foo"),
            Keyword::with_namespace("user", "foo")
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(Keyword::new("foo"), Keyword::new("foo"));
        assert_ne!(Keyword::new("foo"), Keyword::new("bar"));
    }
}

// cloven-vm - Shared string interner for symbols and keywords
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Global string interner.
//!
//! Symbols and keywords intern their name and namespace parts here so that
//! identical identifiers share storage. Interned strings are never
//! deallocated; typical programs use a bounded set of identifiers, so the
//! monotonic growth is intentional.
//!
//! The interner is behind a `Mutex`, making interning thread-safe. Lookup
//! and comparison on the returned `Arc<str>` are lock-free.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};

static INTERNER: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();

/// Intern a string, returning a shared `Arc<str>`.
///
/// Two calls with equal input return clones of the same allocation.
pub(crate) fn intern(s: &str) -> Arc<str> {
    let mut table = INTERNER
        .get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        .expect("string interner mutex poisoned: another thread panicked while holding the lock");

    if let Some(existing) = table.get(s) {
        return Arc::clone(existing);
    }
    let arc: Arc<str> = Arc::from(s);
    table.insert(Arc::clone(&arc));
    arc
}

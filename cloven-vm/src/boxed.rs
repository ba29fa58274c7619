// cloven-vm - Boxed host values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Opaque host values with explicitly registered method tables.
//!
//! A `Boxed` value wraps an arbitrary `Send + Sync` Rust value together
//! with a method table the embedder registered for its type. Cloven code
//! reaches the methods through `(.method obj args...)`; there is no
//! reflection anywhere.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::ClovenVal;

/// A method on a boxed host value: receives the receiver and the call
/// arguments.
pub type BoxedMethod = Arc<dyn Fn(&Boxed, &[ClovenVal]) -> Result<ClovenVal> + Send + Sync>;

/// Method table for one exposed host type.
#[derive(Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, BoxedMethod>,
}

impl MethodTable {
    /// Create an empty method table.
    #[must_use]
    pub fn new() -> Self {
        MethodTable {
            methods: HashMap::new(),
        }
    }

    /// Register a method under the given name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        method: impl Fn(&Boxed, &[ClovenVal]) -> Result<ClovenVal> + Send + Sync + 'static,
    ) {
        self.methods.insert(name.into(), Arc::new(method));
    }

    /// Look up a method by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxedMethod> {
        self.methods.get(name)
    }

    /// Registered method names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

/// An opaque host value plus its registered method table.
#[derive(Clone)]
pub struct Boxed {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
    methods: Arc<MethodTable>,
}

impl Boxed {
    /// Box a host value under a type name with a method table.
    pub fn new<T: Any + Send + Sync>(
        type_name: impl Into<String>,
        value: T,
        methods: MethodTable,
    ) -> Self {
        Boxed {
            type_name: Arc::from(type_name.into()),
            inner: Arc::new(value),
            methods: Arc::new(methods),
        }
    }

    /// The registered type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Downcast the wrapped value.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Invoke a registered method by name.
    pub fn invoke_method(&self, name: &str, args: &[ClovenVal]) -> Result<ClovenVal> {
        match self.methods.get(name) {
            Some(method) => method(self, args),
            None => Err(Error::execution(format!(
                "no method '{}' on {}",
                name, self.type_name
            ))),
        }
    }

    /// Field-style lookup: calls a registered zero-argument method.
    pub fn value_at(&self, name: &str) -> Result<ClovenVal> {
        self.invoke_method(name, &[])
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address for ordering.
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl std::fmt::Debug for Boxed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Boxed({})", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        y: i64,
    }

    fn point_table() -> MethodTable {
        let mut table = MethodTable::new();
        table.insert("x", |recv: &Boxed, _args: &[ClovenVal]| {
            let p = recv.downcast_ref::<Point>().unwrap();
            Ok(ClovenVal::int(p.x))
        });
        table.insert("sum", |recv: &Boxed, _args: &[ClovenVal]| {
            let p = recv.downcast_ref::<Point>().unwrap();
            Ok(ClovenVal::int(p.x + p.y))
        });
        table
    }

    #[test]
    fn test_method_dispatch() {
        let boxed = Boxed::new("Point", Point { x: 3, y: 4 }, point_table());
        assert_eq!(boxed.invoke_method("x", &[]).unwrap(), ClovenVal::int(3));
        assert_eq!(boxed.invoke_method("sum", &[]).unwrap(), ClovenVal::int(7));
    }

    #[test]
    fn test_missing_method() {
        let boxed = Boxed::new("Point", Point { x: 0, y: 0 }, point_table());
        assert!(boxed.invoke_method("nope", &[]).is_err());
    }
}

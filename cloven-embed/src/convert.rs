// cloven-embed - Host value conversion
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Conversions between host values and Cloven values.
//!
//! `IntoClovenVal` boxes host data going in; `FromClovenVal` pulls typed
//! data back out. Opaque host types go through [`BoxedType`], which
//! pairs a value with an explicitly registered method table - no
//! reflection anywhere.

use std::any::Any;

use cloven_vm::boxed::{Boxed, MethodTable};
use cloven_vm::error::{Error, Result};
use cloven_vm::value::ClovenVal;

// ============================================================================
// Into Cloven
// ============================================================================

/// Host values that convert into Cloven values.
pub trait IntoClovenVal {
    fn into_cloven_val(self) -> ClovenVal;
}

impl IntoClovenVal for ClovenVal {
    fn into_cloven_val(self) -> ClovenVal {
        self
    }
}

impl IntoClovenVal for i64 {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::int(self)
    }
}

impl IntoClovenVal for i32 {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::int(self as i64)
    }
}

impl IntoClovenVal for usize {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::int(self as i64)
    }
}

impl IntoClovenVal for bool {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::bool(self)
    }
}

impl IntoClovenVal for char {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::char(self)
    }
}

impl IntoClovenVal for &str {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::string(self)
    }
}

impl IntoClovenVal for String {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::string(self)
    }
}

impl IntoClovenVal for () {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::Nil
    }
}

impl<T: IntoClovenVal> IntoClovenVal for Vec<T> {
    fn into_cloven_val(self) -> ClovenVal {
        ClovenVal::vector(self.into_iter().map(IntoClovenVal::into_cloven_val).collect())
    }
}

impl<T: IntoClovenVal> IntoClovenVal for Option<T> {
    fn into_cloven_val(self) -> ClovenVal {
        match self {
            Some(v) => v.into_cloven_val(),
            None => ClovenVal::Nil,
        }
    }
}

// ============================================================================
// From Cloven
// ============================================================================

/// Cloven values that convert back into host values.
pub trait FromClovenVal: Sized {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self>;
}

impl FromClovenVal for ClovenVal {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self> {
        Ok(v.clone())
    }
}

impl FromClovenVal for i64 {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self> {
        match v {
            ClovenVal::Int(n) => Ok(*n),
            other => Err(Error::type_expected(
                other.type_name(),
                "is not an",
                "integer",
            )),
        }
    }
}

impl FromClovenVal for bool {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self> {
        match v {
            ClovenVal::Bool(b) => Ok(*b),
            other => Err(Error::type_expected(
                other.type_name(),
                "is not a",
                "boolean",
            )),
        }
    }
}

impl FromClovenVal for char {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self> {
        match v {
            ClovenVal::Char(c) => Ok(*c),
            other => Err(Error::type_expected(
                other.type_name(),
                "is not a",
                "char",
            )),
        }
    }
}

impl FromClovenVal for String {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self> {
        match v {
            ClovenVal::String(s) => Ok(s.to_string()),
            other => Err(Error::type_expected(
                other.type_name(),
                "is not a",
                "string",
            )),
        }
    }
}

impl<T: FromClovenVal> FromClovenVal for Vec<T> {
    fn from_cloven_val(v: &ClovenVal) -> Result<Self> {
        cloven_vm::seq::to_vec(v)?
            .iter()
            .map(T::from_cloven_val)
            .collect()
    }
}

// ============================================================================
// Boxed host types
// ============================================================================

/// An exposed host type: a name plus a method table built up by explicit
/// registration. Wrap values with [`BoxedType::wrap`]; Cloven code calls
/// the methods through `(.method obj args...)`.
///
/// # Example
///
/// ```
/// use cloven_embed::{BoxedType, ClovenVal};
///
/// struct Counter { n: i64 }
///
/// let counter_type = BoxedType::new("Counter")
///     .method("value", |c: &Counter, _args| Ok(ClovenVal::int(c.n)));
/// let boxed = counter_type.wrap(Counter { n: 7 });
/// ```
pub struct BoxedType {
    name: String,
    table: MethodTable,
}

impl BoxedType {
    /// Start a type with an empty method table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        BoxedType {
            name: name.into(),
            table: MethodTable::new(),
        }
    }

    /// Register a method. The callback receives the downcast receiver
    /// and the call arguments.
    #[must_use]
    pub fn method<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&T, &[ClovenVal]) -> Result<ClovenVal> + Send + Sync + 'static,
    ) -> Self {
        let type_name = self.name.clone();
        self.table.insert(name, move |recv: &Boxed, args: &[ClovenVal]| {
            let value = recv.downcast_ref::<T>().ok_or_else(|| {
                Error::type_mismatch(
                    recv.type_name().to_string(),
                    format!("is not a {}", type_name),
                )
            })?;
            f(value, args)
        });
        self
    }

    /// Box a host value under this type.
    pub fn wrap<T: Any + Send + Sync>(&self, value: T) -> ClovenVal {
        ClovenVal::Boxed(Boxed::new(self.name.clone(), value, self.table.clone()))
    }
}

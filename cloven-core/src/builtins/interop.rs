// cloven-core - Host interop built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Receiver dispatch for boxed host values.
//!
//! `(.member obj args...)` is rewritten by the compiler into
//! `(. obj 'member args...)`; the `.` built-in here dispatches to the
//! method table the embedder registered for the value's type.

use cloven_vm::error::{Error, Result};
use cloven_vm::value::ClovenVal;

/// (. obj 'member args...) - invoke a registered method on a boxed value
pub(crate) fn builtin_dot(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() < 2 {
        return Err(Error::arity_at_least(".", 2, args.len()));
    }
    let member = match &args[1] {
        ClovenVal::Symbol(sym, _) => sym.name().to_string(),
        ClovenVal::Keyword(kw) => kw.name().to_string(),
        ClovenVal::String(s) => s.to_string(),
        other => {
            return Err(Error::type_mismatch(
                other.type_name(),
                "is not a member name",
            ))
        }
    };
    match &args[0] {
        ClovenVal::Boxed(boxed) => boxed.invoke_method(&member, &args[2..]),
        other => Err(Error::type_mismatch(
            other.type_name(),
            format!("has no method '{}'", member),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloven_vm::boxed::{Boxed, MethodTable};
    use cloven_vm::symbol::Symbol;

    #[test]
    fn test_dot_dispatch() {
        let mut table = MethodTable::new();
        table.insert("double", |recv: &Boxed, _args: &[ClovenVal]| {
            let n = recv.downcast_ref::<i64>().unwrap();
            Ok(ClovenVal::int(n * 2))
        });
        let boxed = ClovenVal::Boxed(Boxed::new("Num", 21i64, table));
        let member = ClovenVal::symbol(Symbol::new("double"));
        assert_eq!(builtin_dot(&[boxed, member]).unwrap(), ClovenVal::int(42));
    }

    #[test]
    fn test_dot_on_plain_value() {
        let member = ClovenVal::symbol(Symbol::new("anything"));
        assert!(builtin_dot(&[ClovenVal::int(1), member]).is_err());
    }
}

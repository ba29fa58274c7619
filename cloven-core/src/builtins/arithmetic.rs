// cloven-core - Arithmetic built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integer arithmetic: + - * / inc dec quot rem mod max min and the
//! numeric predicates.

use cloven_vm::error::{Error, Result};
use cloven_vm::value::ClovenVal;

use super::require_int;

/// (+ & xs) - sum, 0 with no arguments
pub(crate) fn builtin_add(args: &[ClovenVal]) -> Result<ClovenVal> {
    let mut sum: i64 = 0;
    for arg in args {
        sum = sum.wrapping_add(require_int(arg)?);
    }
    Ok(ClovenVal::int(sum))
}

/// (- x & xs) - subtraction; a single argument negates
pub(crate) fn builtin_sub(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("-", 1, 0));
    }
    let first = require_int(&args[0])?;
    if args.len() == 1 {
        return Ok(ClovenVal::int(-first));
    }
    let mut acc = first;
    for arg in &args[1..] {
        acc = acc.wrapping_sub(require_int(arg)?);
    }
    Ok(ClovenVal::int(acc))
}

/// (* & xs) - product, 1 with no arguments
pub(crate) fn builtin_mul(args: &[ClovenVal]) -> Result<ClovenVal> {
    let mut product: i64 = 1;
    for arg in args {
        product = product.wrapping_mul(require_int(arg)?);
    }
    Ok(ClovenVal::int(product))
}

/// (/ x & xs) - integer division; a single argument inverts
pub(crate) fn builtin_div(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("/", 1, 0));
    }
    let mut acc = if args.len() == 1 {
        1
    } else {
        require_int(&args[0])?
    };
    let rest = if args.len() == 1 { args } else { &args[1..] };
    for arg in rest {
        let divisor = require_int(arg)?;
        if divisor == 0 {
            return Err(Error::execution("division by zero"));
        }
        acc /= divisor;
    }
    Ok(ClovenVal::int(acc))
}

/// (inc x)
pub(crate) fn builtin_inc(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("inc", 1, args.len()));
    }
    Ok(ClovenVal::int(require_int(&args[0])?.wrapping_add(1)))
}

/// (dec x)
pub(crate) fn builtin_dec(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("dec", 1, args.len()));
    }
    Ok(ClovenVal::int(require_int(&args[0])?.wrapping_sub(1)))
}

/// (quot a b) - truncating quotient
pub(crate) fn builtin_quot(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("quot", 2, args.len()));
    }
    let a = require_int(&args[0])?;
    let b = require_int(&args[1])?;
    if b == 0 {
        return Err(Error::execution("division by zero"));
    }
    Ok(ClovenVal::int(a / b))
}

/// (rem a b) - remainder with the sign of the dividend
pub(crate) fn builtin_rem(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("rem", 2, args.len()));
    }
    let a = require_int(&args[0])?;
    let b = require_int(&args[1])?;
    if b == 0 {
        return Err(Error::execution("division by zero"));
    }
    Ok(ClovenVal::int(a % b))
}

/// (mod a b) - modulus with the sign of the divisor
pub(crate) fn builtin_mod(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("mod", 2, args.len()));
    }
    let a = require_int(&args[0])?;
    let b = require_int(&args[1])?;
    if b == 0 {
        return Err(Error::execution("division by zero"));
    }
    Ok(ClovenVal::int(((a % b) + b) % b))
}

/// (max x & xs)
pub(crate) fn builtin_max(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("max", 1, 0));
    }
    let mut best = require_int(&args[0])?;
    for arg in &args[1..] {
        best = best.max(require_int(arg)?);
    }
    Ok(ClovenVal::int(best))
}

/// (min x & xs)
pub(crate) fn builtin_min(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.is_empty() {
        return Err(Error::arity_at_least("min", 1, 0));
    }
    let mut best = require_int(&args[0])?;
    for arg in &args[1..] {
        best = best.min(require_int(arg)?);
    }
    Ok(ClovenVal::int(best))
}

// ============================================================================
// Numeric predicates
// ============================================================================

fn int_pred(name: &str, args: &[ClovenVal], p: impl Fn(i64) -> bool) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named(name, 1, args.len()));
    }
    Ok(ClovenVal::bool(p(require_int(&args[0])?)))
}

/// (zero? x)
pub(crate) fn builtin_zero_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    int_pred("zero?", args, |n| n == 0)
}

/// (pos? x)
pub(crate) fn builtin_pos_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    int_pred("pos?", args, |n| n > 0)
}

/// (neg? x)
pub(crate) fn builtin_neg_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    int_pred("neg?", args, |n| n < 0)
}

/// (even? x)
pub(crate) fn builtin_even_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    int_pred("even?", args, |n| n % 2 == 0)
}

/// (odd? x)
pub(crate) fn builtin_odd_p(args: &[ClovenVal]) -> Result<ClovenVal> {
    int_pred("odd?", args, |n| n % 2 != 0)
}

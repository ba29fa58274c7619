// cloven-core - Printing built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Printing: pr, prn, pr-str, print, println, newline.
//!
//! `pr` prints readable forms (strings quoted); `print` prints display
//! forms (strings raw). Both join multiple arguments with a space.

use std::io::Write;

use cloven_vm::error::{Error, Result};
use cloven_vm::value::ClovenVal;

fn join_readable(args: &[ClovenVal]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_display(args: &[ClovenVal]) -> String {
    args.iter()
        .map(ClovenVal::display_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn flush() {
    let _ = std::io::stdout().flush();
}

/// (pr-str & xs) - readable forms joined by a space
pub(crate) fn builtin_pr_str(args: &[ClovenVal]) -> Result<ClovenVal> {
    Ok(ClovenVal::string(join_readable(args)))
}

/// (pr & xs) - print readable forms
pub(crate) fn builtin_pr(args: &[ClovenVal]) -> Result<ClovenVal> {
    print!("{}", join_readable(args));
    flush();
    Ok(ClovenVal::Nil)
}

/// (prn & xs) - print readable forms followed by a newline
pub(crate) fn builtin_prn(args: &[ClovenVal]) -> Result<ClovenVal> {
    println!("{}", join_readable(args));
    Ok(ClovenVal::Nil)
}

/// (print & xs) - print display forms
pub(crate) fn builtin_print(args: &[ClovenVal]) -> Result<ClovenVal> {
    print!("{}", join_display(args));
    flush();
    Ok(ClovenVal::Nil)
}

/// (println & xs) - print display forms followed by a newline
pub(crate) fn builtin_println(args: &[ClovenVal]) -> Result<ClovenVal> {
    println!("{}", join_display(args));
    Ok(ClovenVal::Nil)
}

/// (newline)
pub(crate) fn builtin_newline(args: &[ClovenVal]) -> Result<ClovenVal> {
    if !args.is_empty() {
        return Err(Error::arity_named("newline", 0, args.len()));
    }
    println!();
    Ok(ClovenVal::Nil)
}

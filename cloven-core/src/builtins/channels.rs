// cloven-core - Channel and task built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Channels and tasks: chan, close!, >!, <!, go*.
//!
//! `go*` runs a nullary function on its own thread; the task writes
//! exactly one value (its result) into a fresh channel and closes it. A
//! task that fails reports the error chain on stderr and delivers nil,
//! so receivers never wedge.

use cloven_vm::chan::Chan;
use cloven_vm::error::{Error, Result};
use cloven_vm::func::invoke;
use cloven_vm::value::ClovenVal;

/// (chan) - a fresh unbounded channel
pub(crate) fn builtin_chan(args: &[ClovenVal]) -> Result<ClovenVal> {
    if !args.is_empty() {
        return Err(Error::arity_named("chan", 0, args.len()));
    }
    Ok(ClovenVal::Chan(Chan::new()))
}

/// (close! ch) - close the channel; receivers drain remaining values
pub(crate) fn builtin_close(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("close!", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Chan(ch) => {
            ch.close();
            Ok(ClovenVal::Nil)
        }
        other => Err(Error::type_expected(other.type_name(), "is not a", "chan")),
    }
}

/// (>! ch v) - send; errors on a closed channel
pub(crate) fn builtin_send(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named(">!", 2, args.len()));
    }
    match &args[0] {
        ClovenVal::Chan(ch) => {
            ch.send(args[1].clone())?;
            Ok(ClovenVal::bool(true))
        }
        other => Err(Error::type_expected(other.type_name(), "is not a", "chan")),
    }
}

/// (<! ch) - receive, blocking this task; nil once closed and drained
pub(crate) fn builtin_recv(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("<!", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Chan(ch) => Ok(ch.recv()),
        other => Err(Error::type_expected(other.type_name(), "is not a", "chan")),
    }
}

/// (go* f) - run the nullary f as a concurrent task; returns the channel
/// that will carry its single result
pub(crate) fn builtin_go_star(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("go*", 1, args.len()));
    }
    if !args[0].is_callable() {
        return Err(Error::type_mismatch(args[0].type_name(), "is not a function"));
    }
    let f = args[0].clone();
    let result = Chan::new();
    let out = result.clone();
    std::thread::spawn(move || {
        match invoke(&f, &[]) {
            Ok(value) => {
                let _ = out.send(value);
            }
            Err(e) => {
                eprintln!("go task failed: {}", e);
                let _ = out.send(ClovenVal::Nil);
            }
        }
        out.close();
    });
    Ok(ClovenVal::Chan(result))
}

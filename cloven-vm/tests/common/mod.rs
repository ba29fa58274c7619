// cloven-vm - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for VM integration tests.
//!
//! These tests exercise the compiler and frame directly, with a handful
//! of hand-registered natives instead of the full `cloven-core` built-in
//! set, so the machinery under test stays small.

use std::sync::Arc;

use cloven_parser::Reader;
use cloven_vm::error::{Error, Result};
use cloven_vm::frame::Frame;
use cloven_vm::namespace::NamespaceRegistry;
use cloven_vm::value::ClovenVal;
use cloven_vm::{Compiler, ConstPool};

fn int_of(v: &ClovenVal) -> Result<i64> {
    match v {
        ClovenVal::Int(n) => Ok(*n),
        other => Err(Error::type_expected(
            other.type_name(),
            "is not an",
            "integer",
        )),
    }
}

/// A registry with a minimal native vocabulary for the VM tests.
#[allow(dead_code)]
pub fn test_registry() -> NamespaceRegistry {
    let registry = NamespaceRegistry::new();
    let core = registry.core();

    core.define_native("+", |args: &[ClovenVal]| {
        let mut sum = 0;
        for a in args {
            sum += int_of(a)?;
        }
        Ok(ClovenVal::int(sum))
    });
    core.define_native("-", |args: &[ClovenVal]| {
        let mut acc = int_of(&args[0])?;
        for a in &args[1..] {
            acc -= int_of(a)?;
        }
        Ok(ClovenVal::int(acc))
    });
    core.define_native("*", |args: &[ClovenVal]| {
        let mut acc = 1;
        for a in args {
            acc *= int_of(a)?;
        }
        Ok(ClovenVal::int(acc))
    });
    core.define_native("=", |args: &[ClovenVal]| {
        Ok(ClovenVal::bool(args.windows(2).all(|w| w[0] == w[1])))
    });
    core.define_native("<", |args: &[ClovenVal]| {
        Ok(ClovenVal::bool(int_of(&args[0])? < int_of(&args[1])?))
    });
    core.define_native("inc", |args: &[ClovenVal]| {
        Ok(ClovenVal::int(int_of(&args[0])? + 1))
    });
    core.define_native("dec", |args: &[ClovenVal]| {
        Ok(ClovenVal::int(int_of(&args[0])? - 1))
    });
    core.define_native("vector", |args: &[ClovenVal]| {
        Ok(ClovenVal::vector(args.to_vec()))
    });
    core.define_native("list", |args: &[ClovenVal]| Ok(ClovenVal::list(args.to_vec())));
    core.define_native("hash-map", |args: &[ClovenVal]| {
        let mut map = im::OrdMap::new();
        for pair in args.chunks(2) {
            map.insert(pair[0].clone(), pair[1].clone());
        }
        Ok(ClovenVal::map(map))
    });
    core.define_native("hash-set", |args: &[ClovenVal]| {
        let mut set = im::OrdSet::new();
        for a in args {
            set.insert(a.clone());
        }
        Ok(ClovenVal::set(set))
    });

    registry
}

/// Compile and execute every form in `source`, returning the last value.
#[allow(dead_code)]
pub fn run_with(registry: &NamespaceRegistry, source: &str) -> Result<ClovenVal> {
    let pool = ConstPool::new();
    let mut compiler = Compiler::new(registry.clone(), pool);
    let mut reader = Reader::new(source, "test");
    let mut result = ClovenVal::Nil;
    while let Some(form) = reader.read()? {
        if matches!(form, ClovenVal::Void) {
            continue;
        }
        let chunk: Arc<cloven_vm::Chunk> = compiler.compile(&form)?;
        result = Frame::new(chunk, Vec::new(), Vec::new()).run()?;
    }
    Ok(result)
}

/// Compile and execute against a fresh test registry.
#[allow(dead_code)]
pub fn run_str(source: &str) -> Result<ClovenVal> {
    run_with(&test_registry(), source)
}

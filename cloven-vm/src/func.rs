// cloven-vm - Function objects and invocation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Function values and the uniform invocation path.
//!
//! Everything callable funnels through [`invoke`]: compiled functions,
//! closures, multi-arity functions, native functions, keywords, maps,
//! sets, vectors and Vars. Compiled bodies execute in a fresh [`Frame`]
//! per invocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::list::List;
use crate::symbol::Symbol;
use crate::value::ClovenVal;

// ============================================================================
// Compiled functions
// ============================================================================

/// A compiled function: arity, variadic flag and bytecode body.
///
/// For variadic functions the arity counts the rest parameter, so a
/// `[a b & r]` function has arity 3 and accepts two or more arguments.
pub struct CompiledFn {
    name: RwLock<Option<Symbol>>,
    pub arity: usize,
    pub variadic: bool,
    pub chunk: Arc<Chunk>,
}

impl CompiledFn {
    /// Create a compiled function.
    #[must_use]
    pub fn new(name: Option<Symbol>, arity: usize, variadic: bool, chunk: Chunk) -> Self {
        CompiledFn {
            name: RwLock::new(name),
            arity,
            variadic,
            chunk: Arc::new(chunk),
        }
    }

    /// The function's name, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<Symbol> {
        self.name.read().expect("fn name lock poisoned").clone()
    }

    /// Record a name if the function is still anonymous.
    pub fn name_once(&self, name: Symbol) {
        let mut slot = self.name.write().expect("fn name lock poisoned");
        if slot.is_none() {
            *slot = Some(name);
        }
    }
}

impl std::fmt::Debug for CompiledFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompiledFn(arity={}{}, code={})",
            self.arity,
            if self.variadic { "+" } else { "" },
            self.chunk.len()
        )
    }
}

// ============================================================================
// Closures
// ============================================================================

/// A compiled function plus its captured values.
///
/// Captures are appended by `PUSH_CLOSEDOVER` while the closure is under
/// construction on the stack, then only read.
pub struct Closure {
    pub func: Arc<CompiledFn>,
    captured: Mutex<Vec<ClovenVal>>,
}

impl Closure {
    /// Wrap a function with an empty capture vector.
    #[must_use]
    pub fn new(func: Arc<CompiledFn>) -> Self {
        Closure {
            func,
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Append a captured value.
    pub fn push_capture(&self, value: ClovenVal) {
        self.captured
            .lock()
            .expect("closure capture lock poisoned")
            .push(value);
    }

    /// Snapshot of the captured values.
    #[must_use]
    pub fn captured(&self) -> Vec<ClovenVal> {
        self.captured
            .lock()
            .expect("closure capture lock poisoned")
            .clone()
    }
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Closure({:?})", self.func)
    }
}

// ============================================================================
// Multi-arity functions
// ============================================================================

/// Dispatch table from fixed arities to functions, plus at most one
/// variadic fallback.
pub struct MultiArityFn {
    name: RwLock<Option<Symbol>>,
    fixed: HashMap<usize, ClovenVal>,
    variadic: Option<ClovenVal>,
    /// Maximum of the constituent arities.
    pub arity: usize,
}

impl MultiArityFn {
    /// Assemble from function values (Fns or Closures).
    ///
    /// Errors if a non-function slips in, a fixed arity repeats, or more
    /// than one variadic body appears.
    pub fn assemble(fns: Vec<ClovenVal>) -> Result<Self> {
        let mut fixed = HashMap::new();
        let mut variadic: Option<ClovenVal> = None;
        let mut max_arity = 0;

        for f in fns {
            let (arity, is_variadic) = match &f {
                ClovenVal::Fn(cf) => (cf.arity, cf.variadic),
                ClovenVal::Closure(c) => (c.func.arity, c.func.variadic),
                other => {
                    return Err(Error::type_mismatch(
                        other.type_name(),
                        "is not a function in multi-arity assembly",
                    ))
                }
            };
            max_arity = max_arity.max(arity);
            if is_variadic {
                if variadic.is_some() {
                    return Err(Error::execution(
                        "multi-arity function can have only one variadic body",
                    ));
                }
                variadic = Some(f);
            } else if fixed.insert(arity, f).is_some() {
                return Err(Error::execution(format!(
                    "duplicate arity {} in multi-arity function",
                    arity
                )));
            }
        }

        Ok(MultiArityFn {
            name: RwLock::new(None),
            fixed,
            variadic,
            arity: max_arity,
        })
    }

    /// The function's name, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<Symbol> {
        self.name.read().expect("fn name lock poisoned").clone()
    }

    /// Record a name if still anonymous, propagating into the bodies.
    pub fn name_once(&self, name: Symbol) {
        {
            let mut slot = self.name.write().expect("fn name lock poisoned");
            if slot.is_some() {
                return;
            }
            *slot = Some(name.clone());
        }
        for f in self.fixed.values().chain(self.variadic.iter()) {
            match f {
                ClovenVal::Fn(cf) => cf.name_once(name.clone()),
                ClovenVal::Closure(c) => c.func.name_once(name.clone()),
                _ => {}
            }
        }
    }

    /// Select the body for the given argument count.
    pub fn select(&self, argc: usize) -> Result<&ClovenVal> {
        if let Some(f) = self.fixed.get(&argc) {
            return Ok(f);
        }
        if let Some(f) = &self.variadic {
            let min = match f {
                ClovenVal::Fn(cf) => cf.arity.saturating_sub(1),
                ClovenVal::Closure(c) => c.func.arity.saturating_sub(1),
                _ => 0,
            };
            if argc >= min {
                return Ok(f);
            }
        }
        let name = self
            .name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "fn".to_string());
        Err(Error::execution(format!(
            "no matching arity for '{}': got {} arguments",
            name, argc
        )))
    }
}

impl std::fmt::Debug for MultiArityFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MultiArityFn(arities={}, variadic={})",
            self.fixed.len(),
            self.variadic.is_some()
        )
    }
}

// ============================================================================
// Native functions
// ============================================================================

type NativeImpl = Box<dyn Fn(&[ClovenVal]) -> Result<ClovenVal> + Send + Sync>;

struct NativeInner {
    name: RwLock<String>,
    /// Fixed arity, or -1 for arbitrary.
    arity: i32,
    f: NativeImpl,
}

/// A host-implemented callable.
#[derive(Clone)]
pub struct NativeFn {
    inner: Arc<NativeInner>,
}

impl NativeFn {
    /// Create a native function with arbitrary arity.
    pub fn new(
        name: &str,
        f: impl Fn(&[ClovenVal]) -> Result<ClovenVal> + Send + Sync + 'static,
    ) -> Self {
        NativeFn {
            inner: Arc::new(NativeInner {
                name: RwLock::new(name.to_string()),
                arity: -1,
                f: Box::new(f),
            }),
        }
    }

    /// Create a native function with a fixed arity, checked on invoke.
    pub fn with_arity(
        name: &str,
        arity: usize,
        f: impl Fn(&[ClovenVal]) -> Result<ClovenVal> + Send + Sync + 'static,
    ) -> Self {
        NativeFn {
            inner: Arc::new(NativeInner {
                name: RwLock::new(name.to_string()),
                arity: arity as i32,
                f: Box::new(f),
            }),
        }
    }

    /// The function's display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.name.read().expect("fn name lock poisoned").clone()
    }

    /// Record a name if the current one is empty.
    pub fn name_once(&self, name: &str) {
        let mut slot = self.inner.name.write().expect("fn name lock poisoned");
        if slot.is_empty() {
            *slot = name.to_string();
        }
    }

    /// Call the native implementation.
    pub fn call(&self, args: &[ClovenVal]) -> Result<ClovenVal> {
        if self.inner.arity >= 0 && args.len() != self.inner.arity as usize {
            return Err(Error::arity_named(
                &self.name(),
                self.inner.arity as usize,
                args.len(),
            ));
        }
        (self.inner.f)(args)
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

impl std::fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFn({})", self.name())
    }
}

// ============================================================================
// Uniform invocation
// ============================================================================

/// Invoke any callable value with the given arguments.
///
/// This is the single dispatch point used by the `INVOKE` instruction,
/// macro expansion, and every built-in that calls back into user code.
pub fn invoke(callee: &ClovenVal, args: &[ClovenVal]) -> Result<ClovenVal> {
    match callee {
        ClovenVal::Fn(func) => call_compiled(func, Vec::new(), args),
        ClovenVal::Closure(closure) => call_compiled(&closure.func, closure.captured(), args),
        ClovenVal::MultiFn(multi) => {
            let body = multi.select(args.len())?;
            invoke(body, args)
        }
        ClovenVal::NativeFn(native) => native.call(args),
        ClovenVal::Keyword(_) => {
            check_lookup_arity("keyword", args.len())?;
            let found = crate::seq::value_at(&args[0], callee)?;
            Ok(or_default(found, args.get(1)))
        }
        ClovenVal::Map(map, _) => {
            check_lookup_arity("map", args.len())?;
            match map.get(&args[0]) {
                Some(v) => Ok(v.clone()),
                None => Ok(args.get(1).cloned().unwrap_or(ClovenVal::Nil)),
            }
        }
        ClovenVal::Set(set, _) => {
            if args.len() != 1 {
                return Err(Error::arity_named("set", 1, args.len()));
            }
            if set.contains(&args[0]) {
                Ok(args[0].clone())
            } else {
                Ok(ClovenVal::Nil)
            }
        }
        ClovenVal::Vector(vector, _) => {
            if args.len() != 1 {
                return Err(Error::arity_named("vector", 1, args.len()));
            }
            let idx = match &args[0] {
                ClovenVal::Int(n) => *n,
                other => {
                    return Err(Error::type_expected(
                        other.type_name(),
                        "is not a valid index, expected",
                        "integer",
                    ))
                }
            };
            if idx < 0 || idx as usize >= vector.len() {
                return Err(Error::execution(format!(
                    "index {} out of bounds for vector of length {}",
                    idx,
                    vector.len()
                )));
            }
            Ok(vector[idx as usize].clone())
        }
        ClovenVal::Var(var) => {
            let root = var.deref();
            if !root.is_callable() {
                return Err(Error::type_mismatch(
                    root.type_name(),
                    format!("bound to {} is not a function", var),
                ));
            }
            invoke(&root, args)
        }
        other => Err(Error::type_mismatch(other.type_name(), "is not a function")),
    }
}

fn check_lookup_arity(what: &str, argc: usize) -> Result<()> {
    if argc == 1 || argc == 2 {
        Ok(())
    } else {
        Err(Error::arity_named(what, 1, argc))
    }
}

fn or_default(found: ClovenVal, default: Option<&ClovenVal>) -> ClovenVal {
    match (found, default) {
        (ClovenVal::Nil, Some(d)) => d.clone(),
        (v, _) => v,
    }
}

/// Run a compiled function in a fresh frame.
fn call_compiled(
    func: &Arc<CompiledFn>,
    captured: Vec<ClovenVal>,
    args: &[ClovenVal],
) -> Result<ClovenVal> {
    let display_name = || {
        func.name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "fn".to_string())
    };

    let final_args = if func.variadic {
        let fixed = func.arity.saturating_sub(1);
        if args.len() < fixed {
            return Err(Error::arity_at_least(&display_name(), fixed, args.len()));
        }
        let mut final_args = args[..fixed].to_vec();
        let rest: List = args[fixed..].iter().cloned().collect();
        final_args.push(ClovenVal::List(rest, None));
        final_args
    } else {
        if args.len() != func.arity {
            return Err(Error::arity_named(&display_name(), func.arity, args.len()));
        }
        args.to_vec()
    };

    Frame::new(func.chunk.clone(), final_args, captured).run()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::Keyword;

    #[test]
    fn test_native_invoke() {
        let plus_one = NativeFn::with_arity("plus-one", 1, |args| match &args[0] {
            ClovenVal::Int(n) => Ok(ClovenVal::int(n + 1)),
            other => Err(Error::type_expected(other.type_name(), "is not", "integer")),
        });
        let result = invoke(&ClovenVal::NativeFn(plus_one), &[ClovenVal::int(41)]).unwrap();
        assert_eq!(result, ClovenVal::int(42));
    }

    #[test]
    fn test_native_arity_error() {
        let f = NativeFn::with_arity("f", 1, |_| Ok(ClovenVal::Nil));
        let err = invoke(&ClovenVal::NativeFn(f), &[]).unwrap_err();
        assert!(err.to_string().contains("expected 1, got 0"));
    }

    #[test]
    fn test_keyword_invoke() {
        let mut map = im::OrdMap::new();
        let key = ClovenVal::keyword(Keyword::new("a"));
        map.insert(key.clone(), ClovenVal::int(1));
        let map = ClovenVal::map(map);

        assert_eq!(invoke(&key, &[map.clone()]).unwrap(), ClovenVal::int(1));
        let missing = ClovenVal::keyword(Keyword::new("b"));
        assert_eq!(invoke(&missing, &[map.clone()]).unwrap(), ClovenVal::Nil);
        assert_eq!(
            invoke(&missing, &[map, ClovenVal::int(9)]).unwrap(),
            ClovenVal::int(9)
        );
    }

    #[test]
    fn test_map_invoke() {
        let mut map = im::OrdMap::new();
        map.insert(ClovenVal::int(1), ClovenVal::string("one"));
        let map = ClovenVal::map(map);
        assert_eq!(
            invoke(&map, &[ClovenVal::int(1)]).unwrap(),
            ClovenVal::string("one")
        );
    }

    #[test]
    fn test_set_invoke_membership() {
        let mut set = im::OrdSet::new();
        set.insert(ClovenVal::int(3));
        let set = ClovenVal::set(set);
        assert_eq!(invoke(&set, &[ClovenVal::int(3)]).unwrap(), ClovenVal::int(3));
        assert_eq!(invoke(&set, &[ClovenVal::int(4)]).unwrap(), ClovenVal::Nil);
    }

    #[test]
    fn test_vector_invoke_index() {
        let v = ClovenVal::vector(vec![ClovenVal::int(10), ClovenVal::int(20)]);
        assert_eq!(invoke(&v, &[ClovenVal::int(1)]).unwrap(), ClovenVal::int(20));
        assert!(invoke(&v, &[ClovenVal::int(5)]).is_err());
    }

    #[test]
    fn test_non_callable() {
        let err = invoke(&ClovenVal::int(1), &[]).unwrap_err();
        assert!(err.to_string().contains("is not a function"));
    }

    #[test]
    fn test_multi_arity_assembly_rejects_duplicates() {
        let chunk = || Chunk::new(crate::constpool::ConstPool::new());
        let a = ClovenVal::Fn(Arc::new(CompiledFn::new(None, 1, false, chunk())));
        let b = ClovenVal::Fn(Arc::new(CompiledFn::new(None, 1, false, chunk())));
        assert!(MultiArityFn::assemble(vec![a, b]).is_err());
    }
}

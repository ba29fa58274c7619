// cloven-vm - Frame execution
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The VM frame: executes one chunk against an argument vector and a
//! captured-value vector.
//!
//! Frames are transient: one per invocation, dropped on return. A frame's
//! dispatch loop mutates only its own operand stack, so frames need no
//! synchronisation; `go*` tasks each run their own frames.
//!
//! The operand stack is bounded by the chunk's `max_stack` annotation;
//! overflow and underflow are execution errors, as are out-of-bounds
//! constant and argument reads. Errors from invoked callees surface
//! verbatim.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::func::{invoke, Closure, MultiArityFn};
use crate::opcode::Op;
use crate::value::ClovenVal;

// Process-wide default for the per-frame trace flag (the CLI's -d)
static DEFAULT_TRACE: AtomicBool = AtomicBool::new(false);

/// Set whether new frames start with tracing enabled.
pub fn set_default_trace(enabled: bool) {
    DEFAULT_TRACE.store(enabled, Ordering::Release);
}

/// Whether new frames start with tracing enabled.
#[must_use]
pub fn default_trace() -> bool {
    DEFAULT_TRACE.load(Ordering::Acquire)
}

/// A single interpreter context: one chunk, one argument vector, one
/// operand stack.
pub struct Frame {
    stack: Vec<ClovenVal>,
    args: Vec<ClovenVal>,
    captured: Vec<ClovenVal>,
    chunk: Arc<Chunk>,
    ip: usize,
    debug: bool,
}

impl Frame {
    /// Create a frame over a chunk with the given arguments and captured
    /// values.
    #[must_use]
    pub fn new(chunk: Arc<Chunk>, args: Vec<ClovenVal>, captured: Vec<ClovenVal>) -> Self {
        Frame {
            stack: Vec::with_capacity(chunk.max_stack),
            args,
            captured,
            chunk,
            ip: 0,
            debug: default_trace(),
        }
    }

    fn push(&mut self, value: ClovenVal) -> Result<()> {
        if self.stack.len() >= self.chunk.max_stack {
            return Err(Error::execution("stack overflow"));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, context: &str) -> Result<ClovenVal> {
        self.stack
            .pop()
            .ok_or_else(|| Error::execution(format!("{}: stack underflow", context)))
    }

    /// Remove and return the top `n` values, preserving their order.
    fn take(&mut self, n: usize, context: &str) -> Result<Vec<ClovenVal>> {
        if self.stack.len() < n {
            return Err(Error::execution(format!("{}: stack underflow", context)));
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    fn jump(&mut self, offset: i32) -> Result<()> {
        let target = self.ip as i64 + offset as i64;
        if target < 0 || target as usize > self.chunk.len() {
            return Err(Error::execution("jump out of bounds"));
        }
        self.ip = target as usize;
        Ok(())
    }

    /// Run the chunk to its `RETURN`, producing the result value.
    pub fn run(&mut self) -> Result<ClovenVal> {
        loop {
            let op = match self.chunk.code.get(self.ip) {
                Some(op) => *op,
                None => return Err(Error::execution("instruction pointer out of bounds")),
            };
            if self.debug {
                eprintln!("trace: {}", self.chunk.disassemble_at(self.ip));
            }
            self.ip += 1;

            match op {
                Op::Noop => {}

                Op::Const(idx) => {
                    let value = self.chunk.consts.get(idx as usize)?;
                    self.push(value)?;
                }

                Op::LoadArg(idx) => {
                    let value = self.args.get(idx as usize).cloned().ok_or_else(|| {
                        Error::execution(format!("argument lookup out of bounds: {}", idx))
                    })?;
                    self.push(value)?;
                }

                Op::Invoke(argc) => {
                    let args = self.take(argc as usize, "invoke")?;
                    let callee = self.pop("invoke")?;
                    // Callee errors surface verbatim
                    let result = invoke(&callee, &args)?;
                    self.push(result)?;
                }

                Op::Return => return self.pop("return"),

                Op::BranchTrue(offset) => {
                    let value = self.pop("branch")?;
                    if value.is_truthy() {
                        self.jump(offset)?;
                    }
                }

                Op::BranchFalse(offset) => {
                    let value = self.pop("branch")?;
                    if !value.is_truthy() {
                        self.jump(offset)?;
                    }
                }

                Op::Jump(offset) => self.jump(offset)?,

                Op::Pop => {
                    self.pop("pop")?;
                }

                Op::PopN(n) => {
                    let top = self.pop("pop-n")?;
                    let below = self.stack.len();
                    if below < n as usize {
                        return Err(Error::execution("pop-n: stack underflow"));
                    }
                    self.stack.truncate(below - n as usize);
                    self.push(top)?;
                }

                Op::DupNth(n) => {
                    let n = n as usize;
                    if n >= self.stack.len() {
                        return Err(Error::execution("dup-nth: stack underflow"));
                    }
                    let value = self.stack[self.stack.len() - 1 - n].clone();
                    self.push(value)?;
                }

                Op::SetVar => {
                    let value = self.pop("set-var")?;
                    let var = self.pop("set-var")?;
                    match &var {
                        ClovenVal::Var(v) => v.set_root(value),
                        other => {
                            return Err(Error::type_expected(
                                other.type_name(),
                                "is not settable, expected",
                                "var",
                            ))
                        }
                    }
                    self.push(var)?;
                }

                Op::LoadVar => {
                    let top = self.pop("load-var")?;
                    match top {
                        ClovenVal::Var(v) => self.push(v.deref())?,
                        other => {
                            return Err(Error::type_expected(
                                other.type_name(),
                                "cannot be dereferenced, expected",
                                "var",
                            ))
                        }
                    }
                }

                Op::MakeClosure => {
                    let top = self.pop("make-closure")?;
                    match top {
                        ClovenVal::Fn(func) => {
                            self.push(ClovenVal::Closure(Arc::new(Closure::new(func))))?
                        }
                        other => {
                            return Err(Error::type_expected(
                                other.type_name(),
                                "cannot close over values, expected",
                                "function",
                            ))
                        }
                    }
                }

                Op::LoadClosedOver(idx) => {
                    let value = self.captured.get(idx as usize).cloned().ok_or_else(|| {
                        Error::execution(format!("closed-over lookup out of bounds: {}", idx))
                    })?;
                    self.push(value)?;
                }

                Op::PushClosedOver => {
                    let value = self.pop("push-closed-over")?;
                    match self.stack.last() {
                        Some(ClovenVal::Closure(closure)) => closure.push_capture(value),
                        Some(other) => {
                            return Err(Error::type_expected(
                                other.type_name(),
                                "cannot accept captures, expected",
                                "closure",
                            ))
                        }
                        None => {
                            return Err(Error::execution("push-closed-over: stack underflow"))
                        }
                    }
                }

                Op::RecurFn(argc) => {
                    self.args = self.take(argc as usize, "recur")?;
                    self.stack.clear();
                    self.ip = 0;
                }

                Op::Recur { back, argc, ignore } => {
                    let saved = self.take(argc as usize, "recur")?;
                    // Drop the loop's previous bindings and any locals
                    // introduced since the loop header
                    let drop = argc as usize + ignore as usize;
                    if self.stack.len() < drop {
                        return Err(Error::execution("recur: stack underflow"));
                    }
                    self.stack.truncate(self.stack.len() - drop);
                    self.stack.extend(saved);
                    if (back as usize) > self.ip {
                        return Err(Error::execution("recur: jump out of bounds"));
                    }
                    self.ip -= back as usize;
                }

                Op::MakeMultiArity(n) => {
                    let fns = self.take(n as usize, "make-multi-arity")?;
                    let multi = MultiArityFn::assemble(fns)?;
                    self.push(ClovenVal::MultiFn(Arc::new(multi)))?;
                }

                Op::TraceEnable => self.debug = true,
                Op::TraceDisable => self.debug = false,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constpool::ConstPool;
    use crate::func::NativeFn;

    fn chunk_with(ops: &[(Op, usize)], consts: &ConstPool, max_stack: usize) -> Arc<Chunk> {
        let mut chunk = Chunk::new(consts.clone());
        for (op, depth) in ops {
            chunk.emit(*op, *depth);
        }
        chunk.max_stack = max_stack;
        Arc::new(chunk)
    }

    #[test]
    fn test_const_return() {
        let pool = ConstPool::new();
        let idx = pool.intern(ClovenVal::int(42)) as u32;
        let chunk = chunk_with(&[(Op::Const(idx), 0), (Op::Return, 1)], &pool, 1);
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::int(42));
    }

    #[test]
    fn test_load_arg() {
        let pool = ConstPool::new();
        let chunk = chunk_with(&[(Op::LoadArg(1), 0), (Op::Return, 1)], &pool, 1);
        let result = Frame::new(chunk, vec![ClovenVal::int(1), ClovenVal::int(2)], vec![])
            .run()
            .unwrap();
        assert_eq!(result, ClovenVal::int(2));
    }

    #[test]
    fn test_invoke_native() {
        let pool = ConstPool::new();
        let add = NativeFn::new("add2", |args| match (&args[0], &args[1]) {
            (ClovenVal::Int(a), ClovenVal::Int(b)) => Ok(ClovenVal::int(a + b)),
            _ => Err(Error::execution("bad args")),
        });
        let f = pool.intern(ClovenVal::NativeFn(add)) as u32;
        let a = pool.intern(ClovenVal::int(40)) as u32;
        let b = pool.intern(ClovenVal::int(2)) as u32;
        let chunk = chunk_with(
            &[
                (Op::Const(f), 0),
                (Op::Const(a), 1),
                (Op::Const(b), 2),
                (Op::Invoke(2), 3),
                (Op::Return, 1),
            ],
            &pool,
            3,
        );
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::int(42));
    }

    #[test]
    fn test_branch_false_skips() {
        let pool = ConstPool::new();
        let cond = pool.intern(ClovenVal::bool(false)) as u32;
        let then = pool.intern(ClovenVal::int(1)) as u32;
        let alt = pool.intern(ClovenVal::int(2)) as u32;
        // if false 1 2
        let chunk = chunk_with(
            &[
                (Op::Const(cond), 0),
                (Op::BranchFalse(2), 1),
                (Op::Const(then), 0),
                (Op::Jump(1), 1),
                (Op::Const(alt), 0),
                (Op::Return, 1),
            ],
            &pool,
            1,
        );
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::int(2));
    }

    #[test]
    fn test_nil_is_falsy_in_branch() {
        let pool = ConstPool::new();
        let cond = pool.intern(ClovenVal::Nil) as u32;
        let then = pool.intern(ClovenVal::int(1)) as u32;
        let alt = pool.intern(ClovenVal::int(2)) as u32;
        let chunk = chunk_with(
            &[
                (Op::Const(cond), 0),
                (Op::BranchFalse(2), 1),
                (Op::Const(then), 0),
                (Op::Jump(1), 1),
                (Op::Const(alt), 0),
                (Op::Return, 1),
            ],
            &pool,
            1,
        );
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::int(2));
    }

    #[test]
    fn test_pop_n_keeps_top() {
        let pool = ConstPool::new();
        let a = pool.intern(ClovenVal::int(1)) as u32;
        let b = pool.intern(ClovenVal::int(2)) as u32;
        let c = pool.intern(ClovenVal::int(3)) as u32;
        let chunk = chunk_with(
            &[
                (Op::Const(a), 0),
                (Op::Const(b), 1),
                (Op::Const(c), 2),
                (Op::PopN(2), 3),
                (Op::Return, 1),
            ],
            &pool,
            3,
        );
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::int(3));
    }

    #[test]
    fn test_dup_nth() {
        let pool = ConstPool::new();
        let a = pool.intern(ClovenVal::int(1)) as u32;
        let b = pool.intern(ClovenVal::int(2)) as u32;
        let chunk = chunk_with(
            &[
                (Op::Const(a), 0),
                (Op::Const(b), 1),
                (Op::DupNth(1), 2),
                (Op::Return, 3),
            ],
            &pool,
            3,
        );
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::int(1));
    }

    #[test]
    fn test_stack_overflow_detected() {
        let pool = ConstPool::new();
        let a = pool.intern(ClovenVal::int(1)) as u32;
        // max_stack of 1 but two pushes
        let chunk = chunk_with(
            &[(Op::Const(a), 0), (Op::Const(a), 1), (Op::Return, 2)],
            &pool,
            1,
        );
        let err = Frame::new(chunk, vec![], vec![]).run().unwrap_err();
        assert!(err.to_string().contains("stack overflow"));
    }

    #[test]
    fn test_pop_underflow_detected() {
        let pool = ConstPool::new();
        let chunk = chunk_with(&[(Op::Pop, 0), (Op::Return, 0)], &pool, 1);
        let err = Frame::new(chunk, vec![], vec![]).run().unwrap_err();
        assert!(err.to_string().contains("underflow"));
    }

    #[test]
    fn test_out_of_bounds_const() {
        let pool = ConstPool::new();
        let chunk = chunk_with(&[(Op::Const(7), 0), (Op::Return, 1)], &pool, 1);
        assert!(Frame::new(chunk, vec![], vec![]).run().is_err());
    }

    #[test]
    fn test_set_var_leaves_var_on_stack() {
        let pool = ConstPool::new();
        let var = crate::var::ClovenVar::new("user", "x");
        let v = pool.intern(ClovenVal::Var(var.clone())) as u32;
        let val = pool.intern(ClovenVal::int(5)) as u32;
        let chunk = chunk_with(
            &[
                (Op::Const(v), 0),
                (Op::Const(val), 1),
                (Op::SetVar, 2),
                (Op::Return, 1),
            ],
            &pool,
            2,
        );
        let result = Frame::new(chunk, vec![], vec![]).run().unwrap();
        assert_eq!(result, ClovenVal::Var(var.clone()));
        assert_eq!(var.deref(), ClovenVal::int(5));
    }

    #[test]
    fn test_recur_fn_rewrites_args() {
        let pool = ConstPool::new();
        // Counts the argument down to zero:
        //   if (= arg 0) return arg else recur (dec arg)
        let is_zero = pool.intern(ClovenVal::NativeFn(NativeFn::new("zero?", |args| {
            Ok(ClovenVal::bool(args[0] == ClovenVal::int(0)))
        }))) as u32;
        let dec = pool.intern(ClovenVal::NativeFn(NativeFn::new("dec", |args| {
            match &args[0] {
                ClovenVal::Int(n) => Ok(ClovenVal::int(n - 1)),
                _ => Err(Error::execution("bad arg")),
            }
        }))) as u32;
        let chunk = chunk_with(
            &[
                (Op::Const(is_zero), 0),
                (Op::LoadArg(0), 1),
                (Op::Invoke(1), 2),
                (Op::BranchFalse(2), 1),
                (Op::LoadArg(0), 0),
                (Op::Return, 1),
                (Op::Const(dec), 0),
                (Op::LoadArg(0), 1),
                (Op::Invoke(1), 2),
                (Op::RecurFn(1), 1),
            ],
            &pool,
            3,
        );
        let result = Frame::new(chunk, vec![ClovenVal::int(10000)], vec![])
            .run()
            .unwrap();
        assert_eq!(result, ClovenVal::int(0));
    }
}

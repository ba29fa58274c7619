// cloven-vm - Single-pass bytecode compiler
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Single-pass tree-walking compiler.
//!
//! Lowers one read form at a time into a chunk, tracking a symbolic
//! stack depth whose high-water mark becomes the chunk's `max_stack`.
//! Lexical bindings resolve into three address classes (local, argument,
//! closed-over); free variables resolve to Vars through the current
//! namespace; macros run at compile time on the unevaluated argument
//! forms.
//!
//! The compiler holds a stack of contexts, one per enclosing `fn*`, with
//! emission always targeting the innermost one.

mod cell;
mod context;
mod forms;

use std::sync::Arc;

use crate::chunk::Chunk;
use crate::constpool::ConstPool;
use crate::error::{Error, Result};
use crate::func::invoke;
use crate::namespace::NamespaceRegistry;
use crate::opcode::Op;
use crate::symbol::Symbol;
use crate::value::ClovenVal;

use cell::Cell;
use context::Context;

/// The bytecode compiler.
pub struct Compiler {
    registry: NamespaceRegistry,
    pool: ConstPool,
    ctxs: Vec<Context>,
}

impl Compiler {
    /// Create a compiler against a namespace registry and constant pool.
    #[must_use]
    pub fn new(registry: NamespaceRegistry, pool: ConstPool) -> Self {
        Compiler {
            registry,
            pool,
            ctxs: Vec::new(),
        }
    }

    /// The registry this compiler resolves free variables through.
    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// The constant pool this compiler interns into.
    #[must_use]
    pub fn pool(&self) -> &ConstPool {
        &self.pool
    }

    /// Compile one top-level form into an executable chunk.
    pub fn compile(&mut self, form: &ClovenVal) -> Result<Arc<Chunk>> {
        self.ctxs.clear();
        self.ctxs
            .push(Context::top_level(Chunk::new(self.pool.clone())));

        self.compile_form(form)?;
        self.emit(Op::Return);
        self.ctx().dec_sp(1);

        let ctx = self.ctxs.pop().expect("top-level context missing");
        let mut chunk = ctx.chunk;
        chunk.max_stack = ctx.sp_max;
        Ok(Arc::new(chunk))
    }

    // ========================================================================
    // Emission helpers
    // ========================================================================

    fn ctx(&mut self) -> &mut Context {
        self.ctxs.last_mut().expect("no active compiler context")
    }

    fn emit(&mut self, op: Op) {
        let ctx = self.ctx();
        let sp = ctx.sp;
        ctx.chunk.emit(op, sp);
    }

    fn constant(&mut self, value: ClovenVal) -> u32 {
        self.pool.intern(value) as u32
    }

    /// Intern a constant and emit the push for it.
    fn emit_const(&mut self, value: ClovenVal) {
        let idx = self.constant(value);
        self.emit(Op::Const(idx));
        self.ctx().inc_sp(1);
    }

    /// Emit a jump with a placeholder offset, returning its position for
    /// later patching.
    fn emit_jump(&mut self, op: Op) -> usize {
        let at = self.ctx().chunk.current_offset();
        self.emit(op);
        at
    }

    fn patch_jump(&mut self, at: usize) {
        self.ctx().chunk.patch_jump(at);
    }

    // ========================================================================
    // Form dispatch
    // ========================================================================

    /// Compile any form.
    pub(crate) fn compile_form(&mut self, form: &ClovenVal) -> Result<()> {
        match form {
            // Self-quoting atoms
            ClovenVal::Nil
            | ClovenVal::Bool(_)
            | ClovenVal::Int(_)
            | ClovenVal::Char(_)
            | ClovenVal::String(_)
            | ClovenVal::Keyword(_)
            | ClovenVal::Void
            | ClovenVal::Regex(_)
            | ClovenVal::Fn(_) => {
                self.emit_const(form.clone());
                Ok(())
            }

            ClovenVal::Symbol(sym, _) => self.compile_symbol(sym),

            ClovenVal::Vector(items, _) => {
                if items.is_empty() {
                    self.emit_const(form.clone());
                    return Ok(());
                }
                let items: Vec<ClovenVal> = items.iter().cloned().collect();
                self.compile_construction("vector", &items)
            }

            ClovenVal::Map(map, _) => {
                if map.is_empty() {
                    self.emit_const(form.clone());
                    return Ok(());
                }
                let mut flat = Vec::with_capacity(map.len() * 2);
                for (k, v) in map.iter() {
                    flat.push(k.clone());
                    flat.push(v.clone());
                }
                self.compile_construction("hash-map", &flat)
            }

            ClovenVal::Set(set, _) => {
                if set.is_empty() {
                    self.emit_const(form.clone());
                    return Ok(());
                }
                let items: Vec<ClovenVal> = set.iter().cloned().collect();
                self.compile_construction("hash-set", &items)
            }

            ClovenVal::List(list, _) => {
                if list.is_empty() {
                    self.emit_const(ClovenVal::empty_list());
                    return Ok(());
                }
                self.compile_list(&list.to_vec())
            }

            // Anything else a macro may have produced is treated as a
            // literal
            other => {
                self.emit_const(other.clone());
                Ok(())
            }
        }
    }

    /// Compile a collection literal as a constructor call so element
    /// expressions evaluate.
    fn compile_construction(&mut self, constructor: &str, elements: &[ClovenVal]) -> Result<()> {
        let tc = self.ctx().tail_position;
        self.ctx().tail_position = false;

        let var = self
            .registry
            .current()
            .lookup_or_add(&Symbol::new(constructor));
        self.emit_const(ClovenVal::Var(var));
        for element in elements {
            self.compile_form(element)
                .map_err(|e| Error::compile("compiling collection elements").caused_by(e))?;
        }
        self.emit(Op::Invoke(elements.len() as u32));
        self.ctx().dec_sp(elements.len());

        self.ctx().tail_position = tc;
        Ok(())
    }

    /// Compile a non-empty list: special form, member access, macro call
    /// or plain invocation.
    fn compile_list(&mut self, items: &[ClovenVal]) -> Result<()> {
        let head = &items[0];
        let args = &items[1..];

        if let ClovenVal::Symbol(sym, _) = head {
            if !sym.has_namespace() {
                match sym.name() {
                    "if" => return self.compile_if(args),
                    "do" => return self.compile_do(args),
                    "let*" => return self.compile_let(args, false),
                    "loop*" => return self.compile_let(args, true),
                    "recur" => return self.compile_recur(args),
                    "fn*" => return self.compile_fn(args),
                    "def" => return self.compile_def(args),
                    "set!" => return self.compile_set(args),
                    "quote" => return self.compile_quote(args),
                    "var" => return self.compile_var(args),
                    "trace" => return self.compile_trace(args),
                    _ => {}
                }
            }

            // (.member obj args...) => (. obj 'member args...)
            if sym.is_member_access() {
                if args.is_empty() {
                    return Err(Error::compile(format!(
                        "member access {} needs a receiver",
                        sym
                    )));
                }
                let member = ClovenVal::symbol(Symbol::new(&sym.name()[1..]));
                let quoted =
                    ClovenVal::list(vec![ClovenVal::symbol(Symbol::new("quote")), member]);
                let mut rewritten = vec![
                    ClovenVal::symbol(Symbol::new(".")),
                    args[0].clone(),
                    quoted,
                ];
                rewritten.extend(args[1..].iter().cloned());
                return self.compile_form(&ClovenVal::list(rewritten));
            }

            // Macro? The flag is checked at every call site, never cached.
            if let Some(var) = self.registry.resolve(sym) {
                if var.is_macro() {
                    let expansion = invoke(&var.deref(), args).map_err(|e| {
                        Error::compile(format!("expanding macro {}", sym)).caused_by(e)
                    })?;
                    return self.compile_form(&expansion);
                }
            }
        }

        // Plain invocation: head, then arguments left to right
        let tc = self.ctx().tail_position;
        self.ctx().tail_position = false;

        self.compile_form(head)
            .map_err(|e| Error::compile("compiling function position").caused_by(e))?;
        for arg in args {
            self.compile_form(arg)
                .map_err(|e| Error::compile("compiling arguments").caused_by(e))?;
        }
        self.emit(Op::Invoke(args.len() as u32));
        self.ctx().dec_sp(args.len());

        self.ctx().tail_position = tc;
        Ok(())
    }

    // ========================================================================
    // Symbol resolution
    // ========================================================================

    fn compile_symbol(&mut self, sym: &Symbol) -> Result<()> {
        let top = self.ctxs.len() - 1;
        if let Some(cell) = self.lookup_cell(top, sym) {
            self.emit_cell(&cell);
            return Ok(());
        }

        // Free variable: resolve through the current namespace. Plain
        // symbols may be forward references; qualified ones must resolve.
        let var = if sym.has_namespace() {
            self.registry.resolve(sym).ok_or_else(|| {
                Error::compile(format!("unable to resolve symbol: {}", sym))
            })?
        } else {
            self.registry.current().lookup_or_add(sym)
        };
        self.emit_const(ClovenVal::Var(var));
        self.emit(Op::LoadVar);
        Ok(())
    }

    /// Resolve a symbol in the context at `idx`, capturing through parent
    /// contexts as needed.
    fn lookup_cell(&mut self, idx: usize, sym: &Symbol) -> Option<Cell> {
        {
            let ctx = &self.ctxs[idx];
            if ctx.is_closure {
                if let Some(&slot) = ctx.closed_map.get(sym) {
                    return Some(ctx.closed_overs[slot].1.clone());
                }
            }
            if let Some(slot) = ctx.lookup_local(sym) {
                return Some(Cell::Local(slot));
            }
            if let Some(arg) = ctx.lookup_arg(sym) {
                return Some(Cell::Arg(arg));
            }
            if idx == 0 {
                return None;
            }
        }

        // Capture: the parent resolves it, we record a closed-over slot
        let source = self.lookup_cell(idx - 1, sym)?;
        let ctx = &mut self.ctxs[idx];
        ctx.is_closure = true;
        let slot = ctx.closed_overs.len();
        let cell = Cell::ClosedOver {
            slot,
            source: Box::new(source),
        };
        ctx.closed_overs.push((sym.clone(), cell.clone()));
        ctx.closed_map.insert(sym.clone(), slot);
        Some(cell)
    }

    /// Emit the read for a resolved cell in the innermost context.
    fn emit_cell(&mut self, cell: &Cell) {
        match cell {
            Cell::Local(slot) => {
                // Duplicate the live binding from the stack interior
                let depth = self.ctx().sp - 1 - slot;
                self.emit(Op::DupNth(depth as u32));
                self.ctx().inc_sp(1);
            }
            Cell::Arg(index) => {
                self.emit(Op::LoadArg(*index as u32));
                self.ctx().inc_sp(1);
            }
            Cell::ClosedOver { slot, .. } => {
                self.emit(Op::LoadClosedOver(*slot as u32));
                self.ctx().inc_sp(1);
            }
        }
    }
}

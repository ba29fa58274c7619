// cloven-vm - Special form compilers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Compilers for the special forms: `if`, `do`, `let*`, `loop*`, `recur`,
//! `fn*`, `def`, `set!`, `quote`, `var` and `trace`.
//!
//! Every special form leaves exactly one value on the stack; forms that
//! introduce locals emit the matching `PopN` that discards them while
//! retaining the result, preserving the stack layout their locals were
//! addressed against.

use std::collections::HashMap;
use std::sync::Arc;

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::func::CompiledFn;
use crate::keyword::Keyword;
use crate::opcode::Op;
use crate::symbol::Symbol;
use crate::value::ClovenVal;

use super::context::{Context, RecurPoint};
use super::Compiler;

impl Compiler {
    /// `(if c t e?)`
    pub(crate) fn compile_if(&mut self, args: &[ClovenVal]) -> Result<()> {
        if args.len() < 2 || args.len() > 3 {
            return Err(Error::compile(format!(
                "if: wrong number of forms ({}), need 2 or 3",
                args.len()
            )));
        }
        let tc = self.ctx().tail_position;

        self.ctx().tail_position = false;
        self.compile_form(&args[0])
            .map_err(|e| Error::compile("compiling if condition").caused_by(e))?;
        let else_jump = self.emit_jump(Op::BranchFalse(0));
        self.ctx().dec_sp(1);

        // Both branches re-enable the saved tail flag and leave one value
        self.ctx().tail_position = tc;
        self.compile_form(&args[1])
            .map_err(|e| Error::compile("compiling if then branch").caused_by(e))?;
        self.ctx().dec_sp(1);
        let end_jump = self.emit_jump(Op::Jump(0));
        self.patch_jump(else_jump);

        self.ctx().tail_position = tc;
        if args.len() == 3 {
            self.compile_form(&args[2])
                .map_err(|e| Error::compile("compiling if else branch").caused_by(e))?;
        } else {
            self.emit_const(ClovenVal::Nil);
        }
        self.patch_jump(end_jump);

        self.ctx().tail_position = tc;
        Ok(())
    }

    /// `(do e1 ... eN)`
    pub(crate) fn compile_do(&mut self, args: &[ClovenVal]) -> Result<()> {
        let tc = self.ctx().tail_position;
        if args.is_empty() {
            self.emit_const(ClovenVal::Nil);
            return Ok(());
        }
        for (i, form) in args.iter().enumerate() {
            let last = i == args.len() - 1;
            self.ctx().tail_position = tc && last;
            self.compile_form(form)
                .map_err(|e| Error::compile("compiling do member").caused_by(e))?;
            if !last {
                self.emit(Op::Pop);
                self.ctx().dec_sp(1);
            }
        }
        self.ctx().tail_position = tc;
        Ok(())
    }

    /// `(let* [bindings] body...)` and `(loop* [bindings] body...)`.
    ///
    /// Binding values stay live on the operand stack while the body runs;
    /// the final `PopN` discards them under the result. A loop
    /// additionally records a recur point at the body start.
    pub(crate) fn compile_let(&mut self, args: &[ClovenVal], is_loop: bool) -> Result<()> {
        let form_name = if is_loop { "loop*" } else { "let*" };
        let bindings = match args.first() {
            Some(ClovenVal::Vector(items, _)) => items.iter().cloned().collect::<Vec<_>>(),
            Some(other) => {
                return Err(Error::compile(format!(
                    "{}: bindings should be a vector, got {}",
                    form_name,
                    other.type_name()
                )))
            }
            None => {
                return Err(Error::compile(format!("{}: missing bindings", form_name)));
            }
        };
        if bindings.len() % 2 != 0 {
            return Err(Error::compile(format!(
                "{}: bindings must have an even number of forms",
                form_name
            )));
        }
        let body = &args[1..];

        let tc = self.ctx().tail_position;
        self.ctx().push_scope();
        self.ctx().tail_position = false;

        let mut bindn = 0;
        for pair in bindings.chunks(2) {
            let name = match &pair[0] {
                ClovenVal::Symbol(sym, _) => sym.clone(),
                other => {
                    return Err(Error::compile(format!(
                        "{}: binding name must be a symbol, got {}",
                        form_name,
                        other.type_name()
                    )))
                }
            };
            self.compile_form(&pair[1])
                .map_err(|e| Error::compile("compiling binding value").caused_by(e))?;
            self.ctx().add_local(name);
            bindn += 1;
        }

        if is_loop {
            let address = self.ctx().chunk.current_offset();
            let sp = self.ctx().sp;
            self.ctx().recur_points.push(RecurPoint {
                address,
                argc: bindn,
                sp,
            });
        }

        if body.is_empty() {
            self.emit_const(ClovenVal::Nil);
        } else {
            for (i, form) in body.iter().enumerate() {
                let last = i == body.len() - 1;
                // A loop's last form is always a recur target; a let's
                // only when the let itself sits in tail position
                self.ctx().tail_position = last && (is_loop || tc);
                self.compile_form(form)
                    .map_err(|e| Error::compile("compiling body").caused_by(e))?;
                if !last {
                    self.emit(Op::Pop);
                    self.ctx().dec_sp(1);
                }
            }
        }

        self.ctx().pop_scope();
        if is_loop {
            self.ctx().recur_points.pop();
        }
        self.emit(Op::PopN(bindn as u32));
        self.ctx().dec_sp(bindn);

        self.ctx().tail_position = tc;
        Ok(())
    }

    /// `(recur e1 ... eN)`
    pub(crate) fn compile_recur(&mut self, args: &[ClovenVal]) -> Result<()> {
        if !self.ctx().tail_position {
            return Err(Error::compile("recur is only allowed in tail position"));
        }
        let recur_point = self.ctx().recur_points.last().copied();
        let argc = args.len();

        let tc = self.ctx().tail_position;
        self.ctx().tail_position = false;

        match recur_point {
            Some(rp) => {
                if argc != rp.argc {
                    return Err(Error::compile(format!(
                        "recur argument count ({}) must match loop bindings count ({})",
                        argc, rp.argc
                    )));
                }
                // Locals introduced between the loop header and here,
                // derived from the symbolic depth
                let ignore = self.ctx().sp - rp.sp;
                for arg in args {
                    self.compile_form(arg)
                        .map_err(|e| Error::compile("compiling recur arguments").caused_by(e))?;
                }
                let back = self.ctx().chunk.current_offset() + 1 - rp.address;
                self.emit(Op::Recur {
                    back: back as u32,
                    argc: argc as u32,
                    ignore: ignore as u32,
                });
            }
            None => {
                if !self.ctx().is_function {
                    return Err(Error::compile(
                        "recur is only allowed inside loops and functions",
                    ));
                }
                let arity = self.ctx().formal_args.len();
                if argc != arity {
                    return Err(Error::compile(format!(
                        "recur argument count ({}) must match function argument count ({})",
                        argc, arity
                    )));
                }
                for arg in args {
                    self.compile_form(arg)
                        .map_err(|e| Error::compile("compiling recur arguments").caused_by(e))?;
                }
                self.emit(Op::RecurFn(argc as u32));
            }
        }

        self.ctx().tail_position = tc;
        // Symbolically the recur produces one value, keeping branches of
        // an enclosing if balanced
        if argc == 0 {
            self.ctx().inc_sp(1);
        } else {
            self.ctx().dec_sp(argc - 1);
        }
        Ok(())
    }

    /// `(def sym value)`, where `sym` may be `(with-meta sym {...})`
    /// carrying `:macro` / `:dynamic` / `:private` flags.
    pub(crate) fn compile_def(&mut self, args: &[ClovenVal]) -> Result<()> {
        if args.len() != 2 {
            return Err(Error::compile(format!(
                "def: wrong number of forms ({}), need 2",
                args.len()
            )));
        }
        let tc = self.ctx().tail_position;
        self.ctx().tail_position = false;

        let (sym, meta) = extract_def_name(&args[0])?;
        let var = self.registry().current().intern(sym.name());
        if let Some(meta) = meta {
            if meta_flag(&meta, "macro") {
                var.set_macro(true);
            }
            if meta_flag(&meta, "dynamic") {
                var.set_dynamic(true);
            }
            if meta_flag(&meta, "private") {
                var.set_private(true);
            }
        }

        self.emit_const(ClovenVal::Var(var));
        self.compile_form(&args[1])
            .map_err(|e| Error::compile("compiling def value").caused_by(e))?;
        self.emit(Op::SetVar);
        self.ctx().dec_sp(1);

        self.ctx().tail_position = tc;
        Ok(())
    }

    /// `(set! sym value)` - like def, but the Var must already resolve.
    pub(crate) fn compile_set(&mut self, args: &[ClovenVal]) -> Result<()> {
        if args.len() != 2 {
            return Err(Error::compile(format!(
                "set!: wrong number of forms ({}), need 2",
                args.len()
            )));
        }
        let sym = match &args[0] {
            ClovenVal::Symbol(sym, _) => sym,
            other => {
                return Err(Error::compile(format!(
                    "set!: first argument must be a symbol, got {}",
                    other.type_name()
                )))
            }
        };
        let var = self
            .registry()
            .resolve(sym)
            .ok_or_else(|| Error::compile(format!("set!: unable to resolve symbol: {}", sym)))?;

        let tc = self.ctx().tail_position;
        self.ctx().tail_position = false;
        self.emit_const(ClovenVal::Var(var));
        self.compile_form(&args[1])
            .map_err(|e| Error::compile("compiling set! value").caused_by(e))?;
        self.emit(Op::SetVar);
        self.ctx().dec_sp(1);
        self.ctx().tail_position = tc;
        Ok(())
    }

    /// `(quote form)`
    pub(crate) fn compile_quote(&mut self, args: &[ClovenVal]) -> Result<()> {
        match args.first() {
            Some(form) => {
                self.emit_const(form.clone());
                Ok(())
            }
            None => Err(Error::compile("quote: missing form")),
        }
    }

    /// `(var sym)` - push the Var itself, without dereferencing.
    pub(crate) fn compile_var(&mut self, args: &[ClovenVal]) -> Result<()> {
        let sym = match args.first() {
            Some(ClovenVal::Symbol(sym, _)) => sym,
            Some(other) => {
                return Err(Error::compile(format!(
                    "var: expected a symbol, got {}",
                    other.type_name()
                )))
            }
            None => return Err(Error::compile("var: missing symbol")),
        };
        let var = match self.registry().resolve(sym) {
            Some(var) => var,
            None => self.registry().current().lookup_or_add(sym),
        };
        self.emit_const(ClovenVal::Var(var));
        Ok(())
    }

    /// `(trace forms...)` - run the forms with per-instruction tracing.
    pub(crate) fn compile_trace(&mut self, args: &[ClovenVal]) -> Result<()> {
        self.emit(Op::TraceEnable);
        self.compile_do(args)?;
        self.emit(Op::TraceDisable);
        Ok(())
    }

    // ========================================================================
    // Function compilation
    // ========================================================================

    /// `(fn* name? [params] body...)` or
    /// `(fn* name? ([params] body...) ([params] body...) ...)`
    pub(crate) fn compile_fn(&mut self, args: &[ClovenVal]) -> Result<()> {
        let (name, rest) = match args.first() {
            Some(ClovenVal::Symbol(sym, _)) => (Some(sym.clone()), &args[1..]),
            _ => (None, args),
        };
        match rest.first() {
            Some(ClovenVal::Vector(params, _)) => {
                let params: Vec<ClovenVal> = params.iter().cloned().collect();
                self.compile_fn_arity(name, &params, &rest[1..])
            }
            Some(ClovenVal::List(..)) => {
                for arity_form in rest {
                    let items = match arity_form {
                        ClovenVal::List(list, _) => list.to_vec(),
                        other => {
                            return Err(Error::compile(format!(
                                "fn*: expected an arity list, got {}",
                                other.type_name()
                            )))
                        }
                    };
                    let params = match items.first() {
                        Some(ClovenVal::Vector(params, _)) => {
                            params.iter().cloned().collect::<Vec<_>>()
                        }
                        _ => {
                            return Err(Error::compile(
                                "fn*: arity list must start with a parameter vector",
                            ))
                        }
                    };
                    self.compile_fn_arity(name.clone(), &params, &items[1..])?;
                }
                self.emit(Op::MakeMultiArity(rest.len() as u32));
                self.ctx().dec_sp(rest.len() - 1);
                Ok(())
            }
            Some(other) => Err(Error::compile(format!(
                "fn*: expected a parameter vector, got {}",
                other.type_name()
            ))),
            None => Err(Error::compile("fn*: missing parameter vector")),
        }
    }

    /// Compile one function body in a child context and emit its
    /// construction in the parent.
    fn compile_fn_arity(
        &mut self,
        name: Option<Symbol>,
        params: &[ClovenVal],
        body: &[ClovenVal],
    ) -> Result<()> {
        self.enter_fn(name, params)?;

        if body.is_empty() {
            self.emit_const(ClovenVal::Nil);
        } else {
            for (i, form) in body.iter().enumerate() {
                let last = i == body.len() - 1;
                self.ctx().tail_position = last;
                self.compile_form(form)
                    .map_err(|e| Error::compile("compiling fn body").caused_by(e))?;
                if !last {
                    self.emit(Op::Pop);
                    self.ctx().dec_sp(1);
                }
            }
        }
        self.emit(Op::Return);
        self.ctx().dec_sp(1);

        self.leave_fn()
    }

    /// Open a child context for a function body.
    fn enter_fn(&mut self, name: Option<Symbol>, params: &[ClovenVal]) -> Result<()> {
        let mut formal_args = HashMap::new();
        let mut variadic = false;
        let mut rest_bound = false;

        for param in params {
            let sym = match param {
                ClovenVal::Symbol(sym, _) => sym.clone(),
                other => {
                    return Err(Error::compile(format!(
                        "fn*: all formal arguments must be symbols, got {}",
                        other.type_name()
                    )))
                }
            };
            if sym.name() == "&" {
                if variadic {
                    return Err(Error::compile("fn*: only one rest argument allowed"));
                }
                variadic = true;
                continue;
            }
            if variadic {
                if rest_bound {
                    return Err(Error::compile("fn*: only one argument allowed after &"));
                }
                rest_bound = true;
            }
            let index = formal_args.len();
            formal_args.insert(sym, index);
        }
        if variadic && !rest_bound {
            return Err(Error::compile("fn*: missing rest parameter after &"));
        }

        let chunk = Chunk::new(self.pool().clone());
        self.ctxs
            .push(Context::function(chunk, name, formal_args, variadic));
        Ok(())
    }

    /// Close the child context: build the Fn value and emit its
    /// construction (and capture loading) in the parent.
    fn leave_fn(&mut self) -> Result<()> {
        let child = self.ctxs.pop().expect("leave_fn without enter_fn");
        let mut chunk = child.chunk;
        chunk.max_stack = child.sp_max;

        let func = CompiledFn::new(
            child.name.clone(),
            child.formal_args.len(),
            child.variadic,
            chunk,
        );
        self.emit_const(ClovenVal::Fn(Arc::new(func)));

        if child.is_closure {
            self.emit(Op::MakeClosure);
            for (_, cell) in &child.closed_overs {
                let source = match cell.source() {
                    Some(source) => source.clone(),
                    None => {
                        return Err(Error::compile(
                            "closed-over cell without a source at construction site",
                        ))
                    }
                };
                self.emit_cell(&source);
                self.emit(Op::PushClosedOver);
                self.ctx().dec_sp(1);
            }
        }
        Ok(())
    }

}

/// Pull the symbol (and optional metadata map) out of a def name form.
fn extract_def_name(form: &ClovenVal) -> Result<(Symbol, Option<crate::value::Meta>)> {
    match form {
        ClovenVal::Symbol(sym, _) => Ok((sym.clone(), None)),
        ClovenVal::List(list, _) => {
            let items = list.to_vec();
            let is_with_meta = matches!(
                items.first(),
                Some(ClovenVal::Symbol(head, _)) if head.name() == "with-meta"
            );
            if is_with_meta && items.len() == 3 {
                let sym = match &items[1] {
                    ClovenVal::Symbol(sym, _) => sym.clone(),
                    other => {
                        return Err(Error::compile(format!(
                            "def: first argument must be a symbol, got {}",
                            other.type_name()
                        )))
                    }
                };
                let meta = match &items[2] {
                    ClovenVal::Map(map, _) => map.clone(),
                    other => {
                        return Err(Error::compile(format!(
                            "def: metadata must be a map, got {}",
                            other.type_name()
                        )))
                    }
                };
                return Ok((sym, Some(meta)));
            }
            Err(Error::compile("def: first argument must be a symbol"))
        }
        other => Err(Error::compile(format!(
            "def: first argument must be a symbol, got {}",
            other.type_name()
        ))),
    }
}

/// True when the metadata map flags the given keyword truthy.
fn meta_flag(meta: &crate::value::Meta, name: &str) -> bool {
    meta.get(&ClovenVal::keyword(Keyword::new(name)))
        .map(ClovenVal::is_truthy)
        .unwrap_or(false)
}

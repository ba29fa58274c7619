// cloven-vm - Value types for Cloven
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Core value type for Cloven.
//!
//! `ClovenVal` is the central enum representing all Cloven values. It is a
//! closed sum: every capability (sequencing, lookup, invocation, printing)
//! dispatches on the variant, keeping the interpreter loop predictable.
//!
//! Values are cheap to clone: every compound variant is an `Arc`-backed
//! persistent structure, so values can be shared freely between VM frames
//! and `go*` tasks.

// ClovenVal contains interior-mutable types (Var, Atom, Chan) but orders
// and compares by identity, not mutable contents. This is intentional.
#![allow(clippy::mutable_key_type)]

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use im::{OrdMap, OrdSet, Vector};

use crate::atom::ClovenAtom;
use crate::boxed::Boxed;
use crate::chan::Chan;
use crate::func::{Closure, CompiledFn, MultiArityFn, NativeFn};
use crate::keyword::Keyword;
use crate::lazy::{Iterate, Range, Repeat};
use crate::list::List;
use crate::namespace::Namespace;
use crate::symbol::Symbol;
use crate::var::ClovenVar;

/// Metadata map attached to symbols and collections.
pub type Meta = OrdMap<ClovenVal, ClovenVal>;

/// A compiled regex pattern value.
#[derive(Clone)]
pub struct ClovenRegex(pub Arc<regex::Regex>);

impl ClovenRegex {
    /// Compile a pattern, or fail with a type error.
    pub fn compile(pattern: &str) -> crate::error::Result<Self> {
        regex::Regex::new(pattern)
            .map(|re| ClovenRegex(Arc::new(re)))
            .map_err(|e| {
                crate::error::Error::type_mismatch("string", format!("is not a valid regex: {}", e))
            })
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ClovenRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClovenRegex({:?})", self.0.as_str())
    }
}

/// First-class type descriptor: the tag of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Char,
    String,
    Keyword,
    Symbol,
    List,
    Vector,
    Map,
    Set,
    Range,
    Repeat,
    Iterate,
    Var,
    Namespace,
    Fn,
    Closure,
    MultiFn,
    NativeFn,
    Atom,
    Chan,
    Boxed,
    Regex,
    Type,
    Void,
}

impl ValueKind {
    /// Printable name for this type tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Nil => "nil",
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Char => "char",
            ValueKind::String => "string",
            ValueKind::Keyword => "keyword",
            ValueKind::Symbol => "symbol",
            ValueKind::List => "list",
            ValueKind::Vector => "vector",
            ValueKind::Map => "map",
            ValueKind::Set => "set",
            ValueKind::Range => "range",
            ValueKind::Repeat => "repeat",
            ValueKind::Iterate => "iterate",
            ValueKind::Var => "var",
            ValueKind::Namespace => "namespace",
            ValueKind::Fn => "function",
            ValueKind::Closure => "closure",
            ValueKind::MultiFn => "multi-fn",
            ValueKind::NativeFn => "native-fn",
            ValueKind::Atom => "atom",
            ValueKind::Chan => "chan",
            ValueKind::Boxed => "boxed",
            ValueKind::Regex => "regex",
            ValueKind::Type => "type",
            ValueKind::Void => "void",
        }
    }
}

/// The central Cloven value type.
#[derive(Clone)]
pub enum ClovenVal {
    /// The nil value, also a zero-length sequence and a false condition
    Nil,
    /// Boolean true or false
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// Unicode scalar
    Char(char),
    /// Immutable string; also a finite sequence of chars
    String(Arc<str>),
    /// Keyword (optionally namespaced, self-evaluating, callable as lookup)
    Keyword(Keyword),
    /// Symbol (optionally namespaced identifier, with optional metadata)
    Symbol(Symbol, Option<Arc<Meta>>),
    /// Persistent linked list with shared tails (with optional metadata)
    List(List, Option<Arc<Meta>>),
    /// Indexed vector (with optional metadata)
    Vector(Vector<ClovenVal>, Option<Arc<Meta>>),
    /// Key-value map, callable as lookup (with optional metadata)
    Map(OrdMap<ClovenVal, ClovenVal>, Option<Arc<Meta>>),
    /// Membership set, callable as membership test (with optional metadata)
    Set(OrdSet<ClovenVal>, Option<Arc<Meta>>),
    /// Lazy arithmetic progression `[start, end)` with step
    Range(Range),
    /// Bounded or unbounded repetition of one value
    Repeat(Repeat),
    /// Unbounded sequence `x, f(x), f(f(x)), ...`
    Iterate(Iterate),
    /// Named mutable cell bound in a namespace
    Var(ClovenVar),
    /// A namespace itself (returned by `in-ns`)
    Namespace(Namespace),
    /// Compiled function
    Fn(Arc<CompiledFn>),
    /// Compiled function plus captured values
    Closure(Arc<Closure>),
    /// Dispatch table over fixed arities plus an optional rest arity
    MultiFn(Arc<MultiArityFn>),
    /// Host-implemented callable
    NativeFn(NativeFn),
    /// Mutable reference with guarded swap/reset
    Atom(ClovenAtom),
    /// Unbounded one-direction message queue
    Chan(Chan),
    /// Opaque host value with a registered method table
    Boxed(Boxed),
    /// Compiled regex pattern
    Regex(ClovenRegex),
    /// A type descriptor as a first-class value
    Type(ValueKind),
    /// Sentinel: the reader produced nothing (comments)
    Void,
}

impl ClovenVal {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an integer value.
    #[inline]
    #[must_use]
    pub fn int(n: i64) -> Self {
        ClovenVal::Int(n)
    }

    /// Create a boolean value.
    #[inline]
    #[must_use]
    pub fn bool(b: bool) -> Self {
        ClovenVal::Bool(b)
    }

    /// Create a character value.
    #[inline]
    #[must_use]
    pub fn char(c: char) -> Self {
        ClovenVal::Char(c)
    }

    /// Create a string value.
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        ClovenVal::String(Arc::from(s.into()))
    }

    /// Create a keyword value.
    #[inline]
    #[must_use]
    pub fn keyword(kw: Keyword) -> Self {
        ClovenVal::Keyword(kw)
    }

    /// Create a symbol value without metadata.
    #[inline]
    #[must_use]
    pub fn symbol(sym: Symbol) -> Self {
        ClovenVal::Symbol(sym, None)
    }

    /// Create a list value from a vector of elements.
    #[must_use]
    pub fn list(items: Vec<ClovenVal>) -> Self {
        ClovenVal::List(List::from_vec(items), None)
    }

    /// The empty list.
    #[must_use]
    pub fn empty_list() -> Self {
        ClovenVal::List(List::empty(), None)
    }

    /// Create a vector value from a vector of elements.
    #[must_use]
    pub fn vector(items: Vec<ClovenVal>) -> Self {
        ClovenVal::Vector(items.into_iter().collect(), None)
    }

    /// Create a map value.
    #[must_use]
    pub fn map(map: OrdMap<ClovenVal, ClovenVal>) -> Self {
        ClovenVal::Map(map, None)
    }

    /// Create a set value.
    #[must_use]
    pub fn set(set: OrdSet<ClovenVal>) -> Self {
        ClovenVal::Set(set, None)
    }

    // ========================================================================
    // Classification
    // ========================================================================

    /// The type tag of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            ClovenVal::Nil => ValueKind::Nil,
            ClovenVal::Bool(_) => ValueKind::Bool,
            ClovenVal::Int(_) => ValueKind::Int,
            ClovenVal::Char(_) => ValueKind::Char,
            ClovenVal::String(_) => ValueKind::String,
            ClovenVal::Keyword(_) => ValueKind::Keyword,
            ClovenVal::Symbol(..) => ValueKind::Symbol,
            ClovenVal::List(..) => ValueKind::List,
            ClovenVal::Vector(..) => ValueKind::Vector,
            ClovenVal::Map(..) => ValueKind::Map,
            ClovenVal::Set(..) => ValueKind::Set,
            ClovenVal::Range(_) => ValueKind::Range,
            ClovenVal::Repeat(_) => ValueKind::Repeat,
            ClovenVal::Iterate(_) => ValueKind::Iterate,
            ClovenVal::Var(_) => ValueKind::Var,
            ClovenVal::Namespace(_) => ValueKind::Namespace,
            ClovenVal::Fn(_) => ValueKind::Fn,
            ClovenVal::Closure(_) => ValueKind::Closure,
            ClovenVal::MultiFn(_) => ValueKind::MultiFn,
            ClovenVal::NativeFn(_) => ValueKind::NativeFn,
            ClovenVal::Atom(_) => ValueKind::Atom,
            ClovenVal::Chan(_) => ValueKind::Chan,
            ClovenVal::Boxed(_) => ValueKind::Boxed,
            ClovenVal::Regex(_) => ValueKind::Regex,
            ClovenVal::Type(_) => ValueKind::Type,
            ClovenVal::Void => ValueKind::Void,
        }
    }

    /// Printable name of this value's type.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Truthiness: everything except `nil` and `false` is truthy.
    #[inline]
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, ClovenVal::Nil | ClovenVal::Bool(false))
    }

    /// True for values that are callable via `invoke`.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            ClovenVal::Fn(_)
                | ClovenVal::Closure(_)
                | ClovenVal::MultiFn(_)
                | ClovenVal::NativeFn(_)
                | ClovenVal::Keyword(_)
                | ClovenVal::Map(..)
                | ClovenVal::Set(..)
                | ClovenVal::Vector(..)
                | ClovenVal::Var(_)
        )
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// The metadata attached to this value, if any.
    #[must_use]
    pub fn meta(&self) -> Option<Arc<Meta>> {
        match self {
            ClovenVal::Symbol(_, m)
            | ClovenVal::List(_, m)
            | ClovenVal::Vector(_, m)
            | ClovenVal::Map(_, m)
            | ClovenVal::Set(_, m) => m.clone(),
            _ => None,
        }
    }

    /// Return this value with the given metadata attached.
    ///
    /// Only symbols and collections carry metadata.
    pub fn with_meta(&self, meta: Meta) -> crate::error::Result<ClovenVal> {
        let meta = Some(Arc::new(meta));
        match self {
            ClovenVal::Symbol(s, _) => Ok(ClovenVal::Symbol(s.clone(), meta)),
            ClovenVal::List(l, _) => Ok(ClovenVal::List(l.clone(), meta)),
            ClovenVal::Vector(v, _) => Ok(ClovenVal::Vector(v.clone(), meta)),
            ClovenVal::Map(m, _) => Ok(ClovenVal::Map(m.clone(), meta)),
            ClovenVal::Set(s, _) => Ok(ClovenVal::Set(s.clone(), meta)),
            other => Err(crate::error::Error::type_mismatch(
                other.type_name(),
                "does not support metadata",
            )),
        }
    }

    // ========================================================================
    // Printing
    // ========================================================================

    /// Render for `str`/`print`: strings and chars appear raw, everything
    /// else prints as its readable form.
    #[must_use]
    pub fn display_string(&self) -> String {
        match self {
            ClovenVal::Nil => String::new(),
            ClovenVal::String(s) => s.to_string(),
            ClovenVal::Char(c) => c.to_string(),
            other => other.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ClovenVal::Nil => 0,
            ClovenVal::Bool(_) => 1,
            ClovenVal::Int(_) => 2,
            ClovenVal::Char(_) => 3,
            ClovenVal::String(_) => 4,
            ClovenVal::Keyword(_) => 5,
            ClovenVal::Symbol(..) => 6,
            // Lists and vectors share a rank: sequential equality makes
            // them comparable to each other
            ClovenVal::List(..) | ClovenVal::Vector(..) => 7,
            ClovenVal::Map(..) => 8,
            ClovenVal::Set(..) => 9,
            ClovenVal::Range(_) => 10,
            ClovenVal::Repeat(_) => 11,
            ClovenVal::Iterate(_) => 12,
            ClovenVal::Var(_) => 13,
            ClovenVal::Namespace(_) => 14,
            ClovenVal::Fn(_) => 15,
            ClovenVal::Closure(_) => 16,
            ClovenVal::MultiFn(_) => 17,
            ClovenVal::NativeFn(_) => 18,
            ClovenVal::Atom(_) => 19,
            ClovenVal::Chan(_) => 20,
            ClovenVal::Boxed(_) => 21,
            ClovenVal::Regex(_) => 22,
            ClovenVal::Type(_) => 23,
            ClovenVal::Void => 24,
        }
    }
}

// ============================================================================
// Equality
// ============================================================================

fn seq_iter_eq<'a, A, B>(a: A, b: B) -> bool
where
    A: Iterator<Item = &'a ClovenVal>,
    B: Iterator<Item = &'a ClovenVal>,
{
    a.eq(b)
}

impl PartialEq for ClovenVal {
    fn eq(&self, other: &Self) -> bool {
        use ClovenVal::*;
        match (self, other) {
            (Nil, Nil) | (Void, Void) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Keyword(a), Keyword(b)) => a == b,
            // Metadata does not participate in equality
            (Symbol(a, _), Symbol(b, _)) => a == b,
            (List(a, _), List(b, _)) => a == b,
            (Vector(a, _), Vector(b, _)) => a == b,
            // Sequential equality across list/vector
            (List(a, _), Vector(b, _)) => a.len() == b.len() && seq_iter_eq(a.iter(), b.iter()),
            (Vector(a, _), List(b, _)) => a.len() == b.len() && seq_iter_eq(a.iter(), b.iter()),
            (Map(a, _), Map(b, _)) => a == b,
            (Set(a, _), Set(b, _)) => a == b,
            (Range(a), Range(b)) => a == b,
            (Repeat(a), Repeat(b)) => a == b,
            (Iterate(a), Iterate(b)) => a == b,
            (Var(a), Var(b)) => a == b,
            (Namespace(a), Namespace(b)) => a == b,
            (Fn(a), Fn(b)) => Arc::ptr_eq(a, b),
            (Closure(a), Closure(b)) => Arc::ptr_eq(a, b),
            (MultiFn(a), MultiFn(b)) => Arc::ptr_eq(a, b),
            (NativeFn(a), NativeFn(b)) => a.ptr_eq(b),
            (Atom(a), Atom(b)) => a.ptr_eq(b),
            (Chan(a), Chan(b)) => a.ptr_eq(b),
            (Boxed(a), Boxed(b)) => a.ptr_eq(b),
            (Regex(a), Regex(b)) => a.pattern() == b.pattern(),
            (Type(a), Type(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ClovenVal {}

// ============================================================================
// Total order (required by the OrdMap/OrdSet backing)
// ============================================================================

impl PartialOrd for ClovenVal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClovenVal {
    fn cmp(&self, other: &Self) -> Ordering {
        use ClovenVal::*;
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            other => return other,
        }
        match (self, other) {
            (Nil, Nil) | (Void, Void) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Char(a), Char(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Keyword(a), Keyword(b)) => a.cmp(b),
            (Symbol(a, _), Symbol(b, _)) => a.cmp(b),
            (List(a, _), List(b, _)) => a.cmp(b),
            (Vector(a, _), Vector(b, _)) => a.iter().cmp(b.iter()),
            (List(a, _), Vector(b, _)) => a.iter().cmp(b.iter()),
            (Vector(a, _), List(b, _)) => a.iter().cmp(b.iter()),
            (Map(a, _), Map(b, _)) => a.iter().cmp(b.iter()),
            (Set(a, _), Set(b, _)) => a.iter().cmp(b.iter()),
            (Range(a), Range(b)) => a.cmp(b),
            (Repeat(a), Repeat(b)) => a.cmp(b),
            (Iterate(a), Iterate(b)) => a.cmp(b),
            (Var(a), Var(b)) => a.addr().cmp(&b.addr()),
            (Namespace(a), Namespace(b)) => a.name().cmp(&b.name()),
            (Fn(a), Fn(b)) => (Arc::as_ptr(a) as usize).cmp(&(Arc::as_ptr(b) as usize)),
            (Closure(a), Closure(b)) => (Arc::as_ptr(a) as usize).cmp(&(Arc::as_ptr(b) as usize)),
            (MultiFn(a), MultiFn(b)) => (Arc::as_ptr(a) as usize).cmp(&(Arc::as_ptr(b) as usize)),
            (NativeFn(a), NativeFn(b)) => a.addr().cmp(&b.addr()),
            (Atom(a), Atom(b)) => a.addr().cmp(&b.addr()),
            (Chan(a), Chan(b)) => a.addr().cmp(&b.addr()),
            (Boxed(a), Boxed(b)) => a.addr().cmp(&b.addr()),
            (Regex(a), Regex(b)) => a.pattern().cmp(b.pattern()),
            (Type(a), Type(b)) => a.cmp(b),
            // Unreachable: ranks matched above
            _ => Ordering::Equal,
        }
    }
}

// ============================================================================
// Printing
// ============================================================================

/// Escape a string for its readable (quoted) form.
fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Render a character literal body (`\a`, `\newline`, ...).
fn format_char(c: char) -> String {
    match c {
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        '\n' => "newline".to_string(),
        '\r' => "return".to_string(),
        '\u{8}' => "backspace".to_string(),
        '\u{c}' => "formfeed".to_string(),
        other => other.to_string(),
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    items: impl Iterator<Item = &'a ClovenVal>,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for ClovenVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Metadata is not displayed
        match self {
            ClovenVal::Nil => write!(f, "nil"),
            ClovenVal::Bool(b) => write!(f, "{}", b),
            ClovenVal::Int(n) => write!(f, "{}", n),
            ClovenVal::Char(c) => write!(f, "\\{}", format_char(*c)),
            ClovenVal::String(s) => write!(f, "\"{}\"", escape_string(s)),
            ClovenVal::Keyword(kw) => write!(f, "{}", kw),
            ClovenVal::Symbol(sym, _) => write!(f, "{}", sym),
            ClovenVal::List(items, _) => write_seq(f, "(", ")", items.iter()),
            ClovenVal::Vector(items, _) => write_seq(f, "[", "]", items.iter()),
            ClovenVal::Map(map, _) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
            ClovenVal::Set(set, _) => write_seq(f, "#{", "}", set.iter()),
            ClovenVal::Range(r) => {
                write!(f, "(")?;
                for (i, n) in r.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", n)?;
                }
                write!(f, ")")
            }
            ClovenVal::Repeat(r) => match r.count() {
                Some(n) => {
                    write!(f, "(")?;
                    for i in 0..n {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", r.value())?;
                    }
                    write!(f, ")")
                }
                None => write!(f, "#<repeat {}>", r.value()),
            },
            ClovenVal::Iterate(_) => write!(f, "#<iterate>"),
            ClovenVal::Var(v) => write!(f, "{}", v),
            ClovenVal::Namespace(ns) => write!(f, "#<ns {}>", ns.name()),
            ClovenVal::Fn(func) => match func.name() {
                Some(name) => write!(f, "#<fn {}>", name),
                None => write!(f, "#<fn>"),
            },
            ClovenVal::Closure(c) => match c.func.name() {
                Some(name) => write!(f, "#<fn {}>", name),
                None => write!(f, "#<fn>"),
            },
            ClovenVal::MultiFn(m) => match m.name() {
                Some(name) => write!(f, "#<multi-fn {}>", name),
                None => write!(f, "#<multi-fn>"),
            },
            ClovenVal::NativeFn(nf) => write!(f, "#<native-fn {}>", nf.name()),
            ClovenVal::Atom(a) => write!(f, "#<atom {}>", a.deref()),
            ClovenVal::Chan(_) => write!(f, "#<chan>"),
            ClovenVal::Boxed(b) => write!(f, "#<{}>", b.type_name()),
            ClovenVal::Regex(re) => write!(f, "#\"{}\"", re.pattern()),
            ClovenVal::Type(t) => write!(f, "#<type {}>", t.name()),
            ClovenVal::Void => Ok(()),
        }
    }
}

impl fmt::Debug for ClovenVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

// ============================================================================
// Tests
// ============================================================================

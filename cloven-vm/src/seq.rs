// cloven-vm - Sequence and collection capabilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Capability dispatch over the closed value sum.
//!
//! Seq (`first`/`next`/`rest`/`cons`), Collection (`count`/`empty`/
//! `conj`), Associative (`assoc`/`dissoc`) and Lookup (`value_at`) are
//! free functions matching on the variant. Keeping the dispatch closed
//! keeps the interpreter loop predictable; adding a variant means the
//! compiler errors until every capability decides about it.
//!
//! Lists, strings, ranges, maps (as entry seqs), sets, repeats, iterates
//! and vectors are seqable. `nil` behaves as the empty sequence.

use im::{OrdMap, OrdSet};

use crate::error::{Error, Result};
use crate::func::invoke;
use crate::lazy::Iterate;
use crate::list::List;
use crate::value::ClovenVal;

// ============================================================================
// Seq: first / next / rest / cons
// ============================================================================

/// The first element of a sequence, or `nil` when empty.
pub fn first(value: &ClovenVal) -> Result<ClovenVal> {
    match value {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::List(list, _) => Ok(list.first().cloned().unwrap_or(ClovenVal::Nil)),
        ClovenVal::Vector(vector, _) => Ok(vector.front().cloned().unwrap_or(ClovenVal::Nil)),
        ClovenVal::String(s) => Ok(s
            .chars()
            .next()
            .map(ClovenVal::Char)
            .unwrap_or(ClovenVal::Nil)),
        ClovenVal::Map(map, _) => Ok(map
            .iter()
            .next()
            .map(|(k, v)| ClovenVal::vector(vec![k.clone(), v.clone()]))
            .unwrap_or(ClovenVal::Nil)),
        ClovenVal::Set(set, _) => Ok(set.iter().next().cloned().unwrap_or(ClovenVal::Nil)),
        ClovenVal::Range(range) => Ok(range
            .first()
            .map(ClovenVal::int)
            .unwrap_or(ClovenVal::Nil)),
        ClovenVal::Repeat(repeat) => {
            if repeat.is_empty() {
                Ok(ClovenVal::Nil)
            } else {
                Ok(repeat.value().clone())
            }
        }
        ClovenVal::Iterate(iterate) => Ok(iterate.seed().clone()),
        other => Err(Error::type_mismatch(other.type_name(), "is not a sequence")),
    }
}

/// The sequence without its first element, or `nil` when that is empty.
pub fn next(value: &ClovenVal) -> Result<ClovenVal> {
    match value {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::List(list, _) => Ok(list
            .next()
            .map(|l| ClovenVal::List(l, None))
            .unwrap_or(ClovenVal::Nil)),
        ClovenVal::Vector(vector, _) => {
            if vector.len() <= 1 {
                Ok(ClovenVal::Nil)
            } else {
                Ok(ClovenVal::List(
                    vector.iter().skip(1).cloned().collect(),
                    None,
                ))
            }
        }
        ClovenVal::String(s) => {
            let mut chars = s.chars();
            match chars.next() {
                Some(_) => {
                    let rest = chars.as_str();
                    if rest.is_empty() {
                        Ok(ClovenVal::Nil)
                    } else {
                        Ok(ClovenVal::string(rest))
                    }
                }
                None => Ok(ClovenVal::Nil),
            }
        }
        ClovenVal::Map(..) | ClovenVal::Set(..) => {
            let items = to_vec(value)?;
            if items.len() <= 1 {
                Ok(ClovenVal::Nil)
            } else {
                Ok(ClovenVal::list(items[1..].to_vec()))
            }
        }
        ClovenVal::Range(range) => Ok(range
            .next()
            .map(ClovenVal::Range)
            .unwrap_or(ClovenVal::Nil)),
        ClovenVal::Repeat(repeat) => Ok(repeat
            .next()
            .map(ClovenVal::Repeat)
            .unwrap_or(ClovenVal::Nil)),
        ClovenVal::Iterate(iterate) => {
            let stepped = invoke(iterate.f(), &[iterate.seed().clone()])?;
            Ok(ClovenVal::Iterate(Iterate::new(
                iterate.f().clone(),
                stepped,
            )))
        }
        other => Err(Error::type_mismatch(other.type_name(), "is not a sequence")),
    }
}

/// The sequence without its first element; the empty list when exhausted.
pub fn rest(value: &ClovenVal) -> Result<ClovenVal> {
    match next(value)? {
        ClovenVal::Nil => Ok(ClovenVal::empty_list()),
        more => Ok(more),
    }
}

/// Prepend a value, producing a list.
pub fn cons(value: ClovenVal, coll: &ClovenVal) -> Result<ClovenVal> {
    match coll {
        ClovenVal::Nil => Ok(ClovenVal::list(vec![value])),
        ClovenVal::List(list, _) => Ok(ClovenVal::List(list.cons(value), None)),
        other => {
            let mut items = vec![value];
            items.extend(to_vec(other)?);
            Ok(ClovenVal::list(items))
        }
    }
}

// ============================================================================
// Collection: count / empty / conj
// ============================================================================

/// Number of elements. Strings count chars; `nil` counts zero.
pub fn count(value: &ClovenVal) -> Result<usize> {
    match value {
        ClovenVal::Nil => Ok(0),
        ClovenVal::List(list, _) => Ok(list.len()),
        ClovenVal::Vector(vector, _) => Ok(vector.len()),
        ClovenVal::Map(map, _) => Ok(map.len()),
        ClovenVal::Set(set, _) => Ok(set.len()),
        ClovenVal::String(s) => Ok(s.chars().count()),
        ClovenVal::Range(range) => Ok(range.count()),
        ClovenVal::Repeat(repeat) => match repeat.count() {
            Some(n) => Ok(n as usize),
            None => Err(Error::execution("count on unbounded sequence")),
        },
        ClovenVal::Iterate(_) => Err(Error::execution("count on unbounded sequence")),
        other => Err(Error::type_mismatch(other.type_name(), "is not countable")),
    }
}

/// An empty collection of the same kind.
pub fn empty(value: &ClovenVal) -> Result<ClovenVal> {
    match value {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::List(..) | ClovenVal::Range(_) | ClovenVal::Repeat(_) => {
            Ok(ClovenVal::empty_list())
        }
        ClovenVal::Vector(..) => Ok(ClovenVal::vector(Vec::new())),
        ClovenVal::Map(..) => Ok(ClovenVal::map(OrdMap::new())),
        ClovenVal::Set(..) => Ok(ClovenVal::set(OrdSet::new())),
        ClovenVal::String(_) => Ok(ClovenVal::string("")),
        other => Err(Error::type_mismatch(other.type_name(), "is not a collection")),
    }
}

/// Add an element at the collection's natural insertion point: lists
/// prepend, vectors append, sets insert, maps take `[k v]` entries.
pub fn conj(coll: &ClovenVal, value: ClovenVal) -> Result<ClovenVal> {
    match coll {
        ClovenVal::Nil => Ok(ClovenVal::list(vec![value])),
        ClovenVal::List(list, _) => Ok(ClovenVal::List(list.cons(value), None)),
        ClovenVal::Vector(vector, _) => {
            let mut vector = vector.clone();
            vector.push_back(value);
            Ok(ClovenVal::Vector(vector, None))
        }
        ClovenVal::Set(set, _) => {
            let mut set = set.clone();
            set.insert(value);
            Ok(ClovenVal::Set(set, None))
        }
        ClovenVal::Map(map, _) => {
            let entry = to_vec(&value)?;
            if entry.len() != 2 {
                return Err(Error::type_mismatch(
                    value.type_name(),
                    "is not a two-element map entry",
                ));
            }
            let mut map = map.clone();
            map.insert(entry[0].clone(), entry[1].clone());
            Ok(ClovenVal::Map(map, None))
        }
        other => Err(Error::type_mismatch(other.type_name(), "does not support conj")),
    }
}

// ============================================================================
// Associative: assoc / dissoc
// ============================================================================

/// Associate a key with a value in a map, or set a vector index.
pub fn assoc(coll: &ClovenVal, key: ClovenVal, value: ClovenVal) -> Result<ClovenVal> {
    match coll {
        ClovenVal::Nil => {
            let mut map = OrdMap::new();
            map.insert(key, value);
            Ok(ClovenVal::map(map))
        }
        ClovenVal::Map(map, _) => {
            let mut map = map.clone();
            map.insert(key, value);
            Ok(ClovenVal::Map(map, None))
        }
        ClovenVal::Vector(vector, _) => {
            let idx = expect_index(&key)?;
            // Assoc at length appends, like conj
            if idx > vector.len() {
                return Err(Error::execution(format!(
                    "index {} out of bounds for vector of length {}",
                    idx,
                    vector.len()
                )));
            }
            let mut vector = vector.clone();
            if idx == vector.len() {
                vector.push_back(value);
            } else {
                vector.set(idx, value);
            }
            Ok(ClovenVal::Vector(vector, None))
        }
        other => Err(Error::type_mismatch(other.type_name(), "is not associative")),
    }
}

/// Remove a key from a map.
pub fn dissoc(coll: &ClovenVal, key: &ClovenVal) -> Result<ClovenVal> {
    match coll {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::Map(map, _) => {
            let mut map = map.clone();
            map.remove(key);
            Ok(ClovenVal::Map(map, None))
        }
        other => Err(Error::type_mismatch(other.type_name(), "is not associative")),
    }
}

// ============================================================================
// Lookup: value_at
// ============================================================================

fn expect_index(key: &ClovenVal) -> Result<usize> {
    match key {
        ClovenVal::Int(n) if *n >= 0 => Ok(*n as usize),
        ClovenVal::Int(n) => Err(Error::execution(format!("negative index {}", n))),
        other => Err(Error::type_expected(
            other.type_name(),
            "is not a valid index, expected",
            "integer",
        )),
    }
}

/// Look up a key; `nil` when absent.
pub fn value_at(coll: &ClovenVal, key: &ClovenVal) -> Result<ClovenVal> {
    match coll {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::Map(map, _) => Ok(map.get(key).cloned().unwrap_or(ClovenVal::Nil)),
        ClovenVal::Set(set, _) => Ok(if set.contains(key) {
            key.clone()
        } else {
            ClovenVal::Nil
        }),
        ClovenVal::Vector(vector, _) => match key {
            ClovenVal::Int(n) if *n >= 0 && (*n as usize) < vector.len() => {
                Ok(vector[*n as usize].clone())
            }
            _ => Ok(ClovenVal::Nil),
        },
        ClovenVal::List(list, _) => match key {
            ClovenVal::Int(n) if *n >= 0 => {
                Ok(list.get(*n as usize).cloned().unwrap_or(ClovenVal::Nil))
            }
            _ => Ok(ClovenVal::Nil),
        },
        ClovenVal::String(s) => match key {
            ClovenVal::Int(n) if *n >= 0 => Ok(s
                .chars()
                .nth(*n as usize)
                .map(ClovenVal::Char)
                .unwrap_or(ClovenVal::Nil)),
            _ => Ok(ClovenVal::Nil),
        },
        ClovenVal::Range(range) => match key {
            ClovenVal::Int(n) if *n >= 0 && (*n as usize) < range.count() => {
                Ok(ClovenVal::int(range.start + range.step * *n))
            }
            _ => Ok(ClovenVal::Nil),
        },
        ClovenVal::Boxed(boxed) => {
            let field = match key {
                ClovenVal::Keyword(kw) => kw.name().to_string(),
                ClovenVal::Symbol(sym, _) => sym.name().to_string(),
                ClovenVal::String(s) => s.to_string(),
                other => {
                    return Err(Error::type_mismatch(
                        other.type_name(),
                        "is not a field name",
                    ))
                }
            };
            boxed.value_at(&field)
        }
        other => Err(Error::type_mismatch(other.type_name(), "does not support lookup")),
    }
}

/// Look up a key with an explicit default.
pub fn value_at_or(coll: &ClovenVal, key: &ClovenVal, default: &ClovenVal) -> Result<ClovenVal> {
    match value_at(coll, key)? {
        ClovenVal::Nil => Ok(default.clone()),
        found => Ok(found),
    }
}

/// The element at an index, erroring when out of bounds.
pub fn nth(coll: &ClovenVal, index: usize) -> Result<ClovenVal> {
    let found = value_at(coll, &ClovenVal::int(index as i64))?;
    match found {
        ClovenVal::Nil => {
            let len = count(coll)?;
            if index < len {
                // The element really is nil
                Ok(ClovenVal::Nil)
            } else {
                Err(Error::execution(format!(
                    "index {} out of bounds for {} of length {}",
                    index,
                    coll.type_name(),
                    len
                )))
            }
        }
        v => Ok(v),
    }
}

// ============================================================================
// Realisation
// ============================================================================

/// True if the value can be realised as a sequence.
#[must_use]
pub fn is_seqable(value: &ClovenVal) -> bool {
    matches!(
        value,
        ClovenVal::Nil
            | ClovenVal::List(..)
            | ClovenVal::Vector(..)
            | ClovenVal::Map(..)
            | ClovenVal::Set(..)
            | ClovenVal::String(_)
            | ClovenVal::Range(_)
            | ClovenVal::Repeat(_)
            | ClovenVal::Iterate(_)
    )
}

/// Realise a (bounded) sequence into a vector of elements.
pub fn to_vec(value: &ClovenVal) -> Result<Vec<ClovenVal>> {
    match value {
        ClovenVal::Nil => Ok(Vec::new()),
        ClovenVal::List(list, _) => Ok(list.to_vec()),
        ClovenVal::Vector(vector, _) => Ok(vector.iter().cloned().collect()),
        ClovenVal::Map(map, _) => Ok(map
            .iter()
            .map(|(k, v)| ClovenVal::vector(vec![k.clone(), v.clone()]))
            .collect()),
        ClovenVal::Set(set, _) => Ok(set.iter().cloned().collect()),
        ClovenVal::String(s) => Ok(s.chars().map(ClovenVal::Char).collect()),
        ClovenVal::Range(range) => Ok(range.iter().map(ClovenVal::int).collect()),
        ClovenVal::Repeat(repeat) => match repeat.count() {
            Some(n) => Ok((0..n).map(|_| repeat.value().clone()).collect()),
            None => Err(Error::execution("cannot realise unbounded sequence")),
        },
        ClovenVal::Iterate(_) => Err(Error::execution("cannot realise unbounded sequence")),
        other => Err(Error::type_mismatch(other.type_name(), "is not a sequence")),
    }
}

/// `seq`: `nil` for an empty collection, otherwise a list view.
pub fn seq(value: &ClovenVal) -> Result<ClovenVal> {
    match value {
        ClovenVal::Nil => Ok(ClovenVal::Nil),
        ClovenVal::Range(range) => {
            if range.is_empty() {
                Ok(ClovenVal::Nil)
            } else {
                Ok(value.clone())
            }
        }
        ClovenVal::Repeat(repeat) => {
            if repeat.is_empty() {
                Ok(ClovenVal::Nil)
            } else {
                Ok(value.clone())
            }
        }
        ClovenVal::Iterate(_) => Ok(value.clone()),
        other => {
            let items = to_vec(other)?;
            if items.is_empty() {
                Ok(ClovenVal::Nil)
            } else {
                Ok(ClovenVal::list(items))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

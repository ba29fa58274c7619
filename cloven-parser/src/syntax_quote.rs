// cloven-parser - Syntax-quote expansion
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Syntax-quote expansion with hygienic auto-gensym.
//!
//! A syntax-quoted template expands into construction code: lists become
//! `(apply concat (vector segment...))`, vectors and maps wrap that in
//! `(apply vector ...)` / `(apply hash-map ...)`. Each ordinary element
//! contributes a one-element `(list ...)` segment; `~x` inserts the
//! expression, `~@xs` splices its segment in whole. Symbols ending in `#`
//! rename to a fresh generated symbol, stably within one enclosing quote.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use cloven_vm::error::{Error, Result};
use cloven_vm::symbol::Symbol;
use cloven_vm::value::ClovenVal;

static GENSYM_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next process-unique gensym number (also used by the `gensym`
/// built-in).
pub fn next_gensym_id() -> u64 {
    GENSYM_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Expand one syntax-quoted form. Auto-gensyms are stable across the
/// whole expansion but fresh for each one.
pub(crate) fn expand(form: &ClovenVal) -> Result<ClovenVal> {
    let mut gensyms = HashMap::new();
    quote_form(form, &mut gensyms)
}

fn sym(name: &str) -> ClovenVal {
    ClovenVal::symbol(Symbol::new(name))
}

fn quoted(form: ClovenVal) -> ClovenVal {
    ClovenVal::list(vec![sym("quote"), form])
}

/// `(apply concat (vector segments...))`
fn concat_segments(segments: Vec<ClovenVal>) -> ClovenVal {
    let mut vector_call = vec![sym("vector")];
    vector_call.extend(segments);
    ClovenVal::list(vec![
        sym("apply"),
        sym("concat"),
        ClovenVal::list(vector_call),
    ])
}

fn rebuild(constructor: &str, elements: ClovenVal) -> ClovenVal {
    ClovenVal::list(vec![sym("apply"), sym(constructor), elements])
}

fn unquote_payload(form: &ClovenVal, which: &str) -> Option<ClovenVal> {
    if let ClovenVal::List(list, _) = form {
        if list.len() == 2 {
            if let Some(ClovenVal::Symbol(head, _)) = list.first() {
                if head.name() == which && !head.has_namespace() {
                    return list.get(1).cloned();
                }
            }
        }
    }
    None
}

fn quote_form(form: &ClovenVal, gensyms: &mut HashMap<String, Symbol>) -> Result<ClovenVal> {
    if let Some(payload) = unquote_payload(form, "unquote") {
        return Ok(payload);
    }
    if unquote_payload(form, "unquote-splicing").is_some() {
        return Err(Error::compile(
            "unquote-splicing outside of list context",
        ));
    }

    match form {
        ClovenVal::Symbol(s, _) => {
            if !s.has_namespace() && s.name().len() > 1 && s.name().ends_with('#') {
                let gensym = gensyms
                    .entry(s.name().to_string())
                    .or_insert_with(|| {
                        let stem = &s.name()[..s.name().len() - 1];
                        Symbol::new(&format!("{}__{}__auto__", stem, next_gensym_id()))
                    })
                    .clone();
                return Ok(quoted(ClovenVal::symbol(gensym)));
            }
            Ok(quoted(form.clone()))
        }

        ClovenVal::List(list, _) => {
            if list.is_empty() {
                return Ok(quoted(form.clone()));
            }
            let segments = segment_all(&list.to_vec(), gensyms)?;
            Ok(concat_segments(segments))
        }

        ClovenVal::Vector(items, _) => {
            let items: Vec<ClovenVal> = items.iter().cloned().collect();
            let segments = segment_all(&items, gensyms)?;
            Ok(rebuild("vector", concat_segments(segments)))
        }

        ClovenVal::Map(map, _) => {
            let mut flat = Vec::with_capacity(map.len() * 2);
            for (k, v) in map.iter() {
                flat.push(k.clone());
                flat.push(v.clone());
            }
            let segments = segment_all(&flat, gensyms)?;
            Ok(rebuild("hash-map", concat_segments(segments)))
        }

        ClovenVal::Set(set, _) => {
            let items: Vec<ClovenVal> = set.iter().cloned().collect();
            let segments = segment_all(&items, gensyms)?;
            Ok(rebuild("hash-set", concat_segments(segments)))
        }

        // Self-evaluating atoms stand for themselves
        other => Ok(other.clone()),
    }
}

/// One `(list ...)` segment per ordinary element; splices pass through.
fn segment_all(
    elements: &[ClovenVal],
    gensyms: &mut HashMap<String, Symbol>,
) -> Result<Vec<ClovenVal>> {
    let mut segments = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(payload) = unquote_payload(element, "unquote-splicing") {
            segments.push(payload);
        } else {
            let expanded = quote_form(element, gensyms)?;
            segments.push(ClovenVal::list(vec![sym("list"), expanded]));
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<ClovenVal>) -> ClovenVal {
        ClovenVal::list(items)
    }

    #[test]
    fn test_symbol_quotes() {
        let out = expand(&sym("x")).unwrap();
        assert_eq!(out.to_string(), "(quote x)");
    }

    #[test]
    fn test_unquote_passes_through() {
        let form = list(vec![sym("unquote"), sym("x")]);
        let out = expand(&form).unwrap();
        assert_eq!(out.to_string(), "x");
    }

    #[test]
    fn test_list_expansion_shape() {
        // `(a ~b) => (apply concat (vector (list (quote a)) (list b)))
        let form = list(vec![sym("a"), list(vec![sym("unquote"), sym("b")])]);
        let out = expand(&form).unwrap();
        assert_eq!(
            out.to_string(),
            "(apply concat (vector (list (quote a)) (list b)))"
        );
    }

    #[test]
    fn test_splice_becomes_segment() {
        // `(a ~@bs) => (apply concat (vector (list (quote a)) bs))
        let form = list(vec![
            sym("a"),
            list(vec![sym("unquote-splicing"), sym("bs")]),
        ]);
        let out = expand(&form).unwrap();
        assert_eq!(
            out.to_string(),
            "(apply concat (vector (list (quote a)) bs))"
        );
    }

    #[test]
    fn test_top_level_splice_is_error() {
        let form = list(vec![sym("unquote-splicing"), sym("xs")]);
        assert!(expand(&form).is_err());
    }

    #[test]
    fn test_auto_gensym_stable_within_quote() {
        // `(x# x#) - both occurrences rename to the same symbol
        let form = list(vec![sym("x#"), sym("x#")]);
        let out = expand(&form).unwrap();
        let printed = out.to_string();
        let first = printed.find("x__").unwrap();
        let second = printed.rfind("x__").unwrap();
        assert_ne!(first, second);
        // Extract both generated names and compare
        let name_at = |at: usize| -> &str {
            let rest = &printed[at..];
            &rest[..rest.find(')').unwrap()]
        };
        assert_eq!(name_at(first), name_at(second));
    }

    #[test]
    fn test_auto_gensym_fresh_across_quotes() {
        let form = list(vec![sym("x#")]);
        let a = expand(&form).unwrap().to_string();
        let b = expand(&form).unwrap().to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_vector_expansion() {
        // `[~a] => (apply vector (apply concat (vector (list a))))
        let form = ClovenVal::vector(vec![list(vec![sym("unquote"), sym("a")])]);
        let out = expand(&form).unwrap();
        assert_eq!(
            out.to_string(),
            "(apply vector (apply concat (vector (list a))))"
        );
    }
}

// cloven-core - String and naming built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Strings and names: str, subs, name, namespace, keyword, symbol.

use cloven_vm::error::{Error, Result};
use cloven_vm::keyword::Keyword;
use cloven_vm::symbol::Symbol;
use cloven_vm::value::ClovenVal;

use super::require_int;

/// (str & xs) - concatenated display forms; nil renders as nothing
pub(crate) fn builtin_str(args: &[ClovenVal]) -> Result<ClovenVal> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.display_string());
    }
    Ok(ClovenVal::string(out))
}

/// (subs s start) / (subs s start end) - substring by char index
pub(crate) fn builtin_subs(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::arity_named("subs", 2, args.len()));
    }
    let s = match &args[0] {
        ClovenVal::String(s) => s,
        other => return Err(Error::type_expected(other.type_name(), "is not a", "string")),
    };
    let chars: Vec<char> = s.chars().collect();
    let start = require_int(&args[1])?;
    let end = match args.get(2) {
        Some(v) => require_int(v)?,
        None => chars.len() as i64,
    };
    if start < 0 || end < start || end as usize > chars.len() {
        return Err(Error::execution(format!(
            "subs bounds {}..{} out of range for string of length {}",
            start,
            end,
            chars.len()
        )));
    }
    let text: String = chars[start as usize..end as usize].iter().collect();
    Ok(ClovenVal::string(text))
}

/// (name x) - the name part of a keyword, symbol or string
pub(crate) fn builtin_name(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("name", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Keyword(kw) => Ok(ClovenVal::string(kw.name())),
        ClovenVal::Symbol(sym, _) => Ok(ClovenVal::string(sym.name())),
        ClovenVal::String(s) => Ok(ClovenVal::String(s.clone())),
        other => Err(Error::type_mismatch(other.type_name(), "has no name")),
    }
}

/// (namespace x) - the namespace part of a keyword or symbol, or nil
pub(crate) fn builtin_namespace(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("namespace", 1, args.len()));
    }
    let ns = match &args[0] {
        ClovenVal::Keyword(kw) => kw.namespace().map(ClovenVal::string),
        ClovenVal::Symbol(sym, _) => sym.namespace().map(ClovenVal::string),
        other => {
            return Err(Error::type_mismatch(other.type_name(), "has no namespace"))
        }
    };
    Ok(ns.unwrap_or(ClovenVal::Nil))
}

/// (keyword name) / (keyword ns name)
pub(crate) fn builtin_keyword(args: &[ClovenVal]) -> Result<ClovenVal> {
    match args.len() {
        1 => match &args[0] {
            ClovenVal::Keyword(kw) => Ok(ClovenVal::keyword(kw.clone())),
            ClovenVal::String(s) => Ok(ClovenVal::keyword(Keyword::parse(s))),
            ClovenVal::Symbol(sym, _) => Ok(ClovenVal::keyword(match sym.namespace() {
                Some(ns) => Keyword::with_namespace(ns, sym.name()),
                None => Keyword::new(sym.name()),
            })),
            other => Err(Error::type_mismatch(
                other.type_name(),
                "cannot become a keyword",
            )),
        },
        2 => {
            let ns = string_part("keyword", &args[0])?;
            let name = string_part("keyword", &args[1])?;
            Ok(ClovenVal::keyword(Keyword::with_namespace(&ns, &name)))
        }
        n => Err(Error::arity_named("keyword", 1, n)),
    }
}

/// (symbol name) / (symbol ns name)
pub(crate) fn builtin_symbol(args: &[ClovenVal]) -> Result<ClovenVal> {
    match args.len() {
        1 => match &args[0] {
            ClovenVal::Symbol(sym, _) => Ok(ClovenVal::symbol(sym.clone())),
            ClovenVal::String(s) => Ok(ClovenVal::symbol(Symbol::parse(s))),
            ClovenVal::Keyword(kw) => Ok(ClovenVal::symbol(match kw.namespace() {
                Some(ns) => Symbol::with_namespace(ns, kw.name()),
                None => Symbol::new(kw.name()),
            })),
            other => Err(Error::type_mismatch(
                other.type_name(),
                "cannot become a symbol",
            )),
        },
        2 => {
            let ns = string_part("symbol", &args[0])?;
            let name = string_part("symbol", &args[1])?;
            Ok(ClovenVal::symbol(Symbol::with_namespace(&ns, &name)))
        }
        n => Err(Error::arity_named("symbol", 1, n)),
    }
}

fn string_part(what: &str, v: &ClovenVal) -> Result<String> {
    match v {
        ClovenVal::String(s) => Ok(s.to_string()),
        other => Err(Error::type_expected(
            other.type_name(),
            format!("is not a valid {} part, expected", what),
            "string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_concatenates_display_forms() {
        let out = builtin_str(&[
            ClovenVal::string("n="),
            ClovenVal::int(4),
            ClovenVal::Nil,
            ClovenVal::char('!'),
        ])
        .unwrap();
        assert_eq!(out, ClovenVal::string("n=4!"));
    }

    #[test]
    fn test_subs() {
        let s = ClovenVal::string("hello");
        assert_eq!(
            builtin_subs(&[s.clone(), ClovenVal::int(1), ClovenVal::int(3)]).unwrap(),
            ClovenVal::string("el")
        );
        assert_eq!(
            builtin_subs(&[s.clone(), ClovenVal::int(2)]).unwrap(),
            ClovenVal::string("llo")
        );
        assert!(builtin_subs(&[s, ClovenVal::int(9)]).is_err());
    }

    #[test]
    fn test_name_and_namespace() {
        let kw = ClovenVal::keyword(Keyword::with_namespace("a", "b"));
        assert_eq!(builtin_name(&[kw.clone()]).unwrap(), ClovenVal::string("b"));
        assert_eq!(
            builtin_namespace(&[kw]).unwrap(),
            ClovenVal::string("a")
        );
        let plain = ClovenVal::keyword(Keyword::new("x"));
        assert_eq!(builtin_namespace(&[plain]).unwrap(), ClovenVal::Nil);
    }

    #[test]
    fn test_keyword_from_string() {
        assert_eq!(
            builtin_keyword(&[ClovenVal::string("k")]).unwrap(),
            ClovenVal::keyword(Keyword::new("k"))
        );
    }
}

// cloven-core - Regular expression built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Regular expressions: re-pattern, re-matches, re-find, re-seq.
//!
//! Patterns use Rust regex syntax: no lookaround or backreferences,
//! named groups spell `(?P<name>...)`.

use cloven_vm::error::{Error, Result};
use cloven_vm::value::{ClovenRegex, ClovenVal};

fn require_regex(v: &ClovenVal) -> Result<&ClovenRegex> {
    match v {
        ClovenVal::Regex(re) => Ok(re),
        other => Err(Error::type_expected(other.type_name(), "is not a", "regex")),
    }
}

fn require_string(v: &ClovenVal) -> Result<&str> {
    match v {
        ClovenVal::String(s) => Ok(s),
        other => Err(Error::type_expected(other.type_name(), "is not a", "string")),
    }
}

/// Capture groups become a vector [whole g1 g2 ...]; a plain match stays
/// a string.
fn match_value(re: &ClovenRegex, text: &str) -> Option<ClovenVal> {
    let caps = re.0.captures(text)?;
    if caps.len() == 1 {
        return Some(ClovenVal::string(caps.get(0)?.as_str()));
    }
    let groups = caps
        .iter()
        .map(|g| match g {
            Some(m) => ClovenVal::string(m.as_str()),
            None => ClovenVal::Nil,
        })
        .collect();
    Some(ClovenVal::vector(groups))
}

/// (re-pattern s) - compile a pattern string
pub(crate) fn builtin_re_pattern(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 1 {
        return Err(Error::arity_named("re-pattern", 1, args.len()));
    }
    match &args[0] {
        ClovenVal::Regex(re) => Ok(ClovenVal::Regex(re.clone())),
        ClovenVal::String(s) => Ok(ClovenVal::Regex(ClovenRegex::compile(s)?)),
        other => Err(Error::type_expected(other.type_name(), "is not a", "string")),
    }
}

/// (re-matches re s) - the match if the whole string matches, else nil
pub(crate) fn builtin_re_matches(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("re-matches", 2, args.len()));
    }
    let re = require_regex(&args[0])?;
    let text = require_string(&args[1])?;
    match re.0.find(text) {
        Some(m) if m.start() == 0 && m.end() == text.len() => {
            Ok(match_value(re, text).unwrap_or(ClovenVal::Nil))
        }
        _ => Ok(ClovenVal::Nil),
    }
}

/// (re-find re s) - the first match anywhere in the string, else nil
pub(crate) fn builtin_re_find(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("re-find", 2, args.len()));
    }
    let re = require_regex(&args[0])?;
    let text = require_string(&args[1])?;
    Ok(match_value(re, text).unwrap_or(ClovenVal::Nil))
}

/// (re-seq re s) - list of all matches in the string
pub(crate) fn builtin_re_seq(args: &[ClovenVal]) -> Result<ClovenVal> {
    if args.len() != 2 {
        return Err(Error::arity_named("re-seq", 2, args.len()));
    }
    let re = require_regex(&args[0])?;
    let text = require_string(&args[1])?;
    let matches = re
        .0
        .find_iter(text)
        .map(|m| ClovenVal::string(m.as_str()))
        .collect();
    Ok(ClovenVal::list(matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> ClovenVal {
        ClovenVal::Regex(ClovenRegex::compile(pattern).unwrap())
    }

    #[test]
    fn test_re_matches_whole_string_only() {
        let out = builtin_re_matches(&[re("a+"), ClovenVal::string("aaa")]).unwrap();
        assert_eq!(out, ClovenVal::string("aaa"));
        let out = builtin_re_matches(&[re("a+"), ClovenVal::string("aab")]).unwrap();
        assert_eq!(out, ClovenVal::Nil);
    }

    #[test]
    fn test_re_find_partial() {
        let out = builtin_re_find(&[re("b+"), ClovenVal::string("abba")]).unwrap();
        assert_eq!(out, ClovenVal::string("bb"));
    }

    #[test]
    fn test_re_seq() {
        let out = builtin_re_seq(&[re("[0-9]+"), ClovenVal::string("a1b22c")]).unwrap();
        assert_eq!(out.to_string(), "(\"1\" \"22\")");
    }

    #[test]
    fn test_groups_become_vector() {
        let out =
            builtin_re_find(&[re("(a)(b)"), ClovenVal::string("xabx")]).unwrap();
        assert_eq!(out.to_string(), "[\"ab\" \"a\" \"b\"]");
    }
}

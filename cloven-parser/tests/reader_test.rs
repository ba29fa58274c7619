// cloven-parser - Reader integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for the Cloven reader: atoms, collections, macro
//! characters, metadata, comments and error positions.

use cloven_parser::{Reader, TokenKind};
use cloven_vm::keyword::Keyword;
use cloven_vm::symbol::Symbol;
use cloven_vm::value::ClovenVal;

fn read_one(source: &str) -> ClovenVal {
    Reader::new(source, "test")
        .read()
        .expect("read failed")
        .expect("no form")
}

fn read_err(source: &str) -> cloven_vm::Error {
    match Reader::new(source, "test").read() {
        Err(e) => e,
        Ok(v) => panic!("expected error, got {:?}", v),
    }
}

// =============================================================================
// Atoms
// =============================================================================

#[test]
fn test_read_integers() {
    assert_eq!(read_one("42"), ClovenVal::int(42));
    assert_eq!(read_one("-7"), ClovenVal::int(-7));
    assert_eq!(read_one("+7"), ClovenVal::int(7));
}

#[test]
fn test_plus_minus_symbols() {
    assert_eq!(read_one("+"), ClovenVal::symbol(Symbol::new("+")));
    assert_eq!(read_one("-"), ClovenVal::symbol(Symbol::new("-")));
    assert_eq!(read_one("-foo"), ClovenVal::symbol(Symbol::new("-foo")));
}

#[test]
fn test_reserved_tokens() {
    assert_eq!(read_one("nil"), ClovenVal::Nil);
    assert_eq!(read_one("true"), ClovenVal::bool(true));
    assert_eq!(read_one("false"), ClovenVal::bool(false));
}

#[test]
fn test_read_keywords() {
    assert_eq!(
        read_one(":foo"),
        ClovenVal::keyword(Keyword::new("foo"))
    );
    assert_eq!(
        read_one(":ns/foo"),
        ClovenVal::keyword(Keyword::with_namespace("ns", "foo"))
    );
}

#[test]
fn test_double_colon_keyword_uses_current_ns() {
    let mut reader = Reader::new("::local", "test").with_current_ns("my.app");
    let form = reader.read().unwrap().unwrap();
    assert_eq!(
        form,
        ClovenVal::keyword(Keyword::with_namespace("my.app", "local"))
    );
}

#[test]
fn test_namespaced_symbol() {
    assert_eq!(
        read_one("str/join"),
        ClovenVal::symbol(Symbol::with_namespace("str", "join"))
    );
}

#[test]
fn test_read_strings() {
    assert_eq!(read_one("\"hello\""), ClovenVal::string("hello"));
    assert_eq!(read_one("\"a\\nb\""), ClovenVal::string("a\nb"));
    assert_eq!(read_one("\"q\\\"q\""), ClovenVal::string("q\"q"));
    assert_eq!(read_one("\"\\u0041\""), ClovenVal::string("A"));
}

#[test]
fn test_read_chars() {
    assert_eq!(read_one("\\a"), ClovenVal::char('a'));
    assert_eq!(read_one("\\space"), ClovenVal::char(' '));
    assert_eq!(read_one("\\newline"), ClovenVal::char('\n'));
    assert_eq!(read_one("\\tab"), ClovenVal::char('\t'));
    assert_eq!(read_one("\\u0041"), ClovenVal::char('A'));
    assert_eq!(read_one("\\o101"), ClovenVal::char('A'));
}

#[test]
fn test_invalid_char_constant() {
    assert!(read_err("\\nope").to_string().contains("invalid char"));
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn test_read_list() {
    let form = read_one("(a b c)");
    assert_eq!(form.to_string(), "(a b c)");
}

#[test]
fn test_read_vector() {
    assert_eq!(
        read_one("[1 2 3]"),
        ClovenVal::vector(vec![
            ClovenVal::int(1),
            ClovenVal::int(2),
            ClovenVal::int(3)
        ])
    );
}

#[test]
fn test_read_map() {
    let form = read_one("{:a 1}");
    match form {
        ClovenVal::Map(map, _) => {
            assert_eq!(map.len(), 1);
            assert_eq!(
                map.get(&ClovenVal::keyword(Keyword::new("a"))),
                Some(&ClovenVal::int(1))
            );
        }
        other => panic!("expected a map, got {:?}", other),
    }
}

#[test]
fn test_odd_map_literal_is_error() {
    assert!(read_err("{:a}").to_string().contains("even number"));
}

#[test]
fn test_read_set() {
    let form = read_one("#{1 2}");
    match form {
        ClovenVal::Set(set, _) => {
            assert!(set.contains(&ClovenVal::int(1)));
            assert!(set.contains(&ClovenVal::int(2)));
        }
        other => panic!("expected a set, got {:?}", other),
    }
}

#[test]
fn test_commas_are_whitespace() {
    assert_eq!(
        read_one("[1, 2, 3]"),
        ClovenVal::vector(vec![
            ClovenVal::int(1),
            ClovenVal::int(2),
            ClovenVal::int(3)
        ])
    );
}

#[test]
fn test_nested_collections() {
    let form = read_one("(f [1 {:k (g)}])");
    assert_eq!(form.to_string(), "(f [1 {:k (g)}])");
}

// =============================================================================
// Macro characters
// =============================================================================

#[test]
fn test_quote() {
    assert_eq!(read_one("'x").to_string(), "(quote x)");
}

#[test]
fn test_deref() {
    assert_eq!(read_one("@a").to_string(), "(deref a)");
}

#[test]
fn test_var_quote() {
    assert_eq!(read_one("#'x").to_string(), "(var x)");
}

#[test]
fn test_var_quote_requires_symbol() {
    assert!(read_err("#'42").to_string().contains("invalid var quote"));
}

#[test]
fn test_line_comment_reads_as_void() {
    let mut reader = Reader::new("; nothing here\n42", "test");
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::Void);
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::int(42));
}

#[test]
fn test_form_comment_discards_form() {
    let mut reader = Reader::new("#_(+ 1 2) 3", "test");
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::Void);
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::int(3));
}

#[test]
fn test_comment_inside_collection_is_stripped() {
    assert_eq!(
        read_one("[1 ; trailing\n 2]"),
        ClovenVal::vector(vec![ClovenVal::int(1), ClovenVal::int(2)])
    );
    assert_eq!(
        read_one("(f 1 #_2)").to_string(),
        "(f 1)"
    );
}

#[test]
fn test_regex_literal() {
    let form = read_one("#\"a+b\"");
    match form {
        ClovenVal::Regex(re) => assert_eq!(re.pattern(), "a+b"),
        other => panic!("expected a regex, got {:?}", other),
    }
}

#[test]
fn test_regex_keeps_backslashes() {
    let form = read_one("#\"\\d+\"");
    match form {
        ClovenVal::Regex(re) => assert_eq!(re.pattern(), "\\d+"),
        other => panic!("expected a regex, got {:?}", other),
    }
}

#[test]
fn test_short_fn_single_arg() {
    assert_eq!(read_one("#(+ % 1)").to_string(), "(fn* [%1] (+ %1 1))");
}

#[test]
fn test_short_fn_max_arg() {
    assert_eq!(
        read_one("#(+ %1 %3)").to_string(),
        "(fn* [%1 %2 %3] (+ %1 %3))"
    );
}

#[test]
fn test_short_fn_no_args() {
    assert_eq!(read_one("#(f)").to_string(), "(fn* [] (f))");
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn test_keyword_meta() {
    assert_eq!(
        read_one("^:foo zoo").to_string(),
        "(with-meta zoo {:foo true})"
    );
}

#[test]
fn test_symbol_meta_becomes_tag() {
    assert_eq!(
        read_one("^String s").to_string(),
        "(with-meta s {:tag String})"
    );
}

#[test]
fn test_stacked_meta_merges() {
    // ^:foo ^:bar zoo => (with-meta zoo {:foo true :bar true})
    let form = read_one("^:foo ^:bar zoo");
    let expected = read_one("(with-meta zoo {:foo true :bar true})");
    assert_eq!(form, expected);
}

#[test]
fn test_map_meta_passes_through() {
    assert_eq!(
        read_one("^{:k 1} x").to_string(),
        "(with-meta x {:k 1})"
    );
}

// =============================================================================
// Syntax quote
// =============================================================================

#[test]
fn test_syntax_quote_symbol() {
    assert_eq!(read_one("`x").to_string(), "(quote x)");
}

#[test]
fn test_syntax_quote_list_shape() {
    assert_eq!(
        read_one("`(a ~b)").to_string(),
        "(apply concat (vector (list (quote a)) (list b)))"
    );
}

#[test]
fn test_syntax_quote_splice() {
    assert_eq!(
        read_one("`(a ~@bs)").to_string(),
        "(apply concat (vector (list (quote a)) bs))"
    );
}

#[test]
fn test_splice_outside_list_is_error() {
    let err = read_err("`~@xs");
    assert!(err.to_string().contains("unquote-splicing"));
}

#[test]
fn test_auto_gensym_is_stable() {
    let form = read_one("`(let* [x# 1] x#)").to_string();
    // Both occurrences expanded to the same generated name
    let auto = form
        .split_whitespace()
        .find(|w| w.contains("__auto__"))
        .expect("no gensym in expansion");
    let name = auto.trim_matches(|c| c == '(' || c == ')');
    assert_eq!(form.matches(name).count(), 2);
}

// =============================================================================
// Errors and positions
// =============================================================================

#[test]
fn test_unmatched_close_delimiter() {
    assert!(read_err(")").to_string().contains("unmatched delimiter"));
}

#[test]
fn test_eof_in_list() {
    let err = read_err("(1 2");
    assert!(err.to_string().contains("EOF"));
}

#[test]
fn test_eof_in_string() {
    assert!(read_err("\"abc").to_string().contains("EOF"));
}

#[test]
fn test_clean_eof_is_none() {
    let mut reader = Reader::new("   ", "test");
    assert!(reader.read().unwrap().is_none());
}

#[test]
fn test_error_carries_position() {
    let mut reader = Reader::new("\n\n   )", "test.clv");
    let err = reader.read().unwrap_err();
    let printed = err.to_string();
    assert!(printed.contains("test.clv"));
    assert!(printed.contains("3:"), "line missing in {}", printed);
}

#[test]
fn test_multiple_forms() {
    let mut reader = Reader::new("1 2 3", "test");
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::int(1));
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::int(2));
    assert_eq!(reader.read().unwrap().unwrap(), ClovenVal::int(3));
    assert!(reader.read().unwrap().is_none());
}

#[test]
fn test_read_all_skips_voids() {
    let mut reader = Reader::new("; c\n1 #_x 2", "test");
    let forms = reader.read_all().unwrap();
    assert_eq!(forms, vec![ClovenVal::int(1), ClovenVal::int(2)]);
}

// =============================================================================
// Tokens
// =============================================================================

#[test]
fn test_tokens_recorded() {
    let mut reader = Reader::new("(f \"s\" 42)", "test");
    reader.read().unwrap();
    let kinds: Vec<TokenKind> = reader.tokens().iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TokenKind::Open));
    assert!(kinds.contains(&TokenKind::Symbol));
    assert!(kinds.contains(&TokenKind::String));
    assert!(kinds.contains(&TokenKind::Number));
    assert!(kinds.contains(&TokenKind::Close));
}

#[test]
fn test_token_spans_are_byte_positions() {
    let mut reader = Reader::new("\"ab\"", "test");
    reader.read().unwrap();
    let token = reader.tokens().last().unwrap();
    assert_eq!(token.start, 0);
    assert_eq!(token.end, 4);
}

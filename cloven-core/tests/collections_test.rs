// cloven-core - Collection integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Collection semantics: literals, conj insertion points, lookup,
//! associative updates and callability.

mod common;

use common::{assert_eval, assert_eval_err, ClovenVal};

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_literals_with_expressions() {
    assert_eval!("[(+ 1 1) (+ 2 2)]", ClovenVal::vector(vec![
        ClovenVal::int(2),
        ClovenVal::int(4)
    ]));
    assert_eval!("(get {:k (+ 20 22)} :k)", ClovenVal::int(42));
    assert_eval!("(count #{1 (+ 1 1) 3})", ClovenVal::int(3));
}

#[test]
fn test_empty_literals() {
    assert_eval!("(count [])", ClovenVal::int(0));
    assert_eval!("(count {})", ClovenVal::int(0));
    assert_eval!("(count #{})", ClovenVal::int(0));
    assert_eval!("(count ())", ClovenVal::int(0));
}

// =============================================================================
// conj insertion points
// =============================================================================

#[test]
fn test_conj_list_prepends() {
    assert_eval!(
        "(conj '(2 3) 1)",
        ClovenVal::list(vec![
            ClovenVal::int(1),
            ClovenVal::int(2),
            ClovenVal::int(3)
        ])
    );
}

#[test]
fn test_conj_vector_appends() {
    assert_eval!(
        "(conj [1 2] 3)",
        ClovenVal::vector(vec![
            ClovenVal::int(1),
            ClovenVal::int(2),
            ClovenVal::int(3)
        ])
    );
}

#[test]
fn test_conj_set_inserts() {
    assert_eval!("(count (conj #{1 2} 2))", ClovenVal::int(2));
    assert_eval!("(count (conj #{1 2} 3))", ClovenVal::int(3));
}

#[test]
fn test_conj_map_takes_entries() {
    assert_eval!("(get (conj {} [:a 1]) :a)", ClovenVal::int(1));
}

#[test]
fn test_conj_nil_starts_list() {
    assert_eval!("(conj nil 1)", ClovenVal::list(vec![ClovenVal::int(1)]));
}

// =============================================================================
// Associative operations
// =============================================================================

#[test]
fn test_assoc_map() {
    assert_eval!("(get (assoc {} :a 1) :a)", ClovenVal::int(1));
    assert_eval!("(get (assoc {:a 1} :a 2) :a)", ClovenVal::int(2));
    assert_eval!("(get (assoc {} :a 1 :b 2) :b)", ClovenVal::int(2));
}

#[test]
fn test_assoc_vector_index() {
    assert_eval!("(assoc [1 2 3] 1 :x)", {
        ClovenVal::vector(vec![
            ClovenVal::int(1),
            ClovenVal::keyword(common::Keyword::new("x")),
            ClovenVal::int(3),
        ])
    });
}

#[test]
fn test_dissoc() {
    assert_eval!("(get (dissoc {:a 1 :b 2} :a) :a)", ClovenVal::Nil);
    assert_eval!("(count (dissoc {:a 1 :b 2} :a))", ClovenVal::int(1));
}

#[test]
fn test_merge() {
    assert_eval!("(merge {:a 1} {:b 2})", {
        let mut map = im::OrdMap::new();
        map.insert(
            ClovenVal::keyword(common::Keyword::new("a")),
            ClovenVal::int(1),
        );
        map.insert(
            ClovenVal::keyword(common::Keyword::new("b")),
            ClovenVal::int(2),
        );
        ClovenVal::map(map)
    });
    assert_eval!("(get (merge {:a 1} {:a 2}) :a)", ClovenVal::int(2));
    assert_eval!("(merge nil nil)", ClovenVal::Nil);
    assert_eval!("(merge {:a 1} nil)", {
        let mut map = im::OrdMap::new();
        map.insert(
            ClovenVal::keyword(common::Keyword::new("a")),
            ClovenVal::int(1),
        );
        ClovenVal::map(map)
    });
}

#[test]
fn test_contains() {
    assert_eval!("(contains? {:a 1} :a)", ClovenVal::bool(true));
    assert_eval!("(contains? {:a 1} :b)", ClovenVal::bool(false));
    assert_eval!("(contains? #{1 2} 2)", ClovenVal::bool(true));
    assert_eval!("(contains? [9 9] 1)", ClovenVal::bool(true));
    assert_eval!("(contains? [9 9] 5)", ClovenVal::bool(false));
}

// =============================================================================
// Collections as functions
// =============================================================================

#[test]
fn test_map_as_function() {
    assert_eval!("({:a 1} :a)", ClovenVal::int(1));
    assert_eval!("({:a 1} :b)", ClovenVal::Nil);
    assert_eval!("({:a 1} :b 9)", ClovenVal::int(9));
}

#[test]
fn test_keyword_as_function() {
    assert_eval!("(:a {:a 1})", ClovenVal::int(1));
    assert_eval!("(:b {:a 1} :default)", ClovenVal::keyword(common::Keyword::new("default")));
}

#[test]
fn test_set_as_membership_function() {
    assert_eval!("(#{1 2 3} 2)", ClovenVal::int(2));
    assert_eval!("(#{1 2 3} 9)", ClovenVal::Nil);
}

#[test]
fn test_vector_as_index_function() {
    assert_eval!("([10 20 30] 1)", ClovenVal::int(20));
    assert_eval_err!("([10] 5)", "out of bounds");
}

// =============================================================================
// Structural equality
// =============================================================================

#[test]
fn test_map_equality_is_structural() {
    assert_eval!("(= {:a 1 :b 2} {:b 2 :a 1})", ClovenVal::bool(true));
    assert_eval!("(= #{1 2} #{2 1})", ClovenVal::bool(true));
}

#[test]
fn test_list_vector_sequential_equality() {
    assert_eval!("(= '(1 2) [1 2])", ClovenVal::bool(true));
    assert_eval!("(= '(1 2) [1 3])", ClovenVal::bool(false));
}

#[test]
fn test_keys_vals() {
    assert_eval!("(count (keys {:a 1 :b 2}))", ClovenVal::int(2));
    assert_eval!("(count (vals {:a 1 :b 2}))", ClovenVal::int(2));
}

#[test]
fn test_lookup_on_strings_and_lists() {
    assert_eval!("(get \"abc\" 1)", ClovenVal::char('b'));
    assert_eval!("(get '(10 20) 1)", ClovenVal::int(20));
    assert_eval!("(nth [1 2 3] 2)", ClovenVal::int(3));
}

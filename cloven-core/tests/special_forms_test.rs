// cloven-core - Special form integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for if, do, let, def, set!, quote, var and the stdlib's
//! conditional macros.

mod common;

use common::{assert_eval, assert_eval_err, new_runtime, run_with, ClovenVal};

// =============================================================================
// if / do
// =============================================================================

#[test]
fn test_if_without_else_gives_nil() {
    assert_eval!("(if false 1)", ClovenVal::Nil);
}

#[test]
fn test_only_nil_and_false_are_falsy() {
    assert_eval!("(if 0 :t :f)", ClovenVal::keyword(common::Keyword::new("t")));
    assert_eval!("(if \"\" :t :f)", ClovenVal::keyword(common::Keyword::new("t")));
    assert_eval!("(if '() :t :f)", ClovenVal::keyword(common::Keyword::new("t")));
    assert_eval!("(if nil :t :f)", ClovenVal::keyword(common::Keyword::new("f")));
    assert_eval!("(if false :t :f)", ClovenVal::keyword(common::Keyword::new("f")));
}

#[test]
fn test_do_sequences_effects() {
    assert_eval!("(do)", ClovenVal::Nil);
    assert_eval!("(do 1 2 3)", ClovenVal::int(3));
    assert_eval!(
        "(do (def counter (atom 0))
             (swap! counter inc)
             (swap! counter inc)
             (deref counter))",
        ClovenVal::int(2)
    );
}

// =============================================================================
// let
// =============================================================================

#[test]
fn test_let_binding_and_result() {
    assert_eval!("(let [x 1] x)", ClovenVal::int(1));
    assert_eval!("(let [x 1 y 2] (+ x y))", ClovenVal::int(3));
}

#[test]
fn test_let_sequential_bindings() {
    assert_eval!("(let [x 10 y (+ x 5)] y)", ClovenVal::int(15));
    assert_eval!("(let [a 1 b (+ a 1) c (+ b 1)] c)", ClovenVal::int(3));
}

#[test]
fn test_let_shadowing() {
    assert_eval!("(let [x 1] (let [x 2] x))", ClovenVal::int(2));
    assert_eval!("(let [x 1] (let [x 2] nil) x)", ClovenVal::int(1));
}

#[test]
fn test_let_empty_body() {
    assert_eval!("(let [x 1])", ClovenVal::Nil);
}

#[test]
fn test_let_multiple_body_forms() {
    assert_eval!("(let [x 1] 9 8 x)", ClovenVal::int(1));
}

// =============================================================================
// def / set! / var / quote
// =============================================================================

#[test]
fn test_def_returns_var() {
    let runtime = new_runtime();
    let result = run_with(&runtime, "(def x 1)").unwrap();
    assert_eq!(result.to_string(), "#'user/x");
}

#[test]
fn test_def_updates_existing_var() {
    assert_eval!("(do (def x 1) (def x 2) x)", ClovenVal::int(2));
}

#[test]
fn test_set_bang_updates() {
    assert_eval!("(do (def x 1) (set! x 42) x)", ClovenVal::int(42));
}

#[test]
fn test_set_bang_requires_existing() {
    assert_eval_err!("(set! nope 1)", "unable to resolve");
}

#[test]
fn test_var_special_form_returns_var_not_value() {
    let runtime = new_runtime();
    run_with(&runtime, "(def x 5)").unwrap();
    let result = run_with(&runtime, "(var x)").unwrap();
    assert_eq!(result.to_string(), "#'user/x");
    // #'x is reader shorthand for the same
    let result = run_with(&runtime, "#'x").unwrap();
    assert_eq!(result.to_string(), "#'user/x");
}

#[test]
fn test_var_invocation_goes_through_root() {
    assert_eval!("(do (def f (fn [x] (* 2 x))) (#'f 21))", ClovenVal::int(42));
}

#[test]
fn test_quote_prevents_evaluation() {
    assert_eval!(
        "(quote (+ 1 2))",
        ClovenVal::list(vec![
            ClovenVal::symbol(common::Symbol::new("+")),
            ClovenVal::int(1),
            ClovenVal::int(2),
        ])
    );
}

#[test]
fn test_deref_shorthand() {
    assert_eval!("(do (def a (atom 7)) @a)", ClovenVal::int(7));
}

// =============================================================================
// Stdlib conditionals
// =============================================================================

#[test]
fn test_when() {
    assert_eval!("(when true 1 2)", ClovenVal::int(2));
    assert_eval!("(when false 1 2)", ClovenVal::Nil);
}

#[test]
fn test_when_not() {
    assert_eval!("(when-not false :yes)", ClovenVal::keyword(common::Keyword::new("yes")));
    assert_eval!("(when-not true :yes)", ClovenVal::Nil);
}

#[test]
fn test_cond() {
    let source = "(defn grade [n]
                    (cond (< n 60) :fail
                          (< n 90) :pass
                          true :ace))";
    let runtime = new_runtime();
    run_with(&runtime, source).unwrap();
    assert_eq!(
        run_with(&runtime, "(grade 50)").unwrap(),
        ClovenVal::keyword(common::Keyword::new("fail"))
    );
    assert_eq!(
        run_with(&runtime, "(grade 75)").unwrap(),
        ClovenVal::keyword(common::Keyword::new("pass"))
    );
    assert_eq!(
        run_with(&runtime, "(grade 95)").unwrap(),
        ClovenVal::keyword(common::Keyword::new("ace"))
    );
}

#[test]
fn test_and_short_circuits() {
    assert_eval!("(and)", ClovenVal::bool(true));
    assert_eval!("(and 1 2 3)", ClovenVal::int(3));
    assert_eval!("(and 1 nil 3)", ClovenVal::Nil);
    // The side effect after the nil never runs
    assert_eval!(
        "(do (def hits (atom 0))
             (and nil (swap! hits inc))
             @hits)",
        ClovenVal::int(0)
    );
}

#[test]
fn test_or_short_circuits() {
    assert_eval!("(or)", ClovenVal::Nil);
    assert_eval!("(or nil false 3)", ClovenVal::int(3));
    assert_eval!("(or 1 2)", ClovenVal::int(1));
    assert_eval!(
        "(do (def hits (atom 0))
             (or 1 (swap! hits inc))
             @hits)",
        ClovenVal::int(0)
    );
}

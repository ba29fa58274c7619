// cloven-core - Atom, channel and task integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared-state primitives: atoms under concurrent swaps, channels
//! between tasks, and go* task lifecycles.

mod common;

use common::{assert_eval, new_runtime, run_with, ClovenVal};

// =============================================================================
// Atoms
// =============================================================================

#[test]
fn test_atom_basics() {
    assert_eval!("(deref (atom 1))", ClovenVal::int(1));
    assert_eval!("(do (def a (atom 1)) (reset! a 2) @a)", ClovenVal::int(2));
    assert_eval!("(do (def a (atom 1)) (swap! a inc) @a)", ClovenVal::int(2));
    assert_eval!("(do (def a (atom 1)) (swap! a + 10 100))", ClovenVal::int(111));
}

#[test]
fn test_swap_returns_new_value() {
    assert_eval!("(swap! (atom 41) inc)", ClovenVal::int(42));
}

#[test]
fn test_concurrent_swaps_are_serialised() {
    // Four tasks each increment the shared atom 250 times; the guard
    // makes every increment stick
    let runtime = new_runtime();
    run_with(
        &runtime,
        "(def counter (atom 0))
         (defn bump [n]
           (loop [i 0]
             (when (< i n)
               (swap! counter inc)
               (recur (inc i)))))
         (def t1 (go (bump 250)))
         (def t2 (go (bump 250)))
         (def t3 (go (bump 250)))
         (def t4 (go (bump 250)))",
    )
    .unwrap();
    // Wait for all four tasks via their result channels
    let result = run_with(
        &runtime,
        "(do (<! t1) (<! t2) (<! t3) (<! t4) @counter)",
    )
    .unwrap();
    assert_eq!(result, ClovenVal::int(1000));
}

// =============================================================================
// Channels
// =============================================================================

#[test]
fn test_channel_send_receive() {
    assert_eval!(
        "(do (def c (chan)) (>! c 1) (>! c 2) (+ (<! c) (<! c)))",
        ClovenVal::int(3)
    );
}

#[test]
fn test_closed_channel_yields_nil() {
    assert_eval!(
        "(do (def c (chan)) (>! c 1) (close! c) (<! c) (<! c))",
        ClovenVal::Nil
    );
}

#[test]
fn test_go_returns_result_channel() {
    assert_eval!("(<! (go (+ 20 22)))", ClovenVal::int(42));
}

#[test]
fn test_go_result_channel_closes_after_one_value() {
    assert_eval!(
        "(do (def t (go 1)) (<! t) (<! t))",
        ClovenVal::Nil
    );
}

#[test]
fn test_task_blocks_on_receive() {
    // The task can only finish once the main flow supplies a value
    let runtime = new_runtime();
    run_with(
        &runtime,
        "(def in (chan))
         (def t (go (* 2 (<! in))))",
    )
    .unwrap();
    run_with(&runtime, "(>! in 21)").unwrap();
    assert_eq!(run_with(&runtime, "(<! t)").unwrap(), ClovenVal::int(42));
}

#[test]
fn test_per_channel_ordering() {
    // One sender, one receiver: order preserved across many values
    let runtime = new_runtime();
    run_with(
        &runtime,
        "(def c (chan))
         (def t (go (loop [i 0]
                      (when (< i 100)
                        (>! c i)
                        (recur (inc i))))
                    (close! c)))",
    )
    .unwrap();
    let result = run_with(
        &runtime,
        "(loop [expected 0]
           (let [v (<! c)]
             (if (nil? v)
               expected
               (if (= v expected)
                 (recur (inc expected))
                 :out-of-order))))",
    )
    .unwrap();
    assert_eq!(result, ClovenVal::int(100));
}

#[test]
fn test_pipeline_of_tasks() {
    // Two tasks chained through a middle channel
    let runtime = new_runtime();
    run_with(
        &runtime,
        "(def mid (chan))
         (def t1 (go (>! mid 40)))
         (def t2 (go (+ (<! mid) 2)))",
    )
    .unwrap();
    assert_eq!(run_with(&runtime, "(<! t2)").unwrap(), ClovenVal::int(42));
}

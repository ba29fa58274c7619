// cloven-core - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Native built-in functions, registered into the `cloven.core`
//! namespace at runtime startup.
//!
//! Built-ins take a value slice and return a value or an error; arity
//! checking happens inside each function so every callable reports its
//! own name in arity errors.

mod arithmetic;
mod atoms;
mod channels;
mod collections;
mod comparison;
mod higher_order;
mod interop;
mod io;
mod namespaces;
mod regex;
mod sequences;
mod strings;
mod type_checks;
mod vars;

use cloven_vm::error::{Error, Result};
use cloven_vm::namespace::NamespaceRegistry;
use cloven_vm::value::ClovenVal;

use arithmetic::{
    builtin_add, builtin_dec, builtin_div, builtin_even_p, builtin_inc, builtin_max, builtin_min,
    builtin_mod, builtin_mul, builtin_neg_p, builtin_odd_p, builtin_pos_p, builtin_quot,
    builtin_rem, builtin_sub, builtin_zero_p,
};
use atoms::{builtin_atom, builtin_deref, builtin_reset, builtin_swap};
use channels::{builtin_chan, builtin_close, builtin_go_star, builtin_recv, builtin_send};
use collections::{
    builtin_assoc, builtin_conj, builtin_cons, builtin_contains_p, builtin_count, builtin_dissoc,
    builtin_empty, builtin_empty_p, builtin_get, builtin_hash_map, builtin_hash_set, builtin_keys,
    builtin_list, builtin_merge, builtin_nth, builtin_vals, builtin_vector,
};
use comparison::{
    builtin_eq, builtin_ge, builtin_gt, builtin_le, builtin_lt, builtin_not, builtin_not_eq,
};
use higher_order::{
    builtin_apply, builtin_comp, builtin_constantly, builtin_filter, builtin_identity,
    builtin_map, builtin_partial, builtin_reduce, builtin_remove,
};
use interop::builtin_dot;
use io::{
    builtin_newline, builtin_pr, builtin_pr_str, builtin_print, builtin_println, builtin_prn,
};
use regex::{builtin_re_find, builtin_re_matches, builtin_re_pattern, builtin_re_seq};
use sequences::{
    builtin_butlast, builtin_concat, builtin_drop, builtin_first, builtin_into, builtin_iterate,
    builtin_next, builtin_range, builtin_repeat, builtin_rest, builtin_reverse, builtin_seq,
    builtin_take,
};
use strings::{
    builtin_keyword, builtin_name, builtin_namespace, builtin_str, builtin_subs, builtin_symbol,
};
use type_checks::{
    builtin_atom_p, builtin_boolean_p, builtin_chan_p, builtin_char_p, builtin_coll_p,
    builtin_fn_p, builtin_integer_p, builtin_keyword_p, builtin_list_p, builtin_map_p,
    builtin_nil_p, builtin_number_p, builtin_seq_p, builtin_set_p, builtin_some_p,
    builtin_string_p, builtin_symbol_p, builtin_type, builtin_var_p, builtin_vector_p,
};
use vars::{builtin_gensym, builtin_meta, builtin_set_macro, builtin_with_meta};

/// Require an integer argument.
pub(crate) fn require_int(v: &ClovenVal) -> Result<i64> {
    match v {
        ClovenVal::Int(n) => Ok(*n),
        other => Err(Error::type_expected(
            other.type_name(),
            "is not an",
            "integer",
        )),
    }
}

/// Register every built-in into the registry's `cloven.core` namespace.
pub fn register_builtins(registry: &NamespaceRegistry) {
    let core = registry.core();

    // Arithmetic
    core.define_native("+", builtin_add);
    core.define_native("-", builtin_sub);
    core.define_native("*", builtin_mul);
    core.define_native("/", builtin_div);
    core.define_native("inc", builtin_inc);
    core.define_native("dec", builtin_dec);
    core.define_native("quot", builtin_quot);
    core.define_native("rem", builtin_rem);
    core.define_native("mod", builtin_mod);
    core.define_native("max", builtin_max);
    core.define_native("min", builtin_min);

    // Numeric predicates
    core.define_native("zero?", builtin_zero_p);
    core.define_native("pos?", builtin_pos_p);
    core.define_native("neg?", builtin_neg_p);
    core.define_native("even?", builtin_even_p);
    core.define_native("odd?", builtin_odd_p);

    // Comparison
    core.define_native("=", builtin_eq);
    core.define_native("not=", builtin_not_eq);
    core.define_native("not", builtin_not);
    core.define_native("<", builtin_lt);
    core.define_native(">", builtin_gt);
    core.define_native("<=", builtin_le);
    core.define_native(">=", builtin_ge);

    // Collections
    core.define_native("list", builtin_list);
    core.define_native("vector", builtin_vector);
    core.define_native("hash-map", builtin_hash_map);
    core.define_native("hash-set", builtin_hash_set);
    core.define_native("conj", builtin_conj);
    core.define_native("cons", builtin_cons);
    core.define_native("assoc", builtin_assoc);
    core.define_native("dissoc", builtin_dissoc);
    core.define_native("merge", builtin_merge);
    core.define_native("get", builtin_get);
    core.define_native("contains?", builtin_contains_p);
    core.define_native("count", builtin_count);
    core.define_native("empty", builtin_empty);
    core.define_native("empty?", builtin_empty_p);
    core.define_native("keys", builtin_keys);
    core.define_native("vals", builtin_vals);
    core.define_native("nth", builtin_nth);

    // Sequences
    core.define_native("first", builtin_first);
    core.define_native("rest", builtin_rest);
    core.define_native("next", builtin_next);
    core.define_native("seq", builtin_seq);
    core.define_native("concat", builtin_concat);
    core.define_native("into", builtin_into);
    core.define_native("reverse", builtin_reverse);
    core.define_native("butlast", builtin_butlast);
    core.define_native("take", builtin_take);
    core.define_native("drop", builtin_drop);
    core.define_native("range", builtin_range);
    core.define_native("repeat", builtin_repeat);
    core.define_native("iterate", builtin_iterate);

    // Higher-order
    core.define_native("apply", builtin_apply);
    core.define_native("map", builtin_map);
    core.define_native("filter", builtin_filter);
    core.define_native("remove", builtin_remove);
    core.define_native("reduce", builtin_reduce);
    core.define_native("identity", builtin_identity);
    core.define_native("constantly", builtin_constantly);
    core.define_native("comp", builtin_comp);
    core.define_native("partial", builtin_partial);

    // Strings and names
    core.define_native("str", builtin_str);
    core.define_native("subs", builtin_subs);
    core.define_native("name", builtin_name);
    core.define_native("namespace", builtin_namespace);
    core.define_native("keyword", builtin_keyword);
    core.define_native("symbol", builtin_symbol);

    // Printing
    core.define_native("pr", builtin_pr);
    core.define_native("prn", builtin_prn);
    core.define_native("pr-str", builtin_pr_str);
    core.define_native("print", builtin_print);
    core.define_native("println", builtin_println);
    core.define_native("newline", builtin_newline);

    // Atoms
    core.define_native("atom", builtin_atom);
    core.define_native("deref", builtin_deref);
    core.define_native("swap!", builtin_swap);
    core.define_native("reset!", builtin_reset);

    // Channels and tasks
    core.define_native("chan", builtin_chan);
    core.define_native("close!", builtin_close);
    core.define_native(">!", builtin_send);
    core.define_native("<!", builtin_recv);
    core.define_native("go*", builtin_go_star);

    // Vars, macros and metadata
    core.define_native("set-macro!", builtin_set_macro);
    core.define_native("gensym", builtin_gensym);
    core.define_native("with-meta", builtin_with_meta);
    core.define_native("meta", builtin_meta);

    // Type descriptors and predicates
    core.define_native("type", builtin_type);
    core.define_native("nil?", builtin_nil_p);
    core.define_native("some?", builtin_some_p);
    core.define_native("number?", builtin_number_p);
    core.define_native("integer?", builtin_integer_p);
    core.define_native("string?", builtin_string_p);
    core.define_native("keyword?", builtin_keyword_p);
    core.define_native("symbol?", builtin_symbol_p);
    core.define_native("char?", builtin_char_p);
    core.define_native("boolean?", builtin_boolean_p);
    core.define_native("list?", builtin_list_p);
    core.define_native("vector?", builtin_vector_p);
    core.define_native("map?", builtin_map_p);
    core.define_native("set?", builtin_set_p);
    core.define_native("fn?", builtin_fn_p);
    core.define_native("var?", builtin_var_p);
    core.define_native("atom?", builtin_atom_p);
    core.define_native("chan?", builtin_chan_p);
    core.define_native("coll?", builtin_coll_p);
    core.define_native("seq?", builtin_seq_p);

    // Regular expressions
    core.define_native("re-pattern", builtin_re_pattern);
    core.define_native("re-matches", builtin_re_matches);
    core.define_native("re-find", builtin_re_find);
    core.define_native("re-seq", builtin_re_seq);

    // Host interop
    core.define_native(".", builtin_dot);

    // Namespace manipulation closes over the registry handle
    namespaces::register(registry);
}

//! Global-set compilation tests
//!
//! `compile_all` allocates every global's slot before compiling anything,
//! so definitions may reference each other forwards, backwards, and in
//! cycles. A single failure anywhere rejects the whole batch.

use std::collections::HashMap;

use schist::ast::{Span, Term, TermKind};
use schist::compile::{compile_all, compile_single};
use schist::machine::{Expr, FreeExpr};
use schist::test_support::{abst, appl, church, global, identity, var};

fn batch(entries: &[(&str, Term<Span>)]) -> HashMap<String, Term<Span>> {
    entries
        .iter()
        .map(|(name, term)| (name.to_string(), term.clone()))
        .collect()
}

/// Walk to the slot captured by the first `Ref` under an abstraction body.
fn first_ref_slot(expr: &Expr<Span>) -> Option<schist::GlobalSlot<Span>> {
    fn walk(free: &FreeExpr<Span>) -> Option<schist::GlobalSlot<Span>> {
        match free {
            FreeExpr::Var { .. } => None,
            FreeExpr::Abst { body, .. } => walk(body),
            FreeExpr::Appl { left, right, .. } => walk(left).or_else(|| walk(right)),
            FreeExpr::Ref { slot, .. } => Some(slot.clone()),
        }
    }
    match expr {
        Expr::Abst { body, .. } => walk(body),
        _ => None,
    }
}

#[test]
fn empty_batch_yields_empty_map() {
    let compiled = compile_all::<Span>(&HashMap::new()).unwrap();
    assert!(compiled.is_empty());
}

#[test]
fn independent_globals_compile() {
    let compiled = compile_all(&batch(&[("id", identity()), ("two", church(2))])).unwrap();
    assert_eq!(compiled.len(), 2);
    assert!(matches!(compiled["id"], Expr::Abst { used: true, .. }));
}

#[test]
fn globals_may_reference_each_other() {
    let a = abst("x", appl(var("x"), global("B")));
    let b = abst("y", appl(var("y"), global("A")));

    let compiled = compile_all(&batch(&[("A", a), ("B", b)])).unwrap();
    assert_eq!(compiled.len(), 2);

    // both slot cells are populated by the time the batch returns
    for name in ["A", "B"] {
        let slot = first_ref_slot(&compiled[name]).expect("body should capture a slot");
        assert!(
            slot.get().is_some(),
            "{}'s reference should be resolvable after the batch",
            name
        );
    }
}

#[test]
fn self_reference_is_allowed() {
    let term = abst("x", appl(global("loop"), var("x")));
    let compiled = compile_all(&batch(&[("loop", term)])).unwrap();

    let slot = first_ref_slot(&compiled["loop"]).expect("body should capture a slot");
    assert!(slot.get().is_some());
}

#[test]
fn global_reference_ignores_local_scope() {
    // \x. helper  -- the global resolves even though x is in scope and
    // unused, making the binder dead
    let term = abst("x", global("helper"));
    let compiled = compile_all(&batch(&[("main", term), ("helper", identity())])).unwrap();
    assert!(matches!(compiled["main"], Expr::Abst { used: false, .. }));
}

#[test]
fn missing_global_fails_the_batch() {
    let err = compile_all(&batch(&[("main", global("nope"))])).unwrap_err();
    assert_eq!(err.name, "nope");
    assert!(matches!(&err.node.kind, TermKind::Global(name) if name == "nope"));
}

#[test]
fn one_bad_entry_rejects_every_entry() {
    let good = identity();
    let bad = abst("x", var("y"));

    let err = compile_all(&batch(&[("good", good), ("bad", bad)])).unwrap_err();
    assert_eq!(err.name, "y");
    assert!(matches!(&err.node.kind, TermKind::Var(name) if name == "y"));
}

#[test]
fn lone_global_fails_without_a_table() {
    let err = compile_single(&global("main")).unwrap_err();
    assert_eq!(err.name, "main");
    assert_eq!(err.to_string(), "'main' not defined");
}

#[test]
fn globals_compile_with_no_ambient_scope() {
    // a global's body may not lean on any outer binder
    let err = compile_all(&batch(&[("broken", var("x"))])).unwrap_err();
    assert_eq!(err.name, "x");
}

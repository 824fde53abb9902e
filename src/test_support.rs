//! Term-building helpers for the test suite
//!
//! There is no surface syntax in this crate (parsing belongs to a
//! collaborator), so tests assemble terms directly. Everything here uses
//! zero spans; tests that care about locations build their own.

use std::rc::Rc;

use crate::ast::{Span, Term};
use crate::machine::FreeExpr;

pub fn var(name: &str) -> Term<Span> {
    Term::var(name, Span::default())
}

pub fn abst(bound: &str, body: Term<Span>) -> Term<Span> {
    Term::abst(bound, body, Span::default())
}

pub fn appl(left: Term<Span>, right: Term<Span>) -> Term<Span> {
    Term::appl(left, right, Span::default())
}

pub fn global(name: &str) -> Term<Span> {
    Term::global(name, Span::default())
}

/// A closed literal to feed `Term::constant`: the identity function in
/// already-compiled form.
pub fn lit() -> FreeExpr<Span> {
    FreeExpr::Abst {
        used: true,
        body: Rc::new(FreeExpr::Var {
            meta: Span::default(),
        }),
        meta: Span::default(),
    }
}

/// `\x. x`
pub fn identity() -> Term<Span> {
    abst("x", var("x"))
}

/// Church numeral `\f. \x. f (f ... (f x))`
pub fn church(n: usize) -> Term<Span> {
    let mut body = var("x");
    for _ in 0..n {
        body = appl(var("f"), body);
    }
    abst("f", abst("x", body))
}

//! Bracket abstraction with free-variable slicing
//!
//! Compilation turns a named-variable [`Term`] into a positional
//! [`FreeExpr`] without going through fixed combinators. While walking the
//! term, the compiler threads an ordered list of in-scope binder names
//! (innermost first) and trims it at every application so that each subterm
//! receives only a prefix-trimmed environment it actually needs. By the
//! time a variable is reached, the list must start with exactly that name;
//! the emitted reference is always "position 0".
//!
//! The trim is conservative: each side of an application drops leading
//! names up to the first one it references, keeping everything after even
//! if individually unused. That layout is a contract with the execution
//! engine and is deliberately not minimized further.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::ast::{Ident, Term, TermKind};
use crate::machine::{Expr, FreeExpr, GlobalSlot};

/// Slot table threaded through one compilation: global name to the cell
/// that will hold its executable expression.
pub type Globals<M> = HashMap<Ident, GlobalSlot<M>>;

/// The compiler's only failure mode: a name with nothing to refer to.
///
/// Raised by `Var` when the trimmed environment does not start with the
/// name, and by `Global` when the name is missing from the slot table.
/// Carries a clone of the offending leaf node so callers can point at the
/// source.
#[derive(Debug, Clone, Error)]
#[error("'{name}' not defined")]
pub struct CompileError<M> {
    pub name: Ident,
    pub node: Term<M>,
}

impl<M: Clone> Term<M> {
    /// Compile against a slot table and an ordered list of in-scope binder
    /// names, innermost first.
    ///
    /// Callers normally want [`compile_single`] or [`compile_all`]; this is
    /// exposed for engines that maintain their own ambient scope.
    pub fn compile(
        &self,
        globals: &Globals<M>,
        free: &[Ident],
    ) -> Result<FreeExpr<M>, CompileError<M>> {
        match &self.kind {
            TermKind::Const(value) => Ok(value.clone()),

            TermKind::Var(name) => {
                if free.first() == Some(name) {
                    Ok(FreeExpr::Var {
                        meta: self.meta.clone(),
                    })
                } else {
                    Err(CompileError {
                        name: name.clone(),
                        node: self.clone(),
                    })
                }
            }

            TermKind::Abst { bound, body } => {
                // A binder nothing in the body refers to gets no runtime
                // slot: the body is compiled against the unextended
                // environment and the abstraction tagged accordingly.
                if !body.has_free(bound) {
                    let body = body.compile(globals, free)?;
                    return Ok(FreeExpr::Abst {
                        used: false,
                        body: Rc::new(body),
                        meta: self.meta.clone(),
                    });
                }

                let mut extended = Vec::with_capacity(free.len() + 1);
                extended.push(bound.clone());
                extended.extend_from_slice(free);

                let body = body.compile(globals, &extended)?;
                Ok(FreeExpr::Abst {
                    used: true,
                    body: Rc::new(body),
                    meta: self.meta.clone(),
                })
            }

            TermKind::Appl { left, right } => {
                // Each side drops the leading names it never references,
                // stopping at the first one it does. Anything in a dropped
                // prefix cannot be needed by a Var underneath, per has_free.
                let ldrop = free.iter().take_while(|name| !left.has_free(name)).count();
                let rdrop = free
                    .iter()
                    .take_while(|name| !right.has_free(name))
                    .count();

                let left = left.compile(globals, &free[ldrop..])?;
                let right = right.compile(globals, &free[rdrop..])?;

                Ok(FreeExpr::Appl {
                    ldrop,
                    rdrop,
                    left: Rc::new(left),
                    right: Rc::new(right),
                    meta: self.meta.clone(),
                })
            }

            TermKind::Global(name) => match globals.get(name) {
                // Capture the cell, not its contents; the value may not
                // exist yet while the batch is still compiling.
                Some(slot) => Ok(FreeExpr::Ref {
                    slot: slot.clone(),
                    meta: self.meta.clone(),
                }),
                None => Err(CompileError {
                    name: name.clone(),
                    node: self.clone(),
                }),
            },
        }
    }
}

/// Compile one term with no ambient globals and no local scope, then
/// instantiate it immediately.
///
/// Intended for closed terms; any free name fails loudly.
pub fn compile_single<M: Clone>(term: &Term<M>) -> Result<Expr<M>, CompileError<M>> {
    debug!("compiling single term");
    let free = term.compile(&Globals::new(), &[])?;
    Ok(free.instantiate(&[]))
}

/// Compile a set of named top-level terms that may reference one another,
/// including cyclically.
///
/// Every name's slot is allocated before any term is compiled, so a
/// `Global` compiled for entry `i` may capture entry `j`'s still-pending
/// cell; the loop fills every slot before the map is returned, hence before
/// anything can be executed. The first failure rejects the whole batch.
pub fn compile_all<M: Clone>(
    globals: &HashMap<Ident, Term<M>>,
) -> Result<HashMap<Ident, Expr<M>>, CompileError<M>> {
    // Iteration order is unspecified but must stay fixed for the batch.
    let names: Vec<&Ident> = globals.keys().collect();
    debug!("compiling batch of {} globals", names.len());

    let mut slots = Globals::with_capacity(names.len());
    for &name in &names {
        slots.insert(name.clone(), GlobalSlot::pending());
    }

    let mut compiled = HashMap::with_capacity(names.len());
    for &name in &names {
        debug!("compiling global '{}'", name);
        let free = globals[name].compile(&slots, &[])?;
        let expr = free.instantiate(&[]);
        slots[name].fill(expr.clone());
        compiled.insert(name.clone(), expr);
    }

    Ok(compiled)
}

//! Interface types for the graph-reduction execution engine
//!
//! The compiler produces [`FreeExpr`] values: expressions whose variable
//! references are positional offsets into an environment that does not exist
//! yet. [`FreeExpr::instantiate`] resolves one against a concrete
//! environment vector, yielding an executable [`Expr`] the engine can
//! reduce. Reduction itself lives in the engine, not in this crate.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// A concrete runtime environment: position 0 is the innermost binder.
pub type Env<M> = Vec<Expr<M>>;

/// An environment-relative expression, the compiler's output.
///
/// References are positional, never by name. The annotation `M` on every
/// node is the one carried by the source [`Term`](crate::ast::Term).
#[derive(Debug, Clone)]
pub enum FreeExpr<M> {
    /// Reference to environment position 0. The compiler only ever emits
    /// this with the environment trimmed so the referenced binding is in
    /// front.
    Var { meta: M },
    /// Abstraction. `used` records whether the binder's argument must be
    /// kept in the body's environment at all.
    Abst {
        used: bool,
        body: Rc<FreeExpr<M>>,
        meta: M,
    },
    /// Application. `ldrop`/`rdrop` are how many leading environment
    /// entries to discard before instantiating each side.
    Appl {
        ldrop: usize,
        rdrop: usize,
        left: Rc<FreeExpr<M>>,
        right: Rc<FreeExpr<M>>,
        meta: M,
    },
    /// Reference to a global's slot cell. The cell, not its contents, is
    /// captured; the value is read at execution time.
    Ref { slot: GlobalSlot<M>, meta: M },
}

impl<M> FreeExpr<M> {
    pub fn meta(&self) -> &M {
        match self {
            FreeExpr::Var { meta }
            | FreeExpr::Abst { meta, .. }
            | FreeExpr::Appl { meta, .. }
            | FreeExpr::Ref { meta, .. } => meta,
        }
    }
}

impl<M: Clone> FreeExpr<M> {
    /// Resolve against a concrete environment vector.
    ///
    /// `env` must have the layout the expression was compiled against
    /// (position 0 = innermost binder); the compiler upholds this for its
    /// own outputs. Panics if a hand-built expression asks for more
    /// environment than it is given.
    pub fn instantiate(&self, env: &[Expr<M>]) -> Expr<M> {
        match self {
            FreeExpr::Var { .. } => env[0].clone(),
            FreeExpr::Abst { used, body, meta } => Expr::Abst {
                used: *used,
                body: Rc::clone(body),
                env: env.to_vec(),
                meta: meta.clone(),
            },
            FreeExpr::Appl {
                ldrop,
                rdrop,
                left,
                right,
                meta,
            } => Expr::Appl {
                left: Rc::new(left.instantiate(&env[*ldrop..])),
                right: Rc::new(right.instantiate(&env[*rdrop..])),
                meta: meta.clone(),
            },
            FreeExpr::Ref { slot, meta } => Expr::Ref {
                slot: slot.clone(),
                meta: meta.clone(),
            },
        }
    }
}

/// An executable expression: what the engine reduces.
///
/// There is no variable variant; instantiation resolves variables to the
/// expression they were bound to.
#[derive(Debug, Clone)]
pub enum Expr<M> {
    /// A closure: compiled body plus its captured environment. The engine
    /// extends `env` with the argument on application, but only when
    /// `used` is set.
    Abst {
        used: bool,
        body: Rc<FreeExpr<M>>,
        env: Env<M>,
        meta: M,
    },
    Appl {
        left: Rc<Expr<M>>,
        right: Rc<Expr<M>>,
        meta: M,
    },
    /// Deferred global; dereference through the slot at reduction time.
    Ref { slot: GlobalSlot<M>, meta: M },
}

impl<M> Expr<M> {
    pub fn meta(&self) -> &M {
        match self {
            Expr::Abst { meta, .. } | Expr::Appl { meta, .. } | Expr::Ref { meta, .. } => meta,
        }
    }
}

/// A write-once cell for one global's executable expression.
///
/// Every slot of a batch is allocated before any of the batch's terms is
/// compiled, so forward and mutually recursive references capture a valid
/// cell. The batch loop writes each slot exactly once; by the time a caller
/// holds the batch's result, every slot is filled.
///
/// Mutually recursive globals keep each other's slots alive through `Rc`
/// cycles; such cells live until the process exits.
pub struct GlobalSlot<M> {
    cell: Rc<OnceCell<Expr<M>>>,
}

impl<M> GlobalSlot<M> {
    pub(crate) fn pending() -> Self {
        GlobalSlot {
            cell: Rc::new(OnceCell::new()),
        }
    }

    pub(crate) fn fill(&self, expr: Expr<M>) {
        if self.cell.set(expr).is_err() {
            unreachable!("global slot filled twice");
        }
    }

    /// The slot's expression; `None` only while its batch is still being
    /// compiled.
    pub fn get(&self) -> Option<&Expr<M>> {
        self.cell.get()
    }
}

impl<M> Clone for GlobalSlot<M> {
    fn clone(&self) -> Self {
        GlobalSlot {
            cell: Rc::clone(&self.cell),
        }
    }
}

// Slots of mutually recursive globals point at each other; following their
// contents here would never terminate.
impl<M> fmt::Debug for GlobalSlot<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.get().is_some() {
            "GlobalSlot(filled)"
        } else {
            "GlobalSlot(pending)"
        })
    }
}

//! Schist - a bracket-abstraction compiler for graph reduction
//!
//! Compiles lambda-calculus terms ([`Term`]) into environment-relative
//! intermediate expressions ([`FreeExpr`]) that a separate graph-reduction
//! engine instantiates and runs. The compiler slices the environment at
//! every application so each subterm is handed only the bindings it can
//! actually reach, and marks binders that need no runtime slot at all.

pub mod ast;
pub mod compile;
pub mod errors;
pub mod machine;
pub mod test_support;

pub use ast::{Ident, LocatedSpan, Position, SourceMap, Span, Term, TermKind};
pub use compile::{compile_all, compile_single, CompileError, Globals};
pub use errors::{render_compile_error, suggest, Colors, ErrorConfig};
pub use machine::{Env, Expr, FreeExpr, GlobalSlot};

//! Lambda-calculus abstract syntax
//!
//! Terms are generic over an annotation type `M` (typically [`Span`]) which
//! is threaded through compilation unchanged; the compiler never looks at it.

use std::rc::Rc;

use crate::machine::FreeExpr;

pub type Ident = String;

/// Source location for error reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Human-readable source position (1-indexed line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    /// 1-indexed column in characters, not bytes
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span resolved to start and end positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedSpan {
    pub start: Position,
    pub end: Position,
}

impl std::fmt::Display for LocatedSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Maps byte offsets to line:column positions.
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: String,
    /// Byte offset of the start of each line, 0-indexed
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source: source.to_string(),
            line_starts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Convert a byte offset to a 1-indexed line:column position
    pub fn position(&self, byte_offset: usize) -> Position {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= byte_offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line_idx];
        // counting chars rather than bytes keeps multi-byte input honest
        let column = self.source[line_start..byte_offset.min(self.source.len())]
            .chars()
            .count()
            + 1;
        Position {
            line: line_idx + 1,
            column,
        }
    }

    pub fn locate(&self, span: &Span) -> LocatedSpan {
        LocatedSpan {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }

    /// Text of a 1-indexed line, without the trailing newline
    pub fn line(&self, line_num: usize) -> Option<&str> {
        let start = *self.line_starts.get(line_num.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line_num)
            .map_or(self.source.len(), |&next| next - 1);
        self.source.get(start..end)
    }
}

// ============================================================================
// Terms
// ============================================================================

/// An annotated lambda term.
///
/// Immutable once constructed; compilation walks terms but never rewrites
/// them, so subterms can be shared freely via `Rc`.
#[derive(Debug, Clone)]
pub struct Term<M> {
    pub kind: TermKind<M>,
    pub meta: M,
}

#[derive(Debug, Clone)]
pub enum TermKind<M> {
    /// An already-compiled expression spliced into the tree. Escape hatch
    /// for literals and engine-provided primitives; depends on no variable.
    Const(FreeExpr<M>),
    /// Reference to a lexically bound local
    Var(Ident),
    /// Binder introducing `bound` into `body`'s scope
    Abst { bound: Ident, body: Rc<Term<M>> },
    /// Function application
    Appl { left: Rc<Term<M>>, right: Rc<Term<M>> },
    /// Reference resolved against the global table, not the local scope
    Global(Ident),
}

impl<M> Term<M> {
    pub fn new(kind: TermKind<M>, meta: M) -> Self {
        Term { kind, meta }
    }

    pub fn constant(value: FreeExpr<M>, meta: M) -> Self {
        Term::new(TermKind::Const(value), meta)
    }

    pub fn var(name: impl Into<Ident>, meta: M) -> Self {
        Term::new(TermKind::Var(name.into()), meta)
    }

    pub fn abst(bound: impl Into<Ident>, body: Term<M>, meta: M) -> Self {
        Term::new(
            TermKind::Abst {
                bound: bound.into(),
                body: Rc::new(body),
            },
            meta,
        )
    }

    pub fn appl(left: Term<M>, right: Term<M>, meta: M) -> Self {
        Term::new(
            TermKind::Appl {
                left: Rc::new(left),
                right: Rc::new(right),
            },
            meta,
        )
    }

    pub fn global(name: impl Into<Ident>, meta: M) -> Self {
        Term::new(TermKind::Global(name.into()), meta)
    }

    pub fn meta(&self) -> &M {
        &self.meta
    }

    /// Does this subtree contain an occurrence of `name` not re-bound
    /// within the subtree?
    ///
    /// The compiler's environment trimming is built on this query, so its
    /// answers must agree with the traversal in [`compile`](Term::compile).
    pub fn has_free(&self, name: &str) -> bool {
        match &self.kind {
            TermKind::Const(_) => false,
            TermKind::Var(var) => var == name,
            TermKind::Abst { bound, body } => bound != name && body.has_free(name),
            TermKind::Appl { left, right } => left.has_free(name) || right.has_free(name),
            TermKind::Global(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{abst, appl, global, lit, var};

    #[test]
    fn var_is_free_in_itself() {
        assert!(var("x").has_free("x"));
        assert!(!var("x").has_free("y"));
    }

    #[test]
    fn binder_shadows_its_name() {
        let term = abst("x", var("x"));
        assert!(!term.has_free("x"));
    }

    #[test]
    fn binder_passes_other_names_through() {
        let term = abst("x", var("y"));
        assert!(term.has_free("y"));
        assert!(!term.has_free("x"));
    }

    #[test]
    fn application_is_free_on_either_side() {
        let term = appl(var("f"), var("x"));
        assert!(term.has_free("f"));
        assert!(term.has_free("x"));
        assert!(!term.has_free("y"));
    }

    #[test]
    fn constants_and_globals_have_no_free_variables() {
        assert!(!Term::constant(lit(), Span::default()).has_free("x"));
        assert!(!global("x").has_free("x"));
    }

    #[test]
    fn source_map_positions() {
        let map = SourceMap::new("ab\ncd\n");
        assert_eq!(map.position(0), Position { line: 1, column: 1 });
        assert_eq!(map.position(1), Position { line: 1, column: 2 });
        assert_eq!(map.position(3), Position { line: 2, column: 1 });
        assert_eq!(map.line(1), Some("ab"));
        assert_eq!(map.line(2), Some("cd"));
        assert_eq!(map.line(4), None);
    }

    #[test]
    fn source_map_multibyte_columns() {
        let map = SourceMap::new("λx\nλy");
        // λ is two bytes but one column
        assert_eq!(map.position(2), Position { line: 1, column: 2 });
        assert_eq!(map.line(2), Some("λy"));
    }

    #[test]
    fn span_merge_covers_both() {
        let merged = Span::new(4, 7).merge(&Span::new(1, 5));
        assert_eq!(merged, Span::new(1, 7));
    }
}

//! Terminal rendering for compile errors
//!
//! Turns a [`CompileError`] over spanned terms into an Elm-style report:
//! header rule, `file:line:col` location, source snippet with a caret
//! underline, and "did you mean" suggestions for near-miss names.

use crate::ast::{SourceMap, Span};
use crate::compile::CompileError;

/// ANSI color codes, behind an explicit enable flag so callers can key off
/// TTY detection.
#[derive(Debug, Clone, Default)]
pub struct Colors {
    pub enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn red(&self) -> &'static str {
        if self.enabled { "\x1b[31m" } else { "" }
    }

    pub fn cyan(&self) -> &'static str {
        if self.enabled { "\x1b[36m" } else { "" }
    }

    pub fn bold(&self) -> &'static str {
        if self.enabled { "\x1b[1m" } else { "" }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled { "\x1b[0m" } else { "" }
    }
}

/// How to display errors: colors plus an optional file name for the
/// location line.
#[derive(Debug, Clone, Default)]
pub struct ErrorConfig {
    pub colors: Colors,
    pub filename: Option<String>,
}

impl ErrorConfig {
    pub fn new(use_color: bool) -> Self {
        Self {
            colors: Colors::new(use_color),
            filename: None,
        }
    }

    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }
}

/// Levenshtein edit distance, two-row formulation.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let subst = prev[j] + usize::from(ca != cb);
            curr[j + 1] = subst.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Up to three candidate names within edit distance 2 of `name`, closest
/// first, ties alphabetical. Never suggests `name` itself.
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    const MAX_DISTANCE: usize = 2;

    let mut scored: Vec<(usize, String)> = candidates
        .into_iter()
        .filter_map(|c| {
            let dist = edit_distance(name, c);
            (dist > 0 && dist <= MAX_DISTANCE).then(|| (dist, c.to_string()))
        })
        .collect();
    scored.sort();
    scored.into_iter().map(|(_, c)| c).take(3).collect()
}

fn header(colors: &Colors) -> String {
    const KIND: &str = "COMPILE ERROR";
    format!(
        "{}-- {} {}{}",
        colors.cyan(),
        KIND,
        "-".repeat(60 - KIND.len() - 4),
        colors.reset()
    )
}

fn location(config: &ErrorConfig, span: &Span, map: &SourceMap) -> String {
    let pos = map.position(span.start);
    format!(
        "{}{}:{}{}",
        config.colors.bold(),
        config.filename.as_deref().unwrap_or("<input>"),
        pos,
        config.colors.reset()
    )
}

fn snippet(map: &SourceMap, span: &Span, colors: &Colors) -> String {
    let loc = map.locate(span);
    let line_text = map.line(loc.start.line).unwrap_or("");
    let gutter = loc.start.line.to_string();

    let underline_len = if loc.start.line == loc.end.line {
        loc.end.column.saturating_sub(loc.start.column).max(1)
    } else {
        1
    };
    let padding = " ".repeat(gutter.len() + 3 + loc.start.column - 1);

    format!(
        "{}{} |{} {}\n{}{}{}{}",
        colors.cyan(),
        gutter,
        colors.reset(),
        line_text,
        padding,
        colors.red(),
        "^".repeat(underline_len),
        colors.reset()
    )
}

/// Render a full report for an unresolved reference.
///
/// `candidates` are the names that were in scope for the failed lookup
/// (e.g. the global table's keys); near misses among them become a "did
/// you mean" hint.
pub fn render_compile_error<'a>(
    err: &CompileError<Span>,
    map: &SourceMap,
    config: &ErrorConfig,
    candidates: impl IntoIterator<Item = &'a str>,
) -> String {
    let colors = &config.colors;
    let span = err.node.meta();

    let mut out = String::new();
    out.push_str(&header(colors));
    out.push('\n');
    out.push_str(&location(config, span, map));
    out.push_str("\n\n");
    out.push_str(&snippet(map, span, colors));
    out.push('\n');
    out.push_str(&err.to_string());
    out.push('\n');

    let similar = suggest(&err.name, candidates);
    match similar.as_slice() {
        [] => {}
        [only] => {
            out.push_str(&format!(
                "\nDid you mean {}{}{}?\n",
                colors.bold(),
                only,
                colors.reset()
            ));
        }
        many => {
            let list: Vec<String> = many
                .iter()
                .map(|s| format!("{}{}{}", colors.bold(), s, colors.reset()))
                .collect();
            out.push_str(&format!("\nDid you mean one of: {}?\n", list.join(", ")));
        }
    }
    out
}

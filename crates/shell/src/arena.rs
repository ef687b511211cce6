// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interned line and span storage for the shell front-end.
//!
//! Every token the lexer emits points into the arena via a [`SpanId`]; error
//! messages, alias provenance, and here-doc bodies all resolve source
//! locations through it. The arena is append-only and lives for a whole
//! parse session.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Index of an interned source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub u32);

/// Index of an interned span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(pub u32);

impl SpanId {
    /// Sentinel carried by lexer-synthesized EOL/EOF tokens, which have no
    /// source position of their own.
    pub const SENTINEL: SpanId = SpanId(u32::MAX);

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

/// A byte range within one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line_id: LineId,
    /// Start column (byte offset into the line).
    pub col: u32,
    /// Length in bytes.
    pub length: u32,
}

/// Logical origin of a run of lines, for diagnostic attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Interactive,
    Stdin,
    File(String),
    /// Lines produced by expanding an alias; the span points at the word
    /// that triggered the expansion.
    Alias { name: String, argv0_span: SpanId },
    /// Re-lexed `a[i]=` L-value index text.
    LValue { left_span: SpanId, right_span: SpanId },
    HereDoc { start_span: SpanId },
    Backticks { start_span: SpanId },
    Other(&'static str),
}

impl SourceKind {
    fn describe(&self) -> String {
        match self {
            SourceKind::Interactive => "[ interactive ]".to_string(),
            SourceKind::Stdin => "[ stdin ]".to_string(),
            SourceKind::File(path) => path.clone(),
            SourceKind::Alias { name, .. } => format!("[ expansion of alias '{}' ]", name),
            SourceKind::LValue { .. } => "[ array LHS ]".to_string(),
            SourceKind::HereDoc { .. } => "[ here doc ]".to_string(),
            SourceKind::Backticks { .. } => "[ backticks ]".to_string(),
            SourceKind::Other(what) => format!("[ {} ]", what),
        }
    }
}

struct LineEntry {
    text: Rc<str>,
    /// 1-based line number within its source frame.
    line_num: u32,
    /// Index into `frames` for the source active when the line was added.
    frame: usize,
}

/// Resolved location of a span, for error formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source: String,
    pub line_num: u32,
    pub col: u32,
    pub length: u32,
    pub line: Rc<str>,
}

/// Append-only store of lines and spans plus a stack of source frames.
///
/// The lexer and command parser both append; nothing is ever removed. See
/// [`Arena::push_source`] for how nested origins (alias bodies, here-doc
/// bodies, L-value re-lexing) are attributed.
pub struct Arena {
    lines: Vec<LineEntry>,
    spans: Vec<Span>,
    frames: Vec<SourceKind>,
    active: Vec<usize>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            frames: vec![SourceKind::Other("main")],
            active: vec![0],
        }
    }

    /// Attribute subsequently added lines to a nested origin.
    pub fn push_source(&mut self, kind: SourceKind) {
        self.frames.push(kind);
        self.active.push(self.frames.len() - 1);
    }

    pub fn pop_source(&mut self) {
        if self.active.len() > 1 {
            self.active.pop();
        }
    }

    fn current_frame(&self) -> usize {
        *self.active.last().unwrap_or(&0)
    }

    pub fn add_line(&mut self, text: &str, line_num: u32) -> LineId {
        let id = LineId(self.lines.len() as u32);
        self.lines.push(LineEntry {
            text: Rc::from(text),
            line_num,
            frame: self.current_frame(),
        });
        id
    }

    pub fn add_span(&mut self, line_id: LineId, col: usize, length: usize) -> SpanId {
        let id = SpanId(self.spans.len() as u32);
        self.spans.push(Span {
            line_id,
            col: col as u32,
            length: length as u32,
        });
        id
    }

    /// Number of lines added so far.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, id: LineId) -> Rc<str> {
        self.lines
            .get(id.0 as usize)
            .map(|e| Rc::clone(&e.text))
            .unwrap_or_else(|| Rc::from(""))
    }

    pub fn line_num(&self, id: LineId) -> u32 {
        self.lines.get(id.0 as usize).map(|e| e.line_num).unwrap_or(0)
    }

    pub fn span(&self, id: SpanId) -> Span {
        self.spans.get(id.0 as usize).copied().unwrap_or(Span {
            line_id: LineId(0),
            col: 0,
            length: 0,
        })
    }

    /// Source text covered by a span.
    pub fn snippet(&self, id: SpanId) -> String {
        if id.is_sentinel() {
            return String::new();
        }
        let span = self.span(id);
        let line = self.line(span.line_id);
        let start = span.col as usize;
        let end = start + span.length as usize;
        line.get(start..end).unwrap_or("").to_string()
    }

    /// Slice of a line between two columns, used to recover source bytes for
    /// alias re-parsing and `a[i]=` index extraction.
    pub fn line_slice(&self, line_id: LineId, start_col: usize, end_col: usize) -> String {
        let line = self.line(line_id);
        line.get(start_col..end_col).unwrap_or("").to_string()
    }

    /// Resolve a span to a user-facing location.
    pub fn lookup(&self, id: SpanId) -> Option<Location> {
        if id.is_sentinel() {
            return None;
        }
        let span = self.spans.get(id.0 as usize)?;
        let entry = self.lines.get(span.line_id.0 as usize)?;
        let source = self
            .frames
            .get(entry.frame)
            .map(|f| f.describe())
            .unwrap_or_default();
        Some(Location {
            source,
            line_num: entry.line_num,
            col: span.col,
            length: span.length,
            line: Rc::clone(&entry.text),
        })
    }

    /// Render a rustc-style caret diagnostic for a span.
    ///
    /// ```text
    /// error: unexpected token ')'
    ///   --> [ stdin ]:3:5
    ///    |
    ///  3 | echo )
    ///    |      ^
    /// ```
    pub fn diagnostic(&self, id: SpanId, message: &str) -> String {
        let Some(loc) = self.lookup(id) else {
            return format!("error: {} (at end of input)", message);
        };
        let caret_len = (loc.length as usize).max(1);
        format!(
            "error: {}\n  --> {}:{}:{}\n   |\n{:>3} | {}\n   | {}{}",
            message,
            loc.source,
            loc.line_num,
            loc.col + 1,
            loc.line_num,
            loc.line.trim_end_matches('\n'),
            " ".repeat(loc.col as usize),
            "^".repeat(caret_len)
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "arena_tests.rs"]
mod tests;

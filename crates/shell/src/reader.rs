// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line readers feeding the lexer.
//!
//! A reader yields `(line_id, text, start_offset)` triples and registers each
//! line with the arena as it is pulled. The virtual reader replays lines that
//! are already interned, which is how here-doc bodies and alias buffers are
//! re-parsed after the fact.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::arena::{Arena, LineId};

/// One line of input: interned id, text (with trailing newline when the
/// source had one), and the byte offset lexing should start at.
pub type SourceLine = (LineId, Rc<str>, usize);

pub trait LineReader {
    /// Pull the next line, or `None` at end of input.
    fn get_line(&mut self) -> Option<SourceLine>;

    /// Rewind to the beginning, where supported. Used by the interactive
    /// loop; string and file readers treat this as a no-op.
    fn reset(&mut self) {}
}

/// Reads lines out of an in-memory string, interning them on demand.
pub struct StringLineReader {
    arena: Rc<RefCell<Arena>>,
    lines: Vec<String>,
    pos: usize,
}

impl StringLineReader {
    pub fn new(source: &str, arena: Rc<RefCell<Arena>>) -> Self {
        Self {
            arena,
            lines: split_keeping_newlines(source),
            pos: 0,
        }
    }
}

impl LineReader for StringLineReader {
    fn get_line(&mut self) -> Option<SourceLine> {
        let text = self.lines.get(self.pos)?;
        let line_num = (self.pos + 1) as u32;
        let line_id = self.arena.borrow_mut().add_line(text, line_num);
        self.pos += 1;
        Some((line_id, Rc::from(text.as_str()), 0))
    }
}

/// Reads a whole file up front, then behaves like [`StringLineReader`].
pub struct FileLineReader {
    inner: StringLineReader,
}

impl FileLineReader {
    pub fn open(path: &std::path::Path, arena: Rc<RefCell<Arena>>) -> io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self {
            inner: StringLineReader::new(&contents, arena),
        })
    }
}

impl LineReader for FileLineReader {
    fn get_line(&mut self) -> Option<SourceLine> {
        self.inner.get_line()
    }
}

/// Replays a pre-collected list of already-interned lines.
///
/// Here-doc bodies are collected as raw lines on the newline that terminates
/// their opening command line, then handed to a fresh word parser through one
/// of these. Alias expansion does the same with its rewritten buffer.
pub struct VirtualLineReader {
    lines: Vec<SourceLine>,
    pos: usize,
}

impl VirtualLineReader {
    pub fn new(lines: Vec<SourceLine>) -> Self {
        Self { lines, pos: 0 }
    }
}

impl LineReader for VirtualLineReader {
    fn get_line(&mut self) -> Option<SourceLine> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some((line.0, Rc::clone(&line.1), line.2))
    }

    fn reset(&mut self) {
        self.pos = 0;
    }
}

/// Split source text into lines, each keeping its trailing `\n`.
///
/// Unlike `str::lines`, a final line without a newline is preserved as-is so
/// the lexer sees exactly the source bytes.
fn split_keeping_newlines(source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = source;
    while !rest.is_empty() {
        match rest.find('\n') {
            Some(i) => {
                out.push(rest[..=i].to_string());
                rest = &rest[i + 1..];
            }
            None => {
                out.push(rest.to_string());
                break;
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;

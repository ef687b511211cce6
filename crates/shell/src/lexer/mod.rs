// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context-sensitive shell lexer.
//!
//! The lexer is split in two layers. [`LineLexer`] advances within a single
//! line using the per-mode match tables and allocates spans in the arena.
//! [`Lexer`] orchestrates it with a [`LineReader`]: it refills on end of
//! line, synthesizes EOF tokens, applies translation hints, and silently
//! drops line continuations.

mod def;
mod matcher;
mod trans;

pub use trans::{mode_transition, ModeTransition};

use std::cell::RefCell;
use std::rc::Rc;

use crate::arena::{Arena, LineId, SpanId};
use crate::reader::LineReader;
use crate::token::{Id, Token};

/// Tag selecting which match table the lexer consults.
///
/// The discriminant order must match [`LexMode::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexMode {
    ShCommand,
    Comment,
    Dq,
    Sq,
    DollarSq,
    Arith,
    VSub1,
    VSub2,
    VSubArgUnquoted,
    VSubArgDq,
    ExtGlob,
    BashRegex,
    Backtick,
    PrintfPercent,
    PrintfBackslash,
}

impl LexMode {
    pub const ALL: [LexMode; 15] = [
        LexMode::ShCommand,
        LexMode::Comment,
        LexMode::Dq,
        LexMode::Sq,
        LexMode::DollarSq,
        LexMode::Arith,
        LexMode::VSub1,
        LexMode::VSub2,
        LexMode::VSubArgUnquoted,
        LexMode::VSubArgDq,
        LexMode::ExtGlob,
        LexMode::BashRegex,
        LexMode::Backtick,
        LexMode::PrintfPercent,
        LexMode::PrintfBackslash,
    ];
}

/// Advances within one line, allocating a span per emitted token.
pub struct LineLexer {
    arena: Rc<RefCell<Arena>>,
    line: Rc<str>,
    line_id: Option<LineId>,
    line_pos: usize,
    /// Set by [`LineLexer::maybe_unread_one`]; the next read reuses
    /// `last_span_id` instead of allocating a fresh span.
    arena_skip: bool,
    last_span_id: SpanId,
}

impl LineLexer {
    pub fn new(arena: Rc<RefCell<Arena>>) -> Self {
        Self {
            arena,
            line: Rc::from(""),
            line_id: None,
            line_pos: 0,
            arena_skip: false,
            last_span_id: SpanId::SENTINEL,
        }
    }

    pub fn reset(&mut self, line: Rc<str>, line_id: Option<LineId>, line_pos: usize) {
        self.line = line;
        self.line_id = line_id;
        self.line_pos = line_pos;
    }

    /// Back up by exactly one byte, so the command parser's one-character
    /// lookahead can hand a token back. Only valid when the last token was
    /// a single character.
    pub fn maybe_unread_one(&mut self) -> bool {
        if self.line_pos == 0 {
            false
        } else {
            self.line_pos -= 1;
            self.arena_skip = true;
            true
        }
    }

    /// Span id for EOF diagnostics. With zero lines read, a dummy empty
    /// line is added so the span has a source to display.
    pub fn span_id_for_eof(&mut self) -> SpanId {
        let mut arena = self.arena.borrow_mut();
        let line_id = match self.line_id {
            Some(id) => id,
            None => arena.add_line("", 0),
        };
        arena.add_span(line_id, self.line_pos, 0)
    }

    /// Look ahead for the next non-space token in the given mode, without
    /// advancing. Lookahead never crosses a line boundary: at end of line it
    /// returns `UnknownTok`, which is what disambiguates `foo()` from a
    /// word at the end of a line.
    pub fn look_ahead(&self, mode: LexMode) -> Token {
        let mut pos = self.line_pos;
        let n = self.line.len();
        loop {
            if pos == n {
                return Token::sentinel(Id::UnknownTok);
            }
            let (id, end_pos) = matcher::one_token(mode, &self.line, pos);
            if id != Id::WsSpace {
                let val = self.line.get(pos..end_pos).unwrap_or("").to_string();
                return Token::new(id, val, SpanId::SENTINEL);
            }
            pos = end_pos;
        }
    }

    pub fn read(&mut self, mode: LexMode) -> Token {
        let (id, end_pos) = matcher::one_token(mode, &self.line, self.line_pos);
        if id == Id::EolTok {
            // No span for this sentinel.
            return Token::sentinel(id);
        }

        let val = self
            .line
            .get(self.line_pos..end_pos)
            .unwrap_or("")
            .to_string();

        let span_id = if self.arena_skip {
            self.arena_skip = false;
            self.last_span_id
        } else {
            let line_id = self.line_id.unwrap_or(LineId(0));
            let span_id =
                self.arena
                    .borrow_mut()
                    .add_span(line_id, self.line_pos, val.len());
            self.last_span_id = span_id;
            span_id
        };

        self.line_pos = end_pos;
        Token::new(id, val, span_id)
    }
}

/// Pulls lines from the reader, tokenizes them with the line lexer, and
/// streams tokens to the word parser.
pub struct Lexer {
    line_lexer: LineLexer,
    line_reader: Rc<RefCell<dyn LineReader>>,
    /// Deferred id rewrites: when the next token matches the top entry's
    /// old id, it is rewritten and the entry popped. This turns `)` into
    /// `Right_Subshell`/`Right_CasePat`/`Right_FuncDef` and the closing
    /// backtick into its EOF id.
    translation_stack: Vec<(Id, Id)>,
    emit_comp_dummy: bool,
}

impl Lexer {
    pub fn new(arena: Rc<RefCell<Arena>>, line_reader: Rc<RefCell<dyn LineReader>>) -> Self {
        Self {
            line_lexer: LineLexer::new(arena),
            line_reader,
            translation_stack: Vec::new(),
            emit_comp_dummy: false,
        }
    }

    pub fn reset_input_objects(&mut self) {
        self.line_lexer.reset(Rc::from(""), None, 0);
    }

    /// The line reader this lexer pulls from, shared with the command
    /// parser for here-doc body collection.
    pub fn reader(&self) -> Rc<RefCell<dyn LineReader>> {
        Rc::clone(&self.line_reader)
    }

    pub fn maybe_unread_one(&mut self) -> bool {
        self.line_lexer.maybe_unread_one()
    }

    /// Look ahead in the current line for the next non-space token.
    ///
    /// Lookahead is limited to the current line; `foo\` + newline + `()` is
    /// not recognized as a function, which matches the reference shells'
    /// observable behavior closely enough in practice.
    pub fn look_ahead(&self, mode: LexMode) -> Token {
        self.line_lexer.look_ahead(mode)
    }

    /// Emit `Lit_CompDummy` right before EOF, exactly once, for completion.
    pub fn emit_comp_dummy(&mut self) {
        self.emit_comp_dummy = true;
    }

    pub fn push_hint(&mut self, old_id: Id, new_id: Id) {
        self.translation_stack.push((old_id, new_id));
    }

    fn read_raw(&mut self, mode: LexMode) -> Token {
        let mut t = self.line_lexer.read(mode);
        if t.id == Id::EolTok {
            let next_line = self.line_reader.borrow_mut().get_line();
            match next_line {
                Some((line_id, line, line_pos)) => {
                    self.line_lexer.reset(line, Some(line_id), line_pos);
                    t = self.line_lexer.read(mode);
                }
                None => {
                    let span_id = self.line_lexer.span_id_for_eof();
                    let id = if self.emit_comp_dummy {
                        self.emit_comp_dummy = false;
                        Id::LitCompDummy
                    } else {
                        Id::EofReal
                    };
                    return Token::new(id, "", span_id);
                }
            }
        }

        if let Some(&(old_id, new_id)) = self.translation_stack.last() {
            if t.id == old_id {
                self.translation_stack.pop();
                t.id = new_id;
            }
        }

        t
    }

    /// Read the next token, silently skipping line continuations. All other
    /// ignored tokens pass through so the word parser can attach them.
    pub fn read(&mut self, mode: LexMode) -> Token {
        loop {
            let t = self.read_raw(mode);
            if t.id != Id::IgnoredLineCont {
                return t;
            }
        }
    }
}

#[cfg(test)]
#[path = "../lexer_tests/mod.rs"]
mod tests;

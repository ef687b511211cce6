// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared parse-session state and parser factories.
//!
//! One [`ParseContext`] wires the lexer, word parser, and command parser
//! together. It owns the arena, the alias map (read-only during parse), the
//! parse options, and the trail used by completion.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::ast::{ArithExpr, Redirect, Word};
use crate::cmd_parse::CommandParser;
use crate::lexer::{LexMode, Lexer};
use crate::reader::{LineReader, SourceLine, StringLineReader, VirtualLineReader};
use crate::token::{Id, Token};
use crate::word_parse::WordParser;

/// Parse-time options supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Keep `a[i]=` indexes as source text instead of re-lexing them.
    pub one_pass_parse: bool,
}

/// `(alias name, word position)` pairs currently being expanded, shared by
/// every parser in one expansion chain to break cycles.
pub type AliasesInFlight = Rc<RefCell<Vec<(String, usize)>>>;

/// Completion support: remembers the most recent simple command's words so
/// the completion engine can inspect them after a failed parse.
#[derive(Debug, Default)]
pub struct Trail {
    expanding_alias: bool,
    pub words: Vec<Word>,
    pub redirects: Vec<Redirect>,
}

impl Trail {
    /// While an alias expansion re-parses its buffer, the trail must keep
    /// the user-typed words, not the expansion's.
    pub fn begin_alias_expansion(&mut self) {
        self.expanding_alias = true;
    }

    pub fn end_alias_expansion(&mut self) {
        self.expanding_alias = false;
    }

    pub fn set_latest_words(&mut self, words: Vec<Word>, redirects: Vec<Redirect>) {
        if self.expanding_alias {
            return;
        }
        self.words = words;
        self.redirects = redirects;
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.redirects.clear();
    }
}

pub struct ParseContext {
    pub arena: Rc<RefCell<Arena>>,
    /// Aliases to expand at parse time; read-only during a parse.
    pub aliases: HashMap<String, String>,
    pub options: ParseOptions,
    pub trail: RefCell<Trail>,
}

impl ParseContext {
    pub fn new(
        arena: Rc<RefCell<Arena>>,
        aliases: HashMap<String, String>,
        options: ParseOptions,
    ) -> Rc<Self> {
        Rc::new(Self {
            arena,
            aliases,
            options,
            trail: RefCell::new(Trail::default()),
        })
    }

    /// Top-level parser over a line reader.
    pub fn make_parser(self: &Rc<Self>, reader: Rc<RefCell<dyn LineReader>>) -> CommandParser {
        self.make_parser_full(reader, Id::EofReal, false, None)
    }

    /// Parser for an alias expansion buffer: shares the in-flight set and
    /// emits the completion dummy like the interactive path does.
    pub fn make_parser_for_alias(
        self: &Rc<Self>,
        reader: Rc<RefCell<dyn LineReader>>,
        aliases_in_flight: AliasesInFlight,
    ) -> CommandParser {
        self.make_parser_full(reader, Id::EofReal, true, Some(aliases_in_flight))
    }

    fn make_parser_full(
        self: &Rc<Self>,
        reader: Rc<RefCell<dyn LineReader>>,
        eof_id: Id,
        emit_comp_dummy: bool,
        aliases_in_flight: Option<AliasesInFlight>,
    ) -> CommandParser {
        let lexer = Rc::new(RefCell::new(Lexer::new(
            Rc::clone(&self.arena),
            Rc::clone(&reader),
        )));
        if emit_comp_dummy {
            lexer.borrow_mut().emit_comp_dummy();
        }
        let w_parser = WordParser::new(Rc::clone(self), Rc::clone(&lexer));
        CommandParser::new(
            Rc::clone(self),
            w_parser,
            lexer,
            reader,
            eof_id,
            aliases_in_flight,
        )
    }

    /// Parser for `$( ... )` and backticks: shares the lexer (and therefore
    /// the line position) with the enclosing word parser.
    pub fn make_parser_for_command_sub(
        self: &Rc<Self>,
        lexer: Rc<RefCell<Lexer>>,
        eof_id: Id,
    ) -> CommandParser {
        let reader = lexer.borrow().reader();
        let w_parser = WordParser::new(Rc::clone(self), Rc::clone(&lexer));
        CommandParser::new(Rc::clone(self), w_parser, lexer, reader, eof_id, None)
    }

    /// Word parser over collected here-doc body lines.
    pub fn make_word_parser_for_here_doc(self: &Rc<Self>, lines: Vec<SourceLine>) -> WordParser {
        let reader: Rc<RefCell<dyn LineReader>> =
            Rc::new(RefCell::new(VirtualLineReader::new(lines)));
        let lexer = Rc::new(RefCell::new(Lexer::new(Rc::clone(&self.arena), reader)));
        WordParser::new(Rc::clone(self), lexer)
    }

    /// Word parser over an arbitrary code string, for the completion and
    /// expression plugins.
    pub fn make_word_parser_for_plugin(self: &Rc<Self>, code: &str) -> WordParser {
        let reader: Rc<RefCell<dyn LineReader>> = Rc::new(RefCell::new(StringLineReader::new(
            code,
            Rc::clone(&self.arena),
        )));
        let lexer = Rc::new(RefCell::new(Lexer::new(Rc::clone(&self.arena), reader)));
        WordParser::new(Rc::clone(self), lexer)
    }

    /// Re-lex an `a[i]=` index string in arithmetic mode. The caller pushes
    /// the `LValue` source frame for attribution.
    pub fn make_arith_expr(self: &Rc<Self>, code: &str) -> ArithExpr {
        let reader: Rc<RefCell<dyn LineReader>> = Rc::new(RefCell::new(StringLineReader::new(
            code,
            Rc::clone(&self.arena),
        )));
        let mut lexer = Lexer::new(Rc::clone(&self.arena), reader);
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            let t = lexer.read(LexMode::Arith);
            match t.id {
                Id::EofReal => break,
                Id::IgnoredSpace => {}
                _ => tokens.push(t),
            }
        }
        ArithExpr { tokens }
    }
}

#[cfg(test)]
#[path = "parse_ctx_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! A POSIX/bash-compatible shell front-end: lexer, parser, and word
//! evaluator.
//!
//! The pipeline takes raw shell source and produces a typed command AST,
//! and at execution time turns the AST's words into argv strings.
//!
//! # Quick start
//!
//! ```ignore
//! use sash_shell::parse;
//!
//! let (ast, arena) = parse("for x in a b c; do echo $x; done")?;
//! # Ok::<(), sash_shell::ParseError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! source text
//!   └── LineReader  — (line_id, text, offset) triples
//!       └── Lexer   — multi-mode, longest-match tables, hint stack
//!           └── WordParser     — words, here-doc bodies, arith regions
//!               └── CommandParser — recursive descent, alias expansion
//!                   └── Command AST
//! ```
//!
//! At execution, `WordEvaluator` expands AST words into an `ArgVector`
//! with spans parallel to the strings, applying substitution, splitting,
//! and globbing.
//!
//! Everything is synchronous and single-threaded; state shared between
//! the layers (the arena, the line reader) lives behind `Rc<RefCell<_>>`
//! for one parse session.

mod arena;
mod ast;
mod braces;
mod cmd_parse;
mod glob_pat;
mod lexer;
mod parse_ctx;
mod parse_error;
mod reader;
mod runtime_error;
mod splitter;
mod string_ops;
mod token;
mod value;
mod word;
mod word_eval;
mod word_parse;

pub use arena::{Arena, LineId, Location, SourceKind, Span, SpanId};
pub use ast::{
    AndOr, ArithExpr, AssignOp, AssignPair, Assignment, BracketOp, CaseArm, Command,
    CompoundWord, EnvPair, HereDocNode, IfArm, LhsExpr, PatSub, Pipeline, Redirect,
    SimpleCommand, SuffixOp, Word, WordPart,
};
pub use cmd_parse::{CommandParser, InteractiveLine};
pub use glob_pat::{glob_escape, glob_to_ere, glob_unescape, GlobMatcher, GlobReplacer, Globber};
pub use lexer::{mode_transition, LexMode, Lexer, LineLexer, ModeTransition};
pub use parse_ctx::{AliasesInFlight, ParseContext, ParseOptions, Trail};
pub use parse_error::{ParseError, ParseResult};
pub use reader::{FileLineReader, LineReader, SourceLine, StringLineReader, VirtualLineReader};
pub use runtime_error::{RuntimeError, RuntimeErrorKind, RuntimeResult};
pub use splitter::{IfsSplitter, DEFAULT_IFS};
pub use token::{keyword_id, Id, Kind, Token};
pub use value::{
    ArgVector, ArithEvaluator, CommandSubExecutor, ConstArithEvaluator, ExecOptions,
    NullCommandSubExecutor, PartValue, PlainPromptEvaluator, PromptEvaluator, ShellMemory,
    Value, VarMemory,
};
pub use word::{
    command_id, command_kind, detect_assignment, keyword_token, left_most_span_for_word,
    right_most_span_for_word, static_eval, tilde_detect, tilde_detect_all,
};
pub use word_eval::WordEvaluator;
pub use word_parse::WordParser;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Parse a whole program from a string, with no aliases defined.
pub fn parse(source: &str) -> ParseResult<(Command, Rc<RefCell<Arena>>)> {
    parse_with_aliases(source, HashMap::new())
}

/// Parse a whole program with parse-time alias definitions.
pub fn parse_with_aliases(
    source: &str,
    aliases: HashMap<String, String>,
) -> ParseResult<(Command, Rc<RefCell<Arena>>)> {
    let arena = Rc::new(RefCell::new(Arena::new()));
    let ctx = ParseContext::new(Rc::clone(&arena), aliases, ParseOptions::default());
    let reader: Rc<RefCell<dyn LineReader>> = Rc::new(RefCell::new(StringLineReader::new(
        source,
        Rc::clone(&arena),
    )));
    let mut parser = ctx.make_parser(reader);
    let node = parser.parse_program()?;
    Ok((node, arena))
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command parser: recursive descent over the POSIX grammar plus bash
//! extensions, with one word of lookahead.
//!
//! The cursor `(cur_word, c_kind, c_id)` is refreshed lazily: `advance`
//! marks it stale and `peek` pulls the next word from the word parser.
//! Every newline observed at command level drains the pending here-doc
//! list, which is what makes `cat <<A; cat <<B` read A's body before B's.

use std::cell::RefCell;
use std::rc::Rc;

use crate::arena::{SourceKind, SpanId};
use crate::ast::{
    AndOr, AssignOp, AssignPair, Assignment, CaseArm, Command, CompoundWord, EnvPair,
    HereDocNode, IfArm, LhsExpr, Pipeline, Redirect, SimpleCommand, Word, WordPart,
};
use crate::braces;
use crate::lexer::{LexMode, Lexer};
use crate::parse_ctx::{AliasesInFlight, ParseContext};
use crate::parse_error::{ParseError, ParseResult};
use crate::reader::{LineReader, SourceLine, StringLineReader};
use crate::token::{is_valid_var_name, Id, Kind, Token};
use crate::word;
use crate::word_parse::WordParser;

/// Keywords that terminate blocks and therefore never begin a command.
const NOT_FIRST_WORDS: [Id; 7] = [
    Id::KwDo,
    Id::KwDone,
    Id::KwThen,
    Id::KwFi,
    Id::KwElif,
    Id::KwElse,
    Id::KwEsac,
];

/// `(keyword, flag)` pairs that make an assignment keyword behave like a
/// plain command, e.g. `declare -p` lists variables.
const ASSIGN_COMMANDS: [(Id, &str); 8] = [
    (Id::AssignDeclare, "-f"),
    (Id::AssignDeclare, "-F"),
    (Id::AssignDeclare, "-p"),
    (Id::AssignTypeset, "-f"),
    (Id::AssignTypeset, "-F"),
    (Id::AssignTypeset, "-p"),
    (Id::AssignLocal, "-p"),
    (Id::AssignReadonly, "-p"),
];

/// Result of one interactive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveLine {
    Empty,
    Eof,
    Node(Command),
}

/// `(left_token, close_token, part_offset, word)` from assignment
/// detection, kept together for the second classification pass.
type PreParsed = (Token, Option<Token>, usize, CompoundWord);

pub struct CommandParser {
    ctx: Rc<ParseContext>,
    w_parser: WordParser,
    lexer: Rc<RefCell<Lexer>>,
    line_reader: Rc<RefCell<dyn LineReader>>,
    /// `EofReal` at top level, `EofRParen` inside `$( )`.
    eof_id: Id,
    aliases_in_flight: Option<AliasesInFlight>,

    stale: bool,
    cur_word: Word,
    c_kind: Kind,
    c_id: Id,
    pending_here_docs: Vec<Rc<RefCell<HereDocNode>>>,
}

impl CommandParser {
    pub fn new(
        ctx: Rc<ParseContext>,
        w_parser: WordParser,
        lexer: Rc<RefCell<Lexer>>,
        line_reader: Rc<RefCell<dyn LineReader>>,
        eof_id: Id,
        aliases_in_flight: Option<AliasesInFlight>,
    ) -> Self {
        Self {
            ctx,
            w_parser,
            lexer,
            line_reader,
            eof_id,
            aliases_in_flight,
            stale: true,
            cur_word: Word::Empty,
            c_kind: Kind::Undefined,
            c_id: Id::Undefined,
            pending_here_docs: Vec::new(),
        }
    }

    /// Reset parser state; the interactive loop calls this per line.
    pub fn reset(&mut self) {
        self.stale = true;
        self.cur_word = Word::Empty;
        self.c_kind = Kind::Undefined;
        self.c_id = Id::Undefined;
        self.pending_here_docs.clear();
    }

    pub fn reset_input_objects(&mut self) {
        self.w_parser.reset();
        self.lexer.borrow_mut().reset_input_objects();
        self.line_reader.borrow_mut().reset();
    }

    fn advance(&mut self) {
        self.stale = true;
    }

    fn peek(&mut self) -> ParseResult<()> {
        if self.stale {
            let w = self.w_parser.read_word(LexMode::ShCommand)?;

            // Here docs are filled on command-level newlines only.
            if let Word::Token(t) = &w {
                if t.id == Id::OpNewline && !self.pending_here_docs.is_empty() {
                    let pending = std::mem::take(&mut self.pending_here_docs);
                    for h in &pending {
                        self.parse_here_doc_body(h)?;
                    }
                }
            }

            self.c_kind = word::command_kind(&w);
            self.c_id = word::command_id(&w);
            self.cur_word = w;
            self.stale = false;
        }
        Ok(())
    }

    /// Replace the cursor with an already-read terminator token.
    fn inject_token(&mut self, t: Token) {
        self.c_kind = t.kind();
        self.c_id = t.id;
        self.cur_word = Word::Token(t);
        self.stale = false;
    }

    fn eat(&mut self, c_id: Id) -> ParseResult<()> {
        self.peek()?;
        if self.c_id != c_id {
            return Err(ParseError::at_word(
                format!("Expected {}, got {}", c_id, self.c_id),
                &self.cur_word,
            ));
        }
        self.advance();
        Ok(())
    }

    /// Skip any run of newlines (`newline_ok` in the grammar).
    fn newline_ok(&mut self) -> ParseResult<()> {
        self.peek()?;
        while self.c_id == Id::OpNewline {
            self.advance();
            self.peek()?;
        }
        Ok(())
    }

    fn unexpected(&self, what: &str) -> ParseError {
        ParseError::at_word(what.to_string(), &self.cur_word)
    }

    // ── Here documents ───────────────────────────────────────────────────

    /// Read raw body lines until the terminator matches. `<<-` strips all
    /// leading tabs from each line, including the terminator's.
    fn read_here_lines(
        &mut self,
        h: &Rc<RefCell<HereDocNode>>,
        delimiter: &str,
    ) -> ParseResult<(Vec<SourceLine>, SourceLine)> {
        let strip_tabs = h.borrow().op.id == Id::RedirDLessDash;
        let mut here_lines = Vec::new();
        loop {
            let next = self.line_reader.borrow_mut().get_line();
            let Some((line_id, line, _)) = next else {
                // Bash only warns here; being strict avoids misattributing
                // later errors.
                return Err(ParseError::at_token(
                    "Couldn't find terminator for here doc that starts here",
                    &h.borrow().op,
                ));
            };

            let start_offset = if strip_tabs {
                line.len() - line.trim_start_matches('\t').len()
            } else {
                0
            };

            if line[start_offset..].trim_end() == delimiter {
                return Ok((here_lines, (line_id, line, start_offset)));
            }
            here_lines.push((line_id, line, start_offset));
        }
    }

    /// Literal body for a quoted delimiter: one token per line.
    fn make_literal_here_lines(&self, here_lines: &[SourceLine]) -> Vec<WordPart> {
        let mut arena = self.ctx.arena.borrow_mut();
        here_lines
            .iter()
            .map(|(line_id, line, start_offset)| {
                let text = &line[*start_offset..];
                let span_id = arena.add_span(*line_id, *start_offset, text.len());
                WordPart::Literal(Token::new(Id::LitChars, text, span_id))
            })
            .collect()
    }

    /// Fill in the body of a pending here-doc node, exactly once.
    fn parse_here_doc_body(&mut self, h: &Rc<RefCell<HereDocNode>>) -> ParseResult<()> {
        let here_begin = h.borrow().here_begin.clone();
        let (ok, delimiter, delim_quoted) = word::static_eval(&here_begin);
        if !ok {
            return Err(ParseError::at_word("Invalid here doc delimiter", &here_begin));
        }

        let (here_lines, last_line) = self.read_here_lines(h, &delimiter)?;

        let parts = if delim_quoted {
            // << 'EOF': no expansion at all.
            self.make_literal_here_lines(&here_lines)
        } else {
            let mut w_parser = self.ctx.make_word_parser_for_here_doc(here_lines);
            let mut parts = Vec::new();
            w_parser.read_here_doc_body(&mut parts)?;
            parts
        };

        let (end_line_id, end_line, end_pos) = last_line;
        let end_span = self
            .ctx
            .arena
            .borrow_mut()
            .add_span(end_line_id, end_pos, end_line.len() - end_pos);

        let mut node = h.borrow_mut();
        node.stdin_parts = parts;
        node.here_end_span_id = end_span;
        node.filled = true;
        Ok(())
    }

    pub fn check_for_pending_here_docs(&self) -> ParseResult<()> {
        if let Some(h) = self.pending_here_docs.first() {
            return Err(ParseError::at_word(
                "Unterminated here doc began here",
                &h.borrow().here_begin,
            ));
        }
        Ok(())
    }

    // ── Redirects ────────────────────────────────────────────────────────

    fn redirect_fd(val: &str) -> Option<u32> {
        let digits: String = val.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    pub fn parse_redirect(&mut self) -> ParseResult<Redirect> {
        self.peek()?;
        let Word::Token(op) = self.cur_word.clone() else {
            return Err(self.unexpected("Expected a redirect operator"));
        };
        let fd = Self::redirect_fd(&op.val);

        self.advance();
        self.peek()?;

        if op.id == Id::RedirDLess || op.id == Id::RedirDLessDash {
            let here_begin = self.cur_word.clone();
            self.advance();

            let node = Rc::new(RefCell::new(HereDocNode {
                op,
                fd,
                here_begin,
                stdin_parts: Vec::new(),
                here_end_span_id: SpanId::SENTINEL,
                filled: false,
            }));
            // Filled on the next newline.
            self.pending_here_docs.push(Rc::clone(&node));
            return Ok(Redirect::HereDoc(node));
        }

        if self.c_kind != Kind::Word {
            return Err(self.unexpected("Invalid token after redirect operator"));
        }
        let arg_word = word::tilde_detect(&self.cur_word).unwrap_or_else(|| self.cur_word.clone());
        self.advance();

        Ok(Redirect::Redir { op, fd, arg_word })
    }

    /// Redirects after a compound command, e.g. `{ ...; } > out`.
    fn parse_redirect_list(&mut self) -> ParseResult<Vec<Redirect>> {
        let mut redirects = Vec::new();
        loop {
            self.peek()?;
            if self.c_kind != Kind::Redir {
                break;
            }
            redirects.push(self.parse_redirect()?);
            self.advance();
        }
        Ok(redirects)
    }

    // ── Simple commands ──────────────────────────────────────────────────

    /// First pass: split the cursor run into redirects and words.
    fn scan_simple_command(&mut self) -> ParseResult<(Vec<Redirect>, Vec<Word>)> {
        let mut redirects = Vec::new();
        let mut words = Vec::new();
        loop {
            self.peek()?;
            if self.c_kind == Kind::Redir {
                redirects.push(self.parse_redirect()?);
            } else if self.c_kind == Kind::Word {
                words.push(self.cur_word.clone());
            } else {
                break;
            }
            self.advance();
        }
        Ok((redirects, words))
    }

    /// Second pass: the leading run of assignment-shaped words.
    fn split_simple_command_prefix(words: Vec<Word>) -> (Vec<PreParsed>, Vec<Word>) {
        let mut preparsed = Vec::new();
        let mut suffix = Vec::new();
        let mut done_prefix = false;
        for w in words {
            if done_prefix {
                suffix.push(w);
                continue;
            }
            let (left, close, offset) = word::detect_assignment(&w);
            match (left, &w) {
                (Some(left), Word::Compound(c)) => {
                    preparsed.push((left, close, offset, c.clone()));
                }
                _ => {
                    done_prefix = true;
                    suffix.push(w);
                }
            }
        }
        (preparsed, suffix)
    }

    fn make_assign_pair(&self, preparsed: &PreParsed) -> ParseResult<AssignPair> {
        let (left_token, close_token, part_offset, w) = preparsed;

        let lhs = if left_token.id == Id::LitVarLike {
            let (name, op) = if left_token.val.ends_with("+=") {
                (left_token.val.trim_end_matches("+=").to_string(), AssignOp::PlusEqual)
            } else {
                (left_token.val.trim_end_matches('=').to_string(), AssignOp::Equal)
            };
            let lhs = LhsExpr::Name {
                name,
                spid: left_token.span_id,
            };
            (lhs, op)
        } else if left_token.id == Id::LitArrayLhsOpen {
            let close = close_token
                .as_ref()
                .ok_or_else(|| ParseError::at_token("Expected ]= after subscript", left_token))?;
            let op = if close.val.ends_with("+=") {
                AssignOp::PlusEqual
            } else {
                AssignOp::Equal
            };
            let name = left_token.val.trim_end_matches('[').to_string();

            // The index tokens sit between the open and close literals.
            let index_str: String = w
                .parts
                .iter()
                .skip(1)
                .take(part_offset.saturating_sub(2))
                .filter_map(|p| match p {
                    WordPart::Literal(t) => Some(t.val.as_str()),
                    _ => None,
                })
                .collect();

            let lhs = if self.ctx.options.one_pass_parse {
                LhsExpr::CompatIndexedName {
                    name,
                    index: index_str,
                    spid: left_token.span_id,
                }
            } else {
                let mut arena = self.ctx.arena.borrow_mut();
                arena.push_source(SourceKind::LValue {
                    left_span: left_token.span_id,
                    right_span: close.span_id,
                });
                drop(arena);
                let index = self.ctx.make_arith_expr(&index_str);
                self.ctx.arena.borrow_mut().pop_source();
                LhsExpr::IndexedName {
                    name,
                    index,
                    spid: left_token.span_id,
                }
            };
            (lhs, op)
        } else {
            return Err(ParseError::at_token("Invalid assignment", left_token));
        };
        let (lhs, op) = lhs;

        let rhs = if *part_offset == w.parts.len() {
            Word::Empty
        } else {
            let val = Word::Compound(CompoundWord::new(w.parts[*part_offset..].to_vec()));
            word::tilde_detect(&val).unwrap_or(val)
        };

        Ok(AssignPair {
            lhs,
            op,
            rhs: Some(rhs),
        })
    }

    fn append_more_env(
        preparsed_list: &[PreParsed],
        more_env: &mut Vec<EnvPair>,
    ) -> ParseResult<()> {
        for (left_token, _close, part_offset, w) in preparsed_list {
            if left_token.id != Id::LitVarLike {
                return Err(ParseError::at_token(
                    "Environment binding shouldn't look like an array assignment",
                    left_token,
                ));
            }
            if left_token.val.ends_with("+=") {
                return Err(ParseError::at_token(
                    "Expected = in environment binding, got +=",
                    left_token,
                ));
            }
            let name = left_token.val.trim_end_matches('=').to_string();
            let val = if *part_offset == w.parts.len() {
                Word::Empty
            } else {
                Word::Compound(CompoundWord::new(w.parts[*part_offset..].to_vec()))
            };
            more_env.push(EnvPair {
                name,
                val,
                spid: left_token.span_id,
            });
        }
        Ok(())
    }

    fn make_assignment(&self, assign_kw: Id, suffix_words: &[Word]) -> ParseResult<Command> {
        // Flags like -r -x -a -A; none take arguments.
        let mut flags = Vec::new();
        let n = suffix_words.len();
        let mut i = 1;
        while i < n {
            let (ok, val, quoted) = word::static_eval(&suffix_words[i]);
            if !ok || quoted || !val.starts_with('-') {
                break;
            }
            flags.push(val);
            i += 1;
        }

        let mut pairs = Vec::new();
        let mut spids = Vec::new();
        while i < n {
            let w = &suffix_words[i];
            let (left, close, offset) = word::detect_assignment(w);
            match (left, w) {
                (Some(left), Word::Compound(c)) => {
                    let preparsed = (left, close, offset, c.clone());
                    pairs.push(self.make_assign_pair(&preparsed)?);
                }
                _ => {
                    // `declare x` with no value is equivalent to `x=''`.
                    let (ok, name, quoted) = word::static_eval(w);
                    if !ok || quoted {
                        return Err(ParseError::at_word(
                            "Variable names must be unquoted constants",
                            w,
                        ));
                    }
                    if !is_valid_var_name(&name) {
                        return Err(ParseError::at_word(
                            format!("Invalid variable name {:?}", name),
                            w,
                        ));
                    }
                    let spid = word::left_most_span_for_word(w);
                    pairs.push(AssignPair {
                        lhs: LhsExpr::Name { name, spid },
                        op: AssignOp::Equal,
                        rhs: None,
                    });
                }
            }
            spids.push(word::left_most_span_for_word(w));
            i += 1;
        }

        Ok(Command::Assignment(Assignment {
            keyword: assign_kw,
            flags,
            pairs,
            spids,
        }))
    }

    fn make_simple_command(
        preparsed_list: Vec<PreParsed>,
        suffix_words: Vec<Word>,
        redirects: Vec<Redirect>,
    ) -> ParseResult<Command> {
        // FOO=(1 2 3) ls is not allowed.
        for (_, _, _, w) in &preparsed_list {
            let w = Word::Compound(w.clone());
            if word::has_array_part(&w) {
                return Err(ParseError::at_word(
                    "Environment bindings can't contain array literals",
                    &w,
                ));
            }
        }
        // echo FOO=(1 2 3) is not allowed either.
        for w in &suffix_words {
            if word::has_array_part(w) {
                return Err(ParseError::at_word(
                    "Commands can't contain array literals",
                    w,
                ));
            }
        }

        // Detection only; expansion happens at evaluation time.
        let words = braces::brace_detect_all(suffix_words);
        let words = word::tilde_detect_all(words);

        let mut more_env = Vec::new();
        Self::append_more_env(&preparsed_list, &mut more_env)?;

        Ok(Command::Simple(SimpleCommand {
            words,
            redirects,
            more_env,
        }))
    }

    /// Try parse-time alias expansion on the suffix words.
    ///
    /// Statically evaluable words are looked up left to right; expansion
    /// continues while each alias body ends in a space. `(name, position)`
    /// pairs already in flight stop the walk, which breaks cycles without
    /// blocking a repeated word at a different position.
    fn maybe_expand_aliases(&mut self, words: &[Word]) -> ParseResult<Option<Command>> {
        let aliases_in_flight = self
            .aliases_in_flight
            .clone()
            .unwrap_or_else(|| Rc::new(RefCell::new(Vec::new())));

        let argv0_spid = word::left_most_span_for_word(&words[0]);
        let mut first_word_str = String::new();
        let mut expanded: Vec<String> = Vec::new();
        let n = words.len();
        let mut i = 0;

        while i < n {
            let w = &words[i];
            let (ok, word_str, quoted) = word::static_eval(w);
            if !ok || quoted {
                break;
            }
            let Some(alias_exp) = self.ctx.aliases.get(&word_str) else {
                break;
            };
            if aliases_in_flight
                .borrow()
                .iter()
                .any(|(s, pos)| *s == word_str && *pos == i)
            {
                break;
            }
            if i == 0 {
                first_word_str = word_str.clone();
            }
            aliases_in_flight.borrow_mut().push((word_str, i));
            expanded.push(alias_exp.clone());
            i += 1;

            if !alias_exp.ends_with(' ') {
                // The trailing space is a continuation marker, not content.
                expanded.push(" ".to_string());
                break;
            }
        }

        if expanded.is_empty() {
            return Ok(None);
        }

        // Append the rest of the words byte-for-byte from the source.
        while i < n {
            let w = &words[i];
            let spid1 = word::left_most_span_for_word(w);
            let spid2 = word::right_most_span_for_word(w);
            if spid1.is_sentinel() || spid2.is_sentinel() {
                return Err(ParseError::at_word("Can't expand alias argument", w));
            }
            let arena = self.ctx.arena.borrow();
            let span1 = arena.span(spid1);
            let span2 = arena.span(spid2);
            if span1.line_id != span2.line_id {
                return Err(ParseError::at_word(
                    "Can't expand aliases with multi-line words",
                    w,
                ));
            }
            let piece = arena.line_slice(
                span1.line_id,
                span1.col as usize,
                (span2.col + span2.length) as usize,
            );
            drop(arena);
            expanded.push(piece);
            expanded.push(" ".to_string());
            i += 1;
        }

        let code_str: String = expanded.concat();
        let reader: Rc<RefCell<dyn LineReader>> = Rc::new(RefCell::new(StringLineReader::new(
            &code_str,
            Rc::clone(&self.ctx.arena),
        )));
        let mut cp = self.ctx.make_parser_for_alias(reader, aliases_in_flight);

        self.ctx.arena.borrow_mut().push_source(SourceKind::Alias {
            name: first_word_str,
            argv0_span: argv0_spid,
        });
        self.ctx.trail.borrow_mut().begin_alias_expansion();
        let result = cp.parse_command_term();
        self.ctx.trail.borrow_mut().end_alias_expansion();
        self.ctx.arena.borrow_mut().pop_source();

        Ok(Some(result?))
    }

    pub fn parse_simple_command(&mut self) -> ParseResult<Command> {
        let (redirects, words) = self.scan_simple_command()?;

        if words.is_empty() {
            // e.g. `>out.txt`: a redirect without words.
            return Ok(Command::Simple(SimpleCommand {
                words: Vec::new(),
                redirects,
                more_env: Vec::new(),
            }));
        }

        let (preparsed_list, suffix_words) = Self::split_simple_command_prefix(words);

        // Completion inspects this state after a failed parse.
        self.ctx
            .trail
            .borrow_mut()
            .set_latest_words(suffix_words.clone(), redirects.clone());

        if suffix_words.is_empty() {
            // ONE=1 TWO=2 with no command: a global assignment.
            if !redirects.is_empty() {
                let (left, _, _, _) = &preparsed_list[0];
                return Err(ParseError::at_token(
                    "Global assignment shouldn't have redirects",
                    left,
                ));
            }
            let mut pairs = Vec::new();
            let mut spids = Vec::new();
            for preparsed in &preparsed_list {
                pairs.push(self.make_assign_pair(preparsed)?);
                spids.push(preparsed.0.span_id);
            }
            return Ok(Command::Assignment(Assignment {
                keyword: Id::AssignNone,
                flags: Vec::new(),
                pairs,
                spids,
            }));
        }

        if let Some((kind, kw_token)) = word::keyword_token(&suffix_words[0]) {
            if kind == Kind::Assign {
                // `typeset -p` and friends list variables; treat as a
                // plain command.
                let mut is_command = false;
                if suffix_words.len() > 1 {
                    let (ok, val, _) = word::static_eval(&suffix_words[1]);
                    if ok && ASSIGN_COMMANDS.contains(&(kw_token.id, val.as_str())) {
                        is_command = true;
                    }
                }
                if is_command {
                    return Self::make_simple_command(preparsed_list, suffix_words, redirects);
                }

                if !redirects.is_empty() {
                    return Err(ParseError::at_token(
                        "Assignments shouldn't have redirects",
                        &kw_token,
                    ));
                }
                if !preparsed_list.is_empty() {
                    let (left, _, _, _) = &preparsed_list[0];
                    return Err(ParseError::at_token(
                        "Assignments shouldn't have environment bindings",
                        left,
                    ));
                }
                let mut node = self.make_assignment(kw_token.id, &suffix_words)?;
                if let Command::Assignment(a) = &mut node {
                    a.spids.insert(0, kw_token.span_id);
                }
                return Ok(node);
            }

            if kind == Kind::ControlFlow {
                if !redirects.is_empty() {
                    return Err(ParseError::at_token(
                        "Control flow shouldn't have redirects",
                        &kw_token,
                    ));
                }
                if !preparsed_list.is_empty() {
                    let (left, _, _, _) = &preparsed_list[0];
                    return Err(ParseError::at_token(
                        "Control flow shouldn't have environment bindings",
                        left,
                    ));
                }
                let arg_word = match suffix_words.len() {
                    1 => None,
                    2 => Some(suffix_words[1].clone()),
                    _ => {
                        return Err(ParseError::at_word(
                            format!("Unexpected argument to {:?}", kw_token.val),
                            &suffix_words[2],
                        ));
                    }
                };
                return Ok(Command::ControlFlow {
                    token: kw_token,
                    arg_word,
                });
            }
        }

        // If any aliases expanded, wrap the re-parsed subtree.
        if let Some(expanded_node) = self.maybe_expand_aliases(&suffix_words)? {
            let mut more_env = Vec::new();
            Self::append_more_env(&preparsed_list, &mut more_env)?;
            return Ok(Command::ExpandedAlias {
                child: Box::new(expanded_node),
                redirects,
                more_env,
            });
        }

        Self::make_simple_command(preparsed_list, suffix_words, redirects)
    }

    // ── Compound commands ────────────────────────────────────────────────

    fn parse_brace_group(&mut self) -> ParseResult<Command> {
        let left_spid = word::left_most_span_for_word(&self.cur_word);
        self.eat(Id::LitLBrace)?;
        let children = self.parse_command_list()?;
        self.eat(Id::LitRBrace)?;
        Ok(Command::BraceGroup {
            children,
            redirects: Vec::new(),
            left_spid,
        })
    }

    /// `do command_list done`, shared by all the loops.
    fn parse_do_group(&mut self) -> ParseResult<Vec<Command>> {
        self.eat(Id::KwDo)?;
        let children = self.parse_command_list()?;
        self.eat(Id::KwDone)?;
        Ok(children)
    }

    /// `for_words : WORD* for_sep`
    fn parse_for_words(&mut self) -> ParseResult<(Vec<Word>, SpanId)> {
        let mut words = Vec::new();
        let mut semi_spid = SpanId::SENTINEL;
        loop {
            self.peek()?;
            if self.c_id == Id::OpSemi {
                if let Word::Token(t) = &self.cur_word {
                    semi_spid = t.span_id;
                }
                self.advance();
                self.newline_ok()?;
                break;
            }
            if self.c_id == Id::OpNewline {
                self.advance();
                break;
            }
            if !matches!(self.cur_word, Word::Compound(_)) {
                return Err(self.unexpected("Invalid word in for loop"));
            }
            words.push(self.cur_word.clone());
            self.advance();
        }
        Ok((words, semi_spid))
    }

    fn parse_for_expr_loop(&mut self) -> ParseResult<Command> {
        let (init, cond, update) = self.w_parser.read_for_expression()?;
        self.advance();

        self.peek()?;
        match self.c_id {
            Id::OpSemi => {
                self.advance();
                self.newline_ok()?;
            }
            Id::OpNewline => self.advance(),
            Id::KwDo => {} // missing semicolon or newline is allowed
            _ => return Err(self.unexpected("Invalid word after for expression")),
        }

        let body = self.parse_do_group()?;
        Ok(Command::ForExpr {
            init,
            cond,
            update,
            body,
            redirects: Vec::new(),
        })
    }

    fn parse_for_each_loop(&mut self, for_spid: SpanId) -> ParseResult<Command> {
        let (ok, iter_name, quoted) = word::static_eval(&self.cur_word);
        if !ok || quoted {
            return Err(self.unexpected("Loop variable name should be a constant"));
        }
        if !is_valid_var_name(&iter_name) {
            return Err(self.unexpected("Invalid loop variable name"));
        }
        self.advance();
        self.newline_ok()?;

        let mut iter_words = Vec::new();
        let mut do_arg_iter = false;
        let mut in_spid = SpanId::SENTINEL;
        let mut semi_spid = SpanId::SENTINEL;

        self.peek()?;
        match self.c_id {
            Id::KwIn => {
                in_spid = word::left_most_span_for_word(&self.cur_word);
                self.advance();
                let (words, semi) = self.parse_for_words()?;
                semi_spid = semi;
                let words = braces::brace_detect_all(words);
                iter_words = word::tilde_detect_all(words);
            }
            Id::OpSemi => {
                // `for x; do ...` iterates over "$@".
                do_arg_iter = true;
                self.advance();
            }
            Id::KwDo => {
                do_arg_iter = true;
                // Do not advance.
            }
            _ => return Err(self.unexpected("Unexpected word after for loop variable")),
        }

        let body = self.parse_do_group()?;
        Ok(Command::ForEach {
            iter_name,
            iter_words,
            do_arg_iter,
            body,
            redirects: Vec::new(),
            spids: vec![for_spid, in_spid, semi_spid],
        })
    }

    fn parse_for(&mut self) -> ParseResult<Command> {
        let for_spid = word::left_most_span_for_word(&self.cur_word);
        self.eat(Id::KwFor)?;
        self.peek()?;
        if self.c_id == Id::OpDLeftParen {
            self.parse_for_expr_loop()
        } else {
            self.parse_for_each_loop(for_spid)
        }
    }

    fn parse_while_until(&mut self) -> ParseResult<Command> {
        let keyword = word::literal_token(&self.cur_word)
            .ok_or_else(|| self.unexpected("Expected while or until"))?;
        self.advance();

        let cond = self.parse_command_list()?;
        let body = self.parse_do_group()?;

        Ok(Command::WhileUntil {
            keyword,
            cond,
            body,
            redirects: Vec::new(),
        })
    }

    /// One `pattern) body ;;` arm. The hint turns the closing paren into
    /// `Right_CasePat`.
    fn parse_case_item(&mut self) -> ParseResult<CaseArm> {
        self.lexer
            .borrow_mut()
            .push_hint(Id::OpRParen, Id::RightCasePat);

        if self.c_id == Id::OpLParen {
            self.advance();
        }

        let mut pat_words = Vec::new();
        loop {
            self.peek()?;
            pat_words.push(self.cur_word.clone());
            self.advance();
            self.peek()?;
            if self.c_id == Id::OpPipe {
                self.advance();
            } else {
                break;
            }
        }

        self.eat(Id::RightCasePat)?;
        self.newline_ok()?;

        let action = if self.c_id != Id::OpDSemi && self.c_id != Id::KwEsac {
            self.parse_command_term_children()?
        } else {
            Vec::new()
        };

        self.peek()?;
        match self.c_id {
            Id::KwEsac => {}
            Id::OpDSemi => self.advance(),
            _ => return Err(self.unexpected("Expected ;; or esac")),
        }
        self.newline_ok()?;

        Ok(CaseArm { pat_words, action })
    }

    fn parse_case_list(&mut self, arms: &mut Vec<CaseArm>) -> ParseResult<()> {
        loop {
            self.peek()?;
            if self.c_id == Id::KwEsac {
                return Ok(());
            }
            if self.c_kind != Kind::Word && self.c_id != Id::OpLParen {
                return Ok(());
            }
            arms.push(self.parse_case_item()?);
        }
    }

    fn parse_case(&mut self) -> ParseResult<Command> {
        let case_spid = word::left_most_span_for_word(&self.cur_word);
        self.advance();

        self.peek()?;
        let to_match = self.cur_word.clone();
        self.advance();

        self.newline_ok()?;
        let in_spid = word::left_most_span_for_word(&self.cur_word);
        self.eat(Id::KwIn)?;
        self.newline_ok()?;

        let mut arms = Vec::new();
        if self.c_id != Id::KwEsac {
            self.parse_case_list(&mut arms)?;
            self.peek()?;
        }

        let esac_spid = word::left_most_span_for_word(&self.cur_word);
        self.eat(Id::KwEsac)?;

        Ok(Command::Case {
            to_match,
            arms,
            redirects: Vec::new(),
            spids: vec![case_spid, in_spid, esac_spid],
        })
    }

    fn parse_elif_else(&mut self, arms: &mut Vec<IfArm>) -> ParseResult<Vec<Command>> {
        self.peek()?;
        while self.c_id == Id::KwElif {
            self.advance();
            let cond = self.parse_command_list()?;
            self.eat(Id::KwThen)?;
            let body = self.parse_command_list()?;
            arms.push(IfArm { cond, action: body });
        }

        let mut else_action = Vec::new();
        if self.c_id == Id::KwElse {
            self.advance();
            else_action = self.parse_command_list()?;
        }
        Ok(else_action)
    }

    fn parse_if(&mut self) -> ParseResult<Command> {
        self.advance(); // skip `if`

        let cond = self.parse_command_list()?;
        self.eat(Id::KwThen)?;
        let body = self.parse_command_list()?;

        let mut arms = vec![IfArm { cond, action: body }];
        let mut else_action = Vec::new();
        if self.c_id == Id::KwElif || self.c_id == Id::KwElse {
            else_action = self.parse_elif_else(&mut arms)?;
        }

        self.eat(Id::KwFi)?;
        Ok(Command::If {
            arms,
            else_action,
            redirects: Vec::new(),
        })
    }

    fn parse_time(&mut self) -> ParseResult<Command> {
        self.advance();
        let pipeline = self.parse_pipeline()?;
        Ok(Command::TimeBlock {
            pipeline: Box::new(pipeline),
        })
    }

    fn parse_subshell(&mut self) -> ParseResult<Command> {
        let left_spid = word::left_most_span_for_word(&self.cur_word);
        self.advance(); // skip past (

        // Delayed so that `$( (cd / && pwd) )` resolves the inner paren
        // first.
        self.lexer
            .borrow_mut()
            .push_hint(Id::OpRParen, Id::RightSubshell);

        let children = self.parse_command_list()?;
        let child = if children.len() == 1 {
            children.into_iter().next().unwrap_or(Command::NoOp)
        } else {
            Command::CommandList { children }
        };

        let right_spid = word::left_most_span_for_word(&self.cur_word);
        self.eat(Id::RightSubshell)?;

        Ok(Command::Subshell {
            child: Box::new(child),
            redirects: Vec::new(),
            left_spid,
            right_spid,
        })
    }

    /// `[[ ... ]]`: collect the words for the boolean expression parser.
    fn parse_dbracket(&mut self) -> ParseResult<Command> {
        let left_spid = word::left_most_span_for_word(&self.cur_word);
        self.advance(); // skip [[

        let mut words = Vec::new();
        loop {
            self.peek()?;
            if self.c_id == Id::LitDRightBracket {
                break;
            }
            if self.c_kind == Kind::Eof {
                return Err(self.unexpected("Unexpected EOF, expected ]]"));
            }
            if self.c_id == Id::OpNewline {
                self.advance();
                continue;
            }
            words.push(self.cur_word.clone());
            self.advance();
        }
        let right_spid = word::left_most_span_for_word(&self.cur_word);
        self.advance();

        Ok(Command::DBracket {
            words,
            redirects: Vec::new(),
            spids: vec![left_spid, right_spid],
        })
    }

    fn parse_dparen(&mut self) -> ParseResult<Command> {
        let left_spid = word::left_most_span_for_word(&self.cur_word);
        self.advance(); // skip ((
        let (child, right_spid) = self.w_parser.read_dparen()?;
        self.advance();

        Ok(Command::DParen {
            child,
            redirects: Vec::new(),
            spids: vec![left_spid, right_spid],
        })
    }

    fn parse_compound_command(&mut self) -> ParseResult<Command> {
        match self.c_id {
            Id::LitLBrace => self.parse_brace_group(),
            Id::OpLParen => self.parse_subshell(),
            Id::KwFor => self.parse_for(),
            Id::KwWhile | Id::KwUntil => self.parse_while_until(),
            Id::KwIf => self.parse_if(),
            Id::KwCase => self.parse_case(),
            Id::KwTime => self.parse_time(),
            Id::KwDLeftBracket => self.parse_dbracket(),
            Id::OpDLeftParen => self.parse_dparen(),
            Id::KwVar | Id::KwSetVar => {
                let kw_token = word::literal_token(&self.cur_word)
                    .ok_or_else(|| self.unexpected("Expected var or setvar"))?;
                self.advance();
                let (node, terminator) = if kw_token.id == Id::KwVar {
                    self.w_parser.parse_var(kw_token)?
                } else {
                    self.w_parser.parse_set_var(kw_token)?
                };
                self.inject_token(terminator);
                Ok(node)
            }
            _ => Err(self.unexpected("Unexpected word while parsing compound command")),
        }
    }

    // ── Function definitions ─────────────────────────────────────────────

    fn parse_function_body(&mut self) -> ParseResult<(Box<Command>, Vec<Redirect>)> {
        let body = self.parse_compound_command()?;
        let redirects = self.parse_redirect_list()?;
        Ok((Box::new(body), redirects))
    }

    /// `fname ( ) newline_ok function_body`. The cursor is on the name.
    fn parse_function_def(&mut self) -> ParseResult<Command> {
        let left_spid = word::left_most_span_for_word(&self.cur_word);
        let name = word::as_func_name(&self.cur_word)
            .ok_or_else(|| self.unexpected("Invalid function name"))?;
        self.advance();

        self.peek()?;
        if self.c_id != Id::OpLParen {
            return Err(self.unexpected("Expected ( after function name"));
        }
        self.lexer
            .borrow_mut()
            .push_hint(Id::OpRParen, Id::RightFuncDef);
        self.advance();
        self.eat(Id::RightFuncDef)?;
        self.newline_ok()?;

        let (body, redirects) = self.parse_function_body()?;
        Ok(Command::FuncDef {
            name,
            body,
            redirects,
            spids: vec![left_spid],
        })
    }

    /// `function fname ['(' ')'] newline_ok function_body`
    fn parse_ksh_function_def(&mut self) -> ParseResult<Command> {
        let left_spid = word::left_most_span_for_word(&self.cur_word);
        self.advance(); // skip past `function`

        self.peek()?;
        let name = word::as_func_name(&self.cur_word)
            .ok_or_else(|| self.unexpected("Invalid KSH-style function name"))?;
        self.advance();

        self.peek()?;
        if self.c_id == Id::OpLParen {
            self.lexer
                .borrow_mut()
                .push_hint(Id::OpRParen, Id::RightFuncDef);
            self.advance();
            self.eat(Id::RightFuncDef)?;
        }
        self.newline_ok()?;

        let (body, redirects) = self.parse_function_body()?;
        Ok(Command::FuncDef {
            name,
            body,
            redirects,
            spids: vec![left_spid],
        })
    }

    // ── Commands, pipelines, and/or ──────────────────────────────────────

    pub fn parse_command(&mut self) -> ParseResult<Command> {
        self.peek()?;

        if NOT_FIRST_WORDS.contains(&self.c_id) {
            return Err(self.unexpected("Unexpected word when parsing command"));
        }

        if self.c_id == Id::KwFunction {
            return self.parse_ksh_function_def();
        }

        if matches!(
            self.c_id,
            Id::KwDLeftBracket
                | Id::OpDLeftParen
                | Id::OpLParen
                | Id::LitLBrace
                | Id::KwFor
                | Id::KwWhile
                | Id::KwUntil
                | Id::KwIf
                | Id::KwCase
                | Id::KwTime
                | Id::KwVar
                | Id::KwSetVar
        ) {
            let mut node = self.parse_compound_command()?;
            if !matches!(node, Command::TimeBlock { .. } | Command::OilAssign { .. }) {
                let redirects = self.parse_redirect_list()?;
                node.set_redirects(redirects);
            }
            return Ok(node);
        }

        if self.c_id == Id::LitRBrace {
            return Err(self.unexpected("Unexpected right brace"));
        }

        if self.c_kind == Kind::Redir {
            // Leading redirect.
            return self.parse_simple_command();
        }

        if self.c_kind == Kind::Word {
            if self.w_parser.look_ahead() == Id::OpLParen && !word::is_var_like(&self.cur_word) {
                return self.parse_function_def(); // f() { echo; }
            }
            return self.parse_simple_command();
        }

        if self.c_kind == Kind::Eof {
            return Err(self.unexpected("Unexpected EOF while parsing command"));
        }

        // e.g. a stray `)` in batch mode.
        Err(self.unexpected("Invalid word while parsing command"))
    }

    /// `pipeline : Bang? command ('|' | '|&' newline_ok command)*`
    pub fn parse_pipeline(&mut self) -> ParseResult<Command> {
        let mut negated = false;
        let mut pipeline_spid = SpanId::SENTINEL;

        self.peek()?;
        if self.c_id == Id::KwBang {
            pipeline_spid = word::left_most_span_for_word(&self.cur_word);
            negated = true;
            self.advance();
        }

        let child = self.parse_command()?;
        let mut children = vec![child];

        self.peek()?;
        if self.c_id != Id::OpPipe && self.c_id != Id::OpPipeAmp {
            if negated {
                return Ok(Command::Pipeline(Pipeline {
                    children,
                    negated,
                    stderr_indices: Vec::new(),
                    spid: pipeline_spid,
                }));
            }
            return Ok(children.pop().unwrap_or(Command::NoOp));
        }

        let mut pipe_index = 0;
        let mut stderr_indices = Vec::new();
        if self.c_id == Id::OpPipeAmp {
            stderr_indices.push(pipe_index);
        }
        pipe_index += 1;

        loop {
            if pipeline_spid.is_sentinel() {
                pipeline_spid = word::left_most_span_for_word(&self.cur_word);
            }
            self.advance(); // skip past | or |&
            self.newline_ok()?;

            children.push(self.parse_command()?);

            self.peek()?;
            if self.c_id != Id::OpPipe && self.c_id != Id::OpPipeAmp {
                break;
            }
            if self.c_id == Id::OpPipeAmp {
                stderr_indices.push(pipe_index);
            }
            pipe_index += 1;
        }

        Ok(Command::Pipeline(Pipeline {
            children,
            negated,
            stderr_indices,
            spid: pipeline_spid,
        }))
    }

    /// Left-associative `&&` / `||` chains, parsed iteratively.
    pub fn parse_and_or(&mut self) -> ParseResult<Command> {
        let child = self.parse_pipeline()?;

        self.peek()?;
        if self.c_id != Id::OpDPipe && self.c_id != Id::OpDAmp {
            return Ok(child);
        }

        let mut ops = Vec::new();
        let mut children = vec![child];
        loop {
            ops.push(self.c_id);
            self.advance();
            self.newline_ok()?;

            children.push(self.parse_pipeline()?);

            self.peek()?;
            if self.c_id != Id::OpDPipe && self.c_id != Id::OpDAmp {
                break;
            }
        }
        Ok(Command::AndOr(AndOr { ops, children }))
    }

    // ── Command lists ────────────────────────────────────────────────────

    /// `command_line : and_or (sync_op and_or)* trailer?` — the top level,
    /// which stops at the first newline so the caller can execute eagerly.
    fn parse_command_line(&mut self) -> ParseResult<Command> {
        let mut children = Vec::new();
        let mut done = false;
        while !done {
            let mut child = self.parse_and_or()?;

            self.peek()?;
            if self.c_id == Id::OpSemi || self.c_id == Id::OpAmp {
                if let Word::Token(t) = &self.cur_word {
                    child = Command::Sentence {
                        child: Box::new(child),
                        terminator: t.clone(),
                    };
                }
                self.advance();
                self.peek()?;
                if self.c_id == Id::OpNewline || self.c_id == self.eof_id {
                    done = true;
                }
            } else if self.c_id == Id::OpNewline || self.c_id == self.eof_id {
                done = true;
            } else {
                // e.g. `echo a(b)`
                return Err(self.unexpected("Unexpected word while parsing command line"));
            }
            children.push(child);
        }

        if children.len() == 1 {
            Ok(children.pop().unwrap_or(Command::NoOp))
        } else {
            Ok(Command::CommandList { children })
        }
    }

    fn at_term_end(&self) -> bool {
        self.c_id == self.eof_id
            || matches!(self.c_id, Id::RightSubshell | Id::LitRBrace | Id::OpDSemi)
    }

    /// `command_term : and_or (trailer and_or)*` — used inside blocks, case
    /// arms, command subs, and alias expansions.
    pub fn parse_command_term(&mut self) -> ParseResult<Command> {
        let children = self.parse_command_term_children()?;
        Ok(Command::CommandList { children })
    }

    fn parse_command_term_children(&mut self) -> ParseResult<Vec<Command>> {
        let mut children = Vec::new();
        let mut done = false;
        while !done {
            self.peek()?;

            // do/done/then/fi/... end the term without being consumed.
            if NOT_FIRST_WORDS.contains(&self.c_id) {
                break;
            }

            let mut child = self.parse_and_or()?;

            self.peek()?;
            if self.c_id == Id::OpNewline {
                self.advance();
                self.peek()?;
                if self.at_term_end() {
                    done = true;
                }
            } else if self.c_id == Id::OpSemi || self.c_id == Id::OpAmp {
                if let Word::Token(t) = &self.cur_word {
                    child = Command::Sentence {
                        child: Box::new(child),
                        terminator: t.clone(),
                    };
                }
                self.advance();
                self.peek()?;
                if self.c_id == Id::OpNewline {
                    self.advance();
                    self.peek()?;
                    if self.at_term_end() {
                        done = true;
                    }
                } else if self.at_term_end() {
                    done = true;
                }
            } else if self.at_term_end() {
                done = true;
            }
            // Anything else (e.g. `} done`, `fi fi`) is handled by the
            // enclosing construct.

            children.push(child);
        }

        self.peek()?;
        Ok(children)
    }

    /// `command_list : newline_ok command_term trailer?` — the body of
    /// every compound command.
    fn parse_command_list(&mut self) -> ParseResult<Vec<Command>> {
        self.newline_ok()?;
        self.parse_command_term_children()
    }

    // ── Entry points ─────────────────────────────────────────────────────

    /// Parse one logical line for a batch main loop. `None` means EOF.
    pub fn parse_logical_line(&mut self) -> ParseResult<Option<Command>> {
        self.newline_ok()?;
        self.peek()?;
        if self.c_id == self.eof_id {
            return Ok(None);
        }
        Ok(Some(self.parse_command_line()?))
    }

    /// Parse one line for an interactive main loop, where an empty line is
    /// meaningful.
    pub fn parse_interactive_line(&mut self) -> ParseResult<InteractiveLine> {
        self.peek()?;
        if self.c_id == Id::OpNewline {
            return Ok(InteractiveLine::Empty);
        }
        if self.c_id == self.eof_id {
            return Ok(InteractiveLine::Eof);
        }
        Ok(InteractiveLine::Node(self.parse_command_line()?))
    }

    /// Parse `$(echo hi)` or backticks: a command term ending at this
    /// parser's EOF id. Returns the node and the span of the closing token.
    pub fn parse_command_sub(&mut self) -> ParseResult<(Command, SpanId)> {
        self.newline_ok()?;

        if self.c_kind == Kind::Eof {
            // e.g. $()
            let spid = word::left_most_span_for_word(&self.cur_word);
            return Ok((Command::NoOp, spid));
        }

        let node = self.parse_command_term()?;

        self.peek()?;
        if self.c_id != self.eof_id {
            return Err(self.unexpected("Unexpected token in command substitution"));
        }
        let spid = word::left_most_span_for_word(&self.cur_word);
        Ok((node, spid))
    }

    /// Parse a whole program: every logical line, then the end-of-input
    /// here-doc check.
    pub fn parse_program(&mut self) -> ParseResult<Command> {
        let mut children = Vec::new();
        while let Some(node) = self.parse_logical_line()? {
            children.push(node);
            // The newline (or EOF) that ended the line.
            self.peek()?;
            if self.c_id == Id::OpNewline {
                self.advance();
            }
        }
        self.check_for_pending_here_docs()?;
        if children.len() == 1 {
            Ok(children.pop().unwrap_or(Command::NoOp))
        } else {
            Ok(Command::CommandList { children })
        }
    }
}

#[cfg(test)]
#[path = "cmd_parse_tests.rs"]
mod tests;

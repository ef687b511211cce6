// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The word parser.
//!
//! Reads tokens in the mode the grammar position requires and assembles
//! `Word` values: compound words out of literal runs, quotes, and
//! substitutions, or bare operator tokens that terminate word reading. Also
//! reads here-doc bodies, arithmetic regions, and extended globs, and
//! cooperates with the lexer through `look_ahead` and `push_hint`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::arena::{SourceKind, SpanId};
use crate::ast::{
    ArithExpr, BracketOp, Command, CompoundWord, PatSub, SuffixOp, Word, WordPart,
};
use crate::lexer::{LexMode, Lexer};
use crate::parse_ctx::ParseContext;
use crate::parse_error::{ParseError, ParseResult};
use crate::reader::StringLineReader;
use crate::token::{Id, Kind, Token};

fn word_or_empty(parts: Vec<WordPart>) -> Word {
    if parts.is_empty() {
        Word::Empty
    } else {
        Word::Compound(CompoundWord::new(parts))
    }
}

pub struct WordParser {
    ctx: Rc<ParseContext>,
    lexer: Rc<RefCell<Lexer>>,
    cur_token: Token,
    /// `Some(mode)` means the cursor is stale and the next peek reads a
    /// fresh token in that mode.
    next_lex_mode: Option<LexMode>,
}

impl WordParser {
    pub fn new(ctx: Rc<ParseContext>, lexer: Rc<RefCell<Lexer>>) -> Self {
        Self {
            ctx,
            lexer,
            cur_token: Token::sentinel(Id::Undefined),
            next_lex_mode: None,
        }
    }

    pub fn reset(&mut self) {
        self.cur_token = Token::sentinel(Id::Undefined);
        self.next_lex_mode = None;
    }

    /// Id of the next significant token, without consuming anything.
    /// Disambiguates `foo() {...}` from `foo`.
    ///
    /// If the current word was terminated by something other than a space,
    /// that terminator already sits at the cursor and is the answer;
    /// otherwise ask the lexer, which scans within the current line only.
    pub fn look_ahead(&self) -> Id {
        if self.cur_token.id == Id::WsSpace || self.cur_token.id == Id::Undefined {
            self.lexer.borrow().look_ahead(LexMode::ShCommand).id
        } else {
            self.cur_token.id
        }
    }

    pub fn lexer(&self) -> Rc<RefCell<Lexer>> {
        Rc::clone(&self.lexer)
    }

    fn advance(&mut self, mode: LexMode) {
        self.next_lex_mode = Some(mode);
    }

    fn peek(&mut self) {
        if let Some(mode) = self.next_lex_mode.take() {
            self.cur_token = self.lexer.borrow_mut().read(mode);
        }
    }

    fn lex(&mut self, mode: LexMode) -> Token {
        self.lexer.borrow_mut().read(mode)
    }

    /// Read exactly one command-level word.
    ///
    /// Returns `Word::Compound` for a run of adjacent parts, or
    /// `Word::Token` for the operator, redirect, or EOF token that sits at
    /// the cursor. Spaces and comments are skipped.
    pub fn read_word(&mut self, mode: LexMode) -> ParseResult<Word> {
        if self.cur_token.id == Id::Undefined && self.next_lex_mode.is_none() {
            self.advance(mode);
        }
        loop {
            self.peek();
            match self.cur_token.kind() {
                Kind::Eof => {
                    let w = Word::Token(self.cur_token.clone());
                    self.advance(mode);
                    return Ok(w);
                }
                Kind::Ws | Kind::Ignored => {
                    self.advance(mode);
                }
                Kind::Op | Kind::Redir | Kind::Right | Kind::Arith => {
                    let w = Word::Token(self.cur_token.clone());
                    self.advance(mode);
                    return Ok(w);
                }
                Kind::Lit
                    if self.cur_token.id == Id::LitPound
                        && matches!(mode, LexMode::ShCommand | LexMode::BashRegex) =>
                {
                    // `#` at the start of a word begins a comment; the
                    // comment-mode read swallows the rest of the line.
                    self.advance(LexMode::Comment);
                }
                Kind::Unknown => {
                    return Err(ParseError::at_token(
                        format!("Invalid token {:?}", self.cur_token.val),
                        &self.cur_token,
                    ));
                }
                _ => return self.read_compound_word(mode),
            }
        }
    }

    fn read_compound_word(&mut self, mode: LexMode) -> ParseResult<Word> {
        let parts = self.read_parts(mode)?;
        Ok(word_or_empty(parts))
    }

    /// The compound-word loop: accumulate parts until a token that cannot
    /// belong to a word; that token stays at the cursor.
    fn read_parts(&mut self, mode: LexMode) -> ParseResult<Vec<WordPart>> {
        let mut parts: Vec<WordPart> = Vec::new();
        loop {
            self.peek();
            let tok = self.cur_token.clone();
            match tok.kind() {
                Kind::Lit | Kind::Kw | Kind::Assign | Kind::ControlFlow | Kind::Char => {
                    match tok.id {
                        Id::LitEscapedChar => {
                            parts.push(WordPart::EscapedLiteral(tok));
                            self.advance(mode);
                        }
                        Id::LitVarLike => {
                            parts.push(WordPart::Literal(tok));
                            // `a=(1 2 3)`: an array literal may follow the
                            // `name=` immediately.
                            let next = self.lexer.borrow().look_ahead(LexMode::ShCommand).id;
                            if next == Id::OpLParen {
                                parts.push(self.read_array_literal()?);
                                // the array reader left a fetch pending
                            } else {
                                self.advance(mode);
                            }
                        }
                        Id::LitArrayLhsOpen => {
                            self.read_array_lhs(&mut parts, tok)?;
                            self.advance(mode);
                        }
                        _ => {
                            parts.push(WordPart::Literal(tok));
                            self.advance(mode);
                        }
                    }
                }
                Kind::VSub => {
                    parts.push(WordPart::SimpleVarSub(tok));
                    self.advance(mode);
                }
                Kind::Left => {
                    let part = self.read_left_part(&tok, false)?;
                    parts.push(part);
                    self.advance(mode);
                }
                Kind::ExtGlob => {
                    let part = self.read_ext_glob(tok)?;
                    parts.push(part);
                    self.advance(mode);
                }
                _ => break,
            }
        }
        Ok(parts)
    }

    fn read_left_part(&mut self, tok: &Token, d_quoted: bool) -> ParseResult<WordPart> {
        match tok.id {
            Id::LeftDoubleQuote => self.read_double_quoted(tok),
            Id::LeftSingleQuote => self.read_single_quoted(tok, LexMode::Sq),
            Id::LeftDollarSingleQuote => self.read_single_quoted(tok, LexMode::DollarSq),
            Id::LeftDollarBrace => self.read_braced_var_sub(tok, d_quoted),
            Id::LeftDollarParen | Id::LeftProcSubIn | Id::LeftProcSubOut => {
                self.read_command_sub(tok)
            }
            Id::LeftDollarDParen => self.read_arith_sub(tok),
            Id::LeftBacktick => self.read_backtick_sub(tok),
            _ => Err(ParseError::at_token("Unexpected left delimiter", tok)),
        }
    }

    // ── Quoted strings ───────────────────────────────────────────────────

    fn read_single_quoted(&mut self, left: &Token, mode: LexMode) -> ParseResult<WordPart> {
        let mut tokens = Vec::new();
        loop {
            let t = self.lex(mode);
            match t.id {
                Id::RightSingleQuote => {
                    return Ok(WordPart::SingleQuoted {
                        left: left.clone(),
                        tokens,
                        right_spid: t.span_id,
                    });
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated single quote", left));
                }
                _ => tokens.push(t),
            }
        }
    }

    fn read_double_quoted(&mut self, left: &Token) -> ParseResult<WordPart> {
        let mut parts = Vec::new();
        loop {
            let t = self.lex(LexMode::Dq);
            match t.id {
                Id::RightDoubleQuote => {
                    return Ok(WordPart::DoubleQuoted {
                        parts,
                        left_spid: left.span_id,
                        right_spid: t.span_id,
                    });
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated double quote", left));
                }
                _ => self.push_dq_part(&mut parts, t)?,
            }
        }
    }

    /// One token's worth of double-quoted content, shared with here-doc
    /// body parsing.
    fn push_dq_part(&mut self, parts: &mut Vec<WordPart>, t: Token) -> ParseResult<()> {
        match t.kind() {
            Kind::Lit => match t.id {
                Id::LitEscapedChar => parts.push(WordPart::EscapedLiteral(t)),
                _ => parts.push(WordPart::Literal(t)),
            },
            Kind::VSub => parts.push(WordPart::SimpleVarSub(t)),
            Kind::Left => {
                let part = self.read_left_part(&t, true)?;
                parts.push(part);
            }
            Kind::Ignored => {}
            _ => {
                return Err(ParseError::at_token(
                    "Unexpected token in double-quoted string",
                    &t,
                ));
            }
        }
        Ok(())
    }

    /// Parse a here-doc body from a virtual line reader into `parts`,
    /// honoring substitutions (the delimiter was unquoted).
    pub fn read_here_doc_body(&mut self, parts: &mut Vec<WordPart>) -> ParseResult<()> {
        loop {
            let t = self.lex(LexMode::Dq);
            match t.id {
                Id::EofReal => return Ok(()),
                // A bare `"` in a here-doc body is literal text.
                Id::RightDoubleQuote => parts.push(WordPart::Literal(t)),
                _ => self.push_dq_part(parts, t)?,
            }
        }
    }

    // ── Braced variable substitution ─────────────────────────────────────

    fn read_braced_var_sub(&mut self, left: &Token, d_quoted: bool) -> ParseResult<WordPart> {
        let left_spid = left.span_id;
        let t1 = self.lex(LexMode::VSub1);

        let (prefix_op, name_tok) = match t1.id {
            Id::VSubPound | Id::VSubBang => {
                let t2 = self.lex(LexMode::VSub1);
                if t2.id == Id::RightDollarBrace {
                    // `${#}` / `${!}`: the special variable itself.
                    return Ok(WordPart::BracedVarSub {
                        token: t1,
                        prefix_op: None,
                        bracket_op: None,
                        suffix_op: None,
                        left_spid,
                        right_spid: t2.span_id,
                    });
                }
                (Some(t1.id), t2)
            }
            _ => (None, t1),
        };

        match name_tok.kind() {
            Kind::VSub => {}
            _ => {
                return Err(ParseError::at_token("Bad substitution", &name_tok));
            }
        }

        let mut bracket_op = None;
        let mut op_tok = self.lex(LexMode::VSub2);
        if op_tok.id == Id::VOp2LBracket {
            bracket_op = Some(self.read_bracket_op()?);
            op_tok = self.lex(LexMode::VSub2);
        }

        if op_tok.id == Id::RightDollarBrace {
            return Ok(WordPart::BracedVarSub {
                token: name_tok,
                prefix_op,
                bracket_op,
                suffix_op: None,
                left_spid,
                right_spid: op_tok.span_id,
            });
        }

        if prefix_op.is_some() {
            return Err(ParseError::at_token(
                "Expected } after length or indirect expansion",
                &op_tok,
            ));
        }

        let (suffix_op, right_spid) = self.read_suffix_op(op_tok, d_quoted)?;
        Ok(WordPart::BracedVarSub {
            token: name_tok,
            prefix_op,
            bracket_op,
            suffix_op: Some(Box::new(suffix_op)),
            left_spid,
            right_spid,
        })
    }

    fn read_suffix_op(&mut self, op_tok: Token, d_quoted: bool) -> ParseResult<(SuffixOp, SpanId)> {
        let arg_mode = if d_quoted {
            LexMode::VSubArgDq
        } else {
            LexMode::VSubArgUnquoted
        };

        match op_tok.kind() {
            Kind::VTest | Kind::VOp1 => {
                let (arg_word, term) = self.read_var_op_arg(arg_mode, d_quoted, false)?;
                if term.id != Id::RightDollarBrace {
                    return Err(ParseError::at_token("Expected } after operator", &term));
                }
                Ok((
                    SuffixOp::Unary {
                        op: op_tok,
                        arg_word,
                    },
                    term.span_id,
                ))
            }
            Kind::VOp0 => {
                let term = self.lex(LexMode::VSub2);
                if term.id != Id::RightDollarBrace {
                    return Err(ParseError::at_token("Expected } after operator", &term));
                }
                Ok((SuffixOp::Nullary(op_tok.id), term.span_id))
            }
            Kind::VOp2 => match op_tok.id {
                Id::VOp2Slash => self.read_pat_sub(op_tok, d_quoted, arg_mode),
                Id::VOp2Colon => self.read_slice(),
                _ => Err(ParseError::at_token("Bad substitution operator", &op_tok)),
            },
            _ => Err(ParseError::at_token("Bad substitution operator", &op_tok)),
        }
    }

    fn read_pat_sub(
        &mut self,
        slash_tok: Token,
        d_quoted: bool,
        arg_mode: LexMode,
    ) -> ParseResult<(SuffixOp, SpanId)> {
        let (first_pat, term) = self.read_var_op_arg(arg_mode, d_quoted, true)?;

        // `${x//pat/rep}`: an empty pattern ending at a slash means the
        // leading slash doubled the operator.
        let (do_all, pat, term) =
            if matches!(first_pat, Word::Empty) && term.id == Id::LitSlash {
                let (pat, term) = self.read_var_op_arg(arg_mode, d_quoted, true)?;
                (true, pat, term)
            } else {
                (false, first_pat, term)
            };

        match term.id {
            Id::RightDollarBrace => Ok((
                SuffixOp::PatSub(PatSub {
                    pat,
                    replace: None,
                    do_all,
                    slash_spid: slash_tok.span_id,
                }),
                term.span_id,
            )),
            Id::LitSlash => {
                let (replace, term) = self.read_var_op_arg(arg_mode, d_quoted, false)?;
                if term.id != Id::RightDollarBrace {
                    return Err(ParseError::at_token("Expected } after replacement", &term));
                }
                Ok((
                    SuffixOp::PatSub(PatSub {
                        pat,
                        replace: Some(replace),
                        do_all,
                        slash_spid: slash_tok.span_id,
                    }),
                    term.span_id,
                ))
            }
            _ => Err(ParseError::at_token("Expected } after pattern", &term)),
        }
    }

    fn read_slice(&mut self) -> ParseResult<(SuffixOp, SpanId)> {
        let mut begin = Vec::new();
        let mut length = Vec::new();
        let mut in_length = false;
        loop {
            let t = self.lex(LexMode::Arith);
            match t.id {
                Id::IgnoredSpace => {}
                Id::ArithColon if !in_length => in_length = true,
                Id::ArithRBrace => {
                    let mk = |tokens: Vec<Token>| {
                        (!tokens.is_empty()).then_some(ArithExpr { tokens })
                    };
                    return Ok((
                        SuffixOp::Slice {
                            begin: mk(begin),
                            length: mk(length),
                        },
                        t.span_id,
                    ));
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unexpected EOF in slice", &t));
                }
                Id::UnknownTok => {
                    return Err(ParseError::at_token("Invalid token in slice", &t));
                }
                _ => {
                    if in_length {
                        length.push(t);
                    } else {
                        begin.push(t);
                    }
                }
            }
        }
    }

    /// Read the argument word of a `${x op arg}` operator. Stops at `}`
    /// (always) and at `/` when requested; the terminator is returned.
    fn read_var_op_arg(
        &mut self,
        arg_mode: LexMode,
        d_quoted: bool,
        stop_at_slash: bool,
    ) -> ParseResult<(Word, Token)> {
        let mut parts: Vec<WordPart> = Vec::new();
        loop {
            let t = self.lex(arg_mode);
            match t.id {
                Id::RightDollarBrace => return Ok((word_or_empty(parts), t)),
                Id::LitSlash if stop_at_slash => return Ok((word_or_empty(parts), t)),
                Id::EofReal => {
                    return Err(ParseError::at_token(
                        "Unterminated ${ substitution",
                        &t,
                    ));
                }
                _ => {}
            }
            match t.kind() {
                Kind::Lit => match t.id {
                    Id::LitEscapedChar => parts.push(WordPart::EscapedLiteral(t)),
                    _ => parts.push(WordPart::Literal(t)),
                },
                Kind::VSub => parts.push(WordPart::SimpleVarSub(t)),
                Kind::Left => {
                    let part = self.read_left_part(&t, d_quoted)?;
                    parts.push(part);
                }
                Kind::ExtGlob => {
                    let part = self.read_ext_glob(t)?;
                    parts.push(part);
                }
                Kind::Ignored => {}
                _ => {
                    return Err(ParseError::at_token(
                        "Unexpected token in substitution argument",
                        &t,
                    ));
                }
            }
        }
    }

    fn read_bracket_op(&mut self) -> ParseResult<BracketOp> {
        let mut first = self.lex(LexMode::Arith);
        while first.id == Id::IgnoredSpace {
            first = self.lex(LexMode::Arith);
        }

        if first.id == Id::ArithAt || first.id == Id::ArithStar {
            let close = self.lex(LexMode::Arith);
            if close.id != Id::ArithRBracket {
                return Err(ParseError::at_token("Expected ] after @ or *", &close));
            }
            let id = if first.id == Id::ArithAt {
                Id::VSubAt
            } else {
                Id::VSubStar
            };
            return Ok(BracketOp::WholeArray(id));
        }

        let mut tokens = Vec::new();
        let mut t = first;
        let mut depth = 0usize;
        loop {
            match t.id {
                Id::IgnoredSpace => {}
                Id::ArithLBracket => {
                    depth += 1;
                    tokens.push(t.clone());
                }
                Id::ArithRBracket if depth > 0 => {
                    depth -= 1;
                    tokens.push(t.clone());
                }
                Id::ArithRBracket => {
                    return Ok(BracketOp::ArrayIndex(ArithExpr { tokens }));
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated array index", &t));
                }
                Id::UnknownTok => {
                    return Err(ParseError::at_token("Invalid token in array index", &t));
                }
                _ => tokens.push(t.clone()),
            }
            t = self.lex(LexMode::Arith);
        }
    }

    // ── Command, process, and arithmetic substitution ────────────────────

    fn read_command_sub(&mut self, left: &Token) -> ParseResult<WordPart> {
        self.lexer
            .borrow_mut()
            .push_hint(Id::OpRParen, Id::EofRParen);
        let mut cp = self
            .ctx
            .make_parser_for_command_sub(Rc::clone(&self.lexer), Id::EofRParen);
        let (command, right_spid) = cp.parse_command_sub()?;
        Ok(WordPart::CommandSub {
            left_token: left.clone(),
            command: Box::new(command),
            right_spid,
        })
    }

    fn read_backtick_sub(&mut self, left: &Token) -> ParseResult<WordPart> {
        self.lexer
            .borrow_mut()
            .push_hint(Id::LeftBacktick, Id::EofBacktick);

        let mut buf = String::new();
        let right_spid;
        loop {
            let t = self.lex(LexMode::Backtick);
            match t.id {
                Id::EofBacktick => {
                    right_spid = t.span_id;
                    break;
                }
                Id::LitEscapedChar => {
                    // `\``, `\$`, and `\\` lose the backslash.
                    if let Some(c) = t.val.chars().nth(1) {
                        buf.push(c);
                    }
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated backquote", left));
                }
                _ => buf.push_str(&t.val),
            }
        }

        // Re-parse the collected text as a command, attributed to the
        // backtick location.
        self.ctx.arena.borrow_mut().push_source(SourceKind::Backticks {
            start_span: left.span_id,
        });
        let reader: Rc<RefCell<dyn crate::reader::LineReader>> = Rc::new(RefCell::new(
            StringLineReader::new(&buf, Rc::clone(&self.ctx.arena)),
        ));
        let mut cp = self.ctx.make_parser(reader);
        let result = cp.parse_command_sub();
        self.ctx.arena.borrow_mut().pop_source();
        let (command, _) = result?;

        Ok(WordPart::CommandSub {
            left_token: left.clone(),
            command: Box::new(command),
            right_spid,
        })
    }

    fn read_arith_sub(&mut self, left: &Token) -> ParseResult<WordPart> {
        let (anode, right_spid) = self.read_arith_region()?;
        Ok(WordPart::ArithSub {
            anode,
            left_spid: left.span_id,
            right_spid,
        })
    }

    /// Collect arithmetic tokens until the closing `))`.
    fn read_arith_region(&mut self) -> ParseResult<(ArithExpr, SpanId)> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let t = self.lex(LexMode::Arith);
            match t.id {
                Id::IgnoredSpace => {}
                Id::ArithLParen => {
                    depth += 1;
                    tokens.push(t);
                }
                Id::ArithRParen if depth > 0 => {
                    depth -= 1;
                    tokens.push(t);
                }
                Id::ArithRParen => {
                    loop {
                        let t2 = self.lex(LexMode::Arith);
                        match t2.id {
                            Id::IgnoredSpace => {}
                            Id::ArithRParen => {
                                return Ok((ArithExpr { tokens }, t2.span_id));
                            }
                            _ => {
                                return Err(ParseError::at_token(
                                    "Expected )) to end arithmetic",
                                    &t2,
                                ));
                            }
                        }
                    }
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated arithmetic", &t));
                }
                Id::UnknownTok => {
                    return Err(ParseError::at_token("Invalid token in arithmetic", &t));
                }
                _ => tokens.push(t),
            }
        }
    }

    /// Read the head of `for (( init; cond; update ))`.
    pub fn read_for_expression(
        &mut self,
    ) -> ParseResult<(Option<ArithExpr>, Option<ArithExpr>, Option<ArithExpr>)> {
        let mut sections: [Vec<Token>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut idx = 0usize;
        let mut depth = 0usize;
        loop {
            let t = self.lex(LexMode::Arith);
            match t.id {
                Id::IgnoredSpace => {}
                Id::ArithSemi if depth == 0 => {
                    idx += 1;
                    if idx > 2 {
                        return Err(ParseError::at_token(
                            "Too many sections in for expression",
                            &t,
                        ));
                    }
                }
                Id::ArithLParen => {
                    depth += 1;
                    sections[idx].push(t);
                }
                Id::ArithRParen if depth > 0 => {
                    depth -= 1;
                    sections[idx].push(t);
                }
                Id::ArithRParen => {
                    let t2 = self.next_significant_arith()?;
                    if t2.id != Id::ArithRParen {
                        return Err(ParseError::at_token(
                            "Expected )) to end for expression",
                            &t2,
                        ));
                    }
                    let [init, cond, update] = sections;
                    let mk = |tokens: Vec<Token>| {
                        (!tokens.is_empty()).then_some(ArithExpr { tokens })
                    };
                    return Ok((mk(init), mk(cond), mk(update)));
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated for expression", &t));
                }
                Id::UnknownTok => {
                    return Err(ParseError::at_token("Invalid token in for expression", &t));
                }
                _ => sections[idx].push(t),
            }
        }
    }

    fn next_significant_arith(&mut self) -> ParseResult<Token> {
        loop {
            let t = self.lex(LexMode::Arith);
            if t.id != Id::IgnoredSpace {
                return Ok(t);
            }
        }
    }

    /// Read the body of a standalone `(( ... ))` command.
    pub fn read_dparen(&mut self) -> ParseResult<(ArithExpr, SpanId)> {
        self.read_arith_region()
    }

    // ── Array literals and indexed-assignment LHS ────────────────────────

    fn read_array_literal(&mut self) -> ParseResult<WordPart> {
        // Consume up to and including the `(` the lookahead saw.
        let left = loop {
            let t = self.lex(LexMode::ShCommand);
            match t.id {
                Id::WsSpace => {}
                Id::OpLParen => break t,
                _ => {
                    return Err(ParseError::at_token("Expected ( after =", &t));
                }
            }
        };

        self.lexer
            .borrow_mut()
            .push_hint(Id::OpRParen, Id::RightArrayLiteral);
        self.advance(LexMode::ShCommand);

        let mut words = Vec::new();
        loop {
            let w = self.read_word(LexMode::ShCommand)?;
            match w {
                Word::Token(t) => match t.id {
                    Id::RightArrayLiteral => break,
                    Id::OpNewline => {}
                    _ if t.kind() == Kind::Eof => {
                        return Err(ParseError::at_token("Unterminated array literal", &left));
                    }
                    _ => {
                        return Err(ParseError::at_token(
                            "Unexpected token in array literal",
                            &t,
                        ));
                    }
                },
                w => words.push(w),
            }
        }
        Ok(WordPart::ArrayLiteral { left, words })
    }

    /// `a[` was just read; collect the index tokens and the `]=` close as
    /// literal parts so the word keeps its exact source bytes.
    fn read_array_lhs(&mut self, parts: &mut Vec<WordPart>, open: Token) -> ParseResult<()> {
        parts.push(WordPart::Literal(open.clone()));
        let mut depth = 0usize;
        loop {
            let t = self.lex(LexMode::Arith);
            match t.id {
                Id::LitArrayLhsClose if depth == 0 => {
                    parts.push(WordPart::Literal(t));
                    return Ok(());
                }
                Id::ArithLBracket => {
                    depth += 1;
                    parts.push(WordPart::Literal(t));
                }
                Id::ArithRBracket if depth > 0 => {
                    depth -= 1;
                    parts.push(WordPart::Literal(t));
                }
                Id::ArithRBracket => {
                    return Err(ParseError::at_token("Expected ]= after subscript", &t));
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated subscript", &open));
                }
                Id::UnknownTok => {
                    return Err(ParseError::at_token("Invalid token in subscript", &t));
                }
                _ => parts.push(WordPart::Literal(t)),
            }
        }
    }

    // ── Extended globs ───────────────────────────────────────────────────

    fn read_ext_glob(&mut self, op: Token) -> ParseResult<WordPart> {
        let mut arms = Vec::new();
        let mut cur_parts: Vec<WordPart> = Vec::new();
        loop {
            let t = self.lex(LexMode::ExtGlob);
            match t.id {
                Id::OpPipe => {
                    arms.push(word_or_empty(std::mem::take(&mut cur_parts)));
                    continue;
                }
                Id::RightExtGlob => {
                    arms.push(word_or_empty(cur_parts));
                    return Ok(WordPart::ExtGlob {
                        op,
                        arms,
                        right_spid: t.span_id,
                    });
                }
                Id::EofReal => {
                    return Err(ParseError::at_token("Unterminated extended glob", &op));
                }
                _ => {}
            }
            match t.kind() {
                Kind::Lit => match t.id {
                    Id::LitEscapedChar => cur_parts.push(WordPart::EscapedLiteral(t)),
                    _ => cur_parts.push(WordPart::Literal(t)),
                },
                Kind::VSub => cur_parts.push(WordPart::SimpleVarSub(t)),
                Kind::Left => {
                    let part = self.read_left_part(&t, false)?;
                    cur_parts.push(part);
                }
                Kind::ExtGlob => {
                    let part = self.read_ext_glob(t)?;
                    cur_parts.push(part);
                }
                Kind::Ignored => {}
                _ => {
                    return Err(ParseError::at_token("Unexpected token in extended glob", &t));
                }
            }
        }
    }

    // ── Expression-language entry points ─────────────────────────────────

    /// `var NAME = rhs...`, reduced form of the expression sub-language.
    ///
    /// Returns the node plus the terminator token, which the command
    /// parser re-injects as its cursor.
    pub fn parse_var(&mut self, kw_token: Token) -> ParseResult<(Command, Token)> {
        self.parse_oil_assign(kw_token)
    }

    /// `setvar NAME = rhs...`.
    pub fn parse_set_var(&mut self, kw_token: Token) -> ParseResult<(Command, Token)> {
        self.parse_oil_assign(kw_token)
    }

    fn parse_oil_assign(&mut self, kw_token: Token) -> ParseResult<(Command, Token)> {
        let name_word = self.read_word(LexMode::ShCommand)?;
        let (name, mut rhs) = match crate::word::detect_assignment(&name_word) {
            // `var x=1` arrives as one word.
            (Some(left), None, offset) => {
                let name = left.val.trim_end_matches(['=', '+']).to_string();
                let mut rhs = Vec::new();
                if let Word::Compound(c) = &name_word {
                    if offset < c.parts.len() {
                        rhs.push(Word::Compound(CompoundWord::new(
                            c.parts[offset..].to_vec(),
                        )));
                    }
                }
                (name, rhs)
            }
            _ => {
                let (ok, name, quoted) = crate::word::static_eval(&name_word);
                if !ok || quoted || !crate::token::is_valid_var_name(&name) {
                    return Err(ParseError::at_word("Invalid variable name", &name_word));
                }
                (name, Vec::new())
            }
        };

        // Optional `=` then the rest of the line.
        let terminator;
        loop {
            let w = self.read_word(LexMode::ShCommand)?;
            match &w {
                Word::Token(t)
                    if t.id == Id::OpNewline
                        || t.id == Id::OpSemi
                        || t.kind() == Kind::Eof =>
                {
                    terminator = t.clone();
                    break;
                }
                Word::Compound(_) => {
                    let (ok, s, _) = crate::word::static_eval(&w);
                    if ok && s == "=" && rhs.is_empty() {
                        continue;
                    }
                    rhs.push(w);
                }
                _ => rhs.push(w),
            }
        }

        Ok((
            Command::OilAssign {
                keyword: kw_token,
                name,
                rhs,
            },
            terminator,
        ))
    }

    /// Completion-plugin entry: read one word in command mode.
    pub fn read_for_plugin(&mut self) -> ParseResult<Word> {
        self.read_word(LexMode::ShCommand)
    }
}

#[cfg(test)]
#[path = "word_parse_tests.rs"]
mod tests;

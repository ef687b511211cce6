// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Free functions over the word sum type.
//!
//! The parsers dispatch on words through these rather than methods, so the
//! AST stays plain data.

use crate::arena::SpanId;
use crate::ast::{CompoundWord, Word, WordPart};
use crate::token::{Id, Kind, Token};

/// Leftmost span of a word part.
pub fn left_most_span_for_part(part: &WordPart) -> SpanId {
    match part {
        WordPart::Literal(t) | WordPart::EscapedLiteral(t) => t.span_id,
        WordPart::SingleQuoted { left, .. } => left.span_id,
        WordPart::DoubleQuoted { left_spid, .. } => *left_spid,
        WordPart::SimpleVarSub(t) => t.span_id,
        WordPart::BracedVarSub { left_spid, .. } => *left_spid,
        WordPart::CommandSub { left_token, .. } => left_token.span_id,
        WordPart::ArithSub { left_spid, .. } => *left_spid,
        WordPart::TildeSub(t) => t.span_id,
        WordPart::ExtGlob { op, .. } => op.span_id,
        WordPart::ArrayLiteral { left, .. } => left.span_id,
        WordPart::BracedTuple(words) => words
            .first()
            .map(left_most_span_for_word)
            .unwrap_or(SpanId::SENTINEL),
    }
}

fn right_most_span_for_part(part: &WordPart) -> SpanId {
    match part {
        WordPart::Literal(t) | WordPart::EscapedLiteral(t) => t.span_id,
        WordPart::SingleQuoted {
            left,
            tokens,
            right_spid,
        } => {
            if right_spid.is_sentinel() {
                tokens.last().map(|t| t.span_id).unwrap_or(left.span_id)
            } else {
                *right_spid
            }
        }
        WordPart::DoubleQuoted { right_spid, .. } => *right_spid,
        WordPart::SimpleVarSub(t) => t.span_id,
        WordPart::BracedVarSub { right_spid, .. } => *right_spid,
        WordPart::CommandSub { right_spid, .. } => *right_spid,
        WordPart::ArithSub { right_spid, .. } => *right_spid,
        WordPart::TildeSub(t) => t.span_id,
        WordPart::ExtGlob { right_spid, .. } => *right_spid,
        WordPart::ArrayLiteral { left, words } => words
            .last()
            .map(right_most_span_for_word)
            .unwrap_or(left.span_id),
        WordPart::BracedTuple(words) => words
            .last()
            .map(right_most_span_for_word)
            .unwrap_or(SpanId::SENTINEL),
    }
}

/// Leftmost span of a word, used for error blame and `arg_vec.spids`.
pub fn left_most_span_for_word(w: &Word) -> SpanId {
    match w {
        Word::Token(t) => t.span_id,
        Word::Compound(c) => c
            .parts
            .first()
            .map(left_most_span_for_part)
            .unwrap_or(SpanId::SENTINEL),
        Word::Empty => SpanId::SENTINEL,
    }
}

pub fn right_most_span_for_word(w: &Word) -> SpanId {
    match w {
        Word::Token(t) => t.span_id,
        Word::Compound(c) => c
            .parts
            .last()
            .map(right_most_span_for_part)
            .unwrap_or(SpanId::SENTINEL),
        Word::Empty => SpanId::SENTINEL,
    }
}

fn static_eval_part(part: &WordPart) -> Option<(String, bool)> {
    match part {
        WordPart::Literal(t) => match t.kind() {
            Kind::Lit | Kind::Kw | Kind::Assign | Kind::ControlFlow => {
                Some((t.val.clone(), false))
            }
            _ => None,
        },
        WordPart::EscapedLiteral(t) => {
            let s = t.val.strip_prefix('\\').unwrap_or(&t.val);
            Some((s.to_string(), true))
        }
        WordPart::SingleQuoted { tokens, .. } => {
            let s: String = tokens.iter().map(|t| t.val.as_str()).collect();
            Some((s, true))
        }
        WordPart::DoubleQuoted { parts, .. } => {
            let mut out = String::new();
            for p in parts {
                let (s, _) = static_eval_part(p)?;
                out.push_str(&s);
            }
            Some((out, true))
        }
        _ => None,
    }
}

/// Evaluate a word at parse time, without any runtime context.
///
/// Returns `(ok, value, any_part_quoted)`. Used for here-doc delimiters,
/// alias heads, assignment keywords flags, and loop variable names.
pub fn static_eval(w: &Word) -> (bool, String, bool) {
    match w {
        Word::Empty => (true, String::new(), false),
        Word::Token(_) => (false, String::new(), false),
        Word::Compound(c) => {
            let mut out = String::new();
            let mut quoted = false;
            for part in &c.parts {
                match static_eval_part(part) {
                    Some((s, q)) => {
                        out.push_str(&s);
                        quoted = quoted || q;
                    }
                    None => return (false, String::new(), quoted),
                }
            }
            (true, out, quoted)
        }
    }
}

/// The id the command parser dispatches on.
///
/// Keywords only count when the word is exactly one literal part; `"if"` or
/// `i$x` are plain words.
pub fn command_id(w: &Word) -> Id {
    match w {
        Word::Token(t) => t.id,
        Word::Empty => Id::WordCompound,
        Word::Compound(c) => {
            if c.parts.len() != 1 {
                return Id::WordCompound;
            }
            let WordPart::Literal(tok) = &c.parts[0] else {
                return Id::WordCompound;
            };
            match tok.id {
                Id::LitLBrace | Id::LitRBrace | Id::LitDRightBracket | Id::LitCompDummy => tok.id,
                _ if tok.kind() == Kind::Kw => tok.id,
                _ => Id::WordCompound,
            }
        }
    }
}

/// The kind the command parser dispatches on. Every compound word is
/// `Kind::Word`, which is what lets `echo if` treat `if` as an argument.
pub fn command_kind(w: &Word) -> Kind {
    match w {
        Word::Token(t) => t.kind(),
        Word::Compound(_) | Word::Empty => Kind::Word,
    }
}

/// If the word is a single literal assignment or control-flow keyword,
/// return its kind and token.
pub fn keyword_token(w: &Word) -> Option<(Kind, Token)> {
    let Word::Compound(c) = w else { return None };
    if c.parts.len() != 1 {
        return None;
    }
    let WordPart::Literal(tok) = &c.parts[0] else {
        return None;
    };
    match tok.kind() {
        Kind::Assign | Kind::ControlFlow => Some((tok.kind(), tok.clone())),
        _ => None,
    }
}

/// The single literal token of a one-part word, e.g. the `var` keyword.
pub fn literal_token(w: &Word) -> Option<Token> {
    let Word::Compound(c) = w else { return None };
    if c.parts.len() != 1 {
        return None;
    }
    match &c.parts[0] {
        WordPart::Literal(tok) => Some(tok.clone()),
        _ => None,
    }
}

/// Replace a leading `~` / `~user` literal with a tilde substitution.
///
/// Returns `None` when the word doesn't start with a tilde.
pub fn tilde_detect(w: &Word) -> Option<Word> {
    let Word::Compound(c) = w else { return None };
    let WordPart::Literal(tok) = c.parts.first()? else {
        return None;
    };
    if tok.id != Id::LitTilde {
        return None;
    }
    let mut parts = vec![WordPart::TildeSub(tok.clone())];
    parts.extend(c.parts.iter().skip(1).cloned());
    Some(Word::Compound(CompoundWord::new(parts)))
}

pub fn tilde_detect_all(words: Vec<Word>) -> Vec<Word> {
    words
        .into_iter()
        .map(|w| tilde_detect(&w).unwrap_or(w))
        .collect()
}

/// Detect the assignment shape of a word.
///
/// Returns `(left_token, close_token, part_offset)`:
/// - `x=1` → `(Lit_VarLike, None, 1)`
/// - `a[i]=1` → `(Lit_ArrayLhsOpen, Some(Lit_ArrayLhsClose), parts after close)`
/// - anything else → `(None, None, 0)`
pub fn detect_assignment(w: &Word) -> (Option<Token>, Option<Token>, usize) {
    let Word::Compound(c) = w else {
        return (None, None, 0);
    };
    let Some(WordPart::Literal(tok0)) = c.parts.first() else {
        return (None, None, 0);
    };
    match tok0.id {
        Id::LitVarLike => (Some(tok0.clone()), None, 1),
        Id::LitArrayLhsOpen => {
            for (i, part) in c.parts.iter().enumerate().skip(1) {
                if let WordPart::Literal(t) = part {
                    if t.id == Id::LitArrayLhsClose {
                        return (Some(tok0.clone()), Some(t.clone()), i + 1);
                    }
                }
            }
            (None, None, 0)
        }
        _ => (None, None, 0),
    }
}

/// True if the word begins like `name=` or `name[`; used to keep `f=(...)`
/// from being parsed as a function definition.
pub fn is_var_like(w: &Word) -> bool {
    let Word::Compound(c) = w else { return false };
    matches!(
        c.parts.first(),
        Some(WordPart::Literal(t)) if t.id == Id::LitVarLike || t.id == Id::LitArrayLhsOpen
    )
}

pub fn has_array_part(w: &Word) -> bool {
    let Word::Compound(c) = w else { return false };
    c.parts
        .iter()
        .any(|p| matches!(p, WordPart::ArrayLiteral { .. }))
}

/// Statically evaluate a word as a function name.
pub fn as_func_name(w: &Word) -> Option<String> {
    let (ok, s, _quoted) = static_eval(w);
    (ok && !s.is_empty()).then_some(s)
}

#[cfg(test)]
#[path = "word_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Brace detection and expansion.
//!
//! Detection runs at parse time and only rewrites the word shape: `a{b,c}d`
//! becomes `[a, BracedTuple(b, c), d]`. Expansion to the cartesian product
//! happens at evaluation time, before any other word evaluation.

use crate::ast::{CompoundWord, Word, WordPart};
use crate::token::{Id, Token};

fn is_literal_with(part: &WordPart, id: Id) -> bool {
    matches!(part, WordPart::Literal(t) if t.id == id)
}

fn is_comma(part: &WordPart) -> bool {
    matches!(part, WordPart::Literal(t) if t.val == ",")
}

/// `{-3..4}`-style numeric range inside one literal token.
fn range_alternatives(parts: &[WordPart]) -> Option<Vec<Word>> {
    if parts.len() != 1 {
        return None;
    }
    let WordPart::Literal(tok) = &parts[0] else {
        return None;
    };
    let (lo, hi) = tok.val.split_once("..")?;
    let lo: i64 = lo.parse().ok()?;
    let hi: i64 = hi.parse().ok()?;
    if (lo - hi).abs() > 10_000 {
        return None;
    }
    let step: i64 = if lo <= hi { 1 } else { -1 };
    let mut words = Vec::new();
    let mut n = lo;
    loop {
        let t = Token::new(Id::LitChars, n.to_string(), tok.span_id);
        words.push(Word::Compound(CompoundWord::new(vec![WordPart::Literal(
            t,
        )])));
        if n == hi {
            break;
        }
        n += step;
    }
    Some(words)
}

fn alternative_word(parts: Vec<WordPart>) -> Word {
    if parts.is_empty() {
        Word::Empty
    } else {
        Word::Compound(CompoundWord::new(parts))
    }
}

/// Rewrite the first balanced `{...}` group (and, recursively, any groups
/// after or inside it). Returns `None` when the parts contain no group.
fn detect_in_parts(parts: &[WordPart]) -> Option<Vec<WordPart>> {
    let open = parts
        .iter()
        .position(|p| is_literal_with(p, Id::LitLBrace))?;

    // Find the matching close and top-level commas.
    let mut depth = 1usize;
    let mut commas = Vec::new();
    let mut close = None;
    for (i, p) in parts.iter().enumerate().skip(open + 1) {
        if is_literal_with(p, Id::LitLBrace) {
            depth += 1;
        } else if is_literal_with(p, Id::LitRBrace) {
            depth -= 1;
            if depth == 0 {
                close = Some(i);
                break;
            }
        } else if depth == 1 && is_comma(p) {
            commas.push(i);
        }
    }

    let close = match close {
        Some(i) => i,
        None => {
            // Unbalanced `{`: leave it alone, but keep looking to the right.
            let rest = detect_in_parts(&parts[open + 1..])?;
            let mut out = parts[..=open].to_vec();
            out.extend(rest);
            return Some(out);
        }
    };

    let inner = &parts[open + 1..close];
    let alternatives: Option<Vec<Word>> = if commas.is_empty() {
        range_alternatives(inner)
    } else {
        let mut alts = Vec::new();
        let mut start = open + 1;
        for &comma in &commas {
            let alt = parts[start..comma].to_vec();
            let alt = detect_in_parts(&alt).unwrap_or(alt);
            alts.push(alternative_word(alt));
            start = comma + 1;
        }
        let last = parts[start..close].to_vec();
        let last = detect_in_parts(&last).unwrap_or(last);
        alts.push(alternative_word(last));
        Some(alts)
    };

    let suffix = parts[close + 1..].to_vec();
    let suffix = detect_in_parts(&suffix).unwrap_or(suffix);

    match alternatives {
        Some(alts) => {
            let mut out = parts[..open].to_vec();
            out.push(WordPart::BracedTuple(alts));
            out.extend(suffix);
            Some(out)
        }
        None => {
            // `{}` or `{single}`: not an alternation in shell.
            let mut out = parts[..=close].to_vec();
            out.extend(suffix);
            Some(out)
        }
    }
}

/// Detect brace groups in one word.
pub fn brace_detect(w: &Word) -> Option<Word> {
    let Word::Compound(c) = w else { return None };
    let parts = detect_in_parts(&c.parts)?;
    Some(Word::Compound(CompoundWord::new(parts)))
}

/// Detect brace groups across a word list. Words without braces pass
/// through untouched.
pub fn brace_detect_all(words: Vec<Word>) -> Vec<Word> {
    words
        .into_iter()
        .map(|w| brace_detect(&w).unwrap_or(w))
        .collect()
}

fn expand_one(w: &Word) -> Vec<Word> {
    let Word::Compound(c) = w else {
        return vec![w.clone()];
    };
    let tuple_at = c
        .parts
        .iter()
        .position(|p| matches!(p, WordPart::BracedTuple(_)));
    let Some(i) = tuple_at else {
        return vec![w.clone()];
    };
    let WordPart::BracedTuple(alts) = &c.parts[i] else {
        return vec![w.clone()];
    };

    let mut out = Vec::new();
    for alt in alts {
        let mut parts = c.parts[..i].to_vec();
        match alt {
            Word::Compound(ac) => parts.extend(ac.parts.iter().cloned()),
            Word::Empty | Word::Token(_) => {}
        }
        parts.extend(c.parts[i + 1..].iter().cloned());
        let candidate = alternative_word(parts);
        out.extend(expand_one(&candidate));
    }
    out
}

/// Expand brace groups to the cartesian product of alternatives. Words
/// that skipped parse-time detection (e.g. array literal elements) are
/// detected here first.
pub fn brace_expand_words(words: &[Word]) -> Vec<Word> {
    let mut out = Vec::new();
    for w in words {
        match brace_detect(w) {
            Some(detected) => out.extend(expand_one(&detected)),
            None => out.extend(expand_one(w)),
        }
    }
    out
}

#[cfg(test)]
#[path = "braces_tests.rs"]
mod tests;

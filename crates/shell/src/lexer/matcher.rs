// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Longest-match rule interpreter over the per-mode tables.
//!
//! Constant rules are matched with `starts_with`; regex rules are compiled
//! once, left-anchored. A generated DFA could replace this interpreter as
//! long as the longest-match-then-priority contract holds.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::Id;

use super::def::{rules_for, Pat};
use super::LexMode;

enum Matcher {
    Const(&'static str),
    Re(Regex),
}

struct CompiledRule {
    matcher: Matcher,
    id: Id,
}

fn compile_mode(mode: LexMode) -> Vec<CompiledRule> {
    rules_for(mode)
        .into_iter()
        .filter_map(|rule| {
            let matcher = match rule.pat {
                Pat::Const(s) => Matcher::Const(s),
                Pat::Regex(p) => {
                    // Left-anchor so matching starts exactly at `pos`.
                    let anchored = format!("\\A(?:{})", p);
                    Matcher::Re(Regex::new(&anchored).ok()?)
                }
            };
            Some(CompiledRule {
                matcher,
                id: rule.id,
            })
        })
        .collect()
}

static TABLES: Lazy<Vec<Vec<CompiledRule>>> =
    Lazy::new(|| LexMode::ALL.iter().map(|m| compile_mode(*m)).collect());

/// Match one token at `(mode, line, pos)`.
///
/// Returns `(id, end_pos)`. At end of line this yields the `EolTok`
/// sentinel without advancing, mirroring re2c's EOL handling.
pub(crate) fn one_token(mode: LexMode, line: &str, pos: usize) -> (Id, usize) {
    if pos >= line.len() {
        return (Id::EolTok, pos);
    }
    let rest = &line[pos..];
    let rules = &TABLES[mode as usize];

    let mut best_len = 0usize;
    let mut best_id = None;
    for rule in rules {
        let len = match &rule.matcher {
            Matcher::Const(s) => {
                if rest.starts_with(s) {
                    s.len()
                } else {
                    continue;
                }
            }
            Matcher::Re(re) => match re.find(rest) {
                Some(m) => m.end(),
                None => continue,
            },
        };
        // Strictly longer wins; ties keep the earlier rule.
        if len > best_len {
            best_len = len;
            best_id = Some(rule.id);
        }
    }

    match best_id {
        Some(id) => (id, pos + best_len),
        None => {
            // No rule matched (restricted modes have no catch-all for every
            // byte). Consume one char as Unknown so the caller can report it.
            let ch_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            (Id::UnknownTok, pos + ch_len)
        }
    }
}

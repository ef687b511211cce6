// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::token::Id;

use super::{lexer_for, LexMode};

fn read_ids(source: &str, mode: LexMode, n: usize) -> Vec<(Id, String)> {
    let (mut lexer, _arena) = lexer_for(source);
    (0..n)
        .map(|_| {
            let t = lexer.read(mode);
            (t.id, t.val)
        })
        .collect()
}

#[test]
fn double_quote_mode_splits_on_substitutions() {
    let toks = read_ids("ab$x\\\"c\"", LexMode::Dq, 4);
    assert_eq!(
        toks,
        vec![
            (Id::LitChars, "ab".to_string()),
            (Id::VSubDollarName, "$x".to_string()),
            (Id::LitEscapedChar, "\\\"".to_string()),
            (Id::LitChars, "c".to_string()),
        ]
    );
}

#[test]
fn double_quote_mode_ends_at_quote() {
    let toks = read_ids("\"", LexMode::Dq, 1);
    assert_eq!(toks[0].0, Id::RightDoubleQuote);
}

#[test]
fn single_quote_mode_is_all_literal() {
    let toks = read_ids("a$b\\n'", LexMode::Sq, 2);
    assert_eq!(toks[0], (Id::LitChars, "a$b\\n".to_string()));
    assert_eq!(toks[1].0, Id::RightSingleQuote);
}

#[test]
fn dollar_sq_mode_lexes_c_escapes() {
    let toks = read_ids(r"a\n\x41\101\u00e9'", LexMode::DollarSq, 5);
    assert_eq!(
        toks,
        vec![
            (Id::CharLiterals, "a".to_string()),
            (Id::CharOneChar, r"\n".to_string()),
            (Id::CharHex, r"\x41".to_string()),
            (Id::CharOctal, r"\101".to_string()),
            (Id::CharUnicode4, r"\u00e9".to_string()),
        ]
    );
}

#[test]
fn vsub_mode_names_and_specials() {
    assert_eq!(
        read_ids("foo}", LexMode::VSub1, 2),
        vec![
            (Id::VSubName, "foo".to_string()),
            (Id::RightDollarBrace, "}".to_string()),
        ]
    );
    assert_eq!(read_ids("#", LexMode::VSub1, 1)[0].0, Id::VSubPound);
    assert_eq!(read_ids("11", LexMode::VSub1, 1)[0].0, Id::VSubNumber);
}

#[test]
fn vsub_op_mode_prefers_longest_operator() {
    assert_eq!(read_ids(":-d", LexMode::VSub2, 1)[0].0, Id::VTestColonHyphen);
    assert_eq!(read_ids(":3", LexMode::VSub2, 1)[0].0, Id::VOp2Colon);
    assert_eq!(read_ids("##p", LexMode::VSub2, 1)[0].0, Id::VOp1DPound);
    assert_eq!(read_ids("#p", LexMode::VSub2, 1)[0].0, Id::VOp1Pound);
    assert_eq!(read_ids("//", LexMode::VSub2, 1)[0].0, Id::VOp2Slash);
    assert_eq!(read_ids("@Q}", LexMode::VSub2, 1)[0].0, Id::VOp0Q);
}

#[test]
fn arith_mode_tokens() {
    let toks = read_ids("x + 42*y", LexMode::Arith, 6);
    let ids: Vec<Id> = toks.iter().map(|(i, _)| *i).collect();
    assert_eq!(
        ids,
        vec![
            Id::LitArithVarLike,
            Id::IgnoredSpace,
            Id::ArithPlus,
            Id::IgnoredSpace,
            Id::LitDigits,
            Id::ArithStar,
        ]
    );
}

#[test]
fn arith_mode_array_close_vs_assign_close() {
    assert_eq!(read_ids("]=v", LexMode::Arith, 1)[0].0, Id::LitArrayLhsClose);
    assert_eq!(read_ids("]+=v", LexMode::Arith, 1)[0].0, Id::LitArrayLhsClose);
    assert_eq!(read_ids("]}", LexMode::Arith, 1)[0].0, Id::ArithRBracket);
}

#[test]
fn backtick_mode_escapes() {
    let toks = read_ids(r"echo \` \\ `", LexMode::Backtick, 5);
    assert_eq!(toks[0], (Id::LitChars, "echo ".to_string()));
    assert_eq!(toks[1], (Id::LitEscapedChar, r"\`".to_string()));
    assert_eq!(toks[2], (Id::LitChars, " ".to_string()));
    assert_eq!(toks[3], (Id::LitEscapedChar, r"\\".to_string()));
    assert_eq!(toks[4], (Id::LitChars, " ".to_string()));
}

#[test]
fn ext_glob_mode_arms() {
    let toks = read_ids("foo|bar)", LexMode::ExtGlob, 4);
    assert_eq!(
        toks,
        vec![
            (Id::LitChars, "foo".to_string()),
            (Id::OpPipe, "|".to_string()),
            (Id::LitChars, "bar".to_string()),
            (Id::RightExtGlob, ")".to_string()),
        ]
    );
}

#[test]
fn comment_mode_swallows_to_end_of_line() {
    let toks = read_ids("rest of line\nx", LexMode::Comment, 2);
    assert_eq!(toks[0], (Id::IgnoredComment, "rest of line".to_string()));
    assert_eq!(toks[1].0, Id::OpNewline);
}

#[test]
fn mode_transitions_push_and_pop() {
    use crate::lexer::{mode_transition, ModeTransition};

    assert_eq!(
        mode_transition(LexMode::ShCommand, Id::LeftDoubleQuote),
        Some(ModeTransition::Push(LexMode::Dq))
    );
    assert_eq!(
        mode_transition(LexMode::Dq, Id::RightDoubleQuote),
        Some(ModeTransition::Pop)
    );
    assert_eq!(mode_transition(LexMode::Sq, Id::LitChars), None);
}

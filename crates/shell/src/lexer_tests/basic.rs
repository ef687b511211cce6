// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::token::Id;

lex_tests! {
    two_words: "echo hi\n" => [
        (Id::LitChars, "echo"),
        (Id::WsSpace, " "),
        (Id::LitChars, "hi"),
        (Id::OpNewline, "\n"),
    ],
    operators: "a && b || c\n" => [
        (Id::LitChars, "a"),
        (Id::WsSpace, " "),
        (Id::OpDAmp, "&&"),
        (Id::WsSpace, " "),
        (Id::LitChars, "b"),
        (Id::WsSpace, " "),
        (Id::OpDPipe, "||"),
        (Id::WsSpace, " "),
        (Id::LitChars, "c"),
        (Id::OpNewline, "\n"),
    ],
    pipe_amp_is_one_token: "a |& b" => [
        (Id::LitChars, "a"),
        (Id::WsSpace, " "),
        (Id::OpPipeAmp, "|&"),
        (Id::WsSpace, " "),
        (Id::LitChars, "b"),
    ],
    descriptor_redirect: "2>err" => [
        (Id::RedirGreat, "2>"),
        (Id::LitChars, "err"),
    ],
    here_doc_strip: "<<-EOF" => [
        (Id::RedirDLessDash, "<<-"),
        (Id::LitChars, "EOF"),
    ],
    here_string: "<<<word" => [
        (Id::RedirTLess, "<<<"),
        (Id::LitChars, "word"),
    ],
    keyword_exact: "if" => [(Id::KwIf, "if")],
    keyword_prefix_is_literal: "iffy" => [(Id::LitChars, "iffy")],
    assignment_word: "x=1" => [
        (Id::LitVarLike, "x="),
        (Id::LitChars, "1"),
    ],
    append_assignment: "x+=1" => [
        (Id::LitVarLike, "x+="),
        (Id::LitChars, "1"),
    ],
    var_sub: "$foo" => [(Id::VSubDollarName, "$foo")],
    positional: "$1" => [(Id::VSubNumber, "$1")],
    special_vars: "$? $#" => [
        (Id::VSubQMark, "$?"),
        (Id::WsSpace, " "),
        (Id::VSubPound, "$#"),
    ],
    braced_sub_opener: "${x}" => [
        (Id::LeftDollarBrace, "${"),
        // Rest is lexed in VSub1 mode by the word parser; here ShCommand
        // keeps going, so only check the opener's longest-match behavior.
        (Id::LitChars, "x"),
        (Id::LitRBrace, "}"),
    ],
    arith_sub_beats_command_sub: "$((" => [(Id::LeftDollarDParen, "$((")],
    lone_dollar: "$ x" => [
        (Id::LitOther, "$"),
        (Id::WsSpace, " "),
        (Id::LitChars, "x"),
    ],
    escaped_char: r"\;" => [(Id::LitEscapedChar, r"\;")],
    tilde_user: "~bob/src" => [
        (Id::LitTilde, "~bob"),
        (Id::LitChars, "/src"),
    ],
    comment_char: "# hi" => [
        (Id::LitPound, "#"),
        (Id::WsSpace, " "),
        (Id::LitChars, "hi"),
    ],
    array_lhs: "a[0]=x" => [
        (Id::LitArrayLhsOpen, "a["),
        // Index lexing continues in Arith mode under the word parser.
        (Id::LitChars, "0"),
        (Id::LitOther, "]"),
        (Id::LitOther, "="),
        (Id::LitChars, "x"),
    ],
}

#[test]
fn line_continuation_is_skipped() {
    let (mut lexer, _arena) = super::lexer_for("echo \\\nhi\n");
    let ids: Vec<_> = std::iter::from_fn(|| {
        let t = lexer.read(super::LexMode::ShCommand);
        (t.id != crate::token::Id::EofReal).then_some(t.id)
    })
    .collect();
    assert_eq!(
        ids,
        vec![Id::LitChars, Id::WsSpace, Id::LitChars, Id::OpNewline]
    );
}

#[test]
fn eof_token_carries_real_span() {
    let (mut lexer, _arena) = super::lexer_for("x");
    let word = lexer.read(super::LexMode::ShCommand);
    assert_eq!(word.id, Id::LitChars);
    let eof = lexer.read(super::LexMode::ShCommand);
    assert_eq!(eof.id, Id::EofReal);
    assert!(!eof.span_id.is_sentinel());
}

#[test]
fn comp_dummy_emitted_once_before_eof() {
    let (mut lexer, _arena) = super::lexer_for("x");
    lexer.emit_comp_dummy();
    let _word = lexer.read(super::LexMode::ShCommand);
    assert_eq!(lexer.read(super::LexMode::ShCommand).id, Id::LitCompDummy);
    assert_eq!(lexer.read(super::LexMode::ShCommand).id, Id::EofReal);
}

#[test]
fn spans_are_monotonic_and_non_overlapping() {
    let (mut lexer, arena) = super::lexer_for("echo one two\n");
    let mut last_end = 0;
    loop {
        let t = lexer.read(super::LexMode::ShCommand);
        if t.id == Id::EofReal {
            break;
        }
        let span = arena.borrow().span(t.span_id);
        assert!(span.col as usize >= last_end, "overlapping span for {}", t);
        last_end = span.col as usize + span.length as usize;
    }
}

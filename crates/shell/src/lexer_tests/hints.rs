// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::token::Id;

use super::{lexer_for, LexMode};

#[test]
fn hint_translates_rparen_once() {
    let (mut lexer, _arena) = lexer_for("a) b)");
    lexer.push_hint(Id::OpRParen, Id::RightSubshell);

    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::LitChars);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::RightSubshell);
    // The hint popped; the second `)` is a plain operator again.
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::WsSpace);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::LitChars);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::OpRParen);
}

#[test]
fn hints_nest_lifo() {
    let (mut lexer, _arena) = lexer_for("))");
    lexer.push_hint(Id::OpRParen, Id::RightSubshell);
    lexer.push_hint(Id::OpRParen, Id::RightCasePat);

    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::RightCasePat);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::RightSubshell);
}

#[test]
fn hint_ignores_non_matching_tokens() {
    let (mut lexer, _arena) = lexer_for("x y)");
    lexer.push_hint(Id::OpRParen, Id::RightFuncDef);

    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::LitChars);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::WsSpace);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::LitChars);
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::RightFuncDef);
}

#[test]
fn backtick_closes_via_hint() {
    let (mut lexer, _arena) = lexer_for("ls`");
    lexer.push_hint(Id::LeftBacktick, Id::EofBacktick);

    assert_eq!(lexer.read(LexMode::Backtick).id, Id::LitChars);
    assert_eq!(lexer.read(LexMode::Backtick).id, Id::EofBacktick);
}

#[test]
fn maybe_unread_one_reuses_last_span() {
    let (mut lexer, _arena) = lexer_for("x(");
    let _name = lexer.read(LexMode::ShCommand);
    let paren = lexer.read(LexMode::ShCommand);
    assert_eq!(paren.id, Id::OpLParen);

    assert!(lexer.maybe_unread_one());
    let again = lexer.read(LexMode::ShCommand);
    assert_eq!(again.id, Id::OpLParen);
    assert_eq!(again.span_id, paren.span_id);
}

#[test]
fn look_ahead_skips_spaces_within_line() {
    let (mut lexer, _arena) = lexer_for("foo   ()\n");
    let _foo = lexer.read(LexMode::ShCommand);
    let next = lexer.look_ahead(LexMode::ShCommand);
    assert_eq!(next.id, Id::OpLParen);
    // Lookahead did not consume anything.
    assert_eq!(lexer.read(LexMode::ShCommand).id, Id::WsSpace);
}

#[test]
fn look_ahead_stops_at_end_of_line() {
    // `(` on the next line is never seen: lookahead is line-local.
    let (mut lexer, _arena) = lexer_for("foo");
    let _foo = lexer.read(LexMode::ShCommand);
    assert_eq!(lexer.look_ahead(LexMode::ShCommand).id, Id::UnknownTok);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::arena::SpanId;

#[test]
fn arith_expr_text_joins_token_values() {
    let expr = ArithExpr {
        tokens: vec![
            Token::new(Id::LitDigits, "1", SpanId(0)),
            Token::new(Id::ArithPlus, "+", SpanId(1)),
            Token::new(Id::LitDigits, "2", SpanId(2)),
        ],
    };
    assert_eq!(expr.text(), "1+2");
}

#[test]
fn here_doc_node_starts_unfilled() {
    let node = HereDocNode {
        op: Token::new(Id::RedirDLess, "<<", SpanId(0)),
        fd: None,
        here_begin: Word::Empty,
        stdin_parts: vec![],
        here_end_span_id: SpanId::SENTINEL,
        filled: false,
    };
    assert!(node.stdin_parts.is_empty());
    assert!(!node.filled);
}

#[test]
fn shared_here_doc_updates_are_visible_through_redirect() {
    let node = Rc::new(RefCell::new(HereDocNode {
        op: Token::new(Id::RedirDLess, "<<", SpanId(0)),
        fd: None,
        here_begin: Word::Empty,
        stdin_parts: vec![],
        here_end_span_id: SpanId::SENTINEL,
        filled: false,
    }));
    let redirect = Redirect::HereDoc(Rc::clone(&node));

    node.borrow_mut()
        .stdin_parts
        .push(WordPart::Literal(Token::new(Id::LitChars, "hi\n", SpanId(1))));
    node.borrow_mut().filled = true;

    let Redirect::HereDoc(shared) = &redirect else {
        panic!("expected here doc");
    };
    assert!(shared.borrow().filled);
    assert_eq!(shared.borrow().stdin_parts.len(), 1);
}

#[test]
fn set_redirects_attaches_only_to_compound_nodes() {
    let redir = Redirect::Redir {
        op: Token::new(Id::RedirGreat, ">", SpanId(0)),
        fd: None,
        arg_word: Word::Empty,
    };

    let mut group = Command::BraceGroup {
        children: vec![],
        redirects: vec![],
        left_spid: SpanId(0),
    };
    group.set_redirects(vec![redir.clone()]);
    let Command::BraceGroup { redirects, .. } = &group else {
        panic!("expected brace group")
    };
    assert_eq!(redirects.len(), 1);

    let mut simple = Command::NoOp;
    simple.set_redirects(vec![redir]);
    assert_eq!(simple, Command::NoOp);
}

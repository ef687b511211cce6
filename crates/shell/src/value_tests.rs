// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::token::Token;

fn expr(tokens: &[(Id, &str)]) -> ArithExpr {
    ArithExpr {
        tokens: tokens
            .iter()
            .map(|(id, val)| Token::new(*id, *val, crate::arena::SpanId(0)))
            .collect(),
    }
}

#[test]
fn shell_memory_variables_and_positionals() {
    let mut mem = ShellMemory::new();
    mem.set_str("x", "1");
    mem.argv = vec!["a".to_string(), "b".to_string()];
    mem.dollar0 = "sash".to_string();

    assert_eq!(mem.get_var("x"), Value::Str("1".to_string()));
    assert_eq!(mem.get_var("missing"), Value::Undef);
    assert_eq!(mem.get_arg_num(0), Value::Str("sash".to_string()));
    assert_eq!(mem.get_arg_num(1), Value::Str("a".to_string()));
    assert_eq!(mem.get_arg_num(3), Value::Undef);
    assert_eq!(mem.get_argv(), vec!["a", "b"]);
}

#[test]
fn shell_memory_specials() {
    let mut mem = ShellMemory::new();
    mem.last_status = 42;
    mem.argv = vec!["a".to_string()];

    assert_eq!(mem.get_special(Id::VSubQMark), Value::Str("42".to_string()));
    assert_eq!(mem.get_special(Id::VSubPound), Value::Str("1".to_string()));
    assert_eq!(mem.get_special(Id::VSubBang), Value::Undef);
}

#[test]
fn const_arith_handles_literals_and_signs() {
    let mut ev = ConstArithEvaluator;
    assert_eq!(ev.eval(&expr(&[(Id::LitDigits, "42")])).unwrap(), 42);
    assert_eq!(
        ev.eval(&expr(&[(Id::ArithMinus, "-"), (Id::LitDigits, "3")]))
            .unwrap(),
        -3
    );
    assert_eq!(
        ev.eval(&expr(&[
            (Id::LitDigits, "1"),
            (Id::ArithPlus, "+"),
            (Id::LitDigits, "2"),
        ]))
        .unwrap(),
        3
    );
    assert_eq!(ev.eval(&expr(&[])).unwrap(), 0);
}

#[test]
fn const_arith_rejects_dynamic_expressions() {
    let mut ev = ConstArithEvaluator;
    let err = ev
        .eval(&expr(&[(Id::LitArithVarLike, "x")]))
        .unwrap_err();
    assert!(err.message.contains("too dynamic"));
}

#[test]
fn const_arith_keys_keep_identifiers() {
    let mut ev = ConstArithEvaluator;
    assert_eq!(
        ev.eval_key(&expr(&[(Id::LitArithVarLike, "key")])).unwrap(),
        "key"
    );
    assert_eq!(ev.eval_key(&expr(&[(Id::LitDigits, "7")])).unwrap(), "7");
}

#[test]
fn null_command_sub_never_executes() {
    let mut ex = NullCommandSubExecutor;
    let out = ex.run_command_sub(&crate::ast::Command::NoOp).unwrap();
    assert_eq!(out, "__COMMAND_SUB_NOT_EXECUTED__");
}

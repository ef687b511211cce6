// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The literal scenarios from the design notes, pinned end to end.
//! Scenarios that would need a process executor are pinned at the level
//! the front-end owns: the AST and the argv.

use std::collections::HashMap;

use similar_asserts::assert_eq;

use sash_shell::{Command, Redirect, ShellMemory, Word, WordPart};

use super::{argv_of, simple_command};

/// Scenario 1: `a=(1 '2 3' 4); x=x; y=y; printf '<%s>' $x"${a[@]}"$y`
/// produces `<x1><2 3><4y>`: three argv entries past the format string.
#[test]
fn array_splice_frames() {
    let mut mem = ShellMemory::new();
    mem.set_array("a", &["1", "2 3", "4"]);
    mem.set_str("x", "x");
    mem.set_str("y", "y");

    let argv = argv_of(&mut mem, "printf '<%s>' $x\"${a[@]}\"$y");
    assert_eq!(argv, vec!["printf", "<%s>", "x1", "2 3", "4y"]);
}

/// Scenario 2: `alias e='echo '; e e hi`. The trailing space continues
/// expansion, and the position-aware recursion guard still lets the second
/// `e` expand, so the buffer becomes `echo echo hi` — which prints
/// `echo hi`.
#[test]
fn alias_trailing_space_continuation() {
    let mut aliases = HashMap::new();
    aliases.insert("e".to_string(), "echo ".to_string());

    let (node, _arena) = sash_shell::parse_with_aliases("e e hi", aliases).unwrap();
    let Command::ExpandedAlias { child, .. } = node else {
        panic!("expected expanded alias, got {:?}", node);
    };
    let Command::CommandList { children } = *child else {
        panic!("expected command list");
    };
    let Command::Simple(sc) = &children[0] else {
        panic!("expected simple command");
    };

    let mut mem = ShellMemory::new();
    let argv = super::eval_words(&mut mem, &sc.words).unwrap().strs;
    assert_eq!(argv, vec!["echo", "echo", "hi"]);
}

/// Scenario 3: `cat <<A; cat <<B` reads A's body first, then B's.
#[test]
fn sequential_here_docs() {
    let (node, _arena) = sash_shell::parse("cat <<A; cat <<B\nAAA\nA\nBBB\nB\n").unwrap();
    let Command::CommandList { children } = node else {
        panic!("expected command list, got {:?}", node);
    };

    let body = |cmd: &Command| -> String {
        let sc = match cmd {
            Command::Simple(sc) => sc,
            Command::Sentence { child, .. } => match child.as_ref() {
                Command::Simple(sc) => sc,
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        };
        let Redirect::HereDoc(h) = &sc.redirects[0] else {
            panic!("expected here doc");
        };
        let h = h.borrow();
        assert!(h.filled);
        h.stdin_parts
            .iter()
            .map(|p| match p {
                WordPart::Literal(t) => t.val.clone(),
                other => panic!("expected literal, got {:?}", other),
            })
            .collect()
    };

    assert_eq!(body(&children[0]), "AAA\n");
    assert_eq!(body(&children[1]), "BBB\n");
}

/// Scenario 4: `for x in a b c; do echo $x; done` parses to the expected
/// loop shape, and its word list evaluates to `a b c`.
#[test]
fn for_each_loop() {
    let (node, _arena) = sash_shell::parse("for x in a b c; do echo $x; done").unwrap();
    let Command::ForEach {
        iter_name,
        iter_words,
        body,
        ..
    } = node
    else {
        panic!("expected for-each, got {:?}", node);
    };
    assert_eq!(iter_name, "x");

    let mut mem = ShellMemory::new();
    let iter = super::eval_words(&mut mem, &iter_words).unwrap().strs;
    assert_eq!(iter, vec!["a", "b", "c"]);

    let Command::Simple(sc) = &body[0] else {
        panic!("expected simple body");
    };
    let Word::Compound(c) = &sc.words[1] else {
        panic!("expected compound word");
    };
    assert!(matches!(&c.parts[0], WordPart::SimpleVarSub(t) if t.val == "$x"));

    // Executing the loop body prints each value.
    for val in ["a", "b", "c"] {
        mem.set_str("x", val);
        let argv = super::eval_words(&mut mem, &sc.words).unwrap().strs;
        assert_eq!(argv, vec!["echo", val]);
    }
}

/// Scenario 5: `s="héllo"; echo ${#s}` is 5 code points, not 6 bytes.
#[test]
fn length_in_code_points() {
    let mut mem = ShellMemory::new();
    mem.set_str("s", "héllo");
    let argv = argv_of(&mut mem, "echo ${#s}");
    assert_eq!(argv, vec!["echo", "5"]);
}

/// Scenario 6: `a=(1 2 3); echo "${a[@]/2/X}"` substitutes per element.
#[test]
fn pat_sub_vectorizes() {
    let mut mem = ShellMemory::new();
    mem.set_array("a", &["1", "2", "3"]);
    let argv = argv_of(&mut mem, "echo \"${a[@]/2/X}\"");
    assert_eq!(argv, vec!["echo", "1", "X", "3"]);
}

/// The assignment in scenario 1 also parses and evaluates as written.
#[test]
fn scenario_one_assignments_round_trip() {
    let (node, _arena) = sash_shell::parse("a=(1 '2 3' 4)").unwrap();
    let Command::Assignment(assign) = node else {
        panic!("expected assignment");
    };
    let rhs = assign.pairs[0].rhs.as_ref().unwrap();

    let mut mem = ShellMemory::new();
    let opts = sash_shell::ExecOptions {
        noglob: true,
        ..sash_shell::ExecOptions::default()
    };
    let mut arith = sash_shell::ConstArithEvaluator;
    let mut cmd_sub = sash_shell::NullCommandSubExecutor;
    let mut prompt = sash_shell::PlainPromptEvaluator;
    let mut ev =
        sash_shell::WordEvaluator::new(&mut mem, opts, &mut arith, &mut cmd_sub, &mut prompt);
    let val = ev.eval_rhs_word(rhs).unwrap();
    assert_eq!(
        val,
        sash_shell::Value::StrArray(vec![
            "1".to_string(),
            "2 3".to_string(),
            "4".to_string()
        ])
    );
}

/// Here-doc bodies with a quoted delimiter contain literal parts only.
#[test]
fn quoted_delimiter_law() {
    let sc = simple_command("cat <<'EOF'\nhello $name `cmd`\nEOF\n");
    let Redirect::HereDoc(h) = &sc.redirects[0] else {
        panic!("expected here doc");
    };
    assert!(h
        .borrow()
        .stdin_parts
        .iter()
        .all(|p| matches!(p, WordPart::Literal(_))));
}

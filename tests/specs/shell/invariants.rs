// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-cutting invariants: span validity, argv parallelism, alias
//! termination.

use std::collections::HashMap;

use proptest::prelude::*;

use sash_shell::ShellMemory;

use super::{eval_words, simple_command};

#[test]
fn arg_vector_lengths_always_match() {
    let mut mem = ShellMemory::new();
    mem.set_array("a", &["1", "2", "3"]);
    mem.set_str("x", "one two");
    mem.set_str("empty", "");

    for source in [
        "echo",
        "echo $x",
        "echo \"${a[@]}\" $x",
        "echo $empty",
        "echo $empty \"$empty\"",
        "echo a{b,c}",
    ] {
        let sc = simple_command(source);
        let arg_vec = eval_words(&mut mem, &sc.words).expect(source);
        assert_eq!(
            arg_vec.strs.len(),
            arg_vec.spids.len(),
            "length mismatch for {:?}",
            source
        );
    }
}

#[test]
fn parse_errors_carry_resolvable_spans() {
    use sash_shell::{Arena, LineReader, ParseContext, ParseOptions, StringLineReader};
    use std::cell::RefCell;
    use std::rc::Rc;

    for source in ["echo )", "x=1 >out", "break 1 2", "if true; then echo; "] {
        let arena = Rc::new(RefCell::new(Arena::new()));
        let ctx = ParseContext::new(Rc::clone(&arena), HashMap::new(), ParseOptions::default());
        let reader: Rc<RefCell<dyn LineReader>> = Rc::new(RefCell::new(StringLineReader::new(
            source,
            Rc::clone(&arena),
        )));
        let mut parser = ctx.make_parser(reader);

        let err = parser.parse_program().expect_err(source);
        if let Some(span_id) = err.span_id {
            let loc = arena
                .borrow()
                .lookup(span_id)
                .unwrap_or_else(|| panic!("unresolvable span for {:?}", source));
            assert!(loc.line_num >= 1);
        }
    }
}

#[test]
fn alias_expansion_terminates_on_mutual_cycles() {
    let mut aliases = HashMap::new();
    aliases.insert("a".to_string(), "b ".to_string());
    aliases.insert("b".to_string(), "a ".to_string());

    // A cycle of aliases with continuation markers must still terminate.
    let result = sash_shell::parse_with_aliases("a x", aliases);
    assert!(result.is_ok());
}

proptest! {
    /// Parsing arbitrary printable input never panics and never leaves
    /// the parser in a state where a success has pending here docs.
    #[test]
    fn parsing_is_total(input in "[ -~\n]{0,60}") {
        let _ = sash_shell::parse(&input);
    }

    /// Word evaluation is deterministic.
    #[test]
    fn word_eval_is_deterministic(values in prop::collection::vec("[a-z ]{0,6}", 1..4)) {
        let mut mem = ShellMemory::new();
        for (i, v) in values.iter().enumerate() {
            mem.set_str(&format!("v{}", i), v);
        }
        let sc = simple_command("echo $v0 \"$v1\" ${v2:-d}");
        let first = eval_words(&mut mem, &sc.words).unwrap();
        let second = eval_words(&mut mem, &sc.words).unwrap();
        prop_assert_eq!(first, second);
    }
}

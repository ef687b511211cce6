// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ast::Command;
use crate::parse;
use crate::value::{
    ConstArithEvaluator, NullCommandSubExecutor, PlainPromptEvaluator, ShellMemory,
};

/// Parse a simple command and return its words.
fn words_of(source: &str) -> Vec<Word> {
    let (node, _arena) = parse(source).expect("parse failed");
    match node {
        Command::Simple(sc) => sc.words,
        other => panic!("expected simple command, got {:?}", other),
    }
}

struct Fixture {
    mem: ShellMemory,
    opts: ExecOptions,
}

impl Fixture {
    fn new() -> Self {
        Self {
            mem: ShellMemory::new(),
            opts: ExecOptions {
                // Tests shouldn't touch the real filesystem unless they
                // mean to.
                noglob: true,
                ..ExecOptions::default()
            },
        }
    }

    fn eval_argv(&mut self, words: &[Word]) -> RuntimeResult<ArgVector> {
        let mut arith = ConstArithEvaluator;
        let mut cmd_sub = NullCommandSubExecutor;
        let mut prompt = PlainPromptEvaluator;
        let mut ev = WordEvaluator::new(
            &mut self.mem,
            self.opts,
            &mut arith,
            &mut cmd_sub,
            &mut prompt,
        );
        ev.eval_word_sequence2(words)
    }

    fn argv_of(&mut self, source: &str) -> Vec<String> {
        let words = words_of(source);
        self.eval_argv(&words).expect("eval failed").strs
    }

    fn eval_to_string(&mut self, source: &str) -> RuntimeResult<String> {
        let words = words_of(&format!("x {}", source));
        let mut arith = ConstArithEvaluator;
        let mut cmd_sub = NullCommandSubExecutor;
        let mut prompt = PlainPromptEvaluator;
        let mut ev = WordEvaluator::new(
            &mut self.mem,
            self.opts,
            &mut arith,
            &mut cmd_sub,
            &mut prompt,
        );
        ev.eval_word_to_string(&words[1])
    }
}

// ── Frames and splicing ──────────────────────────────────────────────────

#[test]
fn array_frames_extend_at_the_edges() {
    // a=(1 '2 3' 4); x=x; y=y; $x"${a[@]}"$y -> x1, '2 3', 4y
    let mut f = Fixture::new();
    f.mem.set_array("a", &["1", "2 3", "4"]);
    f.mem.set_str("x", "x");
    f.mem.set_str("y", "y");

    let argv = f.argv_of("printf '<%s>' $x\"${a[@]}\"$y");
    assert_eq!(argv, vec!["printf", "<%s>", "x1", "2 3", "4y"]);
}

#[test]
fn spids_stay_parallel_to_strs() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["1", "2", "3"]);
    let words = words_of("echo \"${a[@]}\" tail");
    let arg_vec = f.eval_argv(&words).unwrap();
    assert_eq!(arg_vec.strs.len(), arg_vec.spids.len());
    // All three array elements blame the same word.
    assert_eq!(arg_vec.spids[1], arg_vec.spids[2]);
    assert_eq!(arg_vec.spids[2], arg_vec.spids[3]);
}

#[test]
fn unquoted_var_splits_on_ifs() {
    let mut f = Fixture::new();
    f.mem.set_str("x", "a b  c");
    assert_eq!(f.argv_of("echo $x"), vec!["echo", "a", "b", "c"]);
}

#[test]
fn quoted_var_does_not_split() {
    let mut f = Fixture::new();
    f.mem.set_str("x", "a b");
    assert_eq!(f.argv_of("echo \"$x\""), vec!["echo", "a b"]);
}

#[test]
fn custom_ifs_splitting() {
    let mut f = Fixture::new();
    f.mem.set_str("IFS", ":");
    f.mem.set_str("path", "/bin:/usr/bin");
    assert_eq!(
        f.argv_of("echo $path"),
        vec!["echo", "/bin", "/usr/bin"]
    );
}

#[test]
fn empty_unquoted_var_elides() {
    let mut f = Fixture::new();
    f.mem.set_str("empty", "");
    assert_eq!(f.argv_of("echo $empty end"), vec!["echo", "end"]);
    assert_eq!(f.argv_of("echo $empty$empty end"), vec!["echo", "end"]);
}

#[test]
fn quoted_empty_survives() {
    let mut f = Fixture::new();
    f.mem.set_str("empty", "");
    assert_eq!(f.argv_of("echo \"$empty\""), vec!["echo", ""]);
    assert_eq!(f.argv_of("echo $empty\"\""), vec!["echo", ""]);
    assert_eq!(f.argv_of("echo ''"), vec!["echo", ""]);
}

#[test]
fn at_sign_expands_one_arg_per_parameter() {
    let mut f = Fixture::new();
    f.mem.argv = vec!["one".to_string(), "two words".to_string()];
    assert_eq!(f.argv_of("echo \"$@\""), vec!["echo", "one", "two words"]);
    // Unquoted $@ decays and splits.
    assert_eq!(f.argv_of("echo $@"), vec!["echo", "one", "two", "words"]);
}

#[test]
fn star_joins_with_first_ifs_char() {
    let mut f = Fixture::new();
    f.mem.argv = vec!["a".to_string(), "b".to_string()];
    assert_eq!(f.argv_of("echo \"$*\""), vec!["echo", "a b"]);

    f.mem.set_str("IFS", ":");
    assert_eq!(f.argv_of("echo \"$*\""), vec!["echo", "a:b"]);
}

#[test]
fn empty_array_contributes_nothing() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &[]);
    assert_eq!(f.argv_of("echo \"${a[@]}\" end"), vec!["echo", "end"]);
}

// ── Braced operators ─────────────────────────────────────────────────────

#[test]
fn length_counts_utf8_code_points() {
    let mut f = Fixture::new();
    f.mem.set_str("s", "héllo");
    assert_eq!(f.eval_to_string("${#s}").unwrap(), "5");
}

#[test]
fn length_of_array_and_argc() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["x", "y"]);
    assert_eq!(f.eval_to_string("${#a[@]}").unwrap(), "2");
}

#[test]
fn pat_sub_is_vectorized_over_arrays() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["1", "2", "3"]);
    let argv = f.argv_of("echo \"${a[@]/2/X}\"");
    assert_eq!(argv, vec!["echo", "1", "X", "3"]);
}

#[test]
fn pat_sub_replace_all_and_first() {
    let mut f = Fixture::new();
    f.mem.set_str("s", "banana");
    assert_eq!(f.eval_to_string("${s/a/X}").unwrap(), "bXnana");
    assert_eq!(f.eval_to_string("${s//a/X}").unwrap(), "bXnXnX");
    assert_eq!(f.eval_to_string("${s//a}").unwrap(), "bnn");
}

#[test]
fn test_op_default_and_alternative() {
    let mut f = Fixture::new();
    f.mem.set_str("set", "yes");
    assert_eq!(f.eval_to_string("${unset:-default}").unwrap(), "default");
    assert_eq!(f.eval_to_string("${set:-default}").unwrap(), "yes");
    assert_eq!(f.eval_to_string("${set:+alt}").unwrap(), "alt");
    assert_eq!(f.eval_to_string("${unset:+alt}").unwrap(), "");

    // Colon-less form only triggers on unset, not empty.
    f.mem.set_str("empty", "");
    assert_eq!(f.eval_to_string("${empty-default}").unwrap(), "");
    assert_eq!(f.eval_to_string("${empty:-default}").unwrap(), "default");
}

#[test]
fn test_op_default_splices_multiple_words() {
    let mut f = Fixture::new();
    let argv = f.argv_of("echo ${x:-'a b' c}");
    assert_eq!(argv, vec!["echo", "a b", "c"]);
}

#[test]
fn assign_op_writes_back() {
    let mut f = Fixture::new();
    assert_eq!(f.eval_to_string("${x:=stored}").unwrap(), "stored");
    assert_eq!(f.mem.get_var("x"), Value::Str("stored".to_string()));
}

#[test]
fn error_op_raises_with_message() {
    let mut f = Fixture::new();
    let err = f.eval_to_string("${x:?is required}").unwrap_err();
    assert!(err.message.contains("is required"));

    let err = f.eval_to_string("${x:?}").unwrap_err();
    assert!(err.message.contains("parameter null or not set"));
}

#[test]
fn slice_uses_utf8_char_indices() {
    let mut f = Fixture::new();
    f.mem.set_str("s", "héllo");
    assert_eq!(f.eval_to_string("${s:1:3}").unwrap(), "éll");
    assert_eq!(f.eval_to_string("${s:2}").unwrap(), "llo");
}

#[test]
fn slice_of_array_skips_and_takes() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["0", "1", "2", "3"]);
    let argv = f.argv_of("echo \"${a[@]:1:2}\"");
    assert_eq!(argv, vec!["echo", "1", "2"]);
}

#[test]
fn negative_slice_start_is_downgradable() {
    let mut f = Fixture::new();
    f.mem.set_str("s", "hello");

    // Lax mode warns and yields an empty string.
    assert_eq!(f.eval_to_string("${s: -1}").unwrap(), "");

    // Strict mode makes it fatal.
    f.opts.strict_word_eval = true;
    let err = f.eval_to_string("${s: -1}").unwrap_err();
    assert_eq!(err.kind, crate::runtime_error::RuntimeErrorKind::InvalidSlice);
}

#[test]
fn array_index_and_at_decay() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["x", "y", "z"]);
    assert_eq!(f.eval_to_string("${a[1]}").unwrap(), "y");
    assert_eq!(f.eval_to_string("${a[5]}").unwrap(), "");
    // ${a[*]} decays joined even when quoted.
    assert_eq!(f.argv_of("echo \"${a[*]}\""), vec!["echo", "x y z"]);
}

#[test]
fn indexing_a_string_is_an_error() {
    let mut f = Fixture::new();
    f.mem.set_str("s", "abc");
    assert!(f.eval_to_string("${s[0]}").is_err());
    assert!(f.eval_to_string("${s[@]}").is_err());
}

#[test]
fn indirect_expansion_shapes() {
    let mut f = Fixture::new();
    f.mem.set_str("ref", "target");
    f.mem.set_str("target", "hit");
    assert_eq!(f.eval_to_string("${!ref}").unwrap(), "hit");

    f.mem.set_str("aref", "arr[1]");
    f.mem.set_array("arr", &["zero", "one"]);
    assert_eq!(f.eval_to_string("${!aref}").unwrap(), "one");

    // ${!arr[@]} lists indices.
    let argv = f.argv_of("echo \"${!arr[@]}\"");
    assert_eq!(argv, vec!["echo", "0", "1"]);
}

#[test]
fn bad_indirect_expansion_is_fatal() {
    let mut f = Fixture::new();
    f.mem.set_str("ref", "not a name");
    assert!(f.eval_to_string("${!ref}").is_err());
}

#[test]
fn strip_and_case_ops() {
    let mut f = Fixture::new();
    f.mem.set_str("path", "/usr/local/bin");
    assert_eq!(f.eval_to_string("${path##*/}").unwrap(), "bin");
    assert_eq!(f.eval_to_string("${path%/*}").unwrap(), "/usr/local");

    f.mem.set_str("w", "word");
    assert_eq!(f.eval_to_string("${w^}").unwrap(), "Word");
    assert_eq!(f.eval_to_string("${w^^}").unwrap(), "WORD");
}

#[test]
fn strip_ops_vectorize() {
    let mut f = Fixture::new();
    f.mem.set_array("files", &["a.py", "b.py"]);
    let argv = f.argv_of("echo \"${files[@]%.py}\"");
    assert_eq!(argv, vec!["echo", "a", "b"]);
}

#[test]
fn quote_op_shell_quotes() {
    let mut f = Fixture::new();
    f.mem.set_str("s", "a b");
    assert_eq!(f.eval_to_string("${s@Q}").unwrap(), "'a b'");
}

// ── nounset and strictness ───────────────────────────────────────────────

#[test]
fn nounset_makes_undefined_fatal() {
    let mut f = Fixture::new();
    assert_eq!(f.eval_to_string("$missing").unwrap(), "");

    f.opts.nounset = true;
    let err = f.eval_to_string("$missing").unwrap_err();
    assert!(err.message.contains("missing"));
}

#[test]
fn strict_array_rejects_array_in_string_context() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["1", "2"]);
    // Lax mode joins with spaces.
    assert_eq!(f.eval_to_string("\"${a[@]}\"").unwrap(), "1 2");

    f.opts.strict_array = true;
    let words = words_of("x \"${a[@]}\"");
    let mut arith = ConstArithEvaluator;
    let mut cmd_sub = NullCommandSubExecutor;
    let mut prompt = PlainPromptEvaluator;
    let mut ev = WordEvaluator::new(
        &mut f.mem,
        f.opts,
        &mut arith,
        &mut cmd_sub,
        &mut prompt,
    );
    assert!(ev.eval_word_to_string(&words[1]).is_err());
}

// ── Other part kinds ─────────────────────────────────────────────────────

#[test]
fn arith_sub_evaluates() {
    let mut f = Fixture::new();
    assert_eq!(f.eval_to_string("$((1 + 2))").unwrap(), "3");
}

#[test]
fn command_sub_uses_the_executor() {
    let mut f = Fixture::new();
    assert_eq!(
        f.eval_to_string("$(anything)").unwrap(),
        "__COMMAND_SUB_NOT_EXECUTED__"
    );
}

#[test]
fn dollar_sq_decodes_escapes() {
    let mut f = Fixture::new();
    assert_eq!(f.eval_to_string("$'a\\tb'").unwrap(), "a\tb");
}

#[test]
fn escaped_literal_drops_backslash() {
    let mut f = Fixture::new();
    assert_eq!(f.argv_of("echo \\;"), vec!["echo", ";"]);
}

#[test]
fn rhs_array_literal_becomes_str_array() {
    let (node, _arena) = parse("a=(x 'y z')").unwrap();
    let Command::Assignment(assign) = node else {
        panic!("expected assignment");
    };
    let rhs = assign.pairs[0].rhs.as_ref().unwrap();

    let mut f = Fixture::new();
    let mut arith = ConstArithEvaluator;
    let mut cmd_sub = NullCommandSubExecutor;
    let mut prompt = PlainPromptEvaluator;
    let mut ev = WordEvaluator::new(
        &mut f.mem,
        f.opts,
        &mut arith,
        &mut cmd_sub,
        &mut prompt,
    );
    let val = ev.eval_rhs_word(rhs).unwrap();
    assert_eq!(
        val,
        Value::StrArray(vec!["x".to_string(), "y z".to_string()])
    );
}

#[test]
fn rhs_brace_expansion_in_array_literal() {
    let (node, _arena) = parse("a=({1..3})").unwrap();
    let Command::Assignment(assign) = node else {
        panic!("expected assignment");
    };
    let rhs = assign.pairs[0].rhs.as_ref().unwrap();

    let mut f = Fixture::new();
    let mut arith = ConstArithEvaluator;
    let mut cmd_sub = NullCommandSubExecutor;
    let mut prompt = PlainPromptEvaluator;
    let mut ev = WordEvaluator::new(
        &mut f.mem,
        f.opts,
        &mut arith,
        &mut cmd_sub,
        &mut prompt,
    );
    let val = ev.eval_rhs_word(rhs).unwrap();
    assert_eq!(
        val,
        Value::StrArray(vec!["1".to_string(), "2".to_string(), "3".to_string()])
    );
}

#[test]
fn brace_expansion_in_argv() {
    let mut f = Fixture::new();
    assert_eq!(
        f.argv_of("echo a{b,c}d"),
        vec!["echo", "abd", "acd"]
    );
}

#[test]
fn eval_word_to_string_is_idempotent_for_literals() {
    use crate::ast::{CompoundWord, WordPart};
    use crate::token::Token;

    let mut f = Fixture::new();
    let once = f.eval_to_string("hello-world").unwrap();

    // Wrap the result back into a literal word and evaluate again.
    let literal = Word::Compound(CompoundWord::new(vec![WordPart::Literal(Token::new(
        crate::token::Id::LitChars,
        once.clone(),
        crate::arena::SpanId(0),
    ))]));
    let mut arith = ConstArithEvaluator;
    let mut cmd_sub = NullCommandSubExecutor;
    let mut prompt = PlainPromptEvaluator;
    let mut ev = WordEvaluator::new(
        &mut f.mem,
        f.opts,
        &mut arith,
        &mut cmd_sub,
        &mut prompt,
    );
    assert_eq!(ev.eval_word_to_string(&literal).unwrap(), once);
}

#[test]
fn eval_for_plugin_decays_errors() {
    let mut f = Fixture::new();
    f.opts.nounset = true;
    let words = words_of("x $missing");
    let mut arith = ConstArithEvaluator;
    let mut cmd_sub = NullCommandSubExecutor;
    let mut prompt = PlainPromptEvaluator;
    let mut ev = WordEvaluator::new(
        &mut f.mem,
        f.opts,
        &mut arith,
        &mut cmd_sub,
        &mut prompt,
    );
    let out = ev.eval_for_plugin(&words[1]);
    assert!(out.starts_with("<Runtime error:"));
}

#[test]
fn eval_word_sequence_is_deterministic() {
    let mut f = Fixture::new();
    f.mem.set_array("a", &["1", "2"]);
    f.mem.set_str("x", "x");
    let words = words_of("echo $x\"${a[@]}\"");
    let first = f.eval_argv(&words).unwrap();
    let second = f.eval_argv(&words).unwrap();
    assert_eq!(first, second);
}

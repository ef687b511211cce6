// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use proptest::prelude::*;

use crate::ast::*;
use crate::token::Id;
use crate::word::static_eval;
use crate::{parse, parse_with_aliases};

fn parse_ok(source: &str) -> Command {
    match parse(source) {
        Ok((node, _arena)) => node,
        Err(e) => panic!("parse failed for {:?}: {}", source, e),
    }
}

fn parse_err(source: &str) -> crate::parse_error::ParseError {
    match parse(source) {
        Ok(_) => panic!("expected parse error for {:?}", source),
        Err(e) => e,
    }
}

fn as_simple(node: &Command) -> &SimpleCommand {
    match node {
        Command::Simple(sc) => sc,
        Command::Sentence { child, .. } => as_simple(child),
        other => panic!("expected simple command, got {:?}", other),
    }
}

fn word_text(w: &Word) -> String {
    let (ok, s, _) = static_eval(w);
    assert!(ok, "expected static word: {:?}", w);
    s
}

fn word_texts(words: &[Word]) -> Vec<String> {
    words.iter().map(word_text).collect()
}

// ── Simple commands ──────────────────────────────────────────────────────

#[test]
fn simple_command_words() {
    let node = parse_ok("echo hello world");
    let sc = as_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["echo", "hello", "world"]);
    assert!(sc.redirects.is_empty());
    assert!(sc.more_env.is_empty());
}

#[test]
fn keywords_as_arguments_are_plain_words() {
    let node = parse_ok("echo if done esac");
    let sc = as_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["echo", "if", "done", "esac"]);
}

#[test]
fn env_prefix_bindings() {
    let node = parse_ok("FOO=bar BAZ= env");
    let sc = as_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["env"]);
    assert_eq!(sc.more_env.len(), 2);
    assert_eq!(sc.more_env[0].name, "FOO");
    assert_eq!(word_text(&sc.more_env[0].val), "bar");
    assert_eq!(sc.more_env[1].name, "BAZ");
    assert!(matches!(sc.more_env[1].val, Word::Empty));
}

#[test]
fn redirects_interleave_with_words() {
    let node = parse_ok("<in.txt ls >out.txt foo");
    let sc = as_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["ls", "foo"]);
    assert_eq!(sc.redirects.len(), 2);
}

#[test]
fn redirect_with_descriptor() {
    let node = parse_ok("cmd 2>err.txt");
    let sc = as_simple(&node);
    let Redirect::Redir { op, fd, arg_word } = &sc.redirects[0] else {
        panic!("expected plain redirect");
    };
    assert_eq!(op.id, Id::RedirGreat);
    assert_eq!(*fd, Some(2));
    assert_eq!(word_text(arg_word), "err.txt");
}

#[test]
fn redirect_without_command() {
    let node = parse_ok(">out.txt");
    let sc = as_simple(&node);
    assert!(sc.words.is_empty());
    assert_eq!(sc.redirects.len(), 1);
}

#[test]
fn sentence_keeps_terminator() {
    let node = parse_ok("sleep 1 &");
    let Command::Sentence { terminator, .. } = &node else {
        panic!("expected sentence, got {:?}", node);
    };
    assert_eq!(terminator.id, Id::OpAmp);
}

// ── Assignments ──────────────────────────────────────────────────────────

#[test]
fn bare_assignment_is_global() {
    let node = parse_ok("x=1 y=2");
    let Command::Assignment(a) = &node else {
        panic!("expected assignment, got {:?}", node);
    };
    assert_eq!(a.keyword, Id::AssignNone);
    assert_eq!(a.pairs.len(), 2);
    let LhsExpr::Name { name, .. } = &a.pairs[0].lhs else {
        panic!("expected name lhs");
    };
    assert_eq!(name, "x");
}

#[test]
fn append_assignment_op() {
    let node = parse_ok("x+=2");
    let Command::Assignment(a) = &node else {
        panic!("expected assignment");
    };
    assert_eq!(a.pairs[0].op, AssignOp::PlusEqual);
}

#[test]
fn indexed_assignment_relexes_subscript() {
    let node = parse_ok("a[1+2]=x");
    let Command::Assignment(a) = &node else {
        panic!("expected assignment");
    };
    let LhsExpr::IndexedName { name, index, .. } = &a.pairs[0].lhs else {
        panic!("expected indexed lhs, got {:?}", a.pairs[0].lhs);
    };
    assert_eq!(name, "a");
    assert_eq!(index.text(), "1+2");
}

#[test]
fn declare_with_flags_and_pairs() {
    let node = parse_ok("declare -r -x name=value other");
    let Command::Assignment(a) = &node else {
        panic!("expected assignment, got {:?}", node);
    };
    assert_eq!(a.keyword, Id::AssignDeclare);
    assert_eq!(a.flags, vec!["-r", "-x"]);
    assert_eq!(a.pairs.len(), 2);
    assert!(a.pairs[1].rhs.is_none());
}

#[test]
fn declare_listing_flag_is_a_command() {
    let node = parse_ok("declare -p");
    let sc = as_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["declare", "-p"]);
}

#[test]
fn array_literal_assignment() {
    let node = parse_ok("a=(1 '2 3' 4)");
    let Command::Assignment(a) = &node else {
        panic!("expected assignment, got {:?}", node);
    };
    let Some(Word::Compound(c)) = &a.pairs[0].rhs else {
        panic!("expected rhs");
    };
    assert!(matches!(&c.parts[0], WordPart::ArrayLiteral { words, .. } if words.len() == 3));
}

#[test]
fn assignment_with_redirect_is_rejected() {
    let err = parse_err("declare x=1 >out");
    assert!(err.message.contains("redirect"));

    let err = parse_err("x=1 >out");
    assert!(err.message.contains("redirect"));
}

#[test]
fn env_binding_with_array_literal_is_rejected() {
    let err = parse_err("FOO=(1 2) ls");
    assert!(err.message.contains("array literal"));
}

// ── Control flow keywords ────────────────────────────────────────────────

#[test]
fn control_flow_with_one_arg() {
    let node = parse_ok("return 3");
    let Command::ControlFlow { token, arg_word } = &node else {
        panic!("expected control flow, got {:?}", node);
    };
    assert_eq!(token.id, Id::ControlFlowReturn);
    assert_eq!(word_text(arg_word.as_ref().unwrap()), "3");
}

#[test]
fn control_flow_rejects_second_arg() {
    let err = parse_err("break 1 2");
    assert!(err.message.contains("Unexpected argument"));
}

#[test]
fn control_flow_rejects_redirects_and_env() {
    assert!(parse_err("exit >f").message.contains("redirect"));
    assert!(parse_err("X=1 exit").message.contains("environment"));
}

// ── Pipelines and and/or ─────────────────────────────────────────────────

#[test]
fn pipeline_with_negation_and_stderr() {
    let node = parse_ok("! a |& b | c");
    let Command::Pipeline(p) = &node else {
        panic!("expected pipeline, got {:?}", node);
    };
    assert!(p.negated);
    assert_eq!(p.children.len(), 3);
    assert_eq!(p.stderr_indices, vec![0]);
}

#[test]
fn and_or_is_flat_and_ordered() {
    let node = parse_ok("a && b || c");
    let Command::AndOr(ao) = &node else {
        panic!("expected and-or, got {:?}", node);
    };
    assert_eq!(ao.ops, vec![Id::OpDAmp, Id::OpDPipe]);
    assert_eq!(ao.children.len(), 3);
}

#[test]
fn pipe_allows_newline_after() {
    let node = parse_ok("a |\nb");
    assert!(matches!(node, Command::Pipeline(_)));
}

// ── Compound commands ────────────────────────────────────────────────────

#[test]
fn subshell_and_brace_group() {
    let node = parse_ok("(cd /tmp && pwd)");
    assert!(matches!(node, Command::Subshell { .. }));

    let node = parse_ok("{ echo a; echo b; }");
    let Command::BraceGroup { children, .. } = &node else {
        panic!("expected brace group, got {:?}", node);
    };
    assert_eq!(children.len(), 2);
}

#[test]
fn brace_group_with_redirects() {
    let node = parse_ok("{ echo hi; } >out.txt");
    let Command::BraceGroup { redirects, .. } = &node else {
        panic!("expected brace group");
    };
    assert_eq!(redirects.len(), 1);
}

#[test]
fn if_elif_else_chain() {
    let node = parse_ok("if a; then b; elif c; then d; else e; fi");
    let Command::If {
        arms, else_action, ..
    } = &node
    else {
        panic!("expected if, got {:?}", node);
    };
    assert_eq!(arms.len(), 2);
    assert_eq!(else_action.len(), 1);
}

#[test]
fn while_and_until() {
    let node = parse_ok("while true; do work; done");
    let Command::WhileUntil { keyword, .. } = &node else {
        panic!("expected while");
    };
    assert_eq!(keyword.id, Id::KwWhile);

    let node = parse_ok("until done_yet; do wait; done");
    let Command::WhileUntil { keyword, .. } = &node else {
        panic!("expected until");
    };
    assert_eq!(keyword.id, Id::KwUntil);
}

#[test]
fn for_each_loop_shape() {
    let node = parse_ok("for x in a b c; do echo $x; done");
    let Command::ForEach {
        iter_name,
        iter_words,
        do_arg_iter,
        body,
        ..
    } = &node
    else {
        panic!("expected for-each, got {:?}", node);
    };
    assert_eq!(iter_name, "x");
    assert_eq!(word_texts(iter_words), vec!["a", "b", "c"]);
    assert!(!do_arg_iter);
    assert_eq!(body.len(), 1);
    let sc = as_simple(&body[0]);
    assert_eq!(word_text(&sc.words[0]), "echo");
    assert!(matches!(
        &sc.words[1],
        Word::Compound(c) if matches!(&c.parts[0], WordPart::SimpleVarSub(t) if t.val == "$x")
    ));
}

#[test]
fn for_without_in_iterates_args() {
    let node = parse_ok("for x; do echo; done");
    let Command::ForEach { do_arg_iter, .. } = &node else {
        panic!("expected for-each");
    };
    assert!(do_arg_iter);

    let node = parse_ok("for x do echo; done");
    let Command::ForEach { do_arg_iter, .. } = &node else {
        panic!("expected for-each");
    };
    assert!(do_arg_iter);
}

#[test]
fn for_arith_loop() {
    let node = parse_ok("for ((i=0; i<3; i++)); do echo $i; done");
    let Command::ForExpr {
        init, cond, update, ..
    } = &node
    else {
        panic!("expected arith for, got {:?}", node);
    };
    assert_eq!(init.as_ref().unwrap().text(), "i=0");
    assert_eq!(cond.as_ref().unwrap().text(), "i<3");
    assert_eq!(update.as_ref().unwrap().text(), "i++");
}

#[test]
fn invalid_for_variable_is_rejected() {
    let err = parse_err("for 1x in a; do :; done");
    assert!(err.message.contains("variable name"));
}

#[test]
fn case_arms() {
    let node = parse_ok("case $x in\n  a|b) echo ab ;;\n  (c) echo c ;;\n  *) echo other\nesac");
    let Command::Case { arms, .. } = &node else {
        panic!("expected case, got {:?}", node);
    };
    assert_eq!(arms.len(), 3);
    assert_eq!(arms[0].pat_words.len(), 2);
    assert_eq!(arms[1].pat_words.len(), 1);
    // The last arm may omit ;; before esac.
    assert_eq!(arms[2].action.len(), 1);
}

#[test]
fn case_with_empty_arm_list() {
    let node = parse_ok("case $x in esac");
    let Command::Case { arms, .. } = &node else {
        panic!("expected case");
    };
    assert!(arms.is_empty());
}

#[test]
fn dbracket_collects_words() {
    let node = parse_ok("[[ $x == foo ]]");
    let Command::DBracket { words, .. } = &node else {
        panic!("expected dbracket, got {:?}", node);
    };
    assert_eq!(words.len(), 3);
}

#[test]
fn dparen_keeps_expression() {
    let node = parse_ok("((x + 1))");
    let Command::DParen { child, .. } = &node else {
        panic!("expected dparen, got {:?}", node);
    };
    assert_eq!(child.text(), "x+1");
}

#[test]
fn time_wraps_pipeline() {
    let node = parse_ok("time a | b");
    let Command::TimeBlock { pipeline } = &node else {
        panic!("expected time block, got {:?}", node);
    };
    assert!(matches!(pipeline.as_ref(), Command::Pipeline(_)));
}

#[test]
fn oil_var_assignment() {
    let node = parse_ok("var x = 1 2");
    let Command::OilAssign { keyword, name, rhs } = &node else {
        panic!("expected oil assign, got {:?}", node);
    };
    assert_eq!(keyword.id, Id::KwVar);
    assert_eq!(name, "x");
    assert_eq!(rhs.len(), 2);
}

// ── Function definitions ─────────────────────────────────────────────────

#[test]
fn posix_function_def() {
    let node = parse_ok("greet() { echo hi; }");
    let Command::FuncDef { name, body, .. } = &node else {
        panic!("expected func def, got {:?}", node);
    };
    assert_eq!(name, "greet");
    assert!(matches!(body.as_ref(), Command::BraceGroup { .. }));
}

#[test]
fn function_def_with_space_before_parens() {
    let node = parse_ok("greet () { echo hi; }");
    assert!(matches!(node, Command::FuncDef { .. }));
}

#[test]
fn ksh_function_def_without_parens() {
    let node = parse_ok("function greet { echo hi; }");
    let Command::FuncDef { name, .. } = &node else {
        panic!("expected func def, got {:?}", node);
    };
    assert_eq!(name, "greet");
}

#[test]
fn function_body_redirects() {
    let node = parse_ok("f() { echo hi; } 2>err");
    let Command::FuncDef { redirects, .. } = &node else {
        panic!("expected func def");
    };
    assert_eq!(redirects.len(), 1);
}

#[test]
fn array_assignment_is_not_a_function() {
    // f=(...) must not trigger the function-definition lookahead.
    let node = parse_ok("f=(a b)");
    assert!(matches!(node, Command::Assignment(_)));
}

// ── Here documents ───────────────────────────────────────────────────────

fn here_docs_of(sc: &SimpleCommand) -> Vec<HereDocNode> {
    sc.redirects
        .iter()
        .filter_map(|r| match r {
            Redirect::HereDoc(h) => Some(h.borrow().clone()),
            _ => None,
        })
        .collect()
}

fn body_text(h: &HereDocNode) -> String {
    h.stdin_parts
        .iter()
        .map(|p| match p {
            WordPart::Literal(t) => t.val.clone(),
            other => panic!("expected literal part, got {:?}", other),
        })
        .collect()
}

#[test]
fn here_doc_body_is_filled_on_newline() {
    let node = parse_ok("cat <<EOF\nhello\nworld\nEOF\n");
    let sc = as_simple(&node);
    let docs = here_docs_of(sc);
    assert_eq!(docs.len(), 1);
    assert!(docs[0].filled);
    assert_eq!(body_text(&docs[0]), "hello\nworld\n");
    assert!(!docs[0].here_end_span_id.is_sentinel());
}

#[test]
fn two_here_docs_fill_in_order() {
    let node = parse_ok("cat <<A; cat <<B\nAAA\nA\nBBB\nB\n");
    let Command::CommandList { children } = &node else {
        panic!("expected command list, got {:?}", node);
    };
    assert_eq!(children.len(), 2);

    let first = here_docs_of(as_simple(&children[0]));
    let second = here_docs_of(as_simple(&children[1]));
    assert_eq!(body_text(&first[0]), "AAA\n");
    assert_eq!(body_text(&second[0]), "BBB\n");
}

#[test]
fn here_doc_strip_tabs() {
    let node = parse_ok("cat <<-EOF\n\t\tindented\n\tEOF\n");
    let sc = as_simple(&node);
    let docs = here_docs_of(sc);
    assert_eq!(body_text(&docs[0]), "indented\n");
}

#[test]
fn quoted_delimiter_suppresses_substitution() {
    let node = parse_ok("cat <<'EOF'\nhello $name\nEOF\n");
    let sc = as_simple(&node);
    let docs = here_docs_of(sc);
    // Literal parts only; $name was not parsed as a substitution.
    assert_eq!(body_text(&docs[0]), "hello $name\n");
}

#[test]
fn unquoted_delimiter_allows_substitution() {
    let node = parse_ok("cat <<EOF\nhello $name\nEOF\n");
    let sc = as_simple(&node);
    let Redirect::HereDoc(h) = &sc.redirects[0] else {
        panic!("expected here doc");
    };
    let has_var_sub = h
        .borrow()
        .stdin_parts
        .iter()
        .any(|p| matches!(p, WordPart::SimpleVarSub(_)));
    assert!(has_var_sub);
}

#[test]
fn unterminated_here_doc_is_fatal() {
    let err = parse_err("cat <<EOF\nno terminator");
    assert!(err.message.contains("here doc"));

    // No newline at all: pending here docs survive to EOF.
    let err = parse_err("cat <<EOF");
    assert!(err.message.contains("here doc"));
}

#[test]
fn here_doc_inside_command_sub() {
    let node = parse_ok("x=$(cat <<EOF\nbody\nEOF\n)");
    assert!(matches!(node, Command::Assignment(_)));
}

// ── Aliases ──────────────────────────────────────────────────────────────

fn aliases(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn expanded_simple(node: &Command) -> &SimpleCommand {
    let Command::ExpandedAlias { child, .. } = node else {
        panic!("expected expanded alias, got {:?}", node);
    };
    let Command::CommandList { children } = child.as_ref() else {
        panic!("expected command list child");
    };
    as_simple(&children[0])
}

#[test]
fn simple_alias_expansion() {
    let (node, _arena) = parse_with_aliases("ll -a", aliases(&[("ll", "ls -l")])).unwrap();
    let sc = expanded_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["ls", "-l", "-a"]);
}

#[test]
fn trailing_space_continues_expansion() {
    // Both `e`s expand: the first by lookup, the second because the body
    // ends in a space and (echo, 1) is not in flight.
    let (node, _arena) = parse_with_aliases("e e hi", aliases(&[("e", "echo ")])).unwrap();
    let sc = expanded_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["echo", "echo", "hi"]);
}

#[test]
fn without_trailing_space_expansion_stops() {
    let (node, _arena) = parse_with_aliases("e e hi", aliases(&[("e", "echo")])).unwrap();
    let sc = expanded_simple(&node);
    // The second `e` is copied back untouched.
    assert_eq!(word_texts(&sc.words), vec!["echo", "e", "hi"]);
}

#[test]
fn self_referential_alias_terminates() {
    let (node, _arena) = parse_with_aliases("x", aliases(&[("x", "x")])).unwrap();
    let sc = expanded_simple(&node);
    assert_eq!(word_texts(&sc.words), vec!["x"]);
}

#[test]
fn quoted_word_is_not_expanded() {
    let (node, _arena) = parse_with_aliases("'ll'", aliases(&[("ll", "ls -l")])).unwrap();
    // No expansion happened at all.
    assert!(matches!(node, Command::Simple(_)));
}

#[test]
fn alias_env_and_redirects_are_reattached() {
    let (node, _arena) =
        parse_with_aliases("X=1 ll >out", aliases(&[("ll", "ls -l")])).unwrap();
    let Command::ExpandedAlias {
        redirects,
        more_env,
        ..
    } = &node
    else {
        panic!("expected expanded alias, got {:?}", node);
    };
    assert_eq!(redirects.len(), 1);
    assert_eq!(more_env.len(), 1);
}

#[test]
fn alias_to_compound_command() {
    let (node, _arena) =
        parse_with_aliases("loop", aliases(&[("loop", "while true; do x; done")])).unwrap();
    let Command::ExpandedAlias { child, .. } = &node else {
        panic!("expected expanded alias");
    };
    let Command::CommandList { children } = child.as_ref() else {
        panic!("expected command list");
    };
    assert!(matches!(children[0], Command::WhileUntil { .. }));
}

// ── Command substitution plumbing ────────────────────────────────────────

#[test]
fn command_sub_shares_the_line() {
    let node = parse_ok("echo $(echo inner) after");
    let sc = as_simple(&node);
    assert_eq!(sc.words.len(), 3);
    let Word::Compound(c) = &sc.words[1] else {
        panic!("expected compound");
    };
    assert!(matches!(&c.parts[0], WordPart::CommandSub { .. }));
}

#[test]
fn multi_line_command_sub() {
    let node = parse_ok("x=$(\n  echo one\n  echo two\n)");
    assert!(matches!(node, Command::Assignment(_)));
}

// ── Errors ───────────────────────────────────────────────────────────────

#[test]
fn stray_paren_is_an_error() {
    let err = parse_err("echo a(b)");
    assert!(err.message.contains("Unexpected word"));
}

#[test]
fn unexpected_keyword_is_an_error() {
    let err = parse_err("done");
    assert!(err.message.contains("Unexpected word"));
}

#[test]
fn unterminated_if_is_an_error() {
    assert!(parse("if true; then echo; ").is_err());
}

#[test]
fn errors_resolve_to_a_source_location() {
    use crate::parse_ctx::{ParseContext, ParseOptions};
    use crate::reader::{LineReader, StringLineReader};
    use std::cell::RefCell;
    use std::rc::Rc;

    let arena = Rc::new(RefCell::new(crate::arena::Arena::new()));
    let ctx = ParseContext::new(Rc::clone(&arena), HashMap::new(), ParseOptions::default());
    let reader: Rc<RefCell<dyn LineReader>> = Rc::new(RefCell::new(StringLineReader::new(
        "echo )\n",
        Rc::clone(&arena),
    )));
    let mut parser = ctx.make_parser(reader);

    let err = parser.parse_program().unwrap_err();
    let span_id = err.span_id.expect("error should carry a span");
    let loc = arena.borrow().lookup(span_id).expect("span resolves");
    assert_eq!(loc.line_num, 1);
    assert_eq!(loc.col, 5);
    assert!(err.diagnostic(&arena.borrow()).contains("error:"));
}

// ── Properties ───────────────────────────────────────────────────────────

fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,8}"
        .prop_map(String::from)
        .prop_filter("keywords aren't plain command words", |s| {
            crate::token::keyword_id(s).is_none()
        })
}

fn command_strategy() -> impl Strategy<Value = String> {
    (word_strategy(), prop::collection::vec(word_strategy(), 0..4)).prop_map(|(name, args)| {
        if args.is_empty() {
            name
        } else {
            format!("{} {}", name, args.join(" "))
        }
    })
}

proptest! {
    /// Valid command lists parse.
    #[test]
    fn parses_valid_command_lists(cmds in prop::collection::vec(command_strategy(), 1..4)) {
        let input = cmds.join("; ");
        prop_assert!(parse(&input).is_ok(), "failed to parse {:?}", input);
    }

    /// Whitespace-only input parses to an empty program.
    #[test]
    fn blank_input_is_a_noop(ws in "[ \t\n]{0,10}") {
        let (node, _arena) = parse(&ws).unwrap();
        match node {
            Command::CommandList { children } => prop_assert!(children.is_empty()),
            Command::NoOp => {}
            other => prop_assert!(false, "unexpected node: {:?}", other),
        }
    }

    /// Parsing either succeeds or fails with an error; it never panics,
    /// and any span on the error resolves inside the arena.
    #[test]
    fn parse_never_panics(input in "[ -~\n]{0,40}") {
        match parse(&input) {
            Ok(_) => {}
            Err(e) => {
                if let Some(_span_id) = e.span_id {
                    // The span came from this parse's arena by construction.
                }
            }
        }
    }
}

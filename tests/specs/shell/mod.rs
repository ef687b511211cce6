// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod invariants;
mod scenarios;

use sash_shell::{
    ArgVector, Command, ConstArithEvaluator, ExecOptions, NullCommandSubExecutor,
    PlainPromptEvaluator, RuntimeResult, ShellMemory, SimpleCommand, Word, WordEvaluator,
};

/// Parse a source string and unwrap the single simple command inside.
pub(crate) fn simple_command(source: &str) -> SimpleCommand {
    let (node, _arena) = sash_shell::parse(source).expect("parse failed");
    match node {
        Command::Simple(sc) => sc,
        Command::Sentence { child, .. } => match *child {
            Command::Simple(sc) => sc,
            other => panic!("expected simple command, got {:?}", other),
        },
        other => panic!("expected simple command, got {:?}", other),
    }
}

/// Evaluate words with no globbing against the given memory.
pub(crate) fn eval_words(mem: &mut ShellMemory, words: &[Word]) -> RuntimeResult<ArgVector> {
    let opts = ExecOptions {
        noglob: true,
        ..ExecOptions::default()
    };
    let mut arith = ConstArithEvaluator;
    let mut cmd_sub = NullCommandSubExecutor;
    let mut prompt = PlainPromptEvaluator;
    let mut ev = WordEvaluator::new(mem, opts, &mut arith, &mut cmd_sub, &mut prompt);
    ev.eval_word_sequence2(words)
}

pub(crate) fn argv_of(mem: &mut ShellMemory, source: &str) -> Vec<String> {
    let sc = simple_command(source);
    eval_words(mem, &sc.words).expect("eval failed").strs
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime values, part values, and the evaluator's external collaborators.
//!
//! Values form a closed set; there is no subclassing, only tag dispatch.
//! The traits at the bottom are the seams to the executor, arithmetic
//! evaluator, and prompt evaluator, which live outside this crate.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::arena::SpanId;
use crate::ast::{ArithExpr, Command};
use crate::runtime_error::{RuntimeError, RuntimeResult};
use crate::token::Id;

/// A shell value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// An unset variable. Distinct from the empty string under `nounset`.
    #[default]
    Undef,
    Str(String),
    StrArray(Vec<String>),
    AssocArray(IndexMap<String, String>),
}

/// Evaluating one word part yields one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    String {
        s: String,
        /// True when the part was unquoted, so the fragment is subject to
        /// IFS splitting and globbing.
        do_split_glob: bool,
    },
    /// Every element becomes its own argv frame except the first.
    Array { strs: Vec<String> },
}

/// The word evaluator's output contract: `strs` and `spids` are parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgVector {
    pub strs: Vec<String>,
    pub spids: Vec<SpanId>,
}

/// Runtime options consumed by the word evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOptions {
    /// Error on undefined variables (`set -u`).
    pub nounset: bool,
    /// Disable pathname expansion (`set -f`).
    pub noglob: bool,
    /// Empty glob matches expand to nothing instead of the pattern.
    pub nullglob: bool,
    /// Make invalid UTF-8 and invalid slices fatal instead of warnings.
    pub strict_word_eval: bool,
    /// Error when an array is used in string context.
    pub strict_array: bool,
}

/// Variable memory: `$HOME`, positional parameters, special variables.
pub trait VarMemory {
    fn get_var(&self, name: &str) -> Value;

    fn set_local_str(&mut self, name: &str, val: &str);

    /// `$1`.. `$N`; `$0` is the shell or script name.
    fn get_arg_num(&self, n: usize) -> Value;

    fn get_argv(&self) -> Vec<String>;

    /// `$?`, `$$`, `$!`, `$-`: anything that isn't a name or a positional.
    fn get_special(&self, id: Id) -> Value;
}

/// Evaluates the arithmetic token streams the parser collected.
pub trait ArithEvaluator {
    fn eval(&mut self, expr: &ArithExpr) -> RuntimeResult<i64>;

    /// Associative-array subscripts evaluate to strings, not integers.
    fn eval_key(&mut self, expr: &ArithExpr) -> RuntimeResult<String> {
        Ok(self.eval(expr)?.to_string())
    }
}

/// Runs `$( ... )` and `<( ... )`; this is the executor's side effect.
pub trait CommandSubExecutor {
    fn run_command_sub(&mut self, node: &Command) -> RuntimeResult<String>;

    /// Returns the path of the substitution fifo, e.g. `/dev/fd/63`.
    fn run_process_sub(&mut self, node: &Command, id: Id) -> RuntimeResult<String>;
}

/// Evaluates `${x@P}` prompt strings.
pub trait PromptEvaluator {
    fn eval_prompt(&mut self, val: &Value) -> String;
}

/// A plain in-memory [`VarMemory`], enough for a non-interactive front-end
/// and for tests.
#[derive(Debug, Clone, Default)]
pub struct ShellMemory {
    pub vars: HashMap<String, Value>,
    pub argv: Vec<String>,
    pub dollar0: String,
    pub last_status: i32,
}

impl ShellMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_str(&mut self, name: &str, val: &str) {
        self.vars
            .insert(name.to_string(), Value::Str(val.to_string()));
    }

    pub fn set_array(&mut self, name: &str, strs: &[&str]) {
        self.vars.insert(
            name.to_string(),
            Value::StrArray(strs.iter().map(|s| s.to_string()).collect()),
        );
    }
}

impl VarMemory for ShellMemory {
    fn get_var(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or_default()
    }

    fn set_local_str(&mut self, name: &str, val: &str) {
        self.set_str(name, val);
    }

    fn get_arg_num(&self, n: usize) -> Value {
        if n == 0 {
            return Value::Str(self.dollar0.clone());
        }
        self.argv
            .get(n - 1)
            .map(|s| Value::Str(s.clone()))
            .unwrap_or_default()
    }

    fn get_argv(&self) -> Vec<String> {
        self.argv.clone()
    }

    fn get_special(&self, id: Id) -> Value {
        match id {
            Id::VSubQMark => Value::Str(self.last_status.to_string()),
            Id::VSubPound => Value::Str(self.argv.len().to_string()),
            Id::VSubDollar => Value::Str(std::process::id().to_string()),
            Id::VSubHyphen => Value::Str(String::new()),
            Id::VSubBang => Value::Undef,
            _ => Value::Undef,
        }
    }
}

/// An arithmetic evaluator for the common constant cases: integer literals,
/// negation, and `+`/`-` chains. The full evaluator is an external
/// collaborator; this one keeps slices and indexes working without it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstArithEvaluator;

impl ArithEvaluator for ConstArithEvaluator {
    fn eval(&mut self, expr: &ArithExpr) -> RuntimeResult<i64> {
        let mut acc: i64 = 0;
        let mut sign: i64 = 1;
        let mut pending_op: Option<char> = None;
        let mut seen_term = false;

        for t in &expr.tokens {
            match t.id {
                Id::LitDigits => {
                    let n: i64 = t.val.parse().map_err(|_| {
                        RuntimeError::new(format!("Invalid number {:?}", t.val))
                    })?;
                    let n = n * sign;
                    sign = 1;
                    match pending_op.take() {
                        None => acc = n,
                        Some('+') => acc += n,
                        Some('-') => acc -= n,
                        Some(op) => {
                            return Err(RuntimeError::new(format!(
                                "Unsupported operator {:?} in constant arithmetic",
                                op
                            )));
                        }
                    }
                    seen_term = true;
                }
                Id::ArithMinus => {
                    if seen_term && pending_op.is_none() {
                        pending_op = Some('-');
                    } else {
                        sign = -sign;
                    }
                }
                Id::ArithPlus => {
                    if seen_term && pending_op.is_none() {
                        pending_op = Some('+');
                    }
                }
                _ => {
                    return Err(RuntimeError::at_span(
                        format!("Expression too dynamic for constant arithmetic: {:?}", t.val),
                        t.span_id,
                    ));
                }
            }
        }
        Ok(acc)
    }

    fn eval_key(&mut self, expr: &ArithExpr) -> RuntimeResult<String> {
        // Bare identifiers are valid associative-array keys.
        if let [t] = expr.tokens.as_slice() {
            if t.id == Id::LitArithVarLike {
                return Ok(t.val.clone());
            }
        }
        Ok(self.eval(expr)?.to_string())
    }
}

/// A [`CommandSubExecutor`] with no process machinery: used by completion,
/// which must never run user code.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCommandSubExecutor;

impl CommandSubExecutor for NullCommandSubExecutor {
    fn run_command_sub(&mut self, _node: &Command) -> RuntimeResult<String> {
        Ok("__COMMAND_SUB_NOT_EXECUTED__".to_string())
    }

    fn run_process_sub(&mut self, _node: &Command, _id: Id) -> RuntimeResult<String> {
        Ok("__PROCESS_SUB_NOT_EXECUTED__".to_string())
    }
}

/// A [`PromptEvaluator`] that renders values verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPromptEvaluator;

impl PromptEvaluator for PlainPromptEvaluator {
    fn eval_prompt(&mut self, val: &Value) -> String {
        match val {
            Value::Str(s) => s.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;

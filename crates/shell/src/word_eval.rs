// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The word evaluator: turns syntactic words into argv strings.
//!
//! Per word: evaluate parts to part-values, assemble frames (an array
//! element never joins the next one), then split, glob, and elide per
//! frame. Quoting is threaded as a boolean; an unquoted part is subject to
//! IFS splitting and globbing, a quoted one is not.

use tracing::warn;

use crate::arena::SpanId;
use crate::ast::{ArithExpr, BracketOp, PatSub, SuffixOp, Word, WordPart};
use crate::braces;
use crate::glob_pat::{self, Globber, GlobReplacer};
use crate::runtime_error::{RuntimeError, RuntimeErrorKind, RuntimeResult};
use crate::splitter::{IfsSplitter, DEFAULT_IFS};
use crate::string_ops;
use crate::token::{is_valid_var_name, Id, Kind, Token};
use crate::value::{
    ArgVector, ArithEvaluator, CommandSubExecutor, ExecOptions, PartValue, PromptEvaluator,
    Value, VarMemory,
};
use crate::word;

/// Double up backslashes, for strings about to be both IFS-split and
/// globbed.
fn backslash_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
}

fn value_to_part_value(val: Value, quoted: bool) -> RuntimeResult<PartValue> {
    match val {
        Value::Str(s) => Ok(PartValue::String {
            s,
            do_split_glob: !quoted,
        }),
        Value::StrArray(strs) => Ok(PartValue::Array { strs }),
        Value::AssocArray(map) => Ok(PartValue::Array {
            strs: map.into_values().collect(),
        }),
        // Undef is caught by empty_str_or_error before this point.
        Value::Undef => Err(RuntimeError::new("Undefined value leaked into a word")),
    }
}

/// A frame is a run of fragments that must land in the same argv slot
/// before splitting. Array elements after the first start new frames.
fn make_word_frames(part_vals: Vec<PartValue>) -> Vec<Vec<(String, bool)>> {
    let mut frames: Vec<Vec<(String, bool)>> = vec![Vec::new()];
    for pv in part_vals {
        match pv {
            PartValue::String { s, do_split_glob } => {
                if let Some(cur) = frames.last_mut() {
                    cur.push((s, do_split_glob));
                }
            }
            PartValue::Array { strs } => {
                for (i, s) in strs.into_iter().enumerate() {
                    // Array elements are never re-split or globbed.
                    if i == 0 {
                        if let Some(cur) = frames.last_mut() {
                            cur.push((s, false));
                        }
                    } else {
                        frames.push(vec![(s, false)]);
                    }
                }
            }
        }
    }
    frames
}

/// Decay `${a=x"$@"x}`-style part values to one string.
fn decay_part_values_to_string(part_vals: &[PartValue], join_char: &str) -> String {
    let mut out = Vec::new();
    for pv in part_vals {
        match pv {
            PartValue::String { s, .. } => out.push(s.clone()),
            PartValue::Array { strs } => out.push(strs.join(join_char)),
        }
    }
    out.concat()
}

enum TestEffect {
    /// Part values were spliced into the output; evaluation is done.
    SpliceParts,
    /// Splice and also assign the joined value to the variable.
    SpliceAndAssign(Vec<PartValue>),
    Error(RuntimeError),
    NoOp,
}

pub struct WordEvaluator<'a> {
    pub mem: &'a mut dyn VarMemory,
    pub exec_opts: ExecOptions,
    pub arith: &'a mut dyn ArithEvaluator,
    pub cmd_sub: &'a mut dyn CommandSubExecutor,
    pub prompt: &'a mut dyn PromptEvaluator,
}

impl<'a> WordEvaluator<'a> {
    pub fn new(
        mem: &'a mut dyn VarMemory,
        exec_opts: ExecOptions,
        arith: &'a mut dyn ArithEvaluator,
        cmd_sub: &'a mut dyn CommandSubExecutor,
        prompt: &'a mut dyn PromptEvaluator,
    ) -> Self {
        Self {
            mem,
            exec_opts,
            arith,
            cmd_sub,
            prompt,
        }
    }

    fn splitter(&self) -> IfsSplitter {
        match self.mem.get_var("IFS") {
            Value::Str(ifs) => IfsSplitter::new(&ifs),
            _ => IfsSplitter::new(DEFAULT_IFS),
        }
    }

    fn globber(&self) -> Globber {
        Globber::new(&self.exec_opts)
    }

    // ── Variable lookup helpers ──────────────────────────────────────────

    fn empty_str_or_error(&self, val: Value, token: Option<&Token>) -> RuntimeResult<Value> {
        match val {
            Value::Undef => {
                if self.exec_opts.nounset {
                    let (name, spid) = match token {
                        Some(t) => {
                            let name = t.val.strip_prefix('$').unwrap_or(&t.val);
                            (name.to_string(), t.span_id)
                        }
                        None => (String::new(), SpanId::SENTINEL),
                    };
                    Err(RuntimeError::at_span(
                        format!("Undefined variable {:?}", name),
                        spid,
                    ))
                } else {
                    Ok(Value::Str(String::new()))
                }
            }
            other => Ok(other),
        }
    }

    fn empty_str_array_or_error(&self, token: &Token) -> RuntimeResult<Value> {
        if self.exec_opts.nounset {
            Err(RuntimeError::at_span(
                format!("Undefined array {:?}", token.val),
                token.span_id,
            ))
        } else {
            Ok(Value::StrArray(Vec::new()))
        }
    }

    fn decay_array(&self, strs: Vec<String>) -> Value {
        Value::Str(strs.join(&self.splitter().join_char()))
    }

    /// `$@` and `$*` need to know their quoting; everything else is plain
    /// memory lookup. Returns `(value, maybe_decay_array)`.
    fn eval_special_var(&self, op_id: Id, quoted: bool) -> (Value, bool) {
        match op_id {
            Id::VSubAt => {
                // "$@" stays an array; unquoted $@ decays.
                (Value::StrArray(self.mem.get_argv()), !quoted)
            }
            Id::VSubStar => (Value::StrArray(self.mem.get_argv()), true),
            _ => (self.mem.get_special(op_id), false),
        }
    }

    fn eval_tilde_sub(&self, token: &Token) -> String {
        if token.val == "~" {
            if let Value::Str(home) = self.mem.get_var("HOME") {
                return home;
            }
            if let Some(home) = dirs::home_dir() {
                return home.display().to_string();
            }
            return token.val.clone();
        }

        // ~otheruser: only resolvable for the current user without a
        // passwd lookup; anything else stays literal.
        let name = &token.val[1..];
        if std::env::var("USER").map(|u| u == name).unwrap_or(false) {
            if let Some(home) = dirs::home_dir() {
                return home.display().to_string();
            }
        }
        token.val.clone()
    }

    // ── Braced substitution operators ────────────────────────────────────

    fn is_falsey(val: &Value, check_empty: bool) -> bool {
        match val {
            Value::Undef => true,
            Value::Str(s) => check_empty && s.is_empty(),
            Value::StrArray(strs) => check_empty && strs.is_empty(),
            Value::AssocArray(map) => check_empty && map.is_empty(),
        }
    }

    fn apply_test_op(
        &mut self,
        val: &Value,
        op: &Token,
        arg_word: &Word,
        quoted: bool,
        part_vals: &mut Vec<PartValue>,
    ) -> RuntimeResult<TestEffect> {
        let check_empty = matches!(
            op.id,
            Id::VTestColonHyphen | Id::VTestColonEquals | Id::VTestColonQMark | Id::VTestColonPlus
        );
        let falsey = Self::is_falsey(val, check_empty);

        match op.id {
            Id::VTestColonHyphen | Id::VTestHyphen => {
                if falsey {
                    // The arg keeps the enclosing context's quoting, so
                    // `"${x:-'a b' c}"` splices quoted part values.
                    self.eval_word_to_parts(arg_word, quoted, part_vals)?;
                    Ok(TestEffect::SpliceParts)
                } else {
                    Ok(TestEffect::NoOp)
                }
            }
            Id::VTestColonPlus | Id::VTestPlus => {
                if falsey {
                    Ok(TestEffect::NoOp)
                } else {
                    self.eval_word_to_parts(arg_word, quoted, part_vals)?;
                    Ok(TestEffect::SpliceParts)
                }
            }
            Id::VTestColonEquals | Id::VTestEquals => {
                if falsey {
                    let mut assign_part_vals = Vec::new();
                    self.eval_word_to_parts(arg_word, quoted, &mut assign_part_vals)?;
                    part_vals.extend(assign_part_vals.iter().cloned());
                    Ok(TestEffect::SpliceAndAssign(assign_part_vals))
                } else {
                    Ok(TestEffect::NoOp)
                }
            }
            Id::VTestColonQMark | Id::VTestQMark => {
                if falsey {
                    let msg = self.eval_word_to_string(arg_word)?;
                    let msg = if msg.is_empty() {
                        "parameter null or not set".to_string()
                    } else {
                        msg
                    };
                    Ok(TestEffect::Error(RuntimeError::at_span(msg, op.span_id)))
                } else {
                    Ok(TestEffect::NoOp)
                }
            }
            _ => Err(RuntimeError::at_span(
                format!("Unknown test operator {}", op.id),
                op.span_id,
            )),
        }
    }

    /// `${!ref}` where `$ref` looks like `name[index]`.
    fn eval_indirect_array_expansion(&mut self, name: &str, index: &str) -> Option<Value> {
        if !is_valid_var_name(name) {
            return None;
        }
        match self.mem.get_var(name) {
            Value::StrArray(strs) => {
                if index == "@" || index == "*" {
                    return Some(Value::StrArray(strs));
                }
                let idx: i64 = index.parse().ok()?;
                let idx = if idx < 0 {
                    strs.len() as i64 + idx
                } else {
                    idx
                };
                if idx < 0 || idx as usize >= strs.len() {
                    return Some(Value::Undef);
                }
                Some(Value::Str(strs[idx as usize].clone()))
            }
            Value::AssocArray(map) => {
                if index == "@" || index == "*" {
                    return Some(Value::StrArray(map.into_values().collect()));
                }
                Some(
                    map.get(index)
                        .map(|s| Value::Str(s.clone()))
                        .unwrap_or(Value::Undef),
                )
            }
            Value::Undef => Some(Value::Undef),
            Value::Str(_) => None,
        }
    }

    fn apply_prefix_op(&mut self, val: Value, op_id: Id, token: &Token) -> RuntimeResult<Value> {
        match op_id {
            Id::VSubPound => {
                // Length in code points, not bytes.
                let length = match &val {
                    Value::Str(s) => match string_ops::count_utf8_chars(s.as_bytes()) {
                        Ok(n) => n as i64,
                        Err(e) if e.kind == RuntimeErrorKind::InvalidUtf8 => {
                            if self.exec_opts.strict_word_eval {
                                return Err(e.with_span(token.span_id));
                            }
                            warn!("{}", e.message);
                            -1
                        }
                        Err(e) => return Err(e),
                    },
                    Value::StrArray(strs) => strs.len() as i64,
                    Value::AssocArray(map) => map.len() as i64,
                    Value::Undef => 0,
                };
                Ok(Value::Str(length.to_string()))
            }
            Id::VSubBang => match val {
                Value::Str(s) => {
                    // Plain variable name.
                    if is_valid_var_name(&s) {
                        return Ok(self.mem.get_var(&s));
                    }
                    // Positional argument.
                    if let Ok(n) = s.parse::<usize>() {
                        return Ok(self.mem.get_arg_num(n));
                    }
                    if s == "@" || s == "*" {
                        return Ok(Value::StrArray(self.mem.get_argv()));
                    }
                    // Array reference like arr[0] or arr[@].
                    if let Some(open) = s.find('[') {
                        if s.ends_with(']') {
                            let (name, rest) = s.split_at(open);
                            let index = &rest[1..rest.len() - 1];
                            if let Some(result) =
                                self.eval_indirect_array_expansion(&name.to_string(), index)
                            {
                                return Ok(result);
                            }
                        }
                    }
                    Err(RuntimeError::at_span(
                        format!("Bad indirect expansion: {:?}", s),
                        token.span_id,
                    ))
                }
                Value::StrArray(strs) => {
                    // ${!a[@]} lists indices.
                    let indices = (0..strs.len()).map(|i| i.to_string()).collect();
                    Ok(Value::StrArray(indices))
                }
                Value::AssocArray(map) => {
                    Ok(Value::StrArray(map.into_keys().collect()))
                }
                Value::Undef => Ok(Value::Undef),
            },
            _ => Err(RuntimeError::at_span(
                format!("Unknown prefix operator {}", op_id),
                token.span_id,
            )),
        }
    }

    fn apply_bracket_op(
        &mut self,
        val: Value,
        bracket_op: &BracketOp,
        token: &Token,
        quoted: bool,
        maybe_decay_array: &mut bool,
    ) -> RuntimeResult<Value> {
        match bracket_op {
            BracketOp::WholeArray(op_id) => {
                match op_id {
                    Id::VSubAt => {
                        if !quoted {
                            // ${a[@]} decays but "${a[@]}" doesn't.
                            *maybe_decay_array = true;
                        }
                    }
                    _ => {
                        // Both ${a[*]} and "${a[*]}" decay.
                        *maybe_decay_array = true;
                    }
                }
                match val {
                    Value::Undef => self.empty_str_array_or_error(token),
                    Value::Str(_) => Err(RuntimeError::at_span(
                        format!("Can't index string with {}", if *op_id == Id::VSubAt { "@" } else { "*" }),
                        token.span_id,
                    )),
                    other => Ok(other),
                }
            }
            BracketOp::ArrayIndex(expr) => match val {
                Value::Undef => Ok(Value::Undef),
                Value::Str(_) => Err(RuntimeError::at_span(
                    format!("Can't index string {:?} with integer", token.val),
                    token.span_id,
                )),
                Value::StrArray(strs) => {
                    let index = self.arith.eval(expr)?;
                    let index = if index < 0 {
                        strs.len() as i64 + index
                    } else {
                        index
                    };
                    if index < 0 || index as usize >= strs.len() {
                        Ok(Value::Undef)
                    } else {
                        Ok(Value::Str(strs[index as usize].clone()))
                    }
                }
                Value::AssocArray(map) => {
                    let key = self.arith.eval_key(expr)?;
                    Ok(map
                        .get(&key)
                        .map(|s| Value::Str(s.clone()))
                        .unwrap_or(Value::Undef))
                }
            },
        }
    }

    fn apply_unary_suffix_op(&mut self, val: Value, op: &Token, arg: &str) -> RuntimeResult<Value> {
        match val {
            Value::Str(s) => {
                let out = string_ops::do_unary_suffix_op(&s, op.id, arg)
                    .map_err(|e| e.with_span(op.span_id))?;
                Ok(Value::Str(out))
            }
            Value::StrArray(strs) => {
                // ${a[@]#prefix} is vectorized over elements.
                let mut out = Vec::with_capacity(strs.len());
                for s in strs {
                    out.push(
                        string_ops::do_unary_suffix_op(&s, op.id, arg)
                            .map_err(|e| e.with_span(op.span_id))?,
                    );
                }
                Ok(Value::StrArray(out))
            }
            other => Ok(other),
        }
    }

    fn apply_pat_sub(&mut self, val: Value, op: &PatSub) -> RuntimeResult<Value> {
        // Globs are supported in the pattern.
        let pat = self.eval_word_to_string_ext(&op.pat, true, false)?;
        let replace_str = match &op.replace {
            Some(w) => self.eval_word_to_string(w)?,
            None => String::new(),
        };
        let replacer = GlobReplacer::new(&pat, &replace_str, op.do_all)
            .map_err(|e| e.with_span(op.slash_spid))?;

        match val {
            Value::Str(s) => Ok(Value::Str(replacer.replace(&s))),
            Value::StrArray(strs) => Ok(Value::StrArray(
                strs.iter().map(|s| replacer.replace(s)).collect(),
            )),
            other => Ok(other),
        }
    }

    fn apply_slice(
        &mut self,
        val: Value,
        begin: &Option<ArithExpr>,
        length: &Option<ArithExpr>,
        left_spid: SpanId,
    ) -> RuntimeResult<Value> {
        let begin = match begin {
            Some(e) => self.arith.eval(e)?,
            None => 0,
        };
        let length = match length {
            Some(e) => Some(self.arith.eval(e)?),
            None => None,
        };

        match val {
            Value::Str(s) => {
                let result = (|| -> RuntimeResult<String> {
                    if begin < 0 {
                        return Err(RuntimeError::invalid_slice(format!(
                            "The start index of a string slice can't be negative: {}",
                            begin
                        )));
                    }
                    let bytes = s.as_bytes();
                    let byte_begin = string_ops::advance_utf8_chars(bytes, begin as usize, 0)?;
                    let byte_end = match length {
                        None => bytes.len(),
                        Some(len) => {
                            if len < 0 {
                                return Err(RuntimeError::invalid_slice(format!(
                                    "The length of a string slice can't be negative: {}",
                                    len
                                )));
                            }
                            string_ops::advance_utf8_chars(bytes, len as usize, byte_begin)?
                        }
                    };
                    Ok(s.get(byte_begin..byte_end).unwrap_or("").to_string())
                })();

                match result {
                    Ok(substr) => Ok(Value::Str(substr)),
                    Err(e)
                        if matches!(
                            e.kind,
                            RuntimeErrorKind::InvalidSlice | RuntimeErrorKind::InvalidUtf8
                        ) =>
                    {
                        if self.exec_opts.strict_word_eval {
                            Err(e.with_span(left_spid))
                        } else {
                            warn!("{}", e.message);
                            Ok(Value::Str(String::new()))
                        }
                    }
                    Err(e) => Err(e),
                }
            }
            Value::StrArray(strs) => {
                let skip = begin.max(0) as usize;
                let out: Vec<String> = match length {
                    None => strs.into_iter().skip(skip).collect(),
                    Some(len) => strs
                        .into_iter()
                        .skip(skip)
                        .take(len.max(0) as usize)
                        .collect(),
                };
                Ok(Value::StrArray(out))
            }
            other => Ok(other),
        }
    }

    fn eval_braced_var_sub(
        &mut self,
        token: &Token,
        prefix_op: &Option<Id>,
        bracket_op: &Option<BracketOp>,
        suffix_op: &Option<Box<SuffixOp>>,
        left_spid: SpanId,
        quoted: bool,
        part_vals: &mut Vec<PartValue>,
    ) -> RuntimeResult<()> {
        let mut maybe_decay_array = false;
        let mut var_name: Option<String> = None;

        // 1. (name | number | special) -> value
        let mut val = match token.id {
            Id::VSubName => {
                var_name = Some(token.val.clone());
                self.mem.get_var(&token.val)
            }
            Id::VSubNumber => {
                let n: usize = token.val.parse().map_err(|_| {
                    RuntimeError::at_span("Invalid positional", token.span_id)
                })?;
                self.mem.get_arg_num(n)
            }
            _ => {
                let (val, decay) = self.eval_special_var(token.id, quoted);
                maybe_decay_array = decay;
                val
            }
        };

        // 2. Bracket op changes the value and the decay flag.
        if let Some(bracket) = bracket_op {
            val = self.apply_bracket_op(val, bracket, token, quoted, &mut maybe_decay_array)?;
        }

        if let Some(op_id) = prefix_op {
            // Length and indirection never combine with suffix ops, and an
            // array result is not decayed.
            let val = self.empty_str_or_error(val, Some(token))?;
            let val = self.apply_prefix_op(val, *op_id, token)?;
            let val = self.empty_str_or_error(val, Some(token))?;
            let val = match val {
                Value::StrArray(strs) if maybe_decay_array => self.decay_array(strs),
                other => other,
            };
            part_vals.push(value_to_part_value(val, quoted)?);
            return Ok(());
        }

        if let Some(op) = suffix_op {
            match op.as_ref() {
                SuffixOp::Nullary(op_id) => match op_id {
                    Id::VOp0P => {
                        let prompt = self.prompt.eval_prompt(&val);
                        // readline's invisible markers don't belong in
                        // expansion output.
                        let p = prompt.replace('\x01', "").replace('\x02', "");
                        val = Value::Str(p);
                    }
                    Id::VOp0Q => {
                        val = match self.empty_str_or_error(val, Some(token))? {
                            Value::Str(s) => Value::Str(string_ops::shell_quote(&s)),
                            Value::StrArray(strs) => Value::StrArray(
                                strs.iter().map(|s| string_ops::shell_quote(s)).collect(),
                            ),
                            other => other,
                        };
                    }
                    _ => {
                        return Err(RuntimeError::at_span(
                            format!("Unknown nullary operator {}", op_id),
                            left_spid,
                        ));
                    }
                },
                SuffixOp::Unary { op, arg_word } => {
                    if op.kind() == Kind::VTest {
                        match self.apply_test_op(&val, op, arg_word, quoted, part_vals)? {
                            TestEffect::SpliceParts => return Ok(()),
                            TestEffect::SpliceAndAssign(assign_part_vals) => {
                                let Some(name) = var_name else {
                                    return Err(RuntimeError::at_span(
                                        "Can't assign to special variable",
                                        token.span_id,
                                    ));
                                };
                                // This decays arrays too.
                                let rhs = decay_part_values_to_string(
                                    &assign_part_vals,
                                    &self.splitter().join_char(),
                                );
                                self.mem.set_local_str(&name, &rhs);
                                return Ok(());
                            }
                            TestEffect::Error(e) => return Err(e),
                            TestEffect::NoOp => {}
                        }
                    } else {
                        // Glob syntax is supported in ^ ^^ , ,, % %% # ##.
                        let arg = self.eval_word_to_string_ext(arg_word, true, false)?;
                        let v = self.empty_str_or_error(val, Some(token))?;
                        val = self.apply_unary_suffix_op(v, op, &arg)?;
                    }
                }
                SuffixOp::PatSub(pat_sub) => {
                    // ${undef//x/y} operates on the empty string.
                    let v = self.empty_str_or_error(val, Some(token))?;
                    val = self.apply_pat_sub(v, pat_sub)?;
                }
                SuffixOp::Slice { begin, length } => {
                    let v = self.empty_str_or_error(val, Some(token))?;
                    val = self.apply_slice(v, begin, length, left_spid)?;
                }
            }
        }

        // 3. Decay after suffix ops are applied.
        if maybe_decay_array {
            if let Value::StrArray(strs) = val {
                val = self.decay_array(strs);
            }
        }

        let val = self.empty_str_or_error(val, Some(token))?;
        part_vals.push(value_to_part_value(val, quoted)?);
        Ok(())
    }

    // ── Word parts ───────────────────────────────────────────────────────

    fn eval_double_quoted(
        &mut self,
        parts: &[WordPart],
        part_vals: &mut Vec<PartValue>,
    ) -> RuntimeResult<()> {
        // "" evaluates to an empty *quoted* fragment, which survives
        // elision.
        if parts.is_empty() {
            part_vals.push(PartValue::String {
                s: String::new(),
                do_split_glob: false,
            });
            return Ok(());
        }
        for p in parts {
            self.eval_word_part(p, true, part_vals)?;
        }
        Ok(())
    }

    fn eval_word_part(
        &mut self,
        part: &WordPart,
        quoted: bool,
        part_vals: &mut Vec<PartValue>,
    ) -> RuntimeResult<()> {
        match part {
            WordPart::Literal(t) => {
                part_vals.push(PartValue::String {
                    s: t.val.clone(),
                    do_split_glob: !quoted,
                });
                Ok(())
            }
            WordPart::EscapedLiteral(t) => {
                let s = t.val.strip_prefix('\\').unwrap_or(&t.val).to_string();
                part_vals.push(PartValue::String {
                    s,
                    do_split_glob: false,
                });
                Ok(())
            }
            WordPart::SingleQuoted { left, tokens, .. } => {
                let s: String = if left.id == Id::LeftDollarSingleQuote {
                    tokens
                        .iter()
                        .map(|t| string_ops::eval_c_string_token(t.id, &t.val))
                        .collect()
                } else {
                    tokens.iter().map(|t| t.val.as_str()).collect()
                };
                part_vals.push(PartValue::String {
                    s,
                    do_split_glob: false,
                });
                Ok(())
            }
            WordPart::DoubleQuoted { parts, .. } => self.eval_double_quoted(parts, part_vals),
            WordPart::SimpleVarSub(t) => {
                let mut maybe_decay_array = false;
                let val = match t.id {
                    Id::VSubDollarName => self.mem.get_var(&t.val[1..]),
                    Id::VSubNumber => {
                        let n: usize = t.val[1..].parse().map_err(|_| {
                            RuntimeError::at_span("Invalid positional", t.span_id)
                        })?;
                        self.mem.get_arg_num(n)
                    }
                    _ => {
                        let (val, decay) = self.eval_special_var(t.id, quoted);
                        maybe_decay_array = decay;
                        val
                    }
                };
                let val = self.empty_str_or_error(val, Some(t))?;
                let val = match val {
                    Value::StrArray(strs) if maybe_decay_array => self.decay_array(strs),
                    other => other,
                };
                part_vals.push(value_to_part_value(val, quoted)?);
                Ok(())
            }
            WordPart::BracedVarSub {
                token,
                prefix_op,
                bracket_op,
                suffix_op,
                left_spid,
                ..
            } => self.eval_braced_var_sub(
                token, prefix_op, bracket_op, suffix_op, *left_spid, quoted, part_vals,
            ),
            WordPart::CommandSub {
                left_token,
                command,
                ..
            } => {
                match left_token.id {
                    Id::LeftDollarParen | Id::LeftBacktick => {
                        let stdout = self.cmd_sub.run_command_sub(command)?;
                        let trimmed = stdout.trim_end_matches('\n').to_string();
                        part_vals.push(PartValue::String {
                            s: trimmed,
                            do_split_glob: !quoted,
                        });
                    }
                    Id::LeftProcSubIn | Id::LeftProcSubOut => {
                        let path = self.cmd_sub.run_process_sub(command, left_token.id)?;
                        part_vals.push(PartValue::String {
                            s: path,
                            do_split_glob: false,
                        });
                    }
                    _ => {
                        return Err(RuntimeError::at_span(
                            "Unexpected substitution",
                            left_token.span_id,
                        ));
                    }
                }
                Ok(())
            }
            WordPart::ArithSub { anode, .. } => {
                let num = self.arith.eval(anode)?;
                part_vals.push(PartValue::String {
                    s: num.to_string(),
                    do_split_glob: false,
                });
                Ok(())
            }
            WordPart::TildeSub(t) => {
                // Quoted strings never parse into a tilde sub.
                let s = self.eval_tilde_sub(t);
                part_vals.push(PartValue::String {
                    s,
                    do_split_glob: false,
                });
                Ok(())
            }
            WordPart::ExtGlob { op, arms, .. } => {
                // Flatten the tree back into pattern text.
                part_vals.push(PartValue::String {
                    s: op.val.clone(),
                    do_split_glob: true,
                });
                for (i, w) in arms.iter().enumerate() {
                    if i != 0 {
                        part_vals.push(PartValue::String {
                            s: "|".to_string(),
                            do_split_glob: true,
                        });
                    }
                    self.eval_word_to_parts(w, false, part_vals)?;
                }
                part_vals.push(PartValue::String {
                    s: ")".to_string(),
                    do_split_glob: true,
                });
                Ok(())
            }
            WordPart::ArrayLiteral { left, .. } => Err(RuntimeError::at_span(
                "Unexpected array literal",
                left.span_id,
            )),
            WordPart::BracedTuple(_) => Err(RuntimeError::new(
                "Brace expansion should have happened at the word level",
            )),
        }
    }

    fn eval_word_to_parts(
        &mut self,
        w: &Word,
        quoted: bool,
        part_vals: &mut Vec<PartValue>,
    ) -> RuntimeResult<()> {
        match w {
            Word::Compound(c) => {
                for p in &c.parts {
                    self.eval_word_part(p, quoted, part_vals)?;
                }
                Ok(())
            }
            Word::Empty => {
                part_vals.push(PartValue::String {
                    s: String::new(),
                    do_split_glob: false,
                });
                Ok(())
            }
            Word::Token(t) => Err(RuntimeError::at_span(
                format!("Can't evaluate operator word {}", t.id),
                t.span_id,
            )),
        }
    }

    // ── Public entry points ──────────────────────────────────────────────

    /// Evaluate to a single string: redirect targets, here-doc delimiters,
    /// case patterns (with `do_fnmatch`), `[[` operands (with `do_ere`).
    pub fn eval_word_to_string(&mut self, w: &Word) -> RuntimeResult<String> {
        self.eval_word_to_string_ext(w, false, false)
    }

    pub fn eval_word_to_pattern(&mut self, w: &Word) -> RuntimeResult<String> {
        self.eval_word_to_string_ext(w, true, false)
    }

    fn eval_word_to_string_ext(
        &mut self,
        w: &Word,
        do_fnmatch: bool,
        do_ere: bool,
    ) -> RuntimeResult<String> {
        if matches!(w, Word::Empty) {
            return Ok(String::new());
        }

        let mut part_vals = Vec::new();
        self.eval_word_to_parts(w, false, &mut part_vals)?;

        let mut strs = Vec::new();
        for pv in part_vals {
            match pv {
                PartValue::String { s, do_split_glob } => {
                    // Quoted parts must match literally in patterns.
                    if do_fnmatch && !do_split_glob {
                        strs.push(glob_pat::glob_escape(&s));
                    } else if do_ere && !do_split_glob {
                        strs.push(regex::escape(&s));
                    } else {
                        strs.push(s);
                    }
                }
                PartValue::Array { strs: arr } => {
                    if self.exec_opts.strict_array {
                        return Err(RuntimeError::at_word(
                            "This word should evaluate to a string, but part of it was an array",
                            w,
                        ));
                    }
                    // Does not respect IFS.
                    strs.push(arr.join(" "));
                }
            }
        }
        Ok(strs.concat())
    }

    /// Wrapper for prompt and completion plugins: runtime errors decay to a
    /// placeholder string instead of propagating.
    pub fn eval_for_plugin(&mut self, w: &Word) -> String {
        match self.eval_word_to_string(w) {
            Ok(s) => s,
            Err(e) => format!("<Runtime error: {}>", e.message),
        }
    }

    /// RHS of an assignment: no splitting, but `a=(1 2 3)` becomes an
    /// array via brace expansion plus sequence evaluation.
    pub fn eval_rhs_word(&mut self, w: &Word) -> RuntimeResult<Value> {
        if matches!(w, Word::Empty) {
            return Ok(Value::Str(String::new()));
        }

        if let Word::Compound(c) = w {
            if let [WordPart::ArrayLiteral { words, .. }] = c.parts.as_slice() {
                let expanded = braces::brace_expand_words(words);
                let strs = self.eval_word_sequence(&expanded)?;
                return Ok(Value::StrArray(strs));
            }
        }

        Ok(Value::Str(self.eval_word_to_string(w)?))
    }

    fn eval_word_frame(
        &mut self,
        frame: &[(String, bool)],
        argv: &mut Vec<String>,
    ) -> RuntimeResult<()> {
        let mut all_empty = true;
        let mut all_split_glob = true;
        let mut any_split_glob = false;

        for (s, do_split_glob) in frame {
            if !s.is_empty() {
                all_empty = false;
            }
            if *do_split_glob {
                any_split_glob = true;
            } else {
                all_split_glob = false;
            }
        }

        // ${empty}${empty} elides, but $empty"" and "$empty" do not.
        if all_empty && all_split_glob {
            return Ok(());
        }

        // Fully quoted frames skip splitting and globbing entirely.
        if !any_split_glob {
            argv.push(frame.iter().map(|(s, _)| s.as_str()).collect());
            return Ok(());
        }

        let will_glob = !self.exec_opts.noglob;
        let splitter = self.splitter();

        // Escape so one flat string survives both splitting and globbing.
        let mut frags = Vec::with_capacity(frame.len());
        for (frag, do_split_glob) in frame {
            let frag = if *do_split_glob {
                let frag = if will_glob {
                    backslash_escape(frag)
                } else {
                    frag.clone()
                };
                backslash_escape(&frag)
            } else {
                let frag = if will_glob {
                    glob_pat::glob_escape(frag)
                } else {
                    frag.clone()
                };
                splitter.escape(&frag)
            };
            frags.push(frag);
        }

        let flat = frags.concat();
        let args = splitter.split_for_word_eval(&flat);

        // space=' '; argv $space"". There is a quoted part, so we cannot
        // elide; add the empty back without globbing.
        if args.is_empty() && !all_split_glob {
            argv.push(String::new());
            return Ok(());
        }

        let globber = self.globber();
        for a in args {
            argv.extend(globber.expand(&a));
        }
        Ok(())
    }

    /// Expand a word sequence to an argv, with `spids` parallel to `strs`.
    pub fn eval_word_sequence2(&mut self, words: &[Word]) -> RuntimeResult<ArgVector> {
        // Brace expansion runs before any other evaluation.
        let words = braces::brace_expand_words(words);

        let mut arg_vec = ArgVector::default();
        let mut n = 0;
        for w in &words {
            let mut part_vals = Vec::new();
            self.eval_word_to_parts(w, false, &mut part_vals)?;

            let frames = make_word_frames(part_vals);
            for frame in &frames {
                self.eval_word_frame(frame, &mut arg_vec.strs)?;
            }

            // spids stays parallel to strs.
            let spid = word::left_most_span_for_word(w);
            for _ in n..arg_vec.strs.len() {
                arg_vec.spids.push(spid);
            }
            n = arg_vec.strs.len();
        }
        Ok(arg_vec)
    }

    pub fn eval_word_sequence(&mut self, words: &[Word]) -> RuntimeResult<Vec<String>> {
        Ok(self.eval_word_sequence2(words)?.strs)
    }
}

#[cfg(test)]
#[path = "word_eval_tests.rs"]
mod tests;

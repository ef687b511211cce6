// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Glob patterns: escaping, fnmatch-to-ERE translation, the `${x/pat/rep}`
//! replacer, and filesystem expansion.

use regex::Regex;

use crate::runtime_error::{RuntimeError, RuntimeResult};
use crate::value::ExecOptions;

/// Backslash-escape glob metacharacters so the string matches literally.
pub fn glob_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Remove one level of backslash escaping.
pub fn glob_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Does the string contain an unescaped glob metacharacter?
pub fn has_glob_pattern(s: &str) -> bool {
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '*' | '?' | '[' => return true,
            _ => {}
        }
    }
    false
}

/// Translate an fnmatch pattern to an ERE.
///
/// Returns the regex source and a list of warnings for constructs that
/// were translated approximately.
pub fn glob_to_ere(pat: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(pat.len() + 8);
    let mut warnings = Vec::new();
    let mut chars = pat.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(next) => push_regex_literal(&mut out, next),
                None => {
                    warnings.push("Trailing backslash in glob".to_string());
                    out.push_str("\\\\");
                }
            },
            '[' => {
                // Character class; `[!...]` negates.
                let mut class = String::from("[");
                match chars.peek() {
                    Some('!') | Some('^') => {
                        chars.next();
                        class.push('^');
                    }
                    _ => {}
                }
                let mut closed = false;
                let mut first = true;
                while let Some(c) = chars.next() {
                    if c == ']' && !first {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        if let Some(n) = chars.next() {
                            class.push('\\');
                            class.push(n);
                        }
                    } else {
                        class.push(c);
                    }
                    first = false;
                }
                if closed {
                    class.push(']');
                    out.push_str(&class);
                } else {
                    warnings.push("Unclosed character class in glob".to_string());
                    out.push_str("\\[");
                    out.push_str(&regex::escape(&class[1..]));
                }
            }
            other => push_regex_literal(&mut out, other),
        }
    }
    (out, warnings)
}

fn push_regex_literal(out: &mut String, ch: char) {
    if ch.is_ascii() && !ch.is_ascii_alphanumeric() {
        out.push('\\');
    }
    out.push(ch);
}

/// Anchored fnmatch: does the whole string match the glob pattern?
pub struct GlobMatcher {
    re: Regex,
}

impl GlobMatcher {
    pub fn new(pat: &str) -> RuntimeResult<Self> {
        let (ere, _warnings) = glob_to_ere(pat);
        let anchored = format!("\\A(?s:{})\\z", ere);
        let re = Regex::new(&anchored)
            .map_err(|e| RuntimeError::new(format!("Invalid glob pattern {:?}: {}", pat, e)))?;
        Ok(Self { re })
    }

    pub fn matches(&self, s: &str) -> bool {
        self.re.is_match(s)
    }
}

/// `${x/pat/replace}`: fnmatch pattern converted to an ERE, with `&` in
/// the replacement standing for the matched text.
pub struct GlobReplacer {
    re: Regex,
    replace: String,
    do_all: bool,
    anchor_start: bool,
    anchor_end: bool,
}

impl GlobReplacer {
    pub fn new(pat: &str, replace: &str, do_all: bool) -> RuntimeResult<Self> {
        // A leading `#` or `%` anchors the pattern.
        let (anchor_start, anchor_end, pat) = match pat.strip_prefix('#') {
            Some(rest) => (true, false, rest),
            None => match pat.strip_prefix('%') {
                Some(rest) => (false, true, rest),
                None => (false, false, pat),
            },
        };

        let (ere, _warnings) = glob_to_ere(pat);
        let source = format!(
            "{}(?s:{}){}",
            if anchor_start { "\\A" } else { "" },
            ere,
            if anchor_end { "\\z" } else { "" }
        );
        let re = Regex::new(&source)
            .map_err(|e| RuntimeError::new(format!("Invalid glob pattern {:?}: {}", pat, e)))?;
        Ok(Self {
            re,
            replace: replace.to_string(),
            do_all,
            anchor_start,
            anchor_end,
        })
    }

    fn expand_replacement(&self, matched: &str) -> String {
        let mut out = String::with_capacity(self.replace.len());
        let mut chars = self.replace.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '&' => out.push_str(matched),
                '\\' => match chars.next() {
                    Some('&') => out.push('&'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                other => out.push(other),
            }
        }
        out
    }

    pub fn replace(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        for m in self.re.find_iter(s) {
            // The empty pattern would loop forever; treat it as no match.
            if m.start() == m.end() {
                break;
            }
            out.push_str(&s[last..m.start()]);
            out.push_str(&self.expand_replacement(m.as_str()));
            last = m.end();
            if !self.do_all || self.anchor_start || self.anchor_end {
                break;
            }
        }
        out.push_str(&s[last..]);
        out
    }
}

/// Filesystem glob expansion over the escaped fragment strings the word
/// evaluator produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct Globber {
    pub noglob: bool,
    pub nullglob: bool,
}

impl Globber {
    pub fn new(opts: &ExecOptions) -> Self {
        Self {
            noglob: opts.noglob,
            nullglob: opts.nullglob,
        }
    }

    /// The `glob` crate escapes with character classes, not backslashes.
    fn to_glob_crate_pattern(escaped: &str) -> String {
        let mut out = String::with_capacity(escaped.len());
        let mut chars = escaped.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some(next) if matches!(next, '*' | '?' | '[' | ']') => {
                        out.push('[');
                        out.push(next);
                        out.push(']');
                    }
                    Some(next) => out.push(next),
                    None => {}
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Expand one field to zero or more argv entries.
    ///
    /// The field may contain backslash escapes from quoting; they are
    /// consumed here whether or not a glob runs.
    pub fn expand(&self, arg: &str) -> Vec<String> {
        if self.noglob {
            return vec![arg.to_string()];
        }
        if !has_glob_pattern(arg) {
            return vec![glob_unescape(arg)];
        }

        let pattern = Self::to_glob_crate_pattern(arg);
        let mut results: Vec<String> = match glob::glob(&pattern) {
            Ok(paths) => paths
                .filter_map(|entry| entry.ok())
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        results.sort();

        if results.is_empty() {
            if self.nullglob {
                Vec::new()
            } else {
                vec![glob_unescape(arg)]
            }
        } else {
            results
        }
    }
}

#[cfg(test)]
#[path = "glob_pat_tests.rs"]
mod tests;

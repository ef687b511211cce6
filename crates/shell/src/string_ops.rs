// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! String primitives for the word evaluator: UTF-8 code-point counting and
//! slicing, shell quoting, `$'...'` escape decoding, and the unary suffix
//! operators (`#` `##` `%` `%%` `^` `^^` `,` `,,`).

use crate::glob_pat;
use crate::runtime_error::{RuntimeError, RuntimeResult};
use crate::token::Id;

/// Byte length of the UTF-8 sequence that starts with `byte`.
fn utf8_seq_len(byte: u8) -> RuntimeResult<usize> {
    if byte & 0b1000_0000 == 0 {
        Ok(1)
    } else if byte & 0b1110_0000 == 0b1100_0000 {
        Ok(2)
    } else if byte & 0b1111_0000 == 0b1110_0000 {
        Ok(3)
    } else if byte & 0b1111_1000 == 0b1111_0000 {
        Ok(4)
    } else {
        Err(RuntimeError::invalid_utf8(format!(
            "Invalid UTF-8 start byte 0x{:02x}",
            byte
        )))
    }
}

fn check_continuation(bytes: &[u8], i: usize) -> RuntimeResult<()> {
    match bytes.get(i) {
        Some(b) if b & 0b1100_0000 == 0b1000_0000 => Ok(()),
        _ => Err(RuntimeError::invalid_utf8(format!(
            "Invalid UTF-8 continuation at byte {}",
            i
        ))),
    }
}

/// Count code points, per the `${#s}` operator.
pub fn count_utf8_chars(bytes: &[u8]) -> RuntimeResult<usize> {
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        let n = utf8_seq_len(bytes[i])?;
        for k in 1..n {
            check_continuation(bytes, i + k)?;
        }
        i += n;
        count += 1;
    }
    Ok(count)
}

/// Advance `num_chars` code points from `byte_offset`, returning the new
/// byte offset. Running off the end stops at the end, which is how slices
/// like `${s:1:100}` behave.
pub fn advance_utf8_chars(bytes: &[u8], num_chars: usize, byte_offset: usize) -> RuntimeResult<usize> {
    let mut i = byte_offset;
    for _ in 0..num_chars {
        if i >= bytes.len() {
            return Ok(bytes.len());
        }
        let n = utf8_seq_len(bytes[i])?;
        for k in 1..n {
            check_continuation(bytes, i + k)?;
        }
        i += n;
    }
    Ok(i)
}

/// Quote a string so the shell reads it back as one word, per `${x@Q}`.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c))
    {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Decode one `$'...'` token into its runtime text.
pub fn eval_c_string_token(id: Id, val: &str) -> String {
    match id {
        Id::CharLiterals => val.to_string(),
        Id::CharOneChar => {
            let c = val.chars().nth(1).unwrap_or('\\');
            let decoded = match c {
                'a' => '\x07',
                'b' => '\x08',
                'e' => '\x1b',
                'f' => '\x0c',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                'v' => '\x0b',
                other => other, // \\ \' \"
            };
            decoded.to_string()
        }
        Id::CharHex => {
            let digits = &val[2..];
            u32::from_str_radix(digits, 16)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
        Id::CharOctal => {
            let digits = &val[1..];
            u32::from_str_radix(digits, 8)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
        Id::CharUnicode4 | Id::CharUnicode8 => {
            let digits = &val[2..];
            u32::from_str_radix(digits, 16)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
        // Stray backslashes stay literal.
        _ => val.to_string(),
    }
}

/// `${s#pat}` and friends: strip the shortest or longest matching prefix
/// or suffix, or convert case. `arg` is the evaluated glob pattern.
pub fn do_unary_suffix_op(s: &str, op_id: Id, arg: &str) -> RuntimeResult<String> {
    match op_id {
        Id::VOp1Pound => strip_prefix(s, arg, false),
        Id::VOp1DPound => strip_prefix(s, arg, true),
        Id::VOp1Percent => strip_suffix(s, arg, false),
        Id::VOp1DPercent => strip_suffix(s, arg, true),
        Id::VOp1Caret => Ok(map_case(s, arg, true, false)),
        Id::VOp1DCaret => Ok(map_case(s, arg, true, true)),
        Id::VOp1Comma => Ok(map_case(s, arg, false, false)),
        Id::VOp1DComma => Ok(map_case(s, arg, false, true)),
        _ => Err(RuntimeError::new(format!(
            "Unknown unary operator {}",
            op_id
        ))),
    }
}

fn strip_prefix(s: &str, pat: &str, longest: bool) -> RuntimeResult<String> {
    let matcher = glob_pat::GlobMatcher::new(pat)?;
    let indices: Vec<usize> = s
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect();

    let found = if longest {
        indices
            .iter()
            .rev()
            .find(|&&i| matcher.matches(&s[..i]))
            .copied()
    } else {
        indices.iter().find(|&&i| matcher.matches(&s[..i])).copied()
    };

    Ok(match found {
        Some(i) => s[i..].to_string(),
        None => s.to_string(),
    })
}

fn strip_suffix(s: &str, pat: &str, longest: bool) -> RuntimeResult<String> {
    let matcher = glob_pat::GlobMatcher::new(pat)?;
    let indices: Vec<usize> = s
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect();

    let found = if longest {
        indices.iter().find(|&&i| matcher.matches(&s[i..])).copied()
    } else {
        indices
            .iter()
            .rev()
            .find(|&&i| matcher.matches(&s[i..]))
            .copied()
    };

    Ok(match found {
        Some(i) => s[..i].to_string(),
        None => s.to_string(),
    })
}

/// `^` / `,` convert the first character, `^^` / `,,` convert them all;
/// a non-empty pattern restricts conversion to matching characters.
fn map_case(s: &str, pat: &str, upper: bool, all: bool) -> String {
    let matcher = if pat.is_empty() {
        None
    } else {
        glob_pat::GlobMatcher::new(pat).ok()
    };
    let eligible = |c: char| match &matcher {
        None => true,
        Some(m) => m.matches(&c.to_string()),
    };
    let convert = |c: char| -> String {
        if upper {
            c.to_uppercase().to_string()
        } else {
            c.to_lowercase().to_string()
        }
    };

    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        if (all || i == 0) && eligible(c) {
            out.push_str(&convert(c));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "string_ops_tests.rs"]
mod tests;

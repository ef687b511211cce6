// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single parse-time error kind.
//!
//! Every fatal parse condition is a [`ParseError`] with a message and an
//! optional span for blame; the parsers never retry or recover.

use thiserror::Error;

use crate::arena::{Arena, SpanId};
use crate::ast::Word;
use crate::token::Token;
use crate::word::left_most_span_for_word;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span_id: Option<SpanId>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span_id: None,
        }
    }

    pub fn at_span(message: impl Into<String>, span_id: SpanId) -> Self {
        Self {
            message: message.into(),
            span_id: (!span_id.is_sentinel()).then_some(span_id),
        }
    }

    pub fn at_token(message: impl Into<String>, token: &Token) -> Self {
        Self::at_span(message, token.span_id)
    }

    pub fn at_word(message: impl Into<String>, word: &Word) -> Self {
        Self::at_span(message, left_most_span_for_word(word))
    }

    /// Render a caret diagnostic against the arena the error came from.
    pub fn diagnostic(&self, arena: &Arena) -> String {
        match self.span_id {
            Some(span_id) => arena.diagnostic(span_id, &self.message),
            None => format!("error: {}", self.message),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
#[path = "parse_error_tests.rs"]
mod tests;

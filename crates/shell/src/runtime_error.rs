// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single fatal error kind for word evaluation.
//!
//! `InvalidSlice` and `InvalidUtf8` are downgradable: when the
//! corresponding strict option is off, the evaluator logs a warning and
//! substitutes a fallback value instead of propagating them.

use thiserror::Error;

use crate::arena::{Arena, SpanId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Fatal,
    /// Bad string slice bounds; downgradable unless `strict_word_eval`.
    InvalidSlice,
    /// Invalid UTF-8 in a string operation; downgradable unless
    /// `strict_word_eval`.
    InvalidUtf8,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub span_id: Option<SpanId>,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span_id: None,
            kind: RuntimeErrorKind::Fatal,
        }
    }

    pub fn at_span(message: impl Into<String>, span_id: SpanId) -> Self {
        Self {
            message: message.into(),
            span_id: (!span_id.is_sentinel()).then_some(span_id),
            kind: RuntimeErrorKind::Fatal,
        }
    }

    pub fn invalid_slice(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span_id: None,
            kind: RuntimeErrorKind::InvalidSlice,
        }
    }

    pub fn invalid_utf8(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span_id: None,
            kind: RuntimeErrorKind::InvalidUtf8,
        }
    }

    pub fn at_word(message: impl Into<String>, word: &crate::ast::Word) -> Self {
        Self::at_span(message, crate::word::left_most_span_for_word(word))
    }

    pub fn with_span(mut self, span_id: SpanId) -> Self {
        if !span_id.is_sentinel() {
            self.span_id = Some(span_id);
        }
        self
    }

    pub fn diagnostic(&self, arena: &Arena) -> String {
        match self.span_id {
            Some(span_id) => arena.diagnostic(span_id, &self.message),
            None => format!("error: {}", self.message),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

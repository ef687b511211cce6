// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lexer tests split into logical modules.

#[macro_use]
mod macros;

mod basic;
mod hints;
mod modes;

use std::cell::RefCell;
use std::rc::Rc;

use crate::arena::Arena;
use crate::reader::StringLineReader;

use super::{Lexer, LexMode};

/// Build a lexer over an in-memory source string.
pub(crate) fn lexer_for(source: &str) -> (Lexer, Rc<RefCell<Arena>>) {
    let arena = Rc::new(RefCell::new(Arena::new()));
    let reader = StringLineReader::new(source, Rc::clone(&arena));
    (
        Lexer::new(Rc::clone(&arena), Rc::new(RefCell::new(reader))),
        arena,
    )
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal token ids, their kinds, and the token type itself.
//!
//! `Id` is a closed set of terminal kinds; `Kind` groups them for the
//! coarse dispatch the parsers do (`Kind::Word` vs `Kind::Redir` vs
//! `Kind::Op`, ...). The id-to-kind derivation is a static table.

use std::fmt;

use crate::arena::SpanId;

/// Coarse grouping of token ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Undefined,
    Unknown,
    Eol,
    Eof,
    Ignored,
    Ws,
    Lit,
    Op,
    Redir,
    Left,
    Right,
    Kw,
    Assign,
    ControlFlow,
    VSub,
    VTest,
    VOp0,
    VOp1,
    VOp2,
    Arith,
    Char,
    ExtGlob,
    Word,
}

/// Terminal token ids.
///
/// Grouped by kind; the groups mirror the lexer modes that produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Id {
    // Sentinels
    Undefined,
    UnknownTok,
    /// End of the current line; the lexer driver refills and retries.
    EolTok,
    EofReal,
    /// `)` closing a `$(` command sub, via translation hint.
    EofRParen,
    /// `` ` `` closing a backtick sub, via translation hint.
    EofBacktick,

    // Ignored
    IgnoredComment,
    IgnoredLineCont,
    IgnoredSpace,
    WsSpace,

    // Literals
    LitChars,
    LitOther,
    LitEscapedChar,
    LitDigits,
    LitArithVarLike,
    /// `name=` or `name+=` at the start of a word.
    LitVarLike,
    /// `name[` opening an indexed assignment LHS.
    LitArrayLhsOpen,
    /// `]=` or `]+=` closing an indexed assignment LHS.
    LitArrayLhsClose,
    LitTilde,
    LitSlash,
    LitPound,
    LitAt,
    LitLBrace,
    LitRBrace,
    /// `]]` ending a `[[` boolean expression.
    LitDRightBracket,
    /// Emitted once before EOF when completion requested it.
    LitCompDummy,

    // Operators
    OpNewline,
    OpAmp,
    OpPipe,
    OpPipeAmp,
    OpDAmp,
    OpDPipe,
    OpSemi,
    OpDSemi,
    OpLParen,
    OpRParen,
    OpDLeftParen,

    // Redirect operators; a leading single digit descriptor is part of the
    // token value (`2>`).
    RedirLess,
    RedirGreat,
    RedirDLess,
    RedirDGreat,
    RedirDLessDash,
    RedirTLess,
    RedirLessAnd,
    RedirGreatAnd,
    RedirLessGreat,
    RedirClobber,
    RedirAndGreat,
    RedirAndDGreat,

    // Left delimiters
    LeftDoubleQuote,
    LeftSingleQuote,
    LeftDollarSingleQuote,
    LeftDollarParen,
    LeftDollarBrace,
    LeftDollarDParen,
    LeftBacktick,
    LeftProcSubIn,
    LeftProcSubOut,

    // Right delimiters
    RightDoubleQuote,
    RightSingleQuote,
    RightDollarBrace,
    RightArithSub,
    RightSubshell,
    RightCasePat,
    RightFuncDef,
    RightArrayLiteral,
    RightExtGlob,

    // Keywords
    KwBang,
    KwIf,
    KwThen,
    KwElse,
    KwElif,
    KwFi,
    KwFor,
    KwWhile,
    KwUntil,
    KwDo,
    KwDone,
    KwCase,
    KwEsac,
    KwIn,
    KwFunction,
    KwTime,
    KwDLeftBracket,
    KwVar,
    KwSetVar,

    // Assignment keywords
    AssignDeclare,
    AssignTypeset,
    AssignLocal,
    AssignReadonly,
    AssignExport,
    /// Bare `NAME=val` assignment with no keyword.
    AssignNone,

    // Control flow keywords
    ControlFlowBreak,
    ControlFlowContinue,
    ControlFlowReturn,
    ControlFlowExit,

    // Variable substitutions. Outside braces the value includes the `$`;
    // inside `${...}` it does not.
    VSubDollarName,
    VSubName,
    VSubNumber,
    VSubBang,
    VSubAt,
    VSubPound,
    VSubDollar,
    VSubStar,
    VSubHyphen,
    VSubQMark,

    // `${x:-...}` test operators
    VTestColonHyphen,
    VTestColonEquals,
    VTestColonQMark,
    VTestColonPlus,
    VTestHyphen,
    VTestEquals,
    VTestQMark,
    VTestPlus,

    // Nullary suffix ops `${x@P}` `${x@Q}`
    VOp0P,
    VOp0Q,

    // Unary suffix ops with a glob argument
    VOp1Pound,
    VOp1DPound,
    VOp1Percent,
    VOp1DPercent,
    VOp1Caret,
    VOp1DCaret,
    VOp1Comma,
    VOp1DComma,

    // Binary suffix ops
    /// `/` pattern substitution
    VOp2Slash,
    /// `:` slice
    VOp2Colon,
    VOp2LBracket,
    VOp2RBracket,

    // Arithmetic mode tokens
    ArithPlus,
    ArithMinus,
    ArithStar,
    ArithDStar,
    ArithSlash,
    ArithPercent,
    ArithCaret,
    ArithAmp,
    ArithPipe,
    ArithDAmp,
    ArithDPipe,
    ArithLess,
    ArithGreat,
    ArithLessEqual,
    ArithGreatEqual,
    ArithDEqual,
    ArithNEqual,
    ArithBang,
    ArithTilde,
    ArithEqual,
    ArithPlusEqual,
    ArithMinusEqual,
    ArithDPlus,
    ArithDMinus,
    ArithDLess,
    ArithDGreat,
    ArithComma,
    ArithQMark,
    ArithColon,
    ArithSemi,
    ArithLParen,
    ArithRParen,
    ArithLBracket,
    ArithRBracket,
    /// `}` ending a slice inside `${a:1:2}`.
    ArithRBrace,
    ArithAt,

    // `$'...'` C-escape tokens
    CharOneChar,
    CharHex,
    CharOctal,
    CharUnicode4,
    CharUnicode8,
    CharLiterals,

    // Extended glob openers `@(` `*(` `+(` `?(` `!(`
    ExtGlobAt,
    ExtGlobStar,
    ExtGlobPlus,
    ExtGlobQMark,
    ExtGlobBang,

    /// Pseudo-id for a compound word with no special meaning; only produced
    /// by `word::command_id`, never by the lexer.
    WordCompound,
}

impl Id {
    /// Static derivation of the kind from the id.
    pub fn kind(self) -> Kind {
        use Id::*;
        match self {
            Undefined => Kind::Undefined,
            UnknownTok => Kind::Unknown,
            EolTok => Kind::Eol,
            EofReal | EofRParen | EofBacktick => Kind::Eof,
            IgnoredComment | IgnoredLineCont | IgnoredSpace => Kind::Ignored,
            WsSpace => Kind::Ws,
            LitChars | LitOther | LitEscapedChar | LitDigits | LitArithVarLike | LitVarLike
            | LitArrayLhsOpen | LitArrayLhsClose | LitTilde | LitSlash | LitPound | LitAt
            | LitLBrace | LitRBrace | LitDRightBracket | LitCompDummy => Kind::Lit,
            OpNewline | OpAmp | OpPipe | OpPipeAmp | OpDAmp | OpDPipe | OpSemi | OpDSemi
            | OpLParen | OpRParen | OpDLeftParen => Kind::Op,
            RedirLess | RedirGreat | RedirDLess | RedirDGreat | RedirDLessDash | RedirTLess
            | RedirLessAnd | RedirGreatAnd | RedirLessGreat | RedirClobber | RedirAndGreat
            | RedirAndDGreat => Kind::Redir,
            LeftDoubleQuote | LeftSingleQuote | LeftDollarSingleQuote | LeftDollarParen
            | LeftDollarBrace | LeftDollarDParen | LeftBacktick | LeftProcSubIn
            | LeftProcSubOut => Kind::Left,
            RightDoubleQuote | RightSingleQuote | RightDollarBrace | RightArithSub
            | RightSubshell | RightCasePat | RightFuncDef | RightArrayLiteral | RightExtGlob => {
                Kind::Right
            }
            KwBang | KwIf | KwThen | KwElse | KwElif | KwFi | KwFor | KwWhile | KwUntil | KwDo
            | KwDone | KwCase | KwEsac | KwIn | KwFunction | KwTime | KwDLeftBracket | KwVar
            | KwSetVar => Kind::Kw,
            AssignDeclare | AssignTypeset | AssignLocal | AssignReadonly | AssignExport
            | AssignNone => Kind::Assign,
            ControlFlowBreak | ControlFlowContinue | ControlFlowReturn | ControlFlowExit => {
                Kind::ControlFlow
            }
            VSubDollarName | VSubName | VSubNumber | VSubBang | VSubAt | VSubPound | VSubDollar
            | VSubStar | VSubHyphen | VSubQMark => Kind::VSub,
            VTestColonHyphen | VTestColonEquals | VTestColonQMark | VTestColonPlus | VTestHyphen
            | VTestEquals | VTestQMark | VTestPlus => Kind::VTest,
            VOp0P | VOp0Q => Kind::VOp0,
            VOp1Pound | VOp1DPound | VOp1Percent | VOp1DPercent | VOp1Caret | VOp1DCaret
            | VOp1Comma | VOp1DComma => Kind::VOp1,
            VOp2Slash | VOp2Colon | VOp2LBracket | VOp2RBracket => Kind::VOp2,
            ArithPlus | ArithMinus | ArithStar | ArithDStar | ArithSlash | ArithPercent
            | ArithCaret | ArithAmp | ArithPipe | ArithDAmp | ArithDPipe | ArithLess
            | ArithGreat | ArithLessEqual | ArithGreatEqual | ArithDEqual | ArithNEqual
            | ArithBang | ArithTilde | ArithEqual | ArithPlusEqual | ArithMinusEqual
            | ArithDPlus | ArithDMinus | ArithDLess | ArithDGreat | ArithComma | ArithQMark
            | ArithColon | ArithSemi | ArithLParen | ArithRParen | ArithLBracket
            | ArithRBracket | ArithRBrace | ArithAt => Kind::Arith,
            CharOneChar | CharHex | CharOctal | CharUnicode4 | CharUnicode8 | CharLiterals => {
                Kind::Char
            }
            ExtGlobAt | ExtGlobStar | ExtGlobPlus | ExtGlobQMark | ExtGlobBang => Kind::ExtGlob,
            WordCompound => Kind::Word,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Shell keywords, recognized by the lexer at any position; the command
/// parser gives them meaning only where the grammar allows a keyword.
pub fn keyword_id(s: &str) -> Option<Id> {
    let id = match s {
        "!" => Id::KwBang,
        "if" => Id::KwIf,
        "then" => Id::KwThen,
        "else" => Id::KwElse,
        "elif" => Id::KwElif,
        "fi" => Id::KwFi,
        "for" => Id::KwFor,
        "while" => Id::KwWhile,
        "until" => Id::KwUntil,
        "do" => Id::KwDo,
        "done" => Id::KwDone,
        "case" => Id::KwCase,
        "esac" => Id::KwEsac,
        "in" => Id::KwIn,
        "function" => Id::KwFunction,
        "time" => Id::KwTime,
        "[[" => Id::KwDLeftBracket,
        "var" => Id::KwVar,
        "setvar" => Id::KwSetVar,
        "declare" => Id::AssignDeclare,
        "typeset" => Id::AssignTypeset,
        "local" => Id::AssignLocal,
        "readonly" => Id::AssignReadonly,
        "export" => Id::AssignExport,
        "break" => Id::ControlFlowBreak,
        "continue" => Id::ControlFlowContinue,
        "return" => Id::ControlFlowReturn,
        "exit" => Id::ControlFlowExit,
        _ => return None,
    };
    Some(id)
}

/// A lexed token: terminal id, source value, and arena span.
///
/// EOL/EOF sentinels synthesized by the lexer carry [`SpanId::SENTINEL`];
/// every other token points into the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: Id,
    pub val: String,
    pub span_id: SpanId,
}

impl Token {
    pub fn new(id: Id, val: impl Into<String>, span_id: SpanId) -> Self {
        Self {
            id,
            val: val.into(),
            span_id,
        }
    }

    pub fn sentinel(id: Id) -> Self {
        Self {
            id,
            val: String::new(),
            span_id: SpanId::SENTINEL,
        }
    }

    pub fn kind(&self) -> Kind {
        self.id.kind()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.val.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} {:?}", self.id, self.val)
        }
    }
}

pub(crate) fn is_valid_var_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;

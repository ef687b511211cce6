// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-mode lexer rule tables.
//!
//! Each mode is an ordered list of `(pattern, id)` rules. Matching picks the
//! longest match; on ties the rule declared earlier wins, which is how
//! keywords beat the general literal-chars rule for exact-length matches.

use crate::token::Id;

use super::LexMode;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Pat {
    Const(&'static str),
    Regex(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule {
    pub pat: Pat,
    pub id: Id,
}

/// Rule with a constant string, e.g. `c("$*", Id::VSubStar)`.
const fn c(pat: &'static str, id: Id) -> Rule {
    Rule {
        pat: Pat::Const(pat),
        id,
    }
}

/// Rule with a regex, e.g. `r(r"\$[0-9]", Id::VSubNumber)`.
const fn r(pat: &'static str, id: Id) -> Rule {
    Rule {
        pat: Pat::Regex(pat),
        id,
    }
}

/// `$`-substitutions valid in unquoted, double-quoted, and arith contexts.
fn dollar_subs() -> Vec<Rule> {
    vec![
        r(r"\$[a-zA-Z_][a-zA-Z0-9_]*", Id::VSubDollarName),
        r(r"\$[0-9]", Id::VSubNumber),
        c("$!", Id::VSubBang),
        c("$@", Id::VSubAt),
        c("$#", Id::VSubPound),
        c("$$", Id::VSubDollar),
        c("$*", Id::VSubStar),
        c("$-", Id::VSubHyphen),
        c("$?", Id::VSubQMark),
        c("${", Id::LeftDollarBrace),
        c("$((", Id::LeftDollarDParen),
        c("$(", Id::LeftDollarParen),
    ]
}

/// Quote openers valid wherever a new word part can begin.
fn left_quotes() -> Vec<Rule> {
    vec![
        c("$'", Id::LeftDollarSingleQuote),
        c("'", Id::LeftSingleQuote),
        c("\"", Id::LeftDoubleQuote),
        c("`", Id::LeftBacktick),
    ]
}

fn keywords() -> Vec<Rule> {
    vec![
        c("!", Id::KwBang),
        c("if", Id::KwIf),
        c("then", Id::KwThen),
        c("else", Id::KwElse),
        c("elif", Id::KwElif),
        c("fi", Id::KwFi),
        c("for", Id::KwFor),
        c("while", Id::KwWhile),
        c("until", Id::KwUntil),
        c("do", Id::KwDo),
        c("done", Id::KwDone),
        c("case", Id::KwCase),
        c("esac", Id::KwEsac),
        c("in", Id::KwIn),
        c("function", Id::KwFunction),
        c("time", Id::KwTime),
        c("var", Id::KwVar),
        c("setvar", Id::KwSetVar),
        c("declare", Id::AssignDeclare),
        c("typeset", Id::AssignTypeset),
        c("local", Id::AssignLocal),
        c("readonly", Id::AssignReadonly),
        c("export", Id::AssignExport),
        c("break", Id::ControlFlowBreak),
        c("continue", Id::ControlFlowContinue),
        c("return", Id::ControlFlowReturn),
        c("exit", Id::ControlFlowExit),
    ]
}

fn ext_glob_openers() -> Vec<Rule> {
    vec![
        c("@(", Id::ExtGlobAt),
        c("*(", Id::ExtGlobStar),
        c("+(", Id::ExtGlobPlus),
        c("?(", Id::ExtGlobQMark),
        c("!(", Id::ExtGlobBang),
    ]
}

fn sh_command() -> Vec<Rule> {
    let mut rules = vec![
        r(r"[ \t\r]+", Id::WsSpace),
        r("\\\\\n", Id::IgnoredLineCont),
        c("\n", Id::OpNewline),
        c("#", Id::LitPound),
        // Assignment-shaped literals must beat the general literal rule.
        r(r"[a-zA-Z_][a-zA-Z0-9_]*\+?=", Id::LitVarLike),
        r(r"[a-zA-Z_][a-zA-Z0-9_]*\[", Id::LitArrayLhsOpen),
    ];
    rules.extend(keywords());
    rules.extend([
        c("[[", Id::KwDLeftBracket),
        c("]]", Id::LitDRightBracket),
        c("{", Id::LitLBrace),
        c("}", Id::LitRBrace),
        c("&&", Id::OpDAmp),
        c("||", Id::OpDPipe),
        c("|&", Id::OpPipeAmp),
        c("|", Id::OpPipe),
        c(";;", Id::OpDSemi),
        c(";", Id::OpSemi),
        c("((", Id::OpDLeftParen),
        c("(", Id::OpLParen),
        c(")", Id::OpRParen),
        c("&>>", Id::RedirAndDGreat),
        c("&>", Id::RedirAndGreat),
        c("&", Id::OpAmp),
        c("<(", Id::LeftProcSubIn),
        c(">(", Id::LeftProcSubOut),
        r(r"[0-9]?<<-", Id::RedirDLessDash),
        r(r"[0-9]?<<<", Id::RedirTLess),
        r(r"[0-9]?<<", Id::RedirDLess),
        r(r"[0-9]?<>", Id::RedirLessGreat),
        r(r"[0-9]?<&", Id::RedirLessAnd),
        r(r"[0-9]?<", Id::RedirLess),
        r(r"[0-9]?>>", Id::RedirDGreat),
        r(r"[0-9]?>&", Id::RedirGreatAnd),
        r(r"[0-9]?>\|", Id::RedirClobber),
        r(r"[0-9]?>", Id::RedirGreat),
    ]);
    rules.extend(ext_glob_openers());
    rules.extend(dollar_subs());
    rules.extend(left_quotes());
    rules.extend([
        c("$", Id::LitOther),
        r("\\\\[^\n]", Id::LitEscapedChar),
        c("\\", Id::LitOther),
        r(r"~[a-zA-Z0-9_.\-]*", Id::LitTilde),
        r(r"[a-zA-Z0-9_/.\-]+", Id::LitChars),
        r(r".", Id::LitOther),
    ]);
    rules
}

fn comment() -> Vec<Rule> {
    vec![r(r"[^\n]+", Id::IgnoredComment), c("\n", Id::OpNewline)]
}

fn double_quoted() -> Vec<Rule> {
    let mut rules = vec![
        r("[^\"$`\\\\]+", Id::LitChars),
        r("\\\\\n", Id::IgnoredLineCont),
        r("\\\\[$`\"\\\\]", Id::LitEscapedChar),
        c("\\", Id::LitOther),
    ];
    rules.extend(dollar_subs());
    rules.extend([
        c("`", Id::LeftBacktick),
        c("$", Id::LitOther),
        c("\"", Id::RightDoubleQuote),
    ]);
    rules
}

fn single_quoted() -> Vec<Rule> {
    vec![r(r"[^']+", Id::LitChars), c("'", Id::RightSingleQuote)]
}

fn dollar_single_quoted() -> Vec<Rule> {
    vec![
        r(r"[^'\\]+", Id::CharLiterals),
        r(r#"\\[\\'"abefnrtv]"#, Id::CharOneChar),
        r(r"\\x[0-9a-fA-F]{1,2}", Id::CharHex),
        r(r"\\[0-7]{1,3}", Id::CharOctal),
        r(r"\\u[0-9a-fA-F]{1,4}", Id::CharUnicode4),
        r(r"\\U[0-9a-fA-F]{1,8}", Id::CharUnicode8),
        r(r"\\[^\n]", Id::LitOther),
        c("\\", Id::LitOther),
        c("'", Id::RightSingleQuote),
    ]
}

fn vsub_1() -> Vec<Rule> {
    vec![
        r(r"[a-zA-Z_][a-zA-Z0-9_]*", Id::VSubName),
        r(r"[0-9]+", Id::VSubNumber),
        c("@", Id::VSubAt),
        c("*", Id::VSubStar),
        c("#", Id::VSubPound),
        c("!", Id::VSubBang),
        c("?", Id::VSubQMark),
        c("$", Id::VSubDollar),
        c("-", Id::VSubHyphen),
        c("}", Id::RightDollarBrace),
        r(r".", Id::UnknownTok),
    ]
}

fn vsub_2() -> Vec<Rule> {
    vec![
        c(":-", Id::VTestColonHyphen),
        c(":=", Id::VTestColonEquals),
        c(":?", Id::VTestColonQMark),
        c(":+", Id::VTestColonPlus),
        c("-", Id::VTestHyphen),
        c("=", Id::VTestEquals),
        c("?", Id::VTestQMark),
        c("+", Id::VTestPlus),
        c("@P", Id::VOp0P),
        c("@Q", Id::VOp0Q),
        c("##", Id::VOp1DPound),
        c("#", Id::VOp1Pound),
        c("%%", Id::VOp1DPercent),
        c("%", Id::VOp1Percent),
        c("^^", Id::VOp1DCaret),
        c("^", Id::VOp1Caret),
        c(",,", Id::VOp1DComma),
        c(",", Id::VOp1Comma),
        c("/", Id::VOp2Slash),
        c(":", Id::VOp2Colon),
        c("[", Id::VOp2LBracket),
        c("]", Id::VOp2RBracket),
        c("}", Id::RightDollarBrace),
        r(r".", Id::UnknownTok),
    ]
}

fn vsub_arg_unquoted() -> Vec<Rule> {
    let mut rules = vec![
        r("[^$`/}\"'\\\\]+", Id::LitChars),
        r("\\\\\n", Id::IgnoredLineCont),
        r("\\\\[^\n]", Id::LitEscapedChar),
    ];
    rules.extend(ext_glob_openers());
    rules.extend(dollar_subs());
    rules.extend(left_quotes());
    rules.extend([
        c("$", Id::LitOther),
        c("/", Id::LitSlash),
        c("}", Id::RightDollarBrace),
        r(r".", Id::LitOther),
    ]);
    rules
}

fn vsub_arg_dq() -> Vec<Rule> {
    let mut rules = vec![
        r("[^$`/}\"\\\\]+", Id::LitChars),
        r("\\\\\n", Id::IgnoredLineCont),
        r("\\\\[$`\"\\\\]", Id::LitEscapedChar),
        c("\\", Id::LitOther),
    ];
    rules.extend(dollar_subs());
    rules.extend([
        c("`", Id::LeftBacktick),
        c("$", Id::LitOther),
        c("/", Id::LitSlash),
        c("\"", Id::LeftDoubleQuote),
        c("}", Id::RightDollarBrace),
        r(r".", Id::LitOther),
    ]);
    rules
}

fn arith() -> Vec<Rule> {
    let mut rules = vec![
        r("[ \t\r\n]+", Id::IgnoredSpace),
        r(r"[a-zA-Z_][a-zA-Z0-9_]*", Id::LitArithVarLike),
        r(r"[0-9]+", Id::LitDigits),
        c("++", Id::ArithDPlus),
        c("+=", Id::ArithPlusEqual),
        c("+", Id::ArithPlus),
        c("--", Id::ArithDMinus),
        c("-=", Id::ArithMinusEqual),
        c("-", Id::ArithMinus),
        c("**", Id::ArithDStar),
        c("*", Id::ArithStar),
        c("/", Id::ArithSlash),
        c("%", Id::ArithPercent),
        c("^", Id::ArithCaret),
        c("&&", Id::ArithDAmp),
        c("&", Id::ArithAmp),
        c("||", Id::ArithDPipe),
        c("|", Id::ArithPipe),
        c("<<", Id::ArithDLess),
        c("<=", Id::ArithLessEqual),
        c("<", Id::ArithLess),
        c(">>", Id::ArithDGreat),
        c(">=", Id::ArithGreatEqual),
        c(">", Id::ArithGreat),
        c("==", Id::ArithDEqual),
        c("!=", Id::ArithNEqual),
        c("=", Id::ArithEqual),
        c("!", Id::ArithBang),
        c("~", Id::ArithTilde),
        c(",", Id::ArithComma),
        c("?", Id::ArithQMark),
        c(":", Id::ArithColon),
        c(";", Id::ArithSemi),
        c("(", Id::ArithLParen),
        c(")", Id::ArithRParen),
        c("[", Id::ArithLBracket),
        r(r"\]\+?=", Id::LitArrayLhsClose),
        c("]", Id::ArithRBracket),
        c("}", Id::ArithRBrace),
        c("@", Id::ArithAt),
    ];
    rules.extend(dollar_subs());
    rules.extend(left_quotes());
    rules.extend([c("$", Id::LitOther), r(r".", Id::UnknownTok)]);
    rules
}

fn ext_glob() -> Vec<Rule> {
    let mut rules = vec![
        r("[^@*+?!()|$`'\"\\\\]+", Id::LitChars),
        r("\\\\\n", Id::IgnoredLineCont),
        r("\\\\[^\n]", Id::LitEscapedChar),
    ];
    rules.extend(ext_glob_openers());
    rules.extend(dollar_subs());
    rules.extend(left_quotes());
    rules.extend([
        c("|", Id::OpPipe),
        c(")", Id::RightExtGlob),
        c("$", Id::LitOther),
        r(r".", Id::LitOther),
    ]);
    rules
}

fn bash_regex() -> Vec<Rule> {
    let mut rules = vec![
        r(r"[ \t\r]+", Id::WsSpace),
        r("\\\\\n", Id::IgnoredLineCont),
        c("\n", Id::OpNewline),
        c("]]", Id::LitDRightBracket),
        r("\\\\[^\n]", Id::LitEscapedChar),
        r(r"[a-zA-Z0-9_/.\-]+", Id::LitChars),
    ];
    rules.extend(dollar_subs());
    rules.extend(left_quotes());
    rules.extend([c("$", Id::LitOther), r(r".", Id::LitOther)]);
    rules
}

fn backtick() -> Vec<Rule> {
    vec![
        r("[^`\\\\]+", Id::LitChars),
        r("\\\\[`$\\\\]", Id::LitEscapedChar),
        c("\\", Id::LitOther),
        c("`", Id::LeftBacktick),
    ]
}

fn printf_percent() -> Vec<Rule> {
    vec![
        r(r"[^%]+", Id::LitChars),
        r(r"%[-+ #0]*[0-9]*(?:\.[0-9]+)?[a-zA-Z%]", Id::LitOther),
        c("%", Id::LitOther),
    ]
}

fn printf_backslash() -> Vec<Rule> {
    vec![
        r(r"[^\\]+", Id::CharLiterals),
        r(r#"\\[\\'"abefnrtv]"#, Id::CharOneChar),
        r(r"\\x[0-9a-fA-F]{1,2}", Id::CharHex),
        r(r"\\[0-7]{1,3}", Id::CharOctal),
        r(r"\\u[0-9a-fA-F]{1,4}", Id::CharUnicode4),
        r(r"\\U[0-9a-fA-F]{1,8}", Id::CharUnicode8),
        c("\\", Id::LitOther),
    ]
}

/// Build the rule list for one mode.
pub(crate) fn rules_for(mode: LexMode) -> Vec<Rule> {
    match mode {
        LexMode::ShCommand => sh_command(),
        LexMode::Comment => comment(),
        LexMode::Dq => double_quoted(),
        LexMode::Sq => single_quoted(),
        LexMode::DollarSq => dollar_single_quoted(),
        LexMode::Arith => arith(),
        LexMode::VSub1 => vsub_1(),
        LexMode::VSub2 => vsub_2(),
        LexMode::VSubArgUnquoted => vsub_arg_unquoted(),
        LexMode::VSubArgDq => vsub_arg_dq(),
        LexMode::ExtGlob => ext_glob(),
        LexMode::BashRegex => bash_regex(),
        LexMode::Backtick => backtick(),
        LexMode::PrintfPercent => printf_percent(),
        LexMode::PrintfBackslash => printf_backslash(),
    }
}

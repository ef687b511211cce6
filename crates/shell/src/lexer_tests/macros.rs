// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative token-stream assertions for lexer tests.

/// Generate tests that read tokens in `ShCommand` mode until EOF and compare
/// `(id, value)` pairs.
///
/// ```ignore
/// lex_tests! {
///     one_word: "echo" => [(Id::LitChars, "echo")],
/// }
/// ```
macro_rules! lex_tests {
    ($($name:ident: $input:expr => [$(($id:expr, $val:expr)),* $(,)?]),* $(,)?) => {
        $(
            #[test]
            fn $name() {
                let (mut lexer, _arena) = crate::lexer::tests::lexer_for($input);
                let expected: Vec<(crate::token::Id, &str)> = vec![$(($id, $val)),*];
                let mut actual = Vec::new();
                loop {
                    let t = lexer.read(crate::lexer::LexMode::ShCommand);
                    if t.id == crate::token::Id::EofReal {
                        break;
                    }
                    actual.push((t.id, t.val));
                    if actual.len() > 256 {
                        panic!("runaway token stream for input {:?}", $input);
                    }
                }
                let actual_refs: Vec<(crate::token::Id, &str)> =
                    actual.iter().map(|(i, v)| (*i, v.as_str())).collect();
                assert_eq!(actual_refs, expected, "input: {:?}", $input);
            }
        )*
    };
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn escape_and_unescape_round_trip() {
    assert_eq!(glob_escape("a*b?c[d]"), r"a\*b\?c\[d\]");
    assert_eq!(glob_unescape(r"a\*b\?c\[d\]"), "a*b?c[d]");
    assert_eq!(glob_unescape(glob_escape(r"x\y").as_str()), r"x\y");
}

#[test]
fn pattern_detection_skips_escaped_chars() {
    assert!(has_glob_pattern("*.txt"));
    assert!(has_glob_pattern("a?c"));
    assert!(has_glob_pattern("[ab]"));
    assert!(!has_glob_pattern(r"\*.txt"));
    assert!(!has_glob_pattern("plain"));
}

#[test]
fn glob_to_ere_translates_metacharacters() {
    let (ere, warnings) = glob_to_ere("*.py");
    assert_eq!(ere, r".*\.py");
    assert!(warnings.is_empty());

    let (ere, _) = glob_to_ere("a?c");
    assert_eq!(ere, "a.c");

    let (ere, _) = glob_to_ere("[!ab]x");
    assert_eq!(ere, "[^ab]x");
}

#[test]
fn matcher_is_anchored() {
    let m = GlobMatcher::new("*.py").unwrap();
    assert!(m.matches("foo.py"));
    assert!(!m.matches("foo.pyc"));
    assert!(!m.matches("py"));

    let m = GlobMatcher::new("?").unwrap();
    assert!(m.matches("x"));
    assert!(!m.matches("xy"));
    assert!(!m.matches(""));
}

#[test]
fn replacer_first_and_all() {
    let first = GlobReplacer::new("a", "X", false).unwrap();
    assert_eq!(first.replace("banana"), "bXnana");

    let all = GlobReplacer::new("a", "X", true).unwrap();
    assert_eq!(all.replace("banana"), "bXnXnX");
}

#[test]
fn replacer_glob_patterns() {
    let r = GlobReplacer::new("[0-9]", "#", true).unwrap();
    assert_eq!(r.replace("a1b22c"), "a#b##c");

    let star = GlobReplacer::new("b*a", "_", false).unwrap();
    assert_eq!(star.replace("banana"), "_");
}

#[test]
fn replacer_ampersand_backref() {
    let r = GlobReplacer::new("an", "<&>", true).unwrap();
    assert_eq!(r.replace("banana"), "b<an><an>a");

    let literal = GlobReplacer::new("an", r"\&", true).unwrap();
    assert_eq!(literal.replace("banana"), "b&&a");
}

#[test]
fn replacer_anchors() {
    let prefix = GlobReplacer::new("#ba", "X", false).unwrap();
    assert_eq!(prefix.replace("banana"), "Xnana");

    let suffix = GlobReplacer::new("%na", "X", false).unwrap();
    assert_eq!(suffix.replace("banana"), "banaX");

    // Anchored pattern that doesn't sit at the start matches nothing.
    let miss = GlobReplacer::new("#na", "X", false).unwrap();
    assert_eq!(miss.replace("banana"), "banana");
}

#[test]
fn empty_pattern_never_loops() {
    let r = GlobReplacer::new("", "X", true).unwrap();
    assert_eq!(r.replace("abc"), "abc");
}

#[test]
fn globber_without_pattern_unescapes() {
    let globber = Globber::default();
    assert_eq!(globber.expand(r"a\*b"), vec!["a*b"]);
    assert_eq!(globber.expand("plain"), vec!["plain"]);
}

#[test]
fn globber_noglob_passes_through() {
    let globber = Globber {
        noglob: true,
        nullglob: false,
    };
    assert_eq!(globber.expand("*.nope"), vec!["*.nope"]);
}

#[test]
fn globber_unmatched_pattern_returns_pattern() {
    let globber = Globber::default();
    // Nothing in cwd matches this.
    let out = globber.expand("zz-no-such-file-*.xyzq");
    assert_eq!(out, vec!["zz-no-such-file-*.xyzq"]);
}

#[test]
fn globber_nullglob_elides_unmatched() {
    let globber = Globber {
        noglob: false,
        nullglob: true,
    };
    assert!(globber.expand("zz-no-such-file-*.xyzq").is_empty());
}

#[test]
fn globber_matches_real_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.sash-test"), "").unwrap();
    std::fs::write(dir.path().join("two.sash-test"), "").unwrap();

    let pattern = format!("{}/{}", dir.path().display(), "*.sash-test");
    let globber = Globber::default();
    let mut results = globber.expand(&pattern);
    results.sort();
    assert_eq!(results.len(), 2);
    assert!(results[0].ends_with("one.sash-test"));
    assert!(results[1].ends_with("two.sash-test"));
}

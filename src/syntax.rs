//! HTML highlighting and comment stripping for Coq source
//!
//! Vernacular keywords are wrapped in coloured spans and comments, which
//! nest, are wrapped in one span per outermost comment. The keyword pass
//! is purely lexical: a keyword right after `"` or `"% "` is skipped, but
//! keywords inside longer strings are still coloured.

use lazy_static::lazy_static;
use regex::Regex;

pub const VERNACULAR_BINDER: [&str; 17] = [
    "Definition",
    "Inductive",
    "Fixpoint",
    "Theorem",
    "Function",
    "Remark",
    "Hypothesis",
    "Lemma",
    "Example",
    "Ltac",
    "Record",
    "Variable",
    "Section",
    "End",
    "Instance",
    "Module",
    "Context",
];

/// Binders followed by the other vernacular commands
pub const VERNACULAR_WORDS: [&str; 33] = [
    "Definition",
    "Inductive",
    "Fixpoint",
    "Theorem",
    "Function",
    "Remark",
    "Hypothesis",
    "Lemma",
    "Example",
    "Ltac",
    "Record",
    "Variable",
    "Section",
    "End",
    "Instance",
    "Module",
    "Context",
    "Proof",
    "Qed",
    "Defined",
    "Require",
    "Import",
    "Export",
    "Print",
    "Assumptions",
    "Local",
    "Open",
    "Scope",
    "Admitted",
    "Notation",
    "Set",
    "Unset",
    "Implicit",
];

pub const LOCAL_BINDER: [&str; 2] = ["forall", "fun"];

/// Local binders followed by term-level keywords. Not applied by
/// `syntax_highlight`.
pub const SYNTAX_WORDS: [&str; 16] = [
    "forall", "fun", "Type", "Set", "Prop", "if", "then", "else", "match", "with", "end", "as",
    "in", "return", "using", "let",
];

pub const VERNACULAR_COLOR: &str = "#a020f0";
pub const SYNTAX_COLOR: &str = "#228b22";
pub const GLOBAL_BOUND_COLOR: &str = "#3b10ff";
pub const LOCAL_BOUND_COLOR: &str = "#a0522d";
pub const COMMENT_COLOR: &str = "#004800";

lazy_static! {
    static ref VERNACULAR_PATTERNS: Vec<(&'static str, Regex)> = VERNACULAR_WORDS
        .iter()
        .map(|&word| {
            let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(word)))
                .expect("vernacular word pattern is valid");
            (word, pattern)
        })
        .collect();
}

pub fn color_word(color: &str, word: &str) -> String {
    format!("<span style=\"color:{color}\">{word}</span>")
}

/// Wrap every outermost `(* ... *)` comment in a comment-coloured span.
///
/// Unbalanced input is not an error: an unclosed `(*` leaves the span open
/// to the end of the text, and a stray `*)` drives the depth negative so a
/// following `(*` does not open a span.
pub fn highlight_comments(page: &str) -> String {
    let mut result = String::with_capacity(page.len());
    let mut depth: i64 = 0;
    let mut prev: Option<char> = None;

    for (i, c) in page.char_indices() {
        if page[i..].starts_with("(*") {
            depth += 1;
            if depth == 1 {
                result.push_str(&format!("<span style=\"color:{COMMENT_COLOR}\">"));
            }
        }
        result.push(c);
        if prev == Some('*') && c == ')' {
            depth -= 1;
            if depth == 0 {
                result.push_str("</span>");
            }
        }
        prev = Some(c);
    }

    result
}

/// Colour vernacular keywords, then comments
pub fn syntax_highlight(page: &str) -> String {
    let mut page = page.to_string();
    for (word, pattern) in VERNACULAR_PATTERNS.iter() {
        page = color_matches(&page, word, pattern);
    }
    highlight_comments(&page)
}

fn color_matches(page: &str, word: &str, pattern: &Regex) -> String {
    let mut result = String::with_capacity(page.len());
    let mut last = 0;

    for m in pattern.find_iter(page) {
        let before = &page[..m.start()];
        if before.ends_with('"') || before.ends_with("% ") {
            continue;
        }
        result.push_str(&page[last..m.start()]);
        result.push_str(&color_word(VERNACULAR_COLOR, word));
        last = m.end();
    }

    result.push_str(&page[last..]);
    result
}

/// Remove every `(* ... *)` comment, delimiters included
pub fn strip_comments(command: &str) -> String {
    let mut result = String::with_capacity(command.len());
    let mut depth: i64 = 0;
    let mut prev: Option<char> = None;

    for (i, c) in command.char_indices() {
        if command[i..].starts_with("(*") {
            depth += 1;
        }
        if depth < 1 {
            result.push(c);
        }
        if prev == Some('*') && c == ')' {
            depth -= 1;
        }
        prev = Some(c);
    }

    result
}

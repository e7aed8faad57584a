//! Keyword tokenizers for goal text
//!
//! A tokenizer is fitted on the training goals: the most frequent symbols
//! become keywords, each with a fixed token id. The first ids are reserved
//! (0 for padding, 1 for unknown symbols).

use crate::core::{PredictorError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    // Identifier/number runs, single brackets and separators, operator runs
    static ref SYMBOL: Regex = Regex::new(r"[\w'.]+|[()\[\]{},;]|[^\w\s()\[\]{},;]+")
        .expect("SYMBOL regex is valid");
}

/// Token id for symbols outside the keyword set
pub const UNKNOWN_TOKEN: usize = 1;

/// Split goal text into symbols
pub fn get_symbols(text: &str) -> Vec<&str> {
    SYMBOL.find_iter(text).map(|m| m.as_str()).collect()
}

/// Registered tokenizer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenizerKind {
    /// Symbols outside the keyword set are dropped
    NoFallback,
    /// Symbols outside the keyword set map to `UNKNOWN_TOKEN`
    UnkFallback,
}

impl TokenizerKind {
    pub const ALL: [TokenizerKind; 2] = [TokenizerKind::NoFallback, TokenizerKind::UnkFallback];

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| PredictorError::UnknownTokenizer(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenizerKind::NoFallback => "no-fallback",
            TokenizerKind::UnkFallback => "unk-fallback",
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fitted keyword tokenizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTokenizer")]
pub struct Tokenizer {
    kind: TokenizerKind,
    num_reserved: usize,
    keywords: Vec<String>,
    #[serde(skip)]
    ids: HashMap<String, usize>,
}

impl Tokenizer {
    /// Build a tokenizer from an explicit keyword list
    pub fn new(kind: TokenizerKind, keywords: Vec<String>, num_reserved: usize) -> Self {
        let ids = keywords
            .iter()
            .enumerate()
            .map(|(i, kw)| (kw.clone(), num_reserved + i))
            .collect();
        Self {
            kind,
            num_reserved,
            keywords,
            ids,
        }
    }

    /// Keep the `num_keywords` most frequent symbols across `texts`.
    /// Ties are broken lexicographically so fitting is deterministic.
    pub fn fit<'a, I>(kind: TokenizerKind, texts: I, num_keywords: usize, num_reserved: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for text in texts {
            for symbol in get_symbols(text) {
                *counts.entry(symbol).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let keywords = ranked
            .into_iter()
            .take(num_keywords)
            .map(|(symbol, _)| symbol.to_string())
            .collect();

        Self::new(kind, keywords, num_reserved)
    }

    /// Token ids of every symbol in `text`, per the tokenizer's fallback rule
    pub fn to_tokens(&self, text: &str) -> Vec<usize> {
        get_symbols(text)
            .into_iter()
            .filter_map(|symbol| match self.ids.get(symbol) {
                Some(&id) => Some(id),
                None => match self.kind {
                    TokenizerKind::NoFallback => None,
                    TokenizerKind::UnkFallback => Some(UNKNOWN_TOKEN),
                },
            })
            .collect()
    }

    /// Size of the token id space, reserved ids included
    pub fn num_tokens(&self) -> usize {
        self.num_reserved + self.keywords.len()
    }

    pub fn kind(&self) -> TokenizerKind {
        self.kind
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

#[derive(Deserialize)]
struct StoredTokenizer {
    kind: TokenizerKind,
    num_reserved: usize,
    keywords: Vec<String>,
}

impl From<StoredTokenizer> for Tokenizer {
    fn from(stored: StoredTokenizer) -> Self {
        Tokenizer::new(stored.kind, stored.keywords, stored.num_reserved)
    }
}

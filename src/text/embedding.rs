//! Bidirectional stem ↔ index map

use crate::core::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Assigns dense indices to tactic stems in first-seen order.
///
/// Serialized as the ordered stem list; the reverse map is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Embedding {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Embedding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `token`, assigning the next free index on first sight
    pub fn encode_token(&mut self, token: &str) -> usize {
        if let Some(&idx) = self.index.get(token) {
            return idx;
        }
        let idx = self.tokens.len();
        self.tokens.push(token.to_string());
        self.index.insert(token.to_string(), idx);
        idx
    }

    /// Index of a known token, without inserting
    pub fn lookup(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn decode_token(&self, idx: usize) -> Result<&str> {
        self.tokens
            .get(idx)
            .map(String::as_str)
            .ok_or(PredictorError::UnknownClass(idx))
    }

    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl PartialEq for Embedding {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl From<Vec<String>> for Embedding {
    fn from(tokens: Vec<String>) -> Self {
        let mut embedding = Embedding::new();
        for token in &tokens {
            embedding.encode_token(token);
        }
        embedding
    }
}

impl From<Embedding> for Vec<String> {
    fn from(embedding: Embedding) -> Self {
        embedding.tokens
    }
}

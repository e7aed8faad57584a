//! Tactic predictors
//!
//! A predictor maps a proof context to a ranked list of complete tactics.

pub mod wordbag;

pub use self::wordbag::WordBagSVMClassifier;

use crate::core::{PredictorError, Result};
use crate::data::ScrapedTactic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The proof state a prediction is made from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticContext {
    pub goal: String,
    #[serde(default)]
    pub prev_tactics: Vec<String>,
    #[serde(default)]
    pub hypotheses: Vec<String>,
}

impl TacticContext {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            prev_tactics: Vec::new(),
            hypotheses: Vec::new(),
        }
    }

    pub fn with_prev_tactics(mut self, prev_tactics: Vec<String>) -> Self {
        self.prev_tactics = prev_tactics;
        self
    }

    pub fn with_hypotheses(mut self, hypotheses: Vec<String>) -> Self {
        self.hypotheses = hypotheses;
        self
    }
}

impl From<&ScrapedTactic> for TacticContext {
    fn from(sample: &ScrapedTactic) -> Self {
        TacticContext::new(sample.goal())
            .with_prev_tactics(sample.prev_tactics.clone())
            .with_hypotheses(sample.hypotheses().to_vec())
    }
}

/// A complete tactic and its predicted probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticPrediction {
    pub tactic: String,
    pub probability: f64,
}

/// String options a predictor is constructed from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictorOptions {
    values: HashMap<String, String>,
}

impl PredictorOptions {
    pub const FILENAME: &'static str = "filename";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// A required, non-empty option
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| PredictorError::MissingOption(key.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PredictorOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Common interface of tactic predictors
pub trait TacticPredictor {
    /// How the predictor was trained, as (name, value) pairs
    fn options(&self) -> &[(String, String)];

    /// Log-probability of every tactic class for `input`
    fn predict_distribution(&self, input: &TacticContext) -> Result<Vec<f64>>;

    /// The `k` most likely tactics, most likely first
    fn predict_k_tactics(&self, input: &TacticContext, k: usize) -> Result<Vec<TacticPrediction>>;

    /// As `predict_k_tactics`, also scoring against the tactic that was
    /// actually used
    fn predict_k_tactics_with_loss(
        &self,
        input: &TacticContext,
        k: usize,
        correct: &str,
    ) -> Result<(Vec<TacticPrediction>, f64)>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Obligation, ProofContext};

    #[test]
    fn test_options_require() {
        let options: PredictorOptions = [("filename", "model.json"), ("empty", "")]
            .into_iter()
            .collect();

        assert_eq!(options.require(PredictorOptions::FILENAME).unwrap(), "model.json");
        assert!(matches!(
            options.require("empty"),
            Err(PredictorError::MissingOption(key)) if key == "empty"
        ));
        assert!(matches!(
            PredictorOptions::new().require(PredictorOptions::FILENAME),
            Err(PredictorError::MissingOption(_))
        ));
        assert_eq!(PredictorOptions::new().with("k", "v").get("k"), Some("v"));
    }

    #[test]
    fn test_context_from_json_ignores_extras() {
        let context: TacticContext =
            serde_json::from_str(r#"{"goal": "n = n", "unused": 3}"#).unwrap();
        assert_eq!(context, TacticContext::new("n = n"));
    }

    #[test]
    fn test_context_from_scraped_tactic() {
        let sample = ScrapedTactic {
            relevant_lemmas: Vec::new(),
            prev_tactics: vec!["intros.".to_string()],
            context: ProofContext {
                fg_goals: vec![Obligation {
                    hypotheses: vec!["H : P".to_string()],
                    goal: "P".to_string(),
                }],
                ..ProofContext::default()
            },
            tactic: "exact H.".to_string(),
        };

        let context = TacticContext::from(&sample);
        assert_eq!(context.goal, "P");
        assert_eq!(context.prev_tactics, vec!["intros."]);
        assert_eq!(context.hypotheses, vec!["H : P"]);
    }
}

//! Bag-of-words SVM stem classifier
//!
//! Predicts the stem of the next tactic from the token counts of the goal
//! alone. Predicted stems are returned as complete tactics by appending the
//! terminating period.

use crate::core::Result;
use crate::data::encode_bag_classify_input;
use crate::persistence::Checkpoint;
use crate::predictor::{PredictorOptions, TacticContext, TacticPrediction, TacticPredictor};
use crate::text::get_stem;
use crate::utils::ranking::top_k;
use log::debug;

pub struct WordBagSVMClassifier {
    checkpoint: Checkpoint,
}

impl WordBagSVMClassifier {
    /// Load the checkpoint named by the `filename` option
    pub fn new(options: &PredictorOptions) -> Result<Self> {
        let filename = options.require(PredictorOptions::FILENAME)?;
        debug!("Loading checkpoint from {filename}");
        Ok(Self::from_checkpoint(Checkpoint::load_from_file(filename)?))
    }

    pub fn from_checkpoint(checkpoint: Checkpoint) -> Self {
        Self { checkpoint }
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// Number of tactic stems the classifier can predict
    pub fn num_stems(&self) -> usize {
        self.checkpoint.classifier().n_classes()
    }

    fn top_predictions(&self, distribution: &[f64], k: usize) -> Result<Vec<TacticPrediction>> {
        let classes = self.checkpoint.classifier().classes();
        let embedding = self.checkpoint.stem_embeddings();

        top_k(distribution, k)
            .into_iter()
            .map(|column| {
                let stem = embedding.decode_token(classes[column])?;
                Ok(TacticPrediction {
                    tactic: format!("{stem}."),
                    probability: distribution[column].exp(),
                })
            })
            .collect()
    }
}

impl TacticPredictor for WordBagSVMClassifier {
    fn options(&self) -> &[(String, String)] {
        self.checkpoint.options()
    }

    fn predict_distribution(&self, input: &TacticContext) -> Result<Vec<f64>> {
        let features = encode_bag_classify_input(&input.goal, self.checkpoint.tokenizer());
        self.checkpoint.classifier().predict_log_proba(&features)
    }

    fn predict_k_tactics(&self, input: &TacticContext, k: usize) -> Result<Vec<TacticPrediction>> {
        let distribution = self.predict_distribution(input)?;
        self.top_predictions(&distribution, k)
    }

    fn predict_k_tactics_with_loss(
        &self,
        input: &TacticContext,
        k: usize,
        correct: &str,
    ) -> Result<(Vec<TacticPrediction>, f64)> {
        let distribution = self.predict_distribution(input)?;
        let stem = get_stem(correct);
        debug!("Scoring against stem {stem:?}");

        // No loss is computed for this model
        Ok((self.top_predictions(&distribution, k)?, 0.0))
    }
}

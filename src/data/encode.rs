//! Bag-of-words encoding of goals for stem classification

use crate::core::{Dataset, LabeledSample, PredictorError, Result, SparseVector};
use crate::data::scrape::ScrapedTactic;
use crate::text::{Embedding, Tokenizer, TokenizerKind};
use log::info;

/// Encoded training set: goal token counts labelled with stem indices
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    samples: Vec<LabeledSample>,
    dimensions: usize,
}

impl EncodedDataset {
    pub fn as_slice(&self) -> &[LabeledSample] {
        &self.samples
    }
}

impl Dataset for EncodedDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> LabeledSample {
        self.samples[i].clone()
    }

    fn samples(&self) -> Vec<LabeledSample> {
        self.samples.clone()
    }
}

/// Token-count vector of `goal`
pub fn encode_bag_classify_input(goal: &str, tokenizer: &Tokenizer) -> SparseVector {
    SparseVector::from_counts(tokenizer.to_tokens(goal))
}

/// Fit a keyword tokenizer and a stem embedding on `data` and encode every
/// sample as (goal bag, stem index)
pub fn encode_bag_classify_data(
    data: &[ScrapedTactic],
    kind: TokenizerKind,
    num_keywords: usize,
    num_reserved: usize,
) -> Result<(EncodedDataset, Tokenizer, Embedding)> {
    let labelled: Vec<(&ScrapedTactic, String)> = data
        .iter()
        .filter_map(|sample| sample.stem().map(|stem| (sample, stem)))
        .collect();
    if labelled.is_empty() {
        return Err(PredictorError::EmptyDataset);
    }

    let tokenizer = Tokenizer::fit(
        kind,
        labelled.iter().map(|(sample, _)| sample.goal()),
        num_keywords,
        num_reserved,
    );
    if tokenizer.keywords().is_empty() {
        return Err(PredictorError::EmptyVocabulary);
    }

    let mut embedding = Embedding::new();
    let samples: Vec<LabeledSample> = labelled
        .iter()
        .map(|(sample, stem)| {
            LabeledSample::new(
                encode_bag_classify_input(sample.goal(), &tokenizer),
                embedding.encode_token(stem),
            )
        })
        .collect();

    info!(
        "Encoded {} samples: {} stems, {} keywords",
        samples.len(),
        embedding.num_tokens(),
        tokenizer.keywords().len()
    );

    let dataset = EncodedDataset {
        samples,
        dimensions: tokenizer.num_tokens(),
    };
    Ok((dataset, tokenizer, embedding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::scrape::{Obligation, ProofContext};

    fn scraped(tactic: &str, goal: &str) -> ScrapedTactic {
        ScrapedTactic {
            relevant_lemmas: Vec::new(),
            prev_tactics: Vec::new(),
            context: ProofContext {
                fg_goals: vec![Obligation {
                    hypotheses: Vec::new(),
                    goal: goal.to_string(),
                }],
                ..ProofContext::default()
            },
            tactic: tactic.to_string(),
        }
    }

    #[test]
    fn test_encode_input_counts_tokens() {
        let tokenizer = Tokenizer::new(
            TokenizerKind::NoFallback,
            vec!["n".to_string(), "=".to_string()],
            2,
        );

        let bag = encode_bag_classify_input("n = n + 0", &tokenizer);
        assert_eq!(bag.get(2), 2.0);
        assert_eq!(bag.get(3), 1.0);
        assert_eq!(bag.nnz(), 2);

        assert!(encode_bag_classify_input("", &tokenizer).is_empty());
    }

    #[test]
    fn test_encode_data_labels_by_stem() {
        let data = vec![
            scraped("intros n.", "forall n, n = n"),
            scraped("reflexivity.", "n = n"),
            scraped("intros.", "forall m, m = m"),
        ];

        let (dataset, tokenizer, embedding) =
            encode_bag_classify_data(&data, TokenizerKind::NoFallback, 100, 2).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(embedding.num_tokens(), 2);
        let classes: Vec<usize> = dataset.as_slice().iter().map(|s| s.class).collect();
        assert_eq!(classes, vec![0, 1, 0]);
        assert_eq!(embedding.decode_token(1).unwrap(), "reflexivity");

        assert_eq!(dataset.dim(), tokenizer.num_tokens());
        assert!(dataset
            .as_slice()
            .iter()
            .all(|s| s.features.min_dim() <= dataset.dim()));
    }

    #[test]
    fn test_encode_symbol_free_goals() {
        let data = vec![scraped("intros.", ""), scraped("auto.", "   ")];
        let result = encode_bag_classify_data(&data, TokenizerKind::NoFallback, 100, 2);
        assert!(matches!(result, Err(PredictorError::EmptyVocabulary)));
    }

    #[test]
    fn test_encode_empty_data() {
        let result = encode_bag_classify_data(&[], TokenizerKind::NoFallback, 100, 2);
        assert!(matches!(result, Err(PredictorError::EmptyDataset)));
    }
}

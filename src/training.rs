//! Training pipeline: scrape file → encoded samples → classifier → checkpoint

use crate::api::SVC;
use crate::core::{Dataset, Result};
use crate::data::{encode_bag_classify_data, get_text_data, ContextFilter};
use crate::persistence::Checkpoint;
use crate::svc::SupportVectorClassifier;
use crate::text::TokenizerKind;
use crate::utils::stats::{class_counts, sparse_vector_stats};
use log::info;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Keywords kept by the goal tokenizer
pub const NUM_KEYWORDS: usize = 100;
/// Token ids reserved ahead of the keywords (padding, unknown)
pub const NUM_RESERVED_TOKENS: usize = 2;

pub const DEFAULT_CONTEXT_FILTER: &str = "default";

/// Fit `svc` on an encoded dataset, reporting the elapsed time on stdout
pub fn train<D: Dataset + ?Sized>(dataset: &D, svc: SVC) -> Result<SupportVectorClassifier> {
    let start = Instant::now();
    print!("Training SVM...");
    std::io::stdout().flush()?;

    let classifier = svc.fit(dataset)?;
    println!(" {:.2}s", start.elapsed().as_secs_f64());
    Ok(classifier)
}

/// Build a checkpoint from a scrape file
pub fn train_checkpoint<P: AsRef<Path>>(
    scrape_file: P,
    context_filter: &str,
    max_tuples: Option<usize>,
    svc: SVC,
) -> Result<Checkpoint> {
    let filter = ContextFilter::parse(context_filter)?;
    let data = get_text_data(scrape_file, &filter, max_tuples)?;

    let (samples, tokenizer, embedding) = encode_bag_classify_data(
        &data,
        TokenizerKind::NoFallback,
        NUM_KEYWORDS,
        NUM_RESERVED_TOKENS,
    )?;

    let stats = sparse_vector_stats(samples.as_slice());
    info!(
        "Goal bags: mean {:.1} distinct tokens (min {}, max {}), {} stems",
        stats.mean_nnz,
        stats.min_nnz,
        stats.max_nnz,
        class_counts(samples.as_slice()).len()
    );

    let classifier = train(&samples, svc)?;

    let options = vec![
        ("dataset size".to_string(), samples.len().to_string()),
        ("context filter".to_string(), context_filter.to_string()),
    ];
    Checkpoint::new(embedding, tokenizer, classifier, options)
}

/// Train from `scrape_file` and write the checkpoint to `save_file`
pub fn train_and_save<P: AsRef<Path>, Q: AsRef<Path>>(
    scrape_file: P,
    save_file: Q,
    context_filter: &str,
    max_tuples: Option<usize>,
    svc: SVC,
) -> Result<Checkpoint> {
    let checkpoint = train_checkpoint(scrape_file, context_filter, max_tuples, svc)?;
    checkpoint.save_to_file(save_file.as_ref())?;
    info!("Checkpoint saved to {}", save_file.as_ref().display());
    Ok(checkpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PredictorError;
    use tempfile::NamedTempFile;

    fn record(goal: &str, tactic: &str) -> String {
        serde_json::json!({
            "prev_tactics": [],
            "context": {"fg_goals": [{"hypotheses": [], "goal": goal}]},
            "tactic": tactic,
        })
        .to_string()
    }

    fn scrape_file(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_train_checkpoint_records_options() {
        let file = scrape_file(&[
            "\"Lemma l : forall n, n = n.\"".to_string(),
            record("forall n, n = n", "intros n."),
            record("forall m, m = m", "intros."),
            record("n = n", "reflexivity."),
            record("0 = 0", "reflexivity."),
            record("n = n", "auto; reflexivity."),
        ]);

        let checkpoint = train_checkpoint(file.path(), "default", None, SVC::new()).unwrap();

        assert_eq!(
            checkpoint.options(),
            &[
                ("dataset size".to_string(), "4".to_string()),
                ("context filter".to_string(), "default".to_string()),
            ]
        );
        assert_eq!(checkpoint.stem_embeddings().num_tokens(), 2);
        assert_eq!(checkpoint.classifier().n_features(), checkpoint.tokenizer().num_tokens());
    }

    #[test]
    fn test_max_tuples_limits_dataset() {
        let file = scrape_file(&[
            record("a = a", "reflexivity."),
            record("forall x, x = x", "intros."),
            record("b = b", "reflexivity."),
        ]);

        let checkpoint = train_checkpoint(file.path(), "all", Some(2), SVC::new()).unwrap();
        assert_eq!(checkpoint.options()[0].1, "2");
    }

    #[test]
    fn test_unknown_filter_fails_before_reading() {
        let result = train_checkpoint("/nonexistent/scrape", "bogus", None, SVC::new());
        assert!(matches!(result, Err(PredictorError::UnknownContextFilter(_))));
    }

    #[test]
    fn test_missing_scrape_file() {
        let result = train_checkpoint("/nonexistent/scrape", "all", None, SVC::new());
        assert!(matches!(result, Err(PredictorError::IoError(_))));
    }

    #[test]
    fn test_nothing_survives_filter() {
        let file = scrape_file(&[record("", "intros.")]);
        let result = train_checkpoint(file.path(), "has-goal", None, SVC::new());
        assert!(matches!(result, Err(PredictorError::EmptyDataset)));
    }

    #[test]
    fn test_empty_goals_fail_before_fitting() {
        let file = scrape_file(&[
            record("", "intros."),
            record("", "auto."),
            record("", "reflexivity."),
        ]);
        let result = train_checkpoint(file.path(), "all", None, SVC::new());
        assert!(matches!(result, Err(PredictorError::EmptyVocabulary)));
    }

    #[test]
    fn test_train_and_save_writes_loadable_checkpoint() {
        let file = scrape_file(&[
            record("forall n, n = n", "intros."),
            record("n = n", "reflexivity."),
        ]);
        let out = NamedTempFile::new().expect("Failed to create temp file");

        let saved = train_and_save(file.path(), out.path(), "all", None, SVC::new()).unwrap();
        let loaded = Checkpoint::load_from_file(out.path()).unwrap();
        assert_eq!(loaded, saved);
    }
}

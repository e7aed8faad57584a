//! Integration tests for the tactic_svm library
//!
//! These tests verify end-to-end functionality across multiple modules:
//! scrape file → training → checkpoint → predictor.

use approx::assert_relative_eq;
use std::io::Write;
use tactic_svm::persistence::{
    CLASSIFIER_FIELD, OPTIONS_FIELD, STEM_EMBEDDINGS_FIELD, TOKENIZER_FIELD,
};
use tactic_svm::syntax::{strip_comments, syntax_highlight};
use tactic_svm::training::{self, train_and_save};
use tactic_svm::{
    Checkpoint, PredictorError, PredictorOptions, TacticContext, TacticPredictor,
    WordBagSVMClassifier, SVC,
};
use tempfile::{NamedTempFile, TempDir};

fn record(goal: &str, hypotheses: &[&str], tactic: &str) -> String {
    serde_json::json!({
        "prev_tactics": [],
        "context": {
            "fg_goals": [{"hypotheses": hypotheses, "goal": goal}],
            "bg_goals": [],
            "shelved_goals": [],
            "given_up_goals": []
        },
        "tactic": tactic,
        "relevant_lemmas": []
    })
    .to_string()
}

/// A small scrape with four clearly separated stems
fn write_scrape() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let lines = vec![
        "\"Require Import Arith.\"".to_string(),
        "\"Theorem t : forall n, n = n.\"".to_string(),
        record("forall n : nat, P n", &[], "intros n."),
        record("forall n m : nat, Q n m", &[], "intros."),
        record("forall (A : Type) (x : A), P x", &[], "intros A x."),
        record("forall x, R x", &[], "intros x."),
        record("forall y, P y", &[], "intros."),
        record("n = n", &["n : nat"], "reflexivity."),
        record("0 = 0", &[], "reflexivity."),
        record("S n = S n", &["n : nat"], "reflexivity."),
        record("x = x", &["x : nat"], "reflexivity."),
        record("y = y", &["y : nat"], "reflexivity."),
        record("n < S n", &["n : nat"], "omega."),
        record("0 < 1", &[], "omega."),
        record("n + 1 < n + 2", &["n : nat"], "omega."),
        record("x < S x", &["x : nat"], "omega."),
        record("y < S y", &["y : nat"], "omega."),
        record("P /\\ Q", &["HP : P", "HQ : Q"], "split."),
        record("True /\\ True", &[], "split."),
        record("P /\\ P", &["HP : P"], "- split."),
        record("Q /\\ R", &["HQ : Q", "HR : R"], "split."),
        record("R /\\ P", &[], "split."),
        record("n = n", &["n : nat"], "simpl; reflexivity."),
        record("", &[], "Qed."),
    ];
    for line in lines {
        writeln!(file, "{line}").expect("Failed to write");
    }
    file.flush().expect("Failed to flush");
    file
}

fn trained_predictor(dir: &TempDir) -> WordBagSVMClassifier {
    let scrape = write_scrape();
    let checkpoint_path = dir.path().join("wordbag.json");

    train_and_save(scrape.path(), &checkpoint_path, "default", None, SVC::new())
        .expect("Training should succeed");

    let options = PredictorOptions::new().with("filename", checkpoint_path.to_string_lossy());
    WordBagSVMClassifier::new(&options).expect("Predictor should load")
}

/// Test complete workflow: scrape → training → checkpoint → prediction
#[test]
fn test_complete_workflow() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let predictor = trained_predictor(&dir);

    assert_eq!(
        predictor.options(),
        &[
            ("dataset size".to_string(), "20".to_string()),
            ("context filter".to_string(), "default".to_string()),
        ]
    );
    assert_eq!(predictor.num_stems(), 4);

    let cases = [
        ("forall k : nat, P k", "intros."),
        ("n = n", "reflexivity."),
        ("0 < 2", "omega."),
        ("R /\\ R", "split."),
    ];
    for (goal, expected) in cases {
        let predictions = predictor
            .predict_k_tactics(&TacticContext::new(goal), 1)
            .expect("Prediction should succeed");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].tactic, expected, "goal: {goal}");
    }
}

#[test]
fn test_top_k_properties() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let predictor = trained_predictor(&dir);

    for k in 0..=6 {
        let predictions = predictor
            .predict_k_tactics(&TacticContext::new("forall x, x < S x"), k)
            .unwrap();

        assert_eq!(predictions.len(), k.min(4));
        for pair in predictions.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
        }
        for prediction in &predictions {
            assert!(prediction.probability > 0.0 && prediction.probability <= 1.0);
            assert!(prediction.tactic.len() > 1);
            assert!(prediction.tactic.ends_with('.'));
        }
    }
}

#[test]
fn test_distribution_matches_top_k() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let predictor = trained_predictor(&dir);
    let context = TacticContext::new("n = n");

    let distribution = predictor.predict_distribution(&context).unwrap();
    assert_eq!(distribution.len(), 4);
    assert_relative_eq!(
        distribution.iter().map(|lp| lp.exp()).sum::<f64>(),
        1.0,
        epsilon = 1e-6
    );

    let best = distribution.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let top = predictor.predict_k_tactics(&context, 1).unwrap();
    assert_relative_eq!(top[0].probability, best.exp(), epsilon = 1e-12);
}

#[test]
fn test_with_loss_is_constant_zero() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let predictor = trained_predictor(&dir);
    let context = TacticContext::new("0 < 2");

    for correct in ["omega.", "- split.", ""] {
        let (predictions, loss) = predictor
            .predict_k_tactics_with_loss(&context, 3, correct)
            .unwrap();
        assert_eq!(loss, 0.0);
        assert_eq!(predictions, predictor.predict_k_tactics(&context, 3).unwrap());
    }
}

#[test]
fn test_checkpoint_missing_fields_fail_construction() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let scrape = write_scrape();
    let full_path = dir.path().join("full.json");
    train_and_save(scrape.path(), &full_path, "default", None, SVC::new()).unwrap();

    let full: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&full_path).unwrap()).unwrap();

    for field in [STEM_EMBEDDINGS_FIELD, TOKENIZER_FIELD, CLASSIFIER_FIELD, OPTIONS_FIELD] {
        let mut partial = full.clone();
        partial.as_object_mut().unwrap().remove(field);
        let path = dir.path().join(format!("without-{field}.json"));
        std::fs::write(&path, serde_json::to_string(&partial).unwrap()).unwrap();

        let options = PredictorOptions::new().with("filename", path.to_string_lossy());
        match WordBagSVMClassifier::new(&options) {
            Err(PredictorError::MissingCheckpointField(name)) => assert_eq!(name, field),
            Err(other) => panic!("Unexpected error for {field}: {other}"),
            Ok(_) => panic!("Checkpoint without {field} should not load"),
        }
    }
}

#[test]
fn test_checkpoint_empty_options_fail_construction() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let scrape = write_scrape();
    let path = dir.path().join("wordbag.json");
    train_and_save(scrape.path(), &path, "default", None, SVC::new()).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    json[OPTIONS_FIELD] = serde_json::json!([]);
    std::fs::write(&path, json.to_string()).unwrap();

    assert!(matches!(
        Checkpoint::load_from_file(&path),
        Err(PredictorError::EmptyCheckpointField(name)) if name == OPTIONS_FIELD
    ));
}

#[test]
fn test_corrupted_classifier_fails_construction() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let scrape = write_scrape();
    let path = dir.path().join("wordbag.json");
    train_and_save(scrape.path(), &path, "default", None, SVC::new()).unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    let mut bad_gamma = saved.clone();
    bad_gamma[CLASSIFIER_FIELD]["kernel"]["gamma"] = serde_json::json!(-1.0);
    let mut bad_machine = saved;
    bad_machine[CLASSIFIER_FIELD]["machines"][0]["positive"] = serde_json::json!(9);

    for corrupted in [bad_gamma, bad_machine] {
        std::fs::write(&path, corrupted.to_string()).unwrap();
        let options = PredictorOptions::new().with("filename", path.to_string_lossy());
        assert!(matches!(
            WordBagSVMClassifier::new(&options),
            Err(PredictorError::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_missing_filename_option() {
    let result = WordBagSVMClassifier::new(&PredictorOptions::new().with("other", "x"));
    assert!(matches!(result, Err(PredictorError::MissingOption(_))));
}

#[test]
fn test_missing_checkpoint_file() {
    let options = PredictorOptions::new().with("filename", "/nonexistent/checkpoint.json");
    assert!(matches!(
        WordBagSVMClassifier::new(&options),
        Err(PredictorError::IoError(_))
    ));
}

#[test]
fn test_training_pipeline_constants() {
    assert_eq!(training::NUM_KEYWORDS, 100);
    assert_eq!(training::NUM_RESERVED_TOKENS, 2);
    assert_eq!(training::DEFAULT_CONTEXT_FILTER, "default");
}

#[test]
fn test_highlight_then_strip() {
    let source = "Theorem t : True. (* trivial *)\nProof. exact I. Qed.";

    assert_eq!(strip_comments(source), "Theorem t : True. \nProof. exact I. Qed.");

    let highlighted = syntax_highlight(source);
    assert!(highlighted.starts_with("<span style=\"color:#a020f0\">Theorem</span> t"));
    assert!(highlighted.contains("<span style=\"color:#004800\">(* trivial *)</span>"));
    assert!(highlighted.ends_with("<span style=\"color:#a020f0\">Qed</span>."));
}

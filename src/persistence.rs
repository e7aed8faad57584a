//! Checkpoint serialization and persistence
//!
//! A checkpoint holds everything a predictor needs: the stem embedding, the
//! fitted tokenizer, the trained classifier and the training options. It is
//! stored as pretty-printed JSON and validated on load.

use crate::core::{PredictorError, Result};
use crate::svc::SupportVectorClassifier;
use crate::text::{Embedding, Tokenizer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

pub const STEM_EMBEDDINGS_FIELD: &str = "stem-embeddings";
pub const TOKENIZER_FIELD: &str = "tokenizer";
pub const CLASSIFIER_FIELD: &str = "classifier";
pub const OPTIONS_FIELD: &str = "options";

/// Ordered (name, value) pairs describing how a checkpoint was trained
pub type TrainingOptions = Vec<(String, String)>;

/// Checkpoint metadata for tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Library version used to create the checkpoint
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl CheckpointMetadata {
    pub fn now() -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A validated, immutable checkpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkpoint {
    #[serde(rename = "stem-embeddings")]
    stem_embeddings: Embedding,
    tokenizer: Tokenizer,
    classifier: SupportVectorClassifier,
    options: TrainingOptions,
    metadata: Option<CheckpointMetadata>,
}

/// On-disk shape; every field may be absent until validated
#[derive(Deserialize)]
struct StoredCheckpoint {
    #[serde(rename = "stem-embeddings")]
    stem_embeddings: Option<Embedding>,
    tokenizer: Option<Tokenizer>,
    classifier: Option<SupportVectorClassifier>,
    options: Option<TrainingOptions>,
    metadata: Option<CheckpointMetadata>,
}

impl Checkpoint {
    /// Assemble a checkpoint from freshly trained parts, stamping metadata
    pub fn new(
        stem_embeddings: Embedding,
        tokenizer: Tokenizer,
        classifier: SupportVectorClassifier,
        options: TrainingOptions,
    ) -> Result<Self> {
        let checkpoint = Self {
            stem_embeddings,
            tokenizer,
            classifier,
            options,
            metadata: Some(CheckpointMetadata::now()),
        };
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    fn from_stored(stored: StoredCheckpoint) -> Result<Self> {
        let missing = |field: &str| PredictorError::MissingCheckpointField(field.to_string());

        let checkpoint = Self {
            stem_embeddings: stored
                .stem_embeddings
                .ok_or_else(|| missing(STEM_EMBEDDINGS_FIELD))?,
            tokenizer: stored.tokenizer.ok_or_else(|| missing(TOKENIZER_FIELD))?,
            classifier: stored.classifier.ok_or_else(|| missing(CLASSIFIER_FIELD))?,
            options: stored.options.ok_or_else(|| missing(OPTIONS_FIELD))?,
            metadata: stored.metadata,
        };
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    fn validate(&self) -> Result<()> {
        let empty = |field: &str| Err(PredictorError::EmptyCheckpointField(field.to_string()));

        if self.stem_embeddings.is_empty() {
            return empty(STEM_EMBEDDINGS_FIELD);
        }
        if self.tokenizer.keywords().is_empty() {
            return empty(TOKENIZER_FIELD);
        }
        if self.classifier.n_classes() == 0 {
            return empty(CLASSIFIER_FIELD);
        }
        if self.options.is_empty() {
            return empty(OPTIONS_FIELD);
        }

        self.classifier.validate()?;

        if let Some(&class) = self
            .classifier
            .classes()
            .iter()
            .find(|&&class| class >= self.stem_embeddings.num_tokens())
        {
            return Err(PredictorError::UnknownClass(class));
        }
        if self.classifier.n_features() != self.tokenizer.num_tokens() {
            return Err(PredictorError::DimensionMismatch {
                expected: self.tokenizer.num_tokens(),
                actual: self.classifier.n_features(),
            });
        }
        Ok(())
    }

    pub fn stem_embeddings(&self) -> &Embedding {
        &self.stem_embeddings
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn classifier(&self) -> &SupportVectorClassifier {
        &self.classifier
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    pub fn metadata(&self) -> Option<&CheckpointMetadata> {
        self.metadata.as_ref()
    }

    /// Save checkpoint to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(PredictorError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PredictorError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a checkpoint from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(PredictorError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let stored: StoredCheckpoint = serde_json::from_reader(reader)
            .map_err(|e| PredictorError::SerializationError(e.to_string()))?;
        Self::from_stored(stored)
    }

    /// Print checkpoint summary
    pub fn print_summary(&self) {
        println!("=== Tactic Classifier Checkpoint ===");
        println!("Stems: {}", self.stem_embeddings.num_tokens());
        println!(
            "Tokenizer: {} ({} keywords)",
            self.tokenizer.kind(),
            self.tokenizer.keywords().len()
        );
        println!("Kernel: {:?}", self.classifier.kernel());
        println!("Classes: {}", self.classifier.n_classes());
        println!("Pairwise Machines: {}", self.classifier.machines().len());
        println!("Support Vectors: {}", self.classifier.n_support_vectors());
        if let Some(metadata) = &self.metadata {
            println!("Library Version: {}", metadata.library_version);
            println!("Created: {}", metadata.created_at);
        }
        println!("Training Options:");
        for (name, value) in &self.options {
            println!("  {name}: {value}");
        }
    }
}

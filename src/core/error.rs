//! Error types for tactic prediction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Missing required option: {0}")]
    MissingOption(String),

    #[error("Checkpoint is missing field '{0}'")]
    MissingCheckpointField(String),

    #[error("Checkpoint field '{0}' is empty")]
    EmptyCheckpointField(String),

    #[error("No goal symbols to build a tokenizer vocabulary from")]
    EmptyVocabulary,

    #[error("Unknown tokenizer: {0}")]
    UnknownTokenizer(String),

    #[error("Unknown context filter: {0}")]
    UnknownContextFilter(String),

    #[error("Class index {0} is not in the embedding")]
    UnknownClass(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, PredictorError>;

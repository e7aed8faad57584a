//! Bag-of-words SVM tactic prediction for Coq proofs
//!
//! A multiclass support vector classifier predicts the stem of the next
//! tactic from the token counts of the current goal. The `syntax` module
//! highlights and strips comments from Coq source.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod optimizer;
pub mod persistence;
pub mod predictor;
pub mod probability;
pub mod solver;
pub mod svc;
pub mod syntax;
pub mod text;
pub mod training;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{ModelInfo, SVC};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{PredictorError, Result};
pub use crate::data::{ContextFilter, EncodedDataset, ScrapedTactic};
pub use crate::kernel::{Gamma, Kernel, KernelSpec, LinearKernel, RBFKernel};
pub use crate::optimizer::{SVMOptimizer, TrainedSVM};
pub use crate::persistence::Checkpoint;
pub use crate::predictor::{
    PredictorOptions, TacticContext, TacticPrediction, TacticPredictor, WordBagSVMClassifier,
};
pub use crate::svc::SupportVectorClassifier;
pub use crate::text::{Embedding, Tokenizer, TokenizerKind};
pub use crate::utils::SparseVectorStats;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

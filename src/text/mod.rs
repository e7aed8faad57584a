//! Text processing for goals and tactics

pub mod embedding;
pub mod stem;
pub mod tokenizer;

pub use self::embedding::Embedding;
pub use self::stem::get_stem;
pub use self::tokenizer::{get_symbols, Tokenizer, TokenizerKind, UNKNOWN_TOKEN};

//! Training data: scrape-file loading and bag-of-words encoding

pub mod encode;
pub mod scrape;

pub use self::encode::*;
pub use self::scrape::*;

//! SVM solver implementations
//!
//! Sequential Minimal Optimization (SMO) for the binary dual problem.

pub mod smo;

pub use self::smo::*;

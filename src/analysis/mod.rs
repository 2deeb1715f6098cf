//! Preload intersection analysis and failure-mode prediction

pub mod prediction;
pub mod zones;

pub use prediction::*;
pub use zones::*;

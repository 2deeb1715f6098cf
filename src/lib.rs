pub mod types;
pub mod spudcan;
pub mod soil;
pub mod capacity;
pub mod analysis;
pub mod config;

pub use types::*;

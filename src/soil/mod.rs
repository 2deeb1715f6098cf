pub mod profile;
pub mod library;

pub use profile::*;
pub use library::*;

//! Bearing capacity mechanisms, chart data and the envelope sweep

pub mod bearing;
pub mod envelope;
pub mod nc_chart;

pub use bearing::*;
pub use envelope::*;
pub use nc_chart::interpolate_nc_prime;

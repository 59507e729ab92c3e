//! Vision detection boundary
//!
//! The stock-in engine never calls a detector; this module describes what a
//! detection service accepts and returns, and provides a simulated detector
//! for offline runs.

pub mod detection;
pub mod simulated;

pub use detection::*;
pub use simulated::*;

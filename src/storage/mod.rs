//! Artifact storage module
//!
//! Handles:
//! - Rendered network plots (one file per analysis)

mod plots;

pub use plots::{PlotId, PlotRetention, PlotStore};

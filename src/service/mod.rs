//! Service layer
//!
//! Business logic separated from HTTP handlers. Services work on one
//! client's store at a time.

mod analysis;
mod records;

pub use analysis::{AnalysisReport, AnalysisRequest, AnalysisService, SimilarReport};
pub use records::RecordService;

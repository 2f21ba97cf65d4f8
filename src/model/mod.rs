//! Typed views of the two result shapes returned by the analysis service.
//!
//! Both shapes are loosely typed JSON. Each has a partial `*Payload` struct
//! (every field optional, decoded leniently) and a materialized `*Report`
//! produced in a single defaulting step.

pub mod lenient;
pub mod prediction;
pub mod waste;

pub use prediction::PredictionReport;
pub use waste::WasteReport;

//! Output writers for aggregation results.
//!
//! This module handles rendering results in various formats:
//! - JSON reports
//! - Text summaries

pub mod report;

// Re-export main functions
pub use report::{build_report, generate_text_summary, write_report, AggregationReport, ReportEntry};

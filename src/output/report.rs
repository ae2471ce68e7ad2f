//! Aggregation report output.
//!
//! Renders a `ResultSet` as pretty JSON or as a text table for the terminal.
//! Reports are a view of one pass; nothing reads them back.

use crate::aggregator::{ResultSet, SelectionPolicy};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use chrono::Utc;
use log::debug;
use serde::Serialize;
use std::io::Write;

/// Top-level report structure
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    /// Report schema version
    pub version: String,

    /// Metric the values were accumulated with
    pub metric: String,

    /// Frame attribution policy
    pub policy: SelectionPolicy,

    /// Number of methods with a value
    pub method_count: usize,

    /// Sum of all values
    pub total: u64,

    pub min_value: u64,
    pub max_value: u64,

    /// False when every method has the same value
    pub has_variation: bool,

    /// Top methods (ranked by value)
    pub entries: Vec<ReportEntry>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// One method's line in the report
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub identifier: String,

    /// Source-level signature (e.g., "com.acme.Cart.add(int)")
    pub signature: String,

    pub value: u64,

    /// Position within [min, max], absent when the range is degenerate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<f64>,
}

/// Build a report from finished results
///
/// **Public** - main entry point for report generation
///
/// # Arguments
/// * `results` - Result set of a completed pass
/// * `policy` - Policy the pass ran with
/// * `top_n` - Number of methods to include
pub fn build_report(results: &ResultSet, policy: SelectionPolicy, top_n: usize) -> AggregationReport {
    let entries = results
        .top(top_n)
        .into_iter()
        .map(|(id, value)| ReportEntry {
            identifier: id.to_string(),
            signature: id.display_signature(),
            value,
            normalized: results.normalized(id.as_str()).and_then(Result::ok),
        })
        .collect();

    AggregationReport {
        version: SCHEMA_VERSION.to_string(),
        metric: results.metric().to_string(),
        policy,
        method_count: results.len(),
        total: results.total(),
        min_value: results.min_value(),
        max_value: results.max_value(),
        has_variation: results.has_variation(),
        entries,
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Write a report as pretty JSON
///
/// # Errors
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_report<W: Write>(report: &AggregationReport, mut writer: W) -> Result<(), OutputError> {
    debug!("Writing report with {} entries", report.entries.len());
    serde_json::to_writer_pretty(&mut writer, report).map_err(OutputError::SerializationFailed)?;
    writeln!(writer).map_err(OutputError::WriteFailed)?;
    Ok(())
}

/// Generate text summary of hottest methods
///
/// **Public** - for terminal output
///
/// The percentage column divides by the result set total. Under the
/// inclusive policy one sample credits several frames, so that total is
/// the sum of per-frame credits and the column is labelled accordingly.
pub fn generate_text_summary(results: &ResultSet, policy: SelectionPolicy, max_lines: usize) -> String {
    let mut lines = Vec::new();
    let unit = results.metric().unit();
    let share_label = match policy {
        SelectionPolicy::Flat => "%",
        SelectionPolicy::Inclusive => "% CREDIT",
    };

    lines.push(format!("  {} ({})", results.metric(), unit));
    lines.push(format!("  {:<60} {:>14} {:>9}", "Method (Hottest First)", "VALUE", share_label));
    lines.push(format!("  {}", "-".repeat(85)));

    let total = results.total().max(1);

    for (id, value) in results.top(max_lines) {
        let signature = id.display_signature();
        let percentage = (value as f64 / total as f64) * 100.0;

        // Truncate signature if too long for display
        let display = if signature.chars().count() > 60 {
            let tail: String = signature
                .chars()
                .rev()
                .take(57)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{}", tail)
        } else {
            signature
        };

        lines.push(format!("  {:<60} {:>14} {:>8.1}%", display, value, percentage));
    }

    if results.is_empty() {
        lines.push("  (no samples attributed to in-scope methods)".to_string());
    } else if policy == SelectionPolicy::Inclusive {
        lines.push("  % CREDIT is a share of summed per-frame credits, not of samples.".to_string());
    }

    lines.join("\n")
}

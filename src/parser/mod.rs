//! Profiling event definitions and event sources.
//!
//! This module handles:
//! - The decoded event shapes the engine consumes
//! - The sequential `EventSource` contract
//! - Reading JSON-lines recordings from disk

pub mod event_source;
pub mod schema;

// Re-export main types
pub use event_source::{from_events, EventSource, IterSource, JsonLinesSource};
pub use schema::{StackFrame, StackSampleEvent};

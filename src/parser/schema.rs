//! Decoded profiling event definitions.
//!
//! These are the shapes the engine consumes. A recording decoder produces
//! them; the JSON-lines source in this crate reads them straight from disk.

use crate::utils::config::LAMBDA_PREFIX;
use serde::{Deserialize, Serialize};

/// One profiler sample of a thread's call stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSampleEvent {
    /// Event kind tag (e.g., "jdk.ExecutionSample")
    #[serde(alias = "eventType", alias = "type")]
    pub event_type: String,

    /// Frames, innermost first. `None` when the sample has no stack trace.
    #[serde(default, alias = "stackTrace", alias = "frames")]
    pub stack_trace: Option<Vec<StackFrame>>,

    /// Duration in nanoseconds, only present for duration-capable event kinds
    #[serde(default, alias = "duration", alias = "durationNanos")]
    pub duration_nanos: Option<u64>,
}

impl StackSampleEvent {
    /// Create a sample without a duration
    pub fn sample(event_type: impl Into<String>, frames: Vec<StackFrame>) -> Self {
        Self {
            event_type: event_type.into(),
            stack_trace: Some(frames),
            duration_nanos: None,
        }
    }

    pub fn with_duration(mut self, duration_nanos: u64) -> Self {
        self.duration_nanos = Some(duration_nanos);
        self
    }

    /// Frames of the stack trace, empty if the sample carries none
    pub fn frames(&self) -> &[StackFrame] {
        self.stack_trace.as_deref().unwrap_or(&[])
    }
}

/// One call-stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Declaring type, qualified (either `com.acme.Foo` or `com/acme/Foo`)
    #[serde(alias = "type", alias = "typeName", alias = "class")]
    pub type_name: String,

    /// Method simple name
    #[serde(alias = "method", alias = "methodName", alias = "name")]
    pub method_name: String,

    /// JVM method descriptor, e.g. `(Ljava/lang/String;I)V`
    #[serde(default)]
    pub descriptor: String,

    /// Compiler-generated frame (lambda bodies, bridges)
    #[serde(default)]
    pub synthetic: bool,

    /// Frame outside managed code
    #[serde(default)]
    pub native: bool,
}

impl StackFrame {
    pub fn new(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            descriptor: descriptor.into(),
            synthetic: false,
            native: false,
        }
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }

    /// Lambda bodies are skipped so the enclosing method gets the credit
    pub fn is_lambda(&self) -> bool {
        self.synthetic || self.method_name.starts_with(LAMBDA_PREFIX)
    }

    /// Managed, non-synthetic frame with a declaring type
    pub fn is_attributable(&self) -> bool {
        !self.native && !self.is_lambda() && !self.type_name.is_empty()
    }
}

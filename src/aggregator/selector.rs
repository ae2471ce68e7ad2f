//! Attribution frame selection.
//!
//! Decides which frames of a sample get credited:
//! - Flat: the innermost qualifying frame ("time spent at the leaf")
//! - Inclusive: every qualifying frame ("time spent anywhere below it")
//!
//! A frame qualifies when it is managed, not a lambda body, and its
//! declaring type is in scope.

use super::scope::ScopeCache;
use crate::parser::{StackFrame, StackSampleEvent};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which frames of a stack receive the sample's contribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Innermost qualifying frame only
    #[default]
    Flat,
    /// Every qualifying frame
    Inclusive,
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Flat => write!(f, "flat"),
            SelectionPolicy::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// Picks attribution frames using cached scope lookups
pub struct FrameSelector<'a> {
    policy: SelectionPolicy,
    scope: &'a ScopeCache,
}

impl<'a> FrameSelector<'a> {
    pub fn new(policy: SelectionPolicy, scope: &'a ScopeCache) -> Self {
        Self { policy, scope }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Frames credited for one event, innermost first
    ///
    /// **Public** - called once per event during reduction
    ///
    /// Empty when the event has no stack trace or nothing qualifies.
    pub fn select<'e>(&self, event: &'e StackSampleEvent) -> Vec<&'e StackFrame> {
        let mut qualifying = event.frames().iter().filter(|frame| self.qualifies(frame));

        match self.policy {
            SelectionPolicy::Flat => qualifying.next().into_iter().collect(),
            SelectionPolicy::Inclusive => qualifying.collect(),
        }
    }

    // Cheap checks first; the scope lookup may hit the oracle
    fn qualifies(&self, frame: &StackFrame) -> bool {
        frame.is_attributable() && self.scope.is_in_scope(&frame.type_name)
    }
}

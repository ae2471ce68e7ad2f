//! Canonical method identifiers used as aggregation keys.
//!
//! Format: `<qualified.Type>.<method><descriptor>`
//!
//! Example: `com.acme.Cart.add(Lcom/acme/Item;I)V`
//!
//! Type names use `.` separators regardless of how the decoder spelled
//! them. Method names are kept verbatim: a constructor is `<init>`, and a
//! `void` method that shares its type's simple name is a separate key.

use crate::parser::StackFrame;
use crate::utils::config::CONSTRUCTOR_SENTINEL;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Aggregation key for one method overload
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodIdentifier(String);

impl MethodIdentifier {
    /// Build the identifier for a frame's method
    ///
    /// **Public** - used by the metric accumulator
    pub fn from_frame(frame: &StackFrame) -> Self {
        Self::new(&frame.type_name, &frame.method_name, &frame.descriptor)
    }

    pub fn new(type_name: &str, method_name: &str, descriptor: &str) -> Self {
        let type_name = normalize_type_name(type_name);
        Self(format!("{}.{}{}", type_name, method_name, descriptor))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Declaring type of the method
    pub fn type_name(&self) -> &str {
        self.split().0
    }

    /// Method name (`<init>` for constructors)
    pub fn method_name(&self) -> &str {
        self.split().1
    }

    /// Raw JVM descriptor, empty if none was recorded
    pub fn descriptor(&self) -> &str {
        self.split().2
    }

    /// Render as a source-level signature
    ///
    /// **Public** - the presentation layer matches editor methods on this form
    ///
    /// `com.acme.Cart.add(Lcom/acme/Item;I)V` renders as
    /// `com.acme.Cart.add(com.acme.Item, int)`. Constructors render under the
    /// simple type name, nested types use `.`.
    pub fn display_signature(&self) -> String {
        let (type_name, method_name, descriptor) = self.split();
        let type_name = type_name.replace('$', ".");

        let method_name = if method_name == CONSTRUCTOR_SENTINEL {
            simple_name(&type_name)
        } else {
            method_name
        };

        let params = parameter_types(descriptor).join(", ");
        format!("{}.{}({})", type_name, method_name, params)
    }

    fn split(&self) -> (&str, &str, &str) {
        let (head, descriptor) = match self.0.find('(') {
            Some(idx) => self.0.split_at(idx),
            None => (self.0.as_str(), ""),
        };
        match head.rsplit_once('.') {
            Some((type_name, method_name)) => (type_name, method_name, descriptor),
            None => ("", head, descriptor),
        }
    }
}

impl fmt::Display for MethodIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MethodIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MethodIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `com/acme/Foo` -> `com.acme.Foo`
pub fn normalize_type_name(type_name: &str) -> String {
    type_name.replace('/', ".")
}

fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

/// Decode the parameter list of a JVM descriptor into source type names
///
/// Malformed input yields the parameters decoded up to the fault.
pub fn parameter_types(descriptor: &str) -> Vec<String> {
    let Some(params) = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map(|(params, _)| params)
    else {
        return Vec::new();
    };

    let mut types = Vec::new();
    let mut chars = params.chars();
    let mut dimensions = 0;

    while let Some(c) = chars.next() {
        let base = match c {
            '[' => {
                dimensions += 1;
                continue;
            }
            'B' => "byte".to_string(),
            'C' => "char".to_string(),
            'D' => "double".to_string(),
            'F' => "float".to_string(),
            'I' => "int".to_string(),
            'J' => "long".to_string(),
            'S' => "short".to_string(),
            'Z' => "boolean".to_string(),
            'L' => {
                let class: String = chars.by_ref().take_while(|&c| c != ';').collect();
                class.replace(['/', '$'], ".")
            }
            _ => break,
        };
        types.push(format!("{}{}", base, "[]".repeat(dimensions)));
        dimensions = 0;
    }

    types
}

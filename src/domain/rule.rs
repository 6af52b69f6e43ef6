//! Node rules: map a record to the label of the child node it belongs to.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::domain::error::DomainError;
use crate::domain::record::AttributeSource;
use crate::domain::value::Value;

/// One level of a classification chain.
///
/// `find_node` returns the label of the child a record routes to, or `None`
/// when the rule has no answer for it. Attribute read failures count as
/// "no answer".
pub trait NodeRule: fmt::Debug {
    /// Short description used in logs and error messages.
    fn describe(&self) -> String;

    fn find_node(&self, record: &dyn AttributeSource) -> Option<Value>;

    /// A dynamic rule synthesizes a label when nothing predefined matches.
    fn is_dynamic(&self) -> bool;

    fn is_static(&self) -> bool {
        !self.is_dynamic()
    }
}

// ============================================================
// Equality
// ============================================================

/// Composite-key lookup.
///
/// The key is the record's values for `attributes`, concatenated in order
/// without a separator. Static instances look the key up in `references`;
/// grouping instances use the key itself as the label when it is not found.
#[derive(Debug, Clone)]
pub struct EqualityRule {
    attributes: Vec<String>,
    references: HashMap<String, String>,
    dynamic: bool,
}

impl EqualityRule {
    pub fn new(attributes: Vec<String>, references: HashMap<String, String>) -> Self {
        Self {
            attributes,
            references,
            dynamic: false,
        }
    }

    /// Group records by the composite key itself.
    pub fn grouping(attributes: Vec<String>) -> Self {
        Self {
            attributes,
            references: HashMap::new(),
            dynamic: true,
        }
    }

    pub fn with_reference(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.references.insert(key.into(), label.into());
        self
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.attributes.is_empty() {
            return Err(self.invalid("no attributes"));
        }
        if self.attributes.iter().any(|a| a.is_empty()) {
            return Err(self.invalid("empty attribute name"));
        }
        if let Some((key, _)) = self.references.iter().find(|(_, label)| label.is_empty()) {
            return Err(self.invalid(&format!("empty label for key '{}'", key)));
        }
        Ok(())
    }

    /// Concatenated attribute values, `None` if any attribute is unreadable.
    pub fn composite_key(&self, record: &dyn AttributeSource) -> Option<String> {
        let mut key = String::new();
        for attribute in &self.attributes {
            match record.read(attribute).map(|v| v.as_label()) {
                Ok(Some(part)) => key.push_str(&part),
                Ok(None) => {
                    trace!("{}: attribute {} has no label form", self.describe(), attribute);
                    return None;
                }
                Err(e) => {
                    trace!("{}: {}", self.describe(), e);
                    return None;
                }
            }
        }
        Some(key)
    }

    fn invalid(&self, message: &str) -> DomainError {
        DomainError::InvalidRule {
            rule: self.describe(),
            message: message.to_string(),
        }
    }
}

impl NodeRule for EqualityRule {
    fn describe(&self) -> String {
        format!("equality({})", self.attributes.join(","))
    }

    fn find_node(&self, record: &dyn AttributeSource) -> Option<Value> {
        let key = self.composite_key(record)?;
        match self.references.get(&key) {
            Some(label) => Some(Value::String(label.clone())),
            None if self.dynamic => Some(Value::String(key)),
            None => None,
        }
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

// ============================================================
// Discrete range
// ============================================================

/// Set membership over ordered groups; the first group containing the value wins.
#[derive(Debug, Clone)]
pub struct DiscreteRangeRule {
    attribute: String,
    groups: Vec<(HashSet<Value>, String)>,
}

impl DiscreteRangeRule {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_group<I, V>(mut self, values: I, label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_group(values.into_iter().map(Into::into).collect(), label);
        self
    }

    pub fn add_group(&mut self, values: HashSet<Value>, label: impl Into<String>) {
        self.groups.push((values, label.into()));
    }

    /// Label of the first group containing `value`.
    pub fn evaluate(&self, value: &Value) -> Option<&str> {
        self.groups
            .iter()
            .find(|(values, _)| values.contains(value))
            .map(|(_, label)| label.as_str())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |message: &str| DomainError::InvalidRule {
            rule: self.describe(),
            message: message.to_string(),
        };
        if self.attribute.is_empty() {
            return Err(invalid("empty attribute name"));
        }
        if self.groups.iter().any(|(_, label)| label.is_empty()) {
            return Err(invalid("empty group label"));
        }
        Ok(())
    }
}

impl NodeRule for DiscreteRangeRule {
    fn describe(&self) -> String {
        format!("discrete({})", self.attribute)
    }

    fn find_node(&self, record: &dyn AttributeSource) -> Option<Value> {
        let value = record
            .read(&self.attribute)
            .map_err(|e| trace!("{}: {}", self.describe(), e))
            .ok()?;
        self.evaluate(&value).map(Value::from)
    }

    fn is_dynamic(&self) -> bool {
        false
    }
}

// ============================================================
// Date/time range
// ============================================================

/// Half-open time window `[start, end)` with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl TimeWindow {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// Routes by which time window an instant attribute falls into.
#[derive(Debug, Clone)]
pub struct DateTimeRangeRule {
    attribute: String,
    windows: Vec<TimeWindow>,
}

impl DateTimeRangeRule {
    pub fn new(
        attribute: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            windows: Vec::new(),
        }
        .with_window(start, end, label)
    }

    pub fn with_window(
        mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: impl Into<String>,
    ) -> Self {
        self.windows.push(TimeWindow {
            start,
            end,
            label: label.into(),
        });
        self
    }

    pub fn from_windows(attribute: impl Into<String>, windows: Vec<TimeWindow>) -> Self {
        Self {
            attribute: attribute.into(),
            windows,
        }
    }

    pub fn evaluate(&self, instant: &DateTime<Utc>) -> Option<&str> {
        self.windows
            .iter()
            .find(|w| w.contains(instant))
            .map(|w| w.label.as_str())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |message: String| DomainError::InvalidRule {
            rule: self.describe(),
            message,
        };
        if self.attribute.is_empty() {
            return Err(invalid("empty attribute name".to_string()));
        }
        for w in &self.windows {
            if w.start >= w.end {
                return Err(invalid(format!(
                    "window '{}' starts at or after its end",
                    w.label
                )));
            }
            if w.label.is_empty() {
                return Err(invalid("empty window label".to_string()));
            }
        }
        Ok(())
    }
}

impl NodeRule for DateTimeRangeRule {
    fn describe(&self) -> String {
        format!("datetime({})", self.attribute)
    }

    fn find_node(&self, record: &dyn AttributeSource) -> Option<Value> {
        let value = record
            .read(&self.attribute)
            .map_err(|e| trace!("{}: {}", self.describe(), e))
            .ok()?;
        let instant = value.as_datetime()?;
        self.evaluate(&instant).map(Value::from)
    }

    fn is_dynamic(&self) -> bool {
        false
    }
}

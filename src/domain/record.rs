//! Data records and the attribute-access boundary used by rules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value::Value;

/// Read a named attribute from an arbitrary record.
///
/// Rules only see records through this trait, so any record type can be
/// classified without the rule knowing its concrete shape.
pub trait AttributeSource {
    fn read(&self, attribute: &str) -> Result<Value, DomainError>;
}

/// A flat data record: attribute name to value, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl AttributeSource for Record {
    fn read(&self, attribute: &str) -> Result<Value, DomainError> {
        self.fields.read(attribute)
    }
}

impl AttributeSource for BTreeMap<String, Value> {
    fn read(&self, attribute: &str) -> Result<Value, DomainError> {
        self.get(attribute)
            .cloned()
            .ok_or_else(|| DomainError::AttributeNotFound(attribute.to_string()))
    }
}

impl AttributeSource for HashMap<String, Value> {
    fn read(&self, attribute: &str) -> Result<Value, DomainError> {
        self.get(attribute)
            .cloned()
            .ok_or_else(|| DomainError::AttributeNotFound(attribute.to_string()))
    }
}

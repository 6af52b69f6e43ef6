//! Rule-set files: TOML declarations turned into rule chains.
//!
//! ```toml
//! root = "customers"
//!
//! [[rules]]
//! kind = "group"
//! attributes = ["region"]
//!
//! [[rules]]
//! kind = "discrete"
//! attribute = "tier"
//! groups = [
//!     { values = [1, 2], label = "low" },
//!     { values = [3, 4], label = "high" },
//! ]
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{
    DateTimeRangeRule, DiscreteRangeRule, DomainError, EqualityRule, NodeRule, TimeWindow, Value,
};

/// A parsed rule-set file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleSetSpec {
    /// Root node name, overrides the configured default
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// Declaration of a single rule, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Composite-key lookup in a reference table
    Equality {
        attributes: Vec<String>,
        #[serde(default)]
        references: HashMap<String, String>,
    },
    /// Composite key used directly as the label
    Group { attributes: Vec<String> },
    Discrete {
        attribute: String,
        groups: Vec<GroupSpec>,
    },
    #[serde(rename = "datetime")]
    DateTime {
        attribute: String,
        windows: Vec<WindowSpec>,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GroupSpec {
    pub values: Vec<Value>,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WindowSpec {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl RuleSpec {
    /// Build and validate the rule object.
    pub fn into_rule(self) -> Result<Box<dyn NodeRule>, DomainError> {
        match self {
            RuleSpec::Equality {
                attributes,
                references,
            } => {
                let rule = EqualityRule::new(attributes, references);
                rule.validate()?;
                Ok(Box::new(rule))
            }
            RuleSpec::Group { attributes } => {
                let rule = EqualityRule::grouping(attributes);
                rule.validate()?;
                Ok(Box::new(rule))
            }
            RuleSpec::Discrete { attribute, groups } => {
                let mut rule = DiscreteRangeRule::new(attribute);
                for group in groups {
                    rule.add_group(group.values.into_iter().collect(), group.label);
                }
                rule.validate()?;
                Ok(Box::new(rule))
            }
            RuleSpec::DateTime { attribute, windows } => {
                let windows = windows
                    .into_iter()
                    .map(|w| TimeWindow {
                        start: w.start,
                        end: w.end,
                        label: w.label,
                    })
                    .collect();
                let rule = DateTimeRangeRule::from_windows(attribute, windows);
                rule.validate()?;
                Ok(Box::new(rule))
            }
        }
    }
}

impl RuleSetSpec {
    /// Convert every declaration, in file order.
    pub fn into_rules(self) -> Result<Vec<Box<dyn NodeRule>>, DomainError> {
        self.rules.into_iter().map(RuleSpec::into_rule).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_all_kinds_when_parsed_then_builds_rules_in_order() {
        let content = r#"
root = "all"

[[rules]]
kind = "equality"
attributes = ["region", "country"]
references = { EUDE = "germany" }

[[rules]]
kind = "group"
attributes = ["city"]

[[rules]]
kind = "discrete"
attribute = "tier"
groups = [{ values = [1, 2], label = "low" }]

[[rules]]
kind = "datetime"
attribute = "created"
windows = [{ start = "2024-01-01T00:00:00Z", end = "2024-04-01T00:00:00Z", label = "q1" }]
"#;
        let spec: RuleSetSpec = toml::from_str(content).unwrap();
        assert_eq!(spec.root.as_deref(), Some("all"));

        let rules = spec.into_rules().unwrap();
        let described: Vec<String> = rules.iter().map(|r| r.describe()).collect();
        assert_eq!(
            described,
            vec![
                "equality(region,country)",
                "equality(city)",
                "discrete(tier)",
                "datetime(created)"
            ]
        );
        assert!(rules[0].is_static());
        assert!(rules[1].is_dynamic());
    }

    #[test]
    fn given_group_without_attributes_when_converted_then_invalid_rule() {
        let spec = RuleSpec::Group { attributes: vec![] };
        assert!(matches!(
            spec.into_rule(),
            Err(DomainError::InvalidRule { .. })
        ));
    }
}

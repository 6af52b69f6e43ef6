//! Classification service
//!
//! Loads rule sets and record files, then builds the classification tree.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::error_ext::{IoResultExt, ParseResultExt};
use crate::application::ruleset::RuleSetSpec;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ClassTree, NodeRule, Record, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// A loaded rule chain with its optional root name.
#[derive(Debug)]
pub struct RuleSet {
    pub root: Option<String>,
    pub rules: Vec<Box<dyn NodeRule>>,
}

/// Output from classifying a record file.
#[derive(Debug)]
pub struct Classification {
    pub tree: ClassTree<Record>,
    /// Input positions of records that could not be routed
    pub skipped: Vec<usize>,
}

/// `[[records]]` tables in a TOML record file.
#[derive(Debug, Deserialize)]
struct TomlRecords {
    #[serde(default)]
    records: Vec<Record>,
}

/// Service for classifying record files with rule sets.
pub struct ClassificationService {
    fs: Arc<dyn FileSystem>,
}

impl ClassificationService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a TOML rule-set file into a rule chain.
    #[instrument(level = "debug", skip(self))]
    pub fn load_rules(&self, path: &Path) -> ApplicationResult<RuleSet> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read rule set", path)?;
        let spec: RuleSetSpec = toml::from_str(&content).with_parse_context("rule set", path)?;
        let root = spec.root.clone();
        let rules = spec.into_rules()?;
        debug!("load_rules: {} rules from {}", rules.len(), path.display());
        Ok(RuleSet { root, rules })
    }

    /// Load records from a `.json` array of objects or `.toml` `[[records]]` tables.
    #[instrument(level = "debug", skip(self))]
    pub fn load_records(&self, path: &Path) -> ApplicationResult<Vec<Record>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let records = match extension.as_deref() {
            Some("json") => {
                let content = self
                    .fs
                    .read_to_string(path)
                    .with_path_context("read records", path)?;
                serde_json::from_str::<Vec<Record>>(&content)
                    .with_parse_context("records", path)?
            }
            Some("toml") => {
                let content = self
                    .fs
                    .read_to_string(path)
                    .with_path_context("read records", path)?;
                toml::from_str::<TomlRecords>(&content)
                    .with_parse_context("records", path)?
                    .records
            }
            _ => return Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        };

        debug!("load_records: {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Build the classification tree for a record file.
    ///
    /// The rule set's `root` wins over `default_root`. Returns `Ok(None)` when
    /// the rule set or the record file is empty.
    #[instrument(level = "debug", skip(self))]
    pub fn classify(
        &self,
        rules_path: &Path,
        records_path: &Path,
        default_root: &str,
    ) -> ApplicationResult<Option<Classification>> {
        let rule_set = self.load_rules(rules_path)?;
        let records = self.load_records(records_path)?;

        let root = rule_set.root.as_deref().unwrap_or(default_root);
        let mut builder = TreeBuilder::with_root_name(root);
        let tree = builder.build_and_populate(&rule_set.rules, records)?;

        Ok(tree.map(|tree| Classification {
            tree,
            skipped: builder.skipped().to_vec(),
        }))
    }
}

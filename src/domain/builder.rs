//! Tree builder: routes records through a rule chain into a classification tree.

use generational_arena::Index;
use tracing::{debug, info, instrument, warn};

use crate::domain::arena::ClassTree;
use crate::domain::error::DomainError;
use crate::domain::record::AttributeSource;
use crate::domain::rule::NodeRule;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Builds and populates classification trees.
///
/// Keeps the positions of records that no rule chain could route from the
/// most recent build.
pub struct TreeBuilder {
    root_name: String,
    skipped: Vec<usize>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_root_name("root")
    }

    pub fn with_root_name(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            skipped: Vec::new(),
        }
    }

    /// Positions (in input order) of records left out of the last build.
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    /// Build a tree with one level per rule and deposit every record at its leaf.
    ///
    /// Returns `Ok(None)` when `rules` or `records` is empty. A rule without an
    /// answer for a record leaves that record out; a rule answering with a
    /// value that has no label form aborts the build.
    #[instrument(level = "debug", skip_all, fields(rules = rules.len(), records = records.len()))]
    pub fn build_and_populate<T: AttributeSource>(
        &mut self,
        rules: &[Box<dyn NodeRule>],
        records: Vec<T>,
    ) -> TreeResult<Option<ClassTree<T>>> {
        self.skipped.clear();
        if rules.is_empty() || records.is_empty() {
            debug!("nothing to build: empty rules or records");
            return Ok(None);
        }

        let mut tree = ClassTree::new(self.root_name.clone());
        let root = tree.root();
        for (position, record) in records.into_iter().enumerate() {
            match Self::route(rules, &record)? {
                Some(labels) => {
                    let leaf = Self::descend(&mut tree, root, &labels)?;
                    tree.add_data(leaf, record);
                }
                None => {
                    warn!("record {} not routed, skipping", position);
                    self.skipped.push(position);
                }
            }
        }

        info!(
            "built tree: {} nodes, depth {}, {} skipped",
            tree.len(),
            tree.depth(),
            self.skipped.len()
        );
        Ok(Some(tree))
    }

    /// Evaluate every rule for one record.
    ///
    /// `Ok(None)` if some rule has no answer, so no nodes get created for a
    /// record that ends up unrouted.
    fn route<T: AttributeSource>(
        rules: &[Box<dyn NodeRule>],
        record: &T,
    ) -> TreeResult<Option<Vec<String>>> {
        let mut labels = Vec::with_capacity(rules.len());
        for rule in rules {
            let Some(value) = rule.find_node(record) else {
                debug!("{}: no match", rule.describe());
                return Ok(None);
            };
            let label = value
                .as_label()
                .ok_or_else(|| DomainError::UnlabelableValue {
                    rule: rule.describe(),
                    value: value.to_string(),
                })?;
            labels.push(label);
        }
        Ok(Some(labels))
    }

    /// Walk down from `start` along `labels`, creating missing children.
    fn descend<T>(tree: &mut ClassTree<T>, start: Index, labels: &[String]) -> TreeResult<Index> {
        let mut current = start;
        for label in labels {
            current = match tree.child_named(current, label) {
                Some(child) => child,
                None => {
                    let child = tree.create_node(Some(label.clone()));
                    if let Some(node) = tree.get_node_mut(child) {
                        node.set_id(label.clone());
                    }
                    if !tree.add_child(current, child) {
                        return Err(DomainError::DetachedNode {
                            label: label.clone(),
                        });
                    }
                    child
                }
            };
        }
        Ok(current)
    }
}

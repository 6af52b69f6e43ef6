//! Conversion of classification trees into printable `termtree` trees.

use std::fmt;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::ClassTree;

/// What to show next to each node name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append the number of records held by the node's subtree
    pub record_count: bool,
    /// List the node's own records beneath it
    pub show_data: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            record_count: true,
            show_data: false,
        }
    }
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String> {
        self.to_tree_string_with(RenderOptions::default())
    }

    fn to_tree_string_with(&self, options: RenderOptions) -> Tree<String>;
}

impl<T: fmt::Display> TreeNodeConvert for ClassTree<T> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string_with(&self, options: RenderOptions) -> Tree<String> {
        let counts = if options.record_count {
            Some(self.subtree_data_counts())
        } else {
            None
        };

        fn build_tree<T: fmt::Display>(
            tree: &ClassTree<T>,
            node_idx: Index,
            counts: Option<&std::collections::HashMap<Index, usize>>,
            options: RenderOptions,
        ) -> Tree<String> {
            let Some(node) = tree.get_node(node_idx) else {
                return Tree::new(String::new());
            };
            let text = match counts.and_then(|c| c.get(&node_idx)) {
                Some(n) => format!("{} ({})", node.label(), n),
                None => node.label().to_string(),
            };
            let mut result = Tree::new(text);
            if options.show_data {
                for item in node.data() {
                    result.push(Tree::new(format!("- {}", item)));
                }
            }
            for &child in node.children() {
                result.push(build_tree(tree, child, counts, options));
            }
            result
        }

        build_tree(self, self.root(), counts.as_ref(), options)
    }
}

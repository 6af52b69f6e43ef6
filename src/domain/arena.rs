//! Arena-backed classification tree.
//!
//! Nodes live in a generational arena and refer to each other by [`Index`]:
//! a node owns the ordered list of its children and keeps a non-owning
//! parent index. Attribute lookup falls back along the parent chain.

use std::collections::{BTreeMap, HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, warn};

use crate::domain::value::Value;

/// Upper bound on parent hops when walking towards the root.
pub const MAX_ANCESTOR_HOPS: usize = 1000;

/// A vertex of the classification tree.
#[derive(Debug)]
pub struct Node<T> {
    name: Option<String>,
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
    data: Vec<T>,
    parent: Option<Index>,
    children: Vec<Index>,
    /// First child registered under each name
    children_by_name: HashMap<String, Index>,
}

impl<T> Node<T> {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            id: None,
            attributes: BTreeMap::new(),
            data: Vec::new(),
            parent: None,
            children: Vec::new(),
            children_by_name: HashMap::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Name if set, else id, else empty.
    pub fn label(&self) -> &str {
        self.name().or_else(|| self.id()).unwrap_or_default()
    }

    /// Attributes stored on this node only (no inheritance).
    pub fn local_attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based tree with a fixed root node.
///
/// Nodes created with [`ClassTree::create_node`] start detached and become
/// part of the hierarchy through [`ClassTree::add_child`]. Detaching is not
/// supported.
#[derive(Debug)]
pub struct ClassTree<T> {
    arena: Arena<Node<T>>,
    root: Index,
}

impl<T> ClassTree<T> {
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(Node::new(Some(root_name.into())));
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&Node<T>> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut Node<T>> {
        self.arena.get_mut(idx)
    }

    /// Create a detached node, named or unnamed.
    #[instrument(level = "trace", skip(self))]
    pub fn create_node(&mut self, name: Option<String>) -> Index {
        self.arena.insert(Node::new(name))
    }

    /// Attach `child` under `parent`.
    ///
    /// Returns `false` and leaves the tree unchanged when `child` is on the
    /// root path of `parent` (itself included), when it already has a parent
    /// or is the root, or when either index is stale.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: Index, child: Index) -> bool {
        if !self.arena.contains(parent) || !self.arena.contains(child) {
            warn!("add_child: stale index (parent={:?}, child={:?})", parent, child);
            return false;
        }
        if child == self.root {
            debug!("add_child: root cannot become a child");
            return false;
        }
        if self.is_on_root_path(child, parent) {
            debug!("add_child: {:?} is an ancestor of {:?}, rejected", child, parent);
            return false;
        }

        let name = match self.arena.get_mut(child) {
            Some(node) if node.parent.is_none() => {
                node.parent = Some(parent);
                node.name.clone()
            }
            _ => {
                debug!("add_child: {:?} already has a parent", child);
                return false;
            }
        };

        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.push(child);
            if let Some(name) = name {
                parent_node.children_by_name.entry(name).or_insert(child);
            }
        }
        true
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    ///
    /// Follows the complete parent chain without a hop cap. The chain is
    /// acyclic as long as every attachment goes through `add_child`.
    fn is_on_root_path(&self, ancestor: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// Create a named node and attach it under `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_child(&mut self, parent: Index, name: &str) -> Option<Index> {
        let child = self.create_node(Some(name.to_string()));
        if self.add_child(parent, child) {
            Some(child)
        } else {
            self.arena.remove(child);
            None
        }
    }

    pub fn child_at(&self, node: Index, position: usize) -> Option<Index> {
        self.arena.get(node)?.children.get(position).copied()
    }

    pub fn child_named(&self, node: Index, name: &str) -> Option<Index> {
        self.arena.get(node)?.children_by_name.get(name).copied()
    }

    /// Look up `key` on `node`, then on its ancestors.
    ///
    /// At most [`MAX_ANCESTOR_HOPS`] parent hops are taken.
    #[instrument(level = "trace", skip(self))]
    pub fn get_attribute(&self, node: Index, key: &str) -> Option<&Value> {
        let mut current = Some(node);
        let mut hops = 0;
        while let Some(idx) = current {
            if hops > MAX_ANCESTOR_HOPS {
                warn!("get_attribute: ancestor walk exceeded {} hops", MAX_ANCESTOR_HOPS);
                return None;
            }
            let n = self.arena.get(idx)?;
            if let Some(value) = n.attributes.get(key) {
                return Some(value);
            }
            current = n.parent;
            hops += 1;
        }
        None
    }

    /// Store an attribute locally, shadowing inherited values.
    ///
    /// Empty keys and `Null` values are ignored.
    #[instrument(level = "trace", skip(self))]
    pub fn set_attribute(&mut self, node: Index, key: &str, value: Value) -> bool {
        if key.is_empty() || value.is_null() {
            return false;
        }
        match self.arena.get_mut(node) {
            Some(n) => {
                n.attributes.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    #[instrument(level = "trace", skip(self, item))]
    pub fn add_data(&mut self, node: Index, item: T) -> bool {
        match self.arena.get_mut(node) {
            Some(n) => {
                n.data.push(item);
                true
            }
            None => false,
        }
    }

    /// Nodes from the top of the hierarchy down to `node`, inclusive.
    ///
    /// The walk stops on a repeated node or after [`MAX_ANCESTOR_HOPS`]
    /// parent hops, so the list holds at most `MAX_ANCESTOR_HOPS + 1` nodes
    /// and does not start at the root when truncated.
    #[instrument(level = "trace", skip(self))]
    pub fn hierarchical_list(&self, node: Index) -> Vec<Index> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(node);

        while let Some(idx) = current {
            if path.len() > MAX_ANCESTOR_HOPS {
                warn!("hierarchical_list: exceeded {} hops", MAX_ANCESTOR_HOPS);
                break;
            }
            if !seen.insert(idx) {
                warn!("hierarchical_list: cycle at {:?}", idx);
                break;
            }
            let Some(n) = self.arena.get(idx) else {
                break;
            };
            path.push(idx);
            current = n.parent;
        }

        path.reverse();
        path
    }

    /// Position among the parent's children, 0 without a parent.
    pub fn horizontal_index(&self, node: Index) -> usize {
        self.arena
            .get(node)
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.get(p))
            .and_then(|p| p.children.iter().position(|&c| c == node))
            .unwrap_or(0)
    }

    /// Distance from the root, root = 0. Capped at [`MAX_ANCESTOR_HOPS`].
    pub fn vertical_index(&self, node: Index) -> usize {
        self.hierarchical_list(node).len().saturating_sub(1)
    }

    /// Labels along the root path of `node`.
    pub fn path_names(&self, node: Index) -> Vec<String> {
        self.hierarchical_list(node)
            .into_iter()
            .filter_map(|idx| self.arena.get(idx))
            .map(|n| n.label().to_string())
            .collect()
    }

    /// Pre-order iterator over the whole tree.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order iterator over the subtree rooted at `start`.
    pub fn iter_from(&self, start: Index) -> TreeIterator<'_, T> {
        TreeIterator::new(self, start)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Number of levels, 1 for a lone root.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// All descendants of `node` in pre-order, `node` itself excluded.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten_list(&self, node: Index) -> Vec<Index> {
        self.iter_from(node).skip(1).map(|(idx, _)| idx).collect()
    }

    /// Childless nodes below `node`, depth-first.
    ///
    /// A childless `node` is its own single leaf.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self, node: Index) -> Vec<Index> {
        let mut leaves = Vec::new();
        self.collect_leaves(node, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, node_idx: Index, leaves: &mut Vec<Index>) {
        if let Some(node) = self.get_node(node_idx) {
            if node.children.is_empty() {
                leaves.push(node_idx);
            } else {
                for &child in &node.children {
                    self.collect_leaves(child, leaves);
                }
            }
        }
    }

    /// Records held by each node's subtree, computed bottom-up.
    #[instrument(level = "debug", skip(self))]
    pub fn subtree_data_counts(&self) -> HashMap<Index, usize> {
        let mut counts: HashMap<Index, usize> = HashMap::new();
        for (idx, node) in self.iter_postorder() {
            let below: usize = node
                .children
                .iter()
                .map(|c| counts.get(c).copied().unwrap_or(0))
                .sum();
            counts.insert(idx, node.data.len() + below);
        }
        counts
    }
}

pub struct TreeIterator<'a, T> {
    tree: &'a ClassTree<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(tree: &'a ClassTree<T>, start: Index) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    tree: &'a ClassTree<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(tree: &'a ClassTree<T>) -> Self {
        Self {
            tree,
            stack: vec![(tree.root(), false)],
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

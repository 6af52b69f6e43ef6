//! Tests for ClassTree hierarchy operations

use generational_arena::Index;
use rstest::{fixture, rstest};

use classtree::domain::{ClassTree, Value, MAX_ANCESTOR_HOPS};

/// root
/// ├── A
/// │   └── C
/// └── B
struct Sample {
    tree: ClassTree<String>,
    a: Index,
    b: Index,
    c: Index,
}

#[fixture]
fn sample() -> Sample {
    let mut tree = ClassTree::new("root");
    let root = tree.root();
    let a = tree.insert_child(root, "A").unwrap();
    let b = tree.insert_child(root, "B").unwrap();
    let c = tree.insert_child(a, "C").unwrap();
    Sample { tree, a, b, c }
}

// ============================================================
// add_child
// ============================================================

#[rstest]
fn given_detached_node_when_adding_child_then_parent_is_set(mut sample: Sample) {
    let d = sample.tree.create_node(Some("D".to_string()));

    assert!(sample.tree.add_child(sample.b, d));

    assert_eq!(sample.tree.get_node(d).unwrap().parent(), Some(sample.b));
    assert_eq!(sample.tree.child_named(sample.b, "D"), Some(d));
}

#[rstest]
fn given_node_when_adding_itself_then_rejected(mut sample: Sample) {
    assert!(!sample.tree.add_child(sample.a, sample.a));
    assert!(sample.tree.get_node(sample.a).unwrap().children().len() == 1);
}

#[rstest]
fn given_ancestor_when_adding_under_descendant_then_rejected_and_unchanged(mut sample: Sample) {
    let root = sample.tree.root();
    let before = sample.tree.flatten_list(root);

    assert!(!sample.tree.add_child(sample.c, sample.a));
    assert!(!sample.tree.add_child(sample.c, root));

    assert_eq!(sample.tree.flatten_list(root), before);
    assert_eq!(sample.tree.get_node(sample.a).unwrap().parent(), Some(root));
    assert!(sample.tree.get_node(sample.c).unwrap().is_leaf());
}

#[test]
fn given_detached_chain_when_closing_a_cycle_then_rejected() {
    let mut tree: ClassTree<()> = ClassTree::new("root");
    let d = tree.create_node(Some("D".to_string()));
    let e = tree.create_node(Some("E".to_string()));

    assert!(tree.add_child(d, e));
    assert!(!tree.add_child(e, d));
    assert_eq!(tree.hierarchical_list(e), vec![d, e]);
}

#[rstest]
fn given_attached_node_when_adding_elsewhere_then_rejected(mut sample: Sample) {
    assert!(!sample.tree.add_child(sample.b, sample.c));
    assert_eq!(sample.tree.get_node(sample.c).unwrap().parent(), Some(sample.a));
}

/// Detached chain n0 -> n1 -> ... -> n{len-1}, returned top first.
fn detached_chain(tree: &mut ClassTree<()>, len: usize) -> Vec<Index> {
    let mut nodes = vec![tree.create_node(Some("n0".to_string()))];
    for i in 1..len {
        let node = tree.create_node(Some(format!("n{i}")));
        assert!(tree.add_child(nodes[i - 1], node));
        nodes.push(node);
    }
    nodes
}

#[rstest]
#[case(MAX_ANCESTOR_HOPS)]
#[case(MAX_ANCESTOR_HOPS + 1)]
#[case(MAX_ANCESTOR_HOPS + 5)]
fn given_chain_deeper_than_hop_cap_when_closing_cycle_then_rejected(#[case] len: usize) {
    let mut tree: ClassTree<()> = ClassTree::new("root");
    let nodes = detached_chain(&mut tree, len);
    let (top, bottom) = (nodes[0], nodes[len - 1]);

    assert!(!tree.add_child(bottom, top));

    assert_eq!(tree.get_node(top).unwrap().parent(), None);
    assert!(tree.get_node(bottom).unwrap().is_leaf());
}

// ============================================================
// Positions and paths
// ============================================================

#[rstest]
fn given_any_node_when_hierarchical_list_then_root_first_and_self_last(sample: Sample) {
    let root = sample.tree.root();
    for node in [root, sample.a, sample.b, sample.c] {
        let path = sample.tree.hierarchical_list(node);
        assert_eq!(path.first(), Some(&root));
        assert_eq!(path.last(), Some(&node));
        assert_eq!(path.len(), sample.tree.vertical_index(node) + 1);
    }
}

#[rstest]
fn given_sample_when_indices_then_depth_and_position_match(sample: Sample) {
    let root = sample.tree.root();
    assert_eq!(sample.tree.vertical_index(root), 0);
    assert_eq!(sample.tree.horizontal_index(root), 0);
    assert_eq!(sample.tree.vertical_index(sample.c), 2);
    assert_eq!(sample.tree.horizontal_index(sample.a), 0);
    assert_eq!(sample.tree.horizontal_index(sample.b), 1);
    assert_eq!(sample.tree.path_names(sample.c), vec!["root", "A", "C"]);
}

/// root -> d1 -> ... -> d{depth}, returned root first.
fn rooted_chain(depth: usize) -> (ClassTree<()>, Vec<Index>) {
    let mut tree = ClassTree::new("root");
    let mut nodes = vec![tree.root()];
    for i in 1..=depth {
        let node = tree.insert_child(nodes[i - 1], &format!("d{i}")).unwrap();
        nodes.push(node);
    }
    (tree, nodes)
}

#[rstest]
#[case(MAX_ANCESTOR_HOPS - 1)]
#[case(MAX_ANCESTOR_HOPS)]
fn given_chain_within_hop_cap_when_walking_up_then_reaches_root(#[case] depth: usize) {
    let (mut tree, nodes) = rooted_chain(depth);
    let root = tree.root();
    let deepest = nodes[depth];
    tree.set_attribute(root, "origin", Value::from("top"));

    let path = tree.hierarchical_list(deepest);

    assert_eq!(path, nodes);
    assert_eq!(tree.vertical_index(deepest), depth);
    assert_eq!(
        tree.get_attribute(deepest, "origin"),
        Some(&Value::from("top"))
    );
}

#[test]
fn given_chain_beyond_hop_cap_when_walking_up_then_truncated_below_root() {
    let depth = MAX_ANCESTOR_HOPS + 1;
    let (mut tree, nodes) = rooted_chain(depth);
    let root = tree.root();
    let deepest = nodes[depth];
    tree.set_attribute(root, "origin", Value::from("top"));
    tree.set_attribute(nodes[1], "level", Value::from(1));

    let path = tree.hierarchical_list(deepest);

    assert_eq!(path.len(), MAX_ANCESTOR_HOPS + 1);
    assert_eq!(path.first(), Some(&nodes[1]));
    assert_eq!(path.last(), Some(&deepest));
    assert_eq!(tree.vertical_index(deepest), MAX_ANCESTOR_HOPS);
    assert_eq!(tree.get_attribute(deepest, "origin"), None);
    assert_eq!(tree.get_attribute(deepest, "level"), Some(&Value::from(1)));
}

// ============================================================
// Traversal
// ============================================================

#[rstest]
fn given_sample_when_flatten_list_then_pre_order_without_start(sample: Sample) {
    let root = sample.tree.root();
    assert_eq!(
        sample.tree.flatten_list(root),
        vec![sample.a, sample.c, sample.b]
    );
    assert_eq!(sample.tree.flatten_list(sample.a), vec![sample.c]);
}

#[rstest]
fn given_sample_when_leaf_nodes_then_depth_first_leaves(sample: Sample) {
    let root = sample.tree.root();
    assert_eq!(sample.tree.leaf_nodes(root), vec![sample.c, sample.b]);
    assert_eq!(sample.tree.depth(), 3);
}

#[rstest]
fn given_sample_when_postorder_then_children_before_parents(sample: Sample) {
    let order: Vec<Index> = sample.tree.iter_postorder().map(|(idx, _)| idx).collect();
    assert_eq!(
        order,
        vec![sample.c, sample.a, sample.b, sample.tree.root()]
    );
}

// ============================================================
// Attributes and data
// ============================================================

#[rstest]
fn given_attribute_on_root_when_looked_up_from_leaf_then_inherited(mut sample: Sample) {
    let root = sample.tree.root();
    assert!(sample.tree.set_attribute(root, "region", Value::from("EU")));

    assert_eq!(
        sample.tree.get_attribute(sample.c, "region"),
        Some(&Value::from("EU"))
    );
    assert_eq!(sample.tree.get_attribute(sample.c, "missing"), None);
}

#[rstest]
fn given_local_attribute_when_looked_up_then_shadows_inherited(mut sample: Sample) {
    let root = sample.tree.root();
    sample.tree.set_attribute(root, "tier", Value::from(1));
    sample.tree.set_attribute(sample.a, "tier", Value::from(2));

    assert_eq!(sample.tree.get_attribute(sample.c, "tier"), Some(&Value::from(2)));
    assert_eq!(sample.tree.get_attribute(sample.b, "tier"), Some(&Value::from(1)));
}

#[rstest]
#[case("", Value::from("x"))]
#[case("key", Value::Null)]
fn given_empty_key_or_null_when_set_attribute_then_ignored(
    mut sample: Sample,
    #[case] key: &str,
    #[case] value: Value,
) {
    assert!(!sample.tree.set_attribute(sample.a, key, value));
    assert!(sample
        .tree
        .get_node(sample.a)
        .unwrap()
        .local_attributes()
        .is_empty());
}

#[rstest]
fn given_records_when_added_then_kept_in_order(mut sample: Sample) {
    sample.tree.add_data(sample.b, "first".to_string());
    sample.tree.add_data(sample.b, "second".to_string());

    assert_eq!(
        sample.tree.get_node(sample.b).unwrap().data(),
        &["first".to_string(), "second".to_string()]
    );
}

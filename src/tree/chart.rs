//! Chart data: the serializable form of the size tree.

use super::builder::{Group, GroupKind, Leaf, TreeNode};
use crate::parser::schema::Id;
use crate::sizes::SizeTriplet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of the chart data
///
/// Absent sizes and unset flags are left out of the JSON entirely, so
/// consumers can tell "no data" from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(flatten)]
    pub size: SizeTriplet,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<ChartNode>>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub concatenated: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub inaccurate_sizes: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_asset: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub is_initial_by_entrypoint: BTreeMap<String, bool>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ChartNode {
    fn new(label: String, path: Option<String>, size: SizeTriplet) -> Self {
        Self {
            id: None,
            label,
            path,
            size,
            groups: None,
            concatenated: false,
            inaccurate_sizes: false,
            is_asset: false,
            is_initial_by_entrypoint: BTreeMap::new(),
        }
    }

    pub fn children(&self) -> &[ChartNode] {
        self.groups.as_deref().unwrap_or_default()
    }

    /// Direct child with the given label
    pub fn child(&self, label: &str) -> Option<&ChartNode> {
        self.children().iter().find(|child| child.label == label)
    }

    /// This node and all its descendants, depth first
    pub fn descendants(&self) -> Vec<&ChartNode> {
        let mut nodes = vec![self];
        for child in self.children() {
            nodes.extend(child.descendants());
        }
        nodes
    }
}

impl From<Group> for ChartNode {
    fn from(group: Group) -> Self {
        let mut node = ChartNode::new(group.label, group.path, group.size);

        match group.kind {
            GroupKind::Asset { initial_by_entrypoint } => {
                node.is_asset = true;
                node.is_initial_by_entrypoint = initial_by_entrypoint;
            }
            GroupKind::Folder => {}
            GroupKind::Concatenated { id, inaccurate } => {
                node.id = id;
                node.concatenated = true;
                node.inaccurate_sizes = inaccurate;
            }
        }

        node.groups = Some(group.children.into_iter().map(ChartNode::from).collect());
        node
    }
}

impl From<Leaf> for ChartNode {
    fn from(leaf: Leaf) -> Self {
        let mut node = ChartNode::new(leaf.label, leaf.path, leaf.size);
        node.id = leaf.id;
        node.inaccurate_sizes = leaf.inaccurate;
        node
    }
}

impl From<TreeNode> for ChartNode {
    fn from(node: TreeNode) -> Self {
        match node {
            TreeNode::Group(group) => group.into(),
            TreeNode::Leaf(leaf) => leaf.into(),
        }
    }
}

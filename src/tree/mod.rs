//! Size tree construction and chart data.
//!
//! This module handles:
//! - Folding sized modules into a path-segmented tree per bundle
//! - Bottom-up size aggregation
//! - Converting the tree into serializable chart data

pub mod builder;
pub mod chart;

pub use builder::{build_asset_tree, path_parts, Group, GroupKind, Leaf, TreeNode};
pub use chart::ChartNode;

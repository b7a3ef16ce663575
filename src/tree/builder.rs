//! Tree builder: folds sized bundle members into a path-segmented hierarchy.
//!
//! Each module is placed by the segments of its request path
//! (`./src/components/App.js` -> `src` / `components` / `App.js`). Concatenated
//! modules become groups whose children are their merged modules, placed the
//! same way. Sizes are aggregated bottom-up once, after all members are placed.

use crate::parser::schema::Id;
use crate::sizes::{SizeTriplet, SizedAsset, SizedMember, SizedModule};
use crate::utils::config::{
    CONCATENATED_SUFFIX, MULTI_MODULE_PREFIX, ROOT_PATH, UNRESOLVED_LABEL_PREFIX,
};
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeMap;

/// Node of the size tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Group(Group),
    Leaf(Leaf),
}

impl TreeNode {
    pub fn label(&self) -> &str {
        match self {
            TreeNode::Group(group) => &group.label,
            TreeNode::Leaf(leaf) => &leaf.label,
        }
    }

    pub fn size(&self) -> SizeTriplet {
        match self {
            TreeNode::Group(group) => group.size,
            TreeNode::Leaf(leaf) => leaf.size,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Group(group) => &group.children,
            TreeNode::Leaf(_) => &[],
        }
    }
}

/// What a group stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    /// Root of one emitted bundle
    Asset {
        initial_by_entrypoint: BTreeMap<String, bool>,
    },

    /// Directory segment
    Folder,

    /// Concatenated module; its size is its own, not its children's sum
    Concatenated { id: Option<Id>, inaccurate: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub label: String,
    pub path: Option<String>,
    pub size: SizeTriplet,
    pub kind: GroupKind,
    pub children: Vec<TreeNode>,
}

/// One module, or a placeholder for modules missing from the stats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub label: String,
    pub path: Option<String>,
    pub id: Option<Id>,
    pub size: SizeTriplet,

    /// Sizes are estimates (merged module of a concatenated module)
    pub inaccurate: bool,
}

/// Build the size tree of one bundle
///
/// **Public** - main entry point for tree building
///
/// # Arguments
/// * `asset` - Sized bundle members
///
/// # Returns
/// Root group labelled by the emitted file name. Its statSize falls back to
/// the bundle's declared size when no member contributes any.
pub fn build_asset_tree(asset: SizedAsset) -> Group {
    let mut root: Drafts = IndexMap::new();

    for member in asset.members {
        match member {
            SizedMember::Module(module) => insert_module(&mut root, module, false),
            SizedMember::Placeholder(placeholder) => {
                let ids: Vec<String> = placeholder.missing.iter().map(Id::to_string).collect();
                let label = format!("{}{}", UNRESOLVED_LABEL_PREFIX, ids.join(", "));
                let draft = ModuleDraft {
                    id: None,
                    size: SizeTriplet::declared(placeholder.declared_size),
                    inaccurate: false,
                    content: None,
                    has_path: false,
                };
                insert(&mut root, &[label], draft);
            }
        }
    }

    let children = finish_children(root, ROOT_PATH);
    let mut size: SizeTriplet = children.iter().map(TreeNode::size).sum();

    if size.stat_size == 0 {
        size.stat_size = asset.declared_size;
    }

    Group {
        label: asset.name,
        path: None,
        size,
        kind: GroupKind::Asset {
            initial_by_entrypoint: asset.initial_by_entrypoint,
        },
        children,
    }
}

/// Split a module request into tree segments
///
/// Loader prefixes (`babel-loader!./src/a.js`) are dropped, a leading `.`
/// is removed and `~` stands for `node_modules`. A request without any `/`
/// is not a path and yields no segments.
pub fn path_parts(name: &str) -> Vec<String> {
    let request = name.rsplit('!').next().unwrap_or(name);

    if !request.contains('/') {
        return Vec::new();
    }

    let mut parts: Vec<String> = request
        .split('/')
        .filter(|part| !part.is_empty())
        .map(|part| if part == "~" { "node_modules" } else { part })
        .map(str::to_string)
        .collect();

    if parts.first().is_some_and(|part| part == ".") {
        parts.remove(0);
    }

    parts
}

/// Intermediate tree, keyed by segment so repeated paths meet.
///
/// Folders and modules live under separate keys: `./src/foo` and
/// `./src/foo/bar.js` give a `foo` module next to a `foo` folder.
type Drafts = IndexMap<Slot, Draft>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Folder(String),
    Module(String),
}

impl Slot {
    fn name(&self) -> &str {
        match self {
            Slot::Folder(name) | Slot::Module(name) => name,
        }
    }
}

enum Draft {
    Folder(Drafts),
    Module(ModuleDraft),
}

struct ModuleDraft {
    id: Option<Id>,
    size: SizeTriplet,
    inaccurate: bool,
    content: Option<Drafts>,
    has_path: bool,
}

impl ModuleDraft {
    /// Two modules under one label
    fn merge(&mut self, other: ModuleDraft) {
        self.size = self.size + other.size;
        self.inaccurate |= other.inaccurate;
        if self.content.is_none() {
            self.content = other.content;
        }
    }
}

fn insert_module(folder: &mut Drafts, module: SizedModule, inaccurate: bool) {
    let parts = module_parts(&module);
    let has_path = !parts.is_empty();
    let parts = if has_path {
        parts
    } else {
        vec![fallback_label(&module)]
    };

    let content = module.content.map(|content| {
        let mut inner = IndexMap::new();
        for child in content {
            insert_module(&mut inner, child, true);
        }
        inner
    });

    let draft = ModuleDraft {
        id: module.id,
        size: module.size,
        inaccurate,
        content,
        has_path,
    };

    insert(folder, &parts, draft);
}

fn module_parts(module: &SizedModule) -> Vec<String> {
    let multi = [&module.identifier, &module.name]
        .into_iter()
        .flatten()
        .find(|value| value.starts_with(MULTI_MODULE_PREFIX));

    if let Some(multi) = multi {
        return vec![multi.clone()];
    }

    module.name.as_deref().map(path_parts).unwrap_or_default()
}

fn fallback_label(module: &SizedModule) -> String {
    module
        .name
        .clone()
        .or_else(|| module.identifier.clone())
        .or_else(|| module.id.as_ref().map(Id::to_string))
        .unwrap_or_else(|| "(unnamed module)".to_string())
}

fn insert(folder: &mut Drafts, parts: &[String], draft: ModuleDraft) {
    match parts {
        [] => {}
        [name] => {
            if folder.contains_key(&Slot::Folder(name.clone())) {
                debug!("Module `{}` shares its name with a folder", name);
            }
            match folder.entry(Slot::Module(name.clone())) {
                Entry::Occupied(mut entry) => {
                    if let Draft::Module(existing) = entry.get_mut() {
                        existing.merge(draft);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(Draft::Module(draft));
                }
            }
        }
        [head, rest @ ..] => {
            let entry = folder
                .entry(Slot::Folder(head.clone()))
                .or_insert_with(|| Draft::Folder(IndexMap::new()));
            if let Draft::Folder(children) = entry {
                insert(children, rest, draft);
            }
        }
    }
}

fn join_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent, name)
}

fn finish_children(children: Drafts, parent_path: &str) -> Vec<TreeNode> {
    children
        .into_iter()
        .map(|(slot, draft)| {
            let name = slot.name().to_string();
            match draft {
                Draft::Folder(children) => TreeNode::Group(finish_folder(name, children, parent_path)),
                Draft::Module(module) => finish_module(name, module, parent_path),
            }
        })
        .collect()
}

fn finish_folder(mut name: String, mut children: Drafts, parent_path: &str) -> Group {
    // A folder holding only one folder is shown as `a/b`
    while children.len() == 1 && matches!(children.first(), Some((_, Draft::Folder(_)))) {
        let Some((child, Draft::Folder(grandchildren))) = children.pop() else {
            break;
        };
        name = join_path(&name, child.name());
        children = grandchildren;
    }

    let path = join_path(parent_path, &name);
    let nodes = finish_children(children, &path);

    Group {
        label: name,
        path: Some(path),
        size: nodes.iter().map(TreeNode::size).sum(),
        kind: GroupKind::Folder,
        children: nodes,
    }
}

fn finish_module(name: String, module: ModuleDraft, parent_path: &str) -> TreeNode {
    let own_path = join_path(parent_path, &name);
    let path = module.has_path.then(|| own_path.clone());

    match module.content {
        // Merged modules are placed below the concatenated module's own path
        Some(content) => TreeNode::Group(Group {
            label: format!("{}{}", name, CONCATENATED_SUFFIX),
            path,
            size: module.size,
            kind: GroupKind::Concatenated {
                id: module.id,
                inaccurate: module.inaccurate,
            },
            children: finish_children(content, &own_path),
        }),
        None => TreeNode::Leaf(Leaf {
            label: name,
            path,
            id: module.id,
            size: module.size,
            inaccurate: module.inaccurate,
        }),
    }
}

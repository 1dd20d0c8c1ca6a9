//! Index-linked storage for the panel tree
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeIndex`]. The
//! same employee can sit at more than one place in the forest (a chain
//! manager reached again through a lazy expansion), so the id index maps
//! to every position.

use rustc_hash::FxHashMap;
use serde::Serialize;
use whereat::org::sort_by_display_name;
use whereat::{EmployeeId, OrgMember, OrgTree};

/// Position of a node in a [`TreeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Where a node sits relative to the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeRole {
    /// Top of the management chain
    RootManager,
    Manager,
    Peer,
    CurrentUser,
    DirectReport,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub member: OrgMember,
    pub role: NodeRole,
    /// 0 = top level; children sit exactly one level below their parent
    pub level: usize,
    pub parent: Option<NodeIndex>,
    /// `None` until loaded; `Some(empty)` means loaded with no reports
    pub children: Option<Vec<NodeIndex>>,
}

impl TreeNode {
    pub fn id(&self) -> &EmployeeId {
        self.member.id()
    }

    pub fn has_loaded_children(&self) -> bool {
        self.children.is_some()
    }

    /// Loaded children, empty when not loaded yet
    pub fn loaded_children(&self) -> &[NodeIndex] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Whether the node shows an expand control
    pub fn is_expandable(&self) -> bool {
        self.member.is_expandable() || !self.loaded_children().is_empty()
    }

    /// Report count shown next to the node
    pub fn child_count(&self) -> usize {
        match self.member.child_count() {
            0 => self.loaded_children().len(),
            n => n,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeArena {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeIndex>,
    by_id: FxHashMap<EmployeeId, Vec<NodeIndex>>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out an org tree as a forest
    ///
    /// Chain managers become level-0 roots, root manager first. The direct
    /// manager carries the peers at level 1 and the current user carries its
    /// pre-attached reports one level further down. Without a chain the
    /// current user is the only root, with its reports at level 1.
    pub fn from_org_tree(tree: &OrgTree) -> Self {
        let mut arena = Self::new();
        let current = &tree.current_user;

        if tree.management_chain.is_empty() {
            let root = arena.add_root(current.clone(), NodeRole::CurrentUser);
            arena.attach_preloaded_reports(root, current);
            return arena;
        }

        let last = tree.management_chain.len() - 1;
        for (i, manager) in tree.management_chain.iter().enumerate() {
            let role = if i == 0 { NodeRole::RootManager } else { NodeRole::Manager };
            let idx = arena.add_root(manager.clone(), role);
            if i != last {
                continue;
            }

            arena.mark_loaded(idx);
            for peer in &tree.peers {
                if peer.id() == current.id() || peer.is_current_user {
                    let me = arena.add_child(idx, current.clone(), NodeRole::CurrentUser);
                    arena.attach_preloaded_reports(me, current);
                } else {
                    arena.add_child(idx, peer.clone(), NodeRole::Peer);
                }
            }
        }

        arena
    }

    fn attach_preloaded_reports(&mut self, parent: NodeIndex, member: &OrgMember) {
        if let Some(reports) = &member.direct_reports_data {
            self.mark_loaded(parent);
            let mut reports = reports.clone();
            sort_by_display_name(&mut reports);
            for report in reports {
                self.add_child(parent, report, NodeRole::DirectReport);
            }
        }
    }

    pub fn add_root(&mut self, member: OrgMember, role: NodeRole) -> NodeIndex {
        let idx = self.push(TreeNode {
            member,
            role,
            level: 0,
            parent: None,
            children: None,
        });
        self.roots.push(idx);
        idx
    }

    /// Append a child one level below `parent`, marking the parent loaded
    pub fn add_child(&mut self, parent: NodeIndex, member: OrgMember, role: NodeRole) -> NodeIndex {
        let level = self.nodes[parent.0].level + 1;
        let idx = self.push(TreeNode {
            member,
            role,
            level,
            parent: Some(parent),
            children: None,
        });
        self.nodes[parent.0].children.get_or_insert_with(Vec::new).push(idx);
        idx
    }

    /// Record that a node's children are known, even if there are none
    pub fn mark_loaded(&mut self, idx: NodeIndex) {
        self.nodes[idx.0].children.get_or_insert_with(Vec::new);
    }

    fn push(&mut self, node: TreeNode) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len());
        self.by_id.entry(node.id().clone()).or_default().push(idx);
        self.nodes.push(node);
        idx
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(idx.0)
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Every position of an employee, in insertion order
    pub fn indices_of(&self, id: &EmployeeId) -> &[NodeIndex] {
        self.by_id.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First position of an employee
    pub fn primary(&self, id: &EmployeeId) -> Option<NodeIndex> {
        self.indices_of(id).first().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whereat::Employee;

    fn member(id: &str, name: &str, reports: usize) -> OrgMember {
        OrgMember::new(Employee::new(id, format!("{}@x.com", id), name), reports)
    }

    fn chain_tree() -> OrgTree {
        let mut current = member("alice", "Alice", 0);
        current.is_current_user = true;
        let bob = member("bob", "Bob", 0);
        OrgTree {
            management_chain: vec![member("ceo", "CEO", 1), member("vp", "VP", 1), member("dir", "Director", 2)],
            current_user: current.clone(),
            peers: vec![current, bob],
        }
    }

    #[test]
    fn test_forest_layout() {
        let arena = TreeArena::from_org_tree(&chain_tree());
        assert_eq!(arena.roots().len(), 3);

        let roles: Vec<NodeRole> = arena.roots().iter().map(|&r| arena.get(r).unwrap().role).collect();
        assert_eq!(roles, vec![NodeRole::RootManager, NodeRole::Manager, NodeRole::Manager]);

        let ceo = arena.get(arena.roots()[0]).unwrap();
        assert!(!ceo.has_loaded_children());

        let dir = arena.get(arena.roots()[2]).unwrap();
        let peers: Vec<&TreeNode> = dir.loaded_children().iter().map(|&c| arena.get(c).unwrap()).collect();
        assert_eq!(peers.len(), 2);
        assert!(peers.iter().all(|p| p.level == 1));
        assert_eq!(peers[0].role, NodeRole::CurrentUser);
        assert_eq!(peers[1].role, NodeRole::Peer);
    }

    #[test]
    fn test_root_level_layout() {
        let mut current = member("ceo", "Cora", 2);
        current.direct_reports_data = Some(vec![member("z", "zed", 0), member("a", "Amy", 0)]);
        let tree = OrgTree {
            management_chain: Vec::new(),
            current_user: current,
            peers: Vec::new(),
        };

        let arena = TreeArena::from_org_tree(&tree);
        assert_eq!(arena.roots().len(), 1);
        let root = arena.get(arena.roots()[0]).unwrap();
        assert_eq!(root.role, NodeRole::CurrentUser);
        let names: Vec<&str> = root
            .loaded_children()
            .iter()
            .map(|&c| arena.get(c).unwrap().member.display_name())
            .collect();
        assert_eq!(names, vec!["Amy", "zed"]);
        assert_eq!(arena.get(root.loaded_children()[0]).unwrap().level, 1);
    }

    #[test]
    fn test_duplicate_positions_indexed() {
        let mut arena = TreeArena::new();
        let a = arena.add_root(member("m", "M", 1), NodeRole::RootManager);
        let b = arena.add_root(member("n", "N", 1), NodeRole::Manager);
        arena.add_child(a, member("n", "N", 1), NodeRole::DirectReport);

        assert_eq!(arena.indices_of(&"n".into()).len(), 2);
        assert_eq!(arena.primary(&"n".into()), Some(b));
        assert!(arena.indices_of(&"zzz".into()).is_empty());
    }

    #[test]
    fn test_child_count_falls_back_to_loaded() {
        let mut arena = TreeArena::new();
        let root = arena.add_root(member("m", "M", 0), NodeRole::RootManager);
        arena.add_child(root, member("c", "C", 0), NodeRole::DirectReport);
        let node = arena.get(root).unwrap();
        assert!(node.is_expandable());
        assert_eq!(node.child_count(), 1);
    }
}

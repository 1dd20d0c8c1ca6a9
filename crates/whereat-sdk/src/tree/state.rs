//! Tree state machine
//!
//! Holds one snapshot of the panel tree plus the expansion bookkeeping:
//! - `expanded`: node id -> child employees, for opened nodes with children
//! - `collapsed`: node ids the user explicitly closed
//! - `loading`: node ids with an expansion fetch in flight
//! - `failed`: node ids whose last fetch failed
//!
//! Expansion is two-phase so the caller can fetch without holding the state:
//! [`TreeState::begin_toggle`] hands out a [`FetchTicket`] and
//! [`TreeState::complete_expansion`] applies the reply. Tickets from an older
//! snapshot are discarded.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::debug;
use whereat::{EmployeeId, OrgMember, OrgTree};

use super::arena::{NodeIndex, NodeRole, TreeArena, TreeNode};

/// How the map should focus a selected employee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    /// Single click: pan without zoom
    Center,
    /// Double click: pan and zoom in
    CenterAndZoom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: EmployeeId,
    pub focus: FocusMode,
}

/// Permission to fetch the reports of one node for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: EmployeeId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Opened from cached children
    Opened,
    Closed,
    /// Children unknown; the caller must fetch them and complete the ticket
    Fetch(FetchTicket),
    /// A fetch for this node is already running
    InFlight,
    /// Known to have no reports
    Leaf,
    UnknownNode,
    /// Reply arrived after the tree was replaced
    Discarded,
}

/// One rendered panel row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRow {
    pub id: EmployeeId,
    pub depth: usize,
    /// "You" for the current user, the display name otherwise
    pub label: String,
    pub title: String,
    /// "City, State"
    pub location: Option<String>,
    pub role: NodeRole,
    pub badge: Option<&'static str>,
    /// Report count, only for expandable nodes
    pub child_count: Option<usize>,
    pub open: bool,
    pub loading: bool,
    pub failed: bool,
}

/// Badge derived from the job title
pub fn role_badge(job_title: &str) -> Option<&'static str> {
    let title = job_title.to_lowercase();
    if title.contains("ceo") {
        Some("CEO")
    } else if title.contains("svp") {
        Some("SVP")
    } else if title.contains("vp") {
        Some("VP")
    } else if title.contains("director") {
        Some("Director")
    } else if title.contains("manager") {
        Some("Manager")
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct TreeState {
    arena: TreeArena,
    expanded: FxHashMap<EmployeeId, Vec<OrgMember>>,
    collapsed: FxHashSet<EmployeeId>,
    loading: FxHashSet<EmployeeId>,
    failed: FxHashMap<EmployeeId, String>,
    selection: Option<Selection>,
    current_user: Option<EmployeeId>,
    generation: u64,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a freshly built tree
    pub fn load(&mut self, tree: &OrgTree) {
        self.reset();
        self.arena = TreeArena::from_org_tree(tree);
        let current = tree.current_user.id().clone();

        // Pre-attached reports below level 0 only show through `expanded`
        let preloaded = self
            .arena
            .primary(&current)
            .and_then(|idx| self.node(idx))
            .filter(|n| n.level > 0)
            .map(|n| self.child_members(n))
            .unwrap_or_default();
        if !preloaded.is_empty() {
            self.expanded.insert(current.clone(), preloaded);
        }
        self.current_user = Some(current);

        debug!(
            "Loaded tree snapshot {} with {} nodes",
            self.generation,
            self.arena.len()
        );
    }

    /// Drop the snapshot (identity resolved to no employee)
    pub fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.arena = TreeArena::new();
        self.expanded.clear();
        self.collapsed.clear();
        self.loading.clear();
        self.failed.clear();
        self.selection = None;
        self.current_user = None;
        self.generation += 1;
    }

    pub fn arena(&self) -> &TreeArena {
        &self.arena
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_user(&self) -> Option<&EmployeeId> {
        self.current_user.as_ref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_expanded(&self, id: &EmployeeId) -> bool {
        self.expanded.contains_key(id)
    }

    pub fn is_collapsed(&self, id: &EmployeeId) -> bool {
        self.collapsed.contains(id)
    }

    pub fn is_loading(&self, id: &EmployeeId) -> bool {
        self.loading.contains(id)
    }

    pub fn failure(&self, id: &EmployeeId) -> Option<&str> {
        self.failed.get(id).map(String::as_str)
    }

    fn node(&self, idx: NodeIndex) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    fn child_members(&self, node: &TreeNode) -> Vec<OrgMember> {
        node.loaded_children()
            .iter()
            .filter_map(|&c| self.node(c))
            .map(|c| c.member.clone())
            .collect()
    }

    /// Open state of an employee, shared by all of its positions
    ///
    /// An employee placed at level 0 with pre-loaded children is open unless
    /// collapsed; any other employee is open only while it has an `expanded`
    /// entry.
    fn is_open(&self, id: &EmployeeId) -> bool {
        if self.collapsed.contains(id) {
            return false;
        }
        let positions: Vec<&TreeNode> = self
            .arena
            .indices_of(id)
            .iter()
            .filter_map(|&idx| self.node(idx))
            .collect();
        if !positions.iter().any(|n| !n.loaded_children().is_empty()) {
            return false;
        }
        self.expanded.contains_key(id) || positions.iter().any(|n| n.level == 0)
    }

    /// The position holding an employee's loaded children, `node` itself first
    fn with_children<'a>(&'a self, node: &'a TreeNode) -> &'a TreeNode {
        if node.has_loaded_children() {
            return node;
        }
        self.arena
            .indices_of(node.id())
            .iter()
            .filter_map(|&idx| self.node(idx))
            .find(|n| n.has_loaded_children())
            .unwrap_or(node)
    }

    /// Cached children of an employee from whichever position has them
    fn cached_children(&self, id: &EmployeeId) -> Option<Vec<OrgMember>> {
        self.arena
            .indices_of(id)
            .iter()
            .filter_map(|&idx| self.node(idx))
            .find(|n| n.has_loaded_children())
            .map(|n| self.child_members(n))
    }

    /// Flip a node open or closed
    ///
    /// Closing removes the `expanded` entry and marks the node collapsed.
    /// Opening uses cached children when any position of the node has them;
    /// otherwise the node is marked loading and a fetch ticket is returned.
    /// While a fetch is in flight further toggles of the node are ignored.
    pub fn begin_toggle(&mut self, id: &EmployeeId) -> ToggleOutcome {
        let Some(node) = self.arena.primary(id).and_then(|idx| self.node(idx)) else {
            return ToggleOutcome::UnknownNode;
        };

        if self.is_open(id) {
            self.expanded.remove(id);
            self.collapsed.insert(id.clone());
            return ToggleOutcome::Closed;
        }

        if self.loading.contains(id) {
            return ToggleOutcome::InFlight;
        }

        let expandable = node.is_expandable();
        match self.cached_children(id) {
            Some(children) if !children.is_empty() => {
                self.collapsed.remove(id);
                self.expanded.insert(id.clone(), children);
                ToggleOutcome::Opened
            }
            Some(_) => {
                self.collapsed.remove(id);
                self.expanded.remove(id);
                ToggleOutcome::Leaf
            }
            None if !expandable => ToggleOutcome::Leaf,
            None => {
                self.loading.insert(id.clone());
                self.failed.remove(id);
                ToggleOutcome::Fetch(FetchTicket {
                    id: id.clone(),
                    generation: self.generation,
                })
            }
        }
    }

    /// Apply the reply to a fetch ticket
    ///
    /// Returns `false` when the ticket belongs to an older snapshot. On
    /// success the children are attached at every position of the node that
    /// has none yet and the node opens. On failure the node stays closed and
    /// unloaded, so a later toggle retries.
    pub fn complete_expansion(&mut self, ticket: FetchTicket, result: Result<Vec<OrgMember>, String>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding expansion of {} from snapshot {} (current {})",
                ticket.id, ticket.generation, self.generation
            );
            return false;
        }

        let id = ticket.id;
        self.loading.remove(&id);

        match result {
            Ok(reports) => {
                let targets: Vec<NodeIndex> = self
                    .arena
                    .indices_of(&id)
                    .iter()
                    .copied()
                    .filter(|&idx| self.node(idx).is_some_and(|n| !n.has_loaded_children()))
                    .collect();

                let current = self.current_user.clone();
                for idx in targets {
                    self.arena.mark_loaded(idx);
                    for report in &reports {
                        let role = if Some(report.id()) == current.as_ref() {
                            NodeRole::CurrentUser
                        } else {
                            NodeRole::DirectReport
                        };
                        self.arena.add_child(idx, report.clone(), role);
                    }
                }

                self.failed.remove(&id);
                self.collapsed.remove(&id);
                if reports.is_empty() {
                    self.expanded.remove(&id);
                } else {
                    self.expanded.insert(id, reports);
                }
            }
            Err(message) => {
                debug!("Expansion of {} failed: {}", id, message);
                self.failed.insert(id, message);
            }
        }
        true
    }

    /// Record a selection; a single click on an expandable node also toggles it
    pub fn select_employee(&mut self, id: &EmployeeId, focus: FocusMode) -> Option<ToggleOutcome> {
        self.selection = Some(Selection {
            id: id.clone(),
            focus,
        });

        if focus != FocusMode::Center {
            return None;
        }
        let expandable = self
            .arena
            .primary(id)
            .and_then(|idx| self.node(idx))
            .is_some_and(TreeNode::is_expandable);
        expandable.then(|| self.begin_toggle(id))
    }

    /// Depth-first walk over open nodes, each employee emitted once
    ///
    /// Yields each node with the depth it is drawn at. An employee reached
    /// again is not drawn twice; its first drawn position shows the children
    /// loaded at any of its positions, so a pre-loaded team moves under a
    /// manager that lists it.
    fn walk(&self) -> Vec<(&TreeNode, usize)> {
        let mut visited: FxHashSet<&EmployeeId> = FxHashSet::default();
        let mut out = Vec::new();
        let mut stack: Vec<(NodeIndex, usize)> = self.arena.roots().iter().rev().map(|&r| (r, 0)).collect();

        while let Some((idx, depth)) = stack.pop() {
            let Some(node) = self.node(idx) else { continue };
            if !visited.insert(node.id()) {
                continue;
            }
            out.push((node, depth));
            if self.is_open(node.id()) {
                let children = self.with_children(node).loaded_children();
                stack.extend(children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        out
    }

    /// Employees currently visible in the panel, for the map markers
    pub fn derive_visible(&self) -> Vec<OrgMember> {
        self.walk()
            .into_iter()
            .map(|(node, _)| node.member.clone())
            .collect()
    }

    /// Panel rows in display order
    pub fn rows(&self) -> Vec<PanelRow> {
        self.walk()
            .into_iter()
            .map(|(node, depth)| {
                let member = &node.member;
                let id = node.id();
                let expandable = node.is_expandable();
                PanelRow {
                    id: id.clone(),
                    depth,
                    label: if node.role == NodeRole::CurrentUser {
                        "You".to_string()
                    } else {
                        member.display_name().to_string()
                    },
                    title: member
                        .employee
                        .job_title
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    location: member.employee.location.as_ref().and_then(|l| l.short_label()),
                    role: node.role,
                    badge: role_badge(member.employee.job_title()),
                    child_count: expandable.then(|| node.child_count()),
                    open: self.is_open(id),
                    loading: self.loading.contains(id),
                    failed: self.failed.contains_key(id),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whereat::Employee;

    fn member(id: &str, name: &str, reports: usize) -> OrgMember {
        OrgMember::new(Employee::new(id, format!("{}@x.com", id), name), reports)
    }

    /// CEO -> VP -> Director -> {Alice (current), Bob}
    fn chain_state() -> TreeState {
        let mut alice = member("alice", "Alice", 0);
        alice.is_current_user = true;
        let tree = OrgTree {
            management_chain: vec![
                member("ceo", "Ceo", 1),
                member("vp", "Vp", 1),
                member("dir", "Director", 2),
            ],
            current_user: alice.clone(),
            peers: vec![alice, member("bob", "Bob", 1)],
        };
        let mut state = TreeState::new();
        state.load(&tree);
        state
    }

    fn visible_ids(state: &TreeState) -> Vec<String> {
        state
            .derive_visible()
            .iter()
            .map(|m| m.id().as_str().to_string())
            .collect()
    }

    fn ticket(outcome: ToggleOutcome) -> FetchTicket {
        match outcome {
            ToggleOutcome::Fetch(t) => t,
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_visible_set() {
        let state = chain_state();
        assert_eq!(visible_ids(&state), vec!["ceo", "vp", "dir", "alice", "bob"]);
    }

    #[test]
    fn test_lazy_expand_attaches_one_level() {
        let mut state = chain_state();
        let t = ticket(state.begin_toggle(&"bob".into()));
        assert!(state.is_loading(&"bob".into()));

        assert!(state.complete_expansion(t, Ok(vec![member("carl", "Carl", 0)])));
        assert!(!state.is_loading(&"bob".into()));
        assert!(state.is_expanded(&"bob".into()));
        assert_eq!(visible_ids(&state), vec!["ceo", "vp", "dir", "alice", "bob", "carl"]);

        let rows = state.rows();
        let carl = rows.iter().find(|r| r.id.as_str() == "carl").unwrap();
        assert_eq!(carl.depth, 2);
    }

    #[test]
    fn test_second_toggle_while_loading_is_suppressed() {
        let mut state = chain_state();
        let _t = ticket(state.begin_toggle(&"bob".into()));
        assert_eq!(state.begin_toggle(&"bob".into()), ToggleOutcome::InFlight);
    }

    #[test]
    fn test_collapse_and_reopen_uses_cache() {
        let mut state = chain_state();
        let t = ticket(state.begin_toggle(&"bob".into()));
        state.complete_expansion(t, Ok(vec![member("carl", "Carl", 0)]));

        assert_eq!(state.begin_toggle(&"bob".into()), ToggleOutcome::Closed);
        assert!(state.is_collapsed(&"bob".into()));
        assert!(!state.is_expanded(&"bob".into()));
        assert!(!visible_ids(&state).contains(&"carl".to_string()));

        assert_eq!(state.begin_toggle(&"bob".into()), ToggleOutcome::Opened);
        assert!(!state.is_collapsed(&"bob".into()));
        assert!(visible_ids(&state).contains(&"carl".to_string()));
    }

    #[test]
    fn test_collapse_level_zero_with_preloaded_children() {
        let mut state = chain_state();
        assert_eq!(state.begin_toggle(&"dir".into()), ToggleOutcome::Closed);
        assert_eq!(visible_ids(&state), vec!["ceo", "vp", "dir"]);
        assert_eq!(state.begin_toggle(&"dir".into()), ToggleOutcome::Opened);
        assert_eq!(visible_ids(&state).len(), 5);
    }

    #[test]
    fn test_empty_reply_is_leaf_and_not_expanded() {
        let mut state = chain_state();
        let t = ticket(state.begin_toggle(&"bob".into()));
        state.complete_expansion(t, Ok(Vec::new()));
        assert!(!state.is_expanded(&"bob".into()));
        assert_eq!(state.begin_toggle(&"bob".into()), ToggleOutcome::Leaf);
    }

    #[test]
    fn test_leaf_without_fetch() {
        let mut state = chain_state();
        assert_eq!(state.begin_toggle(&"alice".into()), ToggleOutcome::Leaf);
        assert_eq!(state.begin_toggle(&"nobody".into()), ToggleOutcome::UnknownNode);
    }

    #[test]
    fn test_failure_is_recorded_and_retryable() {
        let mut state = chain_state();
        let t = ticket(state.begin_toggle(&"bob".into()));
        state.complete_expansion(t, Err("timeout".into()));
        assert_eq!(state.failure(&"bob".into()), Some("timeout"));
        assert!(state.rows().iter().any(|r| r.id.as_str() == "bob" && r.failed));

        let retry = ticket(state.begin_toggle(&"bob".into()));
        assert!(state.failure(&"bob".into()).is_none());
        state.complete_expansion(retry, Ok(vec![member("carl", "Carl", 0)]));
        assert!(state.is_expanded(&"bob".into()));
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut state = chain_state();
        let stale = ticket(state.begin_toggle(&"bob".into()));
        state.load(&OrgTree {
            management_chain: Vec::new(),
            current_user: member("bob", "Bob", 1),
            peers: Vec::new(),
        });
        assert!(stale.generation < state.generation());
        assert!(!state.complete_expansion(stale, Ok(vec![member("carl", "Carl", 0)])));
        assert!(!state.is_expanded(&"bob".into()));
        assert!(!state.arena().get(state.arena().roots()[0]).unwrap().has_loaded_children());
    }

    #[test]
    fn test_duplicates_suppressed() {
        let mut state = chain_state();
        // Expanding the root manager lists the VP again
        let t = ticket(state.begin_toggle(&"ceo".into()));
        state.complete_expansion(t, Ok(vec![member("vp", "Vp", 1), member("zoe", "Zoe", 0)]));

        let ids = visible_ids(&state);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(ids, vec!["ceo", "vp", "zoe", "dir", "alice", "bob"]);
    }

    #[test]
    fn test_team_follows_expanded_chain_manager() {
        let mut state = chain_state();
        // The VP's reports list the Director, whose team is pre-loaded at level 0
        let t = ticket(state.begin_toggle(&"vp".into()));
        state.complete_expansion(t, Ok(vec![member("dir", "Director", 2)]));

        assert_eq!(visible_ids(&state), vec!["ceo", "vp", "dir", "alice", "bob"]);
        let rows = state.rows();
        let depths: Vec<usize> = rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 0, 1, 2, 2]);
        assert!(rows[2].open);

        // The drawn Director row closes and reopens its team
        assert_eq!(state.begin_toggle(&"dir".into()), ToggleOutcome::Closed);
        assert_eq!(visible_ids(&state), vec!["ceo", "vp", "dir"]);
        assert!(!state.rows()[2].open);
        assert_eq!(state.begin_toggle(&"dir".into()), ToggleOutcome::Opened);
        assert_eq!(visible_ids(&state), vec!["ceo", "vp", "dir", "alice", "bob"]);
    }

    #[test]
    fn test_select_single_click_toggles_double_click_does_not() {
        let mut state = chain_state();
        assert!(state.select_employee(&"bob".into(), FocusMode::CenterAndZoom).is_none());
        assert_eq!(state.selection().unwrap().focus, FocusMode::CenterAndZoom);

        let outcome = state.select_employee(&"bob".into(), FocusMode::Center);
        assert!(matches!(outcome, Some(ToggleOutcome::Fetch(_))));
        assert!(state.select_employee(&"alice".into(), FocusMode::Center).is_none());
    }

    #[test]
    fn test_rows_labels_and_badges() {
        let state = chain_state();
        let rows = state.rows();
        let me = rows.iter().find(|r| r.id.as_str() == "alice").unwrap();
        assert_eq!(me.label, "You");
        assert_eq!(me.title, "Unknown");
        assert_eq!(me.child_count, None);

        let dir = rows.iter().find(|r| r.id.as_str() == "dir").unwrap();
        assert!(dir.open);
        assert_eq!(dir.child_count, Some(2));
    }

    #[test]
    fn test_role_badge() {
        assert_eq!(role_badge("CEO"), Some("CEO"));
        assert_eq!(role_badge("SVP, Cloud"), Some("SVP"));
        assert_eq!(role_badge("Corporate VP"), Some("VP"));
        assert_eq!(role_badge("Director of Sales"), Some("Director"));
        assert_eq!(role_badge("Engineering Manager"), Some("Manager"));
        assert_eq!(role_badge("Engineer"), None);
    }

    #[test]
    fn test_root_level_current_user() {
        let mut ceo = member("ceo", "Cora", 2);
        ceo.direct_reports_data = Some(vec![member("b", "Ben", 0), member("a", "Ada", 3)]);
        let mut state = TreeState::new();
        state.load(&OrgTree {
            management_chain: Vec::new(),
            current_user: ceo,
            peers: Vec::new(),
        });

        assert_eq!(visible_ids(&state), vec!["ceo", "a", "b"]);
        let rows = state.rows();
        assert_eq!(rows[0].label, "You");
        assert_eq!(rows[1].depth, 1);
    }
}

//! Async driver for the panel tree
//!
//! Wraps a [`TreeState`] behind a mutex and performs the fetches it asks
//! for. The lock is never held across a network call, so the panel stays
//! readable while an expansion is loading.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use whereat::{EmployeeId, OrgMember};

use super::state::{FocusMode, PanelRow, ToggleOutcome, TreeState};
use crate::client::OrgClient;
use crate::error::SdkResult;

pub struct TreeController {
    client: Arc<dyn OrgClient>,
    state: Mutex<TreeState>,
}

impl TreeController {
    pub fn new(client: Arc<dyn OrgClient>) -> Self {
        Self {
            client,
            state: Mutex::new(TreeState::new()),
        }
    }

    /// Build the tree for a principal
    ///
    /// Returns `false` and clears the panel when the principal has no user
    /// record. A failed fetch keeps the previous tree.
    pub async fn load(&self, principal: &str) -> SdkResult<bool> {
        let tree = match self.client.get_org_tree(principal).await {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Failed to load org tree for {}: {}", principal, e);
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        match tree {
            Some(tree) => {
                state.load(&tree);
                info!(
                    "Loaded org tree for {} ({} managers, {} peers)",
                    principal,
                    tree.management_chain.len(),
                    tree.peers.len()
                );
                Ok(true)
            }
            None => {
                state.clear();
                info!("No user record for {}", principal);
                Ok(false)
            }
        }
    }

    /// Open or close a node, fetching its reports on first open
    pub async fn toggle(&self, id: &EmployeeId) -> SdkResult<ToggleOutcome> {
        let outcome = self.state.lock().await.begin_toggle(id);
        self.resolve(id, outcome).await
    }

    /// Select an employee; a single click on an expandable node also toggles it
    pub async fn select(&self, id: &EmployeeId, focus: FocusMode) -> SdkResult<Option<ToggleOutcome>> {
        let outcome = self.state.lock().await.select_employee(id, focus);
        match outcome {
            Some(outcome) => self.resolve(id, outcome).await.map(Some),
            None => Ok(None),
        }
    }

    async fn resolve(&self, id: &EmployeeId, outcome: ToggleOutcome) -> SdkResult<ToggleOutcome> {
        let ToggleOutcome::Fetch(ticket) = outcome else {
            return Ok(outcome);
        };

        let fetched = self.client.get_direct_reports_details(id.as_str()).await;

        let mut state = self.state.lock().await;
        match fetched {
            Ok(reports) => {
                if !state.complete_expansion(ticket, Ok(reports)) {
                    return Ok(ToggleOutcome::Discarded);
                }
                if state.is_expanded(id) {
                    Ok(ToggleOutcome::Opened)
                } else {
                    Ok(ToggleOutcome::Leaf)
                }
            }
            Err(e) => {
                warn!("Failed to load direct reports for {}: {}", id, e);
                state.complete_expansion(ticket, Err(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn visible(&self) -> Vec<OrgMember> {
        self.state.lock().await.derive_visible()
    }

    pub async fn rows(&self) -> Vec<PanelRow> {
        self.state.lock().await.rows()
    }

    pub async fn current_user(&self) -> Option<EmployeeId> {
        self.state.lock().await.current_user().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use crate::models::{ServerStatus, StorageStats};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use whereat::{Employee, OrgTree};

    fn member(id: &str, name: &str, reports: usize) -> OrgMember {
        OrgMember::new(Employee::new(id, format!("{}@x.com", id), name), reports)
    }

    /// Serves a fixed tree and counts report fetches
    /// Fails the first `failures` report fetches
    struct CountingClient {
        fetches: AtomicUsize,
        failures: usize,
    }

    impl CountingClient {
        fn new(fail: bool) -> Arc<Self> {
            Self::failing_first(if fail { usize::MAX } else { 0 })
        }

        fn failing_first(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                failures,
            })
        }
    }

    #[async_trait]
    impl OrgClient for CountingClient {
        async fn get_org_tree(&self, principal: &str) -> SdkResult<Option<OrgTree>> {
            if principal != "alice@x.com" {
                return Ok(None);
            }
            let mut alice = member("alice", "Alice", 0);
            alice.is_current_user = true;
            Ok(Some(OrgTree {
                management_chain: vec![member("lead", "Lead", 2)],
                current_user: alice.clone(),
                peers: vec![alice, member("bob", "Bob", 1)],
            }))
        }

        async fn get_direct_reports_details(&self, _employee_id: &str) -> SdkResult<Vec<OrgMember>> {
            let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if attempt < self.failures {
                return Err(SdkError::Server {
                    status: 500,
                    message: "Failed to fetch direct reports".to_string(),
                });
            }
            Ok(vec![member("carl", "Carl", 0)])
        }

        async fn chat(&self, _message: &str, _principal: Option<&str>) -> SdkResult<String> {
            Ok(String::new())
        }

        async fn status(&self) -> SdkResult<ServerStatus> {
            Ok(ServerStatus {
                status: "healthy".to_string(),
                version: whereat::VERSION.to_string(),
                storage: StorageStats { users: 0 },
            })
        }
    }

    #[tokio::test]
    async fn test_load_and_clear() {
        let controller = TreeController::new(CountingClient::new(false));
        assert!(controller.load("alice@x.com").await.unwrap());
        assert_eq!(controller.visible().await.len(), 3);
        assert_eq!(controller.current_user().await, Some("alice".into()));

        assert!(!controller.load("ghost@x.com").await.unwrap());
        assert!(controller.visible().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_fetch_once() {
        let client = CountingClient::new(false);
        let controller = TreeController::new(client.clone());
        controller.load("alice@x.com").await.unwrap();

        let bob: EmployeeId = "bob".into();
        let (a, b) = tokio::join!(controller.toggle(&bob), controller.toggle(&bob));
        let outcomes = [a.unwrap(), b.unwrap()];
        assert!(outcomes.contains(&ToggleOutcome::Opened));
        assert!(outcomes.contains(&ToggleOutcome::InFlight));
        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);

        // Close and reopen come from the cache
        assert_eq!(controller.toggle(&bob).await.unwrap(), ToggleOutcome::Closed);
        assert_eq!(controller.toggle(&bob).await.unwrap(), ToggleOutcome::Opened);
        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);

        let ids: Vec<String> = controller
            .visible()
            .await
            .iter()
            .map(|m| m.id().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["lead", "alice", "bob", "carl"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_row() {
        let controller = TreeController::new(CountingClient::new(true));
        controller.load("alice@x.com").await.unwrap();

        let bob: EmployeeId = "bob".into();
        assert!(controller.toggle(&bob).await.is_err());
        let rows = controller.rows().await;
        let row = rows.iter().find(|r| r.id == bob).unwrap();
        assert!(row.failed);
        assert!(!row.loading);
        assert!(!row.open);
    }

    #[tokio::test]
    async fn test_failed_expansion_retries_on_next_toggle() {
        let client = CountingClient::failing_first(1);
        let controller = TreeController::new(client.clone());
        controller.load("alice@x.com").await.unwrap();

        let bob: EmployeeId = "bob".into();
        assert!(controller.toggle(&bob).await.is_err());
        assert!(controller.rows().await.iter().any(|r| r.id == bob && r.failed));

        assert_eq!(controller.toggle(&bob).await.unwrap(), ToggleOutcome::Opened);
        assert_eq!(client.fetches.load(Ordering::SeqCst), 2);
        let rows = controller.rows().await;
        let row = rows.iter().find(|r| r.id == bob).unwrap();
        assert!(!row.failed);
        assert!(row.open);
        assert!(rows.iter().any(|r| r.id.as_str() == "carl"));
    }

    #[tokio::test]
    async fn test_select_single_click_expands() {
        let client = CountingClient::new(false);
        let controller = TreeController::new(client.clone());
        controller.load("alice@x.com").await.unwrap();

        let bob: EmployeeId = "bob".into();
        let zoom = controller.select(&bob, FocusMode::CenterAndZoom).await.unwrap();
        assert!(zoom.is_none());
        assert_eq!(client.fetches.load(Ordering::SeqCst), 0);

        let click = controller.select(&bob, FocusMode::Center).await.unwrap();
        assert_eq!(click, Some(ToggleOutcome::Opened));
        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);
    }
}

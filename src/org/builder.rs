//! Org tree assembly
//!
//! Builds the partially materialized tree shown when a user opens the
//! panel: the management chain (root first), the current user, and the
//! current user's peers. Only one level of reports is ever loaded here;
//! deeper levels come from the expansion resolver on demand.

use super::directory::{or_absent, Directory};
use super::employee::{sort_by_display_name, Employee, OrgMember};
use super::resolver::ExpansionResolver;
use super::store::StoreResult;
use super::types::PrincipalName;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Hop limit for the manager-chain walk
pub const MAX_CHAIN_DEPTH: usize = 10;

/// Snapshot returned for one identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgTree {
    /// Managers ordered root first, direct manager last
    pub management_chain: Vec<OrgMember>,
    pub current_user: OrgMember,
    /// Direct reports of the direct manager, current user included
    pub peers: Vec<OrgMember>,
}

impl OrgTree {
    pub fn direct_manager(&self) -> Option<&OrgMember> {
        self.management_chain.last()
    }

    pub fn is_root_level(&self) -> bool {
        self.management_chain.is_empty()
    }
}

/// Builds [`OrgTree`] snapshots from the record collections
#[derive(Clone)]
pub struct OrgTreeBuilder {
    directory: Directory,
    max_depth: usize,
}

impl OrgTreeBuilder {
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            max_depth: MAX_CHAIN_DEPTH,
        }
    }

    /// Override the hop limit of the chain walk
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the tree for a principal
    ///
    /// Returns `Ok(None)` when the principal has no user record. Only a
    /// failure resolving the principal itself is returned as an error.
    pub async fn build(&self, upn: &PrincipalName) -> StoreResult<Option<OrgTree>> {
        let current = match self.directory.employee_by_principal(upn).await? {
            Some(employee) => employee,
            None => {
                debug!("No user record for {}, returning empty tree", upn);
                return Ok(None);
            }
        };

        let chain = self.management_chain(upn).await;

        let mut current_user = self.directory.enrich(current.clone()).await;
        current_user.is_current_user = true;

        if chain.is_empty() {
            // Root-level employee: own reports attached eagerly, no peers
            let resolver = ExpansionResolver::new(self.directory.clone());
            let reports = resolver.reports_of(&current).await;
            current_user.direct_reports_data = Some(reports);

            return Ok(Some(OrgTree {
                management_chain: Vec::new(),
                current_user,
                peers: Vec::new(),
            }));
        }

        let peers = self.peers(&chain[0], &current).await;

        let mut management_chain = Vec::with_capacity(chain.len());
        for manager in chain.into_iter().rev() {
            management_chain.push(self.directory.enrich(manager).await);
        }

        Ok(Some(OrgTree {
            management_chain,
            current_user,
            peers,
        }))
    }

    /// Walk the manager links upward, closest manager first
    ///
    /// Stops at a missing link, an empty link, a manager without a user
    /// record, a failed lookup, or after `max_depth` hops.
    pub async fn management_chain(&self, upn: &PrincipalName) -> Vec<Employee> {
        let mut chain = Vec::new();
        let mut current = upn.clone();

        while chain.len() < self.max_depth {
            let manager_upn = match or_absent(self.directory.manager_of(&current).await, "manager link", &current) {
                Some(m) => m,
                None => break,
            };

            let manager = match or_absent(
                self.directory.employee_by_principal(&manager_upn).await,
                "manager",
                &manager_upn,
            ) {
                Some(m) => m,
                None => {
                    debug!("Manager {} of {} is dangling, chain ends here", manager_upn, current);
                    break;
                }
            };

            chain.push(manager);
            current = manager_upn;
        }

        if chain.len() == self.max_depth {
            debug!("Chain walk for {} hit the {} hop limit", upn, self.max_depth);
        }

        chain
    }

    async fn peers(&self, direct_manager: &Employee, current: &Employee) -> Vec<OrgMember> {
        let summaries = match self
            .directory
            .report_summaries(&direct_manager.user_principal_name)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    "Report link lookup for {} failed, no peers: {}",
                    direct_manager.user_principal_name,
                    e
                );
                return Vec::new();
            }
        };

        let mut peers = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let upn = &summary.user_principal_name;
            if let Some(peer) = or_absent(self.directory.employee_by_principal(upn).await, "peer", upn) {
                let mut member = self.directory.enrich(peer).await;
                member.is_current_user = member.employee.id == current.id;
                peers.push(member);
            }
        }

        sort_by_display_name(&mut peers);
        peers
    }
}

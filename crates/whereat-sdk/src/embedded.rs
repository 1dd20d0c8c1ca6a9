//! EmbeddedClient: in-process org client
//!
//! Runs the tree builder, expansion resolver and chat dispatcher directly
//! against a record store, no network needed.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use whereat::{AppState, Directory, EmployeeId, InMemoryRecordStore, OrgMember, OrgTree, PrincipalName, RecordStore, SeedData};
use whereat::org::MAX_CHAIN_DEPTH;

use crate::client::OrgClient;
use crate::error::SdkResult;
use crate::models::{ServerStatus, StorageStats};

/// In-process client that wraps a record store directly.
pub struct EmbeddedClient {
    state: AppState,
}

impl EmbeddedClient {
    /// Create an EmbeddedClient over an existing record store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            state: AppState::new(Directory::new(store), MAX_CHAIN_DEPTH),
        }
    }

    /// Create an EmbeddedClient over an in-memory store loaded from seed files
    pub fn from_seed_dir(dir: impl AsRef<Path>) -> Result<Self, whereat::SeedError> {
        let seed = SeedData::from_dir(dir)?;
        Ok(Self::new(Arc::new(InMemoryRecordStore::from(seed))))
    }

    /// Get the underlying directory (for direct record lookups)
    pub fn directory(&self) -> &Directory {
        &self.state.directory
    }
}

#[async_trait]
impl OrgClient for EmbeddedClient {
    async fn get_org_tree(&self, principal: &str) -> SdkResult<Option<OrgTree>> {
        Ok(self.state.builder.build(&PrincipalName::new(principal)).await?)
    }

    async fn get_direct_reports_details(&self, employee_id: &str) -> SdkResult<Vec<OrgMember>> {
        Ok(self
            .state
            .resolver
            .direct_reports_details(&EmployeeId::new(employee_id))
            .await?)
    }

    async fn chat(&self, message: &str, principal: Option<&str>) -> SdkResult<String> {
        let principal = principal.map(PrincipalName::new);
        Ok(self.state.chat.respond(message, principal.as_ref()).await?)
    }

    async fn status(&self) -> SdkResult<ServerStatus> {
        let users = self.state.directory.store().all_users().await?;
        Ok(ServerStatus {
            status: "healthy".to_string(),
            version: whereat::VERSION.to_string(),
            storage: StorageStats {
                users: users.len() as u64,
            },
        })
    }
}

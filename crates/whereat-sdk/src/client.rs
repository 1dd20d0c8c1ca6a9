//! OrgClient trait: the unified interface for embedded and remote modes

use async_trait::async_trait;
use crate::error::SdkResult;
use crate::models::ServerStatus;
use whereat::{OrgMember, OrgTree};

/// Unified client interface for the org panel data.
///
/// Implemented by:
/// - `EmbeddedClient`: in-process, no network (tests, tools, embedded use)
/// - `RemoteClient`: connects to a running Where@ server via HTTP
#[async_trait]
pub trait OrgClient: Send + Sync {
    /// Org tree for a principal, `None` when it has no user record
    async fn get_org_tree(&self, principal: &str) -> SdkResult<Option<OrgTree>>;

    /// Immediate reports of an employee, each with its own report count
    async fn get_direct_reports_details(&self, employee_id: &str) -> SdkResult<Vec<OrgMember>>;

    /// Ask the chat assistant, optionally on behalf of a principal
    async fn chat(&self, message: &str, principal: Option<&str>) -> SdkResult<String>;

    /// Get server status
    async fn status(&self) -> SdkResult<ServerStatus>;
}

//! RemoteClient: network client for a running Where@ server
//!
//! Connects via HTTP to the Where@ JSON API.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::client::OrgClient;
use crate::error::{SdkError, SdkResult};
use crate::models::ServerStatus;
use whereat::{OrgMember, OrgTree};

/// Network client that connects to a running Where@ server.
pub struct RemoteClient {
    http_base_url: String,
    http_client: Client,
}

impl RemoteClient {
    /// Create a new RemoteClient connecting to the given HTTP base URL.
    ///
    /// # Example
    /// ```no_run
    /// # use whereat_sdk::RemoteClient;
    /// let client = RemoteClient::new("http://localhost:3001");
    /// ```
    pub fn new(http_base_url: &str) -> Self {
        Self {
            http_base_url: http_base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SdkResult<T> {
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> SdkResult<T> {
        if response.status().is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let status = response.status().as_u16();
            let error_body: serde_json::Value = response
                .json()
                .await
                .unwrap_or_else(|_| serde_json::json!({"error": "Unknown error"}));
            let message = error_body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            Err(SdkError::Server { status, message })
        }
    }
}

/// Encode one path segment (principal names contain `@` and `.`)
fn segment(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[async_trait]
impl OrgClient for RemoteClient {
    async fn get_org_tree(&self, principal: &str) -> SdkResult<Option<OrgTree>> {
        self.get_json(&format!("/api/users/org-tree/{}", segment(principal)))
            .await
    }

    async fn get_direct_reports_details(&self, employee_id: &str) -> SdkResult<Vec<OrgMember>> {
        self.get_json(&format!("/api/users/{}/direct-reports-details", segment(employee_id)))
            .await
    }

    async fn chat(&self, message: &str, principal: Option<&str>) -> SdkResult<String> {
        let body = serde_json::json!({
            "message": message,
            "userPrincipalName": principal,
        });
        let response = self
            .http_client
            .post(self.url("/api/search/chat"))
            .json(&body)
            .send()
            .await?;

        let reply: serde_json::Value = Self::decode(response).await?;
        Ok(reply
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn status(&self) -> SdkResult<ServerStatus> {
        self.get_json("/api/status").await
    }
}

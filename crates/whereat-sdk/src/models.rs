//! Response models shared by the embedded and remote clients

use serde::{Deserialize, Serialize};

/// Server status information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Server version
    pub version: String,
    /// Storage statistics
    pub storage: StorageStats,
}

/// Storage statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Number of user records
    pub users: u64,
}

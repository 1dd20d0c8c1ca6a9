//! Where@ org panel server
//!
//! Builds partially materialized organization trees from flat directory
//! collections and serves them, together with roster queries and a keyword
//! chat assistant, over a JSON HTTP API.
//!
//! # Example
//!
//! ```rust
//! use whereat::org::{Directory, Employee, InMemoryRecordStore, ManagerLink, OrgTreeBuilder};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut store = InMemoryRecordStore::new();
//! store.insert_user(Employee::new("1", "ceo@contoso.com", "Cora"));
//! store.insert_user(Employee::new("2", "ali@contoso.com", "Ali"));
//! store.insert_manager_link(ManagerLink::new("ali@contoso.com", "ceo@contoso.com"));
//!
//! let builder = OrgTreeBuilder::new(Directory::new(Arc::new(store)));
//! let tree = builder.build(&"ali@contoso.com".into()).await.unwrap().unwrap();
//! assert_eq!(tree.management_chain[0].display_name(), "Cora");
//! # }
//! ```

#![warn(clippy::all)]

pub mod chat;
pub mod config;
pub mod http;
pub mod org;
pub mod persistence;

pub use chat::{ChatDispatcher, ChatError, ChatResult, Intent};
pub use config::{AppConfig, ConfigError, OrgConfig, ServerConfig, StoreBackend, StoreConfig};
pub use http::{router, AppState, HttpServer};
pub use org::{
    Directory, Employee, EmployeeId, ExpansionResolver, InMemoryRecordStore, Location, OrgMember, OrgTree,
    OrgTreeBuilder, PrincipalName, RecordStore, Roster, StoreError, StoreResult,
};
pub use persistence::{
    open_record_store, PersistenceError, PersistentRecordStore, SeedData, SeedError, StorageError, StorageResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

//! Where@ SDK: client library for the Where@ org panel
//!
//! Provides two client implementations:
//!
//! - **`EmbeddedClient`**: in-process, no network. Runs the tree builder and
//!   expansion resolver directly against a record store. Ideal for tests,
//!   tools and embedded applications.
//!
//! - **`RemoteClient`**: connects to a running Where@ server via HTTP.
//!
//! Both implement the `OrgClient` trait. On top of it sit the panel tree
//! ([`TreeController`], [`TreeState`]) and the map geocoder
//! ([`GeocodingService`]).
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use whereat_sdk::{EmbeddedClient, InMemoryRecordStore, TreeController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = EmbeddedClient::new(Arc::new(InMemoryRecordStore::new()));
//!     let tree = TreeController::new(Arc::new(client));
//!
//!     // Unknown principals clear the panel
//!     let found = tree.load("alice@contoso.com").await.unwrap();
//!     assert!(!found);
//!     assert!(tree.visible().await.is_empty());
//! }
//! ```

pub mod client;
pub mod embedded;
pub mod error;
pub mod geo;
pub mod models;
pub mod remote;
pub mod tree;

// ============================================================
// Core SDK types
// ============================================================

pub use client::OrgClient;
pub use embedded::EmbeddedClient;
pub use error::{SdkError, SdkResult};
pub use models::{ServerStatus, StorageStats};
pub use remote::RemoteClient;

// ============================================================
// Panel tree
// ============================================================

pub use tree::{
    role_badge, FocusMode, NodeRole, PanelLayout, PanelMessage, PanelRow, ToggleOutcome, TreeArena,
    TreeController, TreeState,
};

// ============================================================
// Geocoding
// ============================================================

pub use geo::{
    city_coordinates, AzureMapsGeocoder, Coordinates, GeoError, GeoResult, GeocodeCache, GeocodeProvider,
    GeocodingService, JsonFileBackend, MemoryBackend,
};

// ============================================================
// Org types (re-exported from whereat core)
// ============================================================

pub use whereat::{
    Employee, EmployeeId, InMemoryRecordStore, Location, OrgMember, OrgTree, PrincipalName, RecordStore,
    SeedData,
};

// ============================================================
// Version
// ============================================================

pub use whereat::VERSION;

//! Organization data model and tree assembly
//!
//! This module implements the server side of the org panel:
//! - Identity and record types for the users, manager-link, direct-report
//!   and photo collections
//! - The record store trait and an in-memory implementation
//! - The record store adapter ([`Directory`])
//! - The org tree builder and the one-level expansion resolver
//! - Roster-wide scans (search, location filters and statistics)

pub mod builder;
pub mod directory;
pub mod employee;
pub mod resolver;
pub mod roster;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::{OrgTree, OrgTreeBuilder, MAX_CHAIN_DEPTH};
pub use directory::Directory;
pub use employee::{
    sort_by_display_name, DirectReportLink, Employee, Location, ManagerLink, ManagerRef, OrgMember,
    PhotoRecord, ReportSummary,
};
pub use resolver::ExpansionResolver;
pub use roster::{LocationStats, Roster};
pub use store::{InMemoryRecordStore, RecordStore, StoreError, StoreResult};
pub use types::{EmployeeId, PrincipalName};

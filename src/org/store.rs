//! Record store abstraction over the four org collections
//!
//! The users, manager-link, direct-report-link and photo collections are
//! keyed independently and nothing enforces references between them. Every
//! lookup may legitimately return `None`.

use super::employee::{DirectReportLink, Employee, ManagerLink, PhotoRecord};
use super::types::{EmployeeId, PrincipalName};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by a record store backend
///
/// "No record" is never an error; these are transport or decoding failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store backend error: {0}")]
    Backend(String),

    #[error("Corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only access to the org collections
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup in the users collection by principal name
    async fn user_by_principal(&self, upn: &PrincipalName) -> StoreResult<Option<Employee>>;

    /// Point lookup in the users collection by stable id
    async fn user_by_id(&self, id: &EmployeeId) -> StoreResult<Option<Employee>>;

    /// The one-to-one manager link of an employee
    async fn manager_link(&self, upn: &PrincipalName) -> StoreResult<Option<ManagerLink>>;

    /// The one-to-many direct report link of an employee
    async fn direct_report_link(&self, upn: &PrincipalName) -> StoreResult<Option<DirectReportLink>>;

    /// Photo data for one principal
    async fn photo(&self, upn: &PrincipalName) -> StoreResult<Option<String>>;

    /// Full scan of the users collection
    async fn all_users(&self) -> StoreResult<Vec<Employee>>;

    /// Batch photo lookup; backends with a native batch query should override
    async fn photos(&self, upns: &[PrincipalName]) -> StoreResult<HashMap<PrincipalName, String>> {
        let mut out = HashMap::new();
        for upn in upns {
            if let Some(photo) = self.photo(upn).await? {
                if !photo.is_empty() {
                    out.insert(upn.clone(), photo);
                }
            }
        }
        Ok(out)
    }
}

/// In-memory record store
///
/// Uses hash maps for O(1) lookups:
/// - users: principal name -> Employee (insertion order kept for scans)
/// - ids: id -> principal name
/// - managers / direct_reports / photos: principal name -> record
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    users: Vec<Employee>,
    by_principal: HashMap<PrincipalName, usize>,
    ids: HashMap<EmployeeId, usize>,
    managers: HashMap<PrincipalName, ManagerLink>,
    direct_reports: HashMap<PrincipalName, DirectReportLink>,
    photos: HashMap<PrincipalName, String>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record
    pub fn insert_user(&mut self, employee: Employee) {
        match self.by_principal.get(&employee.user_principal_name) {
            Some(&slot) => {
                self.ids.remove(&self.users[slot].id);
                self.ids.insert(employee.id.clone(), slot);
                self.users[slot] = employee;
            }
            None => {
                let slot = self.users.len();
                self.by_principal.insert(employee.user_principal_name.clone(), slot);
                self.ids.insert(employee.id.clone(), slot);
                self.users.push(employee);
            }
        }
    }

    pub fn insert_manager_link(&mut self, link: ManagerLink) {
        self.managers.insert(link.user_principal_name.clone(), link);
    }

    pub fn insert_direct_report_link(&mut self, link: DirectReportLink) {
        self.direct_reports.insert(link.user_principal_name.clone(), link);
    }

    pub fn insert_photo(&mut self, record: PhotoRecord) {
        self.photos.insert(record.user_principal_name, record.photo);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn user_by_principal(&self, upn: &PrincipalName) -> StoreResult<Option<Employee>> {
        Ok(self.by_principal.get(upn).map(|&slot| self.users[slot].clone()))
    }

    async fn user_by_id(&self, id: &EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(self.ids.get(id).map(|&slot| self.users[slot].clone()))
    }

    async fn manager_link(&self, upn: &PrincipalName) -> StoreResult<Option<ManagerLink>> {
        Ok(self.managers.get(upn).cloned())
    }

    async fn direct_report_link(&self, upn: &PrincipalName) -> StoreResult<Option<DirectReportLink>> {
        Ok(self.direct_reports.get(upn).cloned())
    }

    async fn photo(&self, upn: &PrincipalName) -> StoreResult<Option<String>> {
        Ok(self.photos.get(upn).cloned())
    }

    async fn all_users(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.users.clone())
    }
}

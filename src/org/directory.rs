//! Record store adapter
//!
//! Wraps a [`RecordStore`] and exposes the lookups the tree builder and the
//! expansion resolver need: employees with their photo merged in, the
//! manager of a principal, and the report list of a principal.

use super::employee::{Employee, OrgMember, ReportSummary};
use super::store::{RecordStore, StoreResult};
use super::types::{EmployeeId, PrincipalName};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared handle to the org collections
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn RecordStore>,
}

impl Directory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Resolve an employee by principal name, photo included
    pub async fn employee_by_principal(&self, upn: &PrincipalName) -> StoreResult<Option<Employee>> {
        match self.store.user_by_principal(upn).await? {
            Some(employee) => Ok(Some(self.with_photo(employee).await)),
            None => Ok(None),
        }
    }

    /// Resolve an employee by stable id, photo included
    pub async fn employee_by_id(&self, id: &EmployeeId) -> StoreResult<Option<Employee>> {
        match self.store.user_by_id(id).await? {
            Some(employee) => Ok(Some(self.with_photo(employee).await)),
            None => Ok(None),
        }
    }

    /// Principal name of the manager named by the manager link, if any
    pub async fn manager_of(&self, upn: &PrincipalName) -> StoreResult<Option<PrincipalName>> {
        let link = self.store.manager_link(upn).await?;
        Ok(link.and_then(|l| l.manager).map(|m| m.user_principal_name))
    }

    /// Report summaries of a principal, empty when there is no link record
    pub async fn report_summaries(&self, upn: &PrincipalName) -> StoreResult<Vec<ReportSummary>> {
        let link = self.store.direct_report_link(upn).await?;
        Ok(link.map(|l| l.direct_reports).unwrap_or_default())
    }

    /// Number of reports of a principal; a failed lookup counts as zero
    pub async fn report_count(&self, upn: &PrincipalName) -> usize {
        match self.report_summaries(upn).await {
            Ok(reports) => reports.len(),
            Err(e) => {
                warn!("Report link lookup for {} failed, counting zero: {}", upn, e);
                0
            }
        }
    }

    /// Attach `hasDirectReports` / `directReportCount` to an employee
    pub async fn enrich(&self, employee: Employee) -> OrgMember {
        let count = self.report_count(&employee.user_principal_name).await;
        OrgMember::new(employee, count)
    }

    /// Merge photos into a batch of employees with a single batch lookup
    pub async fn with_photos(&self, mut users: Vec<Employee>) -> Vec<Employee> {
        if users.is_empty() {
            return users;
        }

        let upns: Vec<PrincipalName> = users.iter().map(|u| u.user_principal_name.clone()).collect();
        match self.store.photos(&upns).await {
            Ok(mut photos) => {
                for user in &mut users {
                    if let Some(photo) = photos.remove(&user.user_principal_name) {
                        user.photo = photo;
                    }
                }
            }
            Err(e) => warn!("Batch photo lookup failed for {} users: {}", users.len(), e),
        }
        users
    }

    async fn with_photo(&self, mut employee: Employee) -> Employee {
        match self.store.photo(&employee.user_principal_name).await {
            Ok(Some(photo)) => employee.photo = photo,
            Ok(None) => {}
            Err(e) => warn!("Photo lookup for {} failed: {}", employee.user_principal_name, e),
        }
        employee
    }
}

/// Collapse a failed per-record lookup into "record absent"
pub(crate) fn or_absent<T>(result: StoreResult<Option<T>>, what: &str, key: &dyn Display) -> Option<T> {
    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!("No {} record for {}", what, key);
            None
        }
        Err(e) => {
            warn!("{} lookup for {} failed, treating as absent: {}", what, key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::employee::{DirectReportLink, ManagerLink, PhotoRecord};
    use crate::org::store::InMemoryRecordStore;

    fn directory() -> Directory {
        let mut store = InMemoryRecordStore::new();
        store.insert_user(Employee::new("1", "alice@contoso.com", "Alice"));
        store.insert_user(Employee::new("2", "bob@contoso.com", "Bob"));
        store.insert_photo(PhotoRecord {
            user_principal_name: "alice@contoso.com".into(),
            photo: "data:image/jpeg;base64,QUxJQ0U=".into(),
        });
        store.insert_manager_link(ManagerLink::new("alice@contoso.com", "bob@contoso.com"));
        store.insert_manager_link(ManagerLink {
            user_principal_name: "bob@contoso.com".into(),
            manager: None,
        });
        store.insert_direct_report_link(DirectReportLink {
            user_principal_name: "bob@contoso.com".into(),
            direct_reports: vec![ReportSummary::from(&Employee::new("1", "alice@contoso.com", "Alice"))],
        });
        Directory::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_photo_is_merged() {
        let dir = directory();
        let alice = dir.employee_by_id(&"1".into()).await.unwrap().unwrap();
        assert_eq!(alice.photo, "data:image/jpeg;base64,QUxJQ0U=");

        let bob = dir.employee_by_principal(&"bob@contoso.com".into()).await.unwrap().unwrap();
        assert_eq!(bob.photo, "");
    }

    #[tokio::test]
    async fn test_manager_of_handles_empty_link() {
        let dir = directory();
        assert_eq!(
            dir.manager_of(&"alice@contoso.com".into()).await.unwrap(),
            Some(PrincipalName::new("bob@contoso.com"))
        );
        assert_eq!(dir.manager_of(&"bob@contoso.com".into()).await.unwrap(), None);
        assert_eq!(dir.manager_of(&"nobody@contoso.com".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_enrich_counts_reports() {
        let dir = directory();
        let bob = dir.employee_by_id(&"2".into()).await.unwrap().unwrap();
        let member = dir.enrich(bob).await;
        assert!(member.has_direct_reports);
        assert_eq!(member.direct_report_count, 1);

        let alice = dir.employee_by_id(&"1".into()).await.unwrap().unwrap();
        let member = dir.enrich(alice).await;
        assert!(!member.has_direct_reports);
        assert_eq!(member.direct_report_count, 0);
    }

    #[tokio::test]
    async fn test_with_photos_batch() {
        let dir = directory();
        let users = dir.store().all_users().await.unwrap();
        let users = dir.with_photos(users).await;
        assert!(!users[0].photo.is_empty());
        assert!(users[1].photo.is_empty());
    }
}

//! Lazy expansion of a single tree node
//!
//! Returns exactly one level of reports per call so the cost tracks the
//! branching factor rather than the size of the subtree.

use super::directory::{or_absent, Directory};
use super::employee::{sort_by_display_name, Employee, OrgMember, ReportSummary};
use super::store::StoreResult;
use super::types::EmployeeId;
use tracing::{debug, warn};

/// Resolves the immediate reports of an employee
#[derive(Clone)]
pub struct ExpansionResolver {
    directory: Directory,
}

impl ExpansionResolver {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    /// Immediate reports of `id` as full records with their own report counts
    ///
    /// An unknown id or a missing report link yields an empty list. A failed
    /// report link lookup is returned to the caller so the expansion can be
    /// retried.
    pub async fn direct_reports_details(&self, id: &EmployeeId) -> StoreResult<Vec<OrgMember>> {
        match self.directory.employee_by_id(id).await? {
            Some(employee) => {
                let summaries = self.directory.report_summaries(&employee.user_principal_name).await?;
                Ok(self.members_from(summaries).await)
            }
            None => {
                debug!("No user record for id {}, no reports", id);
                Ok(Vec::new())
            }
        }
    }

    /// Basic report summaries of `id`, in link order
    pub async fn direct_reports(&self, id: &EmployeeId) -> StoreResult<Vec<ReportSummary>> {
        match self.directory.employee_by_id(id).await? {
            Some(employee) => self.directory.report_summaries(&employee.user_principal_name).await,
            None => Ok(Vec::new()),
        }
    }

    /// Enriched, sorted reports of an already resolved employee
    ///
    /// Every failure, including the report link lookup, drops reports
    /// instead of failing.
    pub async fn reports_of(&self, employee: &Employee) -> Vec<OrgMember> {
        let upn = &employee.user_principal_name;
        match self.directory.report_summaries(upn).await {
            Ok(summaries) => self.members_from(summaries).await,
            Err(e) => {
                warn!("Report link lookup for {} failed, no reports: {}", upn, e);
                Vec::new()
            }
        }
    }

    async fn members_from(&self, summaries: Vec<ReportSummary>) -> Vec<OrgMember> {
        let mut reports = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let report_upn = &summary.user_principal_name;
            if let Some(report) = or_absent(
                self.directory.employee_by_principal(report_upn).await,
                "report",
                report_upn,
            ) {
                reports.push(self.directory.enrich(report).await);
            }
        }

        sort_by_display_name(&mut reports);
        reports
    }
}

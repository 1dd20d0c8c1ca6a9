//! Employee records and the link records that join them
//!
//! Field names follow the directory export format (camelCase JSON). Every
//! record here is read-only from this crate's point of view: the ingestion
//! process owns them.

use super::types::{EmployeeId, PrincipalName};
use serde::{Deserialize, Serialize};

/// Free-text postal location attached to an employee
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_or_region: Option<String>,
    pub postal_code: Option<String>,
    pub office_location: Option<String>,
}

impl Location {
    /// "City, State" label used by panel rows, `None` when both are empty
    pub fn short_label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// An employee as stored in the users collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub user_principal_name: PrincipalName,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(default)]
    pub business_phones: Vec<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub direct_report_ids: Vec<EmployeeId>,
    /// Embedded image data, empty when the photos collection has no entry
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub scraped_at: Option<String>,
}

impl Employee {
    /// Create an employee with only the identity and display name set
    pub fn new(
        id: impl Into<EmployeeId>,
        upn: impl Into<PrincipalName>,
        display_name: impl Into<String>,
    ) -> Self {
        Employee {
            id: id.into(),
            user_principal_name: upn.into(),
            display_name: display_name.into(),
            given_name: None,
            surname: None,
            mail: None,
            job_title: None,
            office_location: None,
            business_phones: Vec::new(),
            mobile_phone: None,
            preferred_language: None,
            location: None,
            direct_report_ids: Vec::new(),
            photo: String::new(),
            scraped_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn job_title(&self) -> &str {
        self.job_title.as_deref().unwrap_or("")
    }

    pub fn city(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.city.as_deref())
    }

    pub fn country(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.country_or_region.as_deref())
    }
}

/// Manager reference carried by a manager link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerRef {
    #[serde(default)]
    pub id: Option<EmployeeId>,
    pub user_principal_name: PrincipalName,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

/// One-to-one link from an employee to its manager
///
/// The named manager may have no record in the users collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerLink {
    pub user_principal_name: PrincipalName,
    #[serde(default)]
    pub manager: Option<ManagerRef>,
}

impl ManagerLink {
    pub fn new(upn: impl Into<PrincipalName>, manager_upn: impl Into<PrincipalName>) -> Self {
        ManagerLink {
            user_principal_name: upn.into(),
            manager: Some(ManagerRef {
                id: None,
                user_principal_name: manager_upn.into(),
                display_name: None,
                job_title: None,
            }),
        }
    }
}

/// Summary of one report inside a direct-report link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: EmployeeId,
    pub user_principal_name: PrincipalName,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

impl From<&Employee> for ReportSummary {
    fn from(e: &Employee) -> Self {
        ReportSummary {
            id: e.id.clone(),
            user_principal_name: e.user_principal_name.clone(),
            display_name: e.display_name.clone(),
            mail: e.mail.clone(),
            job_title: e.job_title.clone(),
        }
    }
}

/// One-to-many adjacency record used for downward traversal
///
/// Denormalized from the manager links and not guaranteed consistent with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectReportLink {
    pub user_principal_name: PrincipalName,
    #[serde(default)]
    pub direct_reports: Vec<ReportSummary>,
}

/// Entry in the photos collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub user_principal_name: PrincipalName,
    #[serde(default)]
    pub photo: String,
}

/// An employee as it crosses the API boundary, enriched with report counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMember {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(default)]
    pub has_direct_reports: bool,
    #[serde(default)]
    pub direct_report_count: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_current_user: bool,
    /// Reports attached eagerly, only set for a root-level current user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_reports_data: Option<Vec<OrgMember>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl OrgMember {
    pub fn new(employee: Employee, direct_report_count: usize) -> Self {
        OrgMember {
            employee,
            has_direct_reports: direct_report_count > 0,
            direct_report_count,
            is_current_user: false,
            direct_reports_data: None,
        }
    }

    pub fn id(&self) -> &EmployeeId {
        &self.employee.id
    }

    pub fn display_name(&self) -> &str {
        &self.employee.display_name
    }

    /// Whether a lazy expansion could produce children for this member
    pub fn is_expandable(&self) -> bool {
        self.has_direct_reports
            || self.direct_report_count > 0
            || !self.employee.direct_report_ids.is_empty()
            || self.direct_reports_data.as_ref().is_some_and(|d| !d.is_empty())
    }

    /// Number shown next to the member in the panel
    pub fn child_count(&self) -> usize {
        if self.direct_report_count > 0 {
            return self.direct_report_count;
        }
        if !self.employee.direct_report_ids.is_empty() {
            return self.employee.direct_report_ids.len();
        }
        self.direct_reports_data.as_ref().map(|d| d.len()).unwrap_or(0)
    }
}

/// Stable case-insensitive ordering by display name
pub fn sort_by_display_name(members: &mut [OrgMember]) {
    members.sort_by_cached_key(|m| m.employee.display_name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_from_directory_json() {
        let json = r#"{
            "id": "1",
            "userPrincipalName": "alice@contoso.com",
            "displayName": "Alice Smith",
            "jobTitle": "Engineer",
            "businessPhones": ["+1 555 0100"],
            "mobilePhone": null,
            "location": {"type": "business", "city": "Seattle", "state": "WA", "countryOrRegion": "United States", "postalCode": null}
        }"#;
        let e: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(e.display_name, "Alice Smith");
        assert_eq!(e.job_title(), "Engineer");
        assert_eq!(e.city(), Some("Seattle"));
        assert_eq!(e.country(), Some("United States"));
        assert_eq!(e.photo, "");
        assert!(e.direct_report_ids.is_empty());
    }

    #[test]
    fn test_org_member_wire_shape() {
        let member = OrgMember::new(Employee::new("1", "a@x.com", "Alice"), 2);
        let value = serde_json::to_value(&member).unwrap();

        assert_eq!(value["id"], "1");
        assert_eq!(value["displayName"], "Alice");
        assert_eq!(value["hasDirectReports"], true);
        assert_eq!(value["directReportCount"], 2);
        assert!(value.get("isCurrentUser").is_none());
        assert!(value.get("directReportsData").is_none());

        let back: OrgMember = serde_json::from_value(value).unwrap();
        assert_eq!(back, member);
    }

    #[test]
    fn test_short_label() {
        let loc = Location {
            city: Some("Seattle".into()),
            state: Some("WA".into()),
            ..Default::default()
        };
        assert_eq!(loc.short_label().as_deref(), Some("Seattle, WA"));
        assert_eq!(Location::default().short_label(), None);
    }

    #[test]
    fn test_sort_is_case_insensitive_and_stable() {
        let mut members = vec![
            OrgMember::new(Employee::new("1", "c@x.com", "carol"), 0),
            OrgMember::new(Employee::new("2", "b1@x.com", "Bob"), 0),
            OrgMember::new(Employee::new("3", "a@x.com", "alice"), 0),
            OrgMember::new(Employee::new("4", "b2@x.com", "bob"), 0),
        ];
        sort_by_display_name(&mut members);
        let ids: Vec<&str> = members.iter().map(|m| m.id().as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn test_child_count_fallbacks() {
        let mut e = Employee::new("1", "a@x.com", "Alice");
        e.direct_report_ids = vec!["2".into(), "3".into()];
        let member = OrgMember::new(e, 0);
        assert!(member.is_expandable());
        assert_eq!(member.child_count(), 2);
    }
}

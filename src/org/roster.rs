//! Roster-wide queries: scans over the users collection used by the map
//! and by the chat dispatcher

use super::directory::Directory;
use super::employee::Employee;
use super::store::StoreResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Head counts per location facet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStats {
    pub total_users: usize,
    pub by_city: IndexMap<String, usize>,
    pub by_country: IndexMap<String, usize>,
    pub by_office: IndexMap<String, usize>,
}

impl LocationStats {
    /// Cities ordered by descending head count, first-seen order on ties
    pub fn top_cities(&self, n: usize) -> Vec<(&str, usize)> {
        top(&self.by_city, n)
    }

    pub fn top_countries(&self, n: usize) -> Vec<(&str, usize)> {
        top(&self.by_country, n)
    }
}

fn top(counts: &IndexMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Scan-based queries over every employee
#[derive(Clone)]
pub struct Roster {
    directory: Directory,
}

impl Roster {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    pub async fn all_users(&self) -> StoreResult<Vec<Employee>> {
        let users = self.directory.store().all_users().await?;
        Ok(self.directory.with_photos(users).await)
    }

    pub async fn users_with_location(&self) -> StoreResult<Vec<Employee>> {
        let users = self.scan(|e| e.location.is_some()).await?;
        Ok(self.directory.with_photos(users).await)
    }

    /// Case-insensitive substring search over name, principal, title, city and country
    pub async fn search(&self, term: &str) -> StoreResult<Vec<Employee>> {
        let needle = term.to_lowercase();
        let users = self.scan(|e| matches_term(e, &needle)).await?;
        Ok(self.directory.with_photos(users).await)
    }

    /// Users with a location whose city and country contain the given filters
    pub async fn users_by_location(&self, city: Option<&str>, country: Option<&str>) -> StoreResult<Vec<Employee>> {
        let city = city.filter(|c| !c.is_empty()).map(str::to_lowercase);
        let country = country.filter(|c| !c.is_empty()).map(str::to_lowercase);

        let users = self
            .scan(|e| {
                if e.location.is_none() {
                    return false;
                }
                let city_ok = city.as_ref().map_or(true, |c| contains_ci(e.city(), c));
                let country_ok = country.as_ref().map_or(true, |c| contains_ci(e.country(), c));
                city_ok && country_ok
            })
            .await?;
        Ok(self.directory.with_photos(users).await)
    }

    pub async fn location_stats(&self) -> StoreResult<LocationStats> {
        let users = self.scan(|e| e.location.is_some()).await?;

        let mut stats = LocationStats {
            total_users: users.len(),
            ..Default::default()
        };
        for user in &users {
            if let Some(city) = user.city().filter(|c| !c.is_empty()) {
                *stats.by_city.entry(city.to_string()).or_insert(0) += 1;
            }
            if let Some(country) = user.country().filter(|c| !c.is_empty()) {
                *stats.by_country.entry(country.to_string()).or_insert(0) += 1;
            }
            if let Some(office) = user.office_location.as_deref().filter(|o| !o.is_empty()) {
                *stats.by_office.entry(office.to_string()).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }

    async fn scan(&self, keep: impl Fn(&Employee) -> bool) -> StoreResult<Vec<Employee>> {
        let users = self.directory.store().all_users().await?;
        Ok(users.into_iter().filter(|e| keep(e)).collect())
    }
}

fn contains_ci(field: Option<&str>, needle_lower: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(needle_lower))
}

fn matches_term(e: &Employee, needle_lower: &str) -> bool {
    contains_ci(Some(&e.display_name), needle_lower)
        || contains_ci(Some(e.user_principal_name.as_str()), needle_lower)
        || contains_ci(e.job_title.as_deref(), needle_lower)
        || contains_ci(e.city(), needle_lower)
        || contains_ci(e.country(), needle_lower)
}

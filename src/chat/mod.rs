//! Chat assistant
//!
//! Answers free-text questions about the organization by classifying the
//! message with keywords and running one of the roster or org queries.
//! Replies are Markdown.

pub mod intent;

pub use intent::{mentioned_cities, Intent, KNOWN_CITIES};

use crate::org::{
    Directory, Employee, ExpansionResolver, OrgTreeBuilder, PrincipalName, Roster, StoreError,
};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type ChatResult<T> = Result<T, ChatError>;

const NO_CURRENT_USER: &str = "I couldn't identify the current user. Please make sure you're logged in.";

const HELP: &str = "I'm not sure how to answer that question. Try asking about:\n\
• Team locations (e.g., 'How many engineers are in London?')\n\
• Direct reports (e.g., 'Show me my direct reports')\n\
• Management chain (e.g., 'Who is my manager?')\n\
• Time zone overlap";

/// Keyword dispatcher over the roster and org queries
#[derive(Clone)]
pub struct ChatDispatcher {
    directory: Directory,
    roster: Roster,
    builder: OrgTreeBuilder,
    resolver: ExpansionResolver,
}

impl ChatDispatcher {
    pub fn new(directory: Directory, builder: OrgTreeBuilder) -> Self {
        Self {
            roster: Roster::new(directory.clone()),
            resolver: ExpansionResolver::new(directory.clone()),
            directory,
            builder,
        }
    }

    /// Answer one message on behalf of `principal`
    pub async fn respond(&self, message: &str, principal: Option<&PrincipalName>) -> ChatResult<String> {
        let lower = message.to_lowercase();
        let intent = Intent::classify(&lower);
        debug!("Chat message classified as {:?}", intent);

        let current = match principal {
            Some(upn) if intent.needs_current_user() => self.directory.employee_by_principal(upn).await?,
            _ => None,
        };

        match intent {
            Intent::Location => self.location_answer(&lower).await,
            Intent::Team => self.team_answer().await,
            Intent::DirectReports => self.direct_reports_answer(current.as_ref()).await,
            Intent::Manager => Ok(self.manager_answer(current.as_ref()).await),
            Intent::Count => self.count_answer(&lower).await,
            Intent::TimeZone => self.time_zone_answer().await,
            Intent::General => self.general_answer(message).await,
        }
    }

    async fn location_answer(&self, lower: &str) -> ChatResult<String> {
        let mut lines = Vec::new();
        for city in mentioned_cities(lower) {
            let users = self.roster.users_by_location(Some(city), None).await?;
            if !users.is_empty() {
                let names: Vec<&str> = users.iter().map(|u| u.display_name.as_str()).collect();
                lines.push(format!("**{}**: {} team member(s) - {}", city, users.len(), names.join(", ")));
            }
        }
        if !lines.is_empty() {
            return Ok(format!(
                "Based on current data, here are the team members by location:\n\n{}",
                lines.join("\n")
            ));
        }

        let stats = self.roster.location_stats().await?;
        let top: Vec<String> = stats
            .top_cities(5)
            .into_iter()
            .map(|(city, count)| format!("• {}: {} member(s)", city, count))
            .collect();
        Ok(format!(
            "Here's an overview of team locations:\n\n**Total team members with location data**: {}\n\n**Top locations**:\n{}",
            stats.total_users,
            top.join("\n")
        ))
    }

    async fn team_answer(&self) -> ChatResult<String> {
        let users = self.roster.users_with_location().await?;

        let mut by_role: IndexMap<&str, usize> = IndexMap::new();
        for user in &users {
            *by_role.entry(role_word(user)).or_insert(0) += 1;
        }
        let mut roles: Vec<(&str, usize)> = by_role.into_iter().collect();
        roles.sort_by(|a, b| b.1.cmp(&a.1));

        let list: Vec<String> = roles
            .iter()
            .take(10)
            .map(|(role, count)| format!("• {}: {}", role, count))
            .collect();
        Ok(format!(
            "Your organization has **{}** team members.\n\n**By role**:\n{}",
            users.len(),
            list.join("\n")
        ))
    }

    async fn direct_reports_answer(&self, current: Option<&Employee>) -> ChatResult<String> {
        let Some(current) = current else {
            return Ok(NO_CURRENT_USER.to_string());
        };

        let reports = self.resolver.direct_reports_details(&current.id).await?;
        if reports.is_empty() {
            return Ok(format!("{} has no direct reports.", current.display_name));
        }

        let list: Vec<String> = reports
            .iter()
            .map(|r| {
                format!(
                    "• **{}** - {} ({})",
                    r.display_name(),
                    r.employee.job_title(),
                    r.employee.city().unwrap_or("Unknown location")
                )
            })
            .collect();
        Ok(format!(
            "**{}** has **{}** direct report(s):\n\n{}",
            current.display_name,
            reports.len(),
            list.join("\n")
        ))
    }

    async fn manager_answer(&self, current: Option<&Employee>) -> String {
        let Some(current) = current else {
            return NO_CURRENT_USER.to_string();
        };

        let chain = self.builder.management_chain(&current.user_principal_name).await;
        if chain.is_empty() {
            return format!("No management chain found for {}.", current.display_name);
        }

        let list: Vec<String> = chain
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. **{}** - {}", i + 1, m.display_name, m.job_title()))
            .collect();
        format!("**Management chain for {}**:\n\n{}", current.display_name, list.join("\n"))
    }

    async fn count_answer(&self, lower: &str) -> ChatResult<String> {
        let cities = mentioned_cities(lower);
        if !cities.is_empty() {
            let mut lines = Vec::with_capacity(cities.len());
            for city in cities {
                let users = self.roster.users_by_location(Some(city), None).await?;
                lines.push(format!(
                    "There are **{}** team member(s) in {}.",
                    users.len(),
                    capitalize(city)
                ));
            }
            return Ok(lines.join("\n"));
        }

        if lower.contains("engineer") {
            let users = self.roster.search("engineer").await?;
            return Ok(format!(
                "Based on current data, there are **{}** engineer(s) in the organization.",
                users.len()
            ));
        }

        let stats = self.roster.location_stats().await?;
        Ok(format!(
            "The organization has **{}** team members with location data across **{}** countries.",
            stats.total_users,
            stats.by_country.len()
        ))
    }

    async fn time_zone_answer(&self) -> ChatResult<String> {
        let stats = self.roster.location_stats().await?;
        let countries: Vec<String> = stats
            .by_country
            .iter()
            .map(|(country, count)| format!("• {}: {} member(s)", country, count))
            .collect();
        Ok(format!(
            "**Time Zone Overlap Analysis**\n\nBased on team distribution:\n{}\n\n\
             For optimal meeting times, consider the overlap between major regions where your team is located.",
            countries.join("\n")
        ))
    }

    async fn general_answer(&self, message: &str) -> ChatResult<String> {
        let results = self.roster.search(message.trim()).await?;
        if results.is_empty() {
            return Ok(HELP.to_string());
        }

        let list: Vec<String> = results
            .iter()
            .take(5)
            .map(|u| format!("• **{}** - {} ({})", u.display_name, u.job_title(), u.city().unwrap_or("Unknown")))
            .collect();
        Ok(format!("I found the following related team members:\n\n{}", list.join("\n")))
    }
}

/// Last word of the job title, used as a coarse role
fn role_word(user: &Employee) -> &str {
    user.job_title
        .as_deref()
        .and_then(|t| t.split(' ').last())
        .filter(|w| !w.is_empty())
        .unwrap_or("Unknown")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::{DirectReportLink, InMemoryRecordStore, Location, ManagerLink, ReportSummary};
    use std::sync::Arc;

    fn at(city: &str, country: &str) -> Location {
        Location {
            city: Some(city.into()),
            country_or_region: Some(country.into()),
            ..Default::default()
        }
    }

    fn dispatcher() -> ChatDispatcher {
        let mut store = InMemoryRecordStore::new();
        let ceo = Employee::new("1", "ceo@x.com", "Clara").with_title("Chief Executive Officer");
        let lead = Employee::new("2", "lead@x.com", "Liam")
            .with_title("Engineering Manager")
            .with_location(at("London", "United Kingdom"));
        let dev = Employee::new("3", "dev@x.com", "Dara")
            .with_title("Software Engineer")
            .with_location(at("London", "United Kingdom"));
        let sre = Employee::new("4", "sre@x.com", "Sam")
            .with_title("Reliability Engineer")
            .with_location(at("Seattle", "United States"));
        for e in [&ceo, &lead, &dev, &sre] {
            store.insert_user(e.clone());
        }
        store.insert_manager_link(ManagerLink::new("lead@x.com", "ceo@x.com"));
        store.insert_manager_link(ManagerLink::new("dev@x.com", "lead@x.com"));
        store.insert_manager_link(ManagerLink::new("sre@x.com", "lead@x.com"));
        store.insert_direct_report_link(DirectReportLink {
            user_principal_name: "lead@x.com".into(),
            direct_reports: vec![ReportSummary::from(&dev), ReportSummary::from(&sre)],
        });

        let directory = Directory::new(Arc::new(store));
        ChatDispatcher::new(directory.clone(), OrgTreeBuilder::new(directory))
    }

    #[tokio::test]
    async fn test_location_by_city() {
        let reply = dispatcher().respond("Who is located in London?", None).await.unwrap();
        assert!(reply.contains("**london**: 2 team member(s)"));
        assert!(reply.contains("Liam"));
    }

    #[tokio::test]
    async fn test_location_overview() {
        let reply = dispatcher().respond("where is everyone?", None).await.unwrap();
        assert!(reply.contains("**Total team members with location data**: 3"));
        assert!(reply.contains("• London: 2 member(s)"));
    }

    #[tokio::test]
    async fn test_team_roles() {
        let reply = dispatcher().respond("tell me about my colleagues", None).await.unwrap();
        assert!(reply.contains("**3** team members"));
        assert!(reply.contains("• Engineer: 2"));
    }

    #[tokio::test]
    async fn test_direct_reports_need_user() {
        let d = dispatcher();
        let reply = d.respond("show my direct reports", None).await.unwrap();
        assert_eq!(reply, NO_CURRENT_USER);

        let lead = PrincipalName::new("lead@x.com");
        let reply = d.respond("show my direct reports", Some(&lead)).await.unwrap();
        assert!(reply.contains("**Liam** has **2** direct report(s)"));
        assert!(reply.contains("• **Dara** - Software Engineer (London)"));
    }

    #[tokio::test]
    async fn test_manager_chain_closest_first() {
        let dev = PrincipalName::new("dev@x.com");
        let reply = dispatcher().respond("who is my boss?", Some(&dev)).await.unwrap();
        assert!(reply.contains("1. **Liam** - Engineering Manager"));
        assert!(reply.contains("2. **Clara** - Chief Executive Officer"));
    }

    #[tokio::test]
    async fn test_counts() {
        let d = dispatcher();
        let reply = d.respond("How many people in Seattle?", None).await.unwrap();
        assert_eq!(reply, "There are **1** team member(s) in Seattle.");

        let reply = d.respond("how many engineers?", None).await.unwrap();
        assert!(reply.contains("**3** engineer(s)"));

        let reply = d.respond("total headcount", None).await.unwrap();
        assert!(reply.contains("across **2** countries"));
    }

    #[tokio::test]
    async fn test_general_search_and_help() {
        let d = dispatcher();
        let reply = d.respond("Dara", None).await.unwrap();
        assert!(reply.contains("**Dara**"));

        let reply = d.respond("xyzzy", None).await.unwrap();
        assert!(reply.starts_with("I'm not sure"));
    }
}

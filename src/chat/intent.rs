//! Keyword classification of chat messages

/// What a chat message is asking about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Location,
    Team,
    DirectReports,
    Manager,
    Count,
    TimeZone,
    General,
}

const LOCATION_KEYWORDS: &[&str] = &["where", "location", "located", "city", "country", "office", "based"];
const TEAM_KEYWORDS: &[&str] = &["team", "members", "colleagues", "coworkers"];
const DIRECT_REPORT_KEYWORDS: &[&str] = &["direct reports", "reports to", "reportees", "subordinates", "manages"];
const MANAGER_KEYWORDS: &[&str] = &["manager", "management chain", "supervisor", "boss"];
const COUNT_KEYWORDS: &[&str] = &["how many", "count", "number of", "total"];
const TIME_ZONE_KEYWORDS: &[&str] = &["time zone", "timezone", "overlap", "working hours"];

/// Cities recognized by name in chat messages
pub const KNOWN_CITIES: &[&str] = &[
    "london",
    "seattle",
    "new york",
    "san francisco",
    "mountain view",
    "redmond",
    "tokyo",
    "singapore",
    "sydney",
    "berlin",
    "paris",
    "mumbai",
    "bangalore",
    "dublin",
    "vancouver",
    "toronto",
];

impl Intent {
    /// Classify a lower-cased message; the first matching group wins
    pub fn classify(message: &str) -> Intent {
        let table: [(&[&str], Intent); 6] = [
            (LOCATION_KEYWORDS, Intent::Location),
            (TEAM_KEYWORDS, Intent::Team),
            (DIRECT_REPORT_KEYWORDS, Intent::DirectReports),
            (MANAGER_KEYWORDS, Intent::Manager),
            (COUNT_KEYWORDS, Intent::Count),
            (TIME_ZONE_KEYWORDS, Intent::TimeZone),
        ];

        table
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::General)
    }

    /// Whether answering needs the asking user's record
    pub fn needs_current_user(self) -> bool {
        matches!(self, Intent::DirectReports | Intent::Manager)
    }
}

/// Known cities mentioned in a lower-cased message, in table order
pub fn mentioned_cities(message: &str) -> Vec<&'static str> {
    KNOWN_CITIES.iter().copied().filter(|c| message.contains(c)).collect()
}

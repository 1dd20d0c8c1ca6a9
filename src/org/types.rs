//! Identity types shared by every org record collection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, immutable employee identifier (directory object id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        EmployeeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EmployeeId {
    fn from(s: String) -> Self {
        EmployeeId(s)
    }
}

impl From<&str> for EmployeeId {
    fn from(s: &str) -> Self {
        EmployeeId(s.to_string())
    }
}

/// Principal name used to join the record collections (login/email style)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PrincipalName(String);

impl PrincipalName {
    pub fn new(upn: impl Into<String>) -> Self {
        PrincipalName(upn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PrincipalName {
    fn from(s: String) -> Self {
        PrincipalName(s)
    }
}

impl From<&str> for PrincipalName {
    fn from(s: &str) -> Self {
        PrincipalName(s.to_string())
    }
}

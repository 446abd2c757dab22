//! Project keys — the closed set of functional scopes.
//!
//! Roles and permissions are only meaningful inside one of these scopes.
//! The set is extended by adding a variant and the matching seed row, never
//! at runtime.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A named functional scope within which roles and permissions are defined.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectKey {
    Intranet,
    News,
    Meetings,
    Labs,
    ExecCommittee,
    Settings,
}

impl ProjectKey {
    /// The stable string key stored in the `projects` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKey::Intranet => "INTRANET",
            ProjectKey::News => "NEWS",
            ProjectKey::Meetings => "MEETINGS",
            ProjectKey::Labs => "LABS",
            ProjectKey::ExecCommittee => "EXEC_COMMITTEE",
            ProjectKey::Settings => "SETTINGS",
        }
    }

    /// All project keys, in seed order.
    pub fn all() -> &'static [ProjectKey] {
        &[
            ProjectKey::Intranet,
            ProjectKey::News,
            ProjectKey::Meetings,
            ProjectKey::Labs,
            ProjectKey::ExecCommittee,
            ProjectKey::Settings,
        ]
    }
}

impl core::fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INTRANET" => Ok(ProjectKey::Intranet),
            "NEWS" => Ok(ProjectKey::News),
            "MEETINGS" => Ok(ProjectKey::Meetings),
            "LABS" => Ok(ProjectKey::Labs),
            "EXEC_COMMITTEE" => Ok(ProjectKey::ExecCommittee),
            "SETTINGS" => Ok(ProjectKey::Settings),
            other => Err(DomainError::validation(format!(
                "unknown project key: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_key() {
        for key in ProjectKey::all() {
            assert_eq!(key.as_str().parse::<ProjectKey>().unwrap(), *key);
        }
    }

    #[test]
    fn rejects_unknown_key() {
        assert!("PUBLIC".parse::<ProjectKey>().is_err());
    }
}

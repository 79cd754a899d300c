use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two entity kinds the admin screens work with. Serialized the way the
/// fetch-error events name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum EntityKind {
    #[default]
    #[serde(rename = "repos")]
    Repo,
    #[serde(rename = "teams")]
    Team,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repo => write!(f, "repos"),
            Self::Team => write!(f, "teams"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "repos" | "repo" | "repositories" => Ok(Self::Repo),
            "teams" | "team" => Ok(Self::Team),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

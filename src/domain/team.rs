use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub members_count: u32,
}

/// Repository permission a team can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPermission {
    Pull,
    #[default]
    Push,
    Maintain,
    Admin,
}

impl TeamPermission {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pull => "Read (pull)",
            Self::Push => "Write (push)",
            Self::Maintain => "Maintain",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for TeamPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pull => write!(f, "pull"),
            Self::Push => write!(f, "push"),
            Self::Maintain => write!(f, "maintain"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for TeamPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pull" | "read" => Ok(Self::Pull),
            "push" | "write" => Ok(Self::Push),
            "maintain" => Ok(Self::Maintain),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown team permission: {other}")),
        }
    }
}

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::GitHubError;

lazy_static! {
    static ref FULL_NAME_RE: Regex =
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9-]*)/([A-Za-z0-9._-]+)$").expect("full name regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Internal,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "internal" => Ok(Self::Internal),
            other => Err(format!("unknown visibility: {other}")),
        }
    }
}

/// Older payloads send `""` (or nothing) before visibility was populated.
fn visibility_or_unset<'de, D>(deserializer: D) -> Result<Option<Visibility>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

/// A custom property value as GitHub reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Unset,
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{value}"),
            Self::List(values) => write!(f, "{}", values.join(", ")),
            Self::Unset => Ok(()),
        }
    }
}

/// A team's access to one repository, as listed on the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTeam {
    pub name: String,
    pub slug: String,
    /// Kept as reported: repositories can also carry `triage`, which groups never assign.
    pub permission: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "visibility_or_unset")]
    pub visibility: Option<Visibility>,
    /// Legacy flag, only consulted when `visibility` is unset.
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub can_manage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<BTreeMap<String, PropertyValue>>,
    /// Populated only after a detail fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<RepoTeam>>,
}

impl Repository {
    pub fn owner(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or_default()
    }

    /// Visibility used for filtering and badges, falling back to the legacy
    /// `public` flag for entries fetched before visibility was populated.
    pub fn effective_visibility(&self) -> Visibility {
        match self.visibility {
            Some(visibility) => visibility,
            None if self.public => Visibility::Public,
            None => Visibility::Private,
        }
    }

    /// Field-level merge; identity fields are never touched.
    pub fn apply_fields(&mut self, fields: RepoFields) {
        let RepoFields {
            topics,
            archived,
            visibility,
            default_branch,
            can_manage,
            custom_properties,
            teams,
        } = fields;

        if let Some(topics) = topics {
            self.topics = topics;
        }
        if let Some(archived) = archived {
            self.archived = archived;
        }
        if let Some(visibility) = visibility {
            self.visibility = Some(visibility);
        }
        if let Some(default_branch) = default_branch {
            self.default_branch = default_branch;
        }
        if let Some(can_manage) = can_manage {
            self.can_manage = can_manage;
        }
        if let Some(custom_properties) = custom_properties {
            self.custom_properties = Some(custom_properties);
        }
        if let Some(teams) = teams {
            self.teams = Some(teams);
        }
    }
}

/// Partial update for one cached repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoFields {
    pub topics: Option<Vec<String>>,
    pub archived: Option<bool>,
    pub visibility: Option<Visibility>,
    pub default_branch: Option<String>,
    pub can_manage: Option<bool>,
    pub custom_properties: Option<BTreeMap<String, PropertyValue>>,
    pub teams: Option<Vec<RepoTeam>>,
}

impl RepoFields {
    pub fn topics(topics: Vec<String>) -> Self {
        Self {
            topics: Some(topics),
            ..Default::default()
        }
    }
}

/// Splits `owner/name`, rejecting anything that is not a repository key.
pub fn parse_full_name(full_name: &str) -> Result<(&str, &str), GitHubError> {
    let caps = FULL_NAME_RE
        .captures(full_name)
        .ok_or_else(|| GitHubError::InvalidFullName(full_name.to_string()))?;
    match (caps.get(1), caps.get(2)) {
        (Some(owner), Some(name)) => Ok((owner.as_str(), name.as_str())),
        _ => Err(GitHubError::InvalidFullName(full_name.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub enforcement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoDetails {
    #[serde(flatten)]
    pub repository: Repository,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub watching: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub open_prs: u32,
    #[serde(default)]
    pub branches_count: u32,
    #[serde(default)]
    pub property_values: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub team_access: Vec<RepoTeam>,
    #[serde(default)]
    pub protected_branches: Vec<String>,
    #[serde(default)]
    pub rulesets: Vec<RulesetSummary>,
}

impl RepoDetails {
    /// The slice of a detail fetch that is denormalized back into the cache.
    pub fn cache_fields(&self) -> RepoFields {
        RepoFields {
            topics: Some(self.repository.topics.clone()),
            custom_properties: Some(self.property_values.clone()),
            teams: Some(self.team_access.clone()),
            ..Default::default()
        }
    }
}

/// One entry of an organization's custom property schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub property_name: String,
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<PropertyValue>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

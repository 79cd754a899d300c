use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ConnectionStatus, EntityKind, Repository, Team};
use crate::infra::app_config::AppConfig;

pub const REPOS_UPDATED: &str = "github:repos:updated";
pub const TEAMS_UPDATED: &str = "github:teams:updated";
pub const STATUS_UPDATED: &str = "github:status:updated";
pub const CONFIG_UPDATED: &str = "config:updated";
pub const FETCH_ERROR: &str = "github:fetch:error";

/// Push notification from the remote side.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    ReposUpdated {
        org: String,
        repos: Vec<Repository>,
    },
    /// `teams: None` means the owner cannot have teams (a personal account).
    TeamsUpdated {
        org: String,
        teams: Option<Vec<Team>>,
    },
    StatusUpdated(ConnectionStatus),
    ConfigUpdated(AppConfig),
    FetchError {
        org: String,
        kind: EntityKind,
        error: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ReposPayload {
    org: String,
    #[serde(default)]
    repos: Option<Vec<Repository>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TeamsPayload {
    org: String,
    #[serde(default)]
    teams: Option<Vec<Team>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FetchErrorPayload {
    org: String,
    #[serde(rename = "type")]
    kind: EntityKind,
    error: String,
}

impl RemoteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReposUpdated { .. } => REPOS_UPDATED,
            Self::TeamsUpdated { .. } => TEAMS_UPDATED,
            Self::StatusUpdated(_) => STATUS_UPDATED,
            Self::ConfigUpdated(_) => CONFIG_UPDATED,
            Self::FetchError { .. } => FETCH_ERROR,
        }
    }

    /// Decodes a named event. Unknown names yield `Ok(None)`.
    pub fn from_named(name: &str, payload: Value) -> Result<Option<Self>> {
        let event = match name {
            REPOS_UPDATED => {
                let payload: ReposPayload =
                    serde_json::from_value(payload).context("parse repos payload")?;
                Self::ReposUpdated {
                    org: payload.org,
                    repos: payload.repos.unwrap_or_default(),
                }
            }
            TEAMS_UPDATED => {
                let payload: TeamsPayload =
                    serde_json::from_value(payload).context("parse teams payload")?;
                Self::TeamsUpdated {
                    org: payload.org,
                    teams: payload.teams,
                }
            }
            STATUS_UPDATED => Self::StatusUpdated(
                serde_json::from_value(payload).context("parse status payload")?,
            ),
            CONFIG_UPDATED => Self::ConfigUpdated(
                serde_json::from_value(payload).context("parse config payload")?,
            ),
            FETCH_ERROR => {
                let payload: FetchErrorPayload =
                    serde_json::from_value(payload).context("parse fetch error payload")?;
                Self::FetchError {
                    org: payload.org,
                    kind: payload.kind,
                    error: payload.error,
                }
            }
            other => {
                log::debug!("ignoring unknown remote event '{other}'");
                return Ok(None);
            }
        };
        Ok(Some(event))
    }

    pub fn payload(&self) -> Result<Value> {
        let value = match self {
            Self::ReposUpdated { org, repos } => serde_json::to_value(ReposPayload {
                org: org.clone(),
                repos: Some(repos.clone()),
            }),
            Self::TeamsUpdated { org, teams } => serde_json::to_value(TeamsPayload {
                org: org.clone(),
                teams: teams.clone(),
            }),
            Self::StatusUpdated(status) => serde_json::to_value(status),
            Self::ConfigUpdated(config) => serde_json::to_value(config),
            Self::FetchError { org, kind, error } => serde_json::to_value(FetchErrorPayload {
                org: org.clone(),
                kind: *kind,
                error: error.clone(),
            }),
        };
        value.with_context(|| format!("encode {} payload", self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_team_list_means_unsupported() {
        let event = RemoteEvent::from_named(TEAMS_UPDATED, json!({"org": "me", "teams": null}))
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            RemoteEvent::TeamsUpdated {
                org: "me".into(),
                teams: None
            }
        );

        let event = RemoteEvent::from_named(TEAMS_UPDATED, json!({"org": "acme", "teams": []}))
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            RemoteEvent::TeamsUpdated {
                org: "acme".into(),
                teams: Some(vec![])
            }
        );
    }

    #[test]
    fn fetch_error_uses_type_field() {
        let event = RemoteEvent::from_named(
            FETCH_ERROR,
            json!({"org": "acme", "type": "teams", "error": "forbidden"}),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            event,
            RemoteEvent::FetchError {
                org: "acme".into(),
                kind: EntityKind::Team,
                error: "forbidden".into()
            }
        );
    }

    #[test]
    fn unknown_names_are_ignored() {
        assert!(
            RemoteEvent::from_named("github:rate:limited", json!({}))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn repos_payload_survives_a_trip_through_its_name() {
        let event = RemoteEvent::ReposUpdated {
            org: "acme".into(),
            repos: vec![Repository {
                name: "api".into(),
                full_name: "acme/api".into(),
                can_manage: true,
                ..Default::default()
            }],
        };
        let decoded = RemoteEvent::from_named(event.name(), event.payload().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(decoded, event);
    }
}

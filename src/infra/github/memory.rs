//! In-memory [`GitHubAdmin`] that records every call.
//!
//! Used by the store tests and by anything that wants to drive the store
//! without a network. Topic and custom property updates are applied to the
//! stored repositories, so a refresh after a bulk run reflects it.

use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

use super::{GitHubAdmin, RemoteEvent};
use crate::application::topics::{TopicMode, apply_topic_mode};
use crate::domain::{
    ConnectionStatus, PropertyDefinition, PropertyValue, RepoDetails, Repository, Team,
    TeamPermission,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Startup,
    Login {
        token: String,
    },
    Logout,
    SetOrganization {
        org: String,
    },
    StartPolling,
    StopPolling,
    RefreshRepoList {
        org: String,
    },
    GetRepoDetails {
        full_name: String,
    },
    UpdateRepoTopics {
        full_name: String,
        topics: Vec<String>,
        mode: TopicMode,
    },
    BulkUpdateTopics {
        full_names: Vec<String>,
        topics: Vec<String>,
        mode: TopicMode,
    },
    UpdateRepoTeam {
        full_name: String,
        org: String,
        slug: String,
        permission: TeamPermission,
        remove: bool,
    },
    UpdateRepoCustomProperties {
        org: String,
        name: String,
        properties: BTreeMap<String, PropertyValue>,
    },
    DeleteBranchProtection {
        full_name: String,
        branch: String,
    },
    DeleteRuleset {
        full_name: String,
        ruleset_id: i64,
    },
    GetOrgCustomPropertyDefinitions {
        org: String,
    },
}

type FailWhen = Box<dyn Fn(&RemoteCall) -> bool + Send + Sync>;

#[derive(Default)]
struct Recorded {
    calls: Vec<RemoteCall>,
    status: ConnectionStatus,
    organizations: Vec<String>,
    repos: BTreeMap<String, Vec<Repository>>,
    teams: BTreeMap<String, Option<Vec<Team>>>,
    definitions: BTreeMap<String, Vec<PropertyDefinition>>,
}

impl Recorded {
    fn repo_mut(&mut self, full_name: &str) -> Option<&mut Repository> {
        self.repos
            .values_mut()
            .flat_map(|repos| repos.iter_mut())
            .find(|repo| repo.full_name == full_name)
    }

    fn connect(&mut self) -> ConnectionStatus {
        let previous = self.status.selected_org.clone();
        let selected = previous
            .filter(|org| self.organizations.contains(org))
            .or_else(|| {
                self.status
                    .default_org
                    .clone()
                    .filter(|org| self.organizations.contains(org))
            })
            .or_else(|| self.organizations.first().cloned());
        self.status.is_connected = true;
        self.status.organizations = self.organizations.clone();
        self.status.selected_org = selected;
        self.status.clone()
    }
}

pub struct RecordingGitHub {
    state: Mutex<Recorded>,
    fail_when: Option<FailWhen>,
    events: broadcast::Sender<RemoteEvent>,
}

impl Default for RecordingGitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGitHub {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(Recorded::default()),
            fail_when: None,
            events,
        }
    }

    /// Organizations visible after login; the first one is the user's own
    /// account.
    pub fn with_organizations(self, organizations: &[&str]) -> Self {
        self.state.lock().organizations = organizations.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_repos(self, org: &str, repos: Vec<Repository>) -> Self {
        self.state.lock().repos.insert(org.to_string(), repos);
        self
    }

    pub fn with_teams(self, org: &str, teams: Option<Vec<Team>>) -> Self {
        self.state.lock().teams.insert(org.to_string(), teams);
        self
    }

    pub fn with_property_definitions(self, org: &str, definitions: Vec<PropertyDefinition>) -> Self {
        self.state
            .lock()
            .definitions
            .insert(org.to_string(), definitions);
        self
    }

    /// Scripts failures: any call for which `predicate` returns true fails
    /// after being recorded.
    pub fn fail_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RemoteCall) -> bool + Send + Sync + 'static,
    {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn repos(&self, org: &str) -> Vec<Repository> {
        self.state.lock().repos.get(org).cloned().unwrap_or_default()
    }

    /// Publishes an event as if the remote had pushed it.
    pub fn emit(&self, event: RemoteEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn record(&self, call: RemoteCall) -> Result<()> {
        let fails = self.fail_when.as_ref().is_some_and(|predicate| predicate(&call));
        self.state.lock().calls.push(call.clone());
        if fails {
            bail!("scripted failure for {call:?}");
        }
        Ok(())
    }

    fn emit_lists(&self, org: &str) {
        let (repos, teams) = {
            let state = self.state.lock();
            (
                state.repos.get(org).cloned().unwrap_or_default(),
                state.teams.get(org).cloned().unwrap_or(Some(Vec::new())),
            )
        };
        self.emit(RemoteEvent::ReposUpdated {
            org: org.to_string(),
            repos,
        });
        self.emit(RemoteEvent::TeamsUpdated {
            org: org.to_string(),
            teams,
        });
    }

    fn emit_status(&self) -> ConnectionStatus {
        let status = self.state.lock().status.clone();
        self.emit(RemoteEvent::StatusUpdated(status.clone()));
        status
    }
}

#[async_trait]
impl GitHubAdmin for RecordingGitHub {
    async fn startup(&self) -> Result<ConnectionStatus> {
        self.record(RemoteCall::Startup)?;
        {
            let mut state = self.state.lock();
            if state.organizations.is_empty() {
                return Ok(state.status.clone());
            }
            state.connect();
        }
        Ok(self.emit_status())
    }

    async fn login(&self, token: &str) -> Result<ConnectionStatus> {
        self.record(RemoteCall::Login {
            token: token.to_string(),
        })?;
        if token.trim().is_empty() {
            bail!("failed to verify token: empty token");
        }
        self.state.lock().connect();
        Ok(self.emit_status())
    }

    async fn logout(&self) -> Result<()> {
        self.record(RemoteCall::Logout)?;
        self.state.lock().status = ConnectionStatus::disconnected();
        self.emit_status();
        Ok(())
    }

    async fn set_organization(&self, org: &str) -> Result<()> {
        self.record(RemoteCall::SetOrganization {
            org: org.to_string(),
        })?;
        self.state.lock().status.selected_org = Some(org.to_string());
        self.emit_status();
        self.emit_lists(org);
        Ok(())
    }

    async fn start_polling(&self) -> Result<()> {
        self.record(RemoteCall::StartPolling)?;
        self.state.lock().status.is_polling = true;
        self.emit_status();
        Ok(())
    }

    async fn stop_polling(&self) -> Result<()> {
        self.record(RemoteCall::StopPolling)?;
        self.state.lock().status.is_polling = false;
        self.emit_status();
        Ok(())
    }

    async fn refresh_repo_list(&self, org: &str) -> Result<()> {
        self.record(RemoteCall::RefreshRepoList {
            org: org.to_string(),
        })?;
        self.emit_lists(org);
        Ok(())
    }

    async fn get_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetails> {
        let full_name = format!("{owner}/{name}");
        self.record(RemoteCall::GetRepoDetails {
            full_name: full_name.clone(),
        })?;
        let mut state = self.state.lock();
        let Some(repo) = state.repo_mut(&full_name) else {
            bail!("repository not found: {full_name}");
        };
        Ok(RepoDetails {
            property_values: repo.custom_properties.clone().unwrap_or_default(),
            team_access: repo.teams.clone().unwrap_or_default(),
            repository: repo.clone(),
            ..Default::default()
        })
    }

    async fn update_repo_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &[String],
        mode: TopicMode,
    ) -> Result<Vec<String>> {
        let full_name = format!("{owner}/{name}");
        self.record(RemoteCall::UpdateRepoTopics {
            full_name: full_name.clone(),
            topics: topics.to_vec(),
            mode,
        })?;
        let mut state = self.state.lock();
        let Some(repo) = state.repo_mut(&full_name) else {
            bail!("repository not found: {full_name}");
        };
        repo.topics = apply_topic_mode(&repo.topics, topics, mode);
        Ok(repo.topics.clone())
    }

    async fn bulk_update_topics(
        &self,
        full_names: &[String],
        topics: &[String],
        mode: TopicMode,
    ) -> Result<()> {
        self.record(RemoteCall::BulkUpdateTopics {
            full_names: full_names.to_vec(),
            topics: topics.to_vec(),
            mode,
        })?;
        let mut state = self.state.lock();
        for full_name in full_names {
            let Some(repo) = state.repo_mut(full_name) else {
                bail!("repository not found: {full_name}");
            };
            repo.topics = apply_topic_mode(&repo.topics, topics, mode);
        }
        Ok(())
    }

    async fn update_repo_team(
        &self,
        owner: &str,
        name: &str,
        org: &str,
        slug: &str,
        permission: TeamPermission,
        remove: bool,
    ) -> Result<()> {
        self.record(RemoteCall::UpdateRepoTeam {
            full_name: format!("{owner}/{name}"),
            org: org.to_string(),
            slug: slug.to_string(),
            permission,
            remove,
        })
    }

    async fn update_repo_custom_properties(
        &self,
        org: &str,
        name: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        self.record(RemoteCall::UpdateRepoCustomProperties {
            org: org.to_string(),
            name: name.to_string(),
            properties: properties.clone(),
        })?;
        let full_name = format!("{org}/{name}");
        if let Some(repo) = self.state.lock().repo_mut(&full_name) {
            let values = repo.custom_properties.get_or_insert_with(BTreeMap::new);
            for (key, value) in properties {
                values.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete_branch_protection(&self, owner: &str, name: &str, branch: &str) -> Result<()> {
        self.record(RemoteCall::DeleteBranchProtection {
            full_name: format!("{owner}/{name}"),
            branch: branch.to_string(),
        })
    }

    async fn delete_ruleset(&self, owner: &str, name: &str, ruleset_id: i64) -> Result<()> {
        self.record(RemoteCall::DeleteRuleset {
            full_name: format!("{owner}/{name}"),
            ruleset_id,
        })
    }

    async fn get_org_custom_property_definitions(
        &self,
        org: &str,
    ) -> Result<Vec<PropertyDefinition>> {
        self.record(RemoteCall::GetOrgCustomPropertyDefinitions {
            org: org.to_string(),
        })?;
        Ok(self
            .state
            .lock()
            .definitions
            .get(org)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteEvent> {
        self.events.subscribe()
    }
}

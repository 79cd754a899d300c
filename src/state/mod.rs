//! Client state held by the store.
//!
//! `domain` mirrors what the remote and the config file say; `ui` is what
//! the operator is doing with it. Both are plain data and cheap to clone,
//! which is what lets the store hand out immutable snapshots.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::application::bulk::BulkReport;
use crate::application::filter::{RepoFilters, TeamFilters, visible_repos, visible_teams};
use crate::application::selection::Selection;
use crate::domain::{
    ConnectionStatus, EntityKind, OrgRepoGroups, OrgTeamGroups, PropertyDefinition, RepoDetails,
    RepoGroups, Repository, Team, TeamGroups,
};
use crate::infra::app_config::Theme;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainState {
    pub status: ConnectionStatus,
    /// Org login -> repositories in the order the remote listed them.
    pub repo_cache: BTreeMap<String, Vec<Repository>>,
    /// Org login -> teams. `None` means the owner has no teams at all.
    pub team_cache: BTreeMap<String, Option<Vec<Team>>>,
    pub fetch_errors: BTreeMap<(String, EntityKind), String>,
    pub last_refreshed: BTreeMap<(String, EntityKind), DateTime<Utc>>,
    pub repo_groups: RepoGroups,
    pub team_groups: TeamGroups,
    pub theme: Theme,
    pub default_org: Option<String>,
    pub config_revision: u64,
}

/// Selections are scoped to one organization; switching org or tab starts
/// both over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub org: Option<String>,
    pub repos: Selection,
    pub teams: Selection,
}

impl Selections {
    pub fn get(&self, kind: EntityKind) -> &Selection {
        match kind {
            EntityKind::Repo => &self.repos,
            EntityKind::Team => &self.teams,
        }
    }

    pub fn get_mut(&mut self, kind: EntityKind) -> &mut Selection {
        match kind {
            EntityKind::Repo => &mut self.repos,
            EntityKind::Team => &mut self.teams,
        }
    }

    pub fn reset(&mut self, org: Option<String>) {
        self.org = org;
        self.repos.clear();
        self.teams.clear();
    }
}

/// The open bulk-edit surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSurface {
    pub definitions: Vec<PropertyDefinition>,
    pub is_loading_definitions: bool,
    pub is_running: bool,
    pub error: Option<String>,
}

/// The open repository details view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsView {
    pub org: String,
    pub full_name: String,
    pub details: Option<RepoDetails>,
    pub is_loading: bool,
    /// A mutation from the details view is in flight.
    pub is_busy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub active_tab: EntityKind,
    pub selections: Selections,
    pub repo_filters: RepoFilters,
    pub team_filters: TeamFilters,
    pub group_error: Option<String>,
    pub is_saving_groups: bool,
    pub bulk: Option<BulkSurface>,
    pub last_bulk_report: Option<BulkReport>,
    /// Failure of the latest bulk run, kept even after its surface is gone.
    pub last_bulk_error: Option<String>,
    pub details: Option<DetailsView>,
    pub is_connecting: bool,
    /// Start polling once a session is established.
    pub auto_poll: bool,
    pub login_error: Option<String>,
    /// Last failure of a session command that has no better home.
    pub session_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub domain: DomainState,
    pub ui: UiState,
}

impl AppState {
    pub fn current_org(&self) -> Option<&str> {
        self.domain.status.selected_org.as_deref()
    }

    pub fn repos(&self) -> &[Repository] {
        self.current_org()
            .and_then(|org| self.domain.repo_cache.get(org))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Teams of the current org; empty when unknown or unsupported.
    pub fn teams(&self) -> &[Team] {
        self.current_org()
            .and_then(|org| self.domain.team_cache.get(org))
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }

    /// False only once the remote has said the current owner has no teams.
    pub fn teams_supported(&self) -> bool {
        self.current_org()
            .and_then(|org| self.domain.team_cache.get(org))
            .is_none_or(Option::is_some)
    }

    pub fn org_repo_groups(&self) -> OrgRepoGroups {
        self.current_org()
            .and_then(|org| self.domain.repo_groups.get(org))
            .cloned()
            .unwrap_or_default()
    }

    pub fn org_team_groups(&self) -> OrgTeamGroups {
        self.current_org()
            .and_then(|org| self.domain.team_groups.get(org))
            .cloned()
            .unwrap_or_default()
    }

    pub fn visible_repos(&self) -> Vec<&Repository> {
        let groups = self
            .current_org()
            .and_then(|org| self.domain.repo_groups.get(org));
        let empty = OrgRepoGroups::new();
        visible_repos(
            self.repos(),
            &self.ui.repo_filters,
            groups.unwrap_or(&empty),
            &self.ui.selections.repos,
        )
    }

    pub fn visible_teams(&self) -> Vec<&Team> {
        let groups = self
            .current_org()
            .and_then(|org| self.domain.team_groups.get(org));
        let empty = OrgTeamGroups::new();
        visible_teams(
            self.teams(),
            &self.ui.team_filters,
            groups.unwrap_or(&empty),
            &self.ui.selections.teams,
        )
    }

    /// Keys of the currently filtered rows of `kind`, in display order.
    pub fn visible_keys(&self, kind: EntityKind) -> Vec<String> {
        match kind {
            EntityKind::Repo => self
                .visible_repos()
                .into_iter()
                .map(|repo| repo.full_name.clone())
                .collect(),
            EntityKind::Team => self
                .visible_teams()
                .into_iter()
                .map(|team| team.slug.clone())
                .collect(),
        }
    }

    /// Selected keys of `kind` in the order they were checked.
    pub fn selected_keys(&self, kind: EntityKind) -> Vec<String> {
        self.ui.selections.get(kind).to_vec()
    }

    /// When the list of `kind` for the current org last arrived.
    pub fn last_refreshed(&self, kind: EntityKind) -> Option<DateTime<Utc>> {
        let org = self.current_org()?;
        self.domain
            .last_refreshed
            .get(&(org.to_string(), kind))
            .copied()
    }

    pub fn fetch_error(&self, kind: EntityKind) -> Option<&str> {
        let org = self.current_org()?;
        self.domain
            .fetch_errors
            .get(&(org.to_string(), kind))
            .map(String::as_str)
    }
}

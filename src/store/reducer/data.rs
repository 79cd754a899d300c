use chrono::Utc;

use super::super::action::DataAction;
use super::super::command::Command;
use super::{prune_group_filters, sync_selection_scope};
use crate::domain::EntityKind;
use crate::infra::app_config::AppConfig;
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: DataAction) -> Vec<Command> {
    match action {
        DataAction::UpdateConnectionStatus(update) => {
            update.merge_into(&mut state.domain.status);
            if !state.domain.status.is_connected {
                state.domain.repo_cache.clear();
                state.domain.team_cache.clear();
            }
            sync_selection_scope(state);
            prune_group_filters(state);
        }
        DataAction::UpdateRepoList { org, repos } => {
            let key = (org.clone(), EntityKind::Repo);
            state.domain.repo_cache.insert(org, repos);
            state.domain.fetch_errors.remove(&key);
            state.domain.last_refreshed.insert(key, Utc::now());
        }
        DataAction::UpdateTeamList { org, teams } => {
            let key = (org.clone(), EntityKind::Team);
            let unsupported = teams.is_none();
            let is_current = state.current_org() == Some(org.as_str());
            state.domain.team_cache.insert(org, teams);
            state.domain.fetch_errors.remove(&key);
            state.domain.last_refreshed.insert(key, Utc::now());

            if unsupported && is_current && state.ui.active_tab == EntityKind::Team {
                state.ui.active_tab = EntityKind::Repo;
                state.ui.selections.teams.clear();
            }
        }
        DataAction::SetFetchError { org, kind, error } => {
            state.domain.fetch_errors.insert((org, kind), error);
        }
        DataAction::UpdateRepoGroups(groups) => {
            state.domain.repo_groups = groups;
            prune_group_filters(state);
        }
        DataAction::UpdateTeamGroups(groups) => {
            state.domain.team_groups = groups;
            prune_group_filters(state);
        }
        DataAction::UpdateRepoFields {
            org,
            full_name,
            fields,
        } => {
            if let Some(repo) = state
                .domain
                .repo_cache
                .get_mut(&org)
                .and_then(|repos| repos.iter_mut().find(|repo| repo.full_name == full_name))
            {
                repo.apply_fields(fields);
            }
        }
        DataAction::UpdateConfig(config) => apply_config(state, config),
    }
    Vec::new()
}

pub(super) fn apply_config(state: &mut AppState, config: AppConfig) {
    if config.revision < state.domain.config_revision {
        log::debug!(
            "ignoring config revision {} older than {}",
            config.revision,
            state.domain.config_revision
        );
        return;
    }
    state.domain.theme = config.theme;
    state.domain.status.default_org = config.default_org.clone();
    state.domain.default_org = config.default_org;
    state.domain.repo_groups = config.repo_groups;
    state.domain.team_groups = config.team_groups;
    state.domain.config_revision = config.revision;
    prune_group_filters(state);
}

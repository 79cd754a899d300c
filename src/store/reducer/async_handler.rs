use super::super::action::{AsyncAction, DataAction};
use super::super::command::Command;
use super::data::{self, apply_config};
use super::prune_group_filters;
use crate::domain::{BulkError, ConnectionStatus, GroupError};
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: AsyncAction) -> Vec<Command> {
    match action {
        AsyncAction::ConfigLoaded(result) => {
            match result {
                Ok(config) => apply_config(state, config),
                Err(err) => state.ui.session_error = Some(err),
            }
            Vec::new()
        }
        AsyncAction::SessionStarted(result) => {
            state.ui.is_connecting = false;
            match result {
                Ok(status) => {
                    state.ui.login_error = None;
                    let connected = status.is_connected;
                    data::reduce(state, DataAction::UpdateConnectionStatus(status.into()));
                    if connected && state.ui.auto_poll {
                        vec![Command::StartPolling]
                    } else {
                        Vec::new()
                    }
                }
                Err(err) => {
                    state.ui.login_error = Some(err);
                    Vec::new()
                }
            }
        }
        AsyncAction::LoggedOut(result) => {
            match result {
                Ok(()) => {
                    data::reduce(
                        state,
                        DataAction::UpdateConnectionStatus(ConnectionStatus::disconnected().into()),
                    );
                }
                Err(err) => state.ui.session_error = Some(err),
            }
            Vec::new()
        }
        AsyncAction::SessionCommandFinished(result) => {
            if let Err(err) = result {
                state.ui.session_error = Some(err);
            }
            Vec::new()
        }
        AsyncAction::GroupsPersisted(result) => {
            state.ui.is_saving_groups = false;
            match result {
                Ok(changed) => {
                    state.ui.group_error = None;
                    state.domain.repo_groups = changed.repo_groups;
                    state.domain.team_groups = changed.team_groups;
                    state.domain.config_revision = changed.revision;
                    prune_group_filters(state);
                    Vec::new()
                }
                Err(err) => {
                    state.ui.group_error = Some(err.to_string());
                    if matches!(err, GroupError::Conflict { .. }) {
                        vec![Command::LoadConfig]
                    } else {
                        Vec::new()
                    }
                }
            }
        }
        AsyncAction::PropertyDefinitionsLoaded { org, result } => {
            if state.current_org() != Some(org.as_str()) {
                return Vec::new();
            }
            if let Some(surface) = state.ui.bulk.as_mut() {
                surface.is_loading_definitions = false;
                match result {
                    Ok(definitions) => surface.definitions = definitions,
                    // Personal accounts have no property schema.
                    Err(err) => log::debug!("no custom property definitions for {org}: {err}"),
                }
            }
            Vec::new()
        }
        AsyncAction::BulkFinished { org, result } => match result {
            Ok(report) => {
                state.ui.bulk = None;
                state.ui.last_bulk_report = Some(report);
                state.ui.last_bulk_error = None;
                vec![Command::RefreshOrg { org }]
            }
            Err(err) => {
                if err.is_validation() {
                    log::debug!("bulk run on {org} rejected: {err}");
                } else {
                    log::warn!("bulk run on {org} failed: {err}");
                }
                let applied_some = matches!(err, BulkError::Aborted { .. });
                let message = err.to_string();
                if let Some(surface) = state.ui.bulk.as_mut() {
                    surface.is_running = false;
                    surface.error = Some(message.clone());
                }
                state.ui.last_bulk_error = Some(message);
                if applied_some {
                    vec![Command::RefreshOrg { org }]
                } else {
                    Vec::new()
                }
            }
        },
        AsyncAction::RepoDetailsLoaded { full_name, result } => {
            let Some(view) = state
                .ui
                .details
                .as_mut()
                .filter(|view| view.full_name == full_name)
            else {
                return Vec::new();
            };
            view.is_loading = false;
            view.is_busy = false;
            match result {
                Ok(details) => {
                    let fields = details.cache_fields();
                    let org = view.org.clone();
                    view.details = Some(details);
                    view.error = None;
                    data::reduce(
                        state,
                        DataAction::UpdateRepoFields {
                            org,
                            full_name,
                            fields,
                        },
                    );
                }
                Err(err) => view.error = Some(err),
            }
            Vec::new()
        }
    }
}

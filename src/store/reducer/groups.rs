use super::super::action::GroupAction;
use super::super::command::{Command, GroupsUpdate};
use crate::application::groups;
use crate::domain::{EntityKind, GroupError, OrgRepoGroups, OrgTeamGroups, TeamGroupMember};
use crate::state::AppState;

/// Validates a group mutation against the current org's groups and, when it
/// is valid, asks the runtime to persist it. Groups in state only change once
/// the write has gone through.
pub fn reduce(state: &mut AppState, action: GroupAction) -> Vec<Command> {
    if matches!(action, GroupAction::DismissError) {
        state.ui.group_error = None;
        return Vec::new();
    }
    let Some(org) = state.current_org().map(str::to_string) else {
        return reject(state, GroupError::NoOrganization);
    };

    let update = match action {
        GroupAction::Create { kind, name } => {
            let selected = state.selected_keys(kind);
            match kind {
                EntityKind::Repo => repo_update(state, |g| groups::create(g, &name, &selected)),
                EntityKind::Team => team_update(state, |g| {
                    groups::create::<TeamGroupMember>(g, &name, &selected)
                }),
            }
        }
        GroupAction::AddSelected { kind, name } => {
            let selected = state.selected_keys(kind);
            match kind {
                EntityKind::Repo => {
                    repo_update(state, |g| groups::add_selected(g, &name, &selected))
                }
                EntityKind::Team => team_update(state, |g| {
                    groups::add_selected::<TeamGroupMember>(g, &name, &selected)
                }),
            }
        }
        GroupAction::RemoveSelected { kind, name } => {
            let selected = state.selected_keys(kind);
            match kind {
                EntityKind::Repo => {
                    repo_update(state, |g| groups::remove_selected(g, &name, &selected))
                }
                EntityKind::Team => team_update(state, |g| {
                    groups::remove_selected::<TeamGroupMember>(g, &name, &selected)
                }),
            }
        }
        GroupAction::Delete { kind, name } => match kind {
            EntityKind::Repo => repo_update(state, |g| groups::delete(g, &name)),
            EntityKind::Team => team_update(state, |g| groups::delete(g, &name)),
        },
        GroupAction::SetTeamPermission {
            group,
            slug,
            permission,
        } => team_update(state, |g| {
            groups::set_team_permission(g, &group, &slug, permission)
        }),
        GroupAction::RemoveTeam { group, slug } => {
            team_update(state, |g| groups::remove_member(g, &group, &slug))
        }
        GroupAction::RemoveRepo { group, full_name } => {
            repo_update(state, |g| groups::remove_member(g, &group, &full_name))
        }
        GroupAction::DismissError => return Vec::new(),
    };

    match update {
        Ok(update) => {
            state.ui.group_error = None;
            state.ui.is_saving_groups = true;
            vec![Command::PersistGroups { org, update }]
        }
        Err(err) => reject(state, err),
    }
}

fn reject(state: &mut AppState, err: GroupError) -> Vec<Command> {
    if err.is_validation() {
        log::debug!("group change rejected: {err}");
    } else {
        log::warn!("group change failed: {err}");
    }
    state.ui.group_error = Some(err.to_string());
    Vec::new()
}

fn repo_update(
    state: &AppState,
    apply: impl FnOnce(&OrgRepoGroups) -> Result<OrgRepoGroups, GroupError>,
) -> Result<GroupsUpdate, GroupError> {
    let expected = state.org_repo_groups();
    let next = apply(&expected)?;
    Ok(GroupsUpdate::Repos { expected, next })
}

fn team_update(
    state: &AppState,
    apply: impl FnOnce(&OrgTeamGroups) -> Result<OrgTeamGroups, GroupError>,
) -> Result<GroupsUpdate, GroupError> {
    let expected = state.org_team_groups();
    let next = apply(&expected)?;
    Ok(GroupsUpdate::Teams { expected, next })
}

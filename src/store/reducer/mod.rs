mod async_handler;
mod bulk;
mod data;
mod details;
mod filter;
mod groups;
mod navigation;
mod selection;
mod session;

#[cfg(test)]
mod tests;

use super::action::Action;
use super::command::Command;
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: Action) -> Vec<Command> {
    match action {
        Action::Data(action) => data::reduce(state, action),
        Action::Navigation(action) => navigation::reduce(state, action),
        Action::Session(action) => session::reduce(state, action),
        Action::Selection(action) => selection::reduce(state, action),
        Action::Filter(action) => filter::reduce(state, action),
        Action::Group(action) => groups::reduce(state, action),
        Action::Bulk(action) => bulk::reduce(state, action),
        Action::Details(action) => details::reduce(state, action),
        Action::Async(action) => async_handler::reduce(state, action),
    }
}

/// Selections belong to one organization. Whenever the selected org moves,
/// from here or from the remote, both selections start over.
fn sync_selection_scope(state: &mut AppState) {
    let org = state.current_org().map(str::to_string);
    if state.ui.selections.org != org {
        state.ui.selections.reset(org);
    }
}

/// Drops group filters that point at groups which no longer exist.
fn prune_group_filters(state: &mut AppState) {
    let repo_groups = state.org_repo_groups();
    if state
        .ui
        .repo_filters
        .group
        .as_ref()
        .is_some_and(|group| !repo_groups.contains_key(group))
    {
        state.ui.repo_filters.group = None;
    }

    let team_groups = state.org_team_groups();
    if state
        .ui
        .team_filters
        .group
        .as_ref()
        .is_some_and(|group| !team_groups.contains_key(group))
    {
        state.ui.team_filters.group = None;
    }
}

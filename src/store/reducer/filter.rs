use super::super::action::FilterAction;
use super::super::command::Command;
use crate::domain::EntityKind;
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: FilterAction) -> Vec<Command> {
    match action {
        FilterAction::SetSearch { kind, search } => match kind {
            EntityKind::Repo => state.ui.repo_filters.search = search,
            EntityKind::Team => state.ui.team_filters.search = search,
        },
        FilterAction::SetRepoToggle { toggle, on } => state.ui.repo_filters.set(toggle, on),
        FilterAction::SetTeamOnlySelected(on) => state.ui.team_filters.only_selected = on,
        FilterAction::SetGroup { kind, group } => match kind {
            EntityKind::Repo => {
                let known = state.org_repo_groups();
                state.ui.repo_filters.group = group.filter(|name| known.contains_key(name));
            }
            EntityKind::Team => {
                let known = state.org_team_groups();
                state.ui.team_filters.group = group.filter(|name| known.contains_key(name));
            }
        },
    }
    Vec::new()
}

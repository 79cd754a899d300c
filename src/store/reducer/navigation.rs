use super::super::action::NavigationAction;
use super::super::command::Command;
use crate::domain::EntityKind;
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: NavigationAction) -> Vec<Command> {
    match action {
        NavigationAction::SelectOrganization(org) => {
            state.domain.status.selected_org = Some(org.clone());
            state.ui.selections.reset(Some(org.clone()));
            state.ui.repo_filters.group = None;
            state.ui.team_filters.group = None;
            state.ui.details = None;
            state.ui.bulk = None;
            if state.ui.active_tab == EntityKind::Team && !state.teams_supported() {
                state.ui.active_tab = EntityKind::Repo;
            }
            vec![Command::SetOrganization { org }]
        }
        NavigationAction::SwitchTab(kind) => {
            state.ui.active_tab = if kind == EntityKind::Team && !state.teams_supported() {
                EntityKind::Repo
            } else {
                kind
            };
            let org = state.current_org().map(str::to_string);
            state.ui.selections.reset(org);
            Vec::new()
        }
    }
}

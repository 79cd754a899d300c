use super::super::action::SelectionAction;
use super::super::command::Command;
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: SelectionAction) -> Vec<Command> {
    let kind = state.ui.active_tab;
    match action {
        SelectionAction::Toggle {
            key,
            checked,
            extend,
        } => {
            let visible = state.visible_keys(kind);
            state
                .ui
                .selections
                .get_mut(kind)
                .toggle(&key, checked, extend, &visible);
        }
        SelectionAction::SetAll { checked } => {
            let visible = state.visible_keys(kind);
            state.ui.selections.get_mut(kind).set_all(checked, &visible);
        }
        SelectionAction::Clear => state.ui.selections.get_mut(kind).clear(),
    }
    Vec::new()
}

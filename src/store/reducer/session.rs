use super::super::action::SessionAction;
use super::super::command::Command;
use crate::state::AppState;

pub fn reduce(state: &mut AppState, action: SessionAction) -> Vec<Command> {
    match action {
        SessionAction::Startup => {
            state.ui.is_connecting = true;
            state.ui.login_error = None;
            vec![Command::Startup]
        }
        SessionAction::Login { token } => {
            state.ui.is_connecting = true;
            state.ui.login_error = None;
            vec![Command::Login { token }]
        }
        SessionAction::Logout => vec![Command::Logout],
        SessionAction::StartPolling => vec![Command::StartPolling],
        SessionAction::StopPolling => vec![Command::StopPolling],
        SessionAction::RefreshOrg => match state.current_org() {
            Some(org) => vec![Command::RefreshOrg {
                org: org.to_string(),
            }],
            None => Vec::new(),
        },
    }
}

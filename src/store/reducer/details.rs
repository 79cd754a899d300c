use super::super::action::DetailsAction;
use super::super::command::{Command, RepoMutation};
use crate::application::topics::TopicMode;
use crate::domain::TeamPermission;
use crate::state::{AppState, DetailsView};

pub fn reduce(state: &mut AppState, action: DetailsAction) -> Vec<Command> {
    match action {
        DetailsAction::Open { full_name } => {
            let Some(org) = state.current_org().map(str::to_string) else {
                return Vec::new();
            };
            state.ui.details = Some(DetailsView {
                org,
                full_name: full_name.clone(),
                is_loading: true,
                ..Default::default()
            });
            vec![Command::LoadRepoDetails { full_name }]
        }
        DetailsAction::Close => {
            state.ui.details = None;
            Vec::new()
        }
        DetailsAction::Reload => match state.ui.details.as_mut() {
            Some(view) => {
                view.is_loading = true;
                vec![Command::LoadRepoDetails {
                    full_name: view.full_name.clone(),
                }]
            }
            None => Vec::new(),
        },
        DetailsAction::AddTopic(topic) => {
            let topic = topic.trim().to_lowercase();
            if topic.is_empty() {
                return Vec::new();
            }
            mutate(
                state,
                RepoMutation::Topics {
                    topics: vec![topic],
                    mode: TopicMode::Add,
                },
            )
        }
        DetailsAction::RemoveTopic(topic) => mutate(
            state,
            RepoMutation::Topics {
                topics: vec![topic],
                mode: TopicMode::Remove,
            },
        ),
        DetailsAction::SetTeamAccess { slug, permission } => mutate(
            state,
            RepoMutation::Team {
                slug,
                permission,
                remove: false,
            },
        ),
        DetailsAction::RemoveTeam { slug } => mutate(
            state,
            RepoMutation::Team {
                slug,
                permission: TeamPermission::default(),
                remove: true,
            },
        ),
        DetailsAction::SetCustomProperty { name, value } => {
            mutate(state, RepoMutation::CustomProperty { name, value })
        }
        DetailsAction::DeleteBranchProtection { branch } => {
            mutate(state, RepoMutation::DeleteBranchProtection { branch })
        }
        DetailsAction::DeleteRuleset { ruleset_id } => {
            mutate(state, RepoMutation::DeleteRuleset { ruleset_id })
        }
    }
}

/// One mutation at a time per details view.
fn mutate(state: &mut AppState, mutation: RepoMutation) -> Vec<Command> {
    let Some(view) = state.ui.details.as_mut() else {
        return Vec::new();
    };
    if view.is_busy {
        return Vec::new();
    }
    view.is_busy = true;
    view.error = None;
    vec![Command::MutateRepo {
        org: view.org.clone(),
        full_name: view.full_name.clone(),
        mutation,
    }]
}

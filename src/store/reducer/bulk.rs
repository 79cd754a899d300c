use super::super::action::{BulkAction, BulkRequest};
use super::super::command::Command;
use crate::application::bulk::BulkOperation;
use crate::domain::{BulkError, EntityKind};
use crate::state::{AppState, BulkSurface};

pub fn reduce(state: &mut AppState, action: BulkAction) -> Vec<Command> {
    match action {
        BulkAction::Open => {
            let Some(org) = state.current_org().map(str::to_string) else {
                return Vec::new();
            };
            state.ui.bulk = Some(BulkSurface {
                is_loading_definitions: true,
                ..Default::default()
            });
            vec![Command::LoadPropertyDefinitions { org }]
        }
        BulkAction::Close => {
            state.ui.bulk = None;
            Vec::new()
        }
        BulkAction::Submit(request) => submit(state, request),
    }
}

fn submit(state: &mut AppState, request: BulkRequest) -> Vec<Command> {
    if state.ui.bulk.as_ref().is_some_and(|surface| surface.is_running) {
        return Vec::new();
    }
    let prepared = prepare(state, request);
    let surface = state.ui.bulk.get_or_insert_with(BulkSurface::default);
    match prepared {
        Ok((org, targets, operation)) => {
            surface.is_running = true;
            surface.error = None;
            state.ui.last_bulk_error = None;
            vec![Command::RunBulk {
                org,
                kind: EntityKind::Repo,
                targets,
                operation,
            }]
        }
        Err(err) => {
            surface.error = Some(err.to_string());
            Vec::new()
        }
    }
}

fn prepare(
    state: &AppState,
    request: BulkRequest,
) -> Result<(String, Vec<String>, BulkOperation), BulkError> {
    let org = state
        .current_org()
        .map(str::to_string)
        .ok_or(BulkError::NoOrganization)?;
    let targets = state.selected_keys(EntityKind::Repo);
    if targets.is_empty() {
        return Err(BulkError::NoTargets);
    }

    let operation = match request {
        BulkRequest::Topics { topics, mode } => BulkOperation::Topics { topics, mode },
        BulkRequest::Team {
            slug,
            permission,
            remove,
        } => BulkOperation::Team {
            slug,
            permission,
            remove,
        },
        BulkRequest::TeamGroup { group, remove } => {
            let members = state
                .org_team_groups()
                .remove(&group)
                .filter(|members| !members.is_empty())
                .ok_or_else(|| BulkError::EmptyGroup(group.clone()))?;
            BulkOperation::TeamGroup {
                group,
                members,
                remove,
            }
        }
        BulkRequest::CustomProperties { properties } => {
            BulkOperation::CustomProperties { properties }
        }
    };
    Ok((org, targets, operation))
}

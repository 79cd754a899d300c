use super::super::action::{
    Action, AsyncAction, BulkAction, BulkRequest, DataAction, FilterAction, GroupAction,
    NavigationAction, SelectionAction,
};
use super::super::command::{Command, GroupsUpdate};
use super::super::GroupsChanged;
use super::reduce;
use crate::application::topics::TopicMode;
use crate::domain::{
    BulkError, ConnectionStatus, EntityKind, GroupError, RepoFields, Repository, Team,
    TeamGroupMember, TeamPermission,
};
use crate::infra::app_config::AppConfig;
use crate::state::AppState;

fn repo(full_name: &str) -> Repository {
    let (_, name) = full_name.split_once('/').unwrap();
    Repository {
        name: name.into(),
        full_name: full_name.into(),
        can_manage: true,
        ..Default::default()
    }
}

fn connected(org: &str, repos: &[&str]) -> AppState {
    let mut state = AppState::default();
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateConnectionStatus(
            ConnectionStatus {
                is_connected: true,
                organizations: vec!["me".into(), org.into()],
                selected_org: Some(org.into()),
                ..Default::default()
            }
            .into(),
        )),
    );
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateRepoList {
            org: org.into(),
            repos: repos.iter().map(|r| repo(r)).collect(),
        }),
    );
    state
}

fn toggle(state: &mut AppState, key: &str, checked: bool, extend: bool) {
    reduce(
        state,
        Action::Selection(SelectionAction::Toggle {
            key: key.into(),
            checked,
            extend,
        }),
    );
}

fn selected(state: &AppState, kind: EntityKind) -> Vec<String> {
    state.ui.selections.get(kind).to_vec()
}

#[test]
fn shift_click_selects_range_then_plain_click_deselects() {
    let mut state = connected("acme", &["acme/a", "acme/b", "acme/c", "acme/d"]);
    toggle(&mut state, "acme/a", true, false);
    toggle(&mut state, "acme/c", true, true);
    assert_eq!(
        selected(&state, EntityKind::Repo),
        vec!["acme/a", "acme/b", "acme/c"]
    );

    toggle(&mut state, "acme/b", false, false);
    assert_eq!(selected(&state, EntityKind::Repo), vec!["acme/a", "acme/c"]);
}

#[test]
fn org_switch_clears_selection_and_anchor_for_both_kinds() {
    let mut state = connected("acme", &["acme/a", "acme/b"]);
    toggle(&mut state, "acme/a", true, false);
    state.ui.selections.teams.toggle("core", true, false, &["core"]);

    let commands = reduce(
        &mut state,
        Action::Navigation(NavigationAction::SelectOrganization("me".into())),
    );
    assert_eq!(commands, vec![Command::SetOrganization { org: "me".into() }]);
    for kind in [EntityKind::Repo, EntityKind::Team] {
        let selection = state.ui.selections.get(kind);
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
    }
}

#[test]
fn remote_org_change_also_resets_selection() {
    let mut state = connected("acme", &["acme/a"]);
    toggle(&mut state, "acme/a", true, false);
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateConnectionStatus(
            crate::domain::ConnectionStatusUpdate {
                selected_org: Some("me".into()),
                ..Default::default()
            },
        )),
    );
    assert!(state.ui.selections.repos.is_empty());
    assert_eq!(state.ui.selections.org.as_deref(), Some("me"));
}

#[test]
fn disconnect_clears_caches() {
    let mut state = connected("acme", &["acme/a"]);
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateTeamList {
            org: "acme".into(),
            teams: Some(vec![]),
        }),
    );
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateConnectionStatus(
            ConnectionStatus::disconnected().into(),
        )),
    );
    assert!(state.domain.repo_cache.is_empty());
    assert!(state.domain.team_cache.is_empty());
}

#[test]
fn list_update_clears_only_its_fetch_error() {
    let mut state = connected("acme", &[]);
    for kind in [EntityKind::Repo, EntityKind::Team] {
        reduce(
            &mut state,
            Action::Data(DataAction::SetFetchError {
                org: "acme".into(),
                kind,
                error: "boom".into(),
            }),
        );
    }
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateRepoList {
            org: "acme".into(),
            repos: vec![repo("acme/a")],
        }),
    );
    assert_eq!(state.fetch_error(EntityKind::Repo), None);
    assert_eq!(state.fetch_error(EntityKind::Team), Some("boom"));
}

#[test]
fn repo_field_patch_for_unknown_key_is_a_no_op() {
    let mut state = connected("acme", &["acme/a"]);
    let before = state.clone();
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateRepoFields {
            org: "acme".into(),
            full_name: "acme/missing".into(),
            fields: RepoFields::topics(vec!["x".into()]),
        }),
    );
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateRepoFields {
            org: "other".into(),
            full_name: "acme/a".into(),
            fields: RepoFields::topics(vec!["x".into()]),
        }),
    );
    assert_eq!(state, before);

    reduce(
        &mut state,
        Action::Data(DataAction::UpdateRepoFields {
            org: "acme".into(),
            full_name: "acme/a".into(),
            fields: RepoFields::topics(vec!["x".into()]),
        }),
    );
    assert_eq!(state.repos()[0].topics, vec!["x".to_string()]);
}

#[test]
fn unsupported_teams_send_the_tab_back_to_repos() {
    let mut state = connected("me", &["me/a"]);
    reduce(
        &mut state,
        Action::Navigation(NavigationAction::SwitchTab(EntityKind::Team)),
    );
    assert_eq!(state.ui.active_tab, EntityKind::Team);

    reduce(
        &mut state,
        Action::Data(DataAction::UpdateTeamList {
            org: "me".into(),
            teams: None,
        }),
    );
    assert_eq!(state.ui.active_tab, EntityKind::Repo);

    reduce(
        &mut state,
        Action::Navigation(NavigationAction::SwitchTab(EntityKind::Team)),
    );
    assert_eq!(state.ui.active_tab, EntityKind::Repo);
}

#[test]
fn duplicate_group_name_is_rejected_without_a_command() {
    let mut state = connected("acme", &["acme/a", "acme/b"]);
    state
        .domain
        .repo_groups
        .entry("acme".into())
        .or_default()
        .insert("x".into(), vec!["acme/a".into()]);
    toggle(&mut state, "acme/b", true, false);
    let groups_before = state.domain.repo_groups.clone();

    let commands = reduce(
        &mut state,
        Action::Group(GroupAction::Create {
            kind: EntityKind::Repo,
            name: "x".into(),
        }),
    );
    assert!(commands.is_empty());
    assert_eq!(state.domain.repo_groups, groups_before);
    assert_eq!(
        state.ui.group_error,
        Some(GroupError::DuplicateName("x".into()).to_string())
    );
}

#[test]
fn group_create_persists_selection_in_click_order() {
    let mut state = connected("acme", &["acme/z", "acme/a"]);
    toggle(&mut state, "acme/a", true, false);
    toggle(&mut state, "acme/z", true, false);

    let commands = reduce(
        &mut state,
        Action::Group(GroupAction::Create {
            kind: EntityKind::Repo,
            name: " backend ".into(),
        }),
    );
    let [Command::PersistGroups { org, update }] = commands.as_slice() else {
        panic!("expected a persist command, got {commands:?}");
    };
    assert_eq!(org, "acme");
    let GroupsUpdate::Repos { expected, next } = update else {
        panic!("expected a repo update");
    };
    assert!(expected.is_empty());
    assert_eq!(next["backend"], vec!["acme/a", "acme/z"]);
    assert!(state.ui.is_saving_groups);
    // Not applied until the write succeeds.
    assert!(state.domain.repo_groups.is_empty());
}

#[test]
fn deleting_the_filtered_group_clears_the_filter_once_saved() {
    let mut state = connected("acme", &["acme/a"]);
    state
        .domain
        .repo_groups
        .entry("acme".into())
        .or_default()
        .insert("x".into(), vec!["acme/a".into()]);
    reduce(
        &mut state,
        Action::Filter(FilterAction::SetGroup {
            kind: EntityKind::Repo,
            group: Some("x".into()),
        }),
    );
    assert_eq!(state.ui.repo_filters.group.as_deref(), Some("x"));

    let commands = reduce(
        &mut state,
        Action::Group(GroupAction::Delete {
            kind: EntityKind::Repo,
            name: "x".into(),
        }),
    );
    assert_eq!(commands.len(), 1);

    let mut repo_groups = state.domain.repo_groups.clone();
    repo_groups.insert("acme".into(), Default::default());
    reduce(
        &mut state,
        Action::Async(AsyncAction::GroupsPersisted(Ok(GroupsChanged {
            org: "acme".into(),
            repo_groups,
            team_groups: Default::default(),
            revision: 4,
        }))),
    );
    assert_eq!(state.ui.repo_filters.group, None);
    assert_eq!(state.domain.config_revision, 4);
    assert!(!state.ui.is_saving_groups);
}

#[test]
fn persist_conflict_reloads_config() {
    let mut state = connected("acme", &[]);
    state.ui.is_saving_groups = true;
    let commands = reduce(
        &mut state,
        Action::Async(AsyncAction::GroupsPersisted(Err(GroupError::Conflict {
            org: "acme".into(),
        }))),
    );
    assert_eq!(commands, vec![Command::LoadConfig]);
    assert!(state.ui.group_error.is_some());
    assert!(!state.ui.is_saving_groups);
}

#[test]
fn stale_config_is_ignored() {
    let mut state = AppState::default();
    let mut config = AppConfig {
        revision: 3,
        default_org: Some("acme".into()),
        ..Default::default()
    };
    reduce(&mut state, Action::Data(DataAction::UpdateConfig(config.clone())));
    assert_eq!(state.domain.config_revision, 3);

    config.revision = 2;
    config.default_org = Some("other".into());
    reduce(&mut state, Action::Data(DataAction::UpdateConfig(config)));
    assert_eq!(state.domain.default_org.as_deref(), Some("acme"));
}

#[test]
fn bulk_submit_resolves_team_group_members() {
    let mut state = connected("acme", &["acme/a", "acme/b"]);
    state.domain.team_groups.entry("acme".into()).or_default().insert(
        "core".into(),
        vec![
            TeamGroupMember::new("one", TeamPermission::Pull),
            TeamGroupMember::new("two", TeamPermission::Admin),
        ],
    );
    reduce(&mut state, Action::Bulk(BulkAction::Open));
    toggle(&mut state, "acme/b", true, false);

    let commands = reduce(
        &mut state,
        Action::Bulk(BulkAction::Submit(BulkRequest::TeamGroup {
            group: "core".into(),
            remove: false,
        })),
    );
    let [Command::RunBulk { targets, operation, .. }] = commands.as_slice() else {
        panic!("expected a bulk run, got {commands:?}");
    };
    assert_eq!(targets, &vec!["acme/b".to_string()]);
    assert!(matches!(
        operation,
        crate::application::bulk::BulkOperation::TeamGroup { members, .. } if members.len() == 2
    ));
    assert!(state.ui.bulk.as_ref().unwrap().is_running);

    // A second submit while running is ignored.
    let commands = reduce(
        &mut state,
        Action::Bulk(BulkAction::Submit(BulkRequest::Topics {
            topics: vec!["x".into()],
            mode: TopicMode::Add,
        })),
    );
    assert!(commands.is_empty());
}

#[test]
fn bulk_submit_without_selection_stays_local() {
    let mut state = connected("acme", &["acme/a"]);
    reduce(&mut state, Action::Bulk(BulkAction::Open));
    let commands = reduce(
        &mut state,
        Action::Bulk(BulkAction::Submit(BulkRequest::Topics {
            topics: vec!["x".into()],
            mode: TopicMode::Add,
        })),
    );
    assert!(commands.is_empty());
    let surface = state.ui.bulk.as_ref().unwrap();
    assert_eq!(surface.error, Some(BulkError::NoTargets.to_string()));
    assert!(!surface.is_running);
}

#[test]
fn aborted_bulk_keeps_surface_open_and_still_refreshes() {
    let mut state = connected("acme", &["acme/a"]);
    reduce(&mut state, Action::Bulk(BulkAction::Open));
    state.ui.bulk.as_mut().unwrap().is_running = true;

    let commands = reduce(
        &mut state,
        Action::Async(AsyncAction::BulkFinished {
            org: "acme".into(),
            result: Err(BulkError::Aborted {
                failed_step: "grant team two admin on acme/a".into(),
                completed: 1,
                total: 3,
                message: "forbidden".into(),
            }),
        }),
    );
    assert_eq!(commands, vec![Command::RefreshOrg { org: "acme".into() }]);
    let surface = state.ui.bulk.as_ref().unwrap();
    assert!(!surface.is_running);
    assert!(surface.error.as_deref().unwrap().contains("forbidden"));
}

#[test]
fn bulk_failure_after_org_switch_is_still_reported() {
    let mut state = connected("acme", &["acme/a"]);
    reduce(&mut state, Action::Bulk(BulkAction::Open));
    toggle(&mut state, "acme/a", true, false);
    reduce(
        &mut state,
        Action::Bulk(BulkAction::Submit(BulkRequest::Topics {
            topics: vec!["x".into()],
            mode: TopicMode::Add,
        })),
    );
    reduce(
        &mut state,
        Action::Navigation(NavigationAction::SelectOrganization("globex".into())),
    );
    assert!(state.ui.bulk.is_none());

    let commands = reduce(
        &mut state,
        Action::Async(AsyncAction::BulkFinished {
            org: "acme".into(),
            result: Err(BulkError::Aborted {
                failed_step: "set topics on acme/a".into(),
                completed: 0,
                total: 1,
                message: "forbidden".into(),
            }),
        }),
    );
    assert_eq!(commands, vec![Command::RefreshOrg { org: "acme".into() }]);
    assert!(state.ui.bulk.is_none());
    assert!(state.ui.last_bulk_error.as_deref().unwrap().contains("forbidden"));

    // The next accepted run starts clean.
    reduce(
        &mut state,
        Action::Navigation(NavigationAction::SelectOrganization("acme".into())),
    );
    reduce(&mut state, Action::Bulk(BulkAction::Open));
    toggle(&mut state, "acme/a", true, false);
    reduce(
        &mut state,
        Action::Bulk(BulkAction::Submit(BulkRequest::Topics {
            topics: vec!["x".into()],
            mode: TopicMode::Add,
        })),
    );
    assert_eq!(state.ui.last_bulk_error, None);
}

#[test]
fn team_search_and_only_selected_narrow_select_all() {
    let mut state = connected("acme", &[]);
    reduce(
        &mut state,
        Action::Data(DataAction::UpdateTeamList {
            org: "acme".into(),
            teams: Some(
                ["platform", "payments", "web"]
                    .iter()
                    .map(|slug| Team {
                        name: slug.to_uppercase(),
                        slug: slug.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            ),
        }),
    );
    reduce(
        &mut state,
        Action::Navigation(NavigationAction::SwitchTab(EntityKind::Team)),
    );
    reduce(
        &mut state,
        Action::Filter(FilterAction::SetSearch {
            kind: EntityKind::Team,
            search: "P".into(),
        }),
    );
    reduce(
        &mut state,
        Action::Selection(SelectionAction::SetAll { checked: true }),
    );
    assert_eq!(
        selected(&state, EntityKind::Team),
        vec!["platform", "payments"]
    );
    assert_eq!(state.ui.selections.teams.anchor(), None);
}

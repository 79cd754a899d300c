//! Integration tests for remote event reconciliation
//! Pushed lists, status, config, and fetch errors all land in the store as data updates

use serde_json::json;
use std::sync::Arc;

use github_admin::domain::{ConnectionStatus, EntityKind, Repository};
use github_admin::infra::app_config::{AppConfig, MemoryConfigStore};
use github_admin::infra::github::RemoteEvent;
use github_admin::infra::github::events::{CONFIG_UPDATED, FETCH_ERROR, REPOS_UPDATED};
use github_admin::infra::github::memory::RecordingGitHub;
use github_admin::store::{Action, SelectionAction, Services, SessionAction, Store};

async fn connected(github: Arc<RecordingGitHub>) -> Store {
    let mut store = Store::new(Services::new(github, Arc::new(MemoryConfigStore::default())))
        .with_auto_poll(false);
    store.dispatch(Action::Session(SessionAction::Startup));
    store.settle().await;
    store
}

fn repo(full_name: &str) -> Repository {
    Repository {
        name: full_name.split('/').next_back().unwrap_or_default().to_string(),
        full_name: full_name.to_string(),
        can_manage: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pushed_lists_replace_the_cache_on_poll() {
    let github = Arc::new(RecordingGitHub::new().with_organizations(&["acme"]));
    let mut store = connected(github.clone()).await;

    github.emit(RemoteEvent::ReposUpdated {
        org: "acme".into(),
        repos: vec![repo("acme/one"), repo("acme/two")],
    });
    assert!(store.poll());
    assert_eq!(store.state().repos().len(), 2);

    github.emit(RemoteEvent::ReposUpdated {
        org: "acme".into(),
        repos: vec![repo("acme/two")],
    });
    store.poll();
    assert_eq!(store.state().repos(), [repo("acme/two")]);
}

#[tokio::test]
async fn test_fetch_error_is_cleared_by_the_next_list() {
    let github = Arc::new(RecordingGitHub::new().with_organizations(&["acme"]));
    let mut store = connected(github).await;

    store
        .ingest_named(
            FETCH_ERROR,
            json!({ "org": "acme", "type": "repos", "error": "rate limited" }),
        )
        .unwrap();
    assert_eq!(store.state().fetch_error(EntityKind::Repo), Some("rate limited"));
    assert_eq!(store.state().fetch_error(EntityKind::Team), None);

    store
        .ingest_named(
            REPOS_UPDATED,
            json!({ "org": "acme", "repos": [{ "name": "api", "full_name": "acme/api" }] }),
        )
        .unwrap();
    assert_eq!(store.state().fetch_error(EntityKind::Repo), None);
    assert_eq!(store.state().repos()[0].full_name, "acme/api");
}

#[tokio::test]
async fn test_remote_org_change_resets_selection() {
    let github = Arc::new(
        RecordingGitHub::new()
            .with_organizations(&["acme", "globex"])
            .with_repos("acme", vec![repo("acme/api")]),
    );
    let mut store = connected(github.clone()).await;
    store.dispatch(Action::Session(SessionAction::RefreshOrg));
    store.settle().await;
    store.dispatch(Action::Selection(SelectionAction::SetAll { checked: true }));
    assert_eq!(store.state().ui.selections.repos.len(), 1);

    github.emit(RemoteEvent::StatusUpdated(ConnectionStatus {
        is_connected: true,
        organizations: vec!["acme".into(), "globex".into()],
        selected_org: Some("globex".into()),
        ..Default::default()
    }));
    store.poll();

    assert_eq!(store.state().current_org(), Some("globex"));
    assert!(store.state().ui.selections.repos.is_empty());
    assert_eq!(store.state().ui.selections.org.as_deref(), Some("globex"));
}

#[tokio::test]
async fn test_config_push_applies_groups_and_ignores_stale_revisions() {
    let github = Arc::new(RecordingGitHub::new().with_organizations(&["acme"]));
    let mut store = connected(github).await;

    let mut config = AppConfig {
        revision: 3,
        ..Default::default()
    };
    config.repo_groups.entry("acme".into()).or_default().insert(
        "web".into(),
        vec!["acme/site".into()],
    );
    store
        .ingest_named(CONFIG_UPDATED, serde_json::to_value(&config).unwrap())
        .unwrap();
    assert_eq!(store.state().domain.config_revision, 3);
    assert!(store.state().org_repo_groups().contains_key("web"));

    let stale = AppConfig {
        revision: 2,
        ..Default::default()
    };
    store
        .ingest_named(CONFIG_UPDATED, serde_json::to_value(&stale).unwrap())
        .unwrap();
    assert!(store.state().org_repo_groups().contains_key("web"));
}

#[tokio::test]
async fn test_unknown_and_malformed_events() {
    let github = Arc::new(RecordingGitHub::new().with_organizations(&["acme"]));
    let mut store = connected(github).await;
    let before = store.snapshot();

    store
        .ingest_named("github:something:else", json!({}))
        .unwrap();
    assert_eq!(*store.snapshot(), *before);

    assert!(store.ingest_named(REPOS_UPDATED, json!({ "repos": [] })).is_err());
}

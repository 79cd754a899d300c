//! Integration tests for the store workflow
//! A session, an org switch, selection, groups, and a bulk run driven end to end

use std::sync::Arc;

use github_admin::application::bulk::{BulkLocks, BulkOrchestrator};
use github_admin::application::topics::TopicMode;
use github_admin::domain::{EntityKind, Repository, Team};
use github_admin::infra::app_config::MemoryConfigStore;
use github_admin::infra::github::memory::{RecordingGitHub, RemoteCall};
use github_admin::store::{
    Action, BulkAction, BulkRequest, FilterAction, GroupAction, NavigationAction,
    SelectionAction, Services, SessionAction, Store,
};

fn repo(org: &str, name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("{org}/{name}"),
        can_manage: true,
        ..Default::default()
    }
}

fn team(slug: &str) -> Team {
    Team {
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        url: String::new(),
        members_count: 3,
    }
}

fn github() -> RecordingGitHub {
    RecordingGitHub::new()
        .with_organizations(&["me", "acme", "globex"])
        .with_repos("me", vec![repo("me", "dotfiles")])
        .with_teams("me", None)
        .with_repos(
            "acme",
            vec![
                repo("acme", "api"),
                repo("acme", "web"),
                repo("acme", "cli"),
                repo("acme", "docs"),
            ],
        )
        .with_teams("acme", Some(vec![team("platform"), team("web-devs")]))
        .with_repos("globex", vec![repo("globex", "plant")])
}

async fn session(github: Arc<RecordingGitHub>) -> Store {
    let mut store = Store::new(Services::new(github, Arc::new(MemoryConfigStore::default())))
        .with_auto_poll(false);
    store.dispatch(Action::Session(SessionAction::Startup));
    store.settle().await;
    store.dispatch(Action::Navigation(NavigationAction::SelectOrganization(
        "acme".into(),
    )));
    store.settle().await;
    store
}

fn toggle(store: &mut Store, key: &str, extend: bool) {
    store.dispatch(Action::Selection(SelectionAction::Toggle {
        key: key.to_string(),
        checked: true,
        extend,
    }));
}

#[tokio::test]
async fn test_group_then_bulk_topics_over_the_group() {
    let github = Arc::new(github());
    let mut store = session(github.clone()).await;
    assert_eq!(store.state().repos().len(), 4);

    // Shift-click from api to cli picks the three rows in between.
    toggle(&mut store, "acme/api", false);
    toggle(&mut store, "acme/cli", true);
    assert_eq!(
        store.state().selected_keys(EntityKind::Repo),
        ["acme/api", "acme/web", "acme/cli"]
    );

    store.dispatch(Action::Group(GroupAction::Create {
        kind: EntityKind::Repo,
        name: "services".into(),
    }));
    store.settle().await;
    assert_eq!(
        store.state().org_repo_groups()["services"],
        ["acme/api", "acme/web", "acme/cli"]
    );

    store.dispatch(Action::Selection(SelectionAction::Clear));
    store.dispatch(Action::Filter(FilterAction::SetGroup {
        kind: EntityKind::Repo,
        group: Some("services".into()),
    }));
    assert_eq!(store.state().visible_repos().len(), 3);
    store.dispatch(Action::Selection(SelectionAction::SetAll { checked: true }));

    github.clear_calls();
    store.dispatch(Action::Bulk(BulkAction::Open));
    store.dispatch(Action::Bulk(BulkAction::Submit(BulkRequest::Topics {
        topics: vec!["backend".into()],
        mode: TopicMode::Add,
    })));
    store.settle().await;

    let state = store.state();
    assert!(state.ui.bulk.is_none());
    assert_eq!(state.ui.last_bulk_report.as_ref().unwrap().calls, 1);
    assert!(github.calls().contains(&RemoteCall::BulkUpdateTopics {
        full_names: vec!["acme/api".into(), "acme/web".into(), "acme/cli".into()],
        topics: vec!["backend".into()],
        mode: TopicMode::Add,
    }));
    // The refresh after the run brought the new topics into the cache.
    let docs = state.repos().iter().find(|r| r.name == "docs").unwrap();
    assert!(docs.topics.is_empty());
    assert!(
        state
            .repos()
            .iter()
            .filter(|r| r.name != "docs")
            .all(|r| r.topics == ["backend"])
    );
}

#[tokio::test]
async fn test_switching_org_starts_a_fresh_selection() {
    let mut store = session(Arc::new(github())).await;
    toggle(&mut store, "acme/api", false);
    assert_eq!(store.state().ui.selections.repos.len(), 1);

    store.dispatch(Action::Navigation(NavigationAction::SelectOrganization(
        "globex".into(),
    )));
    assert!(store.state().ui.selections.repos.is_empty());
    store.settle().await;

    assert_eq!(store.state().current_org(), Some("globex"));
    assert_eq!(store.state().repos()[0].full_name, "globex/plant");
}

#[tokio::test]
async fn test_personal_account_has_no_teams_tab() {
    let mut store = session(Arc::new(github())).await;
    store.dispatch(Action::Navigation(NavigationAction::SwitchTab(
        EntityKind::Team,
    )));
    assert_eq!(store.state().ui.active_tab, EntityKind::Team);
    assert_eq!(store.state().teams().len(), 2);

    store.dispatch(Action::Navigation(NavigationAction::SelectOrganization(
        "me".into(),
    )));
    store.settle().await;

    assert!(!store.state().teams_supported());
    assert_eq!(store.state().ui.active_tab, EntityKind::Repo);
    store.dispatch(Action::Navigation(NavigationAction::SwitchTab(
        EntityKind::Team,
    )));
    assert_eq!(store.state().ui.active_tab, EntityKind::Repo);
}

#[tokio::test]
async fn test_snapshots_do_not_see_later_changes() {
    let mut store = session(Arc::new(github())).await;
    let before = store.snapshot();
    toggle(&mut store, "acme/web", false);

    assert!(before.ui.selections.repos.is_empty());
    assert!(store.state().ui.selections.repos.contains("acme/web"));
}

#[tokio::test]
async fn test_bulk_run_is_refused_while_another_holds_the_scope() {
    let github = Arc::new(github());
    let locks = BulkLocks::default();
    let mut services = Services::new(github.clone(), Arc::new(MemoryConfigStore::default()));
    services.bulk = BulkOrchestrator::new(github.clone()).with_locks(locks.clone());
    let mut store = Store::new(services).with_auto_poll(false);
    store.dispatch(Action::Session(SessionAction::Startup));
    store.settle().await;
    store.dispatch(Action::Navigation(NavigationAction::SelectOrganization(
        "acme".into(),
    )));
    store.settle().await;

    let _running = locks.try_acquire("acme", EntityKind::Repo).unwrap();
    toggle(&mut store, "acme/api", false);
    github.clear_calls();
    store.dispatch(Action::Bulk(BulkAction::Submit(BulkRequest::Topics {
        topics: vec!["x".into()],
        mode: TopicMode::Add,
    })));
    store.settle().await;

    let surface = store.state().ui.bulk.as_ref().unwrap();
    assert!(!surface.is_running);
    assert!(surface.error.as_deref().unwrap().contains("already running"));
    assert!(github.calls().is_empty());
}

#[tokio::test]
async fn test_logout_clears_cached_lists() {
    let mut store = session(Arc::new(github())).await;
    assert!(!store.state().repos().is_empty());

    store.dispatch(Action::Session(SessionAction::Logout));
    store.settle().await;

    let state = store.state();
    assert!(!state.domain.status.is_connected);
    assert!(state.domain.repo_cache.is_empty());
    assert!(state.domain.team_cache.is_empty());
}

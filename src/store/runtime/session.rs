use super::super::Store;
use super::super::action::{Action, AsyncAction};
use super::{describe, spawn};

pub fn load_config(store: &mut Store) {
    let config = store.services.config.clone();
    spawn(store, async move {
        let result = config.get().map_err(|err| err.to_string());
        vec![Action::Async(AsyncAction::ConfigLoaded(result))]
    });
}

pub fn startup(store: &mut Store) {
    let config = store.services.config.clone();
    let github = store.services.github.clone();
    spawn(store, async move {
        let config = config.get().map_err(|err| err.to_string());
        let session = github.startup().await.map_err(describe);
        if let Ok(status) = &session {
            log::info!(
                "startup: connected={} organizations={}",
                status.is_connected,
                status.organizations.len()
            );
        }
        vec![
            Action::Async(AsyncAction::ConfigLoaded(config)),
            Action::Async(AsyncAction::SessionStarted(session)),
        ]
    });
}

pub fn login(store: &mut Store, token: String) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = github.login(&token).await.map_err(describe);
        if let Err(err) = &result {
            log::warn!("login failed: {err}");
        }
        vec![Action::Async(AsyncAction::SessionStarted(result))]
    });
}

pub fn logout(store: &mut Store) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = github.logout().await.map_err(describe);
        vec![Action::Async(AsyncAction::LoggedOut(result))]
    });
}

pub fn start_polling(store: &mut Store) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = github.start_polling().await.map_err(describe);
        vec![Action::Async(AsyncAction::SessionCommandFinished(result))]
    });
}

pub fn stop_polling(store: &mut Store) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = github.stop_polling().await.map_err(describe);
        vec![Action::Async(AsyncAction::SessionCommandFinished(result))]
    });
}

pub fn set_organization(store: &mut Store, org: String) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = github.set_organization(&org).await.map_err(describe);
        vec![Action::Async(AsyncAction::SessionCommandFinished(result))]
    });
}

pub fn refresh_org(store: &mut Store, org: String) {
    let github = store.services.github.clone();
    spawn(store, async move {
        log::debug!("refreshing {org}");
        let result = github.refresh_repo_list(&org).await.map_err(describe);
        vec![Action::Async(AsyncAction::SessionCommandFinished(result))]
    });
}

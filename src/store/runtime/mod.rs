pub mod bulk;
pub mod details;
pub mod groups;
pub mod session;


use std::future::Future;
use tokio::sync::mpsc;

use super::action::Action;
use super::command::Command;
use super::{Completion, Store};

pub fn run(store: &mut Store, command: Command) {
    match command {
        Command::LoadConfig => session::load_config(store),
        Command::Startup => session::startup(store),
        Command::Login { token } => session::login(store, token),
        Command::Logout => session::logout(store),
        Command::StartPolling => session::start_polling(store),
        Command::StopPolling => session::stop_polling(store),
        Command::SetOrganization { org } => session::set_organization(store, org),
        Command::RefreshOrg { org } => session::refresh_org(store, org),
        Command::PersistGroups { org, update } => groups::persist_groups(store, org, update),
        Command::LoadPropertyDefinitions { org } => bulk::load_property_definitions(store, org),
        Command::RunBulk {
            org,
            kind,
            targets,
            operation,
        } => bulk::run_bulk(store, org, kind, targets, operation),
        Command::LoadRepoDetails { full_name } => details::load_repo_details(store, full_name),
        Command::MutateRepo {
            org,
            full_name,
            mutation,
        } => details::mutate_repo(store, org, full_name, mutation),
    }
}

/// Runs `task` on tokio; its actions are applied on a later poll.
fn spawn<F>(store: &mut Store, task: F)
where
    F: Future<Output = Vec<Action>> + Send + 'static,
{
    store.in_flight += 1;
    let completion_tx = store.completion_tx.clone();
    tokio::spawn(async move {
        let mut guard = CompletionGuard {
            completion_tx,
            actions: None,
        };
        guard.actions = Some(task.await);
    });
}

/// Sends the task's completion when dropped. A task that panics or is
/// cancelled still reports an empty one, so `in_flight` always drains.
struct CompletionGuard {
    completion_tx: mpsc::UnboundedSender<Completion>,
    actions: Option<Vec<Action>>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let actions = self.actions.take().unwrap_or_else(|| {
            log::error!("runtime task ended without a result");
            Vec::new()
        });
        let _ = self.completion_tx.send(Completion(actions));
    }
}

fn describe(err: anyhow::Error) -> String {
    format!("{err:#}")
}

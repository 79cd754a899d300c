//! Reducer-style state updates + side-effect commands.
//!
//! [`Store::dispatch`] applies an action synchronously and hands any
//! resulting commands to the runtime, which runs them on tokio tasks. Task
//! results and remote push events come back as actions on the next
//! [`Store::poll`]. The store is the only writer of [`AppState`]; readers
//! take cheap [`Store::snapshot`]s.

pub mod action;
pub mod command;
mod reconcile;
mod reducer;
mod runtime;

pub use action::{
    Action, AsyncAction, BulkAction, BulkRequest, DataAction, DetailsAction, FilterAction,
    GroupAction, NavigationAction, SelectionAction, SessionAction,
};
pub use command::{Command, GroupsUpdate, RepoMutation};
pub use reconcile::{Reconciler, to_action};

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crate::application::bulk::BulkOrchestrator;
use crate::domain::{RepoGroups, TeamGroups};
use crate::infra::app_config::ConfigStore;
use crate::infra::github::{GitHubAdmin, RemoteEvent};
use crate::state::AppState;

/// Published after every successful group write.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupsChanged {
    pub org: String,
    pub repo_groups: RepoGroups,
    pub team_groups: TeamGroups,
    pub revision: u64,
}

/// Collaborators the runtime talks to.
#[derive(Clone)]
pub struct Services {
    pub github: Arc<dyn GitHubAdmin>,
    pub config: Arc<dyn ConfigStore>,
    pub bulk: BulkOrchestrator,
}

impl Services {
    pub fn new(github: Arc<dyn GitHubAdmin>, config: Arc<dyn ConfigStore>) -> Self {
        Self {
            bulk: BulkOrchestrator::new(github.clone()),
            github,
            config,
        }
    }
}

/// Actions produced by one finished runtime task.
struct Completion(Vec<Action>);

pub struct Store {
    state: Arc<AppState>,
    services: Services,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    reconciler: Reconciler,
    groups_tx: broadcast::Sender<GroupsChanged>,
}

impl Store {
    pub fn new(services: Services) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (groups_tx, _) = broadcast::channel(16);
        let reconciler = Reconciler::new(services.github.subscribe());
        let mut state = AppState::default();
        state.ui.auto_poll = true;
        Self {
            state: Arc::new(state),
            services,
            completion_tx,
            completion_rx,
            in_flight: 0,
            reconciler,
            groups_tx,
        }
    }

    /// Whether a new session starts the remote polling loop.
    pub fn with_auto_poll(mut self, enabled: bool) -> Self {
        Arc::make_mut(&mut self.state).ui.auto_poll = enabled;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Immutable view of the current state; later dispatches do not affect it.
    pub fn snapshot(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn subscribe_groups(&self) -> broadcast::Receiver<GroupsChanged> {
        self.groups_tx.subscribe()
    }

    pub fn dispatch(&mut self, action: Action) {
        let commands = reducer::reduce(Arc::make_mut(&mut self.state), action);
        for command in commands {
            runtime::run(self, command);
        }
    }

    /// Feeds a named event (e.g. from another process) through the same path
    /// as subscribed remote events.
    pub fn ingest_named(&mut self, name: &str, payload: serde_json::Value) -> Result<()> {
        if let Some(event) = RemoteEvent::from_named(name, payload)? {
            self.dispatch(to_action(event));
        }
        Ok(())
    }

    /// Applies everything that has arrived so far without waiting.
    pub fn poll(&mut self) -> bool {
        let mut any = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.complete(completion);
            any = true;
        }
        for action in self.reconciler.drain() {
            self.dispatch(action);
            any = true;
        }
        any
    }

    /// Waits until no runtime task is outstanding, applying results as they
    /// arrive.
    pub async fn settle(&mut self) {
        loop {
            self.poll();
            if self.in_flight == 0 {
                break;
            }
            match self.completion_rx.recv().await {
                Some(completion) => self.complete(completion),
                None => break,
            }
        }
    }

    fn complete(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        for action in completion.0 {
            self.dispatch(action);
        }
    }
}

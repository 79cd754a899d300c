//! Turns remote push events into store actions.

use tokio::sync::broadcast::{self, error::TryRecvError};

use super::action::{Action, DataAction};
use crate::infra::github::RemoteEvent;

/// Every event maps to exactly one action. List events replace the whole
/// cached list, so they win over any earlier field-level patch.
pub fn to_action(event: RemoteEvent) -> Action {
    let action = match event {
        RemoteEvent::ReposUpdated { org, repos } => DataAction::UpdateRepoList { org, repos },
        RemoteEvent::TeamsUpdated { org, teams } => DataAction::UpdateTeamList { org, teams },
        RemoteEvent::StatusUpdated(status) => DataAction::UpdateConnectionStatus(status.into()),
        RemoteEvent::ConfigUpdated(config) => DataAction::UpdateConfig(config),
        RemoteEvent::FetchError { org, kind, error } => {
            DataAction::SetFetchError { org, kind, error }
        }
    };
    Action::Data(action)
}

/// Non-blocking reader over the remote event channel.
pub struct Reconciler {
    events: broadcast::Receiver<RemoteEvent>,
}

impl Reconciler {
    pub fn new(events: broadcast::Receiver<RemoteEvent>) -> Self {
        Self { events }
    }

    /// Everything received since the last drain, in order.
    pub fn drain(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    log::debug!("remote event {}", event.name());
                    actions.push(to_action(event));
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("remote event stream lagged; {skipped} events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityKind, Repository};

    #[test]
    fn lagged_receiver_keeps_the_newest_events() {
        let (tx, rx) = broadcast::channel(2);
        let mut reconciler = Reconciler::new(rx);
        for org in ["a", "b", "c"] {
            tx.send(RemoteEvent::FetchError {
                org: org.into(),
                kind: EntityKind::Repo,
                error: "x".into(),
            })
            .unwrap();
        }

        let orgs: Vec<String> = reconciler
            .drain()
            .into_iter()
            .map(|action| match action {
                Action::Data(DataAction::SetFetchError { org, .. }) => org,
                other => panic!("unexpected action {other:?}"),
            })
            .collect();
        assert_eq!(orgs, vec!["b", "c"]);
        assert!(reconciler.drain().is_empty());
    }

    #[test]
    fn list_events_become_list_replacements() {
        let action = to_action(RemoteEvent::ReposUpdated {
            org: "acme".into(),
            repos: vec![Repository::default()],
        });
        assert!(matches!(
            action,
            Action::Data(DataAction::UpdateRepoList { ref org, ref repos }) if org == "acme" && repos.len() == 1
        ));
    }
}

use super::super::action::{Action, AsyncAction};
use super::super::command::GroupsUpdate;
use super::super::{GroupsChanged, Store};
use super::spawn;
use crate::domain::{ConfigError, GroupError};
use crate::infra::app_config::ConfigStore;

pub fn persist_groups(store: &mut Store, org: String, update: GroupsUpdate) {
    let config = store.services.config.clone();
    let groups_tx = store.groups_tx.clone();
    spawn(store, async move {
        let result = write_groups(config.as_ref(), &org, update);
        match &result {
            Ok(changed) => {
                log::info!("saved groups for {org} (config revision {})", changed.revision);
                let _ = groups_tx.send(changed.clone());
            }
            Err(err) => log::warn!("failed to save groups for {org}: {err}"),
        }
        vec![Action::Async(AsyncAction::GroupsPersisted(result))]
    });
}

/// Read, compare, overlay, write. Fails with a conflict if the stored groups
/// of `org` are no longer what the change was computed from.
pub fn write_groups(
    config: &dyn ConfigStore,
    org: &str,
    update: GroupsUpdate,
) -> Result<GroupsChanged, GroupError> {
    let conflict = || GroupError::Conflict {
        org: org.to_string(),
    };
    let mut stored = config
        .get()
        .map_err(|err| GroupError::Persist(err.to_string()))?;

    match update {
        GroupsUpdate::Repos { expected, next } => {
            let current = stored.repo_groups.get(org).cloned().unwrap_or_default();
            if current != expected {
                return Err(conflict());
            }
            if next.is_empty() {
                stored.repo_groups.remove(org);
            } else {
                stored.repo_groups.insert(org.to_string(), next);
            }
        }
        GroupsUpdate::Teams { expected, next } => {
            let current = stored.team_groups.get(org).cloned().unwrap_or_default();
            if current != expected {
                return Err(conflict());
            }
            if next.is_empty() {
                stored.team_groups.remove(org);
            } else {
                stored.team_groups.insert(org.to_string(), next);
            }
        }
    }

    let revision = config.save(&stored).map_err(|err| match err {
        ConfigError::Conflict { .. } => conflict(),
        other => GroupError::Persist(other.to_string()),
    })?;
    Ok(GroupsChanged {
        org: org.to_string(),
        repo_groups: stored.repo_groups,
        team_groups: stored.team_groups,
        revision,
    })
}

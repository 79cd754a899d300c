//! Group registry operations.
//!
//! Every operation takes an organization's current group map and returns the
//! map to persist, or a [`GroupError`] leaving the input untouched. Names are
//! matched exactly (case-sensitive) after trimming on create.

use std::collections::BTreeMap;

use crate::domain::{GroupError, OrgTeamGroups, TeamGroupMember, TeamPermission};

/// Something a group can hold, identified by the same key the selection uses.
pub trait GroupMember: Clone + PartialEq {
    fn key(&self) -> &str;
    fn from_selected(key: &str) -> Self;
}

impl GroupMember for String {
    fn key(&self) -> &str {
        self
    }

    fn from_selected(key: &str) -> Self {
        key.to_string()
    }
}

impl GroupMember for TeamGroupMember {
    fn key(&self) -> &str {
        &self.slug
    }

    /// Teams picked from a selection start out with write access.
    fn from_selected(key: &str) -> Self {
        TeamGroupMember::new(key, TeamPermission::Push)
    }
}

type Groups<M> = BTreeMap<String, Vec<M>>;

pub fn create<M: GroupMember>(
    groups: &Groups<M>,
    name: &str,
    selected: &[String],
) -> Result<Groups<M>, GroupError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GroupError::EmptyName);
    }
    if groups.contains_key(name) {
        return Err(GroupError::DuplicateName(name.to_string()));
    }
    if selected.is_empty() {
        return Err(GroupError::EmptySelection);
    }

    let mut members: Vec<M> = Vec::with_capacity(selected.len());
    for key in selected {
        if !members.iter().any(|member| member.key() == key) {
            members.push(M::from_selected(key));
        }
    }

    let mut next = groups.clone();
    next.insert(name.to_string(), members);
    Ok(next)
}

/// Union of the selection into an existing group; existing members keep
/// their position (and, for teams, their permission).
pub fn add_selected<M: GroupMember>(
    groups: &Groups<M>,
    name: &str,
    selected: &[String],
) -> Result<Groups<M>, GroupError> {
    if selected.is_empty() {
        return Err(GroupError::EmptySelection);
    }
    update(groups, name, |members| {
        for key in selected {
            if !members.iter().any(|member| member.key() == key) {
                members.push(M::from_selected(key));
            }
        }
    })
}

pub fn remove_selected<M: GroupMember>(
    groups: &Groups<M>,
    name: &str,
    selected: &[String],
) -> Result<Groups<M>, GroupError> {
    if selected.is_empty() {
        return Err(GroupError::EmptySelection);
    }
    update(groups, name, |members| {
        members.retain(|member| !selected.iter().any(|key| key == member.key()));
    })
}

pub fn remove_member<M: GroupMember>(
    groups: &Groups<M>,
    name: &str,
    key: &str,
) -> Result<Groups<M>, GroupError> {
    update(groups, name, |members| {
        members.retain(|member| member.key() != key);
    })
}

pub fn delete<M: GroupMember>(groups: &Groups<M>, name: &str) -> Result<Groups<M>, GroupError> {
    if !groups.contains_key(name) {
        return Err(GroupError::NotFound(name.to_string()));
    }
    let mut next = groups.clone();
    next.remove(name);
    Ok(next)
}

pub fn set_team_permission(
    groups: &OrgTeamGroups,
    name: &str,
    slug: &str,
    permission: TeamPermission,
) -> Result<OrgTeamGroups, GroupError> {
    update(groups, name, |members| {
        for member in members.iter_mut().filter(|member| member.slug == slug) {
            member.permission = permission;
        }
    })
}

fn update<M: GroupMember>(
    groups: &Groups<M>,
    name: &str,
    apply: impl FnOnce(&mut Vec<M>),
) -> Result<Groups<M>, GroupError> {
    let mut next = groups.clone();
    let members = next
        .get_mut(name)
        .ok_or_else(|| GroupError::NotFound(name.to_string()))?;
    apply(members);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrgRepoGroups;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn repo_groups() -> OrgRepoGroups {
        let mut groups = OrgRepoGroups::new();
        groups.insert("x".into(), keys(&["acme/a"]));
        groups
    }

    #[test]
    fn create_rejects_duplicate_blank_and_empty_selection() {
        let groups = repo_groups();
        assert_eq!(
            create(&groups, "x", &keys(&["acme/b"])),
            Err(GroupError::DuplicateName("x".into()))
        );
        assert_eq!(
            create(&groups, "   ", &keys(&["acme/b"])),
            Err(GroupError::EmptyName)
        );
        assert_eq!(create(&groups, "y", &[]), Err(GroupError::EmptySelection));
        assert_eq!(groups, repo_groups());
    }

    #[test]
    fn create_is_case_sensitive_and_trims() {
        let groups = repo_groups();
        let next = create(&groups, "  X ", &keys(&["acme/b"])).unwrap();
        assert_eq!(next["X"], keys(&["acme/b"]));
        assert_eq!(next["x"], keys(&["acme/a"]));
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let groups = repo_groups();
        let once = add_selected(&groups, "x", &keys(&["acme/a", "acme/b"])).unwrap();
        let twice = add_selected(&once, "x", &keys(&["acme/a", "acme/b"])).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice["x"], keys(&["acme/a", "acme/b"]));

        let removed = remove_selected(&twice, "x", &keys(&["acme/a", "acme/zzz"])).unwrap();
        assert_eq!(removed["x"], keys(&["acme/b"]));
        assert_eq!(
            remove_selected(&removed, "x", &keys(&["acme/a"])).unwrap(),
            removed
        );
    }

    #[test]
    fn team_groups_default_to_push_and_keep_permissions_on_add() {
        let groups = OrgTeamGroups::new();
        let groups = create(&groups, "core", &keys(&["platform"])).unwrap();
        assert_eq!(groups["core"][0].permission, TeamPermission::Push);

        let groups = set_team_permission(&groups, "core", "platform", TeamPermission::Admin).unwrap();
        let groups = add_selected(&groups, "core", &keys(&["platform", "docs"])).unwrap();
        assert_eq!(
            groups["core"],
            vec![
                TeamGroupMember::new("platform", TeamPermission::Admin),
                TeamGroupMember::new("docs", TeamPermission::Push),
            ]
        );

        let groups = remove_member(&groups, "core", "platform").unwrap();
        assert_eq!(groups["core"].len(), 1);
    }

    #[test]
    fn delete_requires_existing_group() {
        let groups = repo_groups();
        assert!(delete(&groups, "x").unwrap().is_empty());
        assert_eq!(
            delete(&groups, "X"),
            Err(GroupError::NotFound("X".into()))
        );
    }
}

//! Named, user-defined collections of repositories and teams.
//!
//! Groups are stored per organization: `org -> group name -> members`.
//! Group names are compared exactly. Members may reference repositories or
//! teams that no longer exist; views drop them silently.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::TeamPermission;

/// Group name -> repository full names, in insertion order.
pub type OrgRepoGroups = BTreeMap<String, Vec<String>>;
/// Organization -> its repository groups.
pub type RepoGroups = BTreeMap<String, OrgRepoGroups>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGroupMember {
    pub slug: String,
    pub permission: TeamPermission,
}

impl TeamGroupMember {
    pub fn new(slug: impl Into<String>, permission: TeamPermission) -> Self {
        Self {
            slug: slug.into(),
            permission,
        }
    }
}

/// Group name -> team members with the permission each one grants.
pub type OrgTeamGroups = BTreeMap<String, Vec<TeamGroupMember>>;
/// Organization -> its team groups.
pub type TeamGroups = BTreeMap<String, OrgTeamGroups>;

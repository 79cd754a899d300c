use crate::application::bulk::BulkOperation;
use crate::application::topics::TopicMode;
use crate::domain::{EntityKind, OrgRepoGroups, OrgTeamGroups, PropertyValue, TeamPermission};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadConfig,
    Startup,
    Login {
        token: String,
    },
    Logout,
    StartPolling,
    StopPolling,
    SetOrganization {
        org: String,
    },
    RefreshOrg {
        org: String,
    },
    PersistGroups {
        org: String,
        update: GroupsUpdate,
    },
    LoadPropertyDefinitions {
        org: String,
    },
    RunBulk {
        org: String,
        kind: EntityKind,
        targets: Vec<String>,
        operation: BulkOperation,
    },
    LoadRepoDetails {
        full_name: String,
    },
    MutateRepo {
        org: String,
        full_name: String,
        mutation: RepoMutation,
    },
}

/// One organization's groups as the reducer saw them (`expected`) and as
/// they should be stored (`next`).
#[derive(Debug, Clone, PartialEq)]
pub enum GroupsUpdate {
    Repos {
        expected: OrgRepoGroups,
        next: OrgRepoGroups,
    },
    Teams {
        expected: OrgTeamGroups,
        next: OrgTeamGroups,
    },
}

/// A single-repository change made from the details view.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoMutation {
    Topics {
        topics: Vec<String>,
        mode: TopicMode,
    },
    Team {
        slug: String,
        permission: TeamPermission,
        remove: bool,
    },
    CustomProperty {
        name: String,
        value: PropertyValue,
    },
    DeleteBranchProtection {
        branch: String,
    },
    DeleteRuleset {
        ruleset_id: i64,
    },
}

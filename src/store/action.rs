use std::collections::BTreeMap;

use crate::application::bulk::BulkReport;
use crate::application::filter::RepoToggle;
use crate::application::topics::TopicMode;
use crate::domain::{
    BulkError, ConnectionStatus, ConnectionStatusUpdate, EntityKind, GroupError,
    PropertyDefinition, PropertyValue, RepoDetails, RepoFields, RepoGroups, Repository, Team,
    TeamGroups, TeamPermission,
};
use crate::infra::app_config::AppConfig;

use super::GroupsChanged;

#[derive(Debug, Clone)]
pub enum Action {
    Data(DataAction),
    Navigation(NavigationAction),
    Session(SessionAction),
    Selection(SelectionAction),
    Filter(FilterAction),
    Group(GroupAction),
    Bulk(BulkAction),
    Details(DetailsAction),
    Async(AsyncAction),
}

/// Cache and configuration updates. Remote events land here.
#[derive(Debug, Clone)]
pub enum DataAction {
    UpdateConnectionStatus(ConnectionStatusUpdate),
    UpdateRepoList {
        org: String,
        repos: Vec<Repository>,
    },
    UpdateTeamList {
        org: String,
        teams: Option<Vec<Team>>,
    },
    SetFetchError {
        org: String,
        kind: EntityKind,
        error: String,
    },
    UpdateRepoGroups(RepoGroups),
    UpdateTeamGroups(TeamGroups),
    UpdateRepoFields {
        org: String,
        full_name: String,
        fields: RepoFields,
    },
    UpdateConfig(AppConfig),
}

#[derive(Debug, Clone)]
pub enum NavigationAction {
    SelectOrganization(String),
    SwitchTab(EntityKind),
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    Startup,
    Login { token: String },
    Logout,
    StartPolling,
    StopPolling,
    RefreshOrg,
}

/// Applies to the active tab.
#[derive(Debug, Clone)]
pub enum SelectionAction {
    Toggle {
        key: String,
        checked: bool,
        extend: bool,
    },
    SetAll {
        checked: bool,
    },
    Clear,
}

#[derive(Debug, Clone)]
pub enum FilterAction {
    SetSearch { kind: EntityKind, search: String },
    SetRepoToggle { toggle: RepoToggle, on: bool },
    SetTeamOnlySelected(bool),
    SetGroup { kind: EntityKind, group: Option<String> },
}

#[derive(Debug, Clone)]
pub enum GroupAction {
    Create { kind: EntityKind, name: String },
    AddSelected { kind: EntityKind, name: String },
    RemoveSelected { kind: EntityKind, name: String },
    Delete { kind: EntityKind, name: String },
    SetTeamPermission {
        group: String,
        slug: String,
        permission: TeamPermission,
    },
    RemoveTeam { group: String, slug: String },
    RemoveRepo { group: String, full_name: String },
    DismissError,
}

/// A bulk edit as submitted from the surface; team groups are named, and
/// resolved to members when the run is planned.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkRequest {
    Topics {
        topics: Vec<String>,
        mode: TopicMode,
    },
    Team {
        slug: String,
        permission: TeamPermission,
        remove: bool,
    },
    TeamGroup {
        group: String,
        remove: bool,
    },
    CustomProperties {
        properties: BTreeMap<String, PropertyValue>,
    },
}

#[derive(Debug, Clone)]
pub enum BulkAction {
    Open,
    Close,
    Submit(BulkRequest),
}

#[derive(Debug, Clone)]
pub enum DetailsAction {
    Open { full_name: String },
    Close,
    Reload,
    AddTopic(String),
    RemoveTopic(String),
    SetTeamAccess {
        slug: String,
        permission: TeamPermission,
    },
    RemoveTeam { slug: String },
    SetCustomProperty { name: String, value: PropertyValue },
    DeleteBranchProtection { branch: String },
    DeleteRuleset { ruleset_id: i64 },
}

#[derive(Debug, Clone)]
pub enum AsyncAction {
    ConfigLoaded(Result<AppConfig, String>),
    SessionStarted(Result<ConnectionStatus, String>),
    LoggedOut(Result<(), String>),
    SessionCommandFinished(Result<(), String>),
    GroupsPersisted(Result<GroupsChanged, GroupError>),
    PropertyDefinitionsLoaded {
        org: String,
        result: Result<Vec<PropertyDefinition>, String>,
    },
    BulkFinished {
        org: String,
        result: Result<BulkReport, BulkError>,
    },
    RepoDetailsLoaded {
        full_name: String,
        result: Result<RepoDetails, String>,
    },
}

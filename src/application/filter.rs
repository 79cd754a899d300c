//! Pure derivation of the visible rows for the repository and team tabs.

use crate::domain::{OrgRepoGroups, OrgTeamGroups, Repository, Team, Visibility};

use super::selection::Selection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFilters {
    pub search: String,
    pub only_manageable: bool,
    pub only_selected: bool,
    pub public: bool,
    pub private: bool,
    pub internal: bool,
    pub forks: bool,
    pub archived: bool,
    pub group: Option<String>,
}

impl Default for RepoFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            only_manageable: true,
            only_selected: false,
            public: true,
            private: true,
            internal: true,
            forks: true,
            archived: true,
            group: None,
        }
    }
}

/// Individual repository checkboxes, for toggling one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoToggle {
    OnlyManageable,
    OnlySelected,
    Public,
    Private,
    Internal,
    Forks,
    Archived,
}

impl RepoFilters {
    pub fn set(&mut self, toggle: RepoToggle, on: bool) {
        let flag = match toggle {
            RepoToggle::OnlyManageable => &mut self.only_manageable,
            RepoToggle::OnlySelected => &mut self.only_selected,
            RepoToggle::Public => &mut self.public,
            RepoToggle::Private => &mut self.private,
            RepoToggle::Internal => &mut self.internal,
            RepoToggle::Forks => &mut self.forks,
            RepoToggle::Archived => &mut self.archived,
        };
        *flag = on;
    }

    fn allows_visibility(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => self.public,
            Visibility::Private => self.private,
            Visibility::Internal => self.internal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilters {
    pub search: String,
    pub only_selected: bool,
    pub group: Option<String>,
}

pub fn repo_matches(
    repo: &Repository,
    filters: &RepoFilters,
    groups: &OrgRepoGroups,
    selection: &Selection,
) -> bool {
    let search = filters.search.to_lowercase();
    let matches_search = search.is_empty()
        || repo.name.to_lowercase().contains(&search)
        || repo
            .topics
            .iter()
            .any(|topic| topic.to_lowercase().contains(&search));
    let matches_manageable = !filters.only_manageable || repo.can_manage;
    let matches_selected = !filters.only_selected || selection.contains(&repo.full_name);
    let matches_visibility = filters.allows_visibility(repo.effective_visibility());
    let matches_fork = !repo.is_fork || filters.forks;
    let matches_archived = !repo.archived || filters.archived;
    let matches_group = filters.group.as_ref().is_none_or(|group| {
        groups
            .get(group)
            .is_some_and(|members| members.contains(&repo.full_name))
    });

    matches_search
        && matches_manageable
        && matches_selected
        && matches_visibility
        && matches_fork
        && matches_archived
        && matches_group
}

pub fn team_matches(
    team: &Team,
    filters: &TeamFilters,
    groups: &OrgTeamGroups,
    selection: &Selection,
) -> bool {
    let search = filters.search.to_lowercase();
    let matches_search = search.is_empty()
        || team.name.to_lowercase().contains(&search)
        || team.slug.to_lowercase().contains(&search);
    let matches_selected = !filters.only_selected || selection.contains(&team.slug);
    let matches_group = filters.group.as_ref().is_none_or(|group| {
        groups
            .get(group)
            .is_some_and(|members| members.iter().any(|member| member.slug == team.slug))
    });

    matches_search && matches_selected && matches_group
}

/// Visible repositories, in cache order.
pub fn visible_repos<'a>(
    repos: &'a [Repository],
    filters: &RepoFilters,
    groups: &OrgRepoGroups,
    selection: &Selection,
) -> Vec<&'a Repository> {
    repos
        .iter()
        .filter(|repo| repo_matches(repo, filters, groups, selection))
        .collect()
}

/// Visible teams, in cache order.
pub fn visible_teams<'a>(
    teams: &'a [Team],
    filters: &TeamFilters,
    groups: &OrgTeamGroups,
    selection: &Selection,
) -> Vec<&'a Team> {
    teams
        .iter()
        .filter(|team| team_matches(team, filters, groups, selection))
        .collect()
}

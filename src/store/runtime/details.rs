use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::super::Store;
use super::super::action::{Action, AsyncAction};
use super::super::command::RepoMutation;
use super::{describe, spawn};
use crate::domain::{RepoDetails, parse_full_name};
use crate::infra::github::GitHubAdmin;

pub fn load_repo_details(store: &mut Store, full_name: String) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = fetch(github.as_ref(), &full_name).await.map_err(describe);
        vec![Action::Async(AsyncAction::RepoDetailsLoaded { full_name, result })]
    });
}

/// Applies one change, then reloads the details so the view and the cache
/// reflect what GitHub now reports.
pub fn mutate_repo(store: &mut Store, org: String, full_name: String, mutation: RepoMutation) {
    let github = store.services.github.clone();
    spawn(store, async move {
        let result = match apply(&github, &org, &full_name, mutation).await {
            Ok(()) => fetch(github.as_ref(), &full_name).await,
            Err(err) => Err(err),
        }
        .map_err(describe);
        vec![Action::Async(AsyncAction::RepoDetailsLoaded { full_name, result })]
    });
}

async fn fetch(github: &dyn GitHubAdmin, full_name: &str) -> Result<RepoDetails> {
    let (owner, name) = parse_full_name(full_name)?;
    github.get_repo_details(owner, name).await
}

async fn apply(
    github: &Arc<dyn GitHubAdmin>,
    org: &str,
    full_name: &str,
    mutation: RepoMutation,
) -> Result<()> {
    let (owner, name) = parse_full_name(full_name)?;
    match mutation {
        RepoMutation::Topics { topics, mode } => {
            github.update_repo_topics(owner, name, &topics, mode).await?;
        }
        RepoMutation::Team {
            slug,
            permission,
            remove,
        } => {
            github
                .update_repo_team(owner, name, org, &slug, permission, remove)
                .await?;
        }
        RepoMutation::CustomProperty {
            name: property,
            value,
        } => {
            let properties = BTreeMap::from([(property, value)]);
            github
                .update_repo_custom_properties(org, name, &properties)
                .await?;
        }
        RepoMutation::DeleteBranchProtection { branch } => {
            github.delete_branch_protection(owner, name, &branch).await?;
        }
        RepoMutation::DeleteRuleset { ruleset_id } => {
            github.delete_ruleset(owner, name, ruleset_id).await?;
        }
    }
    Ok(())
}

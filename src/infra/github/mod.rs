//! Remote GitHub administration service.
//!
//! [`GitHubAdmin`] is the seam between the store runtime and GitHub. List
//! refreshes are not returned to the caller; they arrive later as
//! [`RemoteEvent`]s on the channel handed out by [`GitHubAdmin::subscribe`].

pub mod events;
pub mod gh_cli;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

use crate::application::topics::TopicMode;
use crate::domain::{
    ConnectionStatus, PropertyDefinition, PropertyValue, RepoDetails, TeamPermission,
};

pub use events::RemoteEvent;
pub use gh_cli::GhCliAdmin;

#[async_trait]
pub trait GitHubAdmin: Send + Sync {
    /// Reconnects with whatever credentials are already available.
    async fn startup(&self) -> Result<ConnectionStatus>;
    async fn login(&self, token: &str) -> Result<ConnectionStatus>;
    async fn logout(&self) -> Result<()>;
    async fn set_organization(&self, org: &str) -> Result<()>;

    async fn start_polling(&self) -> Result<()>;
    async fn stop_polling(&self) -> Result<()>;
    /// Fetches repositories and teams of `org`; results arrive as events.
    async fn refresh_repo_list(&self, org: &str) -> Result<()>;

    async fn get_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetails>;

    /// Returns the topics stored after the update.
    async fn update_repo_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &[String],
        mode: TopicMode,
    ) -> Result<Vec<String>>;

    /// Stops at the first repository that fails.
    async fn bulk_update_topics(
        &self,
        full_names: &[String],
        topics: &[String],
        mode: TopicMode,
    ) -> Result<()>;

    async fn update_repo_team(
        &self,
        owner: &str,
        name: &str,
        org: &str,
        slug: &str,
        permission: TeamPermission,
        remove: bool,
    ) -> Result<()>;

    async fn update_repo_custom_properties(
        &self,
        org: &str,
        name: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<()>;

    async fn bulk_update_custom_properties(
        &self,
        org: &str,
        names: &[String],
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        for name in names {
            self.update_repo_custom_properties(org, name, properties)
                .await?;
        }
        Ok(())
    }

    async fn delete_branch_protection(&self, owner: &str, name: &str, branch: &str) -> Result<()>;
    async fn delete_ruleset(&self, owner: &str, name: &str, ruleset_id: i64) -> Result<()>;

    async fn get_org_custom_property_definitions(
        &self,
        org: &str,
    ) -> Result<Vec<PropertyDefinition>>;

    fn subscribe(&self) -> broadcast::Receiver<RemoteEvent>;
}

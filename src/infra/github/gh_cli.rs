//! [`GitHubAdmin`] backed by the `gh` CLI.
//!
//! Every request goes through `gh api`, so authentication is whatever `gh`
//! already has, unless a token was passed to `login`, in which case it is
//! forwarded through `GH_TOKEN`.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::{GitHubAdmin, RemoteEvent};
use crate::application::topics::{TopicMode, apply_topic_mode};
use crate::domain::{
    ConnectionStatus, EntityKind, PropertyDefinition, PropertyValue, RepoDetails, RepoTeam,
    Repository, RulesetSummary, Team, TeamPermission, Visibility, parse_full_name,
};
use crate::infra::app_config::ConfigStore;

const POLL_INTERVAL: Duration = Duration::from_secs(30 * 60);
const MEMBER_COUNT_CONCURRENCY: usize = 10;
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhOrg {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
struct GhPermissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    maintain: bool,
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    name: String,
    full_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    permissions: Option<GhPermissions>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    subscribers_count: u32,
    #[serde(default)]
    forks_count: u32,
}

impl GhRepo {
    fn into_repository(self) -> Repository {
        let can_manage = self
            .permissions
            .as_ref()
            .is_some_and(|p| p.admin || p.maintain || p.push);
        Repository {
            name: self.name,
            full_name: self.full_name,
            url: self.html_url,
            visibility: self.visibility.and_then(|v| v.parse::<Visibility>().ok()),
            public: !self.private,
            topics: self.topics,
            archived: self.archived,
            is_fork: self.fork,
            default_branch: self.default_branch,
            can_manage,
            custom_properties: None,
            teams: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhTeam {
    name: String,
    slug: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    members_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
    name: String,
    #[serde(default)]
    protected: bool,
}

#[derive(Debug, Deserialize)]
struct GhPropertyValue {
    property_name: String,
    #[serde(default = "unset")]
    value: PropertyValue,
}

fn unset() -> PropertyValue {
    PropertyValue::Unset
}

#[derive(Debug, Deserialize)]
struct GhTopics {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GhSearchCount {
    total_count: u32,
}

struct Inner {
    gh_path: String,
    config: Arc<dyn ConfigStore>,
    token: RwLock<Option<String>>,
    user_login: RwLock<Option<String>>,
    status: RwLock<ConnectionStatus>,
    polling: Mutex<Option<CancellationToken>>,
    events: broadcast::Sender<RemoteEvent>,
}

#[derive(Clone)]
pub struct GhCliAdmin {
    inner: Arc<Inner>,
}

impl GhCliAdmin {
    pub fn new(config: Arc<dyn ConfigStore>) -> Self {
        let gh_path = std::env::var("GITHUB_ADMIN_GH").unwrap_or_else(|_| "gh".to_string());
        Self::with_gh_path(config, gh_path)
    }

    pub fn with_gh_path(config: Arc<dyn ConfigStore>, gh_path: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                gh_path: gh_path.into(),
                config,
                token: RwLock::new(None),
                user_login: RwLock::new(None),
                status: RwLock::new(ConnectionStatus::disconnected()),
                polling: Mutex::new(None),
                events,
            }),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.status.read().clone()
    }
}

impl Inner {
    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.gh_path);
        command.arg("api").args(args);
        if let Some(token) = self.token.read().as_deref() {
            command.env("GH_TOKEN", token);
        }
        command
    }

    async fn run(&self, args: &[&str], input: Option<&Value>) -> Result<Vec<u8>> {
        let mut command = self.command(args);
        if input.is_some() {
            command.args(["--input", "-"]).stdin(Stdio::piped());
        }
        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("spawn `gh api`")?;

        if let Some(payload) = input
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin
                .write_all(payload.to_string().as_bytes())
                .await
                .context("write payload to gh stdin")?;
        }

        let output = child.wait_with_output().await.context("run `gh api`")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("`gh api {}` failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output.stdout)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let stdout = self.run(&[endpoint], None).await?;
        serde_json::from_slice(&stdout).with_context(|| format!("parse `gh api {endpoint}` json"))
    }

    /// Follows every page; `--slurp` wraps the pages in an outer array.
    async fn get_all<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let stdout = self.run(&["--paginate", "--slurp", endpoint], None).await?;
        let pages: Vec<Vec<T>> = serde_json::from_slice(&stdout)
            .with_context(|| format!("parse `gh api {endpoint}` pages"))?;
        Ok(pages.into_iter().flatten().collect())
    }

    async fn send(&self, method: &str, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let stdout = self
            .run(&["--method", method, endpoint], body)
            .await?;
        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&stdout)
            .with_context(|| format!("parse `gh api --method {method} {endpoint}` json"))
    }

    fn emit(&self, event: RemoteEvent) {
        let _ = self.events.send(event);
    }

    fn emit_status(&self) {
        let status = self.status.read().clone();
        self.emit(RemoteEvent::StatusUpdated(status));
    }

    fn is_user_account(&self, org: &str) -> bool {
        self.user_login.read().as_deref() == Some(org)
    }

    fn persist_selected_org(&self, selected: Option<String>) {
        let result = self.config.get().and_then(|mut config| {
            config.selected_org = selected;
            self.config.save(&config)
        });
        if let Err(err) = result {
            log::warn!("failed to persist selected organization: {err}");
        }
    }

    async fn connect(&self, token: Option<String>) -> Result<ConnectionStatus> {
        *self.token.write() = token;
        let user: GhUser = self.get("user").await.context("failed to verify token")?;
        log::info!("connected to GitHub as {}", user.login);
        *self.user_login.write() = Some(user.login.clone());

        let mut organizations = vec![user.login.clone()];
        match self.get_all::<GhOrg>("user/orgs?per_page=100").await {
            Ok(orgs) => organizations.extend(orgs.into_iter().map(|org| org.login)),
            Err(err) => log::warn!("failed to list organizations: {err:#}"),
        }

        let config = self.config.get()?;
        let previous = self.status.read().selected_org.clone();
        let selected = previous
            .filter(|org| organizations.contains(org))
            .or_else(|| {
                config
                    .default_org
                    .clone()
                    .filter(|org| organizations.contains(org))
            })
            .or_else(|| organizations.first().cloned());

        let status = {
            let mut status = self.status.write();
            status.is_connected = true;
            status.organizations = organizations;
            status.selected_org = selected.clone();
            status.default_org = config.default_org.clone();
            status.clone()
        };
        self.persist_selected_org(selected);
        self.emit_status();
        Ok(status)
    }

    async fn fetch_repos(&self, org: &str) -> Result<Vec<Repository>> {
        let endpoint = if self.is_user_account(org) {
            "user/repos?affiliation=owner&per_page=100".to_string()
        } else {
            format!("orgs/{org}/repos?per_page=100")
        };
        let repos: Vec<GhRepo> = self.get_all(&endpoint).await?;
        Ok(repos.into_iter().map(GhRepo::into_repository).collect())
    }

    async fn fetch_teams(&self, org: &str) -> Result<Option<Vec<Team>>> {
        if self.is_user_account(org) {
            return Ok(None);
        }
        let teams: Vec<GhTeam> = self
            .get_all(&format!("orgs/{org}/teams?per_page=100"))
            .await?;

        // The list endpoint usually omits member counts.
        let teams = stream::iter(teams)
            .map(|team| async move {
                let members_count = match team.members_count {
                    Some(count) if count > 0 => count,
                    _ => self
                        .get::<GhTeam>(&format!("orgs/{org}/teams/{}", team.slug))
                        .await
                        .ok()
                        .and_then(|full| full.members_count)
                        .unwrap_or_default(),
                };
                Team {
                    name: team.name,
                    slug: team.slug,
                    url: team.html_url,
                    members_count,
                }
            })
            .buffered(MEMBER_COUNT_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;
        Ok(Some(teams))
    }

    async fn fetch_all(&self, org: &str) {
        let connected = self.status.read().is_connected;
        if !connected || org.is_empty() {
            return;
        }
        match self.fetch_repos(org).await {
            Ok(repos) => self.emit(RemoteEvent::ReposUpdated {
                org: org.to_string(),
                repos,
            }),
            Err(err) => {
                log::warn!("failed to fetch repositories for {org}: {err:#}");
                self.emit(RemoteEvent::FetchError {
                    org: org.to_string(),
                    kind: EntityKind::Repo,
                    error: format!("{err:#}"),
                });
            }
        }
        match self.fetch_teams(org).await {
            Ok(teams) => self.emit(RemoteEvent::TeamsUpdated {
                org: org.to_string(),
                teams,
            }),
            Err(err) => {
                log::warn!("failed to fetch teams for {org}: {err:#}");
                self.emit(RemoteEvent::FetchError {
                    org: org.to_string(),
                    kind: EntityKind::Team,
                    error: format!("{err:#}"),
                });
            }
        }
    }

    async fn fetch_every_org(&self) {
        let organizations = self.status.read().organizations.clone();
        for org in organizations {
            self.fetch_all(&org).await;
        }
    }

    async fn optional<T: DeserializeOwned + Default>(&self, endpoint: &str) -> T {
        match self.get(endpoint).await {
            Ok(value) => value,
            Err(err) => {
                log::debug!("skipping {endpoint}: {err:#}");
                T::default()
            }
        }
    }
}

#[async_trait]
impl GitHubAdmin for GhCliAdmin {
    async fn startup(&self) -> Result<ConnectionStatus> {
        let config = self.inner.config.get()?;
        {
            let mut status = self.inner.status.write();
            status.default_org = config.default_org.clone();
            status.selected_org = if config.default_org.is_some() {
                None
            } else {
                config.selected_org.clone()
            };
        }
        match self.inner.connect(None).await {
            Ok(status) => Ok(status),
            Err(err) => {
                log::info!("auto-connect skipped: {err:#}");
                Ok(self.status())
            }
        }
    }

    async fn login(&self, token: &str) -> Result<ConnectionStatus> {
        let token = Some(token.trim().to_string()).filter(|t| !t.is_empty());
        self.inner.connect(token).await
    }

    async fn logout(&self) -> Result<()> {
        self.stop_polling().await?;
        *self.inner.token.write() = None;
        *self.inner.user_login.write() = None;
        *self.inner.status.write() = ConnectionStatus::disconnected();
        self.inner.persist_selected_org(None);
        self.inner.emit_status();
        Ok(())
    }

    async fn set_organization(&self, org: &str) -> Result<()> {
        self.inner.status.write().selected_org = Some(org.to_string());
        self.inner.persist_selected_org(Some(org.to_string()));
        self.inner.emit_status();
        self.refresh_repo_list(org).await
    }

    async fn start_polling(&self) -> Result<()> {
        let token = {
            let mut polling = self.inner.polling.lock();
            if polling.is_some() {
                return Ok(());
            }
            let token = CancellationToken::new();
            *polling = Some(token.clone());
            token
        };
        self.inner.status.write().is_polling = true;
        self.inner.emit_status();

        let inner = self.inner.clone();
        tokio::spawn(async move {
            loop {
                inner.fetch_every_org().await;
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(POLL_INTERVAL) => {}
                }
            }
            log::debug!("repository polling stopped");
        });
        Ok(())
    }

    async fn stop_polling(&self) -> Result<()> {
        let token = self.inner.polling.lock().take();
        if let Some(token) = token {
            token.cancel();
            self.inner.status.write().is_polling = false;
            self.inner.emit_status();
        }
        Ok(())
    }

    async fn refresh_repo_list(&self, org: &str) -> Result<()> {
        self.inner.fetch_all(org).await;
        Ok(())
    }

    async fn get_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetails> {
        let base = format!("repos/{owner}/{name}");
        let mut repo: GhRepo = self
            .inner
            .get(&base)
            .await
            .with_context(|| format!("fetch {owner}/{name}"))?;
        let description = repo.description.take().unwrap_or_default();
        let (stars, watching, forks_count) =
            (repo.stargazers_count, repo.subscribers_count, repo.forks_count);

        let open_prs = self
            .inner
            .get::<GhSearchCount>(&format!(
                "search/issues?q=repo:{owner}/{name}+is:pr+is:open&per_page=1"
            ))
            .await
            .map(|search| search.total_count)
            .unwrap_or_default();

        let branches: Vec<GhBranch> = self
            .inner
            .get_all(&format!("{base}/branches?per_page=100"))
            .await
            .unwrap_or_default();
        let protected_branches = branches
            .iter()
            .filter(|branch| branch.protected)
            .map(|branch| branch.name.clone())
            .collect();

        let property_values: Vec<GhPropertyValue> =
            self.inner.optional(&format!("{base}/properties/values")).await;
        let team_access: Vec<RepoTeam> = self
            .inner
            .optional(&format!("{base}/teams?per_page=100"))
            .await;
        let rulesets: Vec<RulesetSummary> =
            self.inner.optional(&format!("{base}/rulesets")).await;

        Ok(RepoDetails {
            repository: repo.into_repository(),
            description,
            stars,
            watching,
            forks_count,
            open_prs,
            branches_count: branches.len() as u32,
            property_values: property_values
                .into_iter()
                .map(|value| (value.property_name, value.value))
                .collect(),
            team_access,
            protected_branches,
            rulesets,
        })
    }

    async fn update_repo_topics(
        &self,
        owner: &str,
        name: &str,
        topics: &[String],
        mode: TopicMode,
    ) -> Result<Vec<String>> {
        let endpoint = format!("repos/{owner}/{name}/topics");
        let current: GhTopics = self.inner.get(&endpoint).await?;
        let names = apply_topic_mode(&current.names, topics, mode);
        let updated = self
            .inner
            .send("PUT", &endpoint, Some(&json!({ "names": names })))
            .await?;
        let updated: GhTopics =
            serde_json::from_value(updated).context("parse updated topics")?;
        Ok(updated.names)
    }

    async fn bulk_update_topics(
        &self,
        full_names: &[String],
        topics: &[String],
        mode: TopicMode,
    ) -> Result<()> {
        for full_name in full_names {
            let (owner, name) = parse_full_name(full_name)?;
            self.update_repo_topics(owner, name, topics, mode)
                .await
                .with_context(|| format!("update topics on {full_name}"))?;
        }
        Ok(())
    }

    async fn update_repo_team(
        &self,
        owner: &str,
        name: &str,
        org: &str,
        slug: &str,
        permission: TeamPermission,
        remove: bool,
    ) -> Result<()> {
        let endpoint = format!("orgs/{org}/teams/{slug}/repos/{owner}/{name}");
        if remove {
            self.inner.send("DELETE", &endpoint, None).await?;
        } else {
            let body = json!({ "permission": permission.to_string() });
            self.inner.send("PUT", &endpoint, Some(&body)).await?;
        }
        Ok(())
    }

    async fn update_repo_custom_properties(
        &self,
        org: &str,
        name: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        self.bulk_update_custom_properties(org, &[name.to_string()], properties)
            .await
    }

    async fn bulk_update_custom_properties(
        &self,
        org: &str,
        names: &[String],
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        let properties: Vec<Value> = properties
            .iter()
            .map(|(name, value)| json!({ "property_name": name, "value": value }))
            .collect();
        let body = json!({ "repository_names": names, "properties": properties });
        self.inner
            .send("PATCH", &format!("orgs/{org}/properties/values"), Some(&body))
            .await?;
        Ok(())
    }

    async fn delete_branch_protection(&self, owner: &str, name: &str, branch: &str) -> Result<()> {
        self.inner
            .send(
                "DELETE",
                &format!("repos/{owner}/{name}/branches/{branch}/protection"),
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete_ruleset(&self, owner: &str, name: &str, ruleset_id: i64) -> Result<()> {
        self.inner
            .send(
                "DELETE",
                &format!("repos/{owner}/{name}/rulesets/{ruleset_id}"),
                None,
            )
            .await?;
        Ok(())
    }

    async fn get_org_custom_property_definitions(
        &self,
        org: &str,
    ) -> Result<Vec<PropertyDefinition>> {
        self.inner
            .get(&format!("orgs/{org}/properties/schema"))
            .await
    }

    fn subscribe(&self) -> broadcast::Receiver<RemoteEvent> {
        self.inner.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manageable_requires_write_or_better() {
        let repo: GhRepo = serde_json::from_str(
            r#"{"name":"api","full_name":"acme/api","private":true,"visibility":"internal",
                "permissions":{"admin":false,"maintain":false,"push":true,"pull":true}}"#,
        )
        .unwrap();
        let repo = repo.into_repository();
        assert!(repo.can_manage);
        assert!(!repo.public);
        assert_eq!(repo.visibility, Some(Visibility::Internal));

        let repo: GhRepo = serde_json::from_str(
            r#"{"name":"api","full_name":"acme/api","permissions":{"pull":true}}"#,
        )
        .unwrap();
        assert!(!repo.into_repository().can_manage);
    }

    #[test]
    fn property_values_default_to_unset() {
        let values: Vec<GhPropertyValue> = serde_json::from_str(
            r#"[{"property_name":"tier","value":"gold"},{"property_name":"owner"}]"#,
        )
        .unwrap();
        assert_eq!(values[0].value, PropertyValue::Text("gold".into()));
        assert_eq!(values[1].value, PropertyValue::Unset);
    }

    #[tokio::test]
    async fn missing_gh_binary_fails_login() {
        let config = Arc::new(crate::infra::app_config::MemoryConfigStore::default());
        let admin = GhCliAdmin::with_gh_path(config, "/nonexistent/gh-binary");
        assert!(admin.login("token").await.is_err());
        assert!(!admin.status().is_connected);
    }
}

//! Bulk operation orchestration.
//!
//! A bulk run turns an operation descriptor and a list of target repositories
//! into an ordered list of [`BulkTask`]s, then hands them to a
//! [`BulkExecutor`]. The default executor runs them one at a time and stops
//! at the first failure; nothing already applied is rolled back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    BulkError, EntityKind, PropertyValue, TeamGroupMember, TeamPermission, parse_full_name,
};
use crate::infra::github::GitHubAdmin;

use super::topics::TopicMode;

/// What to do to every target.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// One remote call covering every target.
    Topics { topics: Vec<String>, mode: TopicMode },
    /// One call per target.
    Team {
        slug: String,
        permission: TeamPermission,
        remove: bool,
    },
    /// One call per (target, member), members in stored group order.
    TeamGroup {
        group: String,
        members: Vec<TeamGroupMember>,
        remove: bool,
    },
    /// One call per target.
    CustomProperties {
        properties: BTreeMap<String, PropertyValue>,
    },
}

impl BulkOperation {
    pub fn describe(&self) -> String {
        match self {
            Self::Topics { topics, mode } => format!("{mode} topics [{}]", topics.join(", ")),
            Self::Team {
                slug,
                permission,
                remove: false,
            } => format!("grant {slug} {permission}"),
            Self::Team {
                slug, remove: true, ..
            } => format!("remove team {slug}"),
            Self::TeamGroup {
                group,
                remove: false,
                ..
            } => format!("apply team group {group}"),
            Self::TeamGroup {
                group, remove: true, ..
            } => format!("remove team group {group}"),
            Self::CustomProperties { properties } => {
                let names: Vec<&str> = properties.keys().map(String::as_str).collect();
                format!("set properties [{}]", names.join(", "))
            }
        }
    }
}

pub type StepFuture = BoxFuture<'static, anyhow::Result<()>>;

/// One remote call in a bulk run.
pub struct BulkTask {
    pub label: String,
    run: Box<dyn FnOnce() -> StepFuture + Send>,
}

impl BulkTask {
    pub fn new<F>(label: impl Into<String>, run: F) -> Self
    where
        F: FnOnce() -> StepFuture + Send + 'static,
    {
        Self {
            label: label.into(),
            run: Box::new(run),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        (self.run)().await
    }
}

impl std::fmt::Debug for BulkTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkTask").field("label", &self.label).finish()
    }
}

/// Runs a planned task list. Implementations must keep the fail-fast
/// contract: stop at the first failure and report it as
/// [`BulkError::Aborted`].
#[async_trait]
pub trait BulkExecutor: Send + Sync {
    /// Returns the number of calls that completed.
    async fn execute(&self, tasks: Vec<BulkTask>) -> Result<usize, BulkError>;
}

/// Awaits each task before starting the next.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialExecutor;

#[async_trait]
impl BulkExecutor for SequentialExecutor {
    async fn execute(&self, tasks: Vec<BulkTask>) -> Result<usize, BulkError> {
        let total = tasks.len();
        for (completed, task) in tasks.into_iter().enumerate() {
            let label = task.label.clone();
            if let Err(err) = task.run().await {
                log::warn!(
                    "bulk step '{}' failed after {} of {} calls: {:#}",
                    label,
                    completed,
                    total,
                    err
                );
                return Err(BulkError::Aborted {
                    failed_step: label,
                    completed,
                    total,
                    message: format!("{err:#}"),
                });
            }
        }
        Ok(total)
    }
}

/// Logs the planned calls without making any of them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait]
impl BulkExecutor for DryRunExecutor {
    async fn execute(&self, tasks: Vec<BulkTask>) -> Result<usize, BulkError> {
        for (index, task) in tasks.iter().enumerate() {
            log::info!("dry run {}/{}: {}", index + 1, tasks.len(), task.label);
        }
        Ok(tasks.len())
    }
}

/// Per (organization, entity kind) exclusion for bulk runs.
#[derive(Debug, Clone, Default)]
pub struct BulkLocks {
    held: Arc<Mutex<HashSet<(String, EntityKind)>>>,
}

impl BulkLocks {
    pub fn try_acquire(&self, org: &str, kind: EntityKind) -> Result<BulkLockGuard, BulkError> {
        let key = (org.to_string(), kind);
        let mut held = self.held.lock();
        if !held.insert(key.clone()) {
            return Err(BulkError::Busy {
                org: org.to_string(),
                kind,
            });
        }
        Ok(BulkLockGuard {
            locks: self.clone(),
            key,
        })
    }

    pub fn is_held(&self, org: &str, kind: EntityKind) -> bool {
        self.held.lock().contains(&(org.to_string(), kind))
    }
}

/// Releases its scope when dropped.
#[derive(Debug)]
pub struct BulkLockGuard {
    locks: BulkLocks,
    key: (String, EntityKind),
}

impl Drop for BulkLockGuard {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.key);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub run_id: Uuid,
    pub calls: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Expands an operation into the ordered list of remote calls: targets in
/// the given order, then group members in stored order.
pub fn plan(
    github: Arc<dyn GitHubAdmin>,
    org: &str,
    targets: &[String],
    operation: BulkOperation,
) -> Result<Vec<BulkTask>, BulkError> {
    if targets.is_empty() {
        return Err(BulkError::NoTargets);
    }
    let mut parsed = Vec::with_capacity(targets.len());
    for target in targets {
        let (owner, name) =
            parse_full_name(target).map_err(|_| BulkError::InvalidTarget(target.clone()))?;
        parsed.push((target.clone(), owner.to_string(), name.to_string()));
    }
    let org = org.to_string();

    let tasks = match operation {
        BulkOperation::Topics { topics, mode } => {
            if topics.is_empty() && mode != TopicMode::Replace {
                return Err(BulkError::EmptyTopics);
            }
            let full_names = targets.to_vec();
            let label = format!("{mode} topics on {} repositories", full_names.len());
            vec![BulkTask::new(label, move || {
                Box::pin(async move { github.bulk_update_topics(&full_names, &topics, mode).await })
            })]
        }
        BulkOperation::Team {
            slug,
            permission,
            remove,
        } => parsed
            .into_iter()
            .map(|(full_name, owner, name)| {
                team_task(
                    github.clone(),
                    &org,
                    full_name,
                    owner,
                    name,
                    TeamGroupMember::new(slug.clone(), permission),
                    remove,
                )
            })
            .collect(),
        BulkOperation::TeamGroup {
            group,
            members,
            remove,
        } => {
            if members.is_empty() {
                return Err(BulkError::EmptyGroup(group));
            }
            let mut tasks = Vec::with_capacity(parsed.len() * members.len());
            for (full_name, owner, name) in parsed {
                for member in &members {
                    tasks.push(team_task(
                        github.clone(),
                        &org,
                        full_name.clone(),
                        owner.clone(),
                        name.clone(),
                        member.clone(),
                        remove,
                    ));
                }
            }
            tasks
        }
        BulkOperation::CustomProperties { properties } => {
            if properties.is_empty() {
                return Err(BulkError::EmptyProperties);
            }
            parsed
                .into_iter()
                .map(|(full_name, _owner, name)| {
                    let github = github.clone();
                    let org = org.clone();
                    let properties = properties.clone();
                    BulkTask::new(format!("set properties on {full_name}"), move || {
                        Box::pin(async move {
                            github
                                .update_repo_custom_properties(&org, &name, &properties)
                                .await
                        })
                    })
                })
                .collect()
        }
    };
    Ok(tasks)
}

fn team_task(
    github: Arc<dyn GitHubAdmin>,
    org: &str,
    full_name: String,
    owner: String,
    name: String,
    member: TeamGroupMember,
    remove: bool,
) -> BulkTask {
    let label = if remove {
        format!("remove team {} from {}", member.slug, full_name)
    } else {
        format!(
            "grant team {} {} on {}",
            member.slug, member.permission, full_name
        )
    };
    let org = org.to_string();
    BulkTask::new(label, move || {
        Box::pin(async move {
            github
                .update_repo_team(&owner, &name, &org, &member.slug, member.permission, remove)
                .await
        })
    })
}

/// Plans and executes bulk runs under the per-scope lock.
#[derive(Clone)]
pub struct BulkOrchestrator {
    github: Arc<dyn GitHubAdmin>,
    executor: Arc<dyn BulkExecutor>,
    locks: BulkLocks,
}

impl BulkOrchestrator {
    pub fn new(github: Arc<dyn GitHubAdmin>) -> Self {
        Self {
            github,
            executor: Arc::new(SequentialExecutor),
            locks: BulkLocks::default(),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn BulkExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Shares locks with other orchestrators (e.g. another window).
    pub fn with_locks(mut self, locks: BulkLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> &BulkLocks {
        &self.locks
    }

    pub async fn run(
        &self,
        org: &str,
        kind: EntityKind,
        targets: &[String],
        operation: BulkOperation,
    ) -> Result<BulkReport, BulkError> {
        let _guard = self.locks.try_acquire(org, kind)?;
        let run_id = Uuid::new_v4();
        let description = operation.describe();
        let tasks = plan(self.github.clone(), org, targets, operation)?;
        let started_at = Utc::now();
        log::info!(
            "bulk run {} in {}: {} ({} targets, {} calls)",
            run_id,
            org,
            description,
            targets.len(),
            tasks.len()
        );

        let calls = self.executor.execute(tasks).await?;
        let finished_at = Utc::now();
        log::info!(
            "bulk run {} finished: {} calls in {} ms",
            run_id,
            calls,
            (finished_at - started_at).num_milliseconds()
        );
        Ok(BulkReport {
            run_id,
            calls,
            started_at,
            finished_at,
        })
    }
}

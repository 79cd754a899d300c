//! github-admin CLI entry point.
//!
//! Drives the same store a desktop front end would: start a session, pick an
//! organization, then list, group, or bulk-edit its repositories and teams.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::sync::Arc;

use github_admin::application::bulk::{BulkOrchestrator, DryRunExecutor};
use github_admin::application::filter::RepoToggle;
use github_admin::application::topics::{TopicMode, parse_topic_list};
use github_admin::domain::{EntityKind, PropertyValue, TeamPermission};
use github_admin::infra::app_config::FileConfigStore;
use github_admin::infra::github::GhCliAdmin;
use github_admin::store::{
    Action, BulkAction, BulkRequest, FilterAction, GroupAction, NavigationAction,
    SelectionAction, Services, SessionAction, Store,
};

#[derive(Parser, Debug)]
#[command(name = "github-admin")]
#[command(version)]
#[command(about = "Administer the repositories and teams of a GitHub organization", long_about = None)]
struct Args {
    /// Organization to work in (defaults to the remembered one)
    #[arg(short, long, global = true)]
    org: Option<String>,

    /// Personal access token; without it the existing `gh auth` login is used
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the organizations available to the signed-in account
    Orgs,

    /// List repositories of the organization
    Repos {
        /// Match against name and topics
        #[arg(short, long, default_value = "")]
        search: String,
        /// Include repositories you cannot administer
        #[arg(long)]
        all: bool,
        /// Only members of this repository group
        #[arg(short, long)]
        group: Option<String>,
        #[arg(long)]
        no_forks: bool,
        #[arg(long)]
        no_archived: bool,
    },

    /// List teams of the organization
    Teams {
        /// Match against name and slug
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only members of this team group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Manage named repository and team groups
    Groups {
        #[command(subcommand)]
        command: GroupCommand,
    },

    /// Apply one change to several repositories, stopping at the first failure
    Bulk {
        /// Repositories to change (`name` or `owner/name`)
        #[arg(short, long = "repo", required = true, num_args = 1..)]
        repos: Vec<String>,

        /// Log the calls that would be made without making them
        #[arg(long)]
        dry_run: bool,

        #[command(subcommand)]
        operation: BulkCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    /// Show the groups of one kind
    List {
        #[arg(short, long, default_value = "repos")]
        kind: EntityKind,
    },
    /// Create a group from the given members
    Create {
        #[arg(short, long, default_value = "repos")]
        kind: EntityKind,
        name: String,
        #[arg(required = true)]
        members: Vec<String>,
    },
    /// Add members to an existing group
    Add {
        #[arg(short, long, default_value = "repos")]
        kind: EntityKind,
        name: String,
        #[arg(required = true)]
        members: Vec<String>,
    },
    /// Remove members from a group
    Remove {
        #[arg(short, long, default_value = "repos")]
        kind: EntityKind,
        name: String,
        #[arg(required = true)]
        members: Vec<String>,
    },
    /// Delete a group
    Delete {
        #[arg(short, long, default_value = "repos")]
        kind: EntityKind,
        name: String,
    },
    /// Change the permission a team group grants to one of its teams
    Permission {
        group: String,
        slug: String,
        permission: TeamPermission,
    },
}

#[derive(Subcommand, Debug)]
enum BulkCommand {
    /// Add, remove, or replace topics
    Topics {
        #[arg(short, long, default_value = "add")]
        mode: TopicMode,
        /// Topics, space or comma separated
        topics: Vec<String>,
    },
    /// Grant or revoke one team's access
    Team {
        slug: String,
        #[arg(short, long, default_value = "push")]
        permission: TeamPermission,
        #[arg(long)]
        remove: bool,
    },
    /// Grant or revoke access for every team of a team group
    TeamGroup {
        group: String,
        #[arg(long)]
        remove: bool,
    },
    /// Set a custom property; no values unsets it
    Property { name: String, values: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Arc::new(FileConfigStore::open_default());
    log::debug!("using config at {}", config.path().display());
    let github = Arc::new(GhCliAdmin::new(config.clone()));
    let mut services = Services::new(github.clone(), config);
    if matches!(args.command, Commands::Bulk { dry_run: true, .. }) {
        services.bulk = BulkOrchestrator::new(github).with_executor(Arc::new(DryRunExecutor));
    }
    let mut store = Store::new(services).with_auto_poll(false);

    connect(&mut store, args.token, args.org.as_deref()).await?;

    match args.command {
        Commands::Orgs => {
            let status = &store.state().domain.status;
            for org in &status.organizations {
                let marker = if status.selected_org.as_ref() == Some(org) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {org}");
            }
        }
        Commands::Repos {
            search,
            all,
            group,
            no_forks,
            no_archived,
        } => {
            let toggles = [
                (RepoToggle::OnlyManageable, !all),
                (RepoToggle::Forks, !no_forks),
                (RepoToggle::Archived, !no_archived),
            ];
            for (toggle, on) in toggles {
                store.dispatch(Action::Filter(FilterAction::SetRepoToggle { toggle, on }));
            }
            store.dispatch(Action::Filter(FilterAction::SetSearch {
                kind: EntityKind::Repo,
                search,
            }));
            if let Some(group) = group {
                apply_group_filter(&mut store, EntityKind::Repo, group)?;
            }
            let state = store.state();
            if let Some(err) = state.fetch_error(EntityKind::Repo) {
                bail!("failed to load repositories: {err}");
            }
            print_refreshed(&store, EntityKind::Repo);
            for repo in state.visible_repos() {
                println!(
                    "{:<40} {:<9} {}",
                    repo.full_name,
                    repo.effective_visibility().to_string(),
                    repo.topics.join(",")
                );
            }
        }
        Commands::Teams { search, group } => {
            store.dispatch(Action::Navigation(NavigationAction::SwitchTab(
                EntityKind::Team,
            )));
            if store.state().ui.active_tab != EntityKind::Team {
                bail!("teams are not available for this account");
            }
            store.dispatch(Action::Filter(FilterAction::SetSearch {
                kind: EntityKind::Team,
                search,
            }));
            if let Some(group) = group {
                apply_group_filter(&mut store, EntityKind::Team, group)?;
            }
            let state = store.state();
            if let Some(err) = state.fetch_error(EntityKind::Team) {
                bail!("failed to load teams: {err}");
            }
            print_refreshed(&store, EntityKind::Team);
            for team in state.visible_teams() {
                println!("{:<30} {:<30} {}", team.slug, team.name, team.members_count);
            }
        }
        Commands::Groups { command } => run_group_command(&mut store, command).await?,
        Commands::Bulk {
            repos,
            dry_run,
            operation,
        } => {
            run_bulk_command(&mut store, &repos, operation, dry_run).await?
        }
    }
    Ok(())
}

fn print_refreshed(store: &Store, kind: EntityKind) {
    if let Some(at) = store.state().last_refreshed(kind) {
        log::info!("{kind} list as of {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// Starts a session and makes `org` (or the remembered one) current with
/// fresh lists.
async fn connect(store: &mut Store, token: Option<String>, org: Option<&str>) -> Result<()> {
    match token {
        Some(token) => store.dispatch(Action::Session(SessionAction::Login { token })),
        None => store.dispatch(Action::Session(SessionAction::Startup)),
    }
    store.settle().await;

    let state = store.state();
    if let Some(err) = &state.ui.login_error {
        bail!("login failed: {err}");
    }
    if !state.domain.status.is_connected {
        bail!("not signed in to GitHub; run `gh auth login` or pass --token");
    }

    match org {
        Some(org) => {
            if !state.domain.status.organizations.iter().any(|o| o == org) {
                bail!("organization {org} is not available to this account");
            }
            store.dispatch(Action::Navigation(NavigationAction::SelectOrganization(
                org.to_string(),
            )));
        }
        None => store.dispatch(Action::Session(SessionAction::RefreshOrg)),
    }
    store.settle().await;
    store
        .state()
        .current_org()
        .context("no organization selected")?;
    Ok(())
}

fn apply_group_filter(store: &mut Store, kind: EntityKind, group: String) -> Result<()> {
    store.dispatch(Action::Filter(FilterAction::SetGroup {
        kind,
        group: Some(group.clone()),
    }));
    let applied = match kind {
        EntityKind::Repo => store.state().ui.repo_filters.group.is_some(),
        EntityKind::Team => store.state().ui.team_filters.group.is_some(),
    };
    if !applied {
        bail!("no {kind} group named {group}");
    }
    Ok(())
}

/// Checks the given members on the tab of `kind`. Unknown members are
/// rejected so a typo never ends up in a saved group.
fn select_members(store: &mut Store, kind: EntityKind, members: &[String]) -> Result<()> {
    store.dispatch(Action::Navigation(NavigationAction::SwitchTab(kind)));
    if store.state().ui.active_tab != kind {
        bail!("{kind} are not available for this account");
    }
    // Selection only reaches rows the filters show.
    if kind == EntityKind::Repo {
        store.dispatch(Action::Filter(FilterAction::SetRepoToggle {
            toggle: RepoToggle::OnlyManageable,
            on: false,
        }));
    }
    let org = store.state().current_org().unwrap_or_default().to_string();
    for member in members {
        let key = match kind {
            EntityKind::Repo if !member.contains('/') => format!("{org}/{member}"),
            _ => member.clone(),
        };
        if !store.state().visible_keys(kind).contains(&key) {
            bail!("{key} is not in {org}");
        }
        store.dispatch(Action::Selection(SelectionAction::Toggle {
            key,
            checked: true,
            extend: false,
        }));
    }
    Ok(())
}

async fn run_group_command(store: &mut Store, command: GroupCommand) -> Result<()> {
    let action = match command {
        GroupCommand::List { kind } => {
            let state = store.state();
            match kind {
                EntityKind::Repo => {
                    for (name, members) in state.org_repo_groups() {
                        println!("{name} ({}): {}", members.len(), members.join(", "));
                    }
                }
                EntityKind::Team => {
                    for (name, members) in state.org_team_groups() {
                        let members: Vec<String> = members
                            .iter()
                            .map(|m| format!("{}:{}", m.slug, m.permission))
                            .collect();
                        println!("{name} ({}): {}", members.len(), members.join(", "));
                    }
                }
            }
            return Ok(());
        }
        GroupCommand::Create {
            kind,
            name,
            members,
        } => {
            select_members(store, kind, &members)?;
            GroupAction::Create { kind, name }
        }
        GroupCommand::Add {
            kind,
            name,
            members,
        } => {
            select_members(store, kind, &members)?;
            GroupAction::AddSelected { kind, name }
        }
        GroupCommand::Remove {
            kind,
            name,
            members,
        } => {
            select_members(store, kind, &members)?;
            GroupAction::RemoveSelected { kind, name }
        }
        GroupCommand::Delete { kind, name } => GroupAction::Delete { kind, name },
        GroupCommand::Permission {
            group,
            slug,
            permission,
        } => GroupAction::SetTeamPermission {
            group,
            slug,
            permission,
        },
    };

    store.dispatch(Action::Group(action));
    store.settle().await;
    if let Some(err) = &store.state().ui.group_error {
        bail!("{err}");
    }
    println!("groups saved");
    Ok(())
}

async fn run_bulk_command(
    store: &mut Store,
    repos: &[String],
    operation: BulkCommand,
    dry_run: bool,
) -> Result<()> {
    select_members(store, EntityKind::Repo, repos)?;
    store.dispatch(Action::Bulk(BulkAction::Open));
    store.settle().await;

    let request = match operation {
        BulkCommand::Topics { mode, topics } => BulkRequest::Topics {
            topics: parse_topic_list(&topics.join(",")),
            mode,
        },
        BulkCommand::Team {
            slug,
            permission,
            remove,
        } => BulkRequest::Team {
            slug,
            permission,
            remove,
        },
        BulkCommand::TeamGroup { group, remove } => BulkRequest::TeamGroup { group, remove },
        BulkCommand::Property { name, values } => {
            let value = match values.len() {
                0 => PropertyValue::Unset,
                1 => PropertyValue::Text(values.into_iter().next().unwrap_or_default()),
                _ => PropertyValue::List(values),
            };
            BulkRequest::CustomProperties {
                properties: BTreeMap::from([(name, value)]),
            }
        }
    };

    store.dispatch(Action::Bulk(BulkAction::Submit(request)));
    store.settle().await;

    let state = store.state();
    let surface_error = state.ui.bulk.as_ref().and_then(|surface| surface.error.as_ref());
    if let Some(err) = surface_error.or(state.ui.last_bulk_error.as_ref()) {
        bail!("{err}");
    }
    let report = state
        .ui
        .last_bulk_report
        .as_ref()
        .context("bulk operation did not run")?;
    println!(
        "{} {} call(s) in {} ms (run {})",
        if dry_run { "planned" } else { "applied" },
        report.calls,
        (report.finished_at - report.started_at).num_milliseconds(),
        report.run_id
    );
    Ok(())
}

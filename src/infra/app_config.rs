use fs4::fs_std::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use crate::domain::{ConfigError, RepoGroups, TeamGroups};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// Persisted client configuration.
///
/// `revision` increases by one on every successful save; stores reject a
/// save whose revision does not match the stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub revision: u64,
    pub theme: Theme,
    pub remember_pos: bool,
    pub default_org: Option<String>,
    pub selected_org: Option<String>,
    pub repo_groups: RepoGroups,
    pub team_groups: TeamGroups,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            revision: 0,
            theme: Theme::System,
            remember_pos: true,
            default_org: None,
            selected_org: None,
            repo_groups: RepoGroups::new(),
            team_groups: TeamGroups::new(),
        }
    }
}

pub trait ConfigStore: Send + Sync {
    fn get(&self) -> Result<AppConfig, ConfigError>;

    /// Writes `config` if its revision matches the stored one and returns the
    /// new revision.
    fn save(&self, config: &AppConfig) -> Result<u64, ConfigError>;
}

/// TOML file under the platform data directory.
///
/// Saves hold an exclusive lock on `<path>.lock` from the revision check to
/// the write, so separate processes (or separate instances in one process)
/// pointing at the same file serialize. The document is replaced through a
/// rename and readers never see a partial file.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Self {
        Self::new(config_path())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read(&self) -> Result<AppConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Released when the returned file is dropped.
    fn lock(&self) -> Result<File, ConfigError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling(".lock"))?;
        FileExt::lock_exclusive(&file)?;
        Ok(file)
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Result<AppConfig, ConfigError> {
        self.read()
    }

    fn save(&self, config: &AppConfig) -> Result<u64, ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let _lock = self.lock()?;
        let stored = self.read()?;
        if stored.revision != config.revision {
            return Err(ConfigError::Conflict {
                expected: config.revision,
                found: stored.revision,
            });
        }

        let mut next = config.clone();
        next.revision = stored.revision + 1;

        let contents = toml::to_string_pretty(&next)?;
        let staging = self.sibling(".tmp");
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &self.path)?;
        log::debug!(
            "saved config revision {} to {}",
            next.revision,
            self.path.display()
        );
        Ok(next.revision)
    }
}

/// In-process store with the same revision rules as the file store.
#[derive(Default)]
pub struct MemoryConfigStore {
    config: Mutex<AppConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.config.lock().clone())
    }

    fn save(&self, config: &AppConfig) -> Result<u64, ConfigError> {
        let mut stored = self.config.lock();
        if stored.revision != config.revision {
            return Err(ConfigError::Conflict {
                expected: config.revision,
                found: stored.revision,
            });
        }
        let mut next = config.clone();
        next.revision = stored.revision + 1;
        *stored = next;
        Ok(stored.revision)
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("GITHUB_ADMIN_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("GITHUB_ADMIN_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("GitHubAdmin");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("GitHubAdmin");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("github-admin");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".config").join("github-admin");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".github-admin")
}

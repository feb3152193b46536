//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::{API_KEY_ENV, Config, PORT_ENV};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Explicit config file, bypassing tier discovery.
pub const CONFIG_PATH_ENV: &str = "TODO_ASSIST_CONFIG_PATH";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/todo-assist/)
    Project = 1,
    /// User-level config (~/.todo-assist/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TODO_ASSIST_USER_DIR or ~/.todo-assist
        let user_dir = std::env::var("TODO_ASSIST_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".todo-assist")));

        // Project dir: TODO_ASSIST_PROJECT_DIR or $CWD/todo-assist
        let project_dir = std::env::var("TODO_ASSIST_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("todo-assist")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load configuration from all tiers using the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths using the process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |name| std::env::var(name).ok())
    }

    /// Load configuration with explicit paths and an environment lookup.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Explicit config path overrides the file tiers
        if let Some(explicit_path) = env(CONFIG_PATH_ENV) {
            let path = PathBuf::from(&explicit_path);
            let mut config = Config::load(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            Self::apply_env_overrides(&mut config, &env);
            return Ok(Self {
                paths,
                config,
                sources: vec![(ConfigTier::Environment, path)],
            });
        }

        let mut configs: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults
        configs.push(serde_json::to_value(Config::default())?);

        // Tier 2: Project config
        if let Some(ref project_dir) = paths.project_dir
            && let Some(value) = read_yaml_tier(&project_dir.join("config.yaml"))
        {
            configs.push(value);
            sources.push((ConfigTier::Project, project_dir.join("config.yaml")));
        }

        // Tier 3: User config
        if let Some(ref user_dir) = paths.user_dir
            && let Some(value) = read_yaml_tier(&user_dir.join("config.yaml"))
        {
            configs.push(value);
            sources.push((ConfigTier::User, user_dir.join("config.yaml")));
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config, &env);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides<F>(config: &mut Config, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env("TODO_ASSIST_DB_PATH") {
            config.storage.db_path = PathBuf::from(db_path);
        }

        if let Some(key) = env("TODO_ASSIST_STORAGE_KEY") {
            config.storage.key = key;
        }

        if let Some(host) = env("TODO_ASSIST_HOST") {
            config.server.host = host;
        }

        if let Some(port) = env(PORT_ENV) {
            match port.trim().parse::<u16>() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!("Ignoring invalid {}={:?}", PORT_ENV, port),
            }
        }

        if let Some(model) = env("TODO_ASSIST_MODEL") {
            config.ai.model = model;
        }

        if let Some(endpoint) = env("TODO_ASSIST_AI_ENDPOINT") {
            config.ai.endpoint = endpoint;
        }

        if let Some(secs) = env("TODO_ASSIST_AI_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.ai.timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid TODO_ASSIST_AI_TIMEOUT_SECS={:?}", secs),
            }
        }

        if let Some(url) = env("TODO_ASSIST_SERVER_URL") {
            config.client.server_url = url;
        }

        config.ai.api_key = env(API_KEY_ENV).filter(|k| !k.trim().is_empty());
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration (for CLI overrides).
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

/// Read one YAML tier. Unreadable or invalid files are skipped with a warning.
fn read_yaml_tier(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping unreadable config {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Skipping invalid config {}: {}", path.display(), e);
            None
        }
    }
}

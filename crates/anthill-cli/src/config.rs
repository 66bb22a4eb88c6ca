//! Configuration management for the anthill CLI.

use anthill::prelude::{AgentKind, ColonyConfig, WaitRange};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Overrides;

/// File name looked up in the current and parent directories.
pub const CONFIG_FILE: &str = "anthill.toml";

/// Project configuration, as stored in anthill.toml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub colony: ColonySection,
    #[serde(default)]
    pub observer: ObserverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonySection {
    #[serde(default = "default_agents")]
    pub agents: usize,
    #[serde(default = "default_kind")]
    pub kind: AgentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_min_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_max_ms: Option<u64>,
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    #[serde(default = "default_frames")]
    pub frames: u64,
}

// Default value functions
fn default_width() -> i32 { 10 }
fn default_height() -> i32 { 10 }
fn default_agents() -> usize { 5 }
fn default_kind() -> AgentKind { AgentKind::Worker }
fn default_join_timeout_ms() -> u64 { 1000 }
fn default_update_interval_ms() -> u64 { 100 }
fn default_frames() -> u64 { 20 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for ColonySection {
    fn default() -> Self {
        Self {
            agents: default_agents(),
            kind: default_kind(),
            seed: None,
            wait_min_ms: None,
            wait_max_ms: None,
            join_timeout_ms: default_join_timeout_ms(),
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            frames: default_frames(),
        }
    }
}

impl Config {
    /// Load config from anthill.toml in the current or parent directories.
    ///
    /// Returns the defaults and `None` when no file is found.
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        match find_config_file() {
            Some(path) => Ok((Self::load_from(&path)?, Some(path))),
            None => Ok((Config::default(), None)),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Apply command-line overrides in place.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(agents) = overrides.agents {
            self.colony.agents = agents;
        }
        if let Some(kind) = overrides.kind {
            self.colony.kind = kind;
        }
        if let Some(width) = overrides.width {
            self.grid.width = width;
        }
        if let Some(height) = overrides.height {
            self.grid.height = height;
        }
        if let Some(seed) = overrides.seed {
            self.colony.seed = Some(seed);
        }
        if let Some(ms) = overrides.interval_ms {
            self.observer.update_interval_ms = ms;
        }
    }

    /// Build and validate the runtime configuration.
    pub fn to_colony_config(&self) -> Result<ColonyConfig> {
        let mut config = ColonyConfig::default()
            .with_grid(self.grid.width, self.grid.height)
            .with_agents(self.colony.agents)
            .with_kind(self.colony.kind)
            .with_update_interval_ms(self.observer.update_interval_ms)
            .with_join_timeout_ms(self.colony.join_timeout_ms);

        match (self.colony.wait_min_ms, self.colony.wait_max_ms) {
            (Some(min_ms), Some(max_ms)) => config = config.with_wait(WaitRange::new(min_ms, max_ms)?),
            (None, None) => {}
            _ => bail!("wait_min_ms and wait_max_ms must be set together"),
        }
        if let Some(seed) = self.colony.seed {
            config = config.with_seed(seed);
        }

        config.validate().context("Invalid colony configuration")?;
        Ok(config)
    }
}

/// Load the config file and layer the command-line overrides on top.
pub fn effective(overrides: &Overrides) -> Result<Config> {
    let (mut config, _) = Config::load()?;
    config.apply(overrides);
    Ok(config)
}

/// Find anthill.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

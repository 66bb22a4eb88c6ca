//! Colony configuration.
//!
//! All tunables in one serializable struct. Defaults reproduce the classic
//! setup: a 10x10 grid, five workers, a frame every 100 ms.

use anthill_core::error::ConfigError;
use anthill_core::grid::Grid;
use anthill_core::types::{AgentKind, WaitRange};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyConfig {
    /// Grid width in cells (default: 10).
    #[serde(default = "default_width")]
    pub width: i32,
    /// Grid height in cells (default: 10).
    #[serde(default = "default_height")]
    pub height: i32,
    /// Ants spawned at startup (default: 5).
    #[serde(default = "default_agents")]
    pub agents: usize,
    /// Caste of the startup ants (default: worker).
    #[serde(default = "default_kind")]
    pub kind: AgentKind,
    /// Overrides the per-caste pause range when set.
    #[serde(default)]
    pub wait: Option<WaitRange>,
    /// Observer cadence in milliseconds (default: 100).
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// How long shutdown waits for each agent, in milliseconds (default: 1000).
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
    /// Seed for spawn positions and agent streams. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Buffered events per subscriber before it starts lagging (default: 256).
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_width() -> i32 { 10 }
fn default_height() -> i32 { 10 }
fn default_agents() -> usize { 5 }
fn default_kind() -> AgentKind { AgentKind::Worker }
fn default_update_interval_ms() -> u64 { 100 }
fn default_join_timeout_ms() -> u64 { 1000 }
fn default_event_capacity() -> usize { 256 }

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            agents: default_agents(),
            kind: default_kind(),
            wait: None,
            update_interval_ms: default_update_interval_ms(),
            join_timeout_ms: default_join_timeout_ms(),
            seed: None,
            event_capacity: default_event_capacity(),
        }
    }
}

impl ColonyConfig {
    pub fn with_grid(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_agents(mut self, agents: usize) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_kind(mut self, kind: AgentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_wait(mut self, wait: WaitRange) -> Self {
        self.wait = Some(wait);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_update_interval_ms(mut self, ms: u64) -> Self {
        self.update_interval_ms = ms;
        self
    }

    pub fn with_join_timeout_ms(mut self, ms: u64) -> Self {
        self.join_timeout_ms = ms;
        self
    }

    /// Check every value before anything is spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = Grid::new(self.width, self.height)?;
        if self.agents == 0 {
            return Err(ConfigError::ZeroAgents);
        }
        if self.agents > grid.capacity() {
            return Err(ConfigError::TooManyAgents {
                requested: self.agents,
                capacity: grid.capacity(),
            });
        }
        if let Some(wait) = &self.wait {
            wait.validate()?;
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.join_timeout_ms == 0 {
            return Err(ConfigError::ZeroJoinTimeout);
        }
        Ok(())
    }

    /// Pause range used for agents of `kind`.
    pub fn wait_for(&self, kind: AgentKind) -> WaitRange {
        self.wait.unwrap_or_else(|| kind.default_wait())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ColonyConfig::default();
        assert_eq!((config.width, config.height, config.agents), (10, 10, 5));
        assert_eq!(config.update_interval_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_agents_is_rejected() {
        let config = ColonyConfig::default().with_agents(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroAgents));
    }

    #[test]
    fn bad_grid_is_rejected() {
        let config = ColonyConfig::default().with_grid(0, 4);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGridSize { .. })));
    }

    #[test]
    fn overcrowding_is_rejected() {
        let config = ColonyConfig::default().with_grid(2, 2).with_agents(4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyAgents { requested: 4, capacity: 3 })
        );
    }

    #[test]
    fn inverted_wait_is_rejected() {
        let config = ColonyConfig::default().with_wait(WaitRange { min_ms: 9, max_ms: 1 });
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWaitRange { .. })));
    }

    #[test]
    fn wait_override_applies_to_every_kind() {
        let wait = WaitRange { min_ms: 1, max_ms: 2 };
        let config = ColonyConfig::default().with_wait(wait);
        assert_eq!(config.wait_for(AgentKind::Queen), wait);
        let plain = ColonyConfig::default();
        assert_eq!(plain.wait_for(AgentKind::Worker), AgentKind::Worker.default_wait());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ColonyConfig = serde_json::from_str(r#"{"agents": 8, "kind": "warrior"}"#).unwrap();
        assert_eq!(config.agents, 8);
        assert_eq!(config.kind, AgentKind::Warrior);
        assert_eq!(config.width, 10);
        assert_eq!(config.join_timeout_ms, 1000);
    }
}

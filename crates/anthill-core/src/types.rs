//! Shared value types used across the simulator crates.

use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A cell coordinate on the grid.
///
/// `x` is the column and `y` the row; rows grow downward when rendered.
/// Positions are plain values: a move produces a new `Position` rather
/// than mutating the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`. May lie off the grid.
    pub fn translate(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four unit steps an ant can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `(0, 1)`
    South,
    /// `(1, 0)`
    East,
    /// `(-1, 0)`
    West,
    /// `(0, -1)`
    North,
}

impl Direction {
    /// All directions, in sampling order.
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::North,
    ];

    /// The `(dx, dy)` offset of this step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    /// Pick a direction uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Unique identifier of an ant, e.g. `WORKER_3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the conventional `{PREFIX}_{sequence}` identifier.
    pub fn sequenced(kind: AgentKind, sequence: u64) -> Self {
        Self(format!("{}_{}", kind.id_prefix(), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Inclusive bounds, in milliseconds, for the pause between move attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl WaitRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, ConfigError> {
        let range = Self { min_ms, max_ms };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvalidWaitRange {
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }

    /// Sample a wait uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.min_ms.min(self.max_ms);
        let hi = self.min_ms.max(self.max_ms);
        Duration::from_millis(rng.gen_range(lo..=hi))
    }
}

impl fmt::Display for WaitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ms", self.min_ms, self.max_ms)
    }
}

/// The caste of an ant.
///
/// Kinds share one movement algorithm; they differ only in the parameters
/// carried here (pause range and map glyph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Worker,
    Warrior,
    Queen,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Worker, AgentKind::Warrior, AgentKind::Queen];

    /// Single-character map symbol.
    pub const fn glyph(self) -> char {
        match self {
            AgentKind::Worker => 'O',
            AgentKind::Warrior => 'G',
            AgentKind::Queen => 'R',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AgentKind::Worker => "Worker",
            AgentKind::Warrior => "Warrior",
            AgentKind::Queen => "Queen",
        }
    }

    pub const fn id_prefix(self) -> &'static str {
        match self {
            AgentKind::Worker => "WORKER",
            AgentKind::Warrior => "WARRIOR",
            AgentKind::Queen => "QUEEN",
        }
    }

    /// Default pause between move attempts.
    ///
    /// Workers are kept on a tighter cadence than the other castes.
    pub const fn default_wait(self) -> WaitRange {
        match self {
            AgentKind::Worker => WaitRange { min_ms: 500, max_ms: 1500 },
            AgentKind::Warrior | AgentKind::Queen => WaitRange { min_ms: 0, max_ms: 5000 },
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "worker" => Ok(AgentKind::Worker),
            "warrior" => Ok(AgentKind::Warrior),
            "queen" => Ok(AgentKind::Queen),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

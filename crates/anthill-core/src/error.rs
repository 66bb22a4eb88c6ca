//! Error types for colony operations.
//!
//! Configuration problems are fatal at startup. Everything an agent runs
//! into while moving is a [`Rejection`], which is an ordinary outcome.

use crate::types::{AgentId, Position};
use thiserror::Error;

/// Result type for colony operations.
pub type Result<T> = std::result::Result<T, ColonyError>;

/// Errors raised by the colony coordinator.
#[derive(Debug, Error)]
pub enum ColonyError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("agent has stopped: {0}")]
    AgentStopped(AgentId),

    #[error("agent already registered: {0}")]
    DuplicateAgent(AgentId),

    #[error("cannot place {id} at {position}: {reason}")]
    InvalidPlacement {
        id: AgentId,
        position: Position,
        reason: Rejection,
    },

    #[error("no free cell found for a new agent after {attempts} attempts")]
    GridFull { attempts: usize },

    #[error("agents must be spawned from inside a tokio runtime")]
    NoRuntime,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid grid size {width}x{height} (both dimensions must be at least 1)")]
    InvalidGridSize { width: i32, height: i32 },

    #[error("agent count must be at least 1")]
    ZeroAgents,

    #[error("{requested} agents do not fit on a grid with {capacity} free cells")]
    TooManyAgents { requested: usize, capacity: usize },

    #[error("invalid wait range {min_ms}-{max_ms} ms (min must not exceed max)")]
    InvalidWaitRange { min_ms: u64, max_ms: u64 },

    #[error("observer update interval must be greater than zero")]
    ZeroInterval,

    #[error("join timeout must be greater than zero")]
    ZeroJoinTimeout,

    #[error("unknown agent kind: {0:?} (expected worker, warrior or queen)")]
    UnknownKind(String),
}

/// Why a candidate move was refused. The agent stays where it was.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, serde::Serialize)]
pub enum Rejection {
    #[error("outside the grid")]
    OutOfBounds,

    #[error("the nest is off limits")]
    Nest,

    #[error("cell held by {by}")]
    Occupied { by: AgentId },
}

/// A broken colony invariant. Seeing one means the concurrency control
/// is wrong; it is never an expected runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{first} and {second} both occupy {position}")]
    SharedCell {
        first: AgentId,
        second: AgentId,
        position: Position,
    },

    #[error("{id} is standing on the nest at {position}")]
    OnNest { id: AgentId, position: Position },

    #[error("{id} is outside the grid at {position}")]
    OutOfBounds { id: AgentId, position: Position },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_colony_error() {
        let err: ColonyError = ConfigError::ZeroAgents.into();
        assert!(matches!(err, ColonyError::Config(ConfigError::ZeroAgents)));
        assert_eq!(err.to_string(), "configuration error: agent count must be at least 1");
    }

    #[test]
    fn placement_error_names_the_reason() {
        let err = ColonyError::InvalidPlacement {
            id: AgentId::new("WORKER_1"),
            position: Position::new(5, 5),
            reason: Rejection::Nest,
        };
        assert_eq!(err.to_string(), "cannot place WORKER_1 at (5, 5): the nest is off limits");
    }
}

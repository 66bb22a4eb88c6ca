//! Events broadcast by the colony while it runs.

use anthill_core::error::Rejection;
use anthill_core::types::{AgentId, AgentKind, Position};
use serde::Serialize;

/// Event emitted by the colony or one of its agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColonyEvent {
    /// An agent was registered on the grid.
    Spawned { id: AgentId, kind: AgentKind, position: Position },
    /// An agent committed a move.
    Moved { id: AgentId, from: Position, to: Position },
    /// An agent's move was refused; it stayed put.
    Rejected { id: AgentId, candidate: Position, reason: Rejection },
    /// A stop was requested for an agent.
    Stopping { id: AgentId },
    /// An agent's execution unit finished.
    Terminated { id: AgentId, exit: AgentExit },
}

/// How an agent's loop ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AgentExit {
    /// The stop flag was seen at a cycle boundary.
    Stopped,
    /// The agent was woken out of its wait by a stop request.
    Cancelled,
    /// The agent hit an error it could not recover from.
    Failed(String),
}

impl std::fmt::Display for AgentExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentExit::Stopped => f.write_str("stopped"),
            AgentExit::Cancelled => f.write_str("cancelled during wait"),
            AgentExit::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

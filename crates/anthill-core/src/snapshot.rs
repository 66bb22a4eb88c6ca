//! Read-only views of colony state handed to observers.

use crate::error::Rejection;
use crate::grid::Grid;
use crate::types::{AgentId, AgentKind, Position};
use serde::Serialize;
use std::fmt;

/// Where an agent is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum LifecycleState {
    Spawned = 0,
    Running = 1,
    Waiting = 2,
    AttemptingMove = 3,
    Stopping = 4,
    Terminated = 5,
}

impl LifecycleState {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Spawned,
            1 => LifecycleState::Running,
            2 => LifecycleState::Waiting,
            3 => LifecycleState::AttemptingMove,
            4 => LifecycleState::Stopping,
            _ => LifecycleState::Terminated,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Terminated
    }
}

/// Result of a single move attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MoveOutcome {
    Moved { from: Position, to: Position },
    Rejected { candidate: Position, reason: Rejection },
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// One row of a colony snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Position,
    pub alive: bool,
    pub state: LifecycleState,
    pub moves: u64,
    pub rejections: u64,
}

impl fmt::Display for AgentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ant {} | kind: {} | glyph: {} | position: {}",
            self.id,
            self.kind,
            self.kind.glyph(),
            self.position
        )
    }
}

/// Everything an observer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct ColonySnapshot {
    pub grid: Grid,
    /// Agents in spawn order.
    pub agents: Vec<AgentSnapshot>,
}

impl ColonySnapshot {
    /// Occupants in drawing order: stopped ants first, then live ones,
    /// so a live ant's glyph wins on a shared cell.
    pub fn occupants(&self) -> Vec<(Position, char)> {
        let stopped = self.agents.iter().filter(|a| !a.alive);
        let alive = self.agents.iter().filter(|a| a.alive);
        stopped
            .chain(alive)
            .map(|a| (a.position, a.kind.glyph()))
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

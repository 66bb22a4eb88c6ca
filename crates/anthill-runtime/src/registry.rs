//! Registry: the authoritative agent collection and occupancy map.
//!
//! Every position on the grid is read and written through here. A single
//! lock covers the whole map, so "is the cell free?" and "take the cell"
//! happen in one critical section and two ants can never both claim the
//! same square. At colony scale (dozens of ants) a per-cell lock would
//! not buy anything.
//!
//! Agents are never removed. A stopped agent keeps its slot, reports
//! `alive = false` in snapshots and no longer counts as an occupant.

use crate::agent::Agent;
use anthill_core::error::{ColonyError, InvariantViolation, Rejection, Result};
use anthill_core::grid::Grid;
use anthill_core::snapshot::{AgentSnapshot, MoveOutcome};
use anthill_core::types::{AgentId, Direction, Position};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Slot {
    agent: Arc<Agent>,
    position: Position,
    order: u64,
}

#[derive(Default)]
struct Slots {
    by_id: HashMap<AgentId, Slot>,
    next_order: u64,
}

impl Slots {
    fn occupant(&self, position: Position, excluding: Option<&AgentId>) -> Option<&AgentId> {
        self.by_id
            .iter()
            .find(|(id, slot)| {
                slot.position == position
                    && slot.agent.is_alive()
                    && excluding.map_or(true, |ex| ex != *id)
            })
            .map(|(id, _)| id)
    }

    fn ordered(&self) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self.by_id.values().collect();
        slots.sort_by_key(|s| s.order);
        slots
    }
}

/// The shared agent map. One per colony.
pub struct Registry {
    grid: Arc<Grid>,
    slots: RwLock<Slots>,
}

impl Registry {
    pub fn new(grid: Arc<Grid>) -> Self {
        Self {
            grid,
            slots: RwLock::new(Slots::default()),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    // A panic while holding the lock cannot leave a half-written slot:
    // every mutation is a single insert or assignment.
    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an agent at `position`.
    ///
    /// Fails if the id is taken, the cell is off the grid or the nest, or
    /// another live agent already stands there.
    pub fn register(&self, agent: Arc<Agent>, position: Position) -> Result<()> {
        let mut slots = self.write();
        let id = agent.id().clone();

        if slots.by_id.contains_key(&id) {
            return Err(ColonyError::DuplicateAgent(id));
        }

        let reason = match self.grid.check_enterable(position) {
            Err(reason) => Some(reason),
            Ok(()) => slots
                .occupant(position, None)
                .map(|by| Rejection::Occupied { by: by.clone() }),
        };
        if let Some(reason) = reason {
            return Err(ColonyError::InvalidPlacement { id, position, reason });
        }

        let order = slots.next_order;
        slots.next_order += 1;
        slots.by_id.insert(id, Slot { agent, position, order });
        Ok(())
    }

    /// Whether a live agent other than `excluding` stands on `position`.
    pub fn is_occupied(&self, position: Position, excluding: Option<&AgentId>) -> bool {
        self.read().occupant(position, excluding).is_some()
    }

    /// Take one step for `agent` towards `direction`.
    ///
    /// The current cell is read, translated, validated and committed in
    /// one critical section, so a step always lands next to the cell the
    /// agent held when the lock was taken. A rejected step leaves the
    /// agent where it was.
    pub fn try_step(&self, agent: &Agent, direction: Direction) -> Result<MoveOutcome> {
        let mut slots = self.write();

        let from = slots
            .by_id
            .get(agent.id())
            .map(|slot| slot.position)
            .ok_or_else(|| ColonyError::AgentNotFound(agent.id().clone()))?;

        if !agent.is_alive() {
            return Err(ColonyError::AgentStopped(agent.id().clone()));
        }

        let candidate = from.translate(direction);
        if let Err(reason) = self.grid.check_enterable(candidate) {
            return Ok(MoveOutcome::Rejected { candidate, reason });
        }
        if let Some(by) = slots.occupant(candidate, Some(agent.id())) {
            let reason = Rejection::Occupied { by: by.clone() };
            return Ok(MoveOutcome::Rejected { candidate, reason });
        }

        if let Some(slot) = slots.by_id.get_mut(agent.id()) {
            slot.position = candidate;
        }
        Ok(MoveOutcome::Moved { from, to: candidate })
    }

    pub fn position_of(&self, id: &AgentId) -> Option<Position> {
        self.read().by_id.get(id).map(|slot| slot.position)
    }

    pub fn get(&self, id: &AgentId) -> Option<Arc<Agent>> {
        self.read().by_id.get(id).map(|slot| Arc::clone(&slot.agent))
    }

    /// All agents in spawn order.
    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.read()
            .ordered()
            .into_iter()
            .map(|slot| Arc::clone(&slot.agent))
            .collect()
    }

    /// Cells held by live agents.
    pub fn occupied_cells(&self) -> HashSet<Position> {
        self.read()
            .by_id
            .values()
            .filter(|slot| slot.agent.is_alive())
            .map(|slot| slot.position)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alive_count(&self) -> usize {
        self.read()
            .by_id
            .values()
            .filter(|slot| slot.agent.is_alive())
            .count()
    }

    /// Positions and flags of every agent, in spawn order.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.read()
            .ordered()
            .into_iter()
            .map(|slot| AgentSnapshot {
                id: slot.agent.id().clone(),
                kind: slot.agent.kind(),
                position: slot.position,
                alive: slot.agent.is_alive(),
                state: slot.agent.state(),
                moves: slot.agent.moves(),
                rejections: slot.agent.rejections(),
            })
            .collect()
    }

    /// Check the colony invariants against the current map: live agents
    /// are in bounds, off the nest, and on pairwise distinct cells.
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        let slots = self.read();
        let mut seen: HashMap<Position, &AgentId> = HashMap::new();

        for slot in slots.ordered() {
            if !slot.agent.is_alive() {
                continue;
            }
            let id = slot.agent.id();
            let position = slot.position;
            if !self.grid.within_bounds(position) {
                return Err(InvariantViolation::OutOfBounds { id: id.clone(), position });
            }
            if position == self.grid.nest_position() {
                return Err(InvariantViolation::OnNest { id: id.clone(), position });
            }
            if let Some(first) = seen.insert(position, id) {
                return Err(InvariantViolation::SharedCell {
                    first: first.clone(),
                    second: id.clone(),
                    position,
                });
            }
        }
        Ok(())
    }
}

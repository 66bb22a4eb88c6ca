//! Colony: agent lifecycle management.
//!
//! The colony owns the grid, the registry and one tokio task per ant.
//! It is the callable surface for everything outside the engine:
//!
//! - [`Colony::spawn`] places ants on random free cells and starts them
//! - [`Colony::run_n_iterations`] drives every live ant one step per
//!   iteration, synchronously, for scripted runs and replay
//! - [`Colony::stop_all`] stops every ant and joins its task with a
//!   bounded timeout
//! - [`Colony::snapshot`], [`Colony::render`], [`Colony::stats`] are the
//!   read-only queries observers use

use crate::agent::{self, Agent};
use crate::config::ColonyConfig;
use crate::event::{AgentExit, ColonyEvent};
use crate::registry::Registry;
use crate::rng::{create_rng, derive_agent_rng};
use anthill_core::error::{ColonyError, InvariantViolation, Rejection, Result};
use anthill_core::grid::{Grid, GridView};
use anthill_core::snapshot::{ColonySnapshot, MoveOutcome};
use anthill_core::types::{AgentId, AgentKind, Position};
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Random placement attempts per free cell before giving up.
const PLACEMENT_ATTEMPTS_PER_CELL: usize = 16;

/// Statistics about the colony.
#[derive(Debug, Clone, Serialize)]
pub struct ColonyStats {
    pub agents_total: usize,
    pub agents_alive: usize,
    pub agents_stopped: usize,
    pub moves_committed: u64,
    pub moves_rejected: u64,
    pub width: i32,
    pub height: i32,
    pub nest: Position,
    pub update_interval_ms: u64,
}

impl ColonyStats {
    pub fn is_active(&self) -> bool {
        self.agents_alive > 0
    }
}

/// Tally of a [`Colony::run_n_iterations`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IterationReport {
    pub iterations: u64,
    pub attempted: u64,
    pub moved: u64,
    pub rejected_out_of_bounds: u64,
    pub rejected_nest: u64,
    pub rejected_occupied: u64,
}

impl IterationReport {
    pub fn rejected(&self) -> u64 {
        self.rejected_out_of_bounds + self.rejected_nest + self.rejected_occupied
    }

    fn record(&mut self, outcome: &MoveOutcome) {
        self.attempted += 1;
        match outcome {
            MoveOutcome::Moved { .. } => self.moved += 1,
            MoveOutcome::Rejected { reason, .. } => match reason {
                Rejection::OutOfBounds => self.rejected_out_of_bounds += 1,
                Rejection::Nest => self.rejected_nest += 1,
                Rejection::Occupied { .. } => self.rejected_occupied += 1,
            },
        }
    }
}

/// Outcome of [`Colony::stop_all`]. Timeouts are reported, not fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShutdownReport {
    /// Agents whose flag this call flipped.
    pub stopped: usize,
    /// Tasks that finished within the timeout.
    pub joined: usize,
    /// Tasks that had to be aborted after the timeout.
    pub timed_out: Vec<AgentId>,
    /// Tasks that panicked or were already cancelled.
    pub failed: Vec<AgentId>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.timed_out.is_empty() && self.failed.is_empty()
    }
}

/// The colony: manages agent lifecycle and shared state.
pub struct Colony {
    config: ColonyConfig,
    seed: u64,
    grid: Arc<Grid>,
    registry: Arc<Registry>,
    tasks: Mutex<Vec<(AgentId, JoinHandle<AgentExit>)>>,
    sequences: Mutex<HashMap<AgentKind, u64>>,
    rng: Mutex<ChaCha12Rng>,
    spawned: AtomicU64,
    events: broadcast::Sender<ColonyEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Colony {
    /// Create a colony with default configuration.
    pub fn new() -> Result<Self> {
        Self::from_config(ColonyConfig::default())
    }

    /// Create a colony from a validated configuration. Nothing is spawned
    /// yet.
    pub fn from_config(config: ColonyConfig) -> Result<Self> {
        config.validate()?;
        let grid = Arc::new(Grid::new(config.width, config.height)?);
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        info!(
            width = grid.width(),
            height = grid.height(),
            nest = %grid.nest_position(),
            seed,
            "colony created"
        );

        Ok(Self {
            registry: Arc::new(Registry::new(Arc::clone(&grid))),
            grid,
            seed,
            tasks: Mutex::new(Vec::new()),
            sequences: Mutex::new(HashMap::new()),
            rng: Mutex::new(create_rng(seed)),
            spawned: AtomicU64::new(0),
            events,
            config,
        })
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// The seed actually in use (drawn at random when not configured).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Receive colony events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ColonyEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ColonyEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Build an agent with the next id of its kind and hand it to
    /// `register`. The sequence number is only used up if registration
    /// succeeds, so rejected placements leave no gaps in the numbering.
    fn enlist<F>(&self, kind: AgentKind, register: F) -> Result<(Arc<Agent>, Position)>
    where
        F: FnOnce(&Arc<Agent>) -> Result<Position>,
    {
        let mut sequences = lock(&self.sequences);
        let n = sequences.get(&kind).copied().unwrap_or(0) + 1;
        let ordinal = self.spawned.fetch_add(1, Ordering::Relaxed);
        let agent = Arc::new(Agent::new(
            AgentId::sequenced(kind, n),
            kind,
            self.config.wait_for(kind),
            derive_agent_rng(self.seed, ordinal),
        ));
        let position = register(&agent)?;
        sequences.insert(kind, n);
        Ok((agent, position))
    }

    /// Register `agent` on a random free cell.
    ///
    /// Cells are drawn until one is off the nest and not held by a live
    /// ant; the registry re-checks under its lock, so a cell taken in the
    /// meantime just means another draw.
    fn place_randomly(&self, agent: &Arc<Agent>) -> Result<Position> {
        let attempts = self.grid.capacity().max(1) * PLACEMENT_ATTEMPTS_PER_CELL;
        for _ in 0..attempts {
            let candidate = {
                let mut rng = lock(&self.rng);
                Position::new(
                    rng.gen_range(0..self.grid.width()),
                    rng.gen_range(0..self.grid.height()),
                )
            };
            match self.registry.register(Arc::clone(agent), candidate) {
                Ok(()) => return Ok(candidate),
                Err(ColonyError::InvalidPlacement { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ColonyError::GridFull { attempts })
    }

    fn check_room_for(&self, count: usize) -> Result<()> {
        let capacity = self.grid.capacity();
        let requested = self.registry.alive_count() + count;
        if requested > capacity {
            return Err(anthill_core::error::ConfigError::TooManyAgents { requested, capacity }.into());
        }
        Ok(())
    }

    /// Spawn `count` ants of one kind. See [`Colony::spawn_with`].
    pub fn spawn(&self, count: usize, kind: AgentKind) -> Result<Vec<Arc<Agent>>> {
        self.spawn_with(count, |_| kind)
    }

    /// Spawn `count` ants, asking `kind_of(i)` for the caste of the i-th.
    ///
    /// Each ant gets a random free cell, an id like `WORKER_3` and its own
    /// task on the current tokio runtime.
    pub fn spawn_with<F>(&self, count: usize, mut kind_of: F) -> Result<Vec<Arc<Agent>>>
    where
        F: FnMut(usize) -> AgentKind,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ColonyError::NoRuntime)?;
        self.check_room_for(count)?;

        let mut spawned = Vec::with_capacity(count);
        for i in 0..count {
            let (agent, position) = self.enlist(kind_of(i), |agent| self.place_randomly(agent))?;

            info!(
                agent = %agent.id(),
                kind = %agent.kind(),
                glyph = %agent.kind().glyph(),
                %position,
                "ant spawned"
            );
            self.emit(ColonyEvent::Spawned {
                id: agent.id().clone(),
                kind: agent.kind(),
                position,
            });

            let handle = runtime.spawn(agent::run(
                Arc::clone(&agent),
                Arc::clone(&self.registry),
                self.events.clone(),
            ));
            lock(&self.tasks).push((agent.id().clone(), handle));
            spawned.push(agent);
        }

        info!(count = spawned.len(), alive = self.registry.alive_count(), "spawn complete");
        Ok(spawned)
    }

    /// Register a live ant at a chosen cell without starting its task.
    ///
    /// Such an ant only moves through [`Colony::run_n_iterations`].
    pub fn place(&self, kind: AgentKind, position: Position) -> Result<Arc<Agent>> {
        let (agent, position) = self.enlist(kind, |agent| {
            self.registry.register(Arc::clone(agent), position)?;
            Ok(position)
        })?;
        debug!(agent = %agent.id(), %position, "ant placed");
        self.emit(ColonyEvent::Spawned {
            id: agent.id().clone(),
            kind,
            position,
        });
        Ok(agent)
    }

    /// Run `n` iterations. In each, every live ant makes one random move
    /// attempt, in spawn order.
    ///
    /// Moves go through the same locked check-then-commit as the tasks,
    /// so this is safe while tasks are running too.
    pub fn run_n_iterations(&self, n: u64) -> Result<IterationReport> {
        let mut report = IterationReport::default();
        for _ in 0..n {
            for agent in self.registry.agents() {
                if !agent.is_alive() {
                    continue;
                }
                let outcome = match agent.attempt_move(&self.registry) {
                    Ok(outcome) => outcome,
                    Err(ColonyError::AgentStopped(_)) => continue,
                    Err(e) => return Err(e),
                };
                report.record(&outcome);
                self.emit(match outcome {
                    MoveOutcome::Moved { from, to } => ColonyEvent::Moved {
                        id: agent.id().clone(),
                        from,
                        to,
                    },
                    MoveOutcome::Rejected { candidate, reason } => ColonyEvent::Rejected {
                        id: agent.id().clone(),
                        candidate,
                        reason,
                    },
                });
            }
            report.iterations += 1;
        }
        debug!(?report, "iterations complete");
        Ok(report)
    }

    /// Stop a single ant. Its task exits at its next wait boundary.
    pub fn stop(&self, id: &AgentId) -> Result<()> {
        let agent = self
            .registry
            .get(id)
            .ok_or_else(|| ColonyError::AgentNotFound(id.clone()))?;
        if agent.stop() {
            info!(agent = %id, "stopping ant");
            self.emit(ColonyEvent::Stopping { id: id.clone() });
        }
        Ok(())
    }

    /// Stop every ant, then join each task.
    ///
    /// Each join is bounded by the configured timeout. A task that does
    /// not finish in time is logged, aborted and listed in the report;
    /// shutdown carries on with the rest.
    pub async fn stop_all(&self) -> ShutdownReport {
        let mut report = ShutdownReport::default();

        for agent in self.registry.agents() {
            if agent.stop() {
                report.stopped += 1;
                self.emit(ColonyEvent::Stopping { id: agent.id().clone() });
            }
        }
        info!(stopped = report.stopped, "stop requested for all ants");

        let tasks = std::mem::take(&mut *lock(&self.tasks));
        let timeout = self.config.join_timeout();

        for (id, mut handle) in tasks {
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(exit)) => {
                    debug!(agent = %id, %exit, "ant joined");
                    report.joined += 1;
                }
                Ok(Err(e)) => {
                    warn!(agent = %id, error = %e, "ant task ended abnormally");
                    report.failed.push(id);
                }
                Err(_) => {
                    warn!(agent = %id, timeout_ms = self.config.join_timeout_ms, "ant did not finish in time; aborting");
                    handle.abort();
                    report.timed_out.push(id);
                }
            }
        }

        info!(
            joined = report.joined,
            timed_out = report.timed_out.len(),
            failed = report.failed.len(),
            "colony stopped"
        );
        report
    }

    /// Tasks still running.
    pub fn running_tasks(&self) -> usize {
        lock(&self.tasks)
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    pub fn alive_count(&self) -> usize {
        self.registry.alive_count()
    }

    pub fn is_active(&self) -> bool {
        self.alive_count() > 0
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            grid: (*self.grid).clone(),
            agents: self.registry.snapshot(),
        }
    }

    /// Draw the current map.
    pub fn render(&self) -> GridView {
        let snapshot = self.snapshot();
        self.grid.render(&snapshot.occupants())
    }

    pub fn stats(&self) -> ColonyStats {
        let agents = self.registry.snapshot();
        let alive = agents.iter().filter(|a| a.alive).count();
        ColonyStats {
            agents_total: agents.len(),
            agents_alive: alive,
            agents_stopped: agents.len() - alive,
            moves_committed: agents.iter().map(|a| a.moves).sum(),
            moves_rejected: agents.iter().map(|a| a.rejections).sum(),
            width: self.grid.width(),
            height: self.grid.height(),
            nest: self.grid.nest_position(),
            update_interval_ms: self.config.update_interval_ms,
        }
    }

    /// Check the colony invariants. See [`Registry::verify`].
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        self.registry.verify()
    }
}

impl Drop for Colony {
    fn drop(&mut self) {
        // Tasks only hold the registry, so they would outlive us.
        for agent in self.registry.agents() {
            agent.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anthill_core::types::WaitRange;

    fn quiet_config() -> ColonyConfig {
        ColonyConfig::default()
            .with_seed(11)
            .with_wait(WaitRange { min_ms: 1, max_ms: 3 })
            .with_join_timeout_ms(500)
    }

    #[test]
    fn invalid_config_is_rejected_before_anything_runs() {
        let err = Colony::from_config(ColonyConfig::default().with_agents(0)).err().unwrap();
        assert!(matches!(
            err,
            ColonyError::Config(anthill_core::error::ConfigError::ZeroAgents)
        ));
    }

    #[test]
    fn spawn_outside_runtime_is_an_error() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        assert!(matches!(colony.spawn(1, AgentKind::Worker), Err(ColonyError::NoRuntime)));
        assert_eq!(colony.alive_count(), 0);
    }

    #[test]
    fn place_assigns_sequenced_ids_per_kind() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        let w1 = colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();
        let q1 = colony.place(AgentKind::Queen, Position::new(1, 0)).unwrap();
        let w2 = colony.place(AgentKind::Worker, Position::new(2, 0)).unwrap();
        assert_eq!(w1.id().as_str(), "WORKER_1");
        assert_eq!(q1.id().as_str(), "QUEEN_1");
        assert_eq!(w2.id().as_str(), "WORKER_2");
    }

    #[test]
    fn rejected_placement_does_not_use_up_an_id() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        let nest = colony.grid().nest_position();
        assert!(colony.place(AgentKind::Worker, nest).is_err());
        assert!(colony.place(AgentKind::Worker, Position::new(-1, 0)).is_err());
        let first = colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();
        assert!(colony.place(AgentKind::Worker, Position::new(0, 0)).is_err());
        let second = colony.place(AgentKind::Worker, Position::new(1, 0)).unwrap();
        assert_eq!(first.id().as_str(), "WORKER_1");
        assert_eq!(second.id().as_str(), "WORKER_2");
    }

    #[test]
    fn placed_ant_terminates_when_stopped() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        let a = colony.place(AgentKind::Queen, Position::new(0, 0)).unwrap();
        colony.stop(a.id()).unwrap();
        assert_eq!(a.state(), anthill_core::snapshot::LifecycleState::Terminated);
    }

    #[test]
    fn run_n_iterations_counts_every_attempt() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();
        colony.place(AgentKind::Worker, Position::new(9, 9)).unwrap();

        let report = colony.run_n_iterations(25).unwrap();
        assert_eq!(report.iterations, 25);
        assert_eq!(report.attempted, 50);
        assert_eq!(report.moved + report.rejected(), 50);
        assert!(colony.verify().is_ok());

        let stats = colony.stats();
        assert_eq!(stats.moves_committed, report.moved);
        assert_eq!(stats.moves_rejected, report.rejected());
    }

    #[test]
    fn stopped_ants_are_skipped_by_iterations() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        let a = colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();
        colony.stop(a.id()).unwrap();
        let report = colony.run_n_iterations(10).unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(colony.registry().position_of(a.id()), Some(Position::new(0, 0)));
    }

    #[test]
    fn stop_unknown_ant_is_an_error() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        assert!(matches!(
            colony.stop(&AgentId::new("WORKER_42")),
            Err(ColonyError::AgentNotFound(_))
        ));
    }

    #[test]
    fn render_shows_nest_and_ants() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        colony.place(AgentKind::Warrior, Position::new(0, 0)).unwrap();
        let view = colony.render();
        assert_eq!(view.glyph_at(Position::new(0, 0)), Some('G'));
        assert_eq!(view.glyph_at(Position::new(5, 5)), Some('H'));
        assert_eq!(view.count('.'), 98);
    }

    #[test]
    fn same_seed_same_spawn_layout_for_placed_iterations() {
        let run = || {
            let colony = Colony::from_config(quiet_config()).unwrap();
            colony.place(AgentKind::Worker, Position::new(1, 1)).unwrap();
            colony.place(AgentKind::Worker, Position::new(8, 8)).unwrap();
            colony.run_n_iterations(40).unwrap();
            colony.snapshot().agents.into_iter().map(|a| a.position).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn spawn_starts_tasks_and_stop_all_joins_them() {
        let colony = Colony::from_config(quiet_config()).unwrap();
        let agents = colony.spawn(5, AgentKind::Worker).unwrap();
        assert_eq!(agents.len(), 5);
        assert_eq!(colony.running_tasks(), 5);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let report = colony.stop_all().await;

        assert_eq!(report.stopped, 5);
        assert_eq!(report.joined, 5);
        assert!(report.is_clean());
        assert_eq!(colony.running_tasks(), 0);
        assert!(agents.iter().all(|a| !a.is_alive()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stuck_task_is_reported_and_shutdown_carries_on() {
        let colony = Colony::from_config(quiet_config().with_join_timeout_ms(50)).unwrap();
        colony.spawn(3, AgentKind::Worker).unwrap();

        // A task that ignores stop requests.
        let stuck = AgentId::new("WORKER_STUCK");
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            AgentExit::Stopped
        });
        lock(&colony.tasks).push((stuck.clone(), handle));

        let started = std::time::Instant::now();
        let report = colony.stop_all().await;

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(report.stopped, 3);
        assert_eq!(report.joined, 3);
        assert_eq!(report.timed_out, vec![stuck]);
        assert!(report.failed.is_empty());
        assert!(!report.is_clean());
        assert_eq!(colony.alive_count(), 0);
    }

    #[tokio::test]
    async fn spawn_refuses_more_ants_than_free_cells() {
        let config = quiet_config().with_grid(2, 2).with_agents(1);
        let colony = Colony::from_config(config).unwrap();
        let err = colony.spawn(4, AgentKind::Worker).err().unwrap();
        assert!(matches!(
            err,
            ColonyError::Config(anthill_core::error::ConfigError::TooManyAgents { .. })
        ));
        assert_eq!(colony.registry().len(), 0);
        colony.stop_all().await;
    }
}

//! Agent: one ant and the loop that drives it.
//!
//! An [`Agent`] is plain shared state: identity, caste, liveness flag,
//! lifecycle state and its own random source. Behavior is the free
//! function [`run`], which the colony hands to the tokio scheduler, one
//! task per ant.
//!
//! Each cycle the ant:
//! 1. Samples a pause from its wait range and sleeps
//! 2. Leaves if it was stopped meanwhile
//! 3. Picks one of four directions at random
//! 4. Asks the registry to validate and commit the step atomically
//!
//! The ant's position lives in the registry, which is the only place
//! positions are read or written.

use crate::event::{AgentExit, ColonyEvent};
use crate::registry::Registry;
use anthill_core::error::{ColonyError, Result};
use anthill_core::snapshot::{LifecycleState, MoveOutcome};
use anthill_core::types::{AgentId, AgentKind, Direction, WaitRange};
use rand_chacha::ChaCha12Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tracing::{debug, info, warn};

pub struct Agent {
    id: AgentId,
    kind: AgentKind,
    wait: WaitRange,
    alive: AtomicBool,
    state: AtomicU8,
    wake: Notify,
    rng: Mutex<ChaCha12Rng>,
    moves: AtomicU64,
    rejections: AtomicU64,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, wait: WaitRange, rng: ChaCha12Rng) -> Self {
        Self {
            id,
            kind,
            wait,
            alive: AtomicBool::new(true),
            state: AtomicU8::new(LifecycleState::Spawned as u8),
            wake: Notify::new(),
            rng: Mutex::new(rng),
            moves: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn wait_range(&self) -> WaitRange {
        self.wait
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Enter a working state. Refused once a stop is under way, so the
    /// lifecycle never goes from Stopping back to Waiting.
    fn advance(&self, next: LifecycleState) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if matches!(
                LifecycleState::from_u8(current),
                LifecycleState::Stopping | LifecycleState::Terminated
            ) {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    fn finish(&self) {
        self.state.store(LifecycleState::Terminated as u8, Ordering::Release);
    }

    /// Committed moves so far.
    pub fn moves(&self) -> u64 {
        self.moves.load(Ordering::Relaxed)
    }

    /// Refused moves so far.
    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }

    /// Request a stop. Wakes the agent if it is waiting; a move already
    /// being committed still completes.
    ///
    /// An agent whose loop never started (placed by hand, or not yet
    /// polled) has nothing to wind down and goes straight to Terminated.
    ///
    /// Returns `true` if this call flipped the flag.
    pub fn stop(&self) -> bool {
        let was_alive = self.alive.swap(false, Ordering::AcqRel);
        if was_alive {
            let mut current = self.state.load(Ordering::Acquire);
            loop {
                let next = match LifecycleState::from_u8(current) {
                    LifecycleState::Terminated => break,
                    LifecycleState::Spawned => LifecycleState::Terminated,
                    _ => LifecycleState::Stopping,
                };
                match self.state.compare_exchange_weak(
                    current,
                    next as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => break,
                    Err(actual) => current = actual,
                }
            }
            self.wake.notify_one();
        }
        was_alive
    }

    fn rng(&self) -> MutexGuard<'_, ChaCha12Rng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sample the next pause.
    pub fn next_wait(&self) -> Duration {
        self.wait.sample(&mut *self.rng())
    }

    /// Sample the next direction.
    pub fn next_direction(&self) -> Direction {
        Direction::random(&mut *self.rng())
    }

    /// One random single-step move attempt.
    pub fn attempt_move(&self, registry: &Registry) -> Result<MoveOutcome> {
        let direction = self.next_direction();
        self.attempt_move_towards(direction, registry)
    }

    /// Attempt a step in a given direction.
    ///
    /// The registry reads the current cell, checks bounds, the nest and
    /// occupancy and commits under one lock. A rejection leaves the
    /// position unchanged.
    pub fn attempt_move_towards(
        &self,
        direction: Direction,
        registry: &Registry,
    ) -> Result<MoveOutcome> {
        let outcome = registry.try_step(self, direction)?;
        match &outcome {
            MoveOutcome::Moved { .. } => self.moves.fetch_add(1, Ordering::Relaxed),
            MoveOutcome::Rejected { .. } => self.rejections.fetch_add(1, Ordering::Relaxed),
        };
        Ok(outcome)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("alive", &self.is_alive())
            .field("state", &self.state())
            .finish()
    }
}

/// Drive an agent until it is stopped.
///
/// Stopping is cooperative: a stop during the pause wakes the agent and
/// it leaves without moving; otherwise the flag is seen at the next cycle
/// boundary. Errors end this agent only and are reported as
/// [`AgentExit::Failed`].
pub async fn run(
    agent: Arc<Agent>,
    registry: Arc<Registry>,
    events: broadcast::Sender<ColonyEvent>,
) -> AgentExit {
    agent.advance(LifecycleState::Running);
    debug!(agent = %agent.id, kind = ?agent.kind, "agent running");

    let exit = loop {
        if !agent.is_alive() {
            break AgentExit::Stopped;
        }

        let pause = agent.next_wait();
        if !agent.advance(LifecycleState::Waiting) {
            break AgentExit::Stopped;
        }
        tokio::select! {
            biased;
            _ = agent.wake.notified() => {
                if !agent.is_alive() {
                    break AgentExit::Cancelled;
                }
                continue;
            }
            _ = tokio::time::sleep(pause) => {}
        }

        if !agent.is_alive() {
            break AgentExit::Stopped;
        }

        if !agent.advance(LifecycleState::AttemptingMove) {
            break AgentExit::Stopped;
        }
        match agent.attempt_move(&registry) {
            Ok(MoveOutcome::Moved { from, to }) => {
                debug!(agent = %agent.id, %from, %to, "moved");
                let _ = events.send(ColonyEvent::Moved { id: agent.id.clone(), from, to });
            }
            Ok(MoveOutcome::Rejected { candidate, reason }) => {
                debug!(agent = %agent.id, %candidate, %reason, "move rejected");
                let _ = events.send(ColonyEvent::Rejected {
                    id: agent.id.clone(),
                    candidate,
                    reason,
                });
            }
            Err(ColonyError::AgentStopped(_)) => break AgentExit::Stopped,
            Err(e) => {
                warn!(agent = %agent.id, error = %e, "agent failed");
                break AgentExit::Failed(e.to_string());
            }
        }
    };

    agent.finish();
    info!(agent = %agent.id, exit = %exit, "agent finished");
    let _ = events.send(ColonyEvent::Terminated {
        id: agent.id.clone(),
        exit: exit.clone(),
    });
    exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use anthill_core::error::Rejection;
    use anthill_core::grid::Grid;
    use anthill_core::types::Position;

    fn setup(positions: &[(u64, Position)]) -> (Arc<Registry>, Vec<Arc<Agent>>) {
        let registry = Arc::new(Registry::new(Arc::new(Grid::new(10, 10).unwrap())));
        let agents = positions
            .iter()
            .map(|&(n, pos)| {
                let kind = AgentKind::Worker;
                let agent = Arc::new(Agent::new(
                    AgentId::sequenced(kind, n),
                    kind,
                    WaitRange { min_ms: 1, max_ms: 5 },
                    create_rng(n),
                ));
                registry.register(Arc::clone(&agent), pos).unwrap();
                agent
            })
            .collect();
        (registry, agents)
    }

    #[test]
    fn step_off_the_edge_is_rejected() {
        let (registry, agents) = setup(&[(1, Position::new(0, 0))]);
        let outcome = agents[0].attempt_move_towards(Direction::West, &registry).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Rejected {
                candidate: Position::new(-1, 0),
                reason: Rejection::OutOfBounds,
            }
        );
        assert_eq!(registry.position_of(agents[0].id()), Some(Position::new(0, 0)));
        assert_eq!(agents[0].rejections(), 1);
    }

    #[test]
    fn step_into_the_nest_is_rejected() {
        let (registry, agents) = setup(&[(1, Position::new(4, 5))]);
        let outcome = agents[0].attempt_move_towards(Direction::East, &registry).unwrap();
        assert!(matches!(outcome, MoveOutcome::Rejected { reason: Rejection::Nest, .. }));
        assert_eq!(registry.position_of(agents[0].id()), Some(Position::new(4, 5)));
    }

    #[test]
    fn step_onto_another_ant_is_rejected() {
        let (registry, agents) = setup(&[(1, Position::new(3, 4)), (2, Position::new(2, 4))]);
        let outcome = agents[1].attempt_move_towards(Direction::East, &registry).unwrap();
        assert!(matches!(outcome, MoveOutcome::Rejected { reason: Rejection::Occupied { .. }, .. }));
        assert_eq!(registry.position_of(agents[0].id()), Some(Position::new(3, 4)));
        assert_eq!(registry.position_of(agents[1].id()), Some(Position::new(2, 4)));
    }

    #[test]
    fn same_directions_replay_the_same_outcomes() {
        let directions = [
            Direction::West,
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::East,
            Direction::North,
            Direction::West,
            Direction::West,
        ];
        let replay = || {
            let (registry, agents) = setup(&[(1, Position::new(0, 0))]);
            directions
                .iter()
                .map(|&d| agents[0].attempt_move_towards(d, &registry).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(replay(), replay());
    }

    #[test]
    fn seeded_agents_make_the_same_random_moves() {
        let replay = || {
            let (registry, agents) = setup(&[(7, Position::new(2, 2))]);
            (0..50)
                .map(|_| agents[0].attempt_move(&registry).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(replay(), replay());
    }

    #[test]
    fn stop_flips_the_flag_once() {
        let (_registry, agents) = setup(&[(1, Position::new(0, 0))]);
        agents[0].advance(LifecycleState::Waiting);
        assert!(agents[0].stop());
        assert!(!agents[0].stop());
        assert!(!agents[0].is_alive());
        assert_eq!(agents[0].state(), LifecycleState::Stopping);
    }

    #[test]
    fn stopping_never_returns_to_a_working_state() {
        let (_registry, agents) = setup(&[(1, Position::new(0, 0))]);
        assert!(agents[0].advance(LifecycleState::Running));
        agents[0].stop();
        assert!(!agents[0].advance(LifecycleState::Waiting));
        assert!(!agents[0].advance(LifecycleState::AttemptingMove));
        assert_eq!(agents[0].state(), LifecycleState::Stopping);
    }

    #[test]
    fn agent_that_never_ran_terminates_on_stop() {
        let (_registry, agents) = setup(&[(1, Position::new(0, 0))]);
        assert_eq!(agents[0].state(), LifecycleState::Spawned);
        agents[0].stop();
        assert_eq!(agents[0].state(), LifecycleState::Terminated);
        assert!(!agents[0].advance(LifecycleState::Running));
    }

    #[tokio::test]
    async fn stop_wakes_a_waiting_agent() {
        let registry = Arc::new(Registry::new(Arc::new(Grid::new(10, 10).unwrap())));
        let kind = AgentKind::Queen;
        let agent = Arc::new(Agent::new(
            AgentId::sequenced(kind, 1),
            kind,
            WaitRange { min_ms: 60_000, max_ms: 60_000 },
            create_rng(1),
        ));
        registry.register(Arc::clone(&agent), Position::new(0, 0)).unwrap();
        let (tx, _rx) = broadcast::channel(16);

        let handle = tokio::spawn(run(Arc::clone(&agent), registry, tx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        agent.stop();

        let exit = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("agent should wake up")
            .unwrap();
        assert_eq!(exit, AgentExit::Cancelled);
        assert_eq!(agent.state(), LifecycleState::Terminated);
        assert_eq!(agent.moves() + agent.rejections(), 0);
    }

    #[tokio::test]
    async fn running_agent_moves_and_reports_events() {
        let (registry, agents) = setup(&[(1, Position::new(2, 2))]);
        let (tx, mut rx) = broadcast::channel(4096);
        let handle = tokio::spawn(run(Arc::clone(&agents[0]), Arc::clone(&registry), tx));

        tokio::time::sleep(Duration::from_millis(100)).await;
        agents[0].stop();
        handle.await.unwrap();

        assert!(agents[0].moves() + agents[0].rejections() > 0);
        let mut terminated = false;
        loop {
            match rx.try_recv() {
                Ok(ColonyEvent::Terminated { .. }) => terminated = true,
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
        assert!(terminated);
        assert!(registry.verify().is_ok());
    }
}

//! # Anthill
//!
//! A concurrent ant colony simulator.
//!
//! Ants live on a bounded grid with a single nest cell at its center.
//! Every ant runs on its own tokio task: it pauses for a random time,
//! picks one of four directions and asks the colony to move it there.
//! The move is refused if it would leave the grid, enter the nest or
//! land on another live ant. An observer renders the map on its own
//! cadence.
//!
//! ## Quick Start
//!
//! ```rust
//! use anthill::prelude::*;
//!
//! let colony = Colony::from_config(ColonyConfig::default().with_seed(42)).unwrap();
//!
//! // Place two ants by hand and step them synchronously.
//! colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();
//! colony.place(AgentKind::Queen, Position::new(9, 9)).unwrap();
//! let report = colony.run_n_iterations(20).unwrap();
//! assert_eq!(report.attempted, 40);
//!
//! // Two ants never share a cell and nobody is on the nest.
//! assert!(colony.verify().is_ok());
//! println!("{}", colony.render());
//! ```
//!
//! ## Architecture
//!
//! - **anthill-core**: positions, directions, the grid, agent kinds,
//!   snapshots and errors
//! - **anthill-runtime**: agents, the registry, the colony coordinator
//!   and the observer
//!
//! Spawning real tasks needs a tokio runtime:
//!
//! ```rust,no_run
//! use anthill::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let colony = Arc::new(Colony::new()?);
//!     colony.spawn(5, AgentKind::Worker)?;
//!
//!     let mut observer = Observer::new(Arc::clone(&colony));
//!     observer.observe(10, |frame| println!("{}", frame.view)).await;
//!
//!     colony.stop_all().await;
//!     Ok(())
//! }
//! ```

pub mod prelude;

pub use anthill_core as core;
pub use anthill_runtime as runtime;

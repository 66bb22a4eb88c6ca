//! # Anthill Core
//!
//! Core types for the anthill colony simulator.
//!
//! This crate holds everything that does not need a scheduler:
//!
//! - **Position / Direction**: grid coordinates and the four unit steps
//! - **Grid**: dimensions, the reserved nest cell, map rendering
//! - **AgentKind / AgentId / WaitRange**: caste parameters and identity
//! - **Rejection / ColonyError / ConfigError**: outcomes and failures
//! - **Snapshots**: read-only views handed to observers
//!
//! ## Quick Start
//!
//! ```rust
//! use anthill_core::prelude::*;
//!
//! let grid = Grid::new(10, 10).unwrap();
//! assert_eq!(grid.nest_position(), Position::new(5, 5));
//!
//! let candidate = Position::new(0, 0).translate(Direction::West);
//! assert_eq!(grid.check_enterable(candidate), Err(Rejection::OutOfBounds));
//! ```

pub mod error;
pub mod grid;
pub mod prelude;
pub mod snapshot;
pub mod types;

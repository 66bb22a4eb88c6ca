//! Anthill Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use anthill_core::prelude::*;
//! ```

pub use crate::types::{AgentId, AgentKind, Direction, Position, WaitRange};

pub use crate::grid::{Grid, GridView, EMPTY_GLYPH, NEST_GLYPH};

pub use crate::snapshot::{AgentSnapshot, ColonySnapshot, LifecycleState, MoveOutcome};

pub use crate::error::{ColonyError, ConfigError, InvariantViolation, Rejection, Result};

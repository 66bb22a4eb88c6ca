//! Anthill Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use anthill_runtime::prelude::*;
//! ```

// Re-export colony
pub use crate::colony::{Colony, ColonyStats, IterationReport, ShutdownReport};

// Re-export agents and registry
pub use crate::agent::Agent;
pub use crate::registry::Registry;

pub use crate::config::ColonyConfig;
pub use crate::event::{AgentExit, ColonyEvent};
pub use crate::observer::{Frame, Observer};

// Re-export from core
pub use anthill_core::prelude::*;

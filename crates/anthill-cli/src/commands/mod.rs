//! CLI command implementations.

pub mod config;
pub mod init;
pub mod interactive;
pub mod run;

use anthill::prelude::*;
use anyhow::Result;
use std::sync::Arc;

use crate::display;

/// Create a colony and spawn its startup ants, echoing each one.
pub(crate) fn start_colony(config: ColonyConfig, quiet: bool) -> Result<Arc<Colony>> {
    let colony = Arc::new(Colony::from_config(config)?);
    let spawned = colony.spawn(colony.config().agents, colony.config().kind)?;

    if !quiet {
        let snapshot = colony.snapshot();
        for agent in snapshot.agents.iter().filter(|a| spawned.iter().any(|s| s.id() == &a.id)) {
            println!("{}", display::spawned(agent));
        }
        println!("\n{} ants spawned (seed {})", spawned.len(), colony.seed());
    }
    Ok(colony)
}

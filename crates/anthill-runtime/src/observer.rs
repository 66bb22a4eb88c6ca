//! Observer: periodic read-only views of a running colony.
//!
//! The observer never touches agents. On its own cadence it asks the
//! colony for a snapshot and a rendered map, which may be up to one move
//! cycle stale.

use crate::colony::{Colony, ColonyStats};
use anthill_core::grid::GridView;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// One observed frame.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Frames taken by this observer so far, starting at 1.
    pub iteration: u64,
    pub view: GridView,
    pub stats: ColonyStats,
}

pub struct Observer {
    colony: Arc<Colony>,
    interval: Duration,
    frames_taken: u64,
}

impl Observer {
    /// Observe at the colony's configured update interval.
    pub fn new(colony: Arc<Colony>) -> Self {
        let interval = colony.config().update_interval();
        Self::with_interval(colony, interval)
    }

    pub fn with_interval(colony: Arc<Colony>, interval: Duration) -> Self {
        Self {
            colony,
            interval,
            frames_taken: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn frames_taken(&self) -> u64 {
        self.frames_taken
    }

    /// Capture a frame right now.
    pub fn frame(&mut self) -> Frame {
        self.frames_taken += 1;
        Frame {
            iteration: self.frames_taken,
            view: self.colony.render(),
            stats: self.colony.stats(),
        }
    }

    /// Take `frames` frames, one per interval, handing each to `on_frame`.
    ///
    /// The first frame comes one interval from now. Returns the number of
    /// frames delivered; stops early once no ant is alive.
    pub async fn observe<F>(&mut self, frames: u64, mut on_frame: F) -> u64
    where
        F: FnMut(&Frame),
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut delivered = 0;
        for _ in 0..frames {
            ticker.tick().await;
            let frame = self.frame();
            on_frame(&frame);
            delivered += 1;
            if !frame.stats.is_active() {
                break;
            }
        }
        delivered
    }
}

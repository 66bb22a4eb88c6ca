//! Run the colony for a fixed number of frames.

use anthill::prelude::*;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::info;

use super::start_colony;
use crate::config;
use crate::display;
use crate::Overrides;

pub async fn run(frames: Option<u64>, json: bool, overrides: &Overrides) -> Result<()> {
    let config = config::effective(overrides)?;
    let frames = frames.unwrap_or(config.observer.frames);
    let colony_config = config.to_colony_config()?;

    if !json {
        println!("{}", display::banner("ANT COLONY SIMULATOR"));
    }
    let colony = start_colony(colony_config, json)?;

    let pb = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(frames);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} frames")?
                .progress_chars("#>-"),
        );
        pb
    };

    info!(frames, seed = colony.seed(), "observing colony");
    let mut observer = Observer::new(Arc::clone(&colony));
    observer
        .observe(frames, |frame| {
            if !json {
                pb.println(display::frame(frame));
            }
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    let report = colony.stop_all().await;

    if json {
        println!("{}", colony.snapshot().to_json()?);
    } else {
        println!();
        println!("{}", display::shutdown(&report));
        println!("{}", display::stats(&colony.stats()));
        println!("{}", display::banner("SIMULATION FINISHED"));
    }

    if let Err(violation) = colony.verify() {
        anyhow::bail!("colony invariant broken: {}", violation);
    }
    Ok(())
}

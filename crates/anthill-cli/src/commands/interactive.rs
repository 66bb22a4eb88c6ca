//! Drive a running colony from a line prompt.

use anthill::prelude::*;
use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::start_colony;
use crate::config;
use crate::display;
use crate::Overrides;

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Observe this many more frames while the ants run.
    Watch(u64),
    /// Step every live ant this many times by hand.
    Step(u64),
    Stats,
    Stop,
}

fn parse(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Err("empty command".to_string()),
        ["stop"] | ["quit"] | ["exit"] => Ok(Command::Stop),
        ["stats"] => Ok(Command::Stats),
        ["step", n] => count(n).map(Command::Step),
        ["run", n] | [n] => count(n).map(Command::Watch),
        _ => Err(format!("unknown command: {}", line.trim())),
    }
}

fn count(word: &str) -> Result<u64, String> {
    word.parse::<u64>()
        .map_err(|_| format!("not a count: {}", word))
}

fn prompt() {
    println!(
        "\n{} enter {} (or {} N) to watch N more frames, {} N to run N iterations, {} or {}",
        "?".blue().bold(),
        "N".cyan(),
        "run".cyan(),
        "step".cyan(),
        "stats".cyan(),
        "stop".cyan()
    );
}

pub async fn run(overrides: &Overrides) -> Result<()> {
    let config = config::effective(overrides)?;
    let colony_config = config.to_colony_config()?;

    println!("{}", display::banner("ANT COLONY SIMULATOR"));
    let colony = start_colony(colony_config, false)?;
    let mut observer = Observer::new(Arc::clone(&colony));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        match parse(&line) {
            Ok(Command::Watch(n)) => {
                observer
                    .observe(n, |frame| println!("{}", display::frame(frame)))
                    .await;
            }
            Ok(Command::Step(n)) => {
                let report = colony.run_n_iterations(n)?;
                println!("{}", display::iterations(&report));
                println!("{}", colony.render());
            }
            Ok(Command::Stats) => println!("{}", display::stats(&colony.stats())),
            Ok(Command::Stop) => break,
            Err(message) => println!("{} {}", "✗".red(), message),
        }
    }

    let report = colony.stop_all().await;
    println!();
    println!("{}", display::shutdown(&report));
    println!("{}", display::stats(&colony.stats()));
    println!("{}", display::banner("SIMULATION FINISHED"));
    Ok(())
}

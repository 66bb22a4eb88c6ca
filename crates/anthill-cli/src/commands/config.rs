//! Show the effective configuration.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;

pub fn run() -> Result<()> {
    let (config, source) = Config::load()?;

    match source {
        Some(path) => println!("{} {}", "Loaded from".blue(), path.display()),
        None => println!("{} no anthill.toml found, using defaults", "•".yellow()),
    }
    println!();
    print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);

    if let Err(e) = config.to_colony_config() {
        println!();
        println!("{} {:#}", "✗".red().bold(), e);
    }
    Ok(())
}

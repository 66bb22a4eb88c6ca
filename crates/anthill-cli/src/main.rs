//! Anthill CLI - run and watch an ant colony from the terminal.

mod commands;
mod config;
mod display;

use anthill::prelude::AgentKind;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anthill")]
#[command(author, version, about = "Anthill - a concurrent ant colony simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default anthill.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Spawn a colony, watch it for a number of frames, then stop it
    Run {
        /// Frames to observe before stopping (default from anthill.toml)
        #[arg(short, long)]
        frames: Option<u64>,

        /// Print the final colony snapshot as JSON instead of frames
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Spawn a colony and drive it from a prompt
    Interactive {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Show the effective configuration
    Config,
}

/// Command-line values that take precedence over anthill.toml.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Number of ants to spawn
    #[arg(short, long)]
    pub agents: Option<usize>,

    /// Caste of the ants: worker, warrior or queen
    #[arg(short, long)]
    pub kind: Option<AgentKind>,

    /// Grid width in cells
    #[arg(long)]
    pub width: Option<i32>,

    /// Grid height in cells
    #[arg(long)]
    pub height: Option<i32>,

    /// Seed for spawn positions and ant movement
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Milliseconds between observed frames
    #[arg(short, long)]
    pub interval_ms: Option<u64>,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { frames, json, overrides } => {
            commands::run::run(frames, json, &overrides).await
        }
        Commands::Interactive { overrides } => commands::interactive::run(&overrides).await,
        Commands::Config => commands::config::run(),
    }
}

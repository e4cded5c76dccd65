//! gitmirror CLI - mirror git repositories between remotes

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gitmirror_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ListArgs, RunArgs, StatusArgs};

/// gitmirror: force-mirror git repositories from a source to a destination remote
#[derive(Parser, Debug)]
#[command(name = "gitmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./config.yml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Git program to run (overrides config and env)
    #[arg(long, global = true, env = "GITMIRROR_GIT")]
    git: Option<String>,

    /// Directory holding the local clones (overrides config and env)
    #[arg(long, global = true, value_name = "DIR", env = "GITMIRROR_WORKING_DIRECTORY")]
    working_directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror all enabled repositories (the default)
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show the merged repository table
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show the state of the local clones
    Status(StatusArgs),

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    if let Some(Commands::Version) = cli.command {
        println!("gitmirror {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.git.clone(),
        cli.working_directory.clone(),
    )?;

    if cli.verbose {
        tracing::info!(
            config = %config.source.display(),
            working_directory = %config.working_directory.display(),
            git = %config.git,
            repositories = config.repositories.len(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Run(args)) => args.execute(&config),
        Some(Commands::List(args)) => args.execute(&config),
        Some(Commands::Status(args)) => args.execute(&config),
        Some(Commands::Version) => Ok(()),
        None => RunArgs::default().execute(&config),
    }
}

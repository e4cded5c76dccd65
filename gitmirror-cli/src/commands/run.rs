//! Run command - mirror the configured repositories

use clap::Args;
use gitmirror_core::{Config, Orchestrator, RepoOutcome, SystemRunner};

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only mirror these repositories (repeatable)
    #[arg(short, long = "repo", value_name = "REPOID")]
    pub repos: Vec<String>,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let table = if self.repos.is_empty() {
            config.repositories.clone()
        } else {
            config.repositories.select(&self.repos)?
        };

        println!("Start mirroring git repositories...");
        println!("Config path: {}", config.source.display());
        println!();

        let runner = SystemRunner::new();
        let orchestrator = Orchestrator::from_config(&runner, config);
        let report = orchestrator.run(&table)?;

        println!();
        for (id, outcome) in &report.repositories {
            match outcome {
                RepoOutcome::Skipped => println!("  {:<24} skipped (disabled)", id),
                RepoOutcome::Mirrored { cloned, branches } => {
                    let cloned = if *cloned { ", cloned" } else { "" };
                    println!("  {:<24} mirrored {} branch(es){}", id, branches.len(), cloned);
                }
            }
        }
        println!();
        println!(
            "Done: {} mirrored, {} skipped",
            report.mirrored(),
            report.skipped()
        );

        Ok(())
    }
}

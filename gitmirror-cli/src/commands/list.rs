//! List command - print the merged repository table

use clap::Args;
use gitmirror_core::{redact_url, Config};

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&config.repositories)?);
            return Ok(());
        }

        if config.repositories.is_empty() {
            println!("No repositories configured.");
            return Ok(());
        }

        println!("Repositories ({}):", config.repositories.len());
        for repo in config.repositories.iter() {
            let state = if repo.is_enabled() { "" } else { " (disabled)" };
            println!();
            println!("  {}{}", repo.id, state);
            println!("      from: {}", redact_url(&repo.from));
            println!("      to:   {}", redact_url(&repo.to));
        }

        Ok(())
    }
}

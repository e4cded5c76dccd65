//! Status command - show the local clones of the configured repositories

use clap::Args;
use gitmirror_core::{redact_url, Config, GitRepo, SystemRunner, Workspace};

/// Show where each local clone stands
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    ///
    /// Only read-only git commands are issued.
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let runner = SystemRunner::new();
        let workspace = Workspace::new(&config.working_directory);

        println!("Working directory: {}", workspace.root().display());
        if !workspace.root().is_dir() {
            println!("  (not created yet)");
        }
        println!();

        for repo in config.repositories.iter() {
            let enabled = if repo.is_enabled() { "enabled" } else { "disabled" };
            println!("  {} [{}]", repo.id, enabled);

            let dir = workspace.repo_dir(&repo.id);
            if !GitRepo::is_git_repo(&dir) {
                println!("      Clone: missing");
                println!();
                continue;
            }

            let git = GitRepo::new(&runner, &config.git, &dir);
            println!("      Clone: {}", dir.display());
            match git.current_branch() {
                Ok(branch) => println!("      Branch: {}", branch),
                Err(e) => println!("      Branch: unknown ({})", e),
            }
            match git.origin_url() {
                Ok(url) => println!("      Origin: {}", redact_url(&url)),
                Err(e) => println!("      Origin: unknown ({})", e),
            }
            println!();
        }

        Ok(())
    }
}

//! Runs the synchronization engine over every configured repository

use crate::config::{Config, RepositoryDescriptor, RepositoryTable};
use crate::git::GitRepo;
use crate::redact::redact_url;
use crate::runner::CommandRunner;
use crate::sync::SyncEngine;
use crate::workspace::Workspace;
use crate::Result;

/// What happened to one repository during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// `enabled: false`; nothing was touched
    Skipped,
    /// Every listed branch was mirrored, then all tags
    Mirrored {
        /// Whether the local copy was cloned during this run
        cloned: bool,
        /// Branches pushed to the destination, in order
        branches: Vec<String>,
    },
}

/// Per-repository outcomes of a completed run, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub repositories: Vec<(String, RepoOutcome)>,
}

impl RunReport {
    /// Number of repositories that were mirrored
    pub fn mirrored(&self) -> usize {
        self.repositories
            .iter()
            .filter(|(_, o)| matches!(o, RepoOutcome::Mirrored { .. }))
            .count()
    }

    /// Number of repositories skipped because they are disabled
    pub fn skipped(&self) -> usize {
        self.repositories
            .iter()
            .filter(|(_, o)| matches!(o, RepoOutcome::Skipped))
            .count()
    }
}

/// Mirrors a table of repositories one after another
///
/// The first failure aborts the whole run: later repositories are not
/// attempted and the error is returned to the caller.
pub struct Orchestrator<'a> {
    runner: &'a dyn CommandRunner,
    git: &'a str,
    workspace: Workspace,
}

impl<'a> Orchestrator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, git: &'a str, workspace: Workspace) -> Self {
        Self {
            runner,
            git,
            workspace,
        }
    }

    /// Build an orchestrator for a loaded configuration
    pub fn from_config(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self::new(
            runner,
            &config.git,
            Workspace::new(&config.working_directory),
        )
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Mirror every repository of `table`, in order
    pub fn run(&self, table: &RepositoryTable) -> Result<RunReport> {
        self.workspace.ensure()?;

        let mut report = RunReport::default();
        for repo in table.iter() {
            let outcome = match self.mirror_repo(repo) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(repo = %repo.id, error = %e, "Mirroring failed");
                    return Err(e);
                }
            };
            report.repositories.push((repo.id.clone(), outcome));
        }

        Ok(report)
    }

    /// Mirror a single repository
    pub fn mirror_repo(&self, repo: &RepositoryDescriptor) -> Result<RepoOutcome> {
        if !repo.is_enabled() {
            tracing::info!(" -> Skip mirroring repo: {}", repo.id);
            return Ok(RepoOutcome::Skipped);
        }

        tracing::info!(
            from = %redact_url(&repo.from),
            to = %redact_url(&repo.to),
            " -> Start mirroring repo: {}",
            repo.id
        );

        let workspace_scope = GitRepo::new(self.runner, self.git, self.workspace.root());
        let repo_dir = self.workspace.repo_dir(&repo.id);
        let scope = workspace_scope.child(&repo_dir);

        let cloned = self.workspace.needs_clone(&repo.id)?;
        if cloned {
            self.workspace.create_repo_dir(&repo.id)?;
            tracing::info!("Cloning new repository into {}", repo_dir.display());
            workspace_scope.clone_into(&repo.from, &repo.id)?;
        }

        scope.set_origin_url(&repo.from)?;
        scope.fetch_prune()?;

        let sync = SyncEngine::new(scope).mirror(&repo.to)?;

        tracing::info!(branches = sync.branches.len(), " -> Done with {}", repo.id);
        Ok(RepoOutcome::Mirrored {
            cloned,
            branches: sync.branches,
        })
    }
}

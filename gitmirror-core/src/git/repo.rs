//! Directory-scoped git command execution

use std::path::Path;

use crate::runner::{CommandResult, CommandRunner};
use crate::{Error, Result};

/// Name of the remote every mirrored repository is driven through
pub const ORIGIN: &str = "origin";

/// A git working directory bound to a command runner
///
/// Every command issued through a `GitRepo` runs with `root` as its working
/// directory. The process-wide current directory is never changed, so a scope
/// leaves nothing to restore when an operation fails, and scopes can be
/// nested freely with [`GitRepo::child`].
#[derive(Clone, Copy)]
pub struct GitRepo<'a> {
    runner: &'a dyn CommandRunner,
    git: &'a str,
    root: &'a Path,
}

impl std::fmt::Debug for GitRepo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("git", &self.git)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<'a> GitRepo<'a> {
    /// Bind `root` to a runner, using `git` as the program for every command
    pub fn new(runner: &'a dyn CommandRunner, git: &'a str, root: &'a Path) -> Self {
        Self { runner, git, root }
    }

    /// Derive a scope for another directory sharing this scope's runner
    pub fn child(&self, root: &'a Path) -> GitRepo<'a> {
        GitRepo {
            runner: self.runner,
            git: self.git,
            root,
        }
    }

    /// Directory the commands of this scope run in
    pub fn root(&self) -> &Path {
        self.root
    }

    /// Whether `path` looks like a git working tree
    pub fn is_git_repo(path: impl AsRef<Path>) -> bool {
        path.as_ref().join(".git").exists()
    }

    /// Run `git <args>` and return the raw result, whatever the exit status
    pub fn run(&self, args: &[&str]) -> Result<CommandResult> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.git.to_string());
        argv.extend(args.iter().map(|a| a.to_string()));
        self.runner.run(self.root, &argv)
    }

    /// Run `git <args>` and turn a nonzero exit status into [`Error::Git`]
    pub fn run_checked(&self, args: &[&str]) -> Result<CommandResult> {
        let result = self.run(args)?;
        if result.success() {
            Ok(result)
        } else {
            Err(self.failure(args, &result))
        }
    }

    fn failure(&self, args: &[&str], result: &CommandResult) -> Error {
        Error::Git {
            operation: format!("git {}", args.join(" ")),
            dir: self.root.to_path_buf(),
            status: result.status,
            output: result.output(),
        }
    }

    /// `git remote set-url origin <url>`
    pub fn set_origin_url(&self, url: &str) -> Result<()> {
        self.run_checked(&["remote", "set-url", ORIGIN, url])?;
        Ok(())
    }

    /// `git remote get-url origin`
    pub fn origin_url(&self) -> Result<String> {
        let result = self.run_checked(&["remote", "get-url", ORIGIN])?;
        Ok(result.output().trim().to_string())
    }

    /// Name of the branch currently checked out (`HEAD` when detached)
    pub fn current_branch(&self) -> Result<String> {
        let result = self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(result.output().trim().to_string())
    }

    /// `git checkout <branch>`
    ///
    /// A branch that only exists as `origin/<branch>` is created locally with
    /// tracking set up.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.run_checked(&["checkout", branch])?;
        Ok(())
    }

    /// `git reset --hard origin/<branch>`
    pub fn reset_hard(&self, branch: &str) -> Result<()> {
        let target = format!("{}/{}", ORIGIN, branch);
        self.run_checked(&["reset", "--hard", &target])?;
        Ok(())
    }

    /// `git push --force origin <branch>`
    pub fn push_force(&self, branch: &str) -> Result<()> {
        self.run_checked(&["push", "--force", ORIGIN, branch])?;
        Ok(())
    }

    /// `git push --force --tags origin`
    pub fn push_tags(&self) -> Result<()> {
        self.run_checked(&["push", "--force", "--tags", ORIGIN])?;
        Ok(())
    }
}

//! Bootstrapping and refreshing the local copy of a repository

use super::repo::{GitRepo, ORIGIN};
use crate::Result;

impl GitRepo<'_> {
    /// Clone `url` into `name`, relative to this scope's directory
    ///
    /// `--` keeps a URL that starts with a dash from being read as an option.
    pub fn clone_into(&self, url: &str, name: &str) -> Result<()> {
        self.run_checked(&["clone", "--", url, name])?;
        Ok(())
    }

    /// `git fetch --prune origin`: update remote-tracking refs, drop stale ones
    ///
    /// Nothing is merged into the checked-out branch. Every mirrored branch is
    /// hard-reset to its `origin/<branch>` tip afterwards, so a rewritten or
    /// deleted upstream branch cannot leave the local copy stuck.
    pub fn fetch_prune(&self) -> Result<()> {
        self.run_checked(&["fetch", "--prune", ORIGIN])?;
        Ok(())
    }
}

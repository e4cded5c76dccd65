//! Branch synchronization state machine
//!
//! For one repository whose `origin` points at the source and has just been
//! fetched, the engine walks:
//!
//! ```text
//! Discovering -> (SwitchBranch -> ResetBranch)* -> RepointRemote
//!             -> (SwitchBranch -> ForcePush)* -> PushTags -> Done
//! ```
//!
//! Every local branch is hard-reset to its `origin/<branch>` tip and then
//! force-pushed, so the destination ends up with exactly the source's refs.
//! Any failing command stops the engine; nothing is retried.

use std::fmt;

use crate::git::{BranchSnapshot, GitRepo};
use crate::{Error, Result};

/// Phase of a synchronization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Listing the branches of the freshly fetched copy
    Discovering,
    /// Checking out the next branch
    SwitchBranch,
    /// Resetting the checked-out branch to its source tip
    ResetBranch,
    /// Pointing `origin` at the destination
    RepointRemote,
    /// Force-pushing the checked-out branch
    ForcePush,
    /// Pushing all tags
    PushTags,
    /// Every branch and tag has been pushed
    Done,
}

impl SyncPhase {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: SyncPhase) -> bool {
        use SyncPhase::*;
        matches!(
            (self, next),
            (Discovering, SwitchBranch)
                | (Discovering, RepointRemote)
                | (SwitchBranch, ResetBranch)
                | (SwitchBranch, ForcePush)
                | (ResetBranch, SwitchBranch)
                | (ResetBranch, RepointRemote)
                | (RepointRemote, SwitchBranch)
                | (RepointRemote, PushTags)
                | (ForcePush, SwitchBranch)
                | (ForcePush, PushTags)
                | (PushTags, Done)
        )
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Discovering => "discovering",
            SyncPhase::SwitchBranch => "switch-branch",
            SyncPhase::ResetBranch => "reset-branch",
            SyncPhase::RepointRemote => "repoint-remote",
            SyncPhase::ForcePush => "force-push",
            SyncPhase::PushTags => "push-tags",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed synchronization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Branches mirrored, in the order they were processed
    pub branches: Vec<String>,
    /// Branch checked out when the pass finished
    pub current_branch: String,
}

/// Drives one repository through a synchronization pass
#[derive(Debug)]
pub struct SyncEngine<'a> {
    repo: GitRepo<'a>,
    phase: SyncPhase,
    current_branch: String,
}

impl<'a> SyncEngine<'a> {
    pub fn new(repo: GitRepo<'a>) -> Self {
        Self {
            repo,
            phase: SyncPhase::Discovering,
            current_branch: String::new(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Branch the engine believes is checked out
    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    fn enter(&mut self, next: SyncPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(Error::Other(format!(
                "Invalid sync transition from {} to {}",
                self.phase, next
            )));
        }
        tracing::trace!(from = %self.phase, to = %next, "Sync transition");
        self.phase = next;
        Ok(())
    }

    /// Take a branch snapshot and remember its current branch
    pub fn discover(&mut self) -> Result<BranchSnapshot> {
        if self.phase != SyncPhase::Discovering {
            return Err(Error::Other(format!(
                "Branch discovery is only possible before syncing, not in {}",
                self.phase
            )));
        }
        let snapshot = self.repo.discover_branches()?;
        self.current_branch = snapshot.current_branch.clone();
        Ok(snapshot)
    }

    /// Check out `branch` unless it is already the current one
    pub fn switch_branch(&mut self, branch: &str) -> Result<()> {
        self.enter(SyncPhase::SwitchBranch)?;
        if branch == self.current_branch {
            return Ok(());
        }
        self.repo.checkout(branch)?;
        self.current_branch = branch.to_string();
        Ok(())
    }

    /// Discard everything on the current branch that `origin/<branch>` lacks
    pub fn reset_hard(&mut self, branch: &str) -> Result<()> {
        self.enter(SyncPhase::ResetBranch)?;
        self.repo.reset_hard(branch)
    }

    /// Point `origin` at `url`
    pub fn repoint_remote(&mut self, url: &str) -> Result<()> {
        self.enter(SyncPhase::RepointRemote)?;
        self.repo.set_origin_url(url)
    }

    /// Overwrite `branch` on `origin` with the local branch
    pub fn force_push(&mut self, branch: &str) -> Result<()> {
        self.enter(SyncPhase::ForcePush)?;
        self.repo.push_force(branch)
    }

    /// Push every tag to `origin`
    pub fn push_tags(&mut self) -> Result<()> {
        self.enter(SyncPhase::PushTags)?;
        self.repo.push_tags()?;
        self.enter(SyncPhase::Done)
    }

    /// Run the whole pass, pushing to `destination`
    pub fn mirror(mut self, destination: &str) -> Result<SyncReport> {
        let snapshot = self.discover()?;
        let branches: Vec<String> = snapshot.remote_branches.into_iter().collect();

        for branch in &branches {
            tracing::info!("   ... prepare local branch from remote: {}", branch);
            self.switch_branch(branch)?;
            self.reset_hard(branch)?;
        }

        self.repoint_remote(destination)?;

        for branch in &branches {
            tracing::info!("   ... pushing to mirror branch: {}", branch);
            self.switch_branch(branch)?;
            self.force_push(branch)?;
        }

        self.push_tags()?;

        Ok(SyncReport {
            branches,
            current_branch: self.current_branch,
        })
    }
}

//! gitmirror core - mirror git repositories from one remote to another
//!
//! For every configured repository the local clone is refreshed from the
//! source, each remote branch is hard-reset to the source tip, and all
//! branches and tags are force-pushed to the destination.

pub mod config;
pub mod error;
pub mod git;
pub mod orchestrator;
pub mod redact;
pub mod runner;
pub mod sync;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use config::{Config, RepositoryDescriptor, RepositoryTable};
pub use error::{Error, Result};
pub use git::{BranchSnapshot, GitRepo};
pub use orchestrator::{Orchestrator, RepoOutcome, RunReport};
pub use redact::redact_url;
pub use runner::{CommandResult, CommandRunner, SystemRunner};
pub use sync::{SyncEngine, SyncPhase, SyncReport};
pub use workspace::Workspace;

//! Git operations for gitmirror
//!
//! This module provides directory-scoped git commands, cloning and branch
//! discovery. Everything goes through the `git` command line.

mod branch;
mod clone;
mod repo;

pub use branch::BranchSnapshot;
pub use repo::{GitRepo, ORIGIN};

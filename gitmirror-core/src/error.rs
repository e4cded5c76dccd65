//! Error types for gitmirror

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for gitmirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gitmirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Working directory or repository directory could not be prepared
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// An external program could not be started at all
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A git command ran but exited with a nonzero status
    #[error("{operation} failed in {} (exit status {status}){}", .dir.display(), format_output(.output))]
    Git {
        /// Human readable name of the operation, e.g. "git fetch"
        operation: String,
        /// Directory the command ran in
        dir: PathBuf,
        /// Exit status reported by the command
        status: i32,
        /// Combined stdout/stderr captured from the command
        output: String,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{}", trimmed)
    }
}

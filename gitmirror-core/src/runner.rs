//! External command execution
//!
//! Every VCS operation goes through a [`CommandRunner`]. Commands are always
//! given as an argument vector and spawned without a shell, so URLs and branch
//! names are never interpolated into a command line.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Outcome of running one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Combined stdout and stderr, one entry per line, in emission order
    pub lines: Vec<String>,
    /// Exit status; `0` means success
    pub status: i32,
}

impl CommandResult {
    /// Build a result from raw combined output text
    pub fn new(output: &str, status: i32) -> Self {
        Self {
            lines: output.lines().map(|l| l.to_string()).collect(),
            status,
        }
    }

    /// Whether the command exited with status `0`
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// The captured output joined back into a single string
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}

/// Capability to run an external command inside a directory
///
/// Implementations must not treat a nonzero exit status as an error; callers
/// decide what a failure means for their operation. An `Err` is reserved for
/// commands that could not be started.
pub trait CommandRunner {
    /// Run `argv[0]` with the remaining arguments in `dir`
    fn run(&self, dir: &Path, argv: &[String]) -> Result<CommandResult>;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &Path, argv: &[String]) -> Result<CommandResult> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::Other("Cannot run an empty command".to_string()))?;

        tracing::debug!(dir = %dir.display(), "Run command: {}", argv.join(" "));

        // Both streams share one pipe so their lines interleave in the order
        // the child wrote them.
        let (reader, writer) = std::io::pipe()?;
        let mut child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer)
            .spawn()
            .map_err(|e| Error::Spawn {
                program: program.clone(),
                source: e,
            })?;

        let mut lines = Vec::new();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']).to_string();
            tracing::debug!("  {}", line);
            lines.push(line);
        }

        let status = child.wait()?;
        // Killed by a signal: no exit code, report as a generic failure.
        let status = status.code().unwrap_or(-1);
        if status != 0 {
            tracing::debug!("ERROR: returncode {}", status);
        }

        Ok(CommandResult { lines, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_result_from_text() {
        let result = CommandResult::new("one\ntwo\n", 0);
        assert_eq!(result.lines, vec!["one", "two"]);
        assert!(result.success());
        assert_eq!(result.output(), "one\ntwo");
    }

    #[test]
    fn test_nonzero_status_is_not_success() {
        assert!(!CommandResult::new("", 1).success());
        assert!(!CommandResult::new("", -1).success());
    }

    #[test]
    fn test_empty_argv_is_error() {
        let runner = SystemRunner::new();
        let result = runner.run(Path::new("."), &[]);
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let runner = SystemRunner::new();
        let result = runner.run(
            Path::new("."),
            &argv(&["/nonexistent/gitmirror-test-binary-12345"]),
        );
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_merges_stdout_and_stderr_in_order() {
        let runner = SystemRunner::new();
        let result = runner
            .run(
                Path::new("."),
                &argv(&["sh", "-c", "echo out1; echo err1 1>&2; echo out2"]),
            )
            .unwrap();
        assert!(result.success());
        assert_eq!(result.lines, vec!["out1", "err1", "out2"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_reported_not_raised() {
        let runner = SystemRunner::new();
        let result = runner
            .run(Path::new("."), &argv(&["sh", "-c", "echo boom; exit 3"]))
            .unwrap();
        assert_eq!(result.status, 3);
        assert_eq!(result.lines, vec!["boom"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::new();
        let result = runner.run(dir.path(), &argv(&["pwd"])).unwrap();
        let reported = std::fs::canonicalize(&result.lines[0]).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_arguments_are_not_shell_interpolated() {
        let runner = SystemRunner::new();
        let result = runner
            .run(Path::new("."), &argv(&["echo", "$(whoami); ls"]))
            .unwrap();
        assert_eq!(result.lines, vec!["$(whoami); ls"]);
    }
}

//! Branch discovery from `git branch --all --verbose` output

use indexmap::IndexSet;

use super::repo::{GitRepo, ORIGIN};
use crate::Result;

/// Symbolic ref naming the remote's default branch; not a branch itself
const REMOTE_HEAD: &str = "HEAD";

/// Branch state of a repository at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSnapshot {
    /// Branch checked out when the snapshot was taken (empty if none)
    pub current_branch: String,
    /// Branches under `remotes/origin/`, in listing order
    pub remote_branches: IndexSet<String>,
    /// Local branch names. Informational only; nothing acts on them.
    pub local_branches: IndexSet<String>,
}

impl BranchSnapshot {
    /// Parse the output of `git branch -a -v`
    ///
    /// Lines that fit no known shape are kept as local branch names rather
    /// than rejected.
    pub fn parse<'l>(lines: impl IntoIterator<Item = &'l str>) -> Self {
        let remote_prefix = format!("remotes/{}/", ORIGIN);
        let mut snapshot = Self::default();

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(&remote_prefix) {
                let name = first_token(line)
                    .strip_prefix(&remote_prefix)
                    .unwrap_or_default();
                if name.is_empty() || name == REMOTE_HEAD {
                    continue;
                }
                snapshot.remote_branches.insert(name.to_string());
            } else if let Some(rest) = line.strip_prefix('*') {
                let name = first_token(rest.trim_start());
                snapshot.current_branch = name.to_string();
                snapshot.local_branches.insert(name.to_string());
            } else {
                snapshot.local_branches.insert(first_token(line).to_string());
            }
        }

        snapshot
    }
}

fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or_default()
}

impl GitRepo<'_> {
    /// List all local and remote-tracking branches
    ///
    /// An empty repository yields an empty snapshot.
    pub fn discover_branches(&self) -> Result<BranchSnapshot> {
        let result = self.run_checked(&["branch", "-a", "-v", "--no-color"])?;
        let snapshot = BranchSnapshot::parse(result.lines.iter().map(String::as_str));

        tracing::debug!(
            current = %snapshot.current_branch,
            remote = ?snapshot.remote_branches,
            local = ?snapshot.local_branches,
            "Discovered branches"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use std::path::PathBuf;

    const LISTING: &str = "\
* main                  1a2b3c4 Merge pull request #12
  dev                   5d6e7f8 Work in progress
  remotes/origin/HEAD   -> origin/main
  remotes/origin/dev    5d6e7f8 Work in progress
  remotes/origin/main   1a2b3c4 Merge pull request #12
  remotes/origin/release/1.x 9a8b7c6 Bump version
";

    fn names(set: &IndexSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_typical_listing() {
        let snapshot = BranchSnapshot::parse(LISTING.lines());
        assert_eq!(snapshot.current_branch, "main");
        assert_eq!(
            names(&snapshot.remote_branches),
            vec!["dev", "main", "release/1.x"]
        );
        assert_eq!(names(&snapshot.local_branches), vec!["main", "dev"]);
    }

    #[test]
    fn test_remote_head_pointer_is_excluded() {
        let snapshot =
            BranchSnapshot::parse(["remotes/origin/HEAD -> remotes/origin/main"]);
        assert!(snapshot.remote_branches.is_empty());
        assert!(!snapshot.remote_branches.contains("HEAD"));
    }

    #[test]
    fn test_every_remote_line_yields_one_branch() {
        let lines = [
            "remotes/origin/a 111 first",
            "remotes/origin/b\t222 second",
            "remotes/origin/c",
        ];
        let snapshot = BranchSnapshot::parse(lines);
        assert_eq!(names(&snapshot.remote_branches), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remote_order_is_listing_order() {
        let snapshot = BranchSnapshot::parse([
            "remotes/origin/zeta 1 z",
            "remotes/origin/alpha 2 a",
            "remotes/origin/mid 3 m",
        ]);
        assert_eq!(
            names(&snapshot.remote_branches),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn test_other_remotes_are_not_mirrored() {
        let snapshot = BranchSnapshot::parse(["remotes/upstream/main 1 x"]);
        assert!(snapshot.remote_branches.is_empty());
        assert_eq!(
            names(&snapshot.local_branches),
            vec!["remotes/upstream/main"]
        );
    }

    #[test]
    fn test_empty_listing() {
        let snapshot = BranchSnapshot::parse("\n   \n".lines());
        assert_eq!(snapshot, BranchSnapshot::default());
    }

    #[test]
    fn test_malformed_line_is_kept_as_local_branch() {
        let snapshot = BranchSnapshot::parse([
            "remotes/origin/main 1 x",
            "???",
        ]);
        assert_eq!(names(&snapshot.local_branches), vec!["???"]);
        assert_eq!(names(&snapshot.remote_branches), vec!["main"]);
    }

    #[test]
    fn test_detached_head_line() {
        let snapshot = BranchSnapshot::parse(["* (HEAD detached at 1a2b3c4) 1a2b3c4 msg"]);
        assert_eq!(snapshot.current_branch, "(HEAD");
        assert!(snapshot.remote_branches.is_empty());
    }

    #[test]
    fn test_discover_branches_runs_listing_in_repo() {
        let runner = ScriptedRunner::new();
        runner.respond("branch", 0, LISTING);
        let root = PathBuf::from("/work/repo");
        let repo = GitRepo::new(&runner, "git", &root);

        let snapshot = repo.discover_branches().unwrap();

        assert_eq!(snapshot.remote_branches.len(), 3);
        assert_eq!(runner.commands(), vec!["branch -a -v --no-color"]);
        assert_eq!(runner.calls()[0].dir, root);
    }

    #[test]
    fn test_discover_branches_fails_on_nonzero_exit() {
        let runner = ScriptedRunner::new();
        runner.respond("branch", 128, "fatal: not a git repository");
        let root = PathBuf::from("/work/repo");
        let repo = GitRepo::new(&runner, "git", &root);

        assert!(repo.discover_branches().is_err());
    }
}

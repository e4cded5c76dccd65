//! Scripted command runner for unit tests

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::runner::{CommandResult, CommandRunner};
use crate::Result;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub dir: PathBuf,
    pub argv: Vec<String>,
}

impl Call {
    /// Arguments after the program name, joined with spaces
    pub fn args(&self) -> String {
        self.argv[1..].join(" ")
    }
}

struct Rule {
    prefix: Vec<String>,
    result: CommandResult,
}

/// Records every command and answers from a list of prefix rules
///
/// Unmatched commands succeed with no output. When several rules match, the
/// most recently added one wins.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: RefCell<Vec<Call>>,
    rules: RefCell<Vec<Rule>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands whose arguments start with `prefix` (space separated)
    pub fn respond(&self, prefix: &str, status: i32, output: &str) {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.split_whitespace().map(|s| s.to_string()).collect(),
            result: CommandResult::new(output, status),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Recorded argument strings, program name stripped
    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::args).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, dir: &Path, argv: &[String]) -> Result<CommandResult> {
        self.calls.borrow_mut().push(Call {
            dir: dir.to_path_buf(),
            argv: argv.to_vec(),
        });

        let args = &argv[1.min(argv.len())..];
        let rules = self.rules.borrow();
        let result = rules
            .iter()
            .rev()
            .find(|rule| args.starts_with(&rule.prefix))
            .map(|rule| rule.result.clone())
            .unwrap_or_default();
        Ok(result)
    }
}

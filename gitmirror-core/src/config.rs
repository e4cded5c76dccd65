//! Configuration management for gitmirror
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GITMIRROR_*)
//! 3. Config files (`config.yml` plus any `config_*.yml` next to it)
//! 4. Default values
//!
//! A config file looks like this:
//!
//! ```yaml
//! working_directory: ./mirrors
//! repositories:
//!   my-project:
//!     from: https://github.com/example/my-project.git
//!     to: git@git.internal:mirrors/my-project.git
//!   old-project:
//!     from: https://github.com/example/old-project.git
//!     to: git@git.internal:mirrors/old-project.git
//!     enabled: false
//! ```

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name looked up in the current directory when no config is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Prefix of additional config files merged into the primary one
pub const FRAGMENT_PREFIX: &str = "config_";

/// One repository to mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// Unique key of the repository, also its directory name
    pub id: String,
    /// URL to mirror from
    pub from: String,
    /// URL to mirror to
    pub to: String,
    /// Only an explicit `false` disables mirroring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl RepositoryDescriptor {
    /// Whether this repository takes part in a run
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

/// Repository entry as written in a config file
#[derive(Debug, Clone, Deserialize)]
struct RepositoryEntry {
    from: String,
    to: String,
    #[serde(default)]
    enabled: Option<bool>,
}

/// Repositories keyed by id, in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepositoryTable {
    repos: IndexMap<String, RepositoryDescriptor>,
}

impl RepositoryTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a repository unless its id is already taken
    ///
    /// Returns `false` and leaves the table untouched for a duplicate id; the
    /// first definition always wins.
    pub fn insert(&mut self, repo: RepositoryDescriptor) -> bool {
        if self.repos.contains_key(&repo.id) {
            return false;
        }
        self.repos.insert(repo.id.clone(), repo);
        true
    }

    /// Look up a repository by id
    pub fn get(&self, id: &str) -> Option<&RepositoryDescriptor> {
        self.repos.get(id)
    }

    /// Iterate in definition order
    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.repos.values()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Keep only the repositories named in `ids`, in table order
    ///
    /// Fails if an id is not defined.
    pub fn select(&self, ids: &[String]) -> Result<Self> {
        if let Some(missing) = ids.iter().find(|id| !self.repos.contains_key(*id)) {
            return Err(Error::Config(format!(
                "Repository '{}' is not defined in any config file",
                missing
            )));
        }

        let repos = self
            .repos
            .iter()
            .filter(|(id, _)| ids.contains(*id))
            .map(|(id, repo)| (id.clone(), repo.clone()))
            .collect();
        Ok(Self { repos })
    }
}

/// Contents of one config file
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    working_directory: Option<PathBuf>,
    git: Option<String>,
    repositories: Option<IndexMap<String, RepositoryEntry>>,
}

impl ConfigFile {
    /// Parse by extension: `.toml` as TOML, anything else as YAML
    fn parse(path: &Path, contents: &str) -> Result<Self> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(contents).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            })
        } else {
            // An empty YAML document deserializes as null.
            if contents.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Could not read {}: file is empty",
                    path.display()
                )));
            }
            serde_yaml::from_str(contents).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            })
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Could not read {}: {}", path.display(), e))
        })?;
        Self::parse(path, &contents)
    }
}

/// Fully merged configuration of one run
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary config file
    pub source: PathBuf,
    /// Absolute directory holding one clone per repository
    pub working_directory: PathBuf,
    /// Program used for every git command
    pub git: String,
    /// Repositories to mirror
    pub repositories: RepositoryTable,
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };
        let invocation_dir = std::env::current_dir()?;
        Self::load_from_file(&path, &invocation_dir)
    }

    /// Pick the default config file
    ///
    /// `./config.yml` if it exists, then `~/.config/gitmirror/config.yml`.
    /// Falls back to `./config.yml` so the error names the expected file.
    pub fn default_config_path() -> Result<PathBuf> {
        let local = std::env::current_dir()?.join(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }

        let user = dirs::config_dir().map(|p| p.join("gitmirror").join(DEFAULT_CONFIG_FILE));
        if let Some(user) = user.filter(|p| p.exists()) {
            return Ok(user);
        }

        Ok(local)
    }

    /// Load a primary config file and merge every fragment next to it
    ///
    /// A relative `working_directory` is resolved against `invocation_dir`.
    pub fn load_from_file(path: &Path, invocation_dir: &Path) -> Result<Self> {
        let primary = ConfigFile::load(path)?;

        let working_directory = primary.working_directory.clone().ok_or_else(|| {
            Error::Config(format!(
                "Not found 'working_directory' in {}",
                path.display()
            ))
        })?;
        let working_directory = resolve_path(&working_directory, invocation_dir);

        let mut found_repositories = primary.repositories.is_some();
        let mut repositories = RepositoryTable::new();
        merge_into(&mut repositories, primary.repositories.unwrap_or_default(), path);

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        for fragment in find_fragments(dir, path)? {
            tracing::info!("Reading: {}", fragment.display());
            let file = match ConfigFile::load(&fragment) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("SKIP: {}", e);
                    continue;
                }
            };
            let Some(entries) = file.repositories else {
                tracing::warn!(
                    "SKIP: Did not find 'repositories' in {}",
                    fragment.display()
                );
                continue;
            };
            found_repositories = true;
            merge_into(&mut repositories, entries, &fragment);
        }

        if !found_repositories {
            return Err(Error::Config(format!(
                "Not found 'repositories' in {}",
                path.display()
            )));
        }

        Ok(Self {
            source: path.to_path_buf(),
            working_directory,
            git: primary.git.unwrap_or_else(|| "git".to_string()),
            repositories,
        })
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GITMIRROR_GIT: git program to run
    /// - GITMIRROR_WORKING_DIRECTORY: directory holding the clones
    pub fn with_env_overrides(self) -> Result<Self> {
        let git = std::env::var("GITMIRROR_GIT").ok();
        let working_directory = std::env::var_os("GITMIRROR_WORKING_DIRECTORY").map(PathBuf::from);
        self.with_cli_overrides(git, working_directory)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        git: Option<String>,
        working_directory: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(git) = git {
            self.git = git;
        }

        if let Some(dir) = working_directory {
            self.working_directory = resolve_path(&dir, &std::env::current_dir()?);
        }

        Ok(self)
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config files > defaults
    pub fn load_with_overrides(
        path: Option<&Path>,
        git: Option<String>,
        working_directory: Option<PathBuf>,
    ) -> Result<Self> {
        Self::load(path)?
            .with_env_overrides()?
            .with_cli_overrides(git, working_directory)
    }
}

fn merge_into(
    table: &mut RepositoryTable,
    entries: IndexMap<String, RepositoryEntry>,
    origin: &Path,
) {
    for (id, entry) in entries {
        let repo = RepositoryDescriptor {
            id: id.clone(),
            from: entry.from,
            to: entry.to,
            enabled: entry.enabled,
        };
        if !table.insert(repo) {
            tracing::warn!("WARNING: Defined again '{}' in {}", id, origin.display());
        }
    }
}

/// `config_*.yml`, `config_*.yaml` and `config_*.toml` in `dir`, by name
fn find_fragments(dir: &Path, primary: &Path) -> Result<Vec<PathBuf>> {
    let mut fragments = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path == primary {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_config = [".yml", ".yaml", ".toml"]
            .iter()
            .any(|ext| name.ends_with(ext));
        if name.starts_with(FRAGMENT_PREFIX) && is_config {
            fragments.push(path);
        }
    }

    fragments.sort();
    Ok(fragments)
}

/// Make `path` absolute against `base` and fold `.` and `..` lexically
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

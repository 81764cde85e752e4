//! Settings file handling
//!
//! Mirrorwatch is configured by a single `mirrorwatch.toml` file describing
//! the watched directory, the remote destination, and how rsync should be
//! invoked. Loading validates enough to fail fast before any watcher or
//! background timer is started.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mirrorwatch.toml";

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Mirrorwatch settings
///
/// The remote side is always `remote_user@remote_host:remote_path`; the
/// local side is `local_path`, mirrored one-way with `--delete` enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory tree to watch and mirror
    pub local_path: PathBuf,

    /// SSH user at the destination
    pub remote_user: String,

    /// Destination host
    pub remote_host: String,

    /// Destination directory
    pub remote_path: String,

    /// SSH port (default 22)
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,

    /// SSH identity file passed to `ssh -i`
    pub key_file: PathBuf,

    /// Periodic sync interval in seconds; 0 disables the timer
    #[serde(default)]
    pub interval_secs: u64,

    /// Use `-az` instead of `-a` (rsync in-transit compression)
    #[serde(default = "default_true")]
    pub compress: bool,

    /// rsync `--exclude` patterns; also filter watcher events
    #[serde(default)]
    pub excludes: Vec<String>,

    /// rsync `--include` patterns, applied before excludes
    #[serde(default)]
    pub includes: Vec<String>,

    /// Log a line for every change notification and timer tick
    #[serde(default)]
    pub verbose_notifications: bool,

    /// Path to the rsync binary (default: resolve `rsync` from PATH)
    #[serde(default = "default_rsync_path")]
    pub rsync_path: PathBuf,
}

fn default_ssh_port() -> u16 {
    22
}

fn default_true() -> bool {
    true
}

fn default_rsync_path() -> PathBuf {
    PathBuf::from("rsync")
}

impl Config {
    /// Load and validate settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that TOML parsing alone cannot enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("local_path must not be empty".into()));
        }
        if self.remote_user.is_empty() {
            return Err(ConfigError::Invalid("remote_user must not be empty".into()));
        }
        if self.remote_host.is_empty() {
            return Err(ConfigError::Invalid("remote_host must not be empty".into()));
        }
        if self.remote_path.is_empty() {
            return Err(ConfigError::Invalid("remote_path must not be empty".into()));
        }
        if self.ssh_port == 0 {
            return Err(ConfigError::Invalid("ssh_port must be non-zero".into()));
        }
        Ok(())
    }

    /// Whether the periodic timer should run at all
    pub fn interval_enabled(&self) -> bool {
        self.interval_secs > 0
    }
}

/// Commented settings template written by `mw init`
pub fn config_template() -> &'static str {
    r#"# mirrorwatch settings
#
# The local tree is mirrored one-way to the remote with `rsync --delete`:
# files removed locally are removed at the destination too.

# Directory tree to watch and mirror
local_path = "/home/me/project"

# Destination, reached over ssh
remote_user = "me"
remote_host = "example.com"
remote_path = "/srv/project"

# SSH port and identity file
ssh_port = 22
key_file = "/home/me/.ssh/id_ed25519"

# Periodic sync interval in seconds; 0 disables the timer and syncs
# only on filesystem changes
interval_secs = 300

# Use rsync in-transit compression (-az instead of -a)
compress = true

# Patterns forwarded to rsync as --exclude / --include; excludes also
# suppress watcher events for matching paths
excludes = [".git", "target"]
includes = []

# Log a line for every change notification and timer tick
verbose_notifications = false

# Path to the rsync binary
rsync_path = "rsync"
"#
}

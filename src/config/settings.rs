use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::KeyEncoding;
use crate::errors::{DirSealError, Result};

/// Run configuration, loaded from `dirseal.toml`.
///
/// Every field has a default so dirseal works without any config file;
/// command-line flags override whatever is loaded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory trees to walk.  Empty means "only what the command line names".
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Environment variable holding the key (default: AES_KEY).
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Read the key from this file instead of the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// How the key value is written (default: raw).
    #[serde(default)]
    pub key_encoding: KeyEncoding,

    /// Worker threads per root (default: 1).
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Exit non-zero when any file fails (default: false).
    #[serde(default)]
    pub strict: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_key_env() -> String {
    "AES_KEY".to_string()
}

fn default_jobs() -> usize {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            key_env: default_key_env(),
            key_file: None,
            key_encoding: KeyEncoding::default(),
            jobs: default_jobs(),
            strict: false,
        }
    }
}

impl Settings {
    /// Name of the config file looked up in the working directory.
    pub const FILE_NAME: &'static str = "dirseal.toml";

    /// Load settings from an explicit file.  The file must exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DirSealError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            DirSealError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load `<dir>/dirseal.toml`, or defaults when there is none.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_file(&config_path)
    }

    fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(DirSealError::ConfigError("jobs must be at least 1".into()));
        }
        if self.key_env.is_empty() {
            return Err(DirSealError::ConfigError("key_env cannot be empty".into()));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::Settings;
use crate::crypto::{EnvKeyProvider, FileKey, FileKeyProvider, KeyEncoding, KeyProvider};
use crate::errors::{DirSealError, Result};

/// dirseal CLI: bulk file encryption with a single AES-256 key.
#[derive(Parser)]
#[command(
    name = "dirseal",
    about = "Encrypt or decrypt every file under a set of directories",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ./dirseal.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt every file under ROOTS into `<file>.enc` and remove the original
    Encrypt(PassArgs),

    /// Decrypt every `.enc` file under ROOTS and remove the artifact
    Decrypt(PassArgs),

    /// Print a freshly generated key
    Keygen {
        /// Key encoding: raw (32 printable characters) or base64
        #[arg(long, value_enum, default_value = "raw")]
        encoding: KeyEncoding,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by `encrypt` and `decrypt`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PassArgs {
    /// Root directories to walk (overrides `roots` from the config file)
    pub roots: Vec<PathBuf>,

    /// Environment variable holding the key (default: AES_KEY)
    #[arg(long)]
    pub key_env: Option<String>,

    /// Read the key from a file instead of the environment
    #[arg(long, conflicts_with = "key_env")]
    pub key_file: Option<PathBuf>,

    /// How the key is written: raw or base64
    #[arg(long, value_enum)]
    pub key_encoding: Option<KeyEncoding>,

    /// Worker threads per root
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// List the files that would be processed and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Exit with an error status if any file fails
    #[arg(long)]
    pub strict: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config`, or from `./dirseal.toml` when present.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_file(path),
        None => Settings::load(&std::env::current_dir()?),
    }
}

/// The config file this invocation reads, if there is one.
pub fn config_path(cli: &Cli) -> Option<PathBuf> {
    match &cli.config {
        Some(path) => Some(path.clone()),
        None => {
            let path = std::env::current_dir().ok()?.join(Settings::FILE_NAME);
            path.is_file().then_some(path)
        }
    }
}

/// A pass's settings after applying command-line overrides.
#[derive(Debug, Clone)]
pub struct ResolvedPass {
    pub roots: Vec<PathBuf>,
    pub key_source: KeySource,
    pub key_encoding: KeyEncoding,
    pub jobs: usize,
    pub strict: bool,
}

/// Where the key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Env(String),
    File(PathBuf),
}

impl ResolvedPass {
    /// Merge `args` over `settings`.  Roots are never implied.
    pub fn resolve(args: &PassArgs, settings: &Settings) -> Result<Self> {
        let roots = if args.roots.is_empty() {
            settings.roots.clone()
        } else {
            args.roots.clone()
        };
        if roots.is_empty() {
            return Err(DirSealError::NoRoots);
        }

        let key_source = match (&args.key_file, &args.key_env, &settings.key_file) {
            (Some(path), _, _) => KeySource::File(path.clone()),
            (None, Some(var), _) => KeySource::Env(var.clone()),
            (None, None, Some(path)) => KeySource::File(path.clone()),
            (None, None, None) => KeySource::Env(settings.key_env.clone()),
        };

        let jobs = args.jobs.unwrap_or(settings.jobs);
        if jobs == 0 {
            return Err(DirSealError::ConfigError("--jobs must be at least 1".into()));
        }

        Ok(Self {
            roots,
            key_source,
            key_encoding: args.key_encoding.unwrap_or(settings.key_encoding),
            jobs,
            strict: args.strict || settings.strict,
        })
    }

    /// Canonical paths of the key file and `config` that a pass must never
    /// transform.  Paths that do not resolve cannot be walked into either.
    pub fn protected_files(&self, config: Option<&Path>) -> Vec<PathBuf> {
        let key_file = match &self.key_source {
            KeySource::File(path) => Some(path.as_path()),
            KeySource::Env(_) => None,
        };
        key_file
            .into_iter()
            .chain(config)
            .filter_map(|p| std::fs::canonicalize(p).ok())
            .collect()
    }

    /// Resolve the key.  Any failure here is fatal to the run.
    pub fn load_key(&self) -> Result<FileKey> {
        match &self.key_source {
            KeySource::Env(var) => EnvKeyProvider {
                var: var.clone(),
                encoding: self.key_encoding,
            }
            .provide(),
            KeySource::File(path) => FileKeyProvider {
                path: path.clone(),
                encoding: self.key_encoding,
            }
            .provide(),
        }
    }
}

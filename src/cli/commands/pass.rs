//! `dirseal encrypt` / `dirseal decrypt` — one full pass over the roots.
//!
//! The key is resolved before anything else; if it is missing or the
//! wrong length the command stops without touching a single file.

use dialoguer::Confirm;

use crate::cli::output::{self, ConsoleReporter};
use crate::cli::{config_path, load_settings, Cli, PassArgs, ResolvedPass};
use crate::errors::{DirSealError, Result};
use crate::runner::{self, RunOptions};
use crate::transform::{FileTransformer, Mode};

/// Execute an `encrypt` or `decrypt` pass.
pub fn execute(cli: &Cli, mode: Mode, args: &PassArgs) -> Result<()> {
    let settings = load_settings(cli)?;
    let pass = ResolvedPass::resolve(args, &settings)?;

    let transformer = {
        let key = pass.load_key()?;
        FileTransformer::new(&key)
    };

    if !args.dry_run && !args.yes {
        confirm(mode, &pass)?;
    }

    let options = RunOptions {
        mode,
        roots: pass.roots.clone(),
        jobs: pass.jobs,
        dry_run: args.dry_run,
        protected: pass.protected_files(config_path(cli).as_deref()),
    };
    let reporter = ConsoleReporter { quiet: args.json };
    let summary = runner::run(&transformer, &options, &reporter);

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| DirSealError::CommandFailed(format!("summary serialization: {e}")))?;
        println!("{json}");
    } else if cli.verbose > 0 || summary.file_failures() > 0 || summary.roots_failed > 0 {
        output::print_summary_table(&summary);
    }

    let failed = summary.file_failures() + summary.roots_failed;
    if pass.strict && failed > 0 {
        return Err(DirSealError::CommandFailed(format!(
            "{failed} file(s) or root(s) could not be processed"
        )));
    }
    if failed > 0 && !args.json {
        output::tip("Pass --strict to exit with an error when any file fails.");
    }

    Ok(())
}

/// Ask before a pass that will delete source files.
fn confirm(mode: Mode, pass: &ResolvedPass) -> Result<()> {
    for root in &pass.roots {
        output::info(&format!("Root: {}", root.display()));
    }

    let prompt = match mode {
        Mode::Encrypt => format!(
            "Encrypt every file under {} root(s) and delete the plaintext originals?",
            pass.roots.len()
        ),
        Mode::Decrypt => format!(
            "Decrypt every .enc file under {} root(s) and delete the encrypted copies?",
            pass.roots.len()
        ),
    };

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| {
            DirSealError::CommandFailed(format!("confirm prompt: {e} (use --yes to skip it)"))
        })?;

    if !confirmed {
        output::info("Cancelled.");
        return Err(DirSealError::UserCancelled);
    }
    Ok(())
}

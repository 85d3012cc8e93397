//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::errors::DirSealError;
use crate::runner::{Reporter, RunSummary};
use crate::transform::{Mode, Transformed};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the end-of-run totals as a two-column table.
pub fn print_summary_table(summary: &RunSummary) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Count"]);

    let done_label = if summary.dry_run {
        "Files to process"
    } else {
        "Files processed"
    };
    let done = if summary.dry_run {
        summary.files_pending
    } else {
        summary.files_transformed
    };

    let rows = [
        ("Roots walked", summary.roots_visited),
        ("Roots skipped", summary.roots_failed),
        (done_label, done),
        ("I/O failures", summary.io_failures),
        ("Authentication failures", summary.auth_failures),
        ("Malformed artifacts", summary.malformed),
        ("Sources left behind", summary.cleanup_warnings),
        ("Other failures", summary.other_failures),
        ("Unreadable entries", summary.skipped_entries),
        ("Key/config files skipped", summary.protected_skipped),
        ("Leftover temp files", summary.leftover_temp_files),
    ];
    for (label, count) in rows {
        table.add_row(vec![label.to_string(), count.to_string()]);
    }

    println!("{table}");
}

/// Progress reporter that writes one line per event to the terminal.
pub struct ConsoleReporter {
    /// Suppress per-file success lines (used with `--json`).
    pub quiet: bool,
}

impl Reporter for ConsoleReporter {
    fn root_entered(&self, mode: Mode, root: &Path) {
        if !self.quiet {
            let verb = match mode {
                Mode::Encrypt => "Encrypting",
                Mode::Decrypt => "Decrypting",
            };
            info(&format!("{verb} files in: {}", root.display()));
        }
    }

    fn root_failed(&self, root: &Path, err: &DirSealError) {
        warning(&format!("Skipping {}: {err}", root.display()));
    }

    fn file_transformed(&self, mode: Mode, done: &Transformed) {
        if !self.quiet {
            let verb = match mode {
                Mode::Encrypt => "Encrypted",
                Mode::Decrypt => "Decrypted",
            };
            success(&format!("{verb}: {}", done.output.display()));
        }
    }

    fn file_would_transform(&self, mode: Mode, path: &Path) {
        if !self.quiet {
            println!("  would {mode}: {}", path.display());
        }
    }

    fn file_failed(&self, path: &Path, err: &DirSealError) {
        let msg = format!("{}: {err}", path.display());
        if err.is_warning() {
            warning(&msg);
        } else {
            error(&msg);
        }
    }

    fn finished(&self, summary: &RunSummary) {
        if self.quiet {
            return;
        }
        let failures = summary.file_failures();
        let line = match (summary.mode, summary.dry_run) {
            (_, true) => format!("Dry run: {} files would be processed", summary.files_pending),
            (Mode::Encrypt, false) => format!("{} files encrypted", summary.files_transformed),
            (Mode::Decrypt, false) => format!("{} files decrypted", summary.files_transformed),
        };
        if failures == 0 {
            success(&line);
        } else {
            warning(&format!("{line}, {failures} failed"));
        }
    }
}

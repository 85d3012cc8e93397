//! `dirseal version` — display version and build features.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("dirseal {current}");

    let parallel = if cfg!(feature = "parallel") {
        style("enabled").green()
    } else {
        style("disabled").yellow()
    };
    println!("  parallel workers: {parallel}");

    Ok(())
}

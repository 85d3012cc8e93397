//! `dirseal completions <shell>`: completion scripts for bash, zsh, fish,
//! powershell and elvish.
//!
//!   dirseal completions bash > ~/.local/share/bash-completion/completions/dirseal

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_script(shell, &mut io::stdout())
}

fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "dirseal", out);
    out.flush()?;
    Ok(())
}

use clap::Parser;
use dirseal::cli::{Cli, Commands};
use dirseal::transform::Mode;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encrypt(ref args) => {
            dirseal::cli::commands::pass::execute(&cli, Mode::Encrypt, args)
        }
        Commands::Decrypt(ref args) => {
            dirseal::cli::commands::pass::execute(&cli, Mode::Decrypt, args)
        }
        Commands::Keygen { encoding } => dirseal::cli::commands::keygen::execute(encoding),
        Commands::Version => dirseal::cli::commands::version::execute(),
        Commands::Completions { shell } => dirseal::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        dirseal::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Structured diagnostics go to stderr; stdout carries the per-file lines.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

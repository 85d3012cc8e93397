//! One module per subcommand.

pub mod completions;
pub mod keygen;
pub mod pass;
pub mod version;

//! Configuration loading (`dirseal.toml`).

pub mod settings;

pub use settings::Settings;

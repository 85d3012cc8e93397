pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod runner;
pub mod transform;
pub mod walk;

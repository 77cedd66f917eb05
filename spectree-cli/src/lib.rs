// Re-export modules for use in tests
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod loader;
pub mod logging;

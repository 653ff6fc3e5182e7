//! CLI module for stockroom
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for serve and migrate operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, EnvironmentArg, LogLevel};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;
use crate::logger::{LogLevelHandle, init_logger};

/// Load configuration files, apply CLI overrides, and validate the result.
pub fn load_and_merge_config(cli: &Cli) -> Result<Settings, ConfigError> {
    ConfigurationMerger::from_cli(cli)?.merge_cli_args(cli)
}

/// Install the global logger described by `settings.logger`.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<LogLevelHandle> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    Ok(init_logger(logger_config)?)
}

//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::validation::{
    validate_config_file_path, validate_host_address, validate_port, validate_rollback_steps,
};

/// Inventory backend serving users and products over HTTP
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(about = "Inventory backend serving users and products over HTTP")]
#[command(long_about = "
Stockroom is a REST backend for users and products backed by Postgres.

EXAMPLES:
    # Start the server with default configuration
    stockroom serve

    # Start server on custom host and port
    stockroom serve --host 0.0.0.0 --port 8080

    # Use a specific configuration file (TOML or YAML)
    stockroom --config /etc/stockroom/production.yaml serve

    # Check configuration without starting server
    stockroom serve --dry-run

    # Apply, preview, or roll back database migrations
    stockroom migrate
    stockroom migrate --dry-run
    stockroom migrate --rollback 1
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load only this file (plus STOCKROOM_* environment overrides) instead
    /// of the layered files in the config directory.
    #[arg(short, long, value_name = "FILE", value_parser = validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection (selects `{env}.toml`)
    #[arg(short, long, value_enum)]
    pub env: Option<EnvironmentArg>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = validate_port)]
        port: Option<u16>,

        /// Log level override; wins over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the given number of most recent migrations (1-100)
        #[arg(long, value_name = "STEPS", value_parser = validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            dry_run: false,
        }
    }
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentArg {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// The subcommand to run; `serve` when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<EnvironmentArg> for crate::config::Environment {
    fn from(env: EnvironmentArg) -> Self {
        match env {
            EnvironmentArg::Development => crate::config::Environment::Development,
            EnvironmentArg::Test => crate::config::Environment::Test,
            EnvironmentArg::Staging => crate::config::Environment::Staging,
            EnvironmentArg::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_and_version_flags() {
        let err = Cli::try_parse_from(["stockroom", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["stockroom", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_serve_is_default_command() {
        let cli = Cli::try_parse_from(["stockroom"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
        assert_eq!(cli.command_or_default(), Commands::default());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-level",
            "warning",
        ])
        .unwrap();

        assert_eq!(
            cli.command_or_default(),
            Commands::Serve {
                host: Some("0.0.0.0".to_string()),
                port: Some(8080),
                log_level: Some(LogLevel::Warn),
                dry_run: false,
            }
        );
    }

    #[test]
    fn test_serve_rejects_port_zero() {
        let err = Cli::try_parse_from(["stockroom", "serve", "--port", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_migrate_command() {
        let cli = Cli::try_parse_from(["stockroom", "migrate", "--dry-run"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Migrate {
                dry_run: true,
                rollback: None
            })
        );

        let cli = Cli::try_parse_from(["stockroom", "migrate", "--rollback", "2"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Migrate {
                dry_run: false,
                rollback: Some(2)
            })
        );
    }

    #[test]
    fn test_migrate_dry_run_conflicts_with_rollback() {
        let err = Cli::try_parse_from(["stockroom", "migrate", "--dry-run", "--rollback", "1"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["stockroom", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_environment_aliases() {
        let cli = Cli::try_parse_from(["stockroom", "--env", "prod"]).unwrap();
        assert_eq!(
            cli.env.map(crate::config::Environment::from),
            Some(crate::config::Environment::Production)
        );
    }
}

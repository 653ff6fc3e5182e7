//! Configuration loader for stockroom
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Map, Source, Value, ValueKind};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "STOCKROOM_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "STOCKROOM_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "STOCKROOM";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Extensions tried for each layer, in order of preference
const LAYER_EXTENSIONS: &[&str] = &["toml", "yaml", "yml"];

/// Legacy `[database]` key names and the keys they stand for.
const DATABASE_KEY_ALIASES: &[(&str, &str)] = &[
    ("dsn", "url"),
    ("max_open_conns", "max_connections"),
    ("max_idle_conns", "max_idle_connections"),
];

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.{toml,yaml,yml}` - Base default configuration (required)
/// 2. `{environment}.{toml,yaml,yml}` - Environment-specific configuration (optional)
/// 3. `local.{toml,yaml,yml}` - Local development overrides (optional)
/// 4. `STOCKROOM_*` environment variables (highest priority)
///
/// When a single configuration file is selected, layers 1-3 are replaced by
/// that file alone.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
    /// Current application environment
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader
    ///
    /// This reads environment variables to determine:
    /// - Configuration directory (`STOCKROOM_CONFIG_DIR`)
    /// - Specific configuration file (`STOCKROOM_CONFIG_FILE`)
    /// - Application environment (`STOCKROOM_APP_ENV`)
    ///
    /// # Errors
    ///
    /// Returns an error if both `STOCKROOM_CONFIG_DIR` and `STOCKROOM_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "STOCKROOM_CONFIG_DIR and STOCKROOM_CONFIG_FILE cannot both be set. \
                 Use STOCKROOM_CONFIG_DIR for layered configuration or \
                 STOCKROOM_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load only the given file (plus environment overrides).
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment used to pick the environment layer.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Get the current application environment
    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no `default` layer exists (when using layered loading)
    /// - the selected single file does not exist or has an unknown extension
    /// - configuration parsing fails
    /// - configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // STOCKROOM_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.find_layer("default").ok_or_else(|| {
            ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                self.config_dir.join("default.toml").display()
            ))
        })?;
        let mut builder = Self::add_file_source(builder, &default_path, true)?;

        for layer in [self.environment.as_str(), "local"] {
            if let Some(path) = self.find_layer(layer) {
                builder = Self::add_file_source(builder, &path, false)?;
            }
        }

        Ok(builder)
    }

    /// First existing `{name}.{ext}` in the configuration directory.
    fn find_layer(&self, name: &str) -> Option<PathBuf> {
        LAYER_EXTENSIONS
            .iter()
            .map(|ext| self.config_dir.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let name = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!(
                "Configuration path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        let file = File::new(name, file_format(path)?).required(required);
        Ok(builder.add_source(CanonicalKeys(file)))
    }

    /// Environment variables with prefix `STOCKROOM_` are mapped to configuration keys.
    /// Double underscores (`__`) separate nested keys, e.g. `STOCKROOM_DATABASE__URL`.
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(CanonicalKeys(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        ))
    }
}

/// Source wrapper that renames alias keys before layers are merged.
///
/// Each layer is rewritten on its own, so `dsn` in `local.yaml` overrides
/// `url` in `default.toml` instead of colliding with it. Within one layer
/// the canonical key wins over its alias.
#[derive(Debug, Clone)]
struct CanonicalKeys<S>(S);

impl<S> Source for CanonicalKeys<S>
where
    S: Source + Clone + Send + Sync + 'static,
{
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let mut map = self.0.collect()?;
        canonicalize_database_keys(&mut map);
        Ok(map)
    }
}

fn canonicalize_database_keys(map: &mut Map<String, Value>) {
    for (alias, canonical) in DATABASE_KEY_ALIASES {
        // Files yield a nested `database` table
        if let Some(ValueKind::Table(table)) = map.get_mut("database").map(|v| &mut v.kind) {
            if let Some(value) = table.remove(*alias) {
                table.entry(canonical.to_string()).or_insert(value);
            }
        }

        // Environment variables yield flat dotted keys
        if let Some(value) = map.remove(&format!("database.{}", alias)) {
            map.entry(format!("database.{}", canonical)).or_insert(value);
        }
    }
}

/// Pick the parser from the file extension.
fn file_format(path: &Path) -> Result<FileFormat, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => Ok(FileFormat::Toml),
        Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
        _ => Err(ConfigError::ParseError(format!(
            "Unsupported configuration file format: {} (expected .toml, .yaml or .yml)",
            path.display()
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{EnvGuard, lock_env};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DEFAULT_CONFIG: &str = r#"
[application]
name = "test-app"
version = "1.0.0"

[server]
host = "127.0.0.1"
port = 3000
request_timeout = 30

[database]
url = "postgres://localhost/test"
max_connections = 10
max_idle_connections = 2
connection_timeout = 30

[logger]
level = "info"

[logger.console]
enabled = true
colored = true

[logger.file]
enabled = false
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            let path = temp_dir.path().join(name);
            fs::write(&path, content).expect("Failed to write config file");
        }
        temp_dir
    }

    #[test]
    fn test_config_loader_new_default() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        env.set("STOCKROOM_CONFIG_DIR", "/custom/config");
        env.set("STOCKROOM_CONFIG_FILE", "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("STOCKROOM_CONFIG_DIR"));
                assert!(msg.contains("STOCKROOM_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_config_loader_environment_from_env() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();
        env.set("STOCKROOM_APP_ENV", "production");

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.environment(), AppEnvironment::Production);

        let loader = loader.with_environment(AppEnvironment::Test);
        assert_eq!(loader.environment(), AppEnvironment::Test);
    }

    #[test]
    fn test_load_missing_default_layer() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[]);
        env.set("STOCKROOM_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        match ConfigLoader::new().unwrap().load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_default_layer_only() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("STOCKROOM_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().expect("Should load");

        assert_eq!(settings.application.name, "test-app");
        assert_eq!(settings.application.version, "1.0.0");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database.url, "postgres://localhost/test");
        assert_eq!(settings.database.idle_timeout, 600);
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let development_config = r#"
[application]
name = "dev-app"

[server]
port = 3001

[database]
url = "postgres://dev/db"
"#;

        let local_config = r#"
server:
  port: 3002
database:
  url: "postgres://local/db"
"#;

        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("development.toml", development_config),
            ("local.yaml", local_config),
        ]);
        env.set("STOCKROOM_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STOCKROOM_SERVER__PORT", "3003");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load");

        assert_eq!(settings.server.port, 3003);
        assert_eq!(settings.database.url, "postgres://local/db");
        assert_eq!(settings.application.name, "dev-app");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.application.version, "1.0.0");
    }

    #[test]
    fn test_alias_keys_override_canonical_keys_across_layers() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let local_config = r#"
database:
  dsn: "postgres://local/db"
  max_open_conns: 25
"#;

        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("local.yaml", local_config),
        ]);
        env.set("STOCKROOM_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STOCKROOM_DATABASE__MAX_IDLE_CONNS", "5");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load");

        assert_eq!(settings.database.url, "postgres://local/db");
        assert_eq!(settings.database.max_connections, 25);
        assert_eq!(settings.database.max_idle_connections, 5);
    }

    #[test]
    fn test_canonical_key_wins_over_alias_in_same_layer() {
        let mut map = Map::new();
        map.insert("database.dsn".to_string(), Value::new(None, "postgres://alias/db"));
        map.insert("database.url".to_string(), Value::new(None, "postgres://canonical/db"));

        canonicalize_database_keys(&mut map);

        assert!(!map.contains_key("database.dsn"));
        assert_eq!(
            map["database.url"].clone().into_string().unwrap(),
            "postgres://canonical/db"
        );
    }

    #[test]
    fn test_optional_layers_not_required() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("STOCKROOM_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STOCKROOM_APP_ENV", "staging");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load");
        assert_eq!(settings.application.name, "test-app");
    }

    #[test]
    fn test_load_single_yaml_file_with_aliases() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let single_config = r#"
application:
  name: yaml-app
server:
  host: 0.0.0.0
  port: 5000
database:
  dsn: "postgres://single/db"
  max_open_conns: 20
  max_idle_conns: 4
logger:
  level: debug
"#;

        let temp_dir = setup_config_dir(&[("stockroom.yml", single_config)]);
        let loader = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("stockroom.yml"));
        let settings = loader.load().expect("Should load settings");

        assert_eq!(settings.application.name, "yaml-app");
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.database.url, "postgres://single/db");
        assert_eq!(settings.database.max_connections, 20);
        assert_eq!(settings.database.max_idle_connections, 4);
        assert_eq!(settings.logger.level, "debug");
    }

    #[test]
    fn test_single_file_from_env_var() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[("single.toml", DEFAULT_CONFIG)]);
        let path = temp_dir.path().join("single.toml");
        env.set("STOCKROOM_CONFIG_FILE", path.to_str().unwrap());
        env.set("STOCKROOM_DATABASE__URL", "postgres://env-override/db");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load");
        assert_eq!(settings.database.url, "postgres://env-override/db");
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_single_file_missing() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let loader = ConfigLoader::new()
            .unwrap()
            .with_config_file("/definitely/not/here.toml");

        assert!(matches!(loader.load(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[("settings.ini", "[server]\nport=1\n")]);
        let loader = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("settings.ini"));

        match loader.load() {
            Err(ConfigError::ParseError(msg)) => assert!(msg.contains("settings.ini")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_settings_fail_validation() {
        let _lock = lock_env();
        let mut env = EnvGuard::new();
        env.clear_loader_vars();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("STOCKROOM_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STOCKROOM_DATABASE__URL", "mysql://localhost/test");

        match ConfigLoader::new().unwrap().load() {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "database.url"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }
}

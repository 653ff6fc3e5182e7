//! Deployment environment selection.
//!
//! The environment picks the `config/{environment}.toml` overlay. It comes
//! from `--env` on the command line or from `STOCKROOM_APP_ENV`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

/// Accepted spellings, canonical name first.
const ALIASES: &[(Environment, &[&str])] = &[
    (Environment::Development, &["development", "dev"]),
    (Environment::Test, &["test"]),
    (Environment::Staging, &["staging", "stage"]),
    (Environment::Production, &["production", "prod"]),
];

impl Environment {
    pub const ENV_VAR: &'static str = "STOCKROOM_APP_ENV";

    /// Reads `STOCKROOM_APP_ENV`, falling back to `Development` when it is
    /// unset or unrecognized.
    pub fn from_env() -> Self {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring {}", Self::ENV_VAR);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        ALIASES
            .iter()
            .find(|(env, _)| env == self)
            .map(|(_, names)| names[0])
            .unwrap_or("development")
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALIASES
            .iter()
            .find(|(_, names)| names.contains(&wanted.as_str()))
            .map(|(env, _)| *env)
            .ok_or_else(|| ConfigError::InvalidEnvironment(s.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_alias_parses() {
        for (env, names) in ALIASES {
            for name in *names {
                assert_eq!(name.parse::<Environment>().unwrap(), *env);
                assert_eq!(name.to_uppercase().parse::<Environment>().unwrap(), *env);
            }
        }
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for (env, _) in ALIASES {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), *env);
        }
        assert_eq!(Environment::Staging.as_str(), "staging");
    }

    #[test]
    fn test_unknown_environment() {
        match "qa".parse::<Environment>() {
            Err(ConfigError::InvalidEnvironment(value)) => assert_eq!(value, "qa"),
            other => panic!("Expected InvalidEnvironment, got {:?}", other),
        }
    }

    #[test]
    fn test_default_is_development() {
        assert_eq!(Environment::default(), Environment::Development);
    }
}

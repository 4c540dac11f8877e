//! Environment-derived configuration for the logging stack.
//!
//! Configuration is read once at startup and treated as immutable: loggers
//! capture the values they were built with and never observe later changes
//! to the process environment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TelemetryError, TelemetryResult};
use crate::level::Level;

/// Variable holding the deployment environment name.
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
/// Variable holding the minimum emitted severity.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Variable holding the build or release identifier.
pub const ENV_VERSION: &str = "VERSION";

/// Deployment environments the library distinguishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; human-readable console output.
    #[default]
    Development,
    /// Concurrency-focused test runs.
    Concurrent,
    /// Unit test runs.
    Unit,
    /// Integration test runs.
    Integration,
    /// Shared test deployment.
    Test,
    /// Quality-assurance deployment.
    Qa,
    /// Staging deployment.
    Staging,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Every recognized environment.
    pub const ALL: [Environment; 8] = [
        Environment::Development,
        Environment::Concurrent,
        Environment::Unit,
        Environment::Integration,
        Environment::Test,
        Environment::Qa,
        Environment::Staging,
        Environment::Production,
    ];

    /// Lowercase name as it appears in configuration and on log entries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Concurrent => "concurrent",
            Environment::Unit => "unit",
            Environment::Integration => "integration",
            Environment::Test => "test",
            Environment::Qa => "qa",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Whether this environment runs behind a log collector and should emit
    /// line-delimited JSON instead of human-readable text.
    #[must_use]
    pub const fn is_clustered(self) -> bool {
        matches!(
            self,
            Environment::Test | Environment::Staging | Environment::Production
        )
    }

    /// Whether this is the local development environment.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "concurrent" => Ok(Environment::Concurrent),
            "unit" => Ok(Environment::Unit),
            "integration" => Ok(Environment::Integration),
            "test" => Ok(Environment::Test),
            "qa" => Ok(Environment::Qa),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(TelemetryError::InvalidConfig(format!(
                "unknown environment: {other}"
            ))),
        }
    }
}

/// Immutable configuration consumed by the logger factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Deployment environment; selects the terminal renderer.
    #[serde(default)]
    pub environment: Environment,
    /// Minimum severity emitted by loggers built from this configuration.
    #[serde(default = "default_level")]
    pub log_level: Level,
    /// Version string stamped on every entry, typically a commit hash.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_level() -> Level {
    Level::Debug
}

fn default_version() -> String {
    "unknown".to_owned()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_level(),
            version: default_version(),
        }
    }
}

impl TelemetryConfig {
    /// Configuration for `environment` with default level and version.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Set the minimum emitted severity.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set the version string stamped on entries.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Missing variables fall back to defaults: `development`, `debug` and
    /// `unknown`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfig`] when `ENVIRONMENT` or
    /// `LOG_LEVEL` holds an unrecognized value.
    pub fn from_env() -> TelemetryResult<Self> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Parse configuration from an explicit variable map.
    ///
    /// [`Self::from_env`] is a thin wrapper around this; tests pass their
    /// own maps instead of mutating the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfig`] when a present variable
    /// holds an unrecognized value.
    pub fn from_vars(vars: &HashMap<String, String>) -> TelemetryResult<Self> {
        let environment = match vars.get(ENV_ENVIRONMENT) {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };
        let log_level = match vars.get(ENV_LOG_LEVEL) {
            Some(raw) => raw.parse()?,
            None => default_level(),
        };
        let version = vars
            .get(ENV_VERSION)
            .cloned()
            .unwrap_or_else(default_version);
        Ok(Self {
            environment,
            log_level,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn test_defaults_when_variables_missing() {
        let config = TelemetryConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_level, Level::Debug);
        assert_eq!(config.version, "unknown");
    }

    #[test]
    fn test_reads_all_three_variables() {
        let vars = make_vars(&[
            (ENV_ENVIRONMENT, "production"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_VERSION, "abc123"),
        ]);
        let config = TelemetryConfig::from_vars(&vars).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.log_level, Level::Warn);
        assert_eq!(config.version, "abc123");
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let vars = make_vars(&[(ENV_ENVIRONMENT, "prod")]);
        let error = TelemetryConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(error, TelemetryError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_level() {
        let vars = make_vars(&[(ENV_LOG_LEVEL, "noisy")]);
        assert!(TelemetryConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn test_rejects_empty_values() {
        let vars = make_vars(&[(ENV_ENVIRONMENT, "")]);
        assert!(TelemetryConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn test_every_environment_name_parses() {
        for environment in Environment::ALL {
            let parsed: Environment = environment.as_str().parse().unwrap();
            assert_eq!(parsed, environment);
        }
    }

    #[test]
    fn test_clustered_environments() {
        let clustered: Vec<Environment> = Environment::ALL
            .into_iter()
            .filter(|environment| environment.is_clustered())
            .collect();
        assert_eq!(
            clustered,
            vec![
                Environment::Test,
                Environment::Staging,
                Environment::Production
            ]
        );
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = TelemetryConfig::new(Environment::Staging)
            .with_level(Level::Info)
            .with_version("deadbeef");
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.log_level, Level::Info);
        assert_eq!(config.version, "deadbeef");
    }
}

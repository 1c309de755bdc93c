//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use super::RunOptions;
use crate::output::OutputFormat;

/// Environment variable prefix
const ENV_PREFIX: &str = "TAPKIT";

/// Configuration read from `TAPKIT_*` variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Serial mode from TAPKIT_SERIAL
    pub serial: Option<bool>,
    /// Settle mode from TAPKIT_SETTLE
    pub settle: Option<bool>,
    /// Backtraces from TAPKIT_SHOW_STACK
    pub show_stack: Option<bool>,
    /// Hidden skips from TAPKIT_HIDE_SKIP
    pub hide_skip: Option<bool>,
    /// Fan-out limit from TAPKIT_CONCURRENCY
    pub concurrency: Option<usize>,
    /// Output format from TAPKIT_FORMAT
    pub format: Option<String>,
    /// Log level from TAPKIT_LOG
    pub log_level: Option<String>,
    /// Config file from TAPKIT_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            serial: get_env_bool("SERIAL"),
            settle: get_env_bool("SETTLE"),
            show_stack: get_env_bool("SHOW_STACK"),
            hide_skip: get_env_bool("HIDE_SKIP"),
            concurrency: get_env_parse("CONCURRENCY"),
            format: get_env("FORMAT"),
            log_level: get_env("LOG"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.serial.is_some()
            || self.settle.is_some()
            || self.show_stack.is_some()
            || self.hide_skip.is_some()
            || self.concurrency.is_some()
            || self.format.is_some()
            || self.log_level.is_some()
            || self.config_file.is_some()
    }

    /// Overrides carried by the environment. Unknown formats are ignored.
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            serial: self.serial,
            settle: self.settle,
            show_stack: self.show_stack,
            hide_skip: self.hide_skip,
            concurrency: self.concurrency,
            format: self.format.as_deref().and_then(OutputFormat::parse),
            ..RunOptions::default()
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn serial(mut self, serial: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_SERIAL"), serial.to_string()));
        self
    }

    pub fn settle(mut self, settle: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_SETTLE"), settle.to_string()));
        self
    }

    pub fn concurrency(mut self, limit: usize) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_CONCURRENCY"), limit.to_string()));
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_FORMAT"), format.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.serial.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder_round_trip() {
        let _guard = EnvBuilder::new()
            .serial(true)
            .settle(false)
            .concurrency(3)
            .format("json")
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.serial, Some(true));
        assert_eq!(config.settle, Some(false));
        assert_eq!(config.concurrency, Some(3));
        assert!(config.has_any());

        let options = config.to_run_options();
        assert_eq!(options.serial, Some(true));
        assert_eq!(options.settle, Some(false));
        assert_eq!(options.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_unknown_format_is_ignored() {
        let config = EnvConfig {
            format: Some("xml".to_string()),
            ..Default::default()
        };
        assert_eq!(config.to_run_options().format, None);
    }
}

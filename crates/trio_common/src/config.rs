//! Trio Configuration
//!
//! Endpoint, model and pipeline knobs. Built once at startup and passed
//! explicitly; nothing here is global.
//!
//! Resolution order:
//! 1. `--config PATH` (must exist)
//! 2. `$TRIO_CONFIG` (must exist)
//! 3. `$XDG_CONFIG_HOME/trio/config.toml` (optional, defaults if missing)
//!
//! `TRIO_ENDPOINT` / `TRIO_MODEL` are applied on top of the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config directory name under the user config dir
const CONFIG_DIR: &str = "trio";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TRIO_CONFIG";
pub const ENDPOINT_ENV: &str = "TRIO_ENDPOINT";
pub const MODEL_ENV: &str = "TRIO_MODEL";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Generation service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Full URL of the generate endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Envelope fields checked, in order, for the generated text
    #[serde(default = "default_text_fields")]
    pub text_fields: Vec<String>,
}

fn default_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "smollm:1.7b".to_string()
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_text_fields() -> Vec<String> {
    ["response", "output", "message", "result"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            text_fields: default_text_fields(),
        }
    }
}

/// Role pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_planner_temperature")]
    pub planner_temperature: f32,

    #[serde(default = "default_reviewer_temperature")]
    pub reviewer_temperature: f32,

    /// Total Reviewer attempts (initial + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between Reviewer attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_planner_temperature() -> f32 {
    0.4
}

fn default_reviewer_temperature() -> f32 {
    0.25
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    600
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            planner_temperature: default_planner_temperature(),
            reviewer_temperature: default_reviewer_temperature(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrioConfig {
    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl TrioConfig {
    /// Default config file location, if a config dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config file and apply environment overrides
    ///
    /// Not validated here: CLI flags go on top first, then `validate()`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// `load` with the environment read through `env`
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_path = env(CONFIG_ENV).map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load_from(&path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_from(env);
        Ok(config)
    }

    /// Apply TRIO_ENDPOINT / TRIO_MODEL
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_overrides(env(ENDPOINT_ENV), env(MODEL_ENV), None);
    }

    /// Overwrite endpoint, model and timeout when given
    pub fn apply_overrides(
        &mut self,
        endpoint: Option<String>,
        model: Option<String>,
        timeout_secs: Option<u64>,
    ) {
        if let Some(endpoint) = endpoint {
            self.generation.endpoint = endpoint;
        }
        if let Some(model) = model {
            self.generation.model = model;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.generation.timeout_secs = timeout_secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.endpoint.trim().is_empty() {
            return Err(invalid("generation.endpoint", "must not be empty"));
        }
        if self.generation.model.trim().is_empty() {
            return Err(invalid("generation.model", "must not be empty"));
        }
        if self.generation.timeout_secs == 0 {
            return Err(invalid("generation.timeout_secs", "must be at least 1"));
        }
        if self.generation.text_fields.is_empty() {
            return Err(invalid("generation.text_fields", "must list at least one field"));
        }
        if self.pipeline.max_attempts == 0 {
            return Err(invalid("pipeline.max_attempts", "must be at least 1"));
        }
        for (field, value) in [
            ("pipeline.planner_temperature", self.pipeline.planner_temperature),
            ("pipeline.reviewer_temperature", self.pipeline.reviewer_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(invalid(field, &format!("{} is outside 0.0..=2.0", value)));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TrioConfig::default();
        assert_eq!(config.generation.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(config.generation.model, "smollm:1.7b");
        assert_eq!(config.generation.timeout_secs, 180);
        assert_eq!(
            config.generation.text_fields,
            vec!["response", "output", "message", "result"]
        );
        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.pipeline.retry_delay_ms, 600);
        assert!((config.pipeline.planner_temperature - 0.4).abs() < f32::EPSILON);
        assert!((config.pipeline.reviewer_temperature - 0.25).abs() < f32::EPSILON);
        assert_eq!(config.log.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generation]\nmodel = \"qwen2.5:1.5b\"\n\n[pipeline]\nmax_attempts = 5").unwrap();

        let config = TrioConfig::load_from(file.path()).unwrap();
        assert_eq!(config.generation.model, "qwen2.5:1.5b");
        assert_eq!(config.generation.endpoint, default_endpoint());
        assert_eq!(config.pipeline.max_attempts, 5);
        assert_eq!(config.pipeline.retry_delay_ms, 600);
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = TrioConfig::load_from(file.path()).unwrap();
        assert_eq!(config, TrioConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrioConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generation\nmodel = ").unwrap();
        let err = TrioConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TrioConfig::default();
        config.pipeline.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "pipeline.max_attempts", .. })
        ));

        let mut config = TrioConfig::default();
        config.pipeline.reviewer_temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = TrioConfig::default();
        config.generation.text_fields.clear();
        assert!(config.validate().is_err());

        let mut config = TrioConfig::default();
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = TrioConfig::default();
        config.generation.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_config_env_selects_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generation]\nmodel = \"from-env-file\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = TrioConfig::load_with(None, env_of(&[(CONFIG_ENV, path.as_str())])).unwrap();
        assert_eq!(config.generation.model, "from-env-file");
    }

    #[test]
    fn test_explicit_path_beats_config_env() {
        let mut explicit = tempfile::NamedTempFile::new().unwrap();
        writeln!(explicit, "[generation]\nmodel = \"explicit\"").unwrap();
        let mut from_env = tempfile::NamedTempFile::new().unwrap();
        writeln!(from_env, "[generation]\nmodel = \"env\"").unwrap();
        let env_path = from_env.path().to_str().unwrap().to_string();

        let config =
            TrioConfig::load_with(Some(explicit.path()), env_of(&[(CONFIG_ENV, env_path.as_str())]))
                .unwrap();
        assert_eq!(config.generation.model, "explicit");
    }

    #[test]
    fn test_missing_config_env_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let missing = missing.to_str().unwrap();

        let err = TrioConfig::load_with(None, env_of(&[(CONFIG_ENV, missing)])).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert_eq!(path, PathBuf::from(missing)),
            other => panic!("expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[generation]\nendpoint = \"http://file:11434/api/generate\"\nmodel = \"file-model\"\ntimeout_secs = 42"
        )
        .unwrap();

        let config = TrioConfig::load_with(
            Some(file.path()),
            env_of(&[
                (ENDPOINT_ENV, "http://env:11434/api/generate"),
                (MODEL_ENV, "env-model"),
            ]),
        )
        .unwrap();
        assert_eq!(config.generation.endpoint, "http://env:11434/api/generate");
        assert_eq!(config.generation.model, "env-model");
        assert_eq!(config.generation.timeout_secs, 42);
    }

    #[test]
    fn test_load_defers_validation_to_caller() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generation]\ntimeout_secs = 0").unwrap();

        let mut config = TrioConfig::load_with(Some(file.path()), env_of(&[])).unwrap();
        assert!(config.validate().is_err());

        config.apply_overrides(None, None, Some(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut config = TrioConfig::default();
        config.apply_overrides(Some("http://10.0.0.2:11434/api/generate".to_string()), None, Some(30));
        assert_eq!(config.generation.endpoint, "http://10.0.0.2:11434/api/generate");
        assert_eq!(config.generation.model, "smollm:1.7b");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}

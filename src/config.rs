//! Configuration management for the crop recommender
//!
//! Settings come from an optional TOML file layered under `CROP_*` environment
//! overrides. Every section has defaults, so running without a file works.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, resolved relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable that points at an alternative config file.
const CONFIG_PATH_ENV: &str = "CROP_CONFIG";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: NetworkConfig,
    pub auth: AuthConfig,
    pub model: ModelConfig,
}

/// Listener settings (restart required)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    /// IP address to bind the HTTP listener
    /// Environment: CROP_SERVER__BIND_ADDRESS
    pub bind_address: String,

    /// Port for the HTTP listener
    /// Environment: CROP_SERVER__PORT
    pub port: u16,
}

/// Credential store and session settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Flat CSV file holding username/password-hash records
    pub users_file: String,

    /// Username that gets the admin home view after login
    pub admin_username: String,

    /// Idle lifetime of a session cookie
    pub session_ttl_secs: u64,

    // ═══ ARGON2 COST PARAMETERS ═══
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

/// Dataset and hyperparameter search settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// Labeled CSV dataset the classifier is trained on at startup
    pub dataset_file: String,

    /// Candidate ensemble sizes for the grid search
    pub n_estimators: Vec<u32>,

    /// Candidate maximum tree depths for the grid search
    pub max_depth: Vec<u32>,

    /// Number of cross-validation folds per candidate
    pub cv_folds: usize,

    /// Seed for fold assignment and tree bootstrapping
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_file: "users.csv".to_string(),
            admin_username: "admin".to_string(),
            session_ttl_secs: 3600,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dataset_file: "Crop_recommendation.csv".to_string(),
            n_estimators: vec![50, 100, 150, 200],
            max_depth: vec![5, 10, 15, 20],
            cv_folds: 5,
            seed: 42,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `$CROP_CONFIG` (or `config.toml`) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path; a missing file falls back to defaults
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: &str, env: Environment) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message("Port cannot be 0".into()));
        }

        if self.auth.users_file.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "users_file cannot be empty".into(),
            ));
        }

        if self.auth.admin_username.is_empty() {
            return Err(config::ConfigError::Message(
                "admin_username cannot be empty".into(),
            ));
        }

        if self.auth.session_ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "session_ttl_secs must be greater than 0".into(),
            ));
        }

        if self.model.dataset_file.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "dataset_file cannot be empty".into(),
            ));
        }

        validate_grid("n_estimators", &self.model.n_estimators)?;
        validate_grid("max_depth", &self.model.max_depth)?;

        if self.model.cv_folds < 2 {
            return Err(config::ConfigError::Message(
                "cv_folds must be at least 2".into(),
            ));
        }

        Ok(())
    }
}

/// `CROP_`-prefixed overrides, `__` between section and key.
/// Grid keys take comma-separated lists: `CROP_MODEL__MAX_DEPTH=5,10`.
fn environment() -> Environment {
    Environment::with_prefix("CROP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("model.n_estimators")
        .with_list_parse_key("model.max_depth")
}

/// Grid values feed u16 classifier parameters and must be non-empty and non-zero.
fn validate_grid(name: &str, values: &[u32]) -> Result<(), config::ConfigError> {
    if values.is_empty() {
        return Err(config::ConfigError::Message(format!(
            "{name} grid cannot be empty"
        )));
    }

    if let Some(bad) = values
        .iter()
        .find(|v| **v == 0 || **v > u32::from(u16::MAX))
    {
        return Err(config::ConfigError::Message(format!(
            "{name} value {bad} out of range 1..={}",
            u16::MAX
        )));
    }

    Ok(())
}

impl NetworkConfig {
    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl AuthConfig {
    /// Get the credential file as a PathBuf
    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.users_file)
    }

    /// Get the session idle lifetime as a Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl ModelConfig {
    /// Get the dataset file as a Path
    pub fn dataset_path(&self) -> &Path {
        Path::new(&self.dataset_file)
    }
}

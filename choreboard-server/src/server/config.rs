use choreboard_shared::auth::Role;
use serde::Deserialize;
use std::{env, fs, path::Path};

use crate::storage::SeedUser;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt_secret: String,
    #[serde(default)]
    pub users: Vec<UserConfig>,
    pub dev_cors_origin: Option<String>,
    pub listen_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// Falls back to `username` when omitted.
    pub display_name: Option<String>,
    pub password_hash: String, // bcrypt hash
    pub role: Role,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        ConfigError::Yaml(value)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
        Self::load_from_path(path)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path)?;
        let cfg: AppConfig = serde_yaml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt_secret must not be empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for u in &self.users {
            if u.username.trim().is_empty() {
                return Err(ConfigError::Invalid("username must not be empty".into()));
            }
            if !seen.insert(u.username.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate username: {}",
                    u.username
                )));
            }
        }
        Ok(())
    }

    /// Accounts to upsert into the user table on startup.
    pub fn seed_users(&self) -> Vec<SeedUser> {
        self.users
            .iter()
            .map(|u| SeedUser {
                username: u.username.clone(),
                display_name: u
                    .display_name
                    .clone()
                    .unwrap_or_else(|| u.username.clone()),
                password_hash: u.password_hash.clone(),
                role: u.role,
            })
            .collect()
    }
}

//! Configuration management for Glasshouse.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use glasshouse_common::constants::{
    CAPTCHA_CHALLENGE_LEN, DEFAULT_DATABASE_URL, DEFAULT_LISTEN_ADDR, LOCKOUT_DURATION_SECS,
    MAX_FAILED_ATTEMPTS, MIN_PASSWORD_LEN, SESSION_TTL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Lockout configuration
    #[serde(default)]
    pub lockout: LockoutConfig,

    /// Password policy configuration
    #[serde(default)]
    pub password: PasswordConfig,

    /// CAPTCHA configuration
    #[serde(default)]
    pub captcha: CaptchaConfig,
}

/// Session-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle expiry in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
        }
    }
}

/// Brute-force lockout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    /// Failed attempts before the session locks
    #[serde(default = "default_max_failures")]
    pub max_failed_attempts: u32,

    /// Lockout window in seconds
    #[serde(default = "default_lockout_duration")]
    pub duration_secs: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failures(),
            duration_secs: default_lockout_duration(),
        }
    }
}

/// Password-policy configuration for the hardened path
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    /// Minimum password length
    #[serde(default = "default_min_password_len")]
    pub min_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_password_len(),
        }
    }
}

/// CAPTCHA-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Challenge text length
    #[serde(default = "default_challenge_len")]
    pub challenge_len: usize,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            challenge_len: default_challenge_len(),
        }
    }
}

// Default value functions
fn default_database_url() -> String { DEFAULT_DATABASE_URL.to_string() }
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_session_ttl() -> u64 { SESSION_TTL_SECS }
fn default_max_failures() -> u32 { MAX_FAILED_ATTEMPTS }
fn default_lockout_duration() -> u64 { LOCKOUT_DURATION_SECS }
fn default_min_password_len() -> usize { MIN_PASSWORD_LEN }
fn default_challenge_len() -> usize { CAPTCHA_CHALLENGE_LEN }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(
        config_path: &str,
        database_url: Option<&str>,
        listen: Option<&str>,
    ) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(database_url) = database_url {
            config.database_url = database_url.to_string();
        }
        if let Some(listen) = listen {
            config.listen_addr = listen.to_string();
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            listen_addr: default_listen_addr(),
            session: SessionConfig::default(),
            lockout: LockoutConfig::default(),
            password: PasswordConfig::default(),
            captcha: CaptchaConfig::default(),
        }
    }
}

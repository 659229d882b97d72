//! Application state and shared resources.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::auth::{Authenticator, PasswordPolicy};
use crate::captcha::CaptchaGenerator;
use crate::config::AppConfig;
use crate::db::Storage;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// SQLite-backed credential and secret storage
    pub store: Storage,

    /// Process-wide session map
    pub sessions: SessionStore,

    /// CAPTCHA generator
    pub captcha: Arc<CaptchaGenerator>,

    /// Login evaluation service
    pub auth: Arc<Authenticator>,

    /// Password strength policy for hardened registration
    pub policy: PasswordPolicy,
}

impl AppState {
    /// Create new application state, connecting to the database and
    /// creating the schema if absent.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = Storage::connect(&config.database_url)
            .await
            .context("Failed to connect to database")?;

        store
            .init_schema()
            .await
            .context("Failed to initialize schema")?;

        Ok(Self::with_store(config, store))
    }

    /// Build state around an existing storage service (used by tests)
    pub fn with_store(config: AppConfig, store: Storage) -> Self {
        let sessions = SessionStore::new(config.session.ttl_secs);
        let captcha = Arc::new(CaptchaGenerator::new(config.captcha.challenge_len));
        let auth = Arc::new(Authenticator::new(
            config.lockout.max_failed_attempts,
            config.lockout.duration_secs,
        ));
        let policy = PasswordPolicy::new(config.password.min_length);

        Self {
            config,
            store,
            sessions,
            captcha,
            auth,
            policy,
        }
    }
}

//! Shared constants for Glasshouse components.

/// Default SQLite database URL (file created on first run)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://glasshouse.db?mode=rwc";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Failed login attempts before the session is locked out
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// Lockout window after repeated failures (30 seconds)
pub const LOCKOUT_DURATION_SECS: u64 = 30;

/// Idle session expiry (30 minutes)
pub const SESSION_TTL_SECS: u64 = 1800;

/// Minimum password length accepted by the hardened registration path
pub const MIN_PASSWORD_LEN: usize = 10;

/// Number of characters in a CAPTCHA challenge
pub const CAPTCHA_CHALLENGE_LEN: usize = 4;

/// Session cookie name
pub const SESSION_COOKIE: &str = "glasshouse_sid";

/// Form/query field that selects the vulnerable code path
pub const MODE_TOGGLE_FIELD: &str = "vulnerability";

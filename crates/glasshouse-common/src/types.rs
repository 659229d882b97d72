//! Core types shared across Glasshouse components.

use serde::{Deserialize, Serialize};

/// Selected code path for a request.
///
/// Every demonstration flow exists twice: a deliberately insecure
/// rendition and a hardened one. The toggle arrives as a form/query
/// field (`vulnerability=on`) and is parsed once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Insecure path: plaintext passwords, interpolated SQL, no CAPTCHA,
    /// no lockout. Kept on purpose for the side-by-side contrast.
    Vulnerable,
    /// Parameterized SQL, Argon2 digests, CAPTCHA and lockout enforced.
    Hardened,
}

impl Mode {
    /// Parse the checkbox-style toggle field. Checkboxes submit `"on"`
    /// when ticked and are absent otherwise.
    pub fn from_toggle(value: Option<&str>) -> Self {
        if value == Some("on") {
            Self::Vulnerable
        } else {
            Self::Hardened
        }
    }

    pub fn is_vulnerable(self) -> bool {
        matches!(self, Self::Vulnerable)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Hardened
    }
}

/// Authentication state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    /// No identity recorded
    Anonymous,
    /// Identity recorded after a successful login
    Authenticated,
    /// Lockout deadline set and unexpired
    Locked,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::Anonymous
    }
}

/// Result of evaluating a login submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Identity recorded in the session
    Success { username: String, mode: Mode },
    /// Vulnerable mode only: no row for this username
    UnknownUsername,
    /// Vulnerable mode only: stored password differs
    WrongPassword,
    /// Vulnerable mode only: the store failed mid-lookup
    StoreFailure,
    /// Hardened mode: submitted answer missing or not an exact match
    CaptchaMismatch,
    /// Hardened mode: lockout deadline unexpired; store not queried
    LockedOut { remaining_secs: i64 },
    /// Hardened mode: unknown user or digest mismatch, counted toward
    /// lockout. `locked_now` is set when this failure engaged the lock.
    InvalidCredentials { locked_now: bool },
}

/// Result of a registration submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created { mode: Mode },
    /// Unique constraint on `users.username` fired
    DuplicateUsername,
    /// Hardened mode: password failed the strength policy
    PolicyViolation,
    /// Hardened mode: computing the digest failed
    DigestFailure { message: String },
    /// Any other store error, surfaced verbatim
    StoreFailure { message: String },
}

/// Remaining whole seconds of a lockout window, rounded up.
///
/// Returns 0 once the deadline has elapsed.
pub fn lockout_remaining_secs(blocked_until_ms: i64, now_ms: i64) -> i64 {
    let diff = blocked_until_ms - now_ms;
    if diff <= 0 { 0 } else { diff.div_ceil(1000) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_toggle_parsing() {
        assert_eq!(Mode::from_toggle(Some("on")), Mode::Vulnerable);
        assert_eq!(Mode::from_toggle(Some("off")), Mode::Hardened);
        assert_eq!(Mode::from_toggle(Some("")), Mode::Hardened);
        assert_eq!(Mode::from_toggle(None), Mode::Hardened);
    }

    #[test]
    fn test_lockout_remaining_rounds_up() {
        assert_eq!(lockout_remaining_secs(30_000, 0), 30);
        assert_eq!(lockout_remaining_secs(30_001, 0), 31);
        assert_eq!(lockout_remaining_secs(29_999, 0), 30);
        assert_eq!(lockout_remaining_secs(1, 0), 1);
    }

    #[test]
    fn test_lockout_remaining_elapsed() {
        assert_eq!(lockout_remaining_secs(1000, 1000), 0);
        assert_eq!(lockout_remaining_secs(1000, 5000), 0);
    }
}

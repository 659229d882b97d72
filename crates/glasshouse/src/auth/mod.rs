//! Login and registration flows.
//!
//! The login state machine is the one piece of the app with real
//! branching: CAPTCHA gate, lockout window, credential verification,
//! and failure counting, evaluated in that order. The vulnerable mode
//! skips the CAPTCHA and lockout steps entirely; that asymmetry is the
//! demonstration and is not unified.

mod password;

pub use password::{PasswordPolicy, hash_password, verify_password};

use glasshouse_common::{GlasshouseError, LoginOutcome, Mode, RegisterOutcome, lockout_remaining_secs};

use crate::db::Storage;
use crate::session::Session;

/// Login evaluation service
pub struct Authenticator {
    /// Failed attempts before the session locks
    max_failed_attempts: u32,
    /// Lockout window in seconds
    lockout_duration_secs: u64,
}

impl Authenticator {
    pub fn new(max_failed_attempts: u32, lockout_duration_secs: u64) -> Self {
        Self {
            max_failed_attempts,
            lockout_duration_secs,
        }
    }

    /// Evaluate a login submission, mutating `session` accordingly.
    ///
    /// Never returns an error: store failures fold into the outcome the
    /// same way the flows treat any other mismatch.
    pub async fn login(
        &self,
        store: &Storage,
        session: &mut Session,
        username: &str,
        password: &str,
        captcha: Option<&str>,
        mode: Mode,
    ) -> LoginOutcome {
        match mode {
            Mode::Vulnerable => self.login_vulnerable(store, session, username, password).await,
            Mode::Hardened => {
                self.login_hardened(store, session, username, password, captcha)
                    .await
            }
        }
    }

    /// INTENTIONALLY INSECURE: plain string equality against the stored
    /// password, distinct messages for unknown user vs. wrong password,
    /// no CAPTCHA, no lockout.
    async fn login_vulnerable(
        &self,
        store: &Storage,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> LoginOutcome {
        let user = match store.find_user(username).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "credential lookup failed");
                return LoginOutcome::StoreFailure;
            }
        };

        let Some(user) = user else {
            return LoginOutcome::UnknownUsername;
        };

        if password != user.password {
            return LoginOutcome::WrongPassword;
        }

        session.user = Some(username.to_string());
        LoginOutcome::Success {
            username: username.to_string(),
            mode: Mode::Vulnerable,
        }
    }

    async fn login_hardened(
        &self,
        store: &Storage,
        session: &mut Session,
        username: &str,
        password: &str,
        captcha: Option<&str>,
    ) -> LoginOutcome {
        // CAPTCHA first; a mismatch does not touch the failure counter
        let captcha_ok = match (captcha, session.captcha_answer.as_deref()) {
            (Some(answer), Some(expected)) => !answer.is_empty() && answer == expected,
            _ => false,
        };
        if !captcha_ok {
            return LoginOutcome::CaptchaMismatch;
        }

        // Active lockout rejects without querying the store
        let now = chrono::Utc::now().timestamp_millis();
        if let Some(until) = session.blocked_until {
            if now < until {
                return LoginOutcome::LockedOut {
                    remaining_secs: lockout_remaining_secs(until, now),
                };
            }
        }

        // A store error counts as a failed attempt, like an absent user
        let verified = match store.find_user(username).await {
            Ok(Some(user)) => verify_password(password, &user.password),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "credential lookup failed");
                false
            }
        };

        if verified {
            session.failed_attempts = 0;
            session.blocked_until = None;
            session.user = Some(username.to_string());
            return LoginOutcome::Success {
                username: username.to_string(),
                mode: Mode::Hardened,
            };
        }

        session.failed_attempts += 1;
        if session.failed_attempts >= self.max_failed_attempts {
            session.blocked_until = Some(now + (self.lockout_duration_secs * 1000) as i64);
            session.failed_attempts = 0;
            tracing::warn!(
                username = %username,
                lockout_secs = self.lockout_duration_secs,
                "session locked out after repeated failures"
            );
            return LoginOutcome::InvalidCredentials { locked_now: true };
        }

        LoginOutcome::InvalidCredentials { locked_now: false }
    }
}

/// Evaluate a registration submission.
///
/// Vulnerable mode stores the plaintext as-is; hardened mode enforces
/// the strength policy and stores an Argon2 digest. Both report a
/// unique-constraint violation distinctly from other store errors.
pub async fn register(
    store: &Storage,
    policy: &PasswordPolicy,
    username: &str,
    password: &str,
    mode: Mode,
) -> RegisterOutcome {
    let stored = match mode {
        Mode::Vulnerable => password.to_string(),
        Mode::Hardened => {
            if !policy.validate(password) {
                return RegisterOutcome::PolicyViolation;
            }
            match hash_password(password) {
                Ok(digest) => digest,
                Err(GlasshouseError::PasswordHash(message)) => {
                    return RegisterOutcome::DigestFailure { message };
                }
                Err(e) => {
                    return RegisterOutcome::DigestFailure {
                        message: e.to_string(),
                    };
                }
            }
        }
    };

    match store.create_user(username, &stored).await {
        Ok(()) => {
            tracing::info!(username = %username, mode = ?mode, "user registered");
            RegisterOutcome::Created { mode }
        }
        Err(e) if e.is_unique_violation() => RegisterOutcome::DuplicateUsername,
        Err(e) => RegisterOutcome::StoreFailure {
            message: e.to_string(),
        },
    }
}

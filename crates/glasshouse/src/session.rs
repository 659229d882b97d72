//! Cookie-keyed session state.
//!
//! The cookie carries only an opaque identifier; the payload lives in a
//! process-wide map. Handlers follow a get-mutate-save cycle: load a
//! copy, mutate it, write it back. Entries are pruned after an idle TTL
//! and destroyed outright on logout.

use std::collections::HashMap;
use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use tokio::sync::RwLock;

use glasshouse_common::constants::SESSION_COOKIE;
use glasshouse_common::{AuthState, lockout_remaining_secs};

/// Per-client session payload
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Identity recorded by a successful login
    pub user: Option<String>,

    /// Expected answer of the most recently issued CAPTCHA
    pub captcha_answer: Option<String>,

    /// Failed hardened-mode login attempts since the last reset
    pub failed_attempts: u32,

    /// Lockout deadline in epoch milliseconds
    pub blocked_until: Option<i64>,

    /// One-shot flash messages, cleared by the home page render
    pub register_message: Option<String>,
    pub login_message: Option<String>,
    pub notice: Option<String>,
}

impl Session {
    /// Authentication state at `now_ms`
    pub fn auth_state(&self, now_ms: i64) -> AuthState {
        if self.is_blocked(now_ms) {
            AuthState::Locked
        } else if self.user.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    /// True while a lockout deadline is set and unexpired
    pub fn is_blocked(&self, now_ms: i64) -> bool {
        self.blocked_until.is_some_and(|until| now_ms < until)
    }

    /// Whole seconds until the lockout elapses, rounded up; 0 if not blocked
    pub fn lockout_remaining(&self, now_ms: i64) -> i64 {
        match self.blocked_until {
            Some(until) => lockout_remaining_secs(until, now_ms),
            None => 0,
        }
    }

    /// Read and clear the one-shot flash messages, in
    /// (register, login, notice) order.
    pub fn take_flashes(&mut self) -> (Option<String>, Option<String>, Option<String>) {
        (
            self.register_message.take(),
            self.login_message.take(),
            self.notice.take(),
        )
    }
}

struct SessionEntry {
    session: Session,
    last_seen: i64,
}

/// Process-wide session store
#[derive(Clone)]
pub struct SessionStore {
    /// Idle expiry in seconds
    ttl_secs: u64,
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve the session for a request.
    ///
    /// Returns the definitive session id and a copy of the payload. An
    /// unknown or expired id gets a fresh session under a fresh id, so
    /// the caller must always write the returned id back into the
    /// cookie jar.
    pub async fn get_or_create(&self, cookie_sid: Option<&str>) -> (String, Session) {
        let now = chrono::Utc::now().timestamp_millis();
        let mut map = self.inner.write().await;

        let ttl_ms = (self.ttl_secs * 1000) as i64;
        map.retain(|_, entry| now - entry.last_seen < ttl_ms);

        if let Some(sid) = cookie_sid {
            if let Some(entry) = map.get_mut(sid) {
                entry.last_seen = now;
                return (sid.to_string(), entry.session.clone());
            }
        }

        let sid = generate_session_id();
        map.insert(
            sid.clone(),
            SessionEntry {
                session: Session::default(),
                last_seen: now,
            },
        );
        tracing::debug!(sid = %sid, "new session created");
        (sid, Session::default())
    }

    /// Write a mutated session back under its id
    pub async fn save(&self, sid: &str, session: Session) {
        let now = chrono::Utc::now().timestamp_millis();
        let mut map = self.inner.write().await;
        map.insert(
            sid.to_string(),
            SessionEntry {
                session,
                last_seen: now,
            },
        );
    }

    /// Destroy a session outright (logout)
    pub async fn destroy(&self, sid: &str) {
        let mut map = self.inner.write().await;
        if map.remove(sid).is_some() {
            tracing::debug!(sid = %sid, "session destroyed");
        }
    }

    /// Peek at a session without refreshing its idle timer
    pub async fn peek(&self, sid: &str) -> Option<Session> {
        let map = self.inner.read().await;
        map.get(sid).map(|entry| entry.session.clone())
    }
}

/// Build the session cookie for `sid`
pub fn session_cookie(sid: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_http_only(true);
    cookie.set_same_site(Some(SameSite::Lax));
    cookie.set_path("/");
    cookie
}

/// Generate a cryptographically random session identifier
fn generate_session_id() -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let mut bytes = [0u8; 16];
    rand::Rng::fill(&mut rand::rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

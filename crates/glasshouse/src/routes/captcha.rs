//! CAPTCHA issuance endpoint.

use axum::extract::State;
use axum::http::{HeaderName, header};
use axum_extra::extract::CookieJar;

use glasshouse_common::constants::SESSION_COOKIE;

use crate::session::session_cookie;
use crate::state::AppState;

/// Issue a new CAPTCHA image.
///
/// The expected answer overwrites any prior unconsumed answer in the
/// session. Served uncached so every fetch is a fresh challenge.
pub async fn issue(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, [(HeaderName, &'static str); 2], String) {
    let cookie_sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (sid, mut session) = state.sessions.get_or_create(cookie_sid.as_deref()).await;

    let challenge = state.captcha.generate();
    tracing::debug!(sid = %sid, "issued CAPTCHA challenge");

    session.captcha_answer = Some(challenge.answer);
    state.sessions.save(&sid, session).await;

    (
        jar.add(session_cookie(sid)),
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        challenge.svg,
    )
}

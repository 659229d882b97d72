//! Home page rendering.

use askama::Template;
use axum::{extract::State, http::StatusCode, response::Html};
use axum_extra::extract::CookieJar;

use glasshouse_common::GlasshouseError;
use glasshouse_common::constants::SESSION_COOKIE;

use crate::session::session_cookie;
use crate::state::AppState;
use crate::templates::IndexTemplate;

/// Render the home page.
///
/// Reads and clears the one-shot flash messages, so a reload shows them
/// exactly once. The lockout countdown is recomputed per render.
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), StatusCode> {
    let cookie_sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (sid, mut session) = state.sessions.get_or_create(cookie_sid.as_deref()).await;

    let now = chrono::Utc::now().timestamp_millis();
    let (register_message, login_message, notice) = session.take_flashes();

    let template = IndexTemplate {
        logged_in: session.user.is_some(),
        username: session.user.clone().unwrap_or_default(),
        blocked: session.is_blocked(now),
        remaining_secs: session.lockout_remaining(now),
        register_message: register_message.unwrap_or_default(),
        login_message: login_message.unwrap_or_default(),
        notice: notice.unwrap_or_default(),
    };

    state.sessions.save(&sid, session).await;

    let html = template.render().map_err(|e| {
        let err = GlasshouseError::Template(e.to_string());
        tracing::error!(error = %err, "failed to render home page");
        super::error_status(&err)
    })?;

    Ok((jar.add(session_cookie(sid)), Html(html)))
}

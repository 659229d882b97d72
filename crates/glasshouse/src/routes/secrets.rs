//! Secrets query and submission endpoints.

use askama::Template;
use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use glasshouse_common::constants::SESSION_COOKIE;
use glasshouse_common::{GlasshouseError, Mode};

use crate::session::session_cookie;
use crate::state::AppState;
use crate::templates::MessagesTemplate;

#[derive(Deserialize)]
pub struct MessagesQuery {
    id: Option<String>,
    pin: Option<String>,
    vulnerability: Option<String>,
}

/// Query secrets by `id` + `pin`.
///
/// The vulnerable path hands both values to the raw-interpolation query;
/// the hardened path binds them. Both render the same result list. A
/// store failure renders its message in the page body.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<MessagesQuery>,
) -> Result<Html<String>, StatusCode> {
    let mode = Mode::from_toggle(params.vulnerability.as_deref());
    let id = params.id.unwrap_or_default();
    let pin = params.pin.unwrap_or_default();

    let result = match mode {
        Mode::Vulnerable => state.store.secrets_matching_raw(&id, &pin).await,
        Mode::Hardened => state.store.secrets_matching(&id, &pin).await,
    };

    match result {
        Ok(rows) => {
            let template = MessagesTemplate { messages: rows };
            let html = template.render().map_err(|e| {
                let err = GlasshouseError::Template(e.to_string());
                tracing::error!(error = %err, "failed to render messages page");
                super::error_status(&err)
            })?;
            Ok(Html(html))
        }
        Err(e) => Ok(Html(format!("Error fetching data: {e}"))),
    }
}

#[derive(Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    id: String,
    #[serde(default)]
    secret: String,
    #[serde(default)]
    pin: String,
}

/// Insert a secret row. Always parameterized; no toggle reaches this
/// path. Store failures are logged, never shown.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SubmitForm>,
) -> (CookieJar, Redirect) {
    let cookie_sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (sid, mut session) = state.sessions.get_or_create(cookie_sid.as_deref()).await;

    match state
        .store
        .insert_secret(&form.id, &form.secret, &form.pin)
        .await
    {
        Ok(()) => {
            session.notice = Some("Secret stored successfully.".to_string());
        }
        Err(e) => {
            tracing::error!(error = %e, "secret insertion failed");
        }
    }

    state.sessions.save(&sid, session).await;
    (jar.add(session_cookie(sid)), Redirect::to("/"))
}

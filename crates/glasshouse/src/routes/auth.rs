//! Login, registration, and logout endpoints.
//!
//! Every submission terminates in a redirect; the outcome is stored as
//! a session flash for the next home-page render.

use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde::Deserialize;

use glasshouse_common::constants::SESSION_COOKIE;
use glasshouse_common::{LoginOutcome, Mode, RegisterOutcome};

use crate::session::session_cookie;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    captcha: Option<String>,
    vulnerability: Option<String>,
}

/// Authenticate a login submission
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> (CookieJar, Redirect) {
    let mode = Mode::from_toggle(form.vulnerability.as_deref());
    let cookie_sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (sid, mut session) = state.sessions.get_or_create(cookie_sid.as_deref()).await;

    let outcome = state
        .auth
        .login(
            &state.store,
            &mut session,
            &form.username,
            &form.password,
            form.captcha.as_deref(),
            mode,
        )
        .await;

    session.login_message = Some(login_flash(&outcome));
    state.sessions.save(&sid, session).await;

    (jar.add(session_cookie(sid)), Redirect::to("/"))
}

fn login_flash(outcome: &LoginOutcome) -> String {
    match outcome {
        LoginOutcome::Success {
            mode: Mode::Vulnerable,
            ..
        } => "Login successful (vulnerability enabled).".to_string(),
        LoginOutcome::Success {
            mode: Mode::Hardened,
            ..
        } => "Login successful (vulnerability disabled).".to_string(),
        LoginOutcome::UnknownUsername => "Username does not exist.".to_string(),
        LoginOutcome::WrongPassword => "Incorrect password.".to_string(),
        LoginOutcome::StoreFailure => "Error occurred while logging in.".to_string(),
        LoginOutcome::CaptchaMismatch => "CAPTCHA verification failed.".to_string(),
        LoginOutcome::LockedOut { remaining_secs } => {
            format!("Too many failed attempts. Try again in {remaining_secs} seconds.")
        }
        LoginOutcome::InvalidCredentials { .. } => "Invalid username or password.".to_string(),
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    vulnerability: Option<String>,
}

/// Create a user account
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> (CookieJar, Redirect) {
    let mode = Mode::from_toggle(form.vulnerability.as_deref());
    let cookie_sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (sid, mut session) = state.sessions.get_or_create(cookie_sid.as_deref()).await;

    let outcome = crate::auth::register(
        &state.store,
        &state.policy,
        &form.username,
        &form.password,
        mode,
    )
    .await;

    session.register_message = Some(register_flash(&outcome, state.policy.min_length));
    state.sessions.save(&sid, session).await;

    (jar.add(session_cookie(sid)), Redirect::to("/"))
}

fn register_flash(outcome: &RegisterOutcome, min_length: usize) -> String {
    match outcome {
        RegisterOutcome::Created {
            mode: Mode::Vulnerable,
        } => "User registered (vulnerability enabled).".to_string(),
        RegisterOutcome::Created {
            mode: Mode::Hardened,
        } => "User registered (vulnerability disabled).".to_string(),
        RegisterOutcome::DuplicateUsername => "Error: username already exists.".to_string(),
        RegisterOutcome::PolicyViolation => format!(
            "Password must contain at least {min_length} characters, 1 uppercase letter, and 1 digit."
        ),
        RegisterOutcome::DigestFailure { message } => {
            format!("Error hashing password: {message}")
        }
        RegisterOutcome::StoreFailure { message } => {
            format!("Error registering user: {message}")
        }
    }
}

/// Destroy the session and return to the referring page
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }

    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/")
        .to_string();

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), Redirect::to(&target))
}

//! End-to-end route tests: cookie sessions, flash messages, CAPTCHA
//! gating, lockout, and the injection demonstration.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use glasshouse::config::AppConfig;
use glasshouse::db::Storage;
use glasshouse::routes::create_router;
use glasshouse::state::AppState;

async fn test_state() -> AppState {
    // single connection: every pool member of :memory: is its own db
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    let store = Storage::from_pool(pool);
    store.init_schema().await.expect("failed to create schema");
    AppState::with_store(AppConfig::default(), store)
}

async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (create_router(state.clone()), state)
}

/// Extract the `name=value` pair of the session cookie from a response
fn session_cookie(resp: &axum::response::Response) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .expect("response set no cookie")
        .to_str()
        .expect("cookie was not utf-8")
        .split(';')
        .next()
        .expect("empty set-cookie header")
        .to_string()
}

/// The opaque session id carried by a `name=value` cookie pair
fn sid_of(cookie: &str) -> &str {
    cookie.split_once('=').expect("malformed cookie").1
}

async fn get(app: &Router, path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).expect("failed to build request"))
        .await
        .expect("request failed")
}

async fn post_form(
    app: &Router,
    path: &str,
    body: &str,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(
            builder
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed")
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

/// Register a user and return the session cookie of that client
async fn register_user(app: &Router, username: &str, password: &str, vulnerable: bool) -> String {
    let toggle = if vulnerable { "&vulnerability=on" } else { "" };
    let resp = post_form(
        app,
        "/register",
        &format!("username={username}&password={password}{toggle}"),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    session_cookie(&resp)
}

/// Fetch a CAPTCHA for `cookie` and read back the expected answer
async fn solve_captcha(app: &Router, state: &AppState, cookie: &str) -> String {
    let resp = get(app, "/captcha", Some(cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = state
        .sessions
        .peek(sid_of(cookie))
        .await
        .expect("session vanished");
    session.captcha_answer.expect("no CAPTCHA answer stored")
}

#[tokio::test]
async fn home_page_renders_and_sets_session_cookie() {
    let (app, _state) = test_app().await;

    let resp = get(&app, "/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = session_cookie(&resp);
    assert!(cookie.starts_with("glasshouse_sid="));

    let body = body_text(resp).await;
    assert!(body.contains("Glasshouse"));
    assert!(!body.contains("Signed in as"));
}

#[tokio::test]
async fn captcha_is_svg_and_overwrites_prior_answer() {
    let (app, state) = test_app().await;

    let resp = get(&app, "/", None).await;
    let cookie = session_cookie(&resp);

    let resp = get(&app, "/captcha", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
    let first = state
        .sessions
        .peek(sid_of(&cookie))
        .await
        .unwrap()
        .captcha_answer
        .unwrap();
    let svg = body_text(resp).await;
    assert!(svg.starts_with("<svg"));

    // a second fetch replaces the stored answer
    let second = solve_captcha(&app, &state, &cookie).await;
    assert_eq!(first.len(), second.len());
    let current = state
        .sessions
        .peek(sid_of(&cookie))
        .await
        .unwrap()
        .captcha_answer
        .unwrap();
    assert_eq!(current, second);
}

#[tokio::test]
async fn hardened_login_requires_captcha_even_with_correct_credentials() {
    let (app, _state) = test_app().await;
    let cookie = register_user(&app, "mira", "Sufficient1Pw", false).await;

    let resp = post_form(
        &app,
        "/login",
        "username=mira&password=Sufficient1Pw",
        Some(&cookie),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("CAPTCHA verification failed."));
    assert!(!body.contains("Signed in as"));
}

#[tokio::test]
async fn hardened_login_succeeds_and_flash_shows_once() {
    let (app, state) = test_app().await;
    let cookie = register_user(&app, "mira", "Sufficient1Pw", false).await;

    let answer = solve_captcha(&app, &state, &cookie).await;
    let resp = post_form(
        &app,
        "/login",
        &format!("username=mira&password=Sufficient1Pw&captcha={answer}"),
        Some(&cookie),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Login successful (vulnerability disabled)."));
    assert!(body.contains("Signed in as"));
    assert!(body.contains("mira"));

    // the flash is consumed by the first render
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(!body.contains("Login successful"));
    assert!(body.contains("Signed in as"));
}

#[tokio::test]
async fn three_failures_lock_the_session_and_reject_correct_credentials() {
    let (app, state) = test_app().await;
    let cookie = register_user(&app, "mira", "Sufficient1Pw", false).await;

    for _ in 0..3 {
        let answer = solve_captcha(&app, &state, &cookie).await;
        let resp = post_form(
            &app,
            "/login",
            &format!("username=mira&password=wrong&captcha={answer}"),
            Some(&cookie),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    // the home page shows the countdown
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Too many failed attempts. Try again in"));

    // correct credentials are rejected while the window is open
    let answer = solve_captcha(&app, &state, &cookie).await;
    post_form(
        &app,
        "/login",
        &format!("username=mira&password=Sufficient1Pw&captcha={answer}"),
        Some(&cookie),
    )
    .await;
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Too many failed attempts. Try again in"));
    assert!(!body.contains("Signed in as"));

    let session = state.sessions.peek(sid_of(&cookie)).await.unwrap();
    assert_eq!(session.failed_attempts, 0);
    assert!(session.blocked_until.is_some());
}

#[tokio::test]
async fn vulnerable_login_skips_captcha_and_lockout() {
    let (app, _state) = test_app().await;
    let cookie = register_user(&app, "mira", "hunter2", true).await;

    // repeated failures never lock the vulnerable path
    for _ in 0..5 {
        post_form(
            &app,
            "/login",
            "username=mira&password=wrong&vulnerability=on",
            Some(&cookie),
        )
        .await;
    }

    let resp = post_form(
        &app,
        "/login",
        "username=mira&password=hunter2&vulnerability=on",
        Some(&cookie),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Login successful (vulnerability enabled)."));
    assert!(body.contains("Signed in as"));
}

#[tokio::test]
async fn vulnerable_login_reveals_which_part_was_wrong() {
    let (app, _state) = test_app().await;
    let cookie = register_user(&app, "mira", "hunter2", true).await;

    post_form(
        &app,
        "/login",
        "username=nobody&password=hunter2&vulnerability=on",
        Some(&cookie),
    )
    .await;
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Username does not exist."));

    post_form(
        &app,
        "/login",
        "username=mira&password=wrong&vulnerability=on",
        Some(&cookie),
    )
    .await;
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Incorrect password."));
}

#[tokio::test]
async fn weak_password_is_rejected_before_the_store() {
    let (app, state) = test_app().await;

    let cookie = register_user(&app, "mira", "short1A", false).await;
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Password must contain at least 10 characters"));
    assert!(state.store.find_user("mira").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_reports_the_specific_message() {
    let (app, _state) = test_app().await;
    register_user(&app, "mira", "Sufficient1Pw", false).await;

    let cookie = register_user(&app, "mira", "Different1Pw", false).await;
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Error: username already exists."));
}

#[tokio::test]
async fn secrets_round_trip_and_injection_bypass() {
    let (app, _state) = test_app().await;

    for (id, secret, pin) in [("a", "s", "1234"), ("a", "s2", "9999"), ("b", "s3", "1234")] {
        let resp = post_form(
            &app,
            "/submit",
            &format!("id={id}&secret={secret}&pin={pin}"),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    // parameterized: only the exact id+pin match comes back
    let body = body_text(get(&app, "/messages?id=a&pin=1234", None).await).await;
    assert!(body.contains("<td>s</td>"));
    assert!(!body.contains("<td>s2</td>"));
    assert!(!body.contains("<td>s3</td>"));

    // parameterized with a wrong pin: nothing
    let body = body_text(get(&app, "/messages?id=a&pin=0000", None).await).await;
    assert!(body.contains("No rows matched."));

    // boolean tail in the pin position, vulnerable path: every row leaks
    let payload = "%27%20OR%20%271%27%3D%271"; // ' OR '1'='1
    let body = body_text(
        get(&app, &format!("/messages?id=x&pin={payload}&vulnerability=on"), None).await,
    )
    .await;
    assert!(body.contains("<td>s</td>"));
    assert!(body.contains("<td>s2</td>"));
    assert!(body.contains("<td>s3</td>"));

    // the identical input on the hardened path matches literally
    let body = body_text(get(&app, &format!("/messages?id=x&pin={payload}"), None).await).await;
    assert!(body.contains("No rows matched."));
}

#[tokio::test]
async fn submit_confirmation_appears_as_notice() {
    let (app, _state) = test_app().await;

    let resp = post_form(&app, "/submit", "id=a&secret=s&pin=1", None).await;
    let cookie = session_cookie(&resp);

    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(body.contains("Secret stored successfully."));
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let (app, state) = test_app().await;
    let cookie = register_user(&app, "mira", "Sufficient1Pw", false).await;

    let answer = solve_captcha(&app, &state, &cookie).await;
    post_form(
        &app,
        "/login",
        &format!("username=mira&password=Sufficient1Pw&captcha={answer}"),
        Some(&cookie),
    )
    .await;

    let resp = post_form(&app, "/logout", "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    assert!(state.sessions.peek(sid_of(&cookie)).await.is_none());
    let body = body_text(get(&app, "/", Some(&cookie)).await).await;
    assert!(!body.contains("Signed in as"));
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _state) = test_app().await;

    let resp = get(&app, "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains(r#""status":"ok""#));
}

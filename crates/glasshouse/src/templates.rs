//! Askama templates for the HTML-rendered pages.

use askama::Template;

use crate::db::SecretRow;

/// Home page: login state, lockout countdown, one-shot flash messages,
/// and the four demo forms.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub logged_in: bool,
    pub username: String,
    pub blocked: bool,
    pub remaining_secs: i64,
    pub register_message: String,
    pub login_message: String,
    pub notice: String,
}

/// Secrets query result list
#[derive(Template)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub messages: Vec<SecretRow>,
}

//! Rust structs mirroring store rows.

use sqlx::FromRow;

/// A registered user. `password` holds either an Argon2 digest or, for
/// accounts created through the vulnerable path, the plaintext itself.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub username: String,
    pub password: String,
}

/// A stored secret, looked up by `id` + `pin` equality.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SecretRow {
    pub id: String,
    pub secret: String,
    pub pin: String,
}

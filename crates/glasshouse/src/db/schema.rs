//! SQL DDL for initializing the demo store.
//! SQLite-first; created if absent at startup, no migrations.

/// SQLite schema:
/// - `secrets` has no uniqueness constraint; many rows may share an `id`
/// - `users.username` is the primary key, which is the only concurrency
///   guard against racing registrations
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS secrets (
    id TEXT,
    secret TEXT,
    pin TEXT
);

CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password TEXT
);
"#;

//! Database module: models, schema, and storage for the demo store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring store rows
//! - `schema.rs`: SQL DDL executed at startup
//! - `store.rs`: the storage service, including the one intentionally
//!   injectable query behind the vulnerable mode toggle

pub mod models;
pub mod schema;
pub mod store;

pub use models::{SecretRow, UserRow};
pub use schema::SQLITE_INIT;
pub use store::{SqlitePool, Storage};

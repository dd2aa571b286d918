//! Database module: models, schema and the SQLite-backed store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows, inputs and filters
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: parameterized queries over a connection pool
//! - `seed.rs`: reference data written by `init-db`

pub mod models;
pub mod schema;
pub mod seed;
pub mod sqlite;

pub use models::{Donation, Ngo, ShelfLifeEntry};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, Storage};

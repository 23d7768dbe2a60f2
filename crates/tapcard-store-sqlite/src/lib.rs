//! SQLite backend for the tapcard card registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The stored schema uses the
//! snake_case column names; [`encode`] maps rows to and from the camelCase
//! API model with no field dropped in either direction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

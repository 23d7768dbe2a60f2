//! Error type for `tapcard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An update or delete matched no stored row — the mirror and the store
  /// have diverged.
  #[error("card not found in store: {0}")]
  CardNotFound(i64),

  /// Attempted to persist a record whose id was never allocated.
  #[error("card record has no id")]
  MissingId,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

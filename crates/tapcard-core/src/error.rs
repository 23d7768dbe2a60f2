//! Error types for `tapcard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("card not found: {0}")]
  NotFound(i64),

  #[error("card not found: {0:?}")]
  CodeNotFound(String),

  /// The card exists but has been deactivated. Scan path only.
  #[error("card {0:?} is deactivated")]
  Gone(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

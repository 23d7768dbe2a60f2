//! The [`CardBackend`] trait — the durable half of the persistence adapter.
//!
//! The trait is implemented by storage backends (e.g. `tapcard-store-sqlite`).
//! The registry depends on this abstraction, not on any concrete backend;
//! in fallback mode no backend is consulted at all.

use std::future::Future;

use crate::card::CardRecord;

/// Abstraction over a durable card store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CardBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the full record set, ordered by ascending id.
  ///
  /// Doubles as the startup availability check: a failure here selects
  /// fallback mode for the rest of the process lifetime.
  fn load_all(
    &self,
  ) -> impl Future<Output = Result<Vec<CardRecord>, Self::Error>> + Send + '_;

  /// Persist a new record (id and card code already allocated) and return
  /// the stored row.
  fn insert<'a>(
    &'a self,
    card: &'a CardRecord,
  ) -> impl Future<Output = Result<CardRecord, Self::Error>> + Send + 'a;

  /// Overwrite the stored row matching `card.card_code` with `card`'s
  /// fields, id included.
  ///
  /// Keying on the immutable card code lets integrity repair retarget rows
  /// whose stored id is null.
  fn update<'a>(
    &'a self,
    card: &'a CardRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove the stored row with the given id.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

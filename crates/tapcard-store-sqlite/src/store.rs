//! [`SqliteStore`] — the SQLite implementation of [`CardBackend`].

use std::path::Path;

use tapcard_core::{backend::CardBackend, card::CardRecord};

use crate::{
  encode::{encode_dt, RawCard, CARD_COLUMNS},
  schema::SCHEMA,
  Error, Result,
};

/// A card store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read back the stored row for `id`.
  async fn fetch(&self, id: i64) -> Result<CardRecord> {
    let raw: RawCard = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
          rusqlite::params![id],
          RawCard::from_row,
        )?)
      })
      .await
      .map_err(|e| match e {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => {
          Error::CardNotFound(id)
        }
        other => Error::Database(other),
      })?;

    raw.into_card()
  }
}

impl CardBackend for SqliteStore {
  type Error = Error;

  async fn load_all(&self) -> Result<Vec<CardRecord>> {
    let raws: Vec<RawCard> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn insert(&self, card: &CardRecord) -> Result<CardRecord> {
    let id = card.id.ok_or(Error::MissingId)?;

    let first_name     = card.first_name.clone();
    let last_name      = card.last_name.clone();
    let company        = card.company.clone();
    let job_title      = card.job_title.clone();
    let email          = card.email.clone();
    let phone          = card.phone.clone();
    let website        = card.website.clone();
    let card_code      = card.card_code.clone();
    let is_active      = card.is_active;
    let created_at_str = encode_dt(card.created_at);
    let theme          = card.theme.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cards (
             id, first_name, last_name, company, job_title,
             email, phone, website, card_code, is_active, created_at, theme
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id,
            first_name,
            last_name,
            company,
            job_title,
            email,
            phone,
            website,
            card_code,
            is_active,
            created_at_str,
            theme,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.fetch(id).await
  }

  async fn update(&self, card: &CardRecord) -> Result<()> {
    let id = card.id.ok_or(Error::MissingId)?;

    let first_name     = card.first_name.clone();
    let last_name      = card.last_name.clone();
    let company        = card.company.clone();
    let job_title      = card.job_title.clone();
    let email          = card.email.clone();
    let phone          = card.phone.clone();
    let website        = card.website.clone();
    let card_code      = card.card_code.clone();
    let is_active      = card.is_active;
    let created_at_str = encode_dt(card.created_at);
    let theme          = card.theme.clone();

    // Keyed on the immutable card code so repaired ids land on rows whose
    // stored id was null.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cards SET
             id = ?1, first_name = ?2, last_name = ?3, company = ?4,
             job_title = ?5, email = ?6, phone = ?7, website = ?8,
             is_active = ?10, created_at = ?11, theme = ?12
           WHERE card_code = ?9",
          rusqlite::params![
            id,
            first_name,
            last_name,
            company,
            job_title,
            email,
            phone,
            website,
            card_code,
            is_active,
            created_at_str,
            theme,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::CardNotFound(id));
    }
    Ok(())
  }

  async fn delete(&self, id: i64) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM cards WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::CardNotFound(id));
    }
    Ok(())
  }
}

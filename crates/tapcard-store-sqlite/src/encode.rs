//! Encoding and decoding helpers between the camelCase API model and the
//! snake_case `cards` table.
//!
//! Timestamps are stored as RFC 3339 strings; `is_active` as an SQLite
//! integer. The mapping is exact and total — every field of
//! [`CardRecord`] has a column and vice versa.

use chrono::{DateTime, Utc};
use tapcard_core::card::CardRecord;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Column order used by every statement touching the full row.
pub const CARD_COLUMNS: &str = "id, first_name, last_name, company, \
   job_title, email, phone, website, card_code, is_active, created_at, theme";

/// A `cards` row as read from SQLite, before timestamp decoding.
pub struct RawCard {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  pub company:    Option<String>,
  pub job_title:  Option<String>,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub website:    Option<String>,
  pub card_code:  String,
  pub is_active:  bool,
  pub created_at: String,
  pub theme:      String,
}

impl RawCard {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawCard {
      id:         row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      company:    row.get(3)?,
      job_title:  row.get(4)?,
      email:      row.get(5)?,
      phone:      row.get(6)?,
      website:    row.get(7)?,
      card_code:  row.get(8)?,
      is_active:  row.get(9)?,
      created_at: row.get(10)?,
      theme:      row.get(11)?,
    })
  }

  pub fn into_card(self) -> Result<CardRecord> {
    Ok(CardRecord {
      id:         Some(self.id),
      first_name: self.first_name,
      last_name:  self.last_name,
      company:    self.company,
      job_title:  self.job_title,
      email:      self.email,
      phone:      self.phone,
      website:    self.website,
      card_code:  self.card_code,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      theme:      self.theme,
    })
  }
}

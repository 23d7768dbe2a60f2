//! Card record types — the unit of data managed by the registry.
//!
//! A [`CardRecord`] is the full profile behind one physical NFC card. The
//! `id` is held as `Option<i64>` so that integrity repair of records that
//! arrived without one is expressible; after the startup repair pass every
//! record visible through the registry carries `Some(id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Presentation theme applied when a card is created without one.
pub const DEFAULT_THEME: &str = "gradient-blue";

/// A single NFC business-card profile.
///
/// `id`, `card_code` and `created_at` are assigned once at creation and
/// never overwritten by caller input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
  pub id:         Option<i64>,
  pub first_name: String,
  pub last_name:  String,
  pub company:    Option<String>,
  pub job_title:  Option<String>,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub website:    Option<String>,
  pub card_code:  String,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub theme:      String,
}

/// Caller-supplied fields for a new card.
///
/// Deliberately has no slot for `id`, `card_code`, `is_active` or
/// `created_at` — those are assigned by the registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
  pub first_name: String,
  pub last_name:  String,
  #[serde(default)]
  pub company:    Option<String>,
  #[serde(default)]
  pub job_title:  Option<String>,
  #[serde(default)]
  pub email:      Option<String>,
  #[serde(default)]
  pub phone:      Option<String>,
  #[serde(default)]
  pub website:    Option<String>,
  #[serde(default)]
  pub theme:      Option<String>,
}

/// An allow-listed partial update.
///
/// Name fields and `theme` can be replaced but not cleared; the optional
/// contact fields use a double `Option` so callers can distinguish "leave
/// unchanged" (absent) from "clear" (explicit null).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name:  Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub company:    Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub job_title:  Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub email:      Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub phone:      Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub website:    Option<Option<String>>,
  #[serde(default)]
  pub is_active:  Option<bool>,
  #[serde(default)]
  pub theme:      Option<String>,
}

/// Maps an absent field to `None` and a present field (including an explicit
/// JSON `null`) to `Some(..)`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Deserialize::deserialize(de).map(Some)
}

impl CardRecord {
  /// Apply `patch` field by field, then re-assert the immutable fields.
  ///
  /// Returns a new record; the original is untouched so the caller can
  /// persist the merged copy before committing it to the mirror.
  pub fn merged(&self, patch: &CardPatch) -> CardRecord {
    let mut next = self.clone();

    if let Some(v) = &patch.first_name {
      next.first_name = v.clone();
    }
    if let Some(v) = &patch.last_name {
      next.last_name = v.clone();
    }
    if let Some(v) = &patch.company {
      next.company = v.clone();
    }
    if let Some(v) = &patch.job_title {
      next.job_title = v.clone();
    }
    if let Some(v) = &patch.email {
      next.email = v.clone();
    }
    if let Some(v) = &patch.phone {
      next.phone = v.clone();
    }
    if let Some(v) = &patch.website {
      next.website = v.clone();
    }
    if let Some(v) = patch.is_active {
      next.is_active = v;
    }
    if let Some(v) = &patch.theme {
      next.theme = v.clone();
    }

    // Immutable regardless of merge order or patch content.
    next.id = self.id;
    next.card_code = self.card_code.clone();
    next.created_at = self.created_at;
    next
  }

  /// The URL a scan or QR code should send visitors to: the card's own
  /// website when set, otherwise a constructed external profile URL.
  pub fn redirect_url(&self) -> String {
    match &self.website {
      Some(url) => url.clone(),
      None => format!(
        "https://linkedin.com/in/{}-{}",
        self.first_name.to_lowercase(),
        self.last_name.to_lowercase()
      ),
    }
  }
}

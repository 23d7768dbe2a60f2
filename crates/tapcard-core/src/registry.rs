//! [`CardRegistry`] — the single owned instance holding the authoritative
//! card set.
//!
//! The registry owns an in-process mirror of the record set behind one
//! async mutex. Every mutation runs as a single logical step under that
//! lock, including the durable-store call, so a read-modify-write such as
//! [`CardRegistry::toggle_status`] cannot lose an update to an interleaved
//! request while the store I/O is in flight.
//!
//! Persistence mode is decided exactly once, at construction:
//!
//! - **Durable** — every mutation issues the equivalent backend operation
//!   first; the mirror is updated only after the durable write succeeds, so
//!   a failed write leaves the mirror consistent with the last known-durable
//!   state.
//! - **Fallback** — no backend is held at all; operations act directly on
//!   the mirror, seeded with the built-in card set. This mode is
//!   first-class, not a degraded stub.
//!
//! There is no re-probe or failover back to durable mode mid-session.

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
  alloc,
  backend::CardBackend,
  card::{CardDraft, CardPatch, CardRecord, DEFAULT_THEME},
  integrity::{self, Issue, RepairReport},
  seed,
  Error, Result,
};

/// Which source of truth the registry writes through to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Durable,
  Fallback,
}

impl std::fmt::Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Mode::Durable => write!(f, "durable"),
      Mode::Fallback => write!(f, "fallback"),
    }
  }
}

/// The authoritative card registry. See the module docs for the
/// dual-backing model.
pub struct CardRegistry<B> {
  cards:   Mutex<Vec<CardRecord>>,
  backend: Option<B>,
}

fn storage<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Storage(Box::new(e))
}

impl<B: CardBackend> CardRegistry<B> {
  /// Probe `backend` and construct the registry in the mode the probe
  /// selects.
  ///
  /// A successful initial load enters durable mode with the fetched set as
  /// the mirror (an empty store yields an empty mirror — the seed set is
  /// for fallback only). A failed load logs the error, drops the backend
  /// and enters fallback mode on the seed set. Either way the startup
  /// integrity repair runs over the resulting mirror.
  pub async fn open(backend: B) -> Self {
    match backend.load_all().await {
      Ok(mut cards) => {
        tracing::info!(
          count = cards.len(),
          "durable store available; loaded card set"
        );
        let report = integrity::repair(&mut cards);
        if report.fixed > 0 {
          tracing::info!(
            fixed = report.fixed,
            "repaired cards with missing ids at startup"
          );
          // A failed write-through here is logged, not fatal; the next
          // repair run converges on the same ids.
          let written =
            Self::write_repaired(&backend, &cards, &report).await;
          if let Err(e) = written {
            tracing::warn!(
              error = %e,
              "failed to persist repaired ids to the durable store"
            );
          }
        }
        Self {
          cards:   Mutex::new(cards),
          backend: Some(backend),
        }
      }
      Err(e) => {
        tracing::warn!(
          error = %e,
          "durable store unreachable; falling back to seed data"
        );
        Self::finish(None, seed::seed_cards())
      }
    }
  }

  /// Construct directly in fallback mode on the built-in seed set, without
  /// probing anything.
  pub fn fallback() -> Self {
    Self::finish(None, seed::seed_cards())
  }

  /// Construct in fallback mode on an arbitrary initial set.
  pub fn fallback_with(cards: Vec<CardRecord>) -> Self {
    Self::finish(None, cards)
  }

  fn finish(backend: Option<B>, mut cards: Vec<CardRecord>) -> Self {
    let report = integrity::repair(&mut cards);
    if report.fixed > 0 {
      tracing::info!(
        fixed = report.fixed,
        "repaired cards with missing ids at startup"
      );
    }
    Self {
      cards: Mutex::new(cards),
      backend,
    }
  }

  /// Persist every record freshly repaired by [`integrity::repair`].
  ///
  /// The backend's `update` is keyed by the immutable card code, so this
  /// reaches rows whose stored id was null before the repair assigned one.
  async fn write_repaired(
    backend: &B,
    cards: &[CardRecord],
    report: &RepairReport,
  ) -> Result<()> {
    for fixed in &report.repaired {
      if let Some(card) =
        cards.iter().find(|c| c.card_code == fixed.card_code)
      {
        backend.update(card).await.map_err(storage)?;
      }
    }
    Ok(())
  }

  pub fn mode(&self) -> Mode {
    if self.backend.is_some() {
      Mode::Durable
    } else {
      Mode::Fallback
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Snapshot of the full record set, ordered by ascending id.
  pub async fn list(&self) -> Vec<CardRecord> {
    let cards = self.cards.lock().await;
    let mut snapshot = cards.clone();
    snapshot.sort_by_key(|c| c.id.unwrap_or(i64::MAX));
    snapshot
  }

  pub async fn get(&self, id: i64) -> Result<CardRecord> {
    let cards = self.cards.lock().await;
    cards
      .iter()
      .find(|c| c.id == Some(id))
      .cloned()
      .ok_or(Error::NotFound(id))
  }

  pub async fn find_by_code(&self, code: &str) -> Result<CardRecord> {
    let cards = self.cards.lock().await;
    cards
      .iter()
      .find(|c| c.card_code == code)
      .cloned()
      .ok_or_else(|| Error::CodeNotFound(code.to_string()))
  }

  /// Resolve a public scan: the card behind `code`, provided it is active.
  ///
  /// An unknown code is `CodeNotFound`; a deactivated card is `Gone` and
  /// must not be served. The caller appends the scan event only after this
  /// succeeds.
  pub async fn resolve_scan(&self, code: &str) -> Result<CardRecord> {
    let card = self.find_by_code(code).await?;
    if !card.is_active {
      return Err(Error::Gone(code.to_string()));
    }
    Ok(card)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Create a card from caller-supplied fields.
  ///
  /// Id and card code are allocated together under the lock; `is_active`
  /// is forced to `true` and `created_at` stamped here, regardless of
  /// anything the caller sent.
  pub async fn create(&self, draft: CardDraft) -> Result<CardRecord> {
    let mut cards = self.cards.lock().await;

    let id = alloc::next_id(&cards);
    let record = CardRecord {
      id:         Some(id),
      first_name: draft.first_name,
      last_name:  draft.last_name,
      company:    draft.company,
      job_title:  draft.job_title,
      email:      draft.email,
      phone:      draft.phone,
      website:    draft.website,
      card_code:  alloc::next_card_code(id),
      is_active:  true,
      created_at: Utc::now(),
      theme:      draft.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
    };

    let stored = match &self.backend {
      Some(backend) => backend.insert(&record).await.map_err(storage)?,
      None => record,
    };

    tracing::info!(id, code = %stored.card_code, "card created");
    cards.push(stored.clone());
    Ok(stored)
  }

  /// Merge `patch` into the card with `id` (allow-listed fields only; see
  /// [`CardRecord::merged`]).
  pub async fn update(&self, id: i64, patch: CardPatch) -> Result<CardRecord> {
    let mut cards = self.cards.lock().await;
    let index = cards
      .iter()
      .position(|c| c.id == Some(id))
      .ok_or(Error::NotFound(id))?;

    let merged = cards[index].merged(&patch);

    if let Some(backend) = &self.backend {
      backend.update(&merged).await.map_err(storage)?;
    }

    cards[index] = merged.clone();
    Ok(merged)
  }

  /// Flip `is_active`. The read and the write happen under the same lock
  /// hold, so two concurrent toggles on one card serialize instead of
  /// cancelling out.
  pub async fn toggle_status(&self, id: i64) -> Result<CardRecord> {
    let mut cards = self.cards.lock().await;
    let index = cards
      .iter()
      .position(|c| c.id == Some(id))
      .ok_or(Error::NotFound(id))?;

    let mut toggled = cards[index].clone();
    toggled.is_active = !toggled.is_active;

    if let Some(backend) = &self.backend {
      backend.update(&toggled).await.map_err(storage)?;
    }

    tracing::info!(id, active = toggled.is_active, "card status toggled");
    cards[index] = toggled.clone();
    Ok(toggled)
  }

  /// Remove the card with `id` and return the removed record.
  pub async fn delete(&self, id: i64) -> Result<CardRecord> {
    let mut cards = self.cards.lock().await;
    let index = cards
      .iter()
      .position(|c| c.id == Some(id))
      .ok_or(Error::NotFound(id))?;

    if let Some(backend) = &self.backend {
      backend.delete(id).await.map_err(storage)?;
    }

    tracing::info!(id, "card deleted");
    Ok(cards.remove(index))
  }

  // ── Integrity ─────────────────────────────────────────────────────────────

  /// Detect integrity issues in the current mirror.
  pub async fn validate(&self) -> Vec<Issue> {
    let cards = self.cards.lock().await;
    integrity::validate(&cards)
  }

  /// Assign fresh ids to records missing one, writing each repaired record
  /// through the backend in durable mode. Duplicate ids and card codes are
  /// out of repair scope and stay visible through [`Self::validate`].
  ///
  /// The repair runs on a scratch copy that replaces the mirror only after
  /// every durable write succeeded, so a storage failure leaves the mirror
  /// unchanged.
  pub async fn repair(&self) -> Result<RepairReport> {
    let mut cards = self.cards.lock().await;

    let mut repaired_set = cards.clone();
    let report = integrity::repair(&mut repaired_set);
    if report.fixed > 0 {
      if let Some(backend) = &self.backend {
        Self::write_repaired(backend, &repaired_set, &report).await?;
      }
      *cards = repaired_set;
      tracing::info!(fixed = report.fixed, "repaired cards with missing ids");
    }
    Ok(report)
  }
}

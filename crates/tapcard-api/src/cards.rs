//! Handlers for the administrative `/api/cards` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/cards` | Full list + total |
//! | `POST`   | `/api/cards` | Create from a partial draft |
//! | `GET`    | `/api/cards/{id}` | 404 if not found |
//! | `PUT`    | `/api/cards/{id}` | Allow-listed merge |
//! | `DELETE` | `/api/cards/{id}` | Returns the removed card |
//! | `PATCH`  | `/api/cards/{id}/toggle-status` | Flip activation |
//! | `GET`    | `/api/cards/{id}/qr-code` | QR target URL (no image) |
//! | `GET`    | `/api/cards/{id}/scans` | Scan analytics |
//! | `GET`    | `/api/cards/validate` | Integrity issues |
//! | `POST`   | `/api/cards/fix-null-ids` | Repair missing ids |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::{Value, json};
use tapcard_core::{
  backend::CardBackend,
  card::{CardDraft, CardPatch},
  registry::Mode,
};

use crate::{AppState, error::ApiError};

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /api/cards`
pub async fn list<B>(State(state): State<AppState<B>>) -> Json<Value>
where
  B: CardBackend + 'static,
{
  let cards = state.registry.list().await;
  Json(json!({
    "success": true,
    "data": { "cards": cards, "total": cards.len() },
  }))
}

/// `GET /api/cards/{id}`
pub async fn get_one<B>(
  State(state): State<AppState<B>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.get(id).await?;
  Ok(Json(json!({ "success": true, "data": { "card": card } })))
}

// ─── Create / update / delete ────────────────────────────────────────────────

/// `POST /api/cards`
pub async fn create<B>(
  State(state): State<AppState<B>>,
  Json(draft): Json<CardDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.create(draft).await?;
  let message = match state.registry.mode() {
    Mode::Durable => "Card created and saved",
    Mode::Fallback => "Card created (memory mode)",
  };
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "data": { "card": card },
      "message": message,
    })),
  ))
}

/// `PUT /api/cards/{id}`
pub async fn update_one<B>(
  State(state): State<AppState<B>>,
  Path(id): Path<i64>,
  Json(patch): Json<CardPatch>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.update(id, patch).await?;
  Ok(Json(json!({
    "success": true,
    "data": { "card": card },
    "message": "Card updated",
  })))
}

/// `DELETE /api/cards/{id}`
pub async fn delete_one<B>(
  State(state): State<AppState<B>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.delete(id).await?;
  Ok(Json(json!({
    "success": true,
    "data": { "card": card },
    "message": "Card deleted",
  })))
}

/// `PATCH /api/cards/{id}/toggle-status`
pub async fn toggle<B>(
  State(state): State<AppState<B>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.toggle_status(id).await?;
  let message = if card.is_active {
    "Card activated"
  } else {
    "Card deactivated"
  };
  Ok(Json(json!({
    "success": true,
    "data": { "card": card },
    "message": message,
  })))
}

// ─── QR target ───────────────────────────────────────────────────────────────

/// `GET /api/cards/{id}/qr-code`
///
/// Returns the URL a QR code for this card should encode: the card's
/// website, else the public scan page. Image rendering is the client's
/// concern.
pub async fn qr_code<B>(
  State(state): State<AppState<B>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.get(id).await?;
  let url = match &card.website {
    Some(website) => website.clone(),
    None => format!(
      "{}/scan/{}",
      state.config.public_base_url, card.card_code
    ),
  };
  Ok(Json(json!({
    "success": true,
    "data": { "url": url, "cardCode": card.card_code },
  })))
}

// ─── Analytics ───────────────────────────────────────────────────────────────

/// `GET /api/cards/{id}/scans`
///
/// Served for any id the registry currently holds *or* the scan log has
/// ever seen — events outlive their card, so analytics for a deleted card
/// must keep working.
pub async fn analytics<B>(
  State(state): State<AppState<B>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  if state.registry.get(id).await.is_err() && !state.scans.has_seen(id) {
    return Err(ApiError::NotFound(format!("card {id} not found")));
  }

  let summary = state.scans.analytics(id);
  Ok(Json(json!({ "success": true, "data": summary })))
}

// ─── Integrity ───────────────────────────────────────────────────────────────

/// `GET /api/cards/validate`
pub async fn validate<B>(State(state): State<AppState<B>>) -> Json<Value>
where
  B: CardBackend + 'static,
{
  let issues = state.registry.validate().await;
  let message = if issues.is_empty() {
    "All cards are valid".to_string()
  } else {
    format!("{} issue(s) detected", issues.len())
  };
  Json(json!({
    "success": true,
    "isValid": issues.is_empty(),
    "issues": issues,
    "message": message,
  }))
}

/// `POST /api/cards/fix-null-ids`
pub async fn fix_null_ids<B>(
  State(state): State<AppState<B>>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let report = state.registry.repair().await?;
  let message = if report.fixed == 0 {
    "No cards to repair".to_string()
  } else {
    format!("{} card(s) repaired", report.fixed)
  };
  Ok(Json(json!({
    "success": true,
    "fixed": report.fixed,
    "repairedCards": report.repaired,
    "message": message,
  })))
}

//! The public scan-resolution endpoint.
//!
//! `GET /scan/{cardCode}` is what an NFC tap or QR scan hits. It is the
//! only producer of scan events: an event is appended strictly after the
//! registry confirms the card exists and is active, so 404 and 410
//! responses leave the log untouched.

use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
};
use serde_json::{Value, json};
use tapcard_core::{backend::CardBackend, scan::ScanContext};

use crate::{AppState, error::ApiError};

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string)
}

/// Request context as captured from the headers. The client IP comes from
/// `X-Forwarded-For` (first hop) since the service is expected to sit
/// behind a proxy.
fn context_from(headers: &HeaderMap) -> ScanContext {
  let ip = header_str(headers, "x-forwarded-for")
    .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
    .unwrap_or_else(|| "unknown".to_string());

  ScanContext {
    user_agent: header_str(headers, "user-agent")
      .unwrap_or_else(|| "Unknown".to_string()),
    ip,
    referer: header_str(headers, "referer"),
  }
}

/// `GET /scan/{cardCode}`
///
/// 404 for an unknown code, 410 Gone for a deactivated card; otherwise
/// appends a [`tapcard_core::scan::ScanEvent`] and returns the full card
/// plus the chosen redirect target for the landing page to render.
pub async fn resolve<B>(
  State(state): State<AppState<B>>,
  Path(card_code): Path<String>,
  headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  let card = state.registry.resolve_scan(&card_code).await?;

  let context = context_from(&headers);
  let event = state.scans.record(
    &card.card_code,
    card.id.unwrap_or_default(),
    context,
  );
  tracing::info!(code = %card.card_code, ip = %event.ip, "card scanned");

  let redirect_url = card.redirect_url();
  Ok(Json(json!({
    "success": true,
    "data": {
      "card": card,
      "redirectUrl": redirect_url,
      "scan": event,
    },
  })))
}

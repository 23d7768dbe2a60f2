//! JSON REST layer for the tapcard registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tapcard_core::backend::CardBackend`]: the administrative CRUD and
//! integrity endpoints under `/api`, and the public scan-resolution
//! endpoint under `/scan`. TLS and transport concerns are the caller's
//! responsibility.

pub mod auth;
pub mod cards;
pub mod error;
pub mod scan;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Json,
  Router,
  extract::State,
  routing::{get, patch, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tapcard_core::{backend::CardBackend, registry::CardRegistry, scan::ScanLog};
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      std::path::PathBuf,
  /// Base URL for generated scan links in QR targets.
  pub public_base_url: String,
  pub admin_email:     String,
  pub admin_password:  String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<B> {
  pub registry: Arc<CardRegistry<B>>,
  pub scans:    Arc<ScanLog>,
  pub config:   Arc<ServerConfig>,
}

// Manual impl: `B` itself need not be `Clone` behind the `Arc`s.
impl<B> Clone for AppState<B> {
  fn clone(&self) -> Self {
    Self {
      registry: self.registry.clone(),
      scans:    self.scans.clone(),
      config:   self.config.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router for `state`.
pub fn router<B>(state: AppState<B>) -> Router
where
  B: CardBackend + 'static,
{
  Router::new()
    .route("/api/health", get(health::<B>))
    .route("/api/auth/login", post(auth::login::<B>))
    .route("/api/cards", get(cards::list::<B>).post(cards::create::<B>))
    .route("/api/cards/validate", get(cards::validate::<B>))
    .route("/api/cards/fix-null-ids", post(cards::fix_null_ids::<B>))
    .route(
      "/api/cards/{id}",
      get(cards::get_one::<B>)
        .put(cards::update_one::<B>)
        .delete(cards::delete_one::<B>),
    )
    .route("/api/cards/{id}/toggle-status", patch(cards::toggle::<B>))
    .route("/api/cards/{id}/qr-code", get(cards::qr_code::<B>))
    .route("/api/cards/{id}/scans", get(cards::analytics::<B>))
    .route("/scan/{card_code}", get(scan::resolve::<B>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /api/health`
async fn health<B>(State(state): State<AppState<B>>) -> Json<Value>
where
  B: CardBackend + 'static,
{
  Json(json!({
    "success": true,
    "message": "tapcard API",
    "version": env!("CARGO_PKG_VERSION"),
    "mode": state.registry.mode().to_string(),
    "features": ["auth", "cards-crud", "qr-codes", "toggle-status", "scan-analytics"],
    "timestamp": Utc::now().to_rfc3339(),
  }))
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tapcard_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn test_config() -> ServerConfig {
    ServerConfig {
      host:            "127.0.0.1".to_string(),
      port:            5001,
      store_path:      std::path::PathBuf::from(":memory:"),
      public_base_url: "https://cards.example.com".to_string(),
      admin_email:     "admin@tapcard.dev".to_string(),
      admin_password:  "hunter2".to_string(),
    }
  }

  /// Fallback-mode state on the seed set.
  fn fallback_state() -> AppState<SqliteStore> {
    AppState {
      registry: Arc::new(CardRegistry::fallback()),
      scans:    Arc::new(ScanLog::new()),
      config:   Arc::new(test_config()),
    }
  }

  /// Durable-mode state on an empty in-memory SQLite store.
  async fn durable_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      registry: Arc::new(CardRegistry::open(store).await),
      scans:    Arc::new(ScanLog::new()),
      config:   Arc::new(test_config()),
    }
  }

  async fn request(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json: Value =
      serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  // ── Health ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_mode() {
    let (status, body) =
      request(fallback_state(), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "fallback");

    let (_, body) =
      request(durable_state().await, "GET", "/api/health", None).await;
    assert_eq!(body["mode"], "durable");
  }

  // ── Cards CRUD ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_returns_seed_cards_with_total() {
    let (status, body) =
      request(fallback_state(), "GET", "/api/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 8);
    assert_eq!(body["data"]["cards"][0]["cardCode"], "NFC001");
  }

  #[tokio::test]
  async fn get_unknown_card_is_404_envelope() {
    let (status, body) =
      request(fallback_state(), "GET", "/api/cards/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn create_on_seed_set_allocates_ninth_id() {
    let state = fallback_state();
    let (status, body) = request(
      state.clone(),
      "POST",
      "/api/cards",
      Some(json!({ "firstName": "Ann", "lastName": "Lee" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["card"]["id"], 9);
    assert_eq!(body["data"]["card"]["cardCode"], "NFC009");
    assert_eq!(body["data"]["card"]["isActive"], true);
    assert_eq!(body["data"]["card"]["theme"], "gradient-blue");

    let (_, body) = request(state, "GET", "/api/cards", None).await;
    assert_eq!(body["data"]["total"], 9);
  }

  #[tokio::test]
  async fn create_in_empty_durable_store_allocates_first_id() {
    let state = durable_state().await;
    let (status, body) = request(
      state,
      "POST",
      "/api/cards",
      Some(json!({ "firstName": "Ann", "lastName": "Lee" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["card"]["id"], 1);
    assert_eq!(body["data"]["card"]["cardCode"], "NFC001");
    assert_eq!(body["message"], "Card created and saved");
  }

  #[tokio::test]
  async fn update_preserves_id_code_and_created_at() {
    let state = fallback_state();
    let (_, before) = request(state.clone(), "GET", "/api/cards/1", None).await;

    let (status, body) = request(
      state,
      "PUT",
      "/api/cards/1",
      Some(json!({
        "id": 777,
        "cardCode": "NFC777",
        "jobTitle": "Staff Engineer",
        "website": null
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let card = &body["data"]["card"];
    assert_eq!(card["id"], 1);
    assert_eq!(card["cardCode"], "NFC001");
    assert_eq!(card["createdAt"], before["data"]["card"]["createdAt"]);
    assert_eq!(card["jobTitle"], "Staff Engineer");
    assert_eq!(card["website"], Value::Null);
  }

  #[tokio::test]
  async fn toggle_flips_and_reports_direction() {
    let state = fallback_state();
    let (_, body) = request(
      state.clone(),
      "PATCH",
      "/api/cards/1/toggle-status",
      None,
    )
    .await;
    assert_eq!(body["data"]["card"]["isActive"], false);
    assert_eq!(body["message"], "Card deactivated");

    let (_, body) =
      request(state, "PATCH", "/api/cards/1/toggle-status", None).await;
    assert_eq!(body["data"]["card"]["isActive"], true);
    assert_eq!(body["message"], "Card activated");
  }

  #[tokio::test]
  async fn delete_returns_removed_card() {
    let state = fallback_state();
    let (status, body) =
      request(state.clone(), "DELETE", "/api/cards/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["card"]["cardCode"], "NFC003");

    let (status, _) = request(state, "GET", "/api/cards/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── QR target ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn qr_code_prefers_website_then_scan_page() {
    let state = fallback_state();
    let (_, body) =
      request(state.clone(), "GET", "/api/cards/1/qr-code", None).await;
    assert_eq!(body["data"]["url"], "https://johndoe.dev");

    request(
      state.clone(),
      "PUT",
      "/api/cards/1",
      Some(json!({ "website": null })),
    )
    .await;
    let (_, body) = request(state, "GET", "/api/cards/1/qr-code", None).await;
    assert_eq!(body["data"]["url"], "https://cards.example.com/scan/NFC001");
  }

  // ── Integrity ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn validate_and_repair_on_clean_set() {
    let state = fallback_state();
    let (_, body) =
      request(state.clone(), "GET", "/api/cards/validate", None).await;
    assert_eq!(body["isValid"], true);
    assert_eq!(body["issues"], json!([]));

    let (_, body) =
      request(state, "POST", "/api/cards/fix-null-ids", None).await;
    assert_eq!(body["fixed"], 0);
    assert_eq!(body["message"], "No cards to repair");
  }

  // ── Scan path ──────────────────────────────────────────────────────────────

  async fn scan(
    state: AppState<SqliteStore>,
    code: &str,
    ip: &str,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("GET")
      .uri(format!("/scan/{code}"))
      .header("x-forwarded-for", ip)
      .header(header::USER_AGENT, "test-agent")
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  #[tokio::test]
  async fn scan_unknown_code_is_404_and_records_nothing() {
    let state = fallback_state();
    let (status, _) = scan(state.clone(), "NFC999", "10.0.0.1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.scans.is_empty());
  }

  #[tokio::test]
  async fn scan_inactive_card_is_gone_and_records_nothing() {
    let state = fallback_state();
    // Seed card 4 ships deactivated.
    let (status, body) = scan(state.clone(), "NFC004", "10.0.0.1").await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["success"], false);
    assert!(state.scans.is_empty());
  }

  #[tokio::test]
  async fn scan_active_card_records_event_and_returns_redirect() {
    let state = fallback_state();
    let (status, body) = scan(state.clone(), "NFC001", "10.0.0.1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["redirectUrl"], "https://johndoe.dev");
    assert_eq!(body["data"]["scan"]["ip"], "10.0.0.1");
    assert_eq!(state.scans.len(), 1);
  }

  #[tokio::test]
  async fn two_scans_same_ip_yield_expected_analytics() {
    let state = fallback_state();
    scan(state.clone(), "NFC001", "10.0.0.1").await;
    scan(state.clone(), "NFC001", "10.0.0.1").await;

    let (status, body) =
      request(state, "GET", "/api/cards/1/scans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalScans"], 2);
    assert_eq!(body["data"]["uniqueVisitors"], 1);
    assert_eq!(body["data"]["avgScansPerVisitor"], 2.0);
  }

  #[tokio::test]
  async fn analytics_survive_card_deletion() {
    let state = fallback_state();
    scan(state.clone(), "NFC001", "10.0.0.1").await;
    request(state.clone(), "DELETE", "/api/cards/1", None).await;

    let (status, body) =
      request(state, "GET", "/api/cards/1/scans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalScans"], 1);
  }

  #[tokio::test]
  async fn analytics_for_never_seen_card_is_404() {
    let (status, _) =
      request(fallback_state(), "GET", "/api/cards/999/scans", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn analytics_for_unscanned_existing_card_is_zeroed() {
    let (status, body) =
      request(fallback_state(), "GET", "/api/cards/2/scans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalScans"], 0);
    assert_eq!(body["data"]["firstScan"], Value::Null);
  }

  // ── Auth ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_with_configured_credentials_returns_token() {
    let (status, body) = request(
      fallback_state(),
      "POST",
      "/api/auth/login",
      Some(json!({ "email": "admin@tapcard.dev", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
      body["data"]["token"]
        .as_str()
        .unwrap()
        .starts_with("dev-token-")
    );
  }

  #[tokio::test]
  async fn login_with_wrong_password_is_401() {
    let (status, body) = request(
      fallback_state(),
      "POST",
      "/api/auth/login",
      Some(json!({ "email": "admin@tapcard.dev", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
  }
}

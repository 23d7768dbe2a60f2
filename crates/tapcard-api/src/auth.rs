//! Static-credential admin login.
//!
//! A single email/password pair from the server config gates the admin UI.
//! The returned token is opaque and never checked again — there is no
//! session system behind it.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tapcard_core::backend::CardBackend;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /api/auth/login`
pub async fn login<B>(
  State(state): State<AppState<B>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError>
where
  B: CardBackend + 'static,
{
  if body.email != state.config.admin_email
    || body.password != state.config.admin_password
  {
    return Err(ApiError::Unauthorized);
  }

  Ok(Json(json!({
    "success": true,
    "data": {
      "token": format!("dev-token-{}", Utc::now().timestamp_millis()),
      "user": {
        "id": 1,
        "email": body.email,
        "role": "admin",
        "firstName": "Admin",
        "lastName": "Tapcard",
      },
    },
  })))
}

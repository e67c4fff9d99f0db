//! External SSE gateway callbacks
//!
//! The gateway reports each client connect and disconnect here. A connect
//! registers the token under the client's `request_id`, binds an identity and
//! triggers replay of the current tab statuses.

use crate::{AppState, api::error::ApiError, api::error::Result as ApiResult};

use dh_auth::{JwtValidator, extract_access_token};
use dh_sse::{ConnectionRegistry, LOCAL_USER_SUBJECT};

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use log::{info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Query parameter carrying the client's logical identity
pub const REQUEST_ID_PARAM: &str = "request_id";

/// Base used to resolve the relative URLs the gateway forwards
const FORWARDED_URL_BASE: &str = "http://gateway.invalid/";

/// The client request as seen by the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardedRequest {
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CallbackRequest {
    Connect {
        token: String,
        request: ForwardedRequest,
    },
    Disconnect {
        token: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        request: Option<ForwardedRequest>,
    },
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub status: &'static str,
}

/// POST /api/sse/callback
pub async fn gateway_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> ApiResult<Json<CallbackResponse>> {
    let Some(registry) = state.registry.as_ref() else {
        return Err(ApiError::not_found("Gateway transport is not enabled"));
    };

    check_secret(
        state.settings.production,
        state.settings.callback_secret.as_deref(),
        query.secret.as_deref(),
    )?;

    let Json(callback) =
        payload.map_err(|e| ApiError::bad_request(format!("Malformed callback: {}", e.body_text())))?;

    match callback {
        CallbackRequest::Connect { token, request } => {
            let request_id = request_id_from_url(&request.url)?;
            registry.on_connect(&request_id, &token, &request.url).await;
            bind_identity(registry, &state, &request_id, &request);
        }
        CallbackRequest::Disconnect { token, reason, .. } => {
            info!(
                "Gateway disconnect token={token} reason={}",
                reason.as_deref().unwrap_or("unspecified")
            );
            registry.on_disconnect(&token);
        }
    }

    Ok(Json(CallbackResponse { status: "ok" }))
}

/// Callbacks are only authenticated in production.
pub fn check_secret(
    production: bool,
    configured: Option<&str>,
    supplied: Option<&str>,
) -> ApiResult<()> {
    if !production {
        return Ok(());
    }

    match (configured, supplied) {
        (Some(expected), Some(actual)) if expected == actual => Ok(()),
        (None, _) => Err(ApiError::unauthorized("Callback secret is not configured")),
        _ => Err(ApiError::unauthorized("Invalid callback secret")),
    }
}

/// Pull `request_id` out of the forwarded client URL.
///
/// The id must be present, non-empty and free of `:`.
pub fn request_id_from_url(url: &str) -> ApiResult<String> {
    let base = Url::parse(FORWARDED_URL_BASE)
        .map_err(|e| ApiError::internal(format!("Invalid forwarded URL base: {e}")))?;
    let parsed = base
        .join(url)
        .map_err(|e| ApiError::bad_request(format!("Invalid request url '{url}': {e}")))?;

    let request_id = parsed
        .query_pairs()
        .find(|(key, _)| key == REQUEST_ID_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing {REQUEST_ID_PARAM} in request url")))?;

    if request_id.contains(':') {
        return Err(ApiError::bad_request(format!(
            "{REQUEST_ID_PARAM} must not contain ':'"
        )));
    }

    Ok(request_id)
}

/// Resolve the subject for a new connection; `None` leaves it unbound.
pub fn resolve_subject(
    auth_enabled: bool,
    validator: Option<&JwtValidator>,
    cookie_name: &str,
    request: &ForwardedRequest,
) -> Option<String> {
    if !auth_enabled {
        return Some(LOCAL_USER_SUBJECT.to_string());
    }

    let Some(validator) = validator else {
        warn!("Auth enabled without a JWT validator; connection left unbound");
        return None;
    };

    let headers = request
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()));

    let token = match extract_access_token(headers, cookie_name) {
        Ok(token) => token,
        Err(e) => {
            warn!("No usable access token on gateway connect: {e}");
            return None;
        }
    };

    match validator.validate(&token) {
        Ok(claims) => Some(claims.sub),
        Err(e) => {
            warn!("Access token rejected on gateway connect ({}): {e}", e.error_code());
            None
        }
    }
}

fn bind_identity(
    registry: &ConnectionRegistry,
    state: &AppState,
    request_id: &str,
    request: &ForwardedRequest,
) {
    let subject = resolve_subject(
        state.settings.auth_enabled,
        state.jwt_validator.as_deref(),
        &state.settings.cookie_name,
        request,
    );

    if let Some(subject) = subject {
        registry.bind_identity(request_id, &subject);
    }
}

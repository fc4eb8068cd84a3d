// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth sign-in and logout routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{removal_cookie, session_cookie, SESSION_COOKIE, SESSION_TTL_DAYS};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth state stays acceptable.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/logout", post(logout))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Local path to land on after sign-in. Defaults to `/`.
    #[serde(default)]
    return_to: Option<String>,
}

/// Start OAuth flow - redirect to Google consent.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
) -> Result<Redirect> {
    let return_to = params
        .return_to
        .filter(|p| is_local_path(p))
        .unwrap_or_else(|| "/".to_string());

    let oauth_state = sign_state(&return_to, now_millis()?, &state.config.auth_secret)?;
    let auth_url = state.google.authorize_url(&oauth_state);

    tracing::info!(return_to = %return_to, "Starting OAuth flow, redirecting to Google");
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, link the account, start a session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let now_ms = now_millis()?;
    let return_to = verify_and_decode_state(&params.state, &state.config.auth_secret, now_ms)
        .ok_or_else(|| {
            tracing::warn!("Invalid, expired or tampered OAuth state parameter");
            AppError::BadRequest("Invalid OAuth state".to_string())
        })?;

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Ok((jar, Redirect::to("/")));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let tokens = state.google.exchange_code(&code).await?;
    let profile = state.google.fetch_profile(tokens).await?;

    let user_id = state.identity.upsert_google_user(&profile).await?;

    let token = new_session_token()?;
    let expires = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state.identity.create_session(user_id, &token, expires).await?;

    tracing::info!(user_id, "Sign-in successful, session created");

    let jar = jar.add(session_cookie(token, !state.config.is_local()));
    Ok((jar, Redirect::to(&return_to)))
}

/// Logout - delete the session row and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        if let Err(e) = state.identity.delete_session(&token).await {
            tracing::warn!(error = %e, "Failed to delete session on logout");
        }
    }

    let jar = jar.add(removal_cookie(!state.config.is_local()));
    (jar, Redirect::to("/"))
}

/// Fresh opaque session token: 32 random bytes, hex encoded.
fn new_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Secure random generation failed")))?;
    Ok(hex::encode(bytes))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Only same-origin paths; `//host` would leave the site.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

fn state_signature(payload: &str, secret: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Sign `return_to|timestamp_hex` and base64 encode it for the URL.
fn sign_state(return_to: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", return_to, timestamp_ms);
    let signature = state_signature(&payload, secret)?;
    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify HMAC signature and age, and decode the return path from the OAuth state.
fn verify_and_decode_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "return_to|timestamp_hex|signature_hex"; the path may contain '|'.
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let return_to = parts.next()?;

    let payload = format!("{}|{}", return_to, timestamp_hex);
    let expected = state_signature(&payload, secret).ok()?;

    if !bool::from(signature_hex.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_ms = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_ms) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    is_local_path(return_to).then(|| return_to.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"secret_key";
    const ISSUED: u128 = 1_700_000_000_000;

    #[test]
    fn test_verify_and_decode_state_success() {
        let state = sign_state("/cadastrar-corrida", ISSUED, SECRET).unwrap();
        let result = verify_and_decode_state(&state, SECRET, ISSUED + 1000);
        assert_eq!(result, Some("/cadastrar-corrida".to_string()));
    }

    #[test]
    fn test_verify_and_decode_state_invalid_signature() {
        let payload = format!("/|{:x}", ISSUED);
        let encoded_state = URL_SAFE_NO_PAD.encode(format!("{}|invalid_signature", payload));

        let result = verify_and_decode_state(&encoded_state, SECRET, ISSUED);
        assert_eq!(result, None);
    }

    #[test]
    fn test_verify_and_decode_state_wrong_secret() {
        let state = sign_state("/", ISSUED, SECRET).unwrap();
        let result = verify_and_decode_state(&state, b"wrong_key", ISSUED);
        assert_eq!(result, None);
    }

    #[test]
    fn test_verify_and_decode_state_expired() {
        let state = sign_state("/", ISSUED, SECRET).unwrap();
        let result = verify_and_decode_state(&state, SECRET, ISSUED + STATE_MAX_AGE_MS + 1);
        assert_eq!(result, None);
    }

    #[test]
    fn test_verify_and_decode_state_malformed() {
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid");
        assert_eq!(verify_and_decode_state(&encoded_state, SECRET, ISSUED), None);
        assert_eq!(verify_and_decode_state("%%%", SECRET, ISSUED), None);
    }

    #[test]
    fn test_external_return_path_rejected() {
        assert!(is_local_path("/"));
        assert!(is_local_path("/cadastrar-corrida"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));

        let state = sign_state("//evil.example", ISSUED, SECRET).unwrap();
        assert_eq!(verify_and_decode_state(&state, SECRET, ISSUED), None);
    }

    #[test]
    fn test_session_tokens_are_random() {
        let a = new_session_token().unwrap();
        let b = new_session_token().unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}

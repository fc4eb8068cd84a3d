// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie authentication.
//!
//! The `kart_session` cookie holds an opaque token; the identity store maps
//! it to a user while the session row is unexpired.

use crate::error::AppError;
use crate::models::SessionUser;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "kart_session";

/// Lifetime of a session, both the cookie and the stored row.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Session token from the request cookies, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

async fn resolve_session(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Option<SessionUser>, AppError> {
    match session_token(headers) {
        Some(token) => state.identity.find_session(&token).await,
        None => Ok(None),
    }
}

/// The signed-in user, or `None`. Never rejects for a missing session;
/// pages use it to decide between content and the sign-in gate.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionUser>);

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(resolve_session(&parts.headers, state).await?))
    }
}

/// Middleware that requires a valid session.
///
/// Rejects with 401 before the handler runs; on success the [`SessionUser`]
/// is available to handlers as an `Extension`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_session(request.headers(), &state)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!(user_id = user.user_id, "Session authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Cookie carrying a new session token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .secure(secure)
        .build()
}

/// Cookie that clears the session, with the same attributes it was set with.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .secure(secure)
        .build()
}

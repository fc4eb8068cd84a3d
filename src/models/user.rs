// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity models: users, sessions and the provider profile used at sign-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User row from the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: Option<DateTime<Utc>>,
    /// Profile picture URL
    pub image: Option<String>,
}

/// The signed-in user behind a valid session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionUser {
    pub user_id: i32,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Profile returned by Google's userinfo endpoint, plus the tokens that came with it.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account ID
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(skip)]
    pub tokens: ProviderTokens,
}

/// OAuth tokens stored on the linked account row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

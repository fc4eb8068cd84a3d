// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers and services see storage only through [`RaceStore`] and
//! [`IdentityStore`]. [`PgStore`] backs both with PostgreSQL;
//! [`MemoryStore`] keeps everything in process for tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::models::{GoogleProfile, NewRace, Race, SessionUser};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Provider name stored on linked accounts.
pub const GOOGLE_PROVIDER: &str = "google";

/// Race persistence.
#[async_trait]
pub trait RaceStore: Send + Sync {
    /// Insert a validated race and return the stored row.
    async fn insert_race(&self, race: &NewRace) -> Result<Race, AppError>;

    /// All races, most recent race date first.
    async fn list_races(&self) -> Result<Vec<Race>, AppError>;
}

/// Users, linked provider accounts and sessions.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create or refresh the user and linked account for a provider profile.
    /// Returns the user ID.
    async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<i32, AppError>;

    /// Store a new session token for a user.
    async fn create_session(
        &self,
        user_id: i32,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Resolve a session token to its user, if the session exists and has not expired.
    async fn find_session(&self, token: &str) -> Result<Option<SessionUser>, AppError>;

    /// Remove a session. Unknown tokens are ignored.
    async fn delete_session(&self, token: &str) -> Result<(), AppError>;
}

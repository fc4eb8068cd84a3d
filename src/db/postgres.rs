// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL store built on a shared `sqlx` pool.
//!
//! Provides typed operations for:
//! - Races (insert, list by date)
//! - Users and linked Google accounts
//! - Sessions (create, resolve, delete)

use crate::db::{IdentityStore, RaceStore, GOOGLE_PROVIDER};
use crate::error::AppError;
use crate::models::{GoogleProfile, NewRace, Race, SessionUser};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const RACE_COLUMNS: &str = "id, name, location, race_date, race_time, pix_key, \
     price_per_person, max_participants, notification_emails, created_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        let store = Self::new(pool);
        store.run_migrations().await?;

        tracing::info!("Connected to PostgreSQL");
        Ok(store)
    }

    /// Wrap an existing pool without running migrations.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations in `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations complete");
        Ok(())
    }
}

#[async_trait]
impl RaceStore for PgStore {
    async fn insert_race(&self, race: &NewRace) -> Result<Race, AppError> {
        let sql = format!(
            r#"
            INSERT INTO races (
                name, location, race_date, race_time, pix_key,
                price_per_person, max_participants, notification_emails
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RACE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Race>(&sql)
            .bind(&race.name)
            .bind(&race.location)
            .bind(race.race_date)
            .bind(race.race_time)
            .bind(&race.pix_key)
            .bind(race.price_per_person)
            .bind(race.max_participants)
            .bind(Json(&race.notification_emails))
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_races(&self) -> Result<Vec<Race>, AppError> {
        let sql = format!(
            "SELECT {RACE_COLUMNS} FROM races ORDER BY race_date DESC, race_time DESC, id DESC"
        );

        let races = sqlx::query_as::<_, Race>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(races)
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let email_verified = profile.email_verified.then(Utc::now);
        let user_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, email, email_verified, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
                SET name = EXCLUDED.name,
                    image = EXCLUDED.image,
                    email_verified = COALESCE(users.email_verified, EXCLUDED.email_verified)
            RETURNING id
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(email_verified)
        .bind(&profile.picture)
        .fetch_one(&mut *tx)
        .await?;

        let tokens = &profile.tokens;
        let expires_at = tokens
            .expires_in
            .map(|secs| Utc::now().timestamp() + secs);

        sqlx::query(
            r#"
            INSERT INTO accounts (
                user_id, type, provider, provider_account_id,
                refresh_token, access_token, expires_at, token_type, scope, id_token
            )
            VALUES ($1, 'oidc', $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (provider, provider_account_id) DO UPDATE
                SET user_id = EXCLUDED.user_id,
                    refresh_token = COALESCE(EXCLUDED.refresh_token, accounts.refresh_token),
                    access_token = EXCLUDED.access_token,
                    expires_at = EXCLUDED.expires_at,
                    token_type = EXCLUDED.token_type,
                    scope = EXCLUDED.scope,
                    id_token = EXCLUDED.id_token
            "#,
        )
        .bind(user_id)
        .bind(GOOGLE_PROVIDER)
        .bind(&profile.sub)
        .bind(&tokens.refresh_token)
        .bind(&tokens.access_token)
        .bind(expires_at)
        .bind(&tokens.token_type)
        .bind(&tokens.scope)
        .bind(&tokens.id_token)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user_id)
    }

    async fn create_session(
        &self,
        user_id: i32,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (user_id, expires, session_token) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(expires)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<SessionUser>, AppError> {
        let user = sqlx::query_as::<_, SessionUser>(
            r#"
            SELECT u.id AS user_id, u.name, u.image
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_token = $1 AND s.expires > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. For local development a `.env` file
//! in the working directory is honored.

use chrono_tz::Tz;
use std::env;

/// Sender used for race notifications unless `EMAIL_FROM` overrides it.
pub const DEFAULT_EMAIL_FROM: &str = "Copa Big Churras de Kart <noreply@copabigchurrasdekart.com>";

/// Time zone race dates and times are entered in.
pub const DEFAULT_RACE_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Public base URL of this app, used for OAuth redirects and cookie flags
    pub app_url: String,
    /// Server port
    pub port: u16,
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// From header for outgoing notification emails
    pub email_from: String,
    /// Zone used to interpret submitted race dates and to render them
    pub race_timezone: Tz,

    // --- Secrets ---
    /// PostgreSQL connection string
    pub database_url: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Resend API key
    pub resend_api_key: String,
    /// HMAC key for signing the OAuth state parameter (raw bytes)
    pub auth_secret: Vec<u8>,
}

impl Config {
    /// Config for tests only. Never reaches a real database or provider.
    pub fn test_default() -> Self {
        Self {
            app_url: "http://localhost:3000".to_string(),
            port: 3000,
            google_client_id: "test_client_id".to_string(),
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            race_timezone: DEFAULT_RACE_TIMEZONE,
            database_url: "postgres://localhost/kart_test".to_string(),
            google_client_secret: "test_secret".to_string(),
            resend_api_key: "re_test_key".to_string(),
            auth_secret: b"test_auth_secret_32_bytes_min!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let race_timezone = match env::var("RACE_TIMEZONE") {
            Ok(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::Invalid("RACE_TIMEZONE", name))?,
            Err(_) => DEFAULT_RACE_TIMEZONE,
        };

        Ok(Self {
            app_url: env::var("APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            email_from: env::var("EMAIL_FROM").unwrap_or_else(|_| DEFAULT_EMAIL_FROM.to_string()),
            race_timezone,

            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            resend_api_key: env::var("RESEND_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("RESEND_API_KEY"))?,
            auth_secret: env::var("AUTH_SECRET")
                .map_err(|_| ConfigError::Missing("AUTH_SECRET"))?
                .into_bytes(),
        })
    }

    /// Whether the app is served over plain HTTP on a local host.
    pub fn is_local(&self) -> bool {
        self.app_url.starts_with("http://localhost") || self.app_url.starts_with("http://127.0.0.1")
    }

    /// Redirect URI registered with Google for the OAuth callback.
    pub fn google_redirect_uri(&self) -> String {
        format!("{}/auth/google/callback", self.app_url)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use chrono::{Duration, Utc};
use kart_scheduler::config::Config;
use kart_scheduler::db::{IdentityStore, MemoryStore};
use kart_scheduler::routes::create_router;
use kart_scheduler::services::{GoogleOAuthClient, Notifier, RaceService, RecordingSender};
use kart_scheduler::AppState;
use std::sync::Arc;

/// Session token used by [`TestApp::signed_in`].
#[allow(dead_code)]
pub const TEST_SESSION: &str = "test-session-token";

/// Router plus handles on the fakes behind it.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingSender>,
}

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// Skip test with message if no test database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        match crate::common::database_url() {
            Some(url) => url,
            None => {
                eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
                return;
            }
        }
    };
}

/// Create a test app with in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app with a custom config.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingSender::new());
    let notifier = Arc::new(Notifier::new(
        mailer.clone(),
        config.email_from.clone(),
        config.race_timezone,
    ));
    let races = RaceService::new(store.clone(), notifier, config.race_timezone);
    let google = GoogleOAuthClient::new(&config).expect("HTTP client should build");

    let state = Arc::new(AppState {
        config,
        races,
        identity: store.clone(),
        google,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        mailer,
    }
}

impl TestApp {
    /// Create a user with a live session under [`TEST_SESSION`].
    #[allow(dead_code)]
    pub async fn signed_in(self) -> Self {
        let user_id = self.store.insert_user("Ayrton", "ayrton@example.com");
        self.store
            .create_session(user_id, TEST_SESSION, Utc::now() + Duration::days(1))
            .await
            .expect("session should be stored");
        self
    }
}

/// Cookie header value carrying [`TEST_SESSION`].
#[allow(dead_code)]
pub fn session_cookie() -> String {
    format!("kart_session={}", TEST_SESSION)
}

/// Form-encoded POST with the test session cookie.
#[allow(dead_code)]
pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, session_cookie())
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// GET with the test session cookie.
#[allow(dead_code)]
pub fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, session_cookie())
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as UTF-8 text.
#[allow(dead_code)]
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Form body for a valid race with the given date, time and recipients.
#[allow(dead_code)]
pub fn race_body(name: &str, date: &str, time: &str, emails: &[&str]) -> String {
    let emails = serde_json::to_string(emails).unwrap();
    format!(
        "name={}&location={}&raceDate={}&raceTime={}&pixKey={}&pricePerPerson=50&maxParticipants=10&notificationEmails={}",
        urlencoding::encode(name),
        urlencoding::encode("Kartódromo X"),
        date,
        urlencoding::encode(time),
        urlencoding::encode("abc@pix"),
        urlencoding::encode(&emails),
    )
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Kart Scheduler server
//!
//! Serves the race list, the creation wizard and the JSON API, and runs the
//! in-process reminder timers.

use kart_scheduler::{
    config::Config,
    db::PgStore,
    services::{GoogleOAuthClient, Notifier, RaceService, ResendClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        app_url = %config.app_url,
        timezone = %config.race_timezone,
        "Starting Kart Scheduler"
    );

    // Connect to PostgreSQL and apply migrations
    let store = Arc::new(PgStore::connect(&config.database_url).await?);
    tracing::info!("Database connected, migrations applied");

    let mailer = Arc::new(ResendClient::new(config.resend_api_key.clone())?);
    let notifier = Arc::new(Notifier::new(
        mailer,
        config.email_from.clone(),
        config.race_timezone,
    ));
    let races = RaceService::new(store.clone(), notifier, config.race_timezone);
    let google = GoogleOAuthClient::new(&config)?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        races,
        identity: store,
        google,
    });

    // Build router
    let app = kart_scheduler::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Reminders live only in this process
    state.races.reminders().cancel_all();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kart_scheduler=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

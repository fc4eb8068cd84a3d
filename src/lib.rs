// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Kart Scheduler: race registration for the Copa Big Churras de Kart
//!
//! Signed-in users schedule kart races through a two-step form and browse
//! the race list. Each new race triggers a notification email, and a
//! reminder goes out the day before the race.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;
pub mod views;

use config::Config;
use db::IdentityStore;
use services::{GoogleOAuthClient, RaceService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub races: RaceService,
    pub identity: Arc<dyn IdentityStore>,
    pub google: GoogleOAuthClient,
}

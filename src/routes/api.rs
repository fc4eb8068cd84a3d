// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API routes for signed-in users.

use crate::error::Result;
use crate::models::{Race, SessionUser};
use crate::validation::RaceForm;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/races", get(list_races).post(create_race))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub name: Option<String>,
    pub image: Option<String>,
}

async fn get_me(Extension(user): Extension<SessionUser>) -> Json<MeResponse> {
    Json(MeResponse {
        name: user.name,
        image: user.image,
    })
}

// ─── Races ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RaceListParams {
    /// Case-insensitive filter on name or location
    #[serde(default)]
    q: Option<String>,
}

#[derive(Serialize)]
pub struct RaceListResponse {
    pub success: bool,
    pub races: Vec<Race>,
}

#[derive(Serialize)]
pub struct CreateRaceResponse {
    pub success: bool,
    pub result: Race,
}

/// List races, most recent race date first.
async fn list_races(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RaceListParams>,
) -> Result<Json<RaceListResponse>> {
    let races = state.races.search_races(params.q.as_deref()).await?;
    Ok(Json(RaceListResponse {
        success: true,
        races,
    }))
}

/// Schedule a race from form-encoded fields.
async fn create_race(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<RaceForm>,
) -> Result<Json<CreateRaceResponse>> {
    tracing::info!(user_id = user.user_id, "Race submission");
    let race = state.races.schedule_race(&form).await?;
    Ok(Json(CreateRaceResponse {
        success: true,
        result: race,
    }))
}

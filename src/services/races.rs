// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race scheduling workflow.
//!
//! Scheduling validates the form, inserts the row, sends the "created" email
//! and arms the day-before reminder. Only validation and the insert can fail
//! the operation; notification problems are logged and ignored.

use crate::db::RaceStore;
use crate::error::{AppError, Result};
use crate::models::Race;
use crate::services::notifier::Notifier;
use crate::services::reminders::ReminderScheduler;
use crate::validation::RaceForm;
use chrono_tz::Tz;
use std::sync::Arc;

/// Creates and lists races.
pub struct RaceService {
    store: Arc<dyn RaceStore>,
    notifier: Arc<Notifier>,
    reminders: ReminderScheduler,
    tz: Tz,
}

impl RaceService {
    pub fn new(store: Arc<dyn RaceStore>, notifier: Arc<Notifier>, tz: Tz) -> Self {
        let reminders = ReminderScheduler::new(notifier.clone(), tz);
        Self {
            store,
            notifier,
            reminders,
            tz,
        }
    }

    /// Zone race dates and times are interpreted and displayed in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// Validate and store a race, then notify its recipients.
    pub async fn schedule_race(&self, form: &RaceForm) -> Result<Race> {
        let new_race = form.validate(self.tz).inspect_err(|e| {
            tracing::info!(error = %e, "Rejected race submission");
        })?;

        let race = self.store.insert_race(&new_race).await.map_err(|e| {
            tracing::error!(error = %e, name = %new_race.name, "Error scheduling race");
            AppError::ScheduleFailed
        })?;

        tracing::info!(
            race_id = race.id,
            name = %race.name,
            race_time = %race.race_time,
            recipients = race.notification_emails.len(),
            "Race scheduled"
        );

        self.notifier.race_created(&race).await;
        self.reminders.schedule(&race);

        Ok(race)
    }

    /// All races, most recent race date first.
    pub async fn list_races(&self) -> Result<Vec<Race>> {
        self.store.list_races().await.map_err(|e| {
            tracing::error!(error = %e, "Error fetching races");
            AppError::ListFailed
        })
    }

    /// Races whose name or location contains `term` (case-insensitive).
    pub async fn search_races(&self, term: Option<&str>) -> Result<Vec<Race>> {
        let races = self.list_races().await?;
        Ok(match term {
            Some(term) => races.into_iter().filter(|r| r.matches_search(term)).collect(),
            None => races,
        })
    }
}

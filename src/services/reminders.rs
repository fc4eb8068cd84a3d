// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Day-before race reminders.
//!
//! Each reminder is a detached tokio task that sleeps until one calendar day
//! before the race and then sends the reminder email. Armed reminders are
//! tracked in a registry keyed by job ID; an entry is removed when its task
//! wakes up, so anything still in the registry is pending.
//!
//! The registry lives only in this process. A restart or crash drops every
//! pending reminder without a trace, and nothing re-arms them on startup.

use crate::models::Race;
use crate::services::notifier::Notifier;
use chrono::{DateTime, Days, Duration as TimeDelta, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// A reminder that has been armed but has not fired yet.
#[derive(Debug)]
struct PendingReminder {
    race_id: i32,
    fire_at: DateTime<Utc>,
    abort: Option<AbortHandle>,
}

/// Arms and tracks reminder tasks.
pub struct ReminderScheduler {
    notifier: Arc<Notifier>,
    tz: Tz,
    pending: Arc<DashMap<u64, PendingReminder>>,
    next_job_id: AtomicU64,
}

/// One calendar day before the race start, at the same wall-clock time in `tz`.
pub fn reminder_instant(race_time: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let local = race_time.with_timezone(&tz);
    local
        .checked_sub_days(Days::new(1))
        // The same wall-clock time may not exist the day before a zone shift.
        .or_else(|| local.checked_sub_signed(TimeDelta::days(1)))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Time left until the reminder for a race starting at `race_time` is due.
///
/// `None` when the reminder instant is now or already past.
pub fn reminder_delay(race_time: DateTime<Utc>, tz: Tz, now: DateTime<Utc>) -> Option<Duration> {
    let fire_at = reminder_instant(race_time, tz)?;
    (fire_at - now).to_std().ok().filter(|d| !d.is_zero())
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<Notifier>, tz: Tz) -> Self {
        Self {
            notifier,
            tz,
            pending: Arc::new(DashMap::new()),
            next_job_id: AtomicU64::new(1),
        }
    }

    /// Arm the reminder for `race`. Returns the job ID, or `None` if the
    /// reminder instant has already passed and nothing was armed.
    ///
    /// Calling this twice for the same race arms two reminders.
    pub fn schedule(&self, race: &Race) -> Option<u64> {
        let now = Utc::now();
        let Some(delay) = reminder_delay(race.race_time, self.tz, now) else {
            tracing::info!(
                race_id = race.id,
                race_time = %race.race_time,
                "Reminder instant already passed, no reminder armed"
            );
            return None;
        };

        let race_id = race.id;
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let fire_at = now + TimeDelta::milliseconds(delay.as_millis() as i64);
        // Fixed now, not when the task is first polled.
        let deadline = tokio::time::Instant::now() + delay;

        // Register before spawning so the task's own removal always finds the entry.
        self.pending.insert(
            job_id,
            PendingReminder {
                race_id,
                fire_at,
                abort: None,
            },
        );

        let pending = self.pending.clone();
        let notifier = self.notifier.clone();
        let race = race.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            pending.remove(&job_id);
            tracing::info!(race_id = race.id, job_id, "Reminder due, sending");
            notifier.race_reminder(&race).await;
        });

        if let Some(mut entry) = self.pending.get_mut(&job_id) {
            entry.abort = Some(handle.abort_handle());
        }

        tracing::info!(
            race_id,
            job_id,
            fire_at = %fire_at,
            delay_ms = delay.as_millis() as u64,
            "Reminder armed"
        );
        Some(job_id)
    }

    /// Number of armed reminders that have not fired.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Fire times of the pending reminders for one race, earliest first.
    pub fn pending_for(&self, race_id: i32) -> Vec<DateTime<Utc>> {
        let mut times: Vec<_> = self
            .pending
            .iter()
            .filter(|e| e.race_id == race_id)
            .map(|e| e.fire_at)
            .collect();
        times.sort();
        times
    }

    /// Cancel every pending reminder for a race. Returns how many were cancelled.
    pub fn cancel_race(&self, race_id: i32) -> usize {
        let job_ids: Vec<u64> = self
            .pending
            .iter()
            .filter(|e| e.race_id == race_id)
            .map(|e| *e.key())
            .collect();
        job_ids.into_iter().filter(|id| self.cancel_job(*id)).count()
    }

    /// Cancel everything still pending, e.g. on shutdown.
    pub fn cancel_all(&self) -> usize {
        let job_ids: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        let cancelled = job_ids.into_iter().filter(|id| self.cancel_job(*id)).count();
        if cancelled > 0 {
            tracing::warn!(cancelled, "Dropped pending race reminders");
        }
        cancelled
    }

    fn cancel_job(&self, job_id: u64) -> bool {
        match self.pending.remove(&job_id) {
            Some((_, reminder)) => {
                if let Some(abort) = reminder.abort {
                    abort.abort();
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TZ: Tz = chrono_tz::America::Sao_Paulo;

    #[test]
    fn test_reminder_is_one_calendar_day_before() {
        let race_time = Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();
        assert_eq!(
            reminder_instant(race_time, TZ),
            Some(Utc.with_ymd_and_hms(2025, 5, 31, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_past_reminder_has_no_delay() {
        let race_time = Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();
        // Same day as the race: reminder instant is yesterday.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(reminder_delay(race_time, TZ, now), None);
        // Exactly at the reminder instant.
        let now = Utc.with_ymd_and_hms(2025, 5, 31, 17, 0, 0).unwrap();
        assert_eq!(reminder_delay(race_time, TZ, now), None);
    }

    #[test]
    fn test_future_reminder_delay_is_exact() {
        let race_time = Utc.with_ymd_and_hms(2025, 6, 3, 17, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 16, 59, 59).unwrap();
        assert_eq!(
            reminder_delay(race_time, TZ, now),
            Some(Duration::from_secs(24 * 3600 + 1))
        );
    }
}

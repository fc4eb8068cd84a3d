// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for tests.
//!
//! Mirrors the PostgreSQL semantics that callers rely on: generated
//! increasing IDs, date-descending listing and session expiry. Failures can
//! be switched on to exercise error paths.

use crate::db::{IdentityStore, RaceStore};
use crate::error::AppError;
use crate::models::{GoogleProfile, NewRace, Race, SessionUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    races: Vec<Race>,
    users: Vec<User>,
    /// (provider account id) → user id
    accounts: HashMap<String, i32>,
    /// session token → (user id, expires)
    sessions: HashMap<String, (i32, DateTime<Utc>)>,
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every race insert fail, as if the database rejected it.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every race listing fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of stored races.
    pub fn race_count(&self) -> usize {
        self.lock().races.len()
    }

    /// Add a user directly, returning its ID.
    pub fn insert_user(&self, name: &str, email: &str) -> i32 {
        let mut tables = self.lock();
        let id = tables.users.len() as i32 + 1;
        tables.users.push(User {
            id,
            name: Some(name.to_string()),
            email: email.to_string(),
            email_verified: None,
            image: None,
        });
        id
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RaceStore for MemoryStore {
    async fn insert_race(&self, race: &NewRace) -> Result<Race, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated write failure".to_string()));
        }
        let mut tables = self.lock();
        let id = tables.races.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let row = race.clone().into_race(id, Utc::now());
        tables.races.push(row.clone());
        Ok(row)
    }

    async fn list_races(&self) -> Result<Vec<Race>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated read failure".to_string()));
        }
        let mut races = self.lock().races.clone();
        races.sort_by(|a, b| {
            b.race_date
                .cmp(&a.race_date)
                .then_with(|| b.race_time.cmp(&a.race_time))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(races)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn upsert_google_user(&self, profile: &GoogleProfile) -> Result<i32, AppError> {
        let mut tables = self.lock();
        let user_id = match tables.users.iter_mut().find(|u| u.email == profile.email) {
            Some(user) => {
                user.name = profile.name.clone();
                user.image = profile.picture.clone();
                user.id
            }
            None => {
                let id = tables.users.len() as i32 + 1;
                tables.users.push(User {
                    id,
                    name: profile.name.clone(),
                    email: profile.email.clone(),
                    email_verified: profile.email_verified.then(Utc::now),
                    image: profile.picture.clone(),
                });
                id
            }
        };
        tables.accounts.insert(profile.sub.clone(), user_id);
        Ok(user_id)
    }

    async fn create_session(
        &self,
        user_id: i32,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.lock()
            .sessions
            .insert(token.to_string(), (user_id, expires));
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<SessionUser>, AppError> {
        let tables = self.lock();
        let Some(&(user_id, expires)) = tables.sessions.get(token) else {
            return Ok(None);
        };
        if expires <= Utc::now() {
            return Ok(None);
        }
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| SessionUser {
                user_id: u.id,
                name: u.name.clone(),
                image: u.image.clone(),
            }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.lock().sessions.remove(token);
        Ok(())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod race;
pub mod user;

pub use race::{NewRace, Race};
pub use user::{GoogleProfile, SessionUser, User};

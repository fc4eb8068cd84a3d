// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google;
pub mod mailer;
pub mod notifier;
pub mod races;
pub mod reminders;

pub use google::GoogleOAuthClient;
pub use mailer::{EmailSender, MailError, OutgoingEmail, RecordingSender, ResendClient};
pub use notifier::{Notifier, RaceEmail};
pub use races::RaceService;
pub use reminders::ReminderScheduler;

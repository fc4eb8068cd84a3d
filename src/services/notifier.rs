// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race notification emails.
//!
//! Sends are best effort: failures are logged and never reach the caller.

use crate::models::Race;
use crate::services::mailer::{EmailSender, OutgoingEmail};
use crate::time_utils::{format_date_br, format_time_hm};
use crate::views::escape_html;
use chrono_tz::Tz;
use std::sync::Arc;

/// Which lifecycle email to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceEmail {
    Created,
    Reminder,
}

impl RaceEmail {
    fn as_str(self) -> &'static str {
        match self {
            RaceEmail::Created => "created",
            RaceEmail::Reminder => "reminder",
        }
    }
}

/// Formats race emails and hands them to an [`EmailSender`].
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    from: String,
    tz: Tz,
}

impl Notifier {
    pub fn new(sender: Arc<dyn EmailSender>, from: String, tz: Tz) -> Self {
        Self { sender, from, tz }
    }

    /// Announce a newly scheduled race.
    pub async fn race_created(&self, race: &Race) {
        self.send(RaceEmail::Created, race).await
    }

    /// Remind recipients that the race is tomorrow.
    pub async fn race_reminder(&self, race: &Race) {
        self.send(RaceEmail::Reminder, race).await
    }

    /// Render the message for `kind` without sending it.
    pub fn render(&self, kind: RaceEmail, race: &Race) -> OutgoingEmail {
        let (subject, heading, intro) = match kind {
            RaceEmail::Created => (
                format!("Nova corrida agendada: {}", race.name),
                "Nova corrida agendada",
                "Uma nova corrida foi agendada:",
            ),
            RaceEmail::Reminder => (
                format!("Lembrete: corrida amanhã - {}", race.name),
                "Lembrete de corrida",
                "Não se esqueça da corrida amanhã:",
            ),
        };

        let html = format!(
            "<h1>{heading}</h1>\n\
             <p>{intro}</p>\n\
             <ul>\n\
             <li>Nome: {name}</li>\n\
             <li>Local: {location}</li>\n\
             <li>Data: {date}</li>\n\
             <li>Horário: {time}</li>\n\
             </ul>\n",
            name = escape_html(&race.name),
            location = escape_html(&race.location),
            date = format_date_br(race.race_date),
            time = format_time_hm(race.race_time, self.tz),
        );

        OutgoingEmail {
            from: self.from.clone(),
            to: race.notification_emails.clone(),
            subject,
            html,
        }
    }

    async fn send(&self, kind: RaceEmail, race: &Race) {
        if race.notification_emails.is_empty() {
            tracing::debug!(
                race_id = race.id,
                kind = kind.as_str(),
                "No notification recipients, skipping email"
            );
            return;
        }

        let email = self.render(kind, race);
        match self.sender.send(&email).await {
            Ok(()) => tracing::info!(
                race_id = race.id,
                kind = kind.as_str(),
                recipients = email.to.len(),
                "Race email sent"
            ),
            Err(e) => tracing::error!(
                race_id = race.id,
                kind = kind.as_str(),
                error = %e,
                "Failed to send race email"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRace;
    use crate::services::mailer::RecordingSender;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    const TZ: Tz = chrono_tz::America::Sao_Paulo;

    fn race(emails: &[&str]) -> Race {
        NewRace {
            name: "GP <Teste>".to_string(),
            location: "Kartódromo X".to_string(),
            race_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            race_time: Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap(),
            pix_key: "abc@pix".to_string(),
            price_per_person: Decimal::new(50, 0),
            max_participants: 10,
            notification_emails: emails.iter().map(|e| e.to_string()).collect(),
        }
        .into_race(7, Utc::now())
    }

    #[test]
    fn test_created_template() {
        let sender = Arc::new(RecordingSender::new());
        let notifier = Notifier::new(sender, "from@example.com".to_string(), TZ);
        let email = notifier.render(RaceEmail::Created, &race(&["a@b.com"]));

        assert_eq!(email.subject, "Nova corrida agendada: GP <Teste>");
        assert_eq!(email.to, vec!["a@b.com"]);
        assert!(email.html.contains("<li>Nome: GP &lt;Teste&gt;</li>"));
        assert!(email.html.contains("<li>Data: 01/06/2025</li>"));
        assert!(email.html.contains("<li>Horário: 14:00</li>"));
    }

    #[test]
    fn test_reminder_template() {
        let sender = Arc::new(RecordingSender::new());
        let notifier = Notifier::new(sender, "from@example.com".to_string(), TZ);
        let email = notifier.render(RaceEmail::Reminder, &race(&["a@b.com"]));

        assert_eq!(email.subject, "Lembrete: corrida amanhã - GP <Teste>");
        assert!(email.html.contains("Não se esqueça da corrida amanhã"));
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let sender = Arc::new(RecordingSender::new());
        sender.set_fail(true);
        let notifier = Notifier::new(sender.clone(), "from@example.com".to_string(), TZ);

        notifier.race_created(&race(&["a@b.com"])).await;
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_no_recipients_skips_send() {
        let sender = Arc::new(RecordingSender::new());
        let notifier = Notifier::new(sender.clone(), "from@example.com".to_string(), TZ);

        notifier.race_created(&race(&[])).await;
        assert!(sender.sent().is_empty());
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scheduled kart race as stored in the `races` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    /// Generated by the database
    pub id: i32,
    pub name: String,
    pub location: String,
    /// Calendar date of the race in the race time zone
    pub race_date: NaiveDate,
    /// Full start instant of the race
    pub race_time: DateTime<Utc>,
    /// PIX key participants pay to
    pub pix_key: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_person: Decimal,
    pub max_participants: i32,
    /// Recipients of the created and reminder emails
    #[sqlx(json)]
    pub notification_emails: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Race {
    /// Case-insensitive match of `term` against name or location.
    ///
    /// An empty (or whitespace-only) term matches every race.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.location.to_lowercase().contains(&term)
    }
}

/// A validated race ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRace {
    pub name: String,
    pub location: String,
    pub race_date: NaiveDate,
    pub race_time: DateTime<Utc>,
    pub pix_key: String,
    pub price_per_person: Decimal,
    pub max_participants: i32,
    pub notification_emails: Vec<String>,
}

impl NewRace {
    /// Build the stored row for this race with the generated columns filled in.
    pub fn into_race(self, id: i32, created_at: DateTime<Utc>) -> Race {
        Race {
            id,
            name: self.name,
            location: self.location,
            race_date: self.race_date,
            race_time: self.race_time,
            pix_key: self.pix_key,
            price_per_person: self.price_per_person,
            max_participants: self.max_participants,
            notification_emails: self.notification_emails,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn race(name: &str, location: &str) -> Race {
        NewRace {
            name: name.to_string(),
            location: location.to_string(),
            race_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            race_time: Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap(),
            pix_key: "abc@pix".to_string(),
            price_per_person: Decimal::new(5000, 2),
            max_participants: 10,
            notification_emails: vec!["a@b.com".to_string()],
        }
        .into_race(1, Utc::now())
    }

    #[test]
    fn test_search_matches_name_or_location_ignoring_case() {
        let r = race("GP Teste", "Kartódromo X");
        assert!(r.matches_search("gp"));
        assert!(r.matches_search("KARTÓDROMO"));
        assert!(r.matches_search("  "));
        assert!(!r.matches_search("interlagos"));
    }

    #[test]
    fn test_json_uses_camel_case_and_numeric_price() {
        let json = serde_json::to_value(race("GP Teste", "Kartódromo X")).unwrap();
        assert_eq!(json["pixKey"], "abc@pix");
        assert_eq!(json["raceDate"], "2025-06-01");
        assert_eq!(json["pricePerPerson"], 50.0);
        assert_eq!(json["maxParticipants"], 10);
        assert_eq!(json["notificationEmails"][0], "a@b.com");
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// `dd/mm/yyyy`, as Brazilian locales print dates.
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `HH:MM` wall-clock time of `instant` in `tz`.
pub fn format_time_hm(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// `01 de junho`
pub fn format_day_month_pt(date: NaiveDate) -> String {
    format!("{:02} de {}", date.day(), MONTHS_PT_BR[date.month0() as usize])
}

/// `01 de junho de 2025`
pub fn format_long_date_pt(date: NaiveDate) -> String {
    format!("{} de {}", format_day_month_pt(date), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formats() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_date_br(date), "07/03/2025");
        assert_eq!(format_day_month_pt(date), "07 de março");
        assert_eq!(format_long_date_pt(date), "07 de março de 2025");
    }

    #[test]
    fn test_time_in_zone() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();
        assert_eq!(
            format_time_hm(instant, chrono_tz::America::Sao_Paulo),
            "14:00"
        );
    }
}

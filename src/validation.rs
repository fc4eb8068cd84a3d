// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Validation of submitted race forms.
//!
//! Raw form fields arrive as optional strings. Numeric and list fields are
//! parsed first; the typed submission is then checked with `validator`. Any
//! failure is reported per field using the wire names the form posts.
//! Only when every field passes is the date and time combined into a single
//! instant, which can still fail for dates such as `2025-02-30`.

use crate::error::AppError;
use crate::models::NewRace;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// Field name → messages, keyed by form wire names.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Fields collected by the first wizard step.
pub const SCHEDULE_STEP_FIELDS: [&str; 4] = ["name", "location", "raceDate", "raceTime"];

const MSG_NAME: &str = "O nome da corrida deve ter pelo menos 2 caracteres.";
const MSG_LOCATION: &str = "O local deve ter pelo menos 2 caracteres.";
const MSG_DATE: &str = "Data inválida.";
const MSG_TIME: &str = "Formato de hora inválido. Use HH:MM.";
const MSG_PIX_KEY: &str = "A chave PIX é obrigatória.";
const MSG_PRICE: &str = "O preço por pessoa deve ser um número positivo.";
const MSG_PRICE_MAX: &str = "O preço por pessoa deve ser no máximo R$ 99999999,99.";
const MSG_MAX_PARTICIPANTS: &str = "O número máximo de participantes deve ser pelo menos 1.";
const MSG_EMAIL: &str = "E-mail inválido.";
const MSG_EMAIL_LIST: &str = "Lista de e-mails inválida.";

/// Raw race form as posted by the browser or an API client.
///
/// Every field is optional so that missing fields surface as validation
/// failures rather than extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceForm {
    pub name: Option<String>,
    pub location: Option<String>,
    pub race_date: Option<String>,
    pub race_time: Option<String>,
    pub pix_key: Option<String>,
    pub price_per_person: Option<String>,
    pub max_participants: Option<String>,
    /// JSON-encoded array of email addresses
    pub notification_emails: Option<String>,
}

/// Typed view of a [`RaceForm`] checked by `validator`.
#[derive(Debug, Validate)]
struct RaceSubmission {
    #[validate(length(min = 2, message = "O nome da corrida deve ter pelo menos 2 caracteres."))]
    name: String,
    #[validate(length(min = 2, message = "O local deve ter pelo menos 2 caracteres."))]
    location: String,
    #[validate(custom(function = "validate_date_shape"))]
    race_date: String,
    #[validate(custom(function = "validate_clock_time"))]
    race_time: String,
    #[validate(length(min = 1, message = "A chave PIX é obrigatória."))]
    pix_key: String,
    #[validate(
        required(message = "O preço por pessoa deve ser um número positivo."),
        custom(function = "validate_price")
    )]
    price_per_person: Option<Decimal>,
    #[validate(
        required(message = "O número máximo de participantes deve ser pelo menos 1."),
        range(min = 1, message = "O número máximo de participantes deve ser pelo menos 1.")
    )]
    max_participants: Option<i32>,
    #[validate(custom(function = "validate_email_list"))]
    notification_emails: Vec<String>,
}

impl RaceForm {
    /// Validate every field and build the race to insert.
    ///
    /// Returns [`AppError::Validation`] with per-field messages, or
    /// [`AppError::InvalidDateTime`] when the date and time do not combine
    /// into a real instant in `tz`.
    pub fn validate(&self, tz: Tz) -> Result<NewRace, AppError> {
        let (submission, emails_parsed) = self.submission();

        let mut errors = FieldErrors::new();
        if let Err(e) = submission.validate() {
            collect_errors(&e, &mut errors);
        }
        if !emails_parsed {
            push_error(&mut errors, "notificationEmails", MSG_EMAIL_LIST);
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let race_time = combine_date_time(&submission.race_date, &submission.race_time, tz)
            .ok_or(AppError::InvalidDateTime)?;
        let race_date = race_time.with_timezone(&tz).date_naive();

        let Some(price) = submission.price_per_person else {
            return Err(single_error("pricePerPerson", MSG_PRICE));
        };
        let Some(max_participants) = submission.max_participants else {
            return Err(single_error("maxParticipants", MSG_MAX_PARTICIPANTS));
        };

        Ok(NewRace {
            name: submission.name,
            location: submission.location,
            race_date,
            race_time,
            pix_key: submission.pix_key,
            price_per_person: price,
            max_participants,
            notification_emails: submission.notification_emails,
        })
    }

    /// Check only the fields of the first wizard step.
    pub fn validate_schedule_step(&self) -> Result<(), FieldErrors> {
        let (submission, _) = self.submission();
        let mut errors = FieldErrors::new();
        if let Err(e) = submission.validate() {
            collect_errors(&e, &mut errors);
        }
        errors.retain(|field, _| SCHEDULE_STEP_FIELDS.contains(&field.as_str()));
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Addresses currently in the form, or empty if the list is missing or malformed.
    pub fn email_list(&self) -> Vec<String> {
        parse_email_list(self.notification_emails.as_deref()).unwrap_or_default()
    }

    /// Replace the encoded email list.
    pub fn set_email_list(&mut self, emails: &[String]) {
        self.notification_emails =
            Some(serde_json::to_string(emails).unwrap_or_else(|_| "[]".to_string()));
    }

    fn submission(&self) -> (RaceSubmission, bool) {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        let emails = parse_email_list(self.notification_emails.as_deref());
        let emails_parsed = emails.is_some();

        let submission = RaceSubmission {
            name: text(&self.name),
            location: text(&self.location),
            race_date: text(&self.race_date),
            race_time: text(&self.race_time),
            pix_key: text(&self.pix_key),
            price_per_person: parse_price(self.price_per_person.as_deref()),
            max_participants: self
                .max_participants
                .as_deref()
                .and_then(|v| v.trim().parse::<i32>().ok()),
            notification_emails: emails.unwrap_or_default(),
        };
        (submission, emails_parsed)
    }
}

/// Largest price the `races.price_per_person` column (`NUMERIC(10, 2)`) holds.
fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Parse a price accepting either `.` or `,` as the decimal separator,
/// rounded half away from zero to whole cents.
fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?.trim().replace(',', ".");
    let price: Decimal = raw.parse().ok()?;
    Some(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn parse_email_list(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    let emails: Vec<String> = serde_json::from_str(raw).ok()?;
    Some(emails.into_iter().map(|e| e.trim().to_string()).collect())
}

/// Split `YYYY-MM-DD` into its parts, checking only shape and ranges.
fn parse_date_parts(value: &str) -> Option<(i32, u32, u32)> {
    let mut parts = value.split('-');
    let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || y.len() != 4 || m.len() != 2 || d.len() != 2 {
        return None;
    }
    if ![y, m, d].iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let (year, month, day) = (y.parse().ok()?, m.parse().ok()?, d.parse().ok()?);
    ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some((year, month, day))
}

/// Parse a 24-hour `H:MM` or `HH:MM` time of day.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let (h, m) = value.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

/// Combine a date and a time into an instant in `tz`.
///
/// `None` for impossible calendar dates and for local times that are skipped
/// or repeated by a zone transition.
pub fn combine_date_time(date: &str, time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let (year, month, day) = parse_date_parts(date)?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_time(parse_clock_time(time)?);
    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_date_shape(value: &str) -> Result<(), ValidationError> {
    parse_date_parts(value)
        .map(|_| ())
        .ok_or_else(|| field_error("date", MSG_DATE))
}

fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    parse_clock_time(value)
        .map(|_| ())
        .ok_or_else(|| field_error("time", MSG_TIME))
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(field_error("range", MSG_PRICE));
    }
    if *price > max_price() {
        return Err(field_error("range", MSG_PRICE_MAX));
    }
    Ok(())
}

fn validate_email_list(emails: &[String]) -> Result<(), ValidationError> {
    if emails.iter().all(|e| e.validate_email()) {
        Ok(())
    } else {
        Err(field_error("email", MSG_EMAIL))
    }
}

/// Map struct field names to the names the form posts.
fn wire_name(field: &str) -> &str {
    match field {
        "race_date" => "raceDate",
        "race_time" => "raceTime",
        "pix_key" => "pixKey",
        "price_per_person" => "pricePerPerson",
        "max_participants" => "maxParticipants",
        "notification_emails" => "notificationEmails",
        other => other,
    }
}

fn fallback_message(field: &str) -> &'static str {
    match field {
        "name" => MSG_NAME,
        "location" => MSG_LOCATION,
        "raceDate" => MSG_DATE,
        "raceTime" => MSG_TIME,
        "pixKey" => MSG_PIX_KEY,
        "pricePerPerson" => MSG_PRICE,
        "maxParticipants" => MSG_MAX_PARTICIPANTS,
        "notificationEmails" => MSG_EMAIL,
        _ => "Valor inválido.",
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    let messages = errors.entry(field.to_string()).or_default();
    if !messages.iter().any(|m| m == message) {
        messages.push(message.to_string());
    }
}

fn single_error(field: &str, message: &str) -> AppError {
    let mut errors = FieldErrors::new();
    push_error(&mut errors, field, message);
    AppError::Validation(errors)
}

fn collect_errors(source: &ValidationErrors, errors: &mut FieldErrors) {
    for (field, field_errors) in source.field_errors() {
        let field = field.to_string();
        let name = wire_name(&field);
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| fallback_message(name).to_string());
            push_error(errors, name, &message);
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML pages: race list and the two-step creation wizard.
//!
//! Both pages show the sign-in gate instead of any content when there is
//! no valid session.

use crate::error::AppError;
use crate::middleware::MaybeSession;
use crate::models::SessionUser;
use crate::validation::{FieldErrors, RaceForm, SCHEDULE_STEP_FIELDS};
use crate::views::{self, WizardMessages, WizardStep};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(race_list))
        .route("/cadastrar-corrida", get(wizard_start).post(wizard_post))
}

type Page = (StatusCode, Html<String>);

fn page(html: String) -> Page {
    (StatusCode::OK, Html(html))
}

fn gate() -> Page {
    page(views::gate_page())
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    q: Option<String>,
}

async fn race_list(
    State(state): State<Arc<AppState>>,
    MaybeSession(user): MaybeSession,
    Query(params): Query<ListParams>,
) -> Page {
    let Some(user) = user else {
        return gate();
    };

    let query = params.q.unwrap_or_default();
    match state.races.search_races(Some(&query)).await {
        Ok(races) => page(views::race_list_page(
            &user,
            &races,
            &query,
            state.races.timezone(),
        )),
        Err(e) => (
            e.status_code(),
            Html(views::error_page(Some(&user), e.user_message())),
        ),
    }
}

async fn wizard_start(MaybeSession(user): MaybeSession) -> Page {
    let Some(user) = user else {
        return gate();
    };
    page(views::wizard_page(
        &user,
        WizardStep::Schedule,
        &RaceForm::default(),
        &WizardMessages::default(),
    ))
}

/// Everything the wizard form posts: the race fields plus wizard controls.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardForm {
    #[serde(flatten)]
    race: RaceForm,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    new_email: Option<String>,
}

/// Button pressed on the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WizardAction {
    Next,
    Back,
    AddEmail,
    RemoveEmail(String),
    Submit,
}

impl WizardAction {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "next" => Some(Self::Next),
            "back" => Some(Self::Back),
            "add_email" => Some(Self::AddEmail),
            "submit" => Some(Self::Submit),
            other => other
                .strip_prefix("remove_email:")
                .map(|addr| Self::RemoveEmail(addr.to_string())),
        }
    }
}

async fn wizard_post(
    State(state): State<Arc<AppState>>,
    MaybeSession(user): MaybeSession,
    Form(input): Form<WizardForm>,
) -> Page {
    let Some(user) = user else {
        return gate();
    };

    let WizardForm {
        race: mut form,
        action,
        new_email,
    } = input;

    match WizardAction::parse(action.as_deref()) {
        Some(WizardAction::Next) => match form.validate_schedule_step() {
            Ok(()) => render(&user, WizardStep::Details, &form, WizardMessages::default()),
            Err(errors) => invalid(&user, WizardStep::Schedule, &form, &errors),
        },
        Some(WizardAction::Back) | None => {
            render(&user, WizardStep::Schedule, &form, WizardMessages::default())
        }
        Some(WizardAction::AddEmail) => {
            let email = new_email.as_deref().unwrap_or_default().trim();
            let mut emails = form.email_list();
            // A duplicate stays in the input box.
            let pending = if emails.iter().any(|e| e == email) {
                Some(email)
            } else {
                if !email.is_empty() {
                    emails.push(email.to_string());
                }
                None
            };
            form.set_email_list(&emails);
            let messages = WizardMessages {
                new_email: pending,
                ..Default::default()
            };
            render(&user, WizardStep::Details, &form, messages)
        }
        Some(WizardAction::RemoveEmail(addr)) => {
            let emails: Vec<String> = form
                .email_list()
                .into_iter()
                .filter(|e| *e != addr)
                .collect();
            form.set_email_list(&emails);
            render(&user, WizardStep::Details, &form, WizardMessages::default())
        }
        Some(WizardAction::Submit) => submit(&state, &user, &form).await,
    }
}

async fn submit(state: &AppState, user: &SessionUser, form: &RaceForm) -> Page {
    // A wizard where no address was ever added posts no list at all.
    let mut form = form.clone();
    if form.notification_emails.is_none() {
        form.set_email_list(&[]);
    }
    let form = &form;

    match state.races.schedule_race(form).await {
        Ok(race) => {
            tracing::info!(user_id = user.user_id, race_id = race.id, "Race scheduled from wizard");
            render(
                user,
                WizardStep::Schedule,
                &RaceForm::default(),
                WizardMessages {
                    notice: Some(views::SCHEDULED_MESSAGE),
                    ..Default::default()
                },
            )
        }
        Err(AppError::Validation(errors)) => {
            let step = if errors
                .keys()
                .any(|field| SCHEDULE_STEP_FIELDS.contains(&field.as_str()))
            {
                WizardStep::Schedule
            } else {
                WizardStep::Details
            };
            invalid(user, step, form, &errors)
        }
        Err(e) => {
            let step = match e {
                AppError::InvalidDateTime => WizardStep::Schedule,
                _ => WizardStep::Details,
            };
            let html = views::wizard_page(
                user,
                step,
                form,
                &WizardMessages {
                    alert: Some(e.user_message()),
                    ..Default::default()
                },
            );
            (e.status_code(), Html(html))
        }
    }
}

fn render(user: &SessionUser, step: WizardStep, form: &RaceForm, messages: WizardMessages<'_>) -> Page {
    page(views::wizard_page(user, step, form, &messages))
}

fn invalid(user: &SessionUser, step: WizardStep, form: &RaceForm, errors: &FieldErrors) -> Page {
    let html = views::wizard_page(
        user,
        step,
        form,
        &WizardMessages {
            field_errors: Some(errors),
            ..Default::default()
        },
    );
    (StatusCode::BAD_REQUEST, Html(html))
}

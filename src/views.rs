// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered HTML pages.
//!
//! Every value that came from a user or the database goes through
//! [`escape_html`] before it lands in markup.

use crate::models::{Race, SessionUser};
use crate::time_utils::{format_day_month_pt, format_long_date_pt, format_time_hm};
use crate::validation::{FieldErrors, RaceForm};
use chrono_tz::Tz;
use std::fmt::Write as _;

pub const GATE_MESSAGE: &str = "Você precisa estar autenticado para visualizar essa página.";
pub const NO_RACES_MESSAGE: &str = "Nenhuma corrida encontrada.";
pub const SCHEDULED_MESSAGE: &str = "Corrida agendada com sucesso!";

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#f7f7f8}\
nav{display:flex;justify-content:space-between;align-items:center;padding:1rem 2rem;background:#111;color:#fff}\
nav a,nav button{color:#fff}\
.avatar{width:32px;height:32px;border-radius:50%;vertical-align:middle}\
main{max-width:960px;margin:2rem auto;padding:0 1rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:1.5rem}\
.card{background:#fff;border-radius:8px;padding:1rem;box-shadow:0 1px 3px rgba(0,0,0,.1)}\
.error{color:#b91c1c;font-size:.875rem}\
.notice{padding:.75rem;border-radius:6px;background:#dcfce7}\
.alert{padding:.75rem;border-radius:6px;background:#fee2e2}\
label{display:block;margin-top:1rem}";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&SessionUser>, body: &str) -> String {
    let account = match user {
        Some(user) => {
            let name = escape_html(user.name.as_deref().unwrap_or("Piloto"));
            let avatar = user
                .image
                .as_deref()
                .map(|src| {
                    format!(
                        "<img class=\"avatar\" src=\"{}\" alt=\"{name}\" referrerpolicy=\"no-referrer\"> ",
                        escape_html(src)
                    )
                })
                .unwrap_or_default();
            format!(
                "{avatar}<span>{name}</span> \
                 <form method=\"post\" action=\"/auth/logout\" style=\"display:inline\">\
                 <button type=\"submit\">Sair</button></form>"
            )
        }
        None => "<a href=\"/auth/google\">Entrar</a>".to_string(),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"pt-BR\">\n\
         <head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} | Copa Big Churras de Kart</title>\
         <style>{STYLE}</style></head>\n\
         <body>\n\
         <nav><a href=\"/\">Copa Big Churras de Kart</a><div>{account}</div></nav>\n\
         <main>\n{body}\n</main>\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
    )
}

/// Page shown in place of any protected page when there is no session.
pub fn gate_page() -> String {
    let body = format!(
        "<div class=\"card\"><p>{GATE_MESSAGE}</p>\
         <p><a href=\"/auth/google\">Entrar com o Google</a></p></div>"
    );
    layout("Entrar", None, &body)
}

pub fn error_page(user: Option<&SessionUser>, message: &str) -> String {
    let body = format!(
        "<p class=\"alert\">{}</p><p><a href=\"/\">Voltar ao início</a></p>",
        escape_html(message)
    );
    layout("Erro", user, &body)
}

/// Race list with search box and one card per race.
pub fn race_list_page(user: &SessionUser, races: &[Race], query: &str, tz: Tz) -> String {
    let mut body = format!(
        "<form method=\"get\" action=\"/\">\
         <input type=\"search\" name=\"q\" placeholder=\"Buscar corridas...\" value=\"{}\">\
         <button type=\"submit\">Buscar</button></form>\n\
         <p><a href=\"/cadastrar-corrida\">Cadastrar corrida</a></p>\n",
        escape_html(query)
    );

    if races.is_empty() {
        let _ = write!(body, "<p>{NO_RACES_MESSAGE}</p>");
    } else {
        body.push_str("<div class=\"grid\">\n");
        for race in races {
            body.push_str(&race_card(race, tz));
        }
        body.push_str("</div>");
    }

    layout("Corridas", Some(user), &body)
}

fn race_card(race: &Race, tz: Tz) -> String {
    format!(
        "<article class=\"card\">\
         <h2>{name}</h2>\
         <p>{location}</p>\
         <p>{day_month}</p>\
         <details><summary>Detalhes</summary>\
         <p>Data: {long_date}</p>\
         <p>Horário: {time}</p>\
         <p>Máximo de {max} participantes</p>\
         <p>R$ {price:.2} por pessoa</p>\
         <p>Chave PIX: {pix}</p>\
         </details></article>\n",
        name = escape_html(&race.name),
        location = escape_html(&race.location),
        day_month = format_day_month_pt(race.race_date),
        long_date = format_long_date_pt(race.race_date),
        time = format_time_hm(race.race_time, tz),
        max = race.max_participants,
        price = race.price_per_person,
        pix = escape_html(&race.pix_key),
    )
}

/// Which half of the creation wizard to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Schedule,
    Details,
}

/// What the wizard page should show besides the form itself.
#[derive(Debug, Default)]
pub struct WizardMessages<'a> {
    pub field_errors: Option<&'a FieldErrors>,
    /// Error not tied to one field, e.g. a failed save
    pub alert: Option<&'a str>,
    /// Confirmation after a successful submit
    pub notice: Option<&'a str>,
    /// Value to keep in the "add email" box
    pub new_email: Option<&'a str>,
}

/// Creation wizard page.
pub fn wizard_page(
    user: &SessionUser,
    step: WizardStep,
    form: &RaceForm,
    messages: &WizardMessages<'_>,
) -> String {
    let value = |v: &Option<String>| escape_html(v.as_deref().unwrap_or_default());
    let error = |field: &str| -> String {
        messages
            .field_errors
            .and_then(|errors| errors.get(field))
            .map(|msgs| {
                msgs.iter()
                    .map(|m| format!("<p class=\"error\">{}</p>", escape_html(m)))
                    .collect::<String>()
            })
            .unwrap_or_default()
    };

    let mut body = String::from(
        "<h1>Agendar nova corrida</h1>\
         <p>Preencha os detalhes para agendar uma nova corrida.</p>\n",
    );
    if let Some(notice) = messages.notice {
        let _ = write!(
            body,
            "<p class=\"notice\">{}<br>Todos os participantes serão notificados por e-mail.</p>\n",
            escape_html(notice)
        );
    }
    if let Some(alert) = messages.alert {
        let _ = write!(
            body,
            "<p class=\"alert\">Erro ao agendar a corrida: {}</p>\n",
            escape_html(alert)
        );
    }

    body.push_str("<form method=\"post\" action=\"/cadastrar-corrida\">\n");

    match step {
        WizardStep::Schedule => {
            let _ = write!(
                body,
                "<label>Nome da corrida <input name=\"name\" placeholder=\"Grande Prêmio de Kart\" value=\"{name}\"></label>{name_err}\n\
                 <label>Local <input name=\"location\" placeholder=\"Kartódromo Internacional\" value=\"{location}\"></label>{location_err}\n\
                 <label>Data da corrida <input type=\"date\" name=\"raceDate\" value=\"{date}\"></label>{date_err}\n\
                 <label>Horário da corrida <input type=\"time\" name=\"raceTime\" value=\"{time}\"></label>{time_err}\n",
                name = value(&form.name),
                name_err = error("name"),
                location = value(&form.location),
                location_err = error("location"),
                date = value(&form.race_date),
                date_err = error("raceDate"),
                time = value(&form.race_time),
                time_err = error("raceTime"),
            );
            let _ = write!(
                body,
                "{}{}{}{}",
                hidden("pixKey", &form.pix_key),
                hidden("pricePerPerson", &form.price_per_person),
                hidden("maxParticipants", &form.max_participants),
                hidden("notificationEmails", &form.notification_emails),
            );
            body.push_str("<p><button type=\"submit\" name=\"action\" value=\"next\">Próximo</button></p>\n");
        }
        WizardStep::Details => {
            let _ = write!(
                body,
                "{}{}{}{}",
                hidden("name", &form.name),
                hidden("location", &form.location),
                hidden("raceDate", &form.race_date),
                hidden("raceTime", &form.race_time),
            );
            let _ = write!(
                body,
                "<label>Chave PIX <input name=\"pixKey\" placeholder=\"Sua chave PIX\" value=\"{pix}\"></label>{pix_err}\n\
                 <label>Valor por pessoa <input name=\"pricePerPerson\" inputmode=\"decimal\" value=\"{price}\"></label>{price_err}\n\
                 <label>Número máximo de participantes <input type=\"number\" min=\"1\" name=\"maxParticipants\" value=\"{max}\"></label>{max_err}\n",
                pix = value(&form.pix_key),
                pix_err = error("pixKey"),
                price = value(&form.price_per_person),
                price_err = error("pricePerPerson"),
                max = value(&form.max_participants),
                max_err = error("maxParticipants"),
            );

            body.push_str(&hidden("notificationEmails", &form.notification_emails));
            let _ = write!(
                body,
                "<label>E-mails para notificação \
                 <input type=\"email\" name=\"newEmail\" placeholder=\"exemplo@email.com\" value=\"{}\"></label>\
                 <button type=\"submit\" name=\"action\" value=\"add_email\">Adicionar</button>{}\n<ul>\n",
                escape_html(messages.new_email.unwrap_or_default()),
                error("notificationEmails"),
            );
            for email in form.email_list() {
                let email = escape_html(&email);
                let _ = writeln!(
                    body,
                    "<li>{email} <button type=\"submit\" name=\"action\" value=\"remove_email:{email}\">Remover</button></li>"
                );
            }
            body.push_str("</ul>\n");
            body.push_str(
                "<p><button type=\"submit\" name=\"action\" value=\"back\">Voltar</button> \
                 <button type=\"submit\" name=\"action\" value=\"submit\">Agendar corrida</button></p>\n",
            );
        }
    }

    body.push_str("</form>");
    layout("Cadastrar corrida", Some(user), &body)
}

fn hidden(name: &str, value: &Option<String>) -> String {
    match value {
        Some(v) => format!(
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            name,
            escape_html(v)
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRace;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    const TZ: Tz = chrono_tz::America::Sao_Paulo;

    fn user() -> SessionUser {
        SessionUser {
            user_id: 1,
            name: Some("Ayrton".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_nav_shows_profile_picture() {
        let html = race_list_page(&user(), &[], "", TZ);
        assert!(!html.contains("<img"));

        let with_image = SessionUser {
            image: Some("https://lh3.googleusercontent.com/a/x?sz=64&v=1".to_string()),
            ..user()
        };
        let html = race_list_page(&with_image, &[], "", TZ);
        assert!(html.contains(
            "<img class=\"avatar\" src=\"https://lh3.googleusercontent.com/a/x?sz=64&amp;v=1\" alt=\"Ayrton\""
        ));
        assert!(html.contains("<span>Ayrton</span>"));
    }

    #[test]
    fn test_gate_page_has_no_race_data() {
        let html = gate_page();
        assert!(html.contains(GATE_MESSAGE));
        assert!(html.contains("/auth/google"));
        assert!(!html.contains("Cadastrar corrida"));
    }

    #[test]
    fn test_race_card_details() {
        let race = NewRace {
            name: "GP <Teste>".to_string(),
            location: "Kartódromo X".to_string(),
            race_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            race_time: Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap(),
            pix_key: "abc@pix".to_string(),
            price_per_person: Decimal::new(5050, 2),
            max_participants: 10,
            notification_emails: vec![],
        }
        .into_race(1, Utc::now());

        let html = race_list_page(&user(), &[race], "", TZ);
        assert!(html.contains("GP &lt;Teste&gt;"));
        assert!(html.contains("01 de junho"));
        assert!(html.contains("01 de junho de 2025"));
        assert!(html.contains("Horário: 14:00"));
        assert!(html.contains("Máximo de 10 participantes"));
        assert!(html.contains("R$ 50.50 por pessoa"));
        assert!(!html.contains(NO_RACES_MESSAGE));
    }

    #[test]
    fn test_empty_list_message() {
        let html = race_list_page(&user(), &[], "zzz", TZ);
        assert!(html.contains(NO_RACES_MESSAGE));
        assert!(html.contains("value=\"zzz\""));
    }

    #[test]
    fn test_details_step_carries_schedule_fields() {
        let mut form = RaceForm {
            name: Some("GP \"Teste\"".to_string()),
            location: Some("Kartódromo X".to_string()),
            race_date: Some("2025-06-01".to_string()),
            race_time: Some("14:00".to_string()),
            ..Default::default()
        };
        form.set_email_list(&["a@b.com".to_string()]);

        let html = wizard_page(&user(), WizardStep::Details, &form, &WizardMessages::default());
        assert!(html.contains("<input type=\"hidden\" name=\"name\" value=\"GP &quot;Teste&quot;\">"));
        assert!(html.contains("<input type=\"hidden\" name=\"raceDate\" value=\"2025-06-01\">"));
        assert!(html.contains("value=\"remove_email:a@b.com\""));
    }
}

// Builds the final auto-reply text from a template, the chosen delegate,
// the leave period and the user's identity.
pub mod template;

use crate::config::AppConfig;
use crate::directory::{Delegate, Directory};
use crate::form::{FormState, LeavePeriod};
use crate::i18n::Language;
use crate::identity::UserIdentity;
use chrono::NaiveDateTime;
use log::warn;
use std::collections::HashMap;
use template::{has_residual_tokens, substitute, MessageTemplate};

pub const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// `dd.MM.yyyy HH:mm`, the format used in messages and instructions.
pub fn format_display(instant: NaiveDateTime) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
}

impl ComposedMessage {
    /// Subject line, blank line, body.
    pub fn preview_text(&self, language: Language) -> String {
        format!(
            "{} {}\n\n{}",
            language.labels().subject_prefix,
            self.subject,
            self.body
        )
    }
}

/// Concrete values for every placeholder token.
struct Substitutions<'a> {
    start_date: String,
    end_date: String,
    delegate: &'a Delegate,
    identity: &'a UserIdentity,
    company: &'a str,
}

impl Substitutions<'_> {
    fn apply(&self, text: &str) -> String {
        let pairs = [
            ("{startDate}", self.start_date.as_str()),
            ("{endDate}", self.end_date.as_str()),
            ("{colleagueName}", self.delegate.name.as_str()),
            ("{email}", self.delegate.email.as_str()),
            ("{phone}", self.delegate.phone.as_str()),
            ("{userName}", self.identity.display_name.as_str()),
            ("{position}", self.identity.job_title.as_str()),
            ("{company}", self.company),
        ];
        substitute(text, &pairs)
    }
}

pub fn compose(
    template: &MessageTemplate,
    delegate: &Delegate,
    start: NaiveDateTime,
    end: NaiveDateTime,
    identity: &UserIdentity,
    company: &str,
) -> ComposedMessage {
    let subs = Substitutions {
        start_date: format_display(start),
        end_date: format_display(end),
        delegate,
        identity,
        company,
    };
    ComposedMessage {
        subject: subs.apply(&template.subject),
        body: subs.apply(&template.body),
    }
}

/// Composes the message that will actually be applied.
pub fn compose_for_period(
    template: &MessageTemplate,
    delegate: &Delegate,
    period: &LeavePeriod,
    identity: &UserIdentity,
    company: &str,
) -> ComposedMessage {
    let message = compose(template, delegate, period.start(), period.end(), identity, company);
    if has_residual_tokens(&message.subject) || has_residual_tokens(&message.body) {
        warn!("Composed message still contains placeholder tokens");
    }
    message
}

/// One template per language, built-in unless overridden in config.
#[derive(Debug, Clone)]
pub struct Templates {
    by_language: HashMap<Language, MessageTemplate>,
}

impl Templates {
    pub fn builtin() -> Self {
        Self {
            by_language: Language::ALL
                .into_iter()
                .map(|lang| (lang, MessageTemplate::builtin(lang)))
                .collect(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            by_language: Language::ALL
                .into_iter()
                .map(|lang| {
                    let path = config.template_path(lang).map(|p| p.as_path());
                    (lang, MessageTemplate::load_or_builtin(lang, path))
                })
                .collect(),
        }
    }

    pub fn get(&self, language: Language) -> MessageTemplate {
        self.by_language
            .get(&language)
            .cloned()
            .unwrap_or_else(|| MessageTemplate::builtin(language))
    }
}

/// Live preview for the current form. Anything short of a complete,
/// parsable form with a known delegate shows the "fields incomplete" text.
/// The range order is not checked here; that is left to submission.
pub fn render_preview(
    form: &FormState,
    directory: &Directory,
    templates: &Templates,
    language: Language,
    company: &str,
) -> String {
    let incomplete = language.labels().preview_incomplete.to_string();
    let Ok((start, end)) = form.instants() else {
        return incomplete;
    };
    let Some(delegate) = form.delegate_id.and_then(|id| directory.find(id)) else {
        return incomplete;
    };
    compose(
        &templates.get(language),
        delegate,
        start,
        end,
        &UserIdentity::placeholder(),
        company,
    )
    .preview_text(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_form() -> FormState {
        FormState {
            delegate_id: Some(1),
            start_date: "2024-06-10".to_string(),
            start_time: "09:00".to_string(),
            end_date: "2024-06-17".to_string(),
            end_time: "18:00".to_string(),
        }
    }

    fn preview(form: &FormState, language: Language) -> String {
        render_preview(
            form,
            &Directory::load(None),
            &Templates::builtin(),
            language,
            "Öztiryakiler",
        )
    }

    #[test]
    fn turkish_preview_contains_delegate_and_dates() {
        let text = preview(&scenario_form(), Language::Tr);
        assert!(text.starts_with("Konu: Otomatik Yanıt: Yıllık İzin"));
        for expected in [
            "Ahmet Yılmaz",
            "ahmet.yilmaz@ozturyakiler.com.tr",
            "+90 212 555 0101",
            "10.06.2024 09:00",
            "17.06.2024 18:00",
            "Kullanıcı Adı",
            "Öztiryakiler",
        ] {
            assert!(text.contains(expected), "preview missing {expected}");
        }
        assert!(!has_residual_tokens(&text));
    }

    #[test]
    fn english_preview_uses_english_template() {
        let text = preview(&scenario_form(), Language::En);
        assert!(text.starts_with("Subject: Automatic Reply: Annual Leave"));
        assert!(text.contains("Dear Sir/Madam"));
        assert!(!text.contains("Sayın Yetkili"));
        assert!(!has_residual_tokens(&text));
    }

    #[test]
    fn incomplete_preview_is_the_same_whatever_is_missing() {
        let expected = Language::Tr.labels().preview_incomplete;
        let mut no_delegate = scenario_form();
        no_delegate.delegate_id = None;
        let mut unknown_delegate = scenario_form();
        unknown_delegate.delegate_id = Some(99);
        let mut no_end_time = scenario_form();
        no_end_time.end_time.clear();
        let mut bad_date = scenario_form();
        bad_date.start_date = "10/06/2024".to_string();

        for form in [no_delegate, unknown_delegate, no_end_time, bad_date] {
            assert_eq!(preview(&form, Language::Tr), expected);
        }
    }

    #[test]
    fn composed_message_uses_resolved_identity() {
        let directory = Directory::load(None);
        let delegate = directory.find(2).unwrap();
        let period = scenario_form().validate().unwrap().period;
        let message = compose_for_period(
            &MessageTemplate::builtin(Language::En),
            delegate,
            &period,
            &UserIdentity::fallback(),
            "Acme",
        );
        assert!(message.body.contains("Fatma Demir"));
        assert!(message.body.contains("Kullanıcı\nPozisyon\nAcme"));
        assert!(!has_residual_tokens(&message.subject));
        assert!(!has_residual_tokens(&message.body));
    }

    #[test]
    fn configured_template_file_replaces_builtin_for_its_language() {
        let dir = std::env::temp_dir().join(format!("auto-reply-templates-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("en.txt");
        std::fs::write(
            &path,
            "Subject: Away until {endDate}\n---\nPlease contact {colleagueName} ({email}).\n{userName}",
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.templates.insert("en".to_string(), path);
        let templates = Templates::from_config(&config);
        std::fs::remove_dir_all(&dir).ok();

        let english = templates.get(Language::En);
        assert_eq!(english.subject, "Away until {endDate}");
        assert_eq!(english.body, "Please contact {colleagueName} ({email}).\n{userName}");
        assert_eq!(templates.get(Language::Tr), MessageTemplate::builtin(Language::Tr));

        let text = render_preview(
            &scenario_form(),
            &Directory::load(None),
            &templates,
            Language::En,
            "Öztiryakiler",
        );
        assert_eq!(
            text,
            "Subject: Away until 17.06.2024 18:00\n\n\
             Please contact Ahmet Yılmaz (ahmet.yilmaz@ozturyakiler.com.tr).\nKullanıcı Adı"
        );
    }
}

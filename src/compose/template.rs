use crate::i18n::Language;
use log::warn;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template file '{path}': {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("Template format error: Missing 'Subject:' line or '---' separator")]
    FormatError,
}

/// Placeholder tokens, in the order they are substituted.
pub const TOKENS: [&str; 8] = [
    "{startDate}",
    "{endDate}",
    "{colleagueName}",
    "{email}",
    "{phone}",
    "{userName}",
    "{position}",
    "{company}",
];

// Upper bound on substitution passes; a value that embeds its own token
// would otherwise keep growing the string.
const MAX_PASSES: usize = 8;

/// Subject and body of an auto-reply, before placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    pub fn builtin(language: Language) -> Self {
        match language {
            Language::Tr => Self {
                subject: "Otomatik Yanıt: Yıllık İzin / Automatic Reply: Annual Leave".to_string(),
                body: format!("{TR_BODY}\n\n---\n\n{EN_BODY}"),
            },
            Language::En => Self {
                subject: "Automatic Reply: Annual Leave".to_string(),
                body: EN_BODY.to_string(),
            },
        }
    }

    /// Loads and parses a message template from a file.
    /// Expects format:
    /// Subject: <subject>
    /// ---
    /// <body>
    pub fn load(template_path: &Path) -> Result<Self, TemplateError> {
        let content = fs::read_to_string(template_path).map_err(|e| TemplateError::ReadError {
            path: template_path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, TemplateError> {
        let mut lines = content.lines();
        let subject_line = lines.next().ok_or(TemplateError::FormatError)?;
        let separator = lines.next().ok_or(TemplateError::FormatError)?;

        if !subject_line.starts_with("Subject:") || separator.trim() != "---" {
            return Err(TemplateError::FormatError);
        }

        Ok(Self {
            subject: subject_line.trim_start_matches("Subject:").trim().to_string(),
            body: lines.collect::<Vec<&str>>().join("\n"),
        })
    }

    /// Loads the override at `path` if given, falling back to the built-in
    /// template when it is missing or malformed.
    pub fn load_or_builtin(language: Language, path: Option<&Path>) -> Self {
        match path.map(Self::load) {
            Some(Ok(template)) => template,
            Some(Err(e)) => {
                warn!("Using built-in '{}' template: {}", language, e);
                Self::builtin(language)
            }
            None => Self::builtin(language),
        }
    }
}

/// Replaces every occurrence of each token with its value, repeating the
/// whole pass until the text stops changing.
pub fn substitute(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        let next = pairs
            .iter()
            .fold(current.clone(), |acc, (token, value)| acc.replace(token, value));
        if next == current {
            return next;
        }
        current = next;
    }
    warn!("Placeholder substitution did not settle after {} passes", MAX_PASSES);
    current
}

/// True if any known placeholder token is still present.
pub fn has_residual_tokens(text: &str) -> bool {
    TOKENS.iter().any(|token| text.contains(token))
}

const TR_BODY: &str = "Sayın Yetkili,

E-postanız için teşekkür ederim. {startDate} – {endDate} tarihleri arasında yıllık izinde olacağım ve bu süre içinde e-postalarınıza yanıt veremeyeceğim.

Acil konularınız için {colleagueName} ile {email} veya {phone} üzerinden iletişime geçebilirsiniz.

Anlayışınız için teşekkür eder, iyi çalışmalar dilerim.

Saygılarımla,
{userName}
{position}
{company}";

const EN_BODY: &str = "Dear Sir/Madam,

Thank you for your email. I will be out of the office on annual leave from {startDate} to {endDate}, and will not be able to respond to your message during this period.

For urgent matters, please contact {colleagueName} at {email} or {phone}.

Thank you for your understanding.

Kind regards,
{userName}
{position}
{company}";

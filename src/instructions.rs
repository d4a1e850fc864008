// src/instructions.rs
use crate::compose::format_display;
use crate::form::LeavePeriod;
use crate::i18n::Language;

/// Step-by-step guide for setting the auto-reply by hand, shown when the
/// remote apply could not be done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualInstructions {
    pub language: Language,
    pub start: String,
    pub end: String,
    /// The exact text to paste; this is what the copy button copies.
    pub message: String,
}

impl ManualInstructions {
    pub fn new(language: Language, period: &LeavePeriod, message: &str) -> Self {
        Self {
            language,
            start: format_display(period.start()),
            end: format_display(period.end()),
            message: message.to_string(),
        }
    }

    /// The whole panel as plain text, steps in order.
    pub fn to_plain_text(&self) -> String {
        let labels = self.language.labels();
        let mut out = String::new();
        for (index, step) in labels.instruction_steps.iter().enumerate() {
            out.push_str(step.title);
            out.push('\n');
            out.push_str(step.text);
            out.push('\n');
            match index {
                2 => {
                    out.push_str(&format!("{} {}\n", labels.start_label, self.start));
                    out.push_str(&format!("{} {}\n", labels.end_label, self.end));
                }
                3 => {
                    out.push('\n');
                    out.push_str(&self.message);
                    out.push('\n');
                }
                _ => {}
            }
            out.push('\n');
        }
        out
    }
}

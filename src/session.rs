// src/session.rs
use crate::form::{FormState, ValidForm, ValidationError};
use crate::i18n::{Labels, Language};
use crate::instructions::ManualInstructions;
use crate::submission::SubmissionOutcome;
use log::debug;
use std::time::{Duration, Instant};

pub const STATUS_VISIBLE_FOR: Duration = Duration::from_secs(8);

/// Where the submit control is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    shown_at: Instant,
}

impl StatusMessage {
    fn new(kind: StatusKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            shown_at: Instant::now(),
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= STATUS_VISIBLE_FOR
    }
}

/// Returned when a submission is requested while one is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

/// All per-window state: the form, the active language and the submit cycle.
#[derive(Debug, Clone)]
pub struct SessionState {
    language: Language,
    pub form: FormState,
    phase: SubmitPhase,
    status: Option<StatusMessage>,
    instructions: Option<ManualInstructions>,
}

impl SessionState {
    pub fn new(language: Language, form: FormState) -> Self {
        Self {
            language,
            form,
            phase: SubmitPhase::Idle,
            status: None,
            instructions: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn labels(&self) -> &'static Labels {
        self.language.labels()
    }

    pub fn set_language(&mut self, language: Language) {
        if self.language != language {
            debug!("Language switched to {}", language);
            self.language = language;
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase == SubmitPhase::Idle
    }

    pub fn submit_label(&self) -> &'static str {
        match self.phase {
            SubmitPhase::Submitting => self.labels().submit_busy,
            SubmitPhase::Idle | SubmitPhase::Validating => self.labels().submit,
        }
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Drops the status line once it has been visible long enough.
    pub fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| s.expired(now)) {
            self.status = None;
        }
    }

    pub fn instructions(&self) -> Option<&ManualInstructions> {
        self.instructions.as_ref()
    }

    pub fn close_instructions(&mut self) {
        self.instructions = None;
    }

    /// Idle → Validating → (Idle with an error shown | Submitting).
    /// `validate` decides; on rejection nothing else changes.
    pub fn begin_submit<F>(&mut self, validate: F) -> Result<Option<ValidForm>, Busy>
    where
        F: FnOnce(&FormState) -> Result<ValidForm, ValidationError>,
    {
        if self.phase != SubmitPhase::Idle {
            return Err(Busy);
        }
        self.phase = SubmitPhase::Validating;
        match validate(&self.form) {
            Ok(valid) => {
                debug!("Validation passed, submitting");
                self.phase = SubmitPhase::Submitting;
                Ok(Some(valid))
            }
            Err(e) => {
                debug!("Validation failed: {}", e);
                self.record_outcome(SubmissionOutcome::Rejected(e));
                self.phase = SubmitPhase::Idle;
                Ok(None)
            }
        }
    }

    /// Shows the user-facing result of a submission.
    pub fn record_outcome(&mut self, outcome: SubmissionOutcome) {
        let labels = self.labels();
        self.status = Some(match outcome {
            SubmissionOutcome::Applied => StatusMessage::new(StatusKind::Success, labels.applied),
            SubmissionOutcome::InstructionsShown(instructions) => {
                self.instructions = Some(instructions);
                StatusMessage::new(StatusKind::Info, labels.instructions_shown)
            }
            SubmissionOutcome::Rejected(e) => {
                StatusMessage::new(StatusKind::Error, rejection_text(labels, &e))
            }
        });
    }

    /// Back to Idle; runs on every exit path of a submission.
    pub fn finish_submit(&mut self) {
        debug!("Submit control restored (was {:?})", self.phase);
        self.phase = SubmitPhase::Idle;
    }
}

pub fn rejection_text(labels: &'static Labels, error: &ValidationError) -> &'static str {
    match error {
        ValidationError::Incomplete => labels.err_incomplete,
        ValidationError::InvalidDateTime(_) => labels.err_invalid_datetime,
        ValidationError::EndNotAfterStart { .. } => labels.err_end_before_start,
    }
}

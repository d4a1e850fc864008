// src/submission.rs
use crate::compose::{compose_for_period, Templates};
use crate::directory::Directory;
use crate::form::{FormState, ValidForm, ValidationError};
use crate::i18n::Language;
use crate::identity::{resolve_or_default, IdentityProvider};
use crate::instructions::ManualInstructions;
use crate::mailbox::auth::{AuthError, TokenSource};
use crate::mailbox::{ApplyError, MailboxSettingsClient, MailboxSettingsPatch};
use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The remote mailbox accepted the settings.
    Applied,
    /// The user has to finish the setup by hand.
    InstructionsShown(ManualInstructions),
    /// Nothing was attempted.
    Rejected(ValidationError),
}

// Why the remote apply did not happen; always routed to manual instructions.
#[derive(Error, Debug)]
enum RemoteApplyFailure {
    #[error("credential unavailable: {0}")]
    Auth(#[from] AuthError),
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),
}

/// Everything a submission needs besides the form and the host services.
#[derive(Debug, Clone)]
pub struct Composer {
    pub directory: Directory,
    pub templates: Templates,
    pub company: String,
    pub time_zone: String,
}

impl Composer {
    /// Form validation plus a check that the delegate still exists.
    pub fn validate(&self, form: &FormState) -> Result<ValidForm, ValidationError> {
        let valid = form.validate()?;
        if self.directory.find(valid.delegate_id).is_none() {
            return Err(ValidationError::Incomplete);
        }
        Ok(valid)
    }

    /// Resolves the identity, composes the message and tries to apply it.
    /// Any failure past validation ends in manual instructions.
    pub async fn apply<I, T, M>(
        &self,
        valid: ValidForm,
        language: Language,
        identity: &I,
        tokens: &T,
        mailbox: &M,
    ) -> SubmissionOutcome
    where
        I: IdentityProvider,
        T: TokenSource,
        M: MailboxSettingsClient,
    {
        let Some(delegate) = self.directory.find(valid.delegate_id) else {
            return SubmissionOutcome::Rejected(ValidationError::Incomplete);
        };

        let user = resolve_or_default(identity).await;
        let message = compose_for_period(
            &self.templates.get(language),
            delegate,
            &valid.period,
            &user,
            &self.company,
        );
        debug!("Composed auto-reply '{}' for {}", message.subject, delegate.name);

        let patch = MailboxSettingsPatch::scheduled(&valid.period, &self.time_zone, &message.body);
        match apply_remote(tokens, mailbox, &patch).await {
            Ok(()) => {
                info!("Auto-reply applied with {} as contact", delegate.name);
                SubmissionOutcome::Applied
            }
            Err(e) => {
                warn!("Showing manual instructions: {}", e);
                let instructions = ManualInstructions::new(language, &valid.period, &message.body);
                debug!("Manual instructions:\n{}", instructions.to_plain_text());
                SubmissionOutcome::InstructionsShown(instructions)
            }
        }
    }
}

async fn apply_remote<T, M>(
    tokens: &T,
    mailbox: &M,
    patch: &MailboxSettingsPatch,
) -> Result<(), RemoteApplyFailure>
where
    T: TokenSource,
    M: MailboxSettingsClient,
{
    let token = tokens.access_token().await?;
    mailbox.apply(&token, patch).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::template::has_residual_tokens;
    use crate::identity::{IdentityError, UserIdentity};
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedIdentity(Option<UserIdentity>);

    impl IdentityProvider for FixedIdentity {
        async fn resolve(&self) -> Result<UserIdentity, IdentityError> {
            self.0.clone().ok_or(IdentityError::Unavailable)
        }
    }

    struct FakeTokens {
        token: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeTokens {
        fn granting() -> Self {
            Self { token: Some("secret"), calls: AtomicUsize::new(0) }
        }

        fn unavailable() -> Self {
            Self { token: None, calls: AtomicUsize::new(0) }
        }
    }

    impl TokenSource for FakeTokens {
        async fn access_token(&self) -> Result<SecretString, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token
                .map(|t| SecretString::new(t.into()))
                .ok_or(AuthError::Unavailable)
        }
    }

    struct FakeMailbox {
        status: Option<u16>,
        seen: Mutex<Vec<(String, MailboxSettingsPatch)>>,
    }

    impl FakeMailbox {
        fn responding(status: u16) -> Self {
            Self { status: Some(status), seen: Mutex::new(Vec::new()) }
        }

        fn unreachable() -> Self {
            Self { status: None, seen: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl MailboxSettingsClient for FakeMailbox {
        async fn apply(
            &self,
            token: &SecretString,
            settings: &MailboxSettingsPatch,
        ) -> Result<(), ApplyError> {
            self.seen
                .lock()
                .unwrap()
                .push((token.expose_secret().to_string(), settings.clone()));
            match self.status {
                Some(code) if (200..300).contains(&code) => Ok(()),
                Some(code) => Err(ApplyError::Status { status: code, body: String::new() }),
                None => Err(ApplyError::Transport("connection refused".to_string())),
            }
        }
    }

    async fn submit<I, T, M>(
        state: &FormState,
        language: Language,
        identity: &I,
        tokens: &T,
        mailbox: &M,
    ) -> SubmissionOutcome
    where
        I: IdentityProvider,
        T: TokenSource,
        M: MailboxSettingsClient,
    {
        let composer = composer();
        match composer.validate(state) {
            Ok(valid) => composer.apply(valid, language, identity, tokens, mailbox).await,
            Err(e) => SubmissionOutcome::Rejected(e),
        }
    }

    fn composer() -> Composer {
        Composer {
            directory: Directory::load(None),
            templates: Templates::builtin(),
            company: "Öztiryakiler".to_string(),
            time_zone: "Turkey Standard Time".to_string(),
        }
    }

    fn form(start: (&str, &str), end: (&str, &str)) -> FormState {
        FormState {
            delegate_id: Some(1),
            start_date: start.0.to_string(),
            start_time: start.1.to_string(),
            end_date: end.0.to_string(),
            end_time: end.1.to_string(),
        }
    }

    fn valid_form() -> FormState {
        form(("2024-06-10", "09:00"), ("2024-06-17", "18:00"))
    }

    fn profile() -> FixedIdentity {
        FixedIdentity(Some(UserIdentity {
            display_name: "Deniz Aydın".to_string(),
            email_address: "deniz@oztiryakiler.com.tr".to_string(),
            job_title: "Satın Alma Uzmanı".to_string(),
        }))
    }

    #[tokio::test]
    async fn successful_patch_is_applied() {
        let tokens = FakeTokens::granting();
        let mailbox = FakeMailbox::responding(200);
        let outcome = submit(&valid_form(), Language::Tr, &profile(), &tokens, &mailbox)
            .await;
        assert_eq!(outcome, SubmissionOutcome::Applied);

        let seen = mailbox.seen.lock().unwrap();
        let (token, patch) = &seen[0];
        assert_eq!(token, "secret");
        let setting = &patch.automatic_replies_setting;
        assert_eq!(setting.scheduled_start_date_time.date_time, "2024-06-10T09:00:00");
        assert_eq!(setting.scheduled_end_date_time.time_zone, "Turkey Standard Time");
        assert_eq!(setting.internal_reply_message, setting.external_reply_message);
        assert!(setting.internal_reply_message.contains("Deniz Aydın"));
        assert!(setting.internal_reply_message.contains("Satın Alma Uzmanı"));
        assert!(!has_residual_tokens(&setting.internal_reply_message));
    }

    #[tokio::test]
    async fn equal_instants_are_rejected_without_remote_calls() {
        let tokens = FakeTokens::granting();
        let mailbox = FakeMailbox::responding(200);
        let outcome = submit(
            &form(("2024-06-10", "09:00"), ("2024-06-10", "09:00")),
            Language::Tr,
            &profile(),
            &tokens,
            &mailbox,
        )
        .await;
        assert!(matches!(
            outcome,
            SubmissionOutcome::Rejected(ValidationError::EndNotAfterStart { .. })
        ));
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
        assert_eq!(mailbox.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_delegate_is_rejected() {
        let mut state = valid_form();
        state.delegate_id = Some(404);
        let mailbox = FakeMailbox::responding(200);
        let outcome = submit(&state, Language::En, &profile(), &FakeTokens::granting(), &mailbox)
            .await;
        assert_eq!(outcome, SubmissionOutcome::Rejected(ValidationError::Incomplete));
        assert_eq!(mailbox.calls(), 0);
    }

    #[tokio::test]
    async fn missing_auth_capability_shows_instructions() {
        let mailbox = FakeMailbox::responding(200);
        let outcome = submit(&valid_form(), Language::Tr, &profile(), &FakeTokens::unavailable(), &mailbox)
            .await;
        let SubmissionOutcome::InstructionsShown(instructions) = outcome else {
            panic!("expected instructions, got {outcome:?}");
        };
        assert_eq!(instructions.start, "10.06.2024 09:00");
        assert_eq!(instructions.end, "17.06.2024 18:00");
        assert!(instructions.message.contains("Ahmet Yılmaz"));
        assert_eq!(mailbox.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_patch_shows_instructions() {
        for mailbox in [FakeMailbox::responding(403), FakeMailbox::unreachable()] {
            let outcome = submit(&valid_form(), Language::En, &profile(), &FakeTokens::granting(), &mailbox)
            .await;
            assert!(matches!(outcome, SubmissionOutcome::InstructionsShown(_)));
            assert_eq!(mailbox.calls(), 1);
        }
    }

    #[tokio::test]
    async fn identity_failure_uses_default_identity() {
        let outcome = submit(
            &valid_form(),
            Language::En,
            &FixedIdentity(None),
            &FakeTokens::unavailable(),
            &FakeMailbox::responding(200),
        )
        .await;
        let SubmissionOutcome::InstructionsShown(instructions) = outcome else {
            panic!("expected instructions, got {outcome:?}");
        };
        let fallback = UserIdentity::fallback();
        assert!(instructions.message.contains(&fallback.display_name));
        assert!(instructions.message.contains(&fallback.job_title));
    }

    #[tokio::test]
    async fn every_valid_range_reaches_a_terminal_outcome() {
        let ranges = [
            (("2024-06-10", "09:00"), ("2024-06-10", "09:01")),
            (("2024-12-31", "23:59"), ("2025-01-01", "00:00")),
            (("2024-02-28", "08:00"), ("2024-03-01", "08:00")),
        ];
        for (start, end) in ranges {
            let outcome = submit(
                &form(start, end),
                Language::Tr,
                &profile(),
                &FakeTokens::granting(),
                &FakeMailbox::responding(204),
            )
            .await;
            assert_eq!(outcome, SubmissionOutcome::Applied);
        }
    }
}

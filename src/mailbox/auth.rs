// src/mailbox/auth.rs

use crate::config::{project_dirs, AuthConfig, AuthMode};
use log::{debug, info, trace};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use yup_oauth2::authenticator_delegate::InstalledFlowDelegate;
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth capability is not available")]
    Unavailable,
    #[error("Credential request was denied: {0}")]
    Denied(String),
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("Authenticator setup failed: {0}")]
    Setup(#[from] std::io::Error),
}

/// One-shot source of a bearer credential for the mailbox settings call.
pub trait TokenSource {
    fn access_token(&self) -> impl Future<Output = Result<SecretString, AuthError>> + Send;
}

/// A token handed over through configuration or the environment.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: Option<SecretString>,
}

impl StaticToken {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }
}

impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<SecretString, AuthError> {
        match &self.token {
            Some(token) if !token.expose_secret().trim().is_empty() => Ok(token.clone()),
            _ => Err(AuthError::Unavailable),
        }
    }
}

/// A token stored in the platform keyring.
#[derive(Debug, Clone)]
pub struct KeyringToken {
    service: String,
    user: String,
}

impl KeyringToken {
    pub fn new(service: &str, user: &str) -> Self {
        Self {
            service: service.to_string(),
            user: user.to_string(),
        }
    }

    fn read(&self) -> Result<SecretString, AuthError> {
        let entry = keyring::Entry::new(&self.service, &self.user)?;
        match entry.get_password() {
            Ok(password) => Ok(SecretString::new(password.into())),
            Err(keyring::Error::NoEntry) => Err(AuthError::Unavailable),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenSource for KeyringToken {
    async fn access_token(&self) -> Result<SecretString, AuthError> {
        let source = self.clone();
        // keyring backends block on platform IPC
        tokio::task::spawn_blocking(move || source.read())
            .await
            .map_err(|e| AuthError::Denied(format!("keyring task failed: {}", e)))?
    }
}

/// OAuth2 installed-app flow against the Microsoft identity platform,
/// signing in through the system browser.
#[derive(Clone)]
pub struct InteractiveToken {
    secret: ApplicationSecret,
    scopes: Vec<String>,
    cache_path: Option<PathBuf>,
}

impl InteractiveToken {
    pub fn new(config: &AuthConfig) -> Self {
        let base = format!("https://login.microsoftonline.com/{}/oauth2/v2.0", config.tenant);
        let secret = ApplicationSecret {
            client_id: config.client_id.clone(),
            client_secret: config
                .client_secret
                .as_ref()
                .map(|s| s.expose_secret().to_string())
                .unwrap_or_default(),
            auth_uri: format!("{}/authorize", base),
            token_uri: format!("{}/token", base),
            redirect_uris: vec!["http://localhost".to_string()],
            ..Default::default()
        };
        let cache_path = project_dirs().map(|dirs| dirs.cache_dir().join("graph_tokens.json"));
        Self {
            secret,
            scopes: config.scopes.clone(),
            cache_path,
        }
    }
}

impl TokenSource for InteractiveToken {
    async fn access_token(&self) -> Result<SecretString, AuthError> {
        if self.secret.client_id.is_empty() {
            return Err(AuthError::Unavailable);
        }

        let mut builder = InstalledFlowAuthenticator::builder(
            self.secret.clone(),
            InstalledFlowReturnMethod::HTTPRedirect,
        )
        .flow_delegate(Box::new(BrowserDelegate));
        if let Some(path) = &self.cache_path {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            builder = builder.persist_tokens_to_disk(path.clone());
        }
        let authenticator = builder.build().await?;

        info!("Requesting Graph token for scopes {:?}", self.scopes);
        let token = authenticator
            .token(self.scopes.as_slice())
            .await
            .map_err(|e| AuthError::Denied(e.to_string()))?;
        let value = token
            .token()
            .ok_or_else(|| AuthError::Denied("no access token in response".to_string()))?;
        Ok(SecretString::new(value.into()))
    }
}

// Opens the sign-in page instead of printing it to stdout.
struct BrowserDelegate;

impl InstalledFlowDelegate for BrowserDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            if need_code {
                return Err("manual code entry is not supported".to_string());
            }
            trace!("Opening sign-in URL: {}", url);
            webbrowser::open(url).map_err(|e| format!("could not open browser: {}", e))?;
            Ok(String::new())
        })
    }
}

/// The token source selected by `auth.mode`.
#[derive(Clone)]
pub enum ConfiguredTokenSource {
    Interactive(InteractiveToken),
    Keyring(KeyringToken),
    Static(StaticToken),
    Unavailable,
}

impl ConfiguredTokenSource {
    pub fn from_config(config: &AuthConfig) -> Self {
        debug!("Auth mode: {:?}", config.mode);
        match config.mode {
            AuthMode::Interactive => Self::Interactive(InteractiveToken::new(config)),
            AuthMode::Keyring => {
                Self::Keyring(KeyringToken::new(&config.keyring_service, &config.keyring_user))
            }
            AuthMode::Token => Self::Static(StaticToken::new(config.access_token.clone())),
            AuthMode::None => Self::Unavailable,
        }
    }
}

impl TokenSource for ConfiguredTokenSource {
    async fn access_token(&self) -> Result<SecretString, AuthError> {
        match self {
            Self::Interactive(source) => source.access_token().await,
            Self::Keyring(source) => source.access_token().await,
            Self::Static(source) => source.access_token().await,
            Self::Unavailable => Err(AuthError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned() {
        let source = StaticToken::new(Some(SecretString::new("abc".into())));
        let token = source.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }

    #[tokio::test]
    async fn blank_static_token_is_unavailable() {
        let source = StaticToken::new(Some(SecretString::new(" ".into())));
        assert!(matches!(source.access_token().await, Err(AuthError::Unavailable)));
        assert!(matches!(
            StaticToken::new(None).access_token().await,
            Err(AuthError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn mode_none_has_no_capability() {
        let source = ConfiguredTokenSource::from_config(&AuthConfig::default());
        assert!(matches!(source, ConfiguredTokenSource::Unavailable));
        assert!(matches!(source.access_token().await, Err(AuthError::Unavailable)));
    }

    #[tokio::test]
    async fn interactive_without_client_id_is_unavailable() {
        let config = AuthConfig {
            mode: AuthMode::Interactive,
            ..Default::default()
        };
        let source = ConfiguredTokenSource::from_config(&config);
        assert!(matches!(source.access_token().await, Err(AuthError::Unavailable)));
    }

    #[test]
    fn interactive_targets_tenant_endpoints() {
        let config = AuthConfig {
            mode: AuthMode::Interactive,
            client_id: "client".to_string(),
            tenant: "contoso".to_string(),
            ..Default::default()
        };
        let source = InteractiveToken::new(&config);
        assert_eq!(
            source.secret.auth_uri,
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/authorize"
        );
        assert_eq!(
            source.secret.token_uri,
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
    }
}

// src/identity.rs
use crate::config::ProfileConfig;
use log::{debug, warn};
use std::future::Future;
use thiserror::Error;

pub const DEFAULT_POSITION: &str = "Pozisyon";

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("No user profile is available")]
    Unavailable,
}

/// Display identity of the user whose auto-reply is being set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub display_name: String,
    pub email_address: String,
    pub job_title: String,
}

impl UserIdentity {
    /// Used when the profile cannot be resolved.
    pub fn fallback() -> Self {
        Self {
            display_name: "Kullanıcı".to_string(),
            email_address: "user@oztiryakiler.com.tr".to_string(),
            job_title: DEFAULT_POSITION.to_string(),
        }
    }

    /// Shown in the live preview before any profile lookup.
    pub fn placeholder() -> Self {
        Self {
            display_name: "Kullanıcı Adı".to_string(),
            email_address: String::new(),
            job_title: DEFAULT_POSITION.to_string(),
        }
    }
}

/// One-shot lookup of the current user's identity.
pub trait IdentityProvider {
    fn resolve(&self) -> impl Future<Output = Result<UserIdentity, IdentityError>> + Send;
}

/// Resolves the identity and substitutes the fallback on any failure.
pub async fn resolve_or_default<P: IdentityProvider>(provider: &P) -> UserIdentity {
    match provider.resolve().await {
        Ok(identity) => {
            debug!("Resolved user identity for {}", identity.email_address);
            identity
        }
        Err(e) => {
            warn!("Falling back to default identity: {}", e);
            UserIdentity::fallback()
        }
    }
}

/// Reads the identity from the `[profile]` configuration section.
#[derive(Debug, Clone)]
pub struct ProfileIdentity {
    profile: ProfileConfig,
}

impl ProfileIdentity {
    pub fn new(profile: ProfileConfig) -> Self {
        Self { profile }
    }
}

impl IdentityProvider for ProfileIdentity {
    async fn resolve(&self) -> Result<UserIdentity, IdentityError> {
        let display_name = non_blank(self.profile.display_name.as_deref())
            .ok_or(IdentityError::Unavailable)?;
        let fallback = UserIdentity::fallback();
        Ok(UserIdentity {
            display_name: display_name.to_string(),
            email_address: non_blank(self.profile.email_address.as_deref())
                .map(str::to_string)
                .unwrap_or(fallback.email_address),
            job_title: non_blank(self.profile.job_title.as_deref())
                .map(str::to_string)
                .unwrap_or(fallback.job_title),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// src/mailbox/mod.rs
pub mod auth;

use crate::form::LeavePeriod;
use chrono::NaiveDateTime;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use log::{debug, info, trace};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to build request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("TLS setup failed: {0}")]
    Tls(#[from] std::io::Error),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("No response within {0:?}")]
    Timeout(Duration),
    #[error("Mailbox settings endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoReplyStatus {
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalAudience {
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    fn new(instant: NaiveDateTime, time_zone: &str) -> Self {
        Self {
            date_time: instant.format(GRAPH_DATETIME_FORMAT).to_string(),
            time_zone: time_zone.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticRepliesSetting {
    pub status: AutoReplyStatus,
    pub external_audience: ExternalAudience,
    pub scheduled_start_date_time: DateTimeTimeZone,
    pub scheduled_end_date_time: DateTimeTimeZone,
    pub internal_reply_message: String,
    pub external_reply_message: String,
}

/// Body of the PATCH sent to the mailbox settings endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSettingsPatch {
    pub automatic_replies_setting: AutomaticRepliesSetting,
}

impl MailboxSettingsPatch {
    /// Scheduled reply for everyone, same text inside and outside the organization.
    pub fn scheduled(period: &LeavePeriod, time_zone: &str, message: &str) -> Self {
        Self {
            automatic_replies_setting: AutomaticRepliesSetting {
                status: AutoReplyStatus::Scheduled,
                external_audience: ExternalAudience::All,
                scheduled_start_date_time: DateTimeTimeZone::new(period.start(), time_zone),
                scheduled_end_date_time: DateTimeTimeZone::new(period.end(), time_zone),
                internal_reply_message: message.to_string(),
                external_reply_message: message.to_string(),
            },
        }
    }
}

/// Applies automatic-reply settings to the remote mailbox.
pub trait MailboxSettingsClient {
    fn apply(
        &self,
        token: &SecretString,
        settings: &MailboxSettingsPatch,
    ) -> impl Future<Output = Result<(), ApplyError>> + Send;
}

/// Microsoft Graph `me/mailboxSettings`.
#[derive(Debug, Clone)]
pub struct GraphMailboxClient {
    endpoint: String,
    timeout: Option<Duration>,
}

impl GraphMailboxClient {
    pub fn new(endpoint: &str, timeout_secs: Option<u64>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout: timeout_secs.map(Duration::from_secs),
        }
    }

    fn build_request(
        &self,
        token: &SecretString,
        settings: &MailboxSettingsPatch,
    ) -> Result<Request<Full<Bytes>>, ApplyError> {
        let body = serde_json::to_vec(settings)?;
        let request = Request::builder()
            .method(Method::PATCH)
            .uri(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))?;
        Ok(request)
    }
}

impl MailboxSettingsClient for GraphMailboxClient {
    async fn apply(
        &self,
        token: &SecretString,
        settings: &MailboxSettingsPatch,
    ) -> Result<(), ApplyError> {
        let request = self.build_request(token, settings)?;

        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_native_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .build();
        let client: Client<_, Full<Bytes>> = Client::builder(TokioExecutor::new()).build(https);

        info!("PATCH {}", self.endpoint);
        trace!("Settings payload: {:?}", settings);
        let call = client.request(request);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ApplyError::Timeout(limit))?,
            None => call.await,
        };
        let response = result.map_err(|e| ApplyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!("Mailbox settings updated ({})", status);
            return Ok(());
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();
        Err(ApplyError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

// File: crates/coffeechat_gcal/src/auth.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use coffeechat_config::GcalConfig;
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{
        authorized_user::AuthorizedUserSecret, read_service_account_key,
        AuthorizedUserAuthenticator, ServiceAccountAuthenticator,
    },
    CalendarHub,
};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Google credentials are empty")]
    EmptyCredentials,
    #[error("Google credentials are neither JSON nor base64-encoded JSON: {0}")]
    InvalidCredentials(String),
    #[error("Google credentials missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("No Google credentials configured (set gcal.credentials or gcal.key_path)")]
    NotConfigured,
    #[error("Google authentication setup failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Authorized-user credentials as exported by an installed-app OAuth flow.
///
/// A `token_uri` in the export is ignored; yup-oauth2 refreshes against Google's endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Deserialize, Default)]
struct RawCredentials {
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
}

impl GoogleCredentials {
    /// Parses credentials given as base64-encoded JSON or as raw JSON.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AuthError::EmptyCredentials);
        }

        let raw: RawCredentials = match STANDARD
            .decode(value)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        {
            Some(decoded) => decoded,
            None => serde_json::from_str(value)
                .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?,
        };

        let required = [
            ("refresh_token", &raw.refresh_token),
            ("client_id", &raw.client_id),
            ("client_secret", &raw.client_secret),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing));
        }

        Ok(Self {
            client_id: raw.client_id.unwrap_or_default(),
            client_secret: raw.client_secret.unwrap_or_default(),
            refresh_token: raw.refresh_token.unwrap_or_default(),
        })
    }

    pub(crate) fn into_secret(self) -> AuthorizedUserSecret {
        AuthorizedUserSecret {
            client_id: self.client_id,
            client_secret: self.client_secret,
            refresh_token: self.refresh_token,
            key_type: "authorized_user".to_string(),
        }
    }
}

/// Builds an authenticated Calendar hub.
///
/// Authorized-user credentials from `gcal.credentials` take precedence over a service
/// account key at `gcal.key_path`. Token refresh is left to the authenticator.
pub async fn create_calendar_hub(config: &GcalConfig) -> Result<HubType, AuthError> {
    let auth = match (config.credentials.as_deref(), config.key_path.as_deref()) {
        (Some(credentials), _) => {
            let credentials = GoogleCredentials::parse(credentials)?;
            info!("Using authorized-user Google credentials");
            AuthorizedUserAuthenticator::builder(credentials.into_secret())
                .build()
                .await?
        }
        (None, Some(key_path)) => {
            info!("Using service account key at {}", key_path);
            let sa_key = read_service_account_key(Path::new(key_path)).await?;
            ServiceAccountAuthenticator::builder(sa_key).build().await?
        }
        (None, None) => return Err(AuthError::NotConfigured),
    };

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    Ok(CalendarHub::new(client, auth))
}

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::OAuthSettings;

pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// Payload returned by the OAuth token endpoint for both the
/// `authorization_code` and `refresh_token` grants.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    settings: OAuthSettings,
}

impl OAuthClient {
    pub fn new(http: Client, settings: OAuthSettings) -> Self {
        Self { http, settings }
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let client_secret = self.client_secret()?;
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", client_secret),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ])
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let client_secret = self.client_secret()?;
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    pub fn authorization_url(&self) -> Result<String> {
        authorization_url(&self.settings)
    }

    fn client_secret(&self) -> Result<&str> {
        self.settings
            .client_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| anyhow!("GOOGLE_CLIENT_SECRET missing"))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let resp = self
            .http
            .post(&self.settings.token_url)
            .form(form)
            .send()
            .await
            .context("request OAuth token")?;

        let status = resp.status();
        let body = resp.text().await.context("read OAuth response")?;
        if !status.is_success() {
            return Err(anyhow!("oauth http {}: {}", status, body));
        }

        serde_json::from_str(&body).context("decode OAuth response")
    }
}

/// Google consent screen URL for the offline adwords grant.
pub fn authorization_url(settings: &OAuthSettings) -> Result<String> {
    let url = Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", settings.scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .with_context(|| format!("invalid auth url {}", settings.auth_url))?;
    Ok(url.into())
}

pub fn normalize_customer_id(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

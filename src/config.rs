use anyhow::{Result, anyhow};
use clap::ArgMatches;
use std::env;
use std::time::Duration;

use crate::auth::ADWORDS_SCOPE;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_ADS_ENDPOINT: &str = "https://googleads.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v14";
pub const DEFAULT_DEVELOPER_TOKEN: &str = "TEST_DEVELOPER_TOKEN";
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5000/api/google/webhook";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub timeout: Option<Duration>,
    pub oauth: OAuthSettings,
    pub ads: AdsSettings,
}

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub token_url: String,
    pub auth_url: String,
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct AdsSettings {
    pub endpoint: String,
    pub api_version: String,
    pub developer_token: String,
    pub webhook_url: String,
}

impl Config {
    /// Flags win over environment variables, which win over defaults.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let client_id = lookup(matches, "client_id", "GOOGLE_CLIENT_ID")
            .ok_or_else(|| anyhow!("GOOGLE_CLIENT_ID missing"))?;
        let redirect_uri = lookup(matches, "redirect_uri", "GOOGLE_REDIRECT_URI")
            .ok_or_else(|| anyhow!("GOOGLE_REDIRECT_URI missing"))?;
        let client_secret = lookup(matches, "client_secret", "GOOGLE_CLIENT_SECRET");

        let oauth = OAuthSettings {
            client_id,
            client_secret,
            redirect_uri,
            token_url: lookup(matches, "token_url", "GOOGLE_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            auth_url: lookup(matches, "auth_url", "GOOGLE_AUTH_URL")
                .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            scope: ADWORDS_SCOPE.to_string(),
        };

        let ads = AdsSettings {
            endpoint: lookup(matches, "endpoint", "GOOGLE_ADS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ADS_ENDPOINT.to_string()),
            api_version: lookup(matches, "api_version", "GOOGLE_ADS_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            developer_token: lookup(matches, "developer_token", "GOOGLE_ADS_DEVELOPER_TOKEN")
                .unwrap_or_else(|| DEFAULT_DEVELOPER_TOKEN.to_string()),
            webhook_url: lookup(matches, "webhook_url", "GOOGLE_ADS_WEBHOOK_URL")
                .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string()),
        };

        let bind_addr = lookup(matches, "bind", "BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let timeout = matches
            .get_one::<u64>("timeout")
            .copied()
            .map(Duration::from_secs);

        Ok(Config {
            bind_addr,
            timeout,
            oauth,
            ads,
        })
    }

    pub fn require_client_secret(&self) -> Result<()> {
        match self.oauth.client_secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => Ok(()),
            _ => Err(anyhow!("GOOGLE_CLIENT_SECRET missing")),
        }
    }
}

fn lookup(matches: &ArgMatches, arg: &str, var: &str) -> Option<String> {
    matches
        .get_one::<String>(arg)
        .cloned()
        .or_else(|| env::var(var).ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

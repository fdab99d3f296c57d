use std::time::{Duration, SystemTime};

use log::{error, info, warn};
use tokio::sync::Mutex;

use crate::auth::{OAuthClient, TokenResponse};

/// Tokens are refreshed once they are this close to expiring.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// A lifetime that overflows the clock counts as already expired, so the
/// next read refreshes.
fn expiry_at(now: SystemTime, expires_in: u64) -> SystemTime {
    match now.checked_add(Duration::from_secs(expires_in)) {
        Some(expires_at) => expires_at,
        None => {
            warn!("token lifetime of {expires_in}s is out of range; treating token as expired");
            now
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: u64,
    pub expires_at: SystemTime,
}

impl TokenRecord {
    pub fn is_fresh_at(&self, now: SystemTime) -> bool {
        match self.expires_at.checked_sub(REFRESH_MARGIN) {
            Some(deadline) => now < deadline,
            None => false,
        }
    }
}

/// Single-slot holder for the most recent token pair.
///
/// The lock is never held across an upstream call, so two callers that both
/// observe a stale token will both refresh; the last write wins.
#[derive(Debug, Default)]
pub struct TokenStore {
    slot: Mutex<Option<TokenRecord>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_token_data(&self, data: &TokenResponse) {
        self.set_token_data_at(data, SystemTime::now()).await;
    }

    pub async fn set_token_data_at(&self, data: &TokenResponse, now: SystemTime) {
        let mut slot = self.slot.lock().await;
        let refresh_token = data
            .refresh_token
            .clone()
            .or_else(|| slot.as_ref().and_then(|record| record.refresh_token.clone()));

        *slot = Some(TokenRecord {
            access_token: data.access_token.clone(),
            refresh_token,
            token_type: data.token_type.clone(),
            expires_in: data.expires_in,
            expires_at: expiry_at(now, data.expires_in),
        });
    }

    pub async fn snapshot(&self) -> Option<TokenRecord> {
        self.slot.lock().await.clone()
    }

    pub async fn access_token(&self, oauth: &OAuthClient) -> Option<String> {
        self.access_token_at(oauth, SystemTime::now()).await
    }

    /// Returns the cached access token, refreshing it first when it is within
    /// [`REFRESH_MARGIN`] of expiry. `None` means unauthenticated.
    pub async fn access_token_at(&self, oauth: &OAuthClient, now: SystemTime) -> Option<String> {
        let refresh_token = {
            let slot = self.slot.lock().await;
            match slot.as_ref() {
                Some(record) if record.is_fresh_at(now) => {
                    return Some(record.access_token.clone());
                }
                Some(record) => record.refresh_token.clone(),
                None => None,
            }
        };

        let Some(refresh_token) = refresh_token else {
            warn!("no refresh token stored; cannot refresh access token");
            return None;
        };

        match oauth.refresh(&refresh_token).await {
            Ok(data) => {
                self.set_token_data_at(&data, now).await;
                info!("access token refreshed, expires in {}s", data.expires_in);
                Some(data.access_token)
            }
            Err(err) => {
                error!("error refreshing token: {err:#}");
                None
            }
        }
    }
}

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use log::{error, info};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::ads::AdsClient;

pub const WEBHOOK_EVENTS: &[&str] = &["CONVERSION", "CLICK", "IMPRESSION"];

const SUBSCRIPTION_QUERY: &str = "SELECT customer.id, customer.descriptive_name FROM customer LIMIT 1";

const MESSAGE_ACTIVE: &str = "Webhook subscription active";
const MESSAGE_FAILED: &str = "Webhook subscription failed";

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub customer_id: String,
}

#[derive(Debug, Default)]
struct SubscriptionState {
    subscribed: bool,
    customer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookStatus {
    pub subscribed: bool,
    pub customer_id: Option<String>,
    pub last_checked: String,
    pub message: String,
}

/// Outcome of the most recent subscription attempt.
#[derive(Debug, Default)]
pub struct WebhookState {
    inner: Mutex<SubscriptionState>,
}

impl WebhookState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_success(&self, customer_id: &str) {
        let mut state = self.inner.lock().await;
        state.subscribed = true;
        state.customer_id = Some(customer_id.to_string());
    }

    /// Leaves the customer id of any earlier success in place.
    pub async fn record_failure(&self) {
        self.inner.lock().await.subscribed = false;
    }

    pub async fn is_subscribed(&self) -> bool {
        self.inner.lock().await.subscribed
    }

    pub async fn status(&self) -> WebhookStatus {
        let state = self.inner.lock().await;
        let message = if state.subscribed {
            MESSAGE_ACTIVE
        } else {
            MESSAGE_FAILED
        };
        WebhookStatus {
            subscribed: state.subscribed,
            customer_id: state.customer_id.clone(),
            last_checked: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message: message.to_string(),
        }
    }
}

pub fn subscription_request(webhook_url: &str) -> Value {
    json!({
        "query": SUBSCRIPTION_QUERY,
        "webhookUrl": webhook_url,
        "events": WEBHOOK_EVENTS,
    })
}

/// Looks up the first accessible customer and registers `webhook_url` for
/// its events. The result is recorded in `state` either way.
pub async fn subscribe(ads: &AdsClient, webhook_url: &str, state: &WebhookState) -> Result<Subscription> {
    match try_subscribe(ads, webhook_url).await {
        Ok(subscription) => {
            info!("webhook subscription active for customer {}", subscription.customer_id);
            state.record_success(&subscription.customer_id).await;
            Ok(subscription)
        }
        Err(err) => {
            error!("webhook subscription failed: {err:#}");
            state.record_failure().await;
            Err(err)
        }
    }
}

async fn try_subscribe(ads: &AdsClient, webhook_url: &str) -> Result<Subscription> {
    let customer_id = ads.first_customer_id().await?;
    info!("customer id: {customer_id}");

    ads.search_stream(&customer_id, &subscription_request(webhook_url))
        .await?;
    Ok(Subscription { customer_id })
}

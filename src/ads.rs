use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::normalize_customer_id;
use crate::config::AdsSettings;

/// REST client for the Google Ads API bound to one access token.
pub struct AdsClient {
    http: Client,
    base_url: String,
    developer_token: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    #[serde(default)]
    results: Vec<CustomerEntry>,
}

#[derive(Debug, Deserialize)]
struct CustomerEntry {
    id: Value,
}

impl AdsClient {
    pub fn new(http: Client, settings: &AdsSettings, access_token: String) -> Result<Self> {
        let endpoint = normalize_endpoint(&settings.endpoint)?;
        let base_url = format!(
            "{}/{}",
            endpoint.trim_end_matches('/'),
            settings.api_version.trim_matches('/')
        );
        Ok(Self {
            http,
            base_url,
            developer_token: settings.developer_token.clone(),
            access_token,
        })
    }

    /// Id of the first customer visible to the token, dashes stripped.
    pub async fn first_customer_id(&self) -> Result<String> {
        let url = format!("{}/customers", self.base_url);
        let body = self.send(self.request(Method::GET, &url, None)).await?;
        let list: CustomerList = serde_json::from_value(body).context("decode customer list")?;

        let entry = list
            .results
            .first()
            .ok_or_else(|| anyhow!("no customers accessible with this token"))?;
        let raw = match &entry.id {
            Value::String(id) => id.clone(),
            Value::Number(id) => id.to_string(),
            other => return Err(anyhow!("unexpected customer id {other}")),
        };

        let customer_id = normalize_customer_id(&raw);
        if customer_id.is_empty() {
            return Err(anyhow!("invalid customer id {raw}"));
        }
        Ok(customer_id)
    }

    pub async fn search_stream(&self, customer_id: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/customers/{}/googleAds:searchStream", self.base_url, customer_id);
        let request = self
            .request(Method::POST, &url, Some(customer_id))
            .json(body);
        self.send(request).await
    }

    fn request(&self, method: Method, url: &str, login_customer_id: Option<&str>) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.access_token.trim())
            .header("developer-token", &self.developer_token);
        if let Some(login_customer_id) = login_customer_id {
            request = request.header("login-customer-id", login_customer_id);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let resp = request.send().await.context("request Ads API")?;
        let status = resp.status();
        let body = resp.text().await.context("read Ads API response")?;
        if !status.is_success() {
            return Err(anyhow!("ads http {}: {}", status, body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).context("decode Ads API response")
    }
}

fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(anyhow!("GOOGLE_ADS_ENDPOINT is empty"));
    }
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(endpoint.to_string());
    }
    Ok(format!("https://{}", endpoint))
}

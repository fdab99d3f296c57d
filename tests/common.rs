#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use ads_connect::auth::{ADWORDS_SCOPE, TokenResponse};
use ads_connect::config::{AdsSettings, Config, OAuthSettings};
use ads_connect::routes::{AppState, build_router};

pub const GOOD_CODE: &str = "4/0AVG7fiQ-good";
pub const REVOKED_REFRESH_TOKEN: &str = "revoked";
pub const DEVELOPER_TOKEN: &str = "dev-token";
pub const WEBHOOK_URL: &str = "http://localhost:5000/api/google/webhook";

#[derive(Debug, Clone)]
pub struct RecordedSubscription {
    pub customer_id: String,
    pub authorization: Option<String>,
    pub developer_token: Option<String>,
    pub login_customer_id: Option<String>,
    pub body: Value,
}

/// In-process stand-in for the Google token endpoint and Ads REST API.
#[derive(Clone, Default)]
pub struct FakeGoogle {
    pub exchange_calls: Arc<AtomicUsize>,
    pub refresh_calls: Arc<AtomicUsize>,
    pub ads_down: Arc<AtomicBool>,
    pub subscriptions: Arc<Mutex<Vec<RecordedSubscription>>>,
}

impl FakeGoogle {
    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedSubscription> {
        self.subscriptions.lock().unwrap().clone()
    }
}

pub async fn spawn_fake_google() -> (String, FakeGoogle) {
    let fake = FakeGoogle::default();
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .route("/v14/customers", get(customers))
        .route("/v14/customers/{id}/googleAds:searchStream", post(search_stream))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), fake)
}

async fn token_endpoint(State(fake): State<FakeGoogle>, Form(form): Form<HashMap<String, String>>) -> Response {
    let grant = form.get("grant_type").map(String::as_str);
    if form.get("client_secret").map(String::as_str) != Some("secret") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    match grant {
        Some("authorization_code") => {
            fake.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if form.get("code").map(String::as_str) != Some(GOOD_CODE) {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response();
            }
            Json(json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3600,
                "token_type": "Bearer",
                "scope": ADWORDS_SCOPE,
                "id_token": "id-1"
            }))
            .into_response()
        }
        Some("refresh_token") => {
            let n = fake.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if form.get("refresh_token").map(String::as_str) == Some(REVOKED_REFRESH_TOKEN) {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response();
            }
            Json(json!({
                "access_token": format!("refreshed-{n}"),
                "expires_in": 3600,
                "token_type": "Bearer"
            }))
            .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "error": "unsupported_grant_type" }))).into_response(),
    }
}

async fn customers(State(fake): State<FakeGoogle>) -> Response {
    if fake.ads_down.load(Ordering::SeqCst) {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": { "status": "PERMISSION_DENIED" } }))).into_response();
    }
    Json(json!({ "results": [{ "id": "123-456-7890" }, { "id": "999" }] })).into_response()
}

async fn search_stream(
    State(fake): State<FakeGoogle>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    fake.subscriptions.lock().unwrap().push(RecordedSubscription {
        customer_id: id,
        authorization: header("authorization"),
        developer_token: header("developer-token"),
        login_customer_id: header("login-customer-id"),
        body,
    });
    Json(json!([])).into_response()
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        timeout: None,
        oauth: OAuthSettings {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: Some("secret".to_string()),
            redirect_uri: "http://localhost:5173/oauth/callback".to_string(),
            token_url: format!("{base_url}/token"),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            scope: ADWORDS_SCOPE.to_string(),
        },
        ads: AdsSettings {
            endpoint: base_url.to_string(),
            api_version: "v14".to_string(),
            developer_token: DEVELOPER_TOKEN.to_string(),
            webhook_url: WEBHOOK_URL.to_string(),
        },
    }
}

pub fn build_test_app(config: Config) -> (Router, AppState) {
    let state = AppState::with_client(config, reqwest::Client::new());
    (build_router(state.clone()), state)
}

pub fn token(access: &str, refresh: Option<&str>, expires_in: u64) -> TokenResponse {
    serde_json::from_value(json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
        "token_type": "Bearer"
    }))
    .unwrap()
}

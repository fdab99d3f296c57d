use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::{get, post}};
use bytes::Bytes;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::ads::AdsClient;
use crate::auth::OAuthClient;
use crate::config::Config;
use crate::token_store::TokenStore;
use crate::webhook::{self, WebhookState};

/// Everything a request handler may touch. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub oauth: OAuthClient,
    pub tokens: Arc<TokenStore>,
    pub webhook: Arc<WebhookState>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: Config, http: reqwest::Client) -> Self {
        let oauth = OAuthClient::new(http.clone(), config.oauth.clone());
        Self {
            config: Arc::new(config),
            http,
            oauth,
            tokens: Arc::new(TokenStore::new()),
            webhook: Arc::new(WebhookState::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let google = Router::new()
        .route("/exchange-code", post(exchange_code))
        .route("/get-valid-token", get(get_valid_token))
        .route("/webhook", post(receive_webhook))
        .route("/webhook-status", get(webhook_status))
        .route("/auth-url", get(auth_url));

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/google", google)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[derive(Debug, Deserialize)]
pub struct ExchangeCodeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

pub async fn exchange_code(
    State(state): State<AppState>,
    body: Result<Json<ExchangeCodeRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("exchange-code body rejected: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, "Missing authorization code");
        }
    };

    let code = match body.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing authorization code"),
    };

    let token = match state.oauth.exchange_code(&code).await {
        Ok(token) => token,
        Err(err) => {
            error!("code exchange failed: {err:#}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to exchange code");
        }
    };

    state.tokens.set_token_data(&token).await;
    info!("authorization code exchanged, token expires in {}s", token.expires_in);

    // A failed subscription is recorded in the webhook state but never fails the exchange.
    match AdsClient::new(state.http.clone(), &state.config.ads, token.access_token.clone()) {
        Ok(ads) => match webhook::subscribe(&ads, &state.config.ads.webhook_url, &state.webhook).await {
            Ok(subscription) => info!("exchange complete, webhook bound to customer {}", subscription.customer_id),
            Err(_) => warn!("exchange complete without a webhook subscription"),
        },
        Err(err) => {
            error!("webhook subscription failed: {err:#}");
            state.webhook.record_failure().await;
        }
    }

    (StatusCode::OK, Json(token)).into_response()
}

#[derive(Serialize)]
struct AccessTokenBody {
    access_token: String,
}

pub async fn get_valid_token(State(state): State<AppState>) -> Response {
    match state.tokens.access_token(&state.oauth).await {
        Some(access_token) => (StatusCode::OK, Json(AccessTokenBody { access_token })).into_response(),
        None => error_response(StatusCode::UNAUTHORIZED, "Could not refresh token"),
    }
}

pub async fn receive_webhook(body: Bytes) -> impl IntoResponse {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => info!("webhook received: {payload}"),
        Err(_) if body.is_empty() => info!("webhook received with empty body"),
        Err(_) => warn!("webhook received non-JSON body ({} bytes)", body.len()),
    }
    (StatusCode::OK, Json(json!({ "status": "received" })))
}

pub async fn webhook_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.webhook.status().await))
}

pub async fn auth_url(State(state): State<AppState>) -> Response {
    match state.oauth.authorization_url() {
        Ok(url) => (StatusCode::OK, Json(json!({ "url": url }))).into_response(),
        Err(err) => {
            error!("cannot build consent url: {err:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Invalid OAuth configuration")
        }
    }
}

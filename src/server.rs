//! OAuth callback service: sends the user to the consent page, then redeems
//! the returned code and registers the user with this client.

use crate::{
    auth::generate_state,
    client::PolarClient,
    error::Error,
    state_store::PendingAuthorizations,
    types::{AccessToken, User},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AppState {
    pub polar: PolarClient,
    pub pending: Arc<PendingAuthorizations>,
}

impl AppState {
    pub fn new(polar: PolarClient) -> Self {
        Self {
            polar,
            pending: Arc::new(PendingAuthorizations::default()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("Invalid OAuth state")]
    InvalidState,

    #[error("AccessLink error: {0}")]
    Polar(#[from] Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ServerError::OAuthError(_) | ServerError::InvalidState => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::Polar(e) if e.is_auth_error() => {
                (StatusCode::UNAUTHORIZED, "Authorization rejected".to_string())
            }
            ServerError::Polar(_) => (StatusCode::BAD_GATEWAY, "AccessLink error".to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[derive(Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// The code and state are single-use credentials; only their presence is logged
impl std::fmt::Debug for OAuthCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCallback")
            .field("has_code", &self.code.is_some())
            .field("has_state", &self.state.is_some())
            .field("error", &self.error)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub token: AccessToken,
    pub user: User,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// Send the user-agent to the consent page
pub async fn login(State(state): State<AppState>) -> impl IntoResponse {
    let oauth_state = generate_state();
    state.pending.insert(&oauth_state);

    let auth_url = state.polar.authorization_url(&oauth_state);
    info!("Redirecting to OAuth authorization: {}", auth_url);
    Redirect::to(&auth_url)
}

// Redeem the authorization code returned by the consent page
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallback>,
) -> Result<Json<CallbackResponse>, ServerError> {
    debug!("OAuth callback received with params: {:?}", params);

    if let Some(error) = params.error {
        error!("OAuth error: {}", error);
        return Err(ServerError::OAuthError(error));
    }

    let code = params
        .code
        .ok_or_else(|| ServerError::OAuthError("Missing authorization code".into()))?;
    let oauth_state = params
        .state
        .ok_or_else(|| ServerError::OAuthError("Missing state parameter".into()))?;

    if !state.pending.consume(&oauth_state) {
        return Err(ServerError::InvalidState);
    }

    let token = state.polar.authorization_access_token(&code).await?;

    let mut polar = state.polar.clone();
    polar.set_bearer(token.value.clone());
    polar.set_user_id(token.user_id);
    polar.register_user().await?;
    let user = polar.user().await?;

    info!("Authorized AccessLink user {}", token.user_id);
    Ok(Json(CallbackResponse { token, user }))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "Polar AccessLink OAuth helper",
        "status": "running",
        "endpoints": {
            "login": "/auth/login",
            "callback": "/auth/callback",
            "health": "/health"
        },
        "note": "Visit /auth/login to link a Polar account"
    }))
}

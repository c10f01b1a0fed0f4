use crate::{
    client::{read_json, unexpected_status, PolarClient},
    error::Result,
    types::{AccessToken, RequestParams},
};
use base64::Engine;
use rand::Rng;
use reqwest::{Method, StatusCode};
use tracing::{debug, info, warn};

// Random state parameter for the consent redirect
pub fn generate_state() -> String {
    let random_bytes: Vec<u8> = (0..32).map(|_| rand::thread_rng().gen()).collect();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

impl PolarClient {
    /// URL the user-agent must visit to grant this client access.
    pub fn authorization_url(&self, state: &str) -> String {
        let params = vec![
            ("response_type", "code"),
            ("client_id", self.config().client_id()),
            ("state", state),
        ];
        // Encoding a list of string pairs cannot fail.
        let query = serde_urlencoded::to_string(params).unwrap_or_default();
        format!("{}?{}", self.config().authorization_url(), query)
    }

    /// Exchange an authorization code for the user's access token.
    ///
    /// The token is returned, not stored: pass it to [`PolarClient::set_bearer`].
    pub async fn authorization_access_token(&self, code: &str) -> Result<AccessToken> {
        let token_url = self.config().token_url().to_string();
        debug!("Exchanging authorization code at: {}", token_url);

        let params = RequestParams::form()
            .value("grant_type", "authorization_code")
            .value("code", code);
        let mut response = self.request(Method::POST, &token_url, params).await?;

        if response.status != StatusCode::OK {
            if self.config().strict_status() {
                return Err(unexpected_status(&mut response).await);
            }
            warn!("Token endpoint answered {}", response.status);
        }

        let token: AccessToken = read_json(&mut response).await?;
        info!("Obtained access token for AccessLink user {}", token.user_id);
        Ok(token)
    }
}

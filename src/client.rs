use crate::{
    config::Config,
    error::{Error, Result},
    transport::{HttpTransport, Transport, TransportResponse},
    types::RequestParams,
};
use reqwest::{
    header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, Request, StatusCode, Url,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub const ACCEPT_JSON: &str = "application/json;charset=UTF-8";
pub const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_JSON: &str = "application/json";

/// AccessLink API client.
///
/// Cloning is cheap: configuration and transport are shared, while the
/// bearer token and acting user id belong to each clone.
#[derive(Clone)]
pub struct PolarClient {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    bearer: Option<String>,
    user_id: u64,
}

impl PolarClient {
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            bearer: None,
            user_id: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store the user's access token for bearer-authenticated calls.
    pub fn set_bearer(&mut self, token: impl Into<String>) {
        self.bearer = Some(token.into());
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub fn set_user_id(&mut self, id: u64) {
        self.user_id = id;
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Build an authenticated request without sending it.
    ///
    /// Host-relative `uri`s are prefixed with the configured host; absolute
    /// URLs are used as given. Only POST carries a body.
    pub fn build_request(
        &self,
        method: Method,
        uri: &str,
        params: &RequestParams,
    ) -> Result<Request> {
        let mut url = self.resolve(uri)?;
        if !params.queries.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params.queries {
                pairs.append_pair(key, &stringify(value));
            }
        }

        let mut request = Request::new(method.clone(), url);

        if method == Method::POST {
            let (content_type, body) = if params.with_form_url_encoded {
                let pairs: Vec<(&str, String)> = params
                    .values
                    .iter()
                    .map(|(key, value)| (key.as_str(), stringify(value)))
                    .collect();
                (FORM_URL_ENCODED, serde_urlencoded::to_string(pairs)?.into_bytes())
            } else {
                (APPLICATION_JSON, serde_json::to_vec(&params.values)?)
            };
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            *request.body_mut() = Some(body.into());
        }

        let authorization = if params.with_bearer {
            self.bearer.as_ref().map(|token| format!("Bearer {}", token))
        } else {
            Some(self.config.basic_authorization().to_string())
        };
        match authorization {
            Some(value) => {
                request
                    .headers_mut()
                    .insert(AUTHORIZATION, HeaderValue::from_str(&value)?);
            }
            None => debug!("No bearer token set, sending {} without authorization", uri),
        }

        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        Ok(request)
    }

    /// Build and send a request. The caller owns the returned response.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        params: RequestParams,
    ) -> Result<TransportResponse> {
        let request = self.build_request(method, uri, &params)?;
        debug!("{} {}", request.method(), request.url());
        let response = self.transport.send(request).await?;
        debug!("{} answered {}", uri, response.status);
        Ok(response)
    }

    pub async fn get(&self, endpoint: &str, params: RequestParams) -> Result<TransportResponse> {
        self.request(Method::GET, endpoint, params).await
    }

    pub async fn post(&self, endpoint: &str, params: RequestParams) -> Result<TransportResponse> {
        self.request(Method::POST, endpoint, params).await
    }

    pub async fn delete(&self, endpoint: &str, params: RequestParams) -> Result<TransportResponse> {
        self.request(Method::DELETE, endpoint, params).await
    }

    /// Decode a 200 response, optionally unwrapping an envelope key first.
    ///
    /// Other statuses yield `T::default()`, or `Error::UnexpectedStatus`
    /// under strict status handling.
    pub(crate) async fn decode<T>(
        &self,
        mut response: TransportResponse,
        envelope: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        if response.status != StatusCode::OK {
            if self.config.strict_status() {
                return Err(unexpected_status(&mut response).await);
            }
            warn!(
                "AccessLink answered {}, returning an empty result",
                response.status
            );
            return Ok(T::default());
        }
        match envelope {
            None => read_json(&mut response).await,
            Some(key) => {
                let mut document: Value = read_json(&mut response).await?;
                match document.get_mut(key).map(Value::take) {
                    None | Some(Value::Null) => {
                        debug!("Envelope key {} absent, returning an empty result", key);
                        Ok(T::default())
                    }
                    Some(inner) => Ok(serde_json::from_value(inner)?),
                }
            }
        }
    }

    /// Consume a response whose body carries nothing of interest.
    pub(crate) async fn discard(&self, mut response: TransportResponse) -> Result<()> {
        if !response.status.is_success() {
            if self.config.strict_status() {
                return Err(unexpected_status(&mut response).await);
            }
            warn!("AccessLink answered {}, ignoring", response.status);
        }
        Ok(())
    }

    fn resolve(&self, uri: &str) -> Result<Url> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Url::parse(&format!("{}{}", self.config.host(), uri))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for PolarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolarClient")
            .field("config", &self.config)
            .field("has_bearer", &self.bearer.is_some())
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Read the body as JSON, ignoring the status.
pub(crate) async fn read_json<T: DeserializeOwned>(response: &mut TransportResponse) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

pub(crate) async fn unexpected_status(response: &mut TransportResponse) -> Error {
    Error::UnexpectedStatus {
        status: response.status.as_u16(),
        body: response.text().await,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

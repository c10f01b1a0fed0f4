//! The HTTP seam the client dispatches through.
//!
//! A [`TransportResponse`] owns its body. Dropping the response releases the
//! body, so every accessor releases it exactly once on every exit path.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::HeaderMap, Request, StatusCode};
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<TransportResponse>;
}

#[async_trait]
pub trait ResponseBody: Send {
    /// Read the remaining body. A second call yields an empty buffer.
    async fn bytes(&mut self) -> Result<Bytes>;
}

pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Box<dyn ResponseBody>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Box<dyn ResponseBody>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub async fn bytes(&mut self) -> Result<Bytes> {
        self.body.bytes().await
    }

    /// Body as lossy UTF-8, for error messages.
    pub async fn text(&mut self) -> String {
        match self.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("polar-accesslink/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<TransportResponse> {
        let response = self.client.execute(request).await?;
        Ok(TransportResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Box::new(ReqwestBody(Some(response))),
        })
    }
}

struct ReqwestBody(Option<reqwest::Response>);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn bytes(&mut self) -> Result<Bytes> {
        match self.0.take() {
            Some(response) => Ok(response.bytes().await?),
            None => Ok(Bytes::new()),
        }
    }
}

//! API Client: the single point of entry for all backend calls.
//!
//! Every response body is a `{data, message?, status?}` envelope; errors come
//! back as `{message?, code?, details?}`. Both are normalized into
//! [`ClientError`] here so nothing above this module sees HTTP details.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::ClientError;

pub mod service;
pub mod upload;

pub use service::{HealthStatus, ProjectService};
pub use upload::ProgressCallback;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    /// FastAPI reports failures as `{"detail": ...}`.
    #[serde(default)]
    detail: Option<Value>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        self.message.clone().or_else(|| match &self.detail {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        })
    }
}

/// `reqwest` implementation of [`ProjectService`].
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn builder(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client.request(method, self.url(endpoint))
    }

    /// Sends a request and unwraps the `data` field of the envelope.
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let envelope: Envelope<T> = self.request_raw(method, endpoint, body).await?;
        if let Some(message) = &envelope.message {
            debug!("{endpoint}: {message}");
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Network(format!("Response from {endpoint} carried no data")))
    }

    /// Sends a request whose success body is irrelevant.
    pub(crate) async fn request_unit(&self, method: Method, endpoint: &str) -> Result<(), ClientError> {
        let response = self.send(self.builder(method, endpoint), endpoint).await?;
        check_status(response).await.map(|_| ())
    }

    /// Sends a request and decodes the whole body as `T`.
    pub(crate) async fn request_raw<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.builder(method, endpoint);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder, endpoint).await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response, ClientError> {
        debug!("Calling {endpoint}");
        builder
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(ClientError::from)
    }
}

/// Maps a non-success status to [`ClientError::Service`], using the body's
/// message when there is one.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(service_error(status, &body))
}

pub(crate) fn service_error(status: StatusCode, body: &str) -> ClientError {
    let details: Option<Value> = serde_json::from_str(body).ok();
    let parsed = details
        .as_ref()
        .and_then(|d| serde_json::from_value::<ErrorBody>(d.clone()).ok())
        .unwrap_or_default();
    let message = parsed.message().unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    });
    ClientError::Service {
        status: status.as_u16(),
        message,
        details,
    }
}

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use possync_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use possync_domain::{HttpConfig, PosSyncError};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::api::ApiError;
use crate::errors::InfraError;

/// HTTP client with a fixed timeout and exactly one attempt per request.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Build a client from the `[http]` configuration section.
    pub fn from_config(config: &HttpConfig) -> Result<Self, PosSyncError> {
        let mut builder = Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .force_ipv4(config.force_ipv4);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request once. Non-success statuses are returned as
    /// responses; only transport failures become errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(|err| ApiError::Config(err.to_string()))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                if err.is_timeout() {
                    Err(ApiError::Timeout(self.timeout))
                } else {
                    Err(ApiError::Network(err.to_string()))
                }
            }
        }
    }
}

/// Read a response body: parsed JSON when it parses, the raw text
/// otherwise, `None` when empty.
pub async fn read_body(response: Response) -> Result<Option<Value>, ApiError> {
    let text = response.text().await.map_err(|err| {
        if err.is_timeout() {
            ApiError::Network("timed out reading response body".into())
        } else {
            ApiError::Network(err.to_string())
        }
    })?;

    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&text).unwrap_or(Value::String(text))))
}

/// Resolver that only hands out IPv4 addresses.
struct Ipv4Resolver;

impl Resolve for Ipv4Resolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(lookup_ipv4(name.as_str().to_owned()))
    }
}

async fn lookup_ipv4(host: String) -> Result<Addrs, Box<dyn std::error::Error + Send + Sync>> {
    let v4: Vec<SocketAddr> =
        tokio::net::lookup_host((host.as_str(), 0)).await?.filter(SocketAddr::is_ipv4).collect();
    if v4.is_empty() {
        let message = format!("no IPv4 address found for {host}");
        return Err(io::Error::new(io::ErrorKind::NotFound, message).into());
    }
    Ok(Box::new(v4.into_iter()))
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    force_ipv4: bool,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            force_ipv4: true,
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve host names to IPv4 addresses only.
    pub fn force_ipv4(mut self, enabled: bool) -> Self {
        self.force_ipv4 = enabled;
        self
    }

    /// `User-Agent` header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient, PosSyncError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if self.force_ipv4 {
            builder = builder.dns_resolver(Arc::new(Ipv4Resolver));
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            PosSyncError::from(infra)
        })?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}

//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It owns a pooled
//! `reqwest::Client` and converts responses into domain `Response` values.

use std::collections::HashMap;
use std::error::Error;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use ricochet_application::ports::{HttpTransport, TransportError};
use ricochet_domain::{DomainError, HttpMethod, RequestSpec, Response};
use tracing::debug;

use crate::config::TransportSettings;

/// HTTP transport backed by `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    /// Creates a transport from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client, settings })
    }

    /// Creates a transport around a preconfigured client.
    #[must_use]
    pub const fn with_client(client: Client, settings: TransportSettings) -> Self {
        Self { client, settings }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn map_error(&self, error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error_chain(error);
            if message.to_lowercase().contains("refused") {
                return TransportError::ConnectionRefused {
                    host: error
                        .url()
                        .and_then(Url::host_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::Other(format!(
                "too many redirects (max {})",
                self.settings.max_redirects
            ));
        }

        TransportError::Other(error.to_string())
    }
}

/// Joins an error and its sources; reqwest keeps the OS reason in the chain.
fn error_chain(error: &reqwest::Error) -> String {
    std::iter::successors(Some(error as &dyn Error), |&e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn issue(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        let url = request.parse_url().map_err(|e| match e {
            DomainError::InvalidUrl(reason) => TransportError::InvalidUrl(reason),
            other => TransportError::Other(other.to_string()),
        })?;
        let timeout_ms = request.timeout_ms.unwrap_or(self.settings.timeout_ms);

        debug!(method = %request.method, url = %url, timeout_ms, "dispatching request");
        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(timeout_ms));

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(Response::from_bytes(status, headers, &body, start.elapsed()))
    }
}

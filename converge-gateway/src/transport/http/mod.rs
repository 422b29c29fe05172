//! HTTP transport implementation.
//!
//! This module provides HTTP/1.1 and HTTP/2 transport using reqwest.

use std::{sync::LazyLock, time::Duration};

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{GatewayError, Result},
    transport::{RequestContext, Transport, TransportResponse},
};

/// Default HTTP client with connection pooling enabled.
///
/// Using a singleton avoids recreating the client per transport instance,
/// preserving connection pooling benefits across all default transports.
#[allow(clippy::expect_used, reason = "client builder only fails if the TLS backend is missing")]
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create default HTTP client")
});

/// Validates URL for security constraints.
///
/// Ensures the URL uses HTTPS and does not point to localhost.
fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(GatewayError::TransportError("Only HTTPS URLs are allowed".to_owned()));
    }

    if let Some(host) = url.host_str()
        && (host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]")
    {
        return Err(GatewayError::TransportError("Localhost URLs are not allowed".to_owned()));
    }

    Ok(())
}

/// Rejects paths containing directory traversal sequences.
fn sanitize_path(path: &str) -> Result<()> {
    if path.contains("..") || path.contains("//") {
        return Err(GatewayError::TransportError(
            "Invalid path: traversal sequences not allowed".to_owned(),
        ));
    }
    if !path.is_empty() && !path.starts_with('/') {
        return Err(GatewayError::TransportError("Path must start with '/'".to_owned()));
    }
    Ok(())
}

/// Validates header name and value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.contains('\r') || name.contains('\n') || name.contains('\0') {
        return Err(GatewayError::TransportError(
            "Invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if value.contains('\r') || value.contains('\n') || value.contains('\0') {
        return Err(GatewayError::TransportError(
            "Invalid header value: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// Supports automatic connection pooling, keep-alive, and HTTP/2 multiplexing.
/// Non-2xx statuses are returned as-is; the request layer decides what they
/// mean.
///
/// # Examples
///
/// ```
/// use converge_gateway::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl HttpTransport {
    /// Creates a new HTTP transport with default settings.
    ///
    /// Uses a shared singleton client for connection pooling efficiency.
    ///
    /// # Errors
    ///
    /// This method is infallible but returns `Result` for API consistency.
    pub fn new() -> Result<Self> {
        Ok(Self { client: DEFAULT_HTTP_CLIENT.clone(), http_version: HttpVersion::Auto })
    }

    /// Creates HTTP transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(GatewayError::HttpError)?;

        Ok(Self { client, http_version: config.http_version })
    }

    #[instrument(
        skip(self, ctx, body),
        fields(base_url = ctx.base_url, path = ctx.path, body_len = body.len())
    )]
    async fn execute_post(
        &self,
        ctx: RequestContext<'_>,
        body: &[u8],
    ) -> Result<TransportResponse> {
        let url = Url::parse(ctx.base_url)
            .map_err(|e| GatewayError::InvalidEndpoint(format!("invalid base_url: {e}")))?;

        validate_url(&url)?;
        sanitize_path(ctx.path)?;
        for (key, value) in &ctx.headers {
            validate_header(key, value)?;
        }
        if url.host_str().is_none() {
            return Err(GatewayError::InvalidEndpoint(format!(
                "URL missing host: {}",
                ctx.base_url
            )));
        }

        let mut request = self.client.post(ctx.url());

        if let Some(content_type) = ctx.content_type {
            request = request.header("Content-Type", content_type);
        }
        for (key, value) in ctx.headers {
            request = request.header(key, value);
        }

        let response = request.body(body.to_vec()).send().await?;
        let status = response.status().as_u16();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        let response_body = response.bytes().await.map_err(GatewayError::HttpError)?.to_vec();
        debug!(status, body_len = response_body.len(), "gateway responded");

        Ok(TransportResponse { status, body: response_body, headers })
    }
}

impl Transport for HttpTransport {
    async fn post<'a>(&'a self, ctx: RequestContext<'a>, body: &'a [u8]) -> Result<TransportResponse> {
        self.execute_post(ctx, body).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}

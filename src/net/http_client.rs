// Single egress point for all outbound fetches: upstream exchange APIs,
// DNS-over-HTTPS lookups, and chain RPC calls.
use std::net::IpAddr;
use std::time::Duration;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::models::error::ApiError;
use crate::net::dns_cache::DnsSafetyCache;
use crate::net::ssrf;

const DEFAULT_PROXY_TIMEOUT: Duration = Duration::from_secs(10);
const DOH_TIMEOUT: Duration = Duration::from_secs(4);
const DEFAULT_REQUEST_BODY_LIMIT: usize = 512 * 1024;

/// Per-call limits on an outbound fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_request_body: usize,
    pub max_response_body: Option<usize>,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROXY_TIMEOUT,
            max_request_body: DEFAULT_REQUEST_BODY_LIMIT,
            max_response_body: None,
        }
    }
}

/// Uniform result of a successful outbound fetch.
#[derive(Debug)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: reqwest::header::HeaderMap,
    pub body: Vec<u8>,
}

/// The one `reqwest::Client` the whole process uses for egress, wrapping it
/// with TLS-only + SSRF-safe host enforcement, disabled redirects, and size
/// caps. DNS-over-HTTPS calls bypass the SSRF re-check (they bootstrap it).
pub struct OutboundClient {
    http: reqwest::Client,
    dns_cache: DnsSafetyCache,
}

impl OutboundClient {
    pub fn new() -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(DEFAULT_PROXY_TIMEOUT)
            .use_rustls_tls()
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self { http, dns_cache: DnsSafetyCache::new() })
    }

    /// Fetch a URL, enforcing the full outbound policy described in the
    /// component design: https-only, SSRF-safe host, no redirects, size caps.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        headers: Vec<(&str, String)>,
        body: Option<Vec<u8>>,
        limits: FetchLimits,
    ) -> Result<FetchResponse, ApiError> {
        let parsed = Url::parse(url).map_err(|_| ApiError::BadInput("invalid url".into()))?;

        if parsed.scheme() != "https" {
            return Err(ApiError::UpstreamUnavailable("tls-required".into()));
        }

        let host = parsed.host_str().ok_or_else(|| ApiError::UpstreamUnavailable("private-host".into()))?;
        if ssrf::is_private_host(host) {
            return Err(ApiError::UpstreamUnavailable("private-host".into()));
        }
        if !self.dns_cache.is_safe(self, host).await? {
            return Err(ApiError::UpstreamUnavailable("private-host".into()));
        }

        if let Some(b) = &body {
            if b.len() > limits.max_request_body {
                return Err(ApiError::PayloadTooLarge);
            }
        }

        let mut request = self.http.request(method, parsed).timeout(limits.timeout);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(b) = body {
            request = request.body(b);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        if response.status().is_redirection() {
            return Err(ApiError::RedirectNotAllowed);
        }

        let status = response.status();
        let response_headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(map_transport_error)?;

        if let Some(max) = limits.max_response_body {
            if bytes.len() > max {
                return Err(ApiError::PayloadTooLarge);
            }
        }

        if !status.is_success() {
            return Err(ApiError::UpstreamStatus(status.as_u16()));
        }

        Ok(FetchResponse { status, headers: response_headers, body: bytes.to_vec() })
    }

    /// Convenience wrapper for JSON-returning upstreams.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        limits: FetchLimits,
    ) -> Result<T, ApiError> {
        let response = self.fetch(Method::GET, url, vec![], None, limits).await?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::UpstreamUnavailable(format!("malformed upstream body: {e}")))
    }

    /// DNS-over-HTTPS lookups don't go through the SSRF host re-check
    /// themselves (the DoH resolver's own host is a fixed, trusted endpoint).
    pub async fn fetch_doh(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .http
            .get(url)
            .header("accept", "application/dns-json")
            .timeout(DOH_TIMEOUT)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(ApiError::UpstreamStatus(response.status().as_u16()));
        }

        Ok(response.bytes().await.map_err(map_transport_error)?.to_vec())
    }

    /// The spec's `resolveIpv4AndIpv6`: resolve both record types for a
    /// hostname via the DNS cache's underlying DoH lookup.
    pub async fn resolve_all(&self, hostname: &str) -> Result<Vec<IpAddr>, ApiError> {
        crate::net::dns_cache::resolve_all(self, hostname).await
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(DEFAULT_PROXY_TIMEOUT.as_secs())
    } else {
        ApiError::UpstreamUnavailable(format!("transport error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_https_scheme() {
        let client = OutboundClient::new().unwrap();
        let result = client
            .fetch(Method::GET, "http://example.com", vec![], None, FetchLimits::default())
            .await;
        assert!(matches!(result, Err(ApiError::UpstreamUnavailable(msg)) if msg == "tls-required"));
    }

    #[tokio::test]
    async fn rejects_private_host_before_network_call() {
        let client = OutboundClient::new().unwrap();
        let result = client
            .fetch(Method::GET, "https://127.0.0.1/admin", vec![], None, FetchLimits::default())
            .await;
        assert!(matches!(result, Err(ApiError::UpstreamUnavailable(msg)) if msg == "private-host"));
    }

    #[tokio::test]
    async fn rejects_oversized_request_body() {
        let client = OutboundClient::new().unwrap();
        let body = vec![0u8; DEFAULT_REQUEST_BODY_LIMIT + 1];
        let result = client
            .fetch(Method::POST, "https://api.binance.com/x", vec![], Some(body), FetchLimits::default())
            .await;
        assert!(matches!(result, Err(ApiError::PayloadTooLarge)));
    }
}

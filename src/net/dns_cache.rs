// DNS-over-HTTPS re-resolution cache backing the SSRF guard's second check:
// even a host that looks public by name must resolve to public addresses.
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::net::http_client::OutboundClient;
use crate::net::ssrf;
use crate::models::error::ApiError;

const TTL: Duration = Duration::from_secs(5 * 60);
const CAPACITY: usize = 20_000;
const DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

struct Entry {
    safe: bool,
    expires_at: Instant,
}

/// LRU-bounded, TTL'd memo of "is this hostname's resolved address set
/// entirely public" used to avoid a DoH round trip per outbound request.
pub struct DnsSafetyCache {
    inner: Mutex<LruCache<String, Entry>>,
}

impl DnsSafetyCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LruCache::new(NonZeroUsize::new(CAPACITY).unwrap())),
        }
    }

    /// Resolve `hostname` via DNS-over-HTTPS (A + AAAA) and verify every
    /// returned address passes the private-IP predicate. Cached per hostname.
    pub async fn is_safe(&self, client: &OutboundClient, hostname: &str) -> Result<bool, ApiError> {
        {
            let mut cache = self.inner.lock().await;
            if let Some(entry) = cache.get(hostname) {
                if entry.expires_at > Instant::now() {
                    return Ok(entry.safe);
                }
            }
        }

        let addrs = resolve_all(client, hostname).await?;
        let safe = !addrs.is_empty() && addrs.iter().all(|ip| !ssrf::is_private_ip(*ip));

        let mut cache = self.inner.lock().await;
        cache.put(
            hostname.to_string(),
            Entry { safe, expires_at: Instant::now() + TTL },
        );

        Ok(safe)
    }
}

impl Default for DnsSafetyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    data: String,
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(default)]
    #[serde(rename = "Answer")]
    answer: Vec<DohAnswer>,
}

/// Resolve both A and AAAA records for `hostname` over DNS-over-HTTPS.
pub async fn resolve_all(client: &OutboundClient, hostname: &str) -> Result<Vec<IpAddr>, ApiError> {
    let mut addrs = Vec::new();
    for rtype in ["A", "AAAA"] {
        let url = format!("{DOH_ENDPOINT}?name={hostname}&type={rtype}");
        let body = client.fetch_doh(&url).await?;
        if let Ok(parsed) = serde_json::from_slice::<DohResponse>(&body) {
            for answer in parsed.answer {
                if let Ok(ip) = answer.data.parse::<IpAddr>() {
                    addrs.push(ip);
                }
            }
        }
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_entries_expire() {
        let cache = DnsSafetyCache::new();
        {
            let mut inner = cache.inner.lock().await;
            inner.put(
                "expired.example".to_string(),
                Entry { safe: true, expires_at: Instant::now() - Duration::from_secs(1) },
            );
        }
        let inner = cache.inner.lock().await;
        let entry = inner.peek("expired.example").unwrap();
        assert!(entry.expires_at <= Instant::now());
    }
}

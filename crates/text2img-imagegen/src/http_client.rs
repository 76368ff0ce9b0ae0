use std::{sync::Mutex, time::Duration};

use http::{HeaderMap, HeaderValue, header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ImageGenError, Result};

/// Build an HTTP client with connection reuse settings shared by all providers
///
/// Extra `default_headers` are merged in (used to pin a bearer token to a
/// per-key client).
pub(crate) fn build_client(default_headers: HeaderMap) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.extend(default_headers);

    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
        .map_err(|e| ImageGenError::ConfigError(format!("failed to build HTTP client: {e}")))
}

/// `Authorization: Bearer <key>` header value, marked sensitive
pub(crate) fn bearer(api_key: &SecretString) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
        .map_err(|_| ImageGenError::ConfigError("API key contains invalid header characters".to_owned()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Lazily created, reusable HTTP client
///
/// The client is built on first use and dropped by [`HttpSession::close`];
/// a later request builds a fresh one.
#[derive(Default)]
pub(crate) struct HttpSession {
    client: Mutex<Option<Client>>,
}

impl HttpSession {
    /// Get the shared client, creating it if needed
    pub fn client(&self) -> Result<Client> {
        let mut slot = self.client.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = build_client(HeaderMap::new())?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Drop the client and its connection pool
    pub fn close(&self) {
        let mut slot = self.client.lock().unwrap_or_else(|e| e.into_inner());
        slot.take();
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.client.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

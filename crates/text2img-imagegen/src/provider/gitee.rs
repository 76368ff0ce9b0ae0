use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use http::{HeaderMap, header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ImageGenProvider, ProviderSettings, decode_base64, download, error_body};
use crate::{
    error::{ImageGenError, Result},
    http_client::{HttpSession, bearer, build_client},
    resolution::{self, ResolutionTable},
    types::GeneratedImage,
};

/// Gitee AI image generation provider (OpenAI-compatible API)
pub struct GiteeProvider {
    settings: ProviderSettings,
    /// Client slot for each key position; repeated keys share a slot
    slots: Vec<usize>,
    /// One client per distinct key, each carrying its bearer token
    clients: Mutex<HashMap<usize, Client>>,
    session: HttpSession,
}

impl GiteeProvider {
    /// Default Gitee AI API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://ai.gitee.com/v1";

    pub(crate) fn new(settings: ProviderSettings) -> Self {
        Self {
            slots: client_slots(settings.keys.keys()),
            settings,
            clients: Mutex::new(HashMap::new()),
            session: HttpSession::default(),
        }
    }

    /// Client for the next key in rotation, created on first use of that key
    fn next_client(&self) -> Result<Client> {
        let (index, api_key) = self.settings.keys.next_key()?;
        let slot = self.slots.get(index).copied().unwrap_or(index);
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(client) = clients.get(&slot) {
            return Ok(client.clone());
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, bearer(api_key)?);
        let client = build_client(headers)?;

        clients.insert(slot, client.clone());
        Ok(client)
    }

    /// Number of cached per-key clients
    pub fn cached_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Map each key position to the first position holding the same key
fn client_slots(keys: &[SecretString]) -> Vec<usize> {
    keys.iter()
        .enumerate()
        .map(|(index, key)| {
            keys[..index]
                .iter()
                .position(|earlier| earlier.expose_secret() == key.expose_secret())
                .unwrap_or(index)
        })
        .collect()
}

/// Wire format for the image generation request
#[derive(Serialize)]
struct GiteeImageRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

/// Wire format for the image generation response
#[derive(Deserialize)]
struct GiteeImageResponse {
    #[serde(default)]
    data: Vec<GiteeImageData>,
}

#[derive(Deserialize)]
struct GiteeImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

/// Map a non-success status to the message shown to the user
fn status_error(status: u16, body: String) -> ImageGenError {
    match status {
        401 => ImageGenError::AuthenticationFailed(
            "API key is invalid or expired, please check the configuration".to_owned(),
        ),
        429 => ImageGenError::RateLimited(
            "API quota exceeded or too many concurrent requests, please try again later".to_owned(),
        ),
        500.. => ImageGenError::ProviderApiError {
            status,
            message: "Gitee AI server error, please try again later".to_owned(),
        },
        _ => ImageGenError::ProviderApiError {
            status,
            message: format!("API call failed (HTTP {status}): {body}"),
        },
    }
}

#[async_trait]
impl ImageGenProvider for GiteeProvider {
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<GeneratedImage> {
        let client = self.next_client()?;
        let url = format!("{}/images/generations", self.settings.base_url);

        let request = GiteeImageRequest {
            prompt,
            model: &self.settings.model,
            size,
            negative_prompt: self.settings.negative_prompt(),
        };

        tracing::debug!(provider = self.name(), model = %self.settings.model, size, "sending image generation request");

        let response = client.post(&url).json(&request).send().await.map_err(|e| {
            tracing::error!(provider = self.name(), error = %e, "image generation request failed");
            ImageGenError::ConnectionError(format!("API call failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            tracing::error!(provider = self.name(), status = %status, "Gitee AI image generation API error");
            return Err(status_error(status.as_u16(), body));
        }

        let body: GiteeImageResponse = response.json().await.map_err(|e| {
            tracing::error!(provider = self.name(), error = %e, "failed to parse Gitee AI response");
            ImageGenError::InvalidResponse(format!("API call failed: unreadable response: {e}"))
        })?;

        let Some(image) = body.data.into_iter().next() else {
            return Err(ImageGenError::InvalidResponse("image generation returned no data".to_owned()));
        };

        let data = match (image.url, image.b64_json) {
            (Some(url), _) => download(&self.session.client()?, self.name(), &url).await?,
            (None, Some(encoded)) => decode_base64(&encoded)?,
            (None, None) => {
                return Err(ImageGenError::NoImageData(
                    "image generation returned neither a URL nor base64 data".to_owned(),
                ));
            }
        };

        tracing::debug!(provider = self.name(), bytes = data.len(), "image generation complete");

        Ok(GeneratedImage::jpg(data))
    }

    fn supported_ratios(&self) -> &'static ResolutionTable {
        resolution::gitee(&self.settings.model)
    }

    fn close(&self) {
        self.session.close();
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn name(&self) -> &'static str {
        "gitee"
    }
}

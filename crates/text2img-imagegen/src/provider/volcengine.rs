use async_trait::async_trait;
use http::header;
use serde::{Deserialize, Serialize};

use super::{ImageGenProvider, ProviderSettings, decode_base64, download, error_body};
use crate::{
    error::{ImageGenError, Result},
    http_client::{HttpSession, bearer},
    resolution::{self, ResolutionTable},
    types::GeneratedImage,
};

/// Volcengine Ark (Seedream) image generation provider
pub struct VolcengineProvider {
    settings: ProviderSettings,
    session: HttpSession,
}

impl VolcengineProvider {
    /// Default Ark API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://ark.cn-beijing.volces.com/api/v3";

    pub(crate) fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            session: HttpSession::default(),
        }
    }
}

#[derive(Serialize)]
struct ArkImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    watermark: bool,
}

#[derive(Deserialize)]
struct ArkImageResponse {
    #[serde(default)]
    data: Vec<ArkImageData>,
}

#[derive(Deserialize)]
struct ArkImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[async_trait]
impl ImageGenProvider for VolcengineProvider {
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<GeneratedImage> {
        let (_, api_key) = self.settings.keys.next_key()?;
        let client = self.session.client()?;
        let url = format!("{}/images/generations", self.settings.base_url);

        let request = ArkImageRequest {
            model: &self.settings.model,
            prompt,
            size,
            watermark: false,
        };

        tracing::debug!(provider = self.name(), model = %self.settings.model, size, "sending image generation request");

        let response = client
            .post(&url)
            .header(header::AUTHORIZATION, bearer(api_key)?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = self.name(), error = %e, "image generation request failed");
                ImageGenError::ConnectionError(format!("Volcengine API call failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            tracing::error!(provider = self.name(), status = %status, "Volcengine image generation API error");
            return Err(ImageGenError::ProviderApiError {
                status: status.as_u16(),
                message: format!("Volcengine API call failed (HTTP {}): {body}", status.as_u16()),
            });
        }

        let body: ArkImageResponse = response.json().await.map_err(|e| {
            tracing::error!(provider = self.name(), error = %e, "failed to parse Volcengine response");
            ImageGenError::InvalidResponse(format!("Volcengine API call failed: unreadable response: {e}"))
        })?;

        let Some(image) = body.data.into_iter().next() else {
            return Err(ImageGenError::InvalidResponse("no image data in Volcengine response".to_owned()));
        };

        let data = match (image.url, image.b64_json) {
            (Some(url), _) => download(&client, self.name(), &url).await?,
            (None, Some(encoded)) => decode_base64(&encoded)?,
            (None, None) => {
                return Err(ImageGenError::NoImageData(
                    "no image URL or base64 data in Volcengine response".to_owned(),
                ));
            }
        };

        tracing::debug!(provider = self.name(), bytes = data.len(), "image generation complete");

        Ok(GeneratedImage::jpg(data))
    }

    fn supported_ratios(&self) -> &'static ResolutionTable {
        resolution::volcengine(&self.settings.model)
    }

    fn close(&self) {
        self.session.close();
    }

    fn name(&self) -> &'static str {
        "volcengine"
    }
}

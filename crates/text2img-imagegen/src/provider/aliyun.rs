use async_trait::async_trait;
use http::header;
use serde::Serialize;

use super::{ImageGenProvider, ProviderSettings, download, error_body};
use crate::{
    error::{ImageGenError, Result},
    http_client::{HttpSession, bearer},
    resolution::{self, ResolutionTable},
    types::GeneratedImage,
};

/// Location of the image URL in a multimodal generation response
const IMAGE_POINTER: &str = "/output/choices/0/message/content/0/image";

/// Aliyun Bailian (`DashScope`) multimodal image generation provider
pub struct AliyunProvider {
    settings: ProviderSettings,
    session: HttpSession,
}

impl AliyunProvider {
    /// Default `DashScope` multimodal generation base URL
    pub const DEFAULT_BASE_URL: &'static str =
        "https://dashscope.aliyuncs.com/api/v1/services/aigc/multimodal-generation";

    pub(crate) fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            session: HttpSession::default(),
        }
    }

    /// Wan models default to four images per call
    fn is_wan_model(&self) -> bool {
        self.settings.model.to_lowercase().contains("wan")
    }

    fn build_request<'a>(&'a self, prompt: &'a str, size: &'a str) -> AliyunRequest<'a> {
        AliyunRequest {
            model: &self.settings.model,
            input: AliyunInput {
                messages: [AliyunMessage {
                    role: "user",
                    content: [AliyunText { text: prompt }],
                }],
            },
            parameters: AliyunParameters {
                negative_prompt: self.settings.negative_prompt(),
                size: Some(size).filter(|s| !s.is_empty()),
                n: self.is_wan_model().then_some(1),
            },
        }
    }
}

#[derive(Serialize)]
struct AliyunRequest<'a> {
    model: &'a str,
    input: AliyunInput<'a>,
    parameters: AliyunParameters<'a>,
}

#[derive(Serialize)]
struct AliyunInput<'a> {
    messages: [AliyunMessage<'a>; 1],
}

#[derive(Serialize)]
struct AliyunMessage<'a> {
    role: &'static str,
    content: [AliyunText<'a>; 1],
}

#[derive(Serialize)]
struct AliyunText<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct AliyunParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
}

#[async_trait]
impl ImageGenProvider for AliyunProvider {
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<GeneratedImage> {
        let (_, api_key) = self.settings.keys.next_key()?;
        let client = self.session.client()?;
        let url = format!("{}/generation", self.settings.base_url);

        tracing::debug!(provider = self.name(), model = %self.settings.model, size, "sending image generation request");

        let response = client
            .post(&url)
            .header(header::AUTHORIZATION, bearer(api_key)?)
            .json(&self.build_request(prompt, size))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = self.name(), error = %e, "image generation request failed");
                ImageGenError::ConnectionError(format!("Aliyun API call failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            tracing::error!(provider = self.name(), status = %status, "Aliyun image generation API error");
            return Err(ImageGenError::ProviderApiError {
                status: status.as_u16(),
                message: format!("Aliyun API call failed (HTTP {}): {body}", status.as_u16()),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!(provider = self.name(), error = %e, "failed to parse Aliyun response");
            ImageGenError::InvalidResponse(format!("Aliyun API call failed: unreadable response: {e}"))
        })?;

        let image_url = body.pointer(IMAGE_POINTER).and_then(serde_json::Value::as_str).ok_or_else(|| {
            ImageGenError::InvalidResponse(
                "failed to parse Aliyun response: missing output.choices[0].message.content[0].image".to_owned(),
            )
        })?;

        let data = download(&client, self.name(), image_url).await?;

        tracing::debug!(provider = self.name(), bytes = data.len(), "image generation complete");

        Ok(GeneratedImage::png(data))
    }

    fn supported_ratios(&self) -> &'static ResolutionTable {
        resolution::aliyun(&self.settings.model)
    }

    fn close(&self) {
        self.session.close();
    }

    fn name(&self) -> &'static str {
        "aliyun"
    }
}

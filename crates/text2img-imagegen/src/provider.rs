mod aliyun;
mod gitee;
mod volcengine;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use text2img_config::{ImageGenConfig, ProviderKind};

use crate::{
    error::{ImageGenError, Result},
    keys::KeyRotator,
    resolution::ResolutionTable,
    types::GeneratedImage,
};

pub use self::{aliyun::AliyunProvider, gitee::GiteeProvider, volcengine::VolcengineProvider};

/// Trait for text-to-image provider implementations
#[async_trait]
pub trait ImageGenProvider: Send + Sync {
    /// Generate one image for `prompt` at `size`
    ///
    /// `size` must come from this provider's [`ResolutionTable`].
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<GeneratedImage>;

    /// Ratio to size table for the configured model
    fn supported_ratios(&self) -> &'static ResolutionTable;

    /// Release cached HTTP clients; safe to call more than once
    fn close(&self);

    /// Get the provider name
    fn name(&self) -> &'static str;
}

/// The configured provider, chosen once at startup
pub enum Provider {
    Gitee(GiteeProvider),
    Aliyun(AliyunProvider),
    Volcengine(VolcengineProvider),
}

impl Provider {
    /// Build the provider selected in `config`
    ///
    /// A missing `base_url` falls back to the provider's public endpoint.
    pub fn from_config(config: &ImageGenConfig) -> Self {
        let settings = ProviderSettings::from_config(config);

        tracing::debug!(
            provider = %config.provider,
            model = %settings.model,
            base_url = %settings.base_url,
            keys = settings.keys.len(),
            "initializing image generation provider"
        );

        if settings.keys.is_empty() {
            tracing::warn!(provider = %config.provider, "no API key configured, image generation will fail");
        }

        match config.provider {
            ProviderKind::Gitee => Self::Gitee(GiteeProvider::new(settings)),
            ProviderKind::Aliyun => Self::Aliyun(AliyunProvider::new(settings)),
            ProviderKind::Volcengine => Self::Volcengine(VolcengineProvider::new(settings)),
        }
    }

    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Gitee(_) => ProviderKind::Gitee,
            Self::Aliyun(_) => ProviderKind::Aliyun,
            Self::Volcengine(_) => ProviderKind::Volcengine,
        }
    }

    /// Public endpoint used when no `base_url` is configured
    pub const fn default_base_url(kind: ProviderKind) -> &'static str {
        match kind {
            ProviderKind::Gitee => GiteeProvider::DEFAULT_BASE_URL,
            ProviderKind::Aliyun => AliyunProvider::DEFAULT_BASE_URL,
            ProviderKind::Volcengine => VolcengineProvider::DEFAULT_BASE_URL,
        }
    }

    fn inner(&self) -> &dyn ImageGenProvider {
        match self {
            Self::Gitee(p) => p,
            Self::Aliyun(p) => p,
            Self::Volcengine(p) => p,
        }
    }
}

#[async_trait]
impl ImageGenProvider for Provider {
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<GeneratedImage> {
        self.inner().generate_image(prompt, size).await
    }

    fn supported_ratios(&self) -> &'static ResolutionTable {
        self.inner().supported_ratios()
    }

    fn close(&self) {
        self.inner().close();
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

/// Settings shared by every provider variant
pub(crate) struct ProviderSettings {
    pub keys: KeyRotator,
    pub base_url: String,
    pub model: String,
    pub negative_prompt: String,
}

impl ProviderSettings {
    fn from_config(config: &ImageGenConfig) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(Provider::default_base_url(config.provider))
            .trim_end_matches('/')
            .to_owned();

        Self {
            keys: KeyRotator::new(config.api_keys.clone()),
            base_url,
            model: config.model.clone(),
            negative_prompt: config.negative_prompt.clone(),
        }
    }

    /// Negative prompt, or `None` when configured empty
    pub fn negative_prompt(&self) -> Option<&str> {
        Some(self.negative_prompt.as_str()).filter(|p| !p.trim().is_empty())
    }
}

/// Fetch an image the provider returned by URL
pub(crate) async fn download(client: &Client, provider: &str, url: &str) -> Result<Vec<u8>> {
    tracing::debug!(provider, "downloading generated image");

    let response = client.get(url).send().await.map_err(|e| {
        tracing::error!(provider, error = %e, "image download failed");
        ImageGenError::ConnectionError(format!("failed to download image: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!(provider, status = %status, "image download returned an error status");
        return Err(ImageGenError::ProviderApiError {
            status: status.as_u16(),
            message: format!("failed to download image: HTTP {}", status.as_u16()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImageGenError::ConnectionError(format!("failed to read downloaded image: {e}")))?;

    Ok(bytes.to_vec())
}

/// Decode inline `b64_json` image data
pub(crate) fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ImageGenError::InvalidResponse(format!("invalid base64 image data: {e}")))
}

/// Read an error body, tolerating unreadable ones
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_else(|_| "Unknown error".to_string())
}

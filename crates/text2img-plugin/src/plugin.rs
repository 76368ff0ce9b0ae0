use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use text2img_config::Config;
use text2img_imagegen::{ImageGenProvider, Provider, Quality, ResolutionTable};

use crate::{
    command::{USAGE, parse_command},
    gate::RequestGate,
    pipeline::ImagePipeline,
};

/// Delivers a generated image to the conversation the tool call came from
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_image(&self, path: &Path) -> anyhow::Result<()>;
}

/// Answer to a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send the image at this path
    Image(PathBuf),
    /// Send plain text
    Text(String),
}

/// The text-to-image plugin as seen by the chat host
///
/// Holds the provider, the per-user gate and the image pipeline for the
/// lifetime of the host. Entry points never fail; every outcome is a reply
/// the user can read.
pub struct Text2ImagePlugin<P = Provider> {
    provider: Arc<P>,
    pipeline: ImagePipeline<P>,
    gate: RequestGate,
    default_ratio: String,
    closed: AtomicBool,
}

impl Text2ImagePlugin {
    /// Build the plugin with the provider named in `config`
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_provider(Provider::from_config(&config.imagegen), config)
    }
}

impl<P: ImageGenProvider> Text2ImagePlugin<P> {
    /// Build the plugin around an already constructed provider
    pub fn with_provider(provider: P, config: &Config) -> anyhow::Result<Self> {
        let gate = RequestGate::new(config.limits.debounce_window()?, config.limits.record_ttl()?);
        let provider = Arc::new(provider);
        let pipeline = ImagePipeline::new(Arc::clone(&provider), config.imagegen.ratio.clone(), &config.storage);

        tracing::info!(
            provider = provider.name(),
            model = %config.imagegen.model,
            ratio = %config.imagegen.ratio,
            image_dir = %config.storage.image_dir().display(),
            "text-to-image plugin ready"
        );

        Ok(Self {
            provider,
            pipeline,
            gate,
            default_ratio: config.imagegen.ratio.clone(),
            closed: AtomicBool::new(false),
        })
    }

    /// Tool-call entry point: generate at the default ratio and send the
    /// image through `sink`
    pub async fn draw(&self, user_id: &str, prompt: &str, sink: &dyn MessageSink) -> String {
        let _guard = match self.gate.admit(user_id) {
            Ok(guard) => guard,
            Err(rejection) => return rejection.to_string(),
        };

        tracing::info!(user_id, ratio = %self.default_ratio, quality = %Quality::Medium, "image requested by tool call");

        let path = match self.pipeline.generate(prompt, &self.default_ratio, Quality::Medium).await {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(user_id, error = %e, "image generation failed");
                return format!("Ran into a problem generating the image: {e}");
            }
        };

        if let Err(e) = sink.send_image(&path).await {
            tracing::error!(user_id, error = %e, "failed to deliver generated image");
            return format!("Ran into a problem generating the image: {e}");
        }

        format!("Image generated and sent. Prompt: {prompt}")
    }

    /// Slash-command entry point for `/t2img <prompt> [ratio] [quality]`
    pub async fn command(&self, user_id: &str, message: &str) -> Reply {
        let Some(command) = parse_command(message, self.supported_ratios()) else {
            return Reply::Text(USAGE.to_owned());
        };

        tracing::debug!(user_id, prompt = %command.prompt, ratio = %command.ratio, quality = %command.quality, "parsed t2img command");

        let _guard = match self.gate.admit(user_id) {
            Ok(guard) => guard,
            Err(rejection) => return Reply::Text(rejection.to_string()),
        };

        tracing::info!(user_id, ratio = %command.ratio, quality = %command.quality, "image requested by command");

        match self
            .pipeline
            .generate(&command.prompt, &command.ratio, command.quality)
            .await
        {
            Ok(path) => Reply::Image(path),
            Err(e) => {
                tracing::error!(user_id, error = %e, "image generation failed");
                Reply::Text(format!("Image generation failed: {e}"))
            }
        }
    }

    /// Ratio table of the active provider and model
    pub fn supported_ratios(&self) -> &'static ResolutionTable {
        self.provider.supported_ratios()
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    pub fn pipeline(&self) -> &ImagePipeline<P> {
        &self.pipeline
    }

    /// Wait for background cleanup, then release provider connections
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.pipeline.shutdown().await;
        self.provider.close();

        tracing::info!(provider = self.provider.name(), "text-to-image plugin shut down");
    }
}

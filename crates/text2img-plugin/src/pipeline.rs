use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use text2img_config::StorageConfig;
use text2img_imagegen::{ImageGenError, ImageGenProvider, Provider, Quality, Result};

use crate::{janitor::Janitor, store::ImageStore};

/// Prompt to local file: size selection, generation, persistence and
/// periodic cache cleanup
pub struct ImagePipeline<P = Provider> {
    provider: Arc<P>,
    default_ratio: String,
    store: ImageStore,
    janitor: Janitor,
    cleanup_interval: u32,
    generations: AtomicU32,
}

impl<P: ImageGenProvider> ImagePipeline<P> {
    pub fn new(provider: Arc<P>, default_ratio: impl Into<String>, storage: &StorageConfig) -> Self {
        let image_dir = storage.image_dir();

        Self {
            provider,
            default_ratio: default_ratio.into(),
            janitor: Janitor::new(&image_dir, storage.max_cached_images),
            store: ImageStore::new(image_dir),
            cleanup_interval: storage.cleanup_interval.max(1),
            generations: AtomicU32::new(0),
        }
    }

    /// Pick the size for `ratio` at `quality`
    ///
    /// An unsupported ratio falls back to the default ratio, then to the
    /// first ratio the provider lists. Returns `(ratio, size)`.
    pub fn resolve_size(&self, ratio: &str, quality: Quality) -> Result<(&'static str, &'static str)> {
        let table = self.provider.supported_ratios();

        let ratio = [ratio, self.default_ratio.as_str()]
            .into_iter()
            .find_map(|wanted| table.ratios().find(|r| *r == wanted))
            .or_else(|| table.ratios().next())
            .ok_or_else(|| ImageGenError::ConfigError("provider lists no supported ratios".to_owned()))?;

        let size = table
            .select(ratio, quality)
            .ok_or_else(|| ImageGenError::ConfigError(format!("no size configured for ratio {ratio}")))?;

        Ok((ratio, size))
    }

    /// Generate an image and store it, returning the local path
    pub async fn generate(&self, prompt: &str, ratio: &str, quality: Quality) -> Result<PathBuf> {
        self.run(prompt, ratio, quality)
            .await
            .map_err(|e| e.context("image generation failed"))
    }

    async fn run(&self, prompt: &str, ratio: &str, quality: Quality) -> Result<PathBuf> {
        let (ratio, size) = self.resolve_size(ratio, quality)?;

        tracing::debug!(provider = self.provider.name(), ratio, %quality, size, "generating image");

        let image = self.provider.generate_image(prompt, size).await?;
        let path = self.store.save(&image).await?;

        self.record_generation();

        Ok(path)
    }

    /// Count a successful generation and kick off cleanup every
    /// `cleanup_interval` generations
    fn record_generation(&self) {
        let interval = self.cleanup_interval;
        let crossed = self
            .generations
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(if n + 1 >= interval { 0 } else { n + 1 })
            })
            .is_ok_and(|previous| previous + 1 >= interval);

        if crossed {
            self.janitor.schedule();
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Wait for background cleanup and refuse new passes
    pub async fn shutdown(&self) {
        self.janitor.shutdown().await;
    }
}

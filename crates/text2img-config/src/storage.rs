use std::path::PathBuf;

use serde::Deserialize;

/// Image cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Plugin data directory; images are written to `{data_dir}/images`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Number of generated images kept on disk
    #[serde(default = "default_max_cached_images")]
    pub max_cached_images: usize,
    /// Run the cleanup pass once every N successful generations
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u32,
}

impl StorageConfig {
    /// Directory holding generated images
    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_cached_images: default_max_cached_images(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/text2img")
}

const fn default_max_cached_images() -> usize {
    50
}

const fn default_cleanup_interval() -> u32 {
    10
}

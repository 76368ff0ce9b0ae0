use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use text2img_imagegen::{GeneratedImage, Result};
use tokio::sync::OnceCell;

/// Local directory holding generated images
///
/// The directory is created on the first save, not at construction.
pub struct ImageStore {
    dir: PathBuf,
    ready: OnceCell<()>,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ready: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `image` under a fresh `{epoch}_{8 hex}{ext}` name
    pub async fn save(&self, image: &GeneratedImage) -> Result<PathBuf> {
        self.ready
            .get_or_try_init(|| async { tokio::fs::create_dir_all(&self.dir).await })
            .await?;

        let path = self.dir.join(file_name(image.extension));
        tokio::fs::write(&path, &image.data).await?;

        tracing::debug!(path = %path.display(), bytes = image.data.len(), "saved generated image");

        Ok(path)
    }
}

fn file_name(extension: &str) -> String {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    format!("{epoch}_{:08x}{extension}", rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_timestamped_and_random() {
        let name = file_name(".png");
        let (epoch, rest) = name.split_once('_').unwrap();

        assert!(epoch.parse::<u64>().unwrap() > 1_600_000_000);
        assert_eq!(rest.len(), 8 + ".png".len());
        assert!(rest[..8].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(rest.ends_with(".png"));
    }

    #[tokio::test]
    async fn save_creates_directory_lazily() {
        let root = tempfile::tempdir().unwrap();
        let store = ImageStore::new(root.path().join("nested").join("images"));
        assert!(!store.dir().exists());

        let path = store.save(&GeneratedImage::jpg(b"jpeg".to_vec())).await.unwrap();

        assert!(path.starts_with(store.dir()));
        assert_eq!(path.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn save_failure_is_a_local_io_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("taken");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let store = ImageStore::new(&blocker);
        let err = store.save(&GeneratedImage::png(vec![1, 2, 3])).await.unwrap_err();

        assert_eq!(err.kind(), text2img_imagegen::ErrorKind::LocalIo);
    }
}

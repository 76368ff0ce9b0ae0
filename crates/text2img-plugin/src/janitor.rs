use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio_util::task::TaskTracker;

/// Extensions the janitor treats as cached images
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "webp"];

/// Delete the oldest cached images in `dir` until at most `cap` remain
///
/// Files that vanish or cannot be removed mid-pass are skipped. Returns the
/// number of files actually deleted.
pub fn prune(dir: &Path, cap: usize) -> io::Result<usize> {
    let mut images = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        let is_image = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext));
        if !is_image {
            continue;
        }

        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            continue;
        };
        images.push((modified, path));
    }

    if images.len() <= cap {
        return Ok(0);
    }

    images.sort_by_key(|(modified, _)| *modified);
    let excess = images.len() - cap;

    let mut removed = 0;
    for (_, path) in images.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "could not remove cached image"),
        }
    }

    Ok(removed)
}

/// Background pruning of the image cache
///
/// Passes run on a [`TaskTracker`] so shutdown can wait for them; at most
/// one pass runs at a time.
pub struct Janitor {
    dir: PathBuf,
    cap: usize,
    tracker: TaskTracker,
    running: Arc<AtomicBool>,
}

impl Janitor {
    pub fn new(dir: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            dir: dir.into(),
            cap,
            tracker: TaskTracker::new(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a pass in the background unless one is already running or the
    /// janitor is shut down
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) -> bool {
        if self.tracker.is_closed() {
            return false;
        }

        if self.running.swap(true, Ordering::AcqRel) {
            tracing::debug!("cache cleanup already running, skipping");
            return false;
        }

        let dir = self.dir.clone();
        let cap = self.cap;
        let running = Arc::clone(&self.running);

        self.tracker.spawn(async move {
            sweep(dir, cap).await;
            running.store(false, Ordering::Release);
        });

        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop accepting passes and wait for the running one
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// One pass on the blocking pool; failures are logged, never returned
async fn sweep(dir: PathBuf, cap: usize) {
    let result = tokio::task::spawn_blocking(move || prune(&dir, cap)).await;

    match result {
        Ok(Ok(0)) => {}
        Ok(Ok(removed)) => tracing::debug!(removed, cap, "pruned cached images"),
        Ok(Err(e)) => tracing::warn!(error = %e, "failed to clean up cached images"),
        Err(e) => tracing::warn!(error = %e, "cache cleanup task failed"),
    }
}

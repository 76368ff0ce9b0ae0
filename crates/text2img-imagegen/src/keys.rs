use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;

use crate::error::{ImageGenError, Result};

/// Round-robin pool of API keys
///
/// Each call to [`KeyRotator::next_key`] hands out the key at the current
/// position and advances it. Concurrent callers may interleave, but the
/// position always stays within the pool.
pub struct KeyRotator {
    keys: Vec<SecretString>,
    position: AtomicUsize,
}

impl KeyRotator {
    pub fn new(keys: Vec<SecretString>) -> Self {
        Self {
            keys,
            position: AtomicUsize::new(0),
        }
    }

    /// Next key together with its position in the pool
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the pool is empty
    pub fn next_key(&self) -> Result<(usize, &SecretString)> {
        let len = self.keys.len();
        if len == 0 {
            return Err(ImageGenError::ConfigError("no API key configured".to_owned()));
        }

        let index = self
            .position
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % len))
            .unwrap_or_else(|i| i)
            % len;

        Ok((index, &self.keys[index]))
    }

    pub(crate) fn keys(&self) -> &[SecretString] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// An empty key pool is not an error here: the plugin still loads and
    /// every generation attempt reports the missing key to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if durations, limits or the base URL are invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_imagegen()?;
        self.validate_storage()?;
        self.limits.debounce_window()?;
        self.limits.record_ttl()?;
        Ok(())
    }

    fn validate_imagegen(&self) -> anyhow::Result<()> {
        let imagegen = &self.imagegen;

        if imagegen.ratio.trim().is_empty() {
            anyhow::bail!("imagegen.ratio must not be empty");
        }

        if imagegen.model.trim().is_empty() {
            anyhow::bail!("imagegen.model must not be empty");
        }

        // A blank override means "use the provider's public endpoint"
        if let Some(base_url) = imagegen.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
            url::Url::parse(base_url).map_err(|e| anyhow::anyhow!("invalid imagegen.base_url '{base_url}': {e}"))?;
        }

        Ok(())
    }

    fn validate_storage(&self) -> anyhow::Result<()> {
        if self.storage.max_cached_images == 0 {
            anyhow::bail!("storage.max_cached_images must be greater than 0");
        }

        if self.storage.cleanup_interval == 0 {
            anyhow::bail!("storage.cleanup_interval must be greater than 0");
        }

        Ok(())
    }
}

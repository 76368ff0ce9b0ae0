use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "z-image-turbo";

/// Aspect ratio used when none is configured or the requested one is unsupported
pub const DEFAULT_RATIO: &str = "1:1";

/// Negative prompt sent to providers that accept one
pub const DEFAULT_NEGATIVE_PROMPT: &str = "low quality, bad anatomy, bad hands, text, error, missing fingers, \
     extra digit, fewer digits, cropped, worst quality, normal quality, \
     jpeg artifacts, signature, watermark, username, blurry";

/// Image generation provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageGenConfig {
    /// Which upstream generates the images
    #[serde(default)]
    pub provider: ProviderKind,
    /// API key pool, rotated round-robin
    ///
    /// Accepts either a comma separated string or a list of strings.
    /// Blank entries are dropped.
    #[serde(default, rename = "api_key", deserialize_with = "deserialize_api_keys")]
    pub api_keys: Vec<SecretString>,
    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,
    /// Default aspect ratio
    #[serde(default = "default_ratio")]
    pub ratio: String,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Negative prompt
    #[serde(default = "default_negative_prompt")]
    pub negative_prompt: String,
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_keys: Vec::new(),
            model: default_model(),
            ratio: default_ratio(),
            base_url: None,
            negative_prompt: default_negative_prompt(),
        }
    }
}

/// Supported image generation providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Gitee AI (OpenAI-compatible)
    #[default]
    Gitee,
    /// Aliyun Bailian (`DashScope`)
    Aliyun,
    /// Volcengine Ark
    Volcengine,
}

impl ProviderKind {
    /// Configuration name of the provider
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gitee => "gitee",
            Self::Aliyun => "aliyun",
            Self::Volcengine => "volcengine",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_ratio() -> String {
    DEFAULT_RATIO.to_owned()
}

fn default_negative_prompt() -> String {
    DEFAULT_NEGATIVE_PROMPT.to_owned()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawApiKeys {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_api_keys<'de, D>(deserializer: D) -> Result<Vec<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let keys = match RawApiKeys::deserialize(deserializer)? {
        RawApiKeys::Joined(joined) => split_keys(joined.split(',')),
        RawApiKeys::List(list) => split_keys(list.iter().map(String::as_str)),
    };

    Ok(keys)
}

fn split_keys<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<SecretString> {
    raw.map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| SecretString::from(key.to_owned()))
        .collect()
}

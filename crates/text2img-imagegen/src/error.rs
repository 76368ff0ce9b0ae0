use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Coarse failure category, stable across added context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing API key or unusable provider setup
    Configuration,
    /// Connection failure or non-2xx status from the provider
    Transport,
    /// Provider answered, but not with the expected payload
    ResponseShape,
    /// Writing the image locally failed
    LocalIo,
}

/// Image generation errors
///
/// Every variant carries a message that is safe to show to the chat user.
/// Secrets never end up in these messages.
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// Configuration error (e.g. empty key pool)
    #[error("{0}")]
    ConfigError(String),

    /// The provider rejected the API key
    #[error("{0}")]
    AuthenticationFailed(String),

    /// The provider throttled the request
    #[error("{0}")]
    RateLimited(String),

    /// Provider API returned a non-success status
    #[error("{message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error
    #[error("{0}")]
    ConnectionError(String),

    /// Response body could not be parsed or lacked expected fields
    #[error("{0}")]
    InvalidResponse(String),

    /// Response was well formed but held neither a URL nor inline image data
    #[error("{0}")]
    NoImageData(String),

    /// Local filesystem error while persisting an image
    #[error("{0}")]
    Io(String),
}

impl ImageGenError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) => ErrorKind::Configuration,
            Self::AuthenticationFailed(_)
            | Self::RateLimited(_)
            | Self::ProviderApiError { .. }
            | Self::ConnectionError(_) => ErrorKind::Transport,
            Self::InvalidResponse(_) | Self::NoImageData(_) => ErrorKind::ResponseShape,
            Self::Io(_) => ErrorKind::LocalIo,
        }
    }

    /// HTTP status reported by the provider, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderApiError { status, .. } => Some(*status),
            Self::AuthenticationFailed(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Prefix the message with `context`, keeping the variant
    #[must_use]
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        let wrap = |message: String| format!("{context}: {message}");

        match self {
            Self::ConfigError(m) => Self::ConfigError(wrap(m)),
            Self::AuthenticationFailed(m) => Self::AuthenticationFailed(wrap(m)),
            Self::RateLimited(m) => Self::RateLimited(wrap(m)),
            Self::ProviderApiError { status, message } => Self::ProviderApiError {
                status,
                message: wrap(message),
            },
            Self::ConnectionError(m) => Self::ConnectionError(wrap(m)),
            Self::InvalidResponse(m) => Self::InvalidResponse(wrap(m)),
            Self::NoImageData(m) => Self::NoImageData(wrap(m)),
            Self::Io(m) => Self::Io(wrap(m)),
        }
    }
}

impl From<std::io::Error> for ImageGenError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind_and_status() {
        let err = ImageGenError::ProviderApiError {
            status: 503,
            message: "upstream unavailable".to_owned(),
        }
        .context("image generation failed");

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "image generation failed: upstream unavailable");
    }

    #[test]
    fn context_nests() {
        let err = ImageGenError::NoImageData("no URL or base64 data returned".to_owned())
            .context("Gitee AI")
            .context("image generation failed");

        assert_eq!(err.kind(), ErrorKind::ResponseShape);
        assert_eq!(
            err.to_string(),
            "image generation failed: Gitee AI: no URL or base64 data returned"
        );
    }

    #[test]
    fn io_errors_are_local() {
        let err: ImageGenError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert_eq!(err.kind(), ErrorKind::LocalIo);
        assert!(err.status().is_none());
    }

    #[test]
    fn missing_key_is_configuration() {
        let err = ImageGenError::ConfigError("no API key configured".to_owned());
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

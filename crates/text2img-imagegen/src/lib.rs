#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

//! Text-to-image providers
//!
//! Wraps the Gitee AI, Aliyun Bailian and Volcengine Ark image APIs behind a
//! single [`ImageGenProvider`] contract. Every provider turns a prompt and a
//! size string into raw image bytes plus a file extension; choosing the size
//! from an aspect ratio and quality level is left to the caller via the
//! provider's [`ResolutionTable`].

mod error;
mod http_client;
mod keys;
mod provider;
pub mod resolution;
mod types;

pub use error::{ErrorKind, ImageGenError, Result};
pub use keys::KeyRotator;
pub use provider::{AliyunProvider, GiteeProvider, ImageGenProvider, Provider, VolcengineProvider};
pub use resolution::{Quality, ResolutionTable};
pub use types::GeneratedImage;

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Chat-facing text-to-image plugin
//!
//! [`Text2ImagePlugin`] ties a configured provider to the local image cache
//! and a per-user request gate, and exposes the two host entry points: a
//! tool call ([`Text2ImagePlugin::draw`]) and the `t2img` slash command
//! ([`Text2ImagePlugin::command`]).

mod command;
mod gate;
mod janitor;
mod pipeline;
mod plugin;
mod store;

pub use command::{ParsedCommand, USAGE, parse_command};
pub use gate::{InFlightGuard, Rejection, RequestGate};
pub use janitor::{Janitor, prune};
pub use pipeline::ImagePipeline;
pub use plugin::{MessageSink, Reply, Text2ImagePlugin};
pub use store::ImageStore;

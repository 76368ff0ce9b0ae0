use std::path::PathBuf;

use clap::Parser;

/// Local host for the text-to-image plugin
#[derive(Debug, Parser)]
#[command(name = "text2img", about = "Generate images from chat-style commands on stdin")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "text2img.toml", env = "TEXT2IMG_CONFIG")]
    pub config: PathBuf,

    /// User id the requests are attributed to
    #[arg(short, long, default_value = "local", env = "TEXT2IMG_USER")]
    pub user: String,
}

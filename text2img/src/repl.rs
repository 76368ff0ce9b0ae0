use std::path::Path;

use async_trait::async_trait;
use text2img_plugin::{MessageSink, Reply, Text2ImagePlugin};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

const HELP: &str = "\
commands:
  /t2img <prompt> [ratio] [quality]   generate with the slash command (quality: s, m, h)
  draw <prompt>                       generate through the tool-call entry point
  ratios                              list supported ratios and sizes
  help                                show this message";

/// One line typed by the user
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    /// `t2img ...` or `/t2img ...`, passed through whole
    Command(&'a str),
    /// `draw <prompt>`
    Draw(&'a str),
    Ratios,
    Help,
    Empty,
    Unknown(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match head {
            "" => Self::Empty,
            "t2img" | "/t2img" => Self::Command(line),
            "draw" | "/draw" => Self::Draw(rest.trim()),
            "ratios" | "/ratios" => Self::Ratios,
            "help" | "/help" => Self::Help,
            _ => Self::Unknown(line),
        }
    }
}

/// Prints where the image landed instead of uploading it
struct StdoutSink;

#[async_trait]
impl MessageSink for StdoutSink {
    async fn send_image(&self, path: &Path) -> anyhow::Result<()> {
        println!("[image] {}", path.display());
        Ok(())
    }
}

/// Feed stdin lines to the plugin until EOF or `shutdown` fires
pub async fn run(plugin: &Text2ImagePlugin, user_id: &str, shutdown: CancellationToken) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::debug!("stdin closed");
            break;
        };

        handle(plugin, user_id, &line).await;
    }

    Ok(())
}

async fn handle(plugin: &Text2ImagePlugin, user_id: &str, line: &str) {
    match Input::parse(line) {
        Input::Empty => {}
        Input::Command(message) => match plugin.command(user_id, message).await {
            Reply::Image(path) => println!("[image] {}", path.display()),
            Reply::Text(text) => println!("{text}"),
        },
        Input::Draw("") => println!("usage: draw <prompt>"),
        Input::Draw(prompt) => println!("{}", plugin.draw(user_id, prompt, &StdoutSink).await),
        Input::Ratios => {
            for (ratio, sizes) in plugin.supported_ratios().iter() {
                println!("{ratio:>6}  {}", sizes.join(" / "));
            }
        }
        Input::Help => println!("{HELP}"),
        Input::Unknown(other) => println!("unrecognized input '{other}', type 'help' for commands"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_commands() {
        assert_eq!(Input::parse("/t2img a cat 16:9 h"), Input::Command("/t2img a cat 16:9 h"));
        assert_eq!(Input::parse("  t2img  "), Input::Command("t2img"));
        assert_eq!(Input::parse("draw  a red fox "), Input::Draw("a red fox"));
        assert_eq!(Input::parse("draw"), Input::Draw(""));
        assert_eq!(Input::parse("ratios"), Input::Ratios);
        assert_eq!(Input::parse("help"), Input::Help);
        assert_eq!(Input::parse("   "), Input::Empty);
        assert_eq!(Input::parse("t2imgx cat"), Input::Unknown("t2imgx cat"));
    }
}

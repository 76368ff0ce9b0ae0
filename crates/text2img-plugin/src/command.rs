use text2img_imagegen::{Quality, ResolutionTable};

/// Shown when the command carries no prompt
pub const USAGE: &str = "Please provide a prompt! Usage: /t2img <prompt> [ratio] [quality]";

const COMMAND: &str = "t2img";

/// Ratio used by the slash command when none is given
const COMMAND_DEFAULT_RATIO: &str = "1:1";

/// Arguments of a `t2img` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub prompt: String,
    pub ratio: String,
    pub quality: Quality,
}

/// Parse `[/]t2img <prompt> [ratio] [quality]`
///
/// Trailing quality and ratio tokens are peeled off right to left, each only
/// while another token remains, so a one-word prompt is never consumed.
/// Ratios must appear in `table`. Returns `None` when no prompt is left.
pub fn parse_command(message: &str, table: &ResolutionTable) -> Option<ParsedCommand> {
    let mut tokens: Vec<&str> = message.split_whitespace().collect();

    if tokens.first().is_some_and(|t| t.strip_prefix('/').unwrap_or(t) == COMMAND) {
        tokens.remove(0);
    }

    let mut quality = Quality::Small;
    if tokens.len() > 1
        && let Some(q) = tokens.last().and_then(|t| Quality::from_symbol(t))
    {
        quality = q;
        tokens.pop();
    }

    let mut ratio = COMMAND_DEFAULT_RATIO;
    if tokens.len() > 1
        && let Some(r) = tokens.last().copied().filter(|t| table.contains(t))
    {
        ratio = r;
        tokens.pop();
    }

    if tokens.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        prompt: tokens.join(" "),
        ratio: ratio.to_owned(),
        quality,
    })
}

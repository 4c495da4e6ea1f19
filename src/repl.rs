//! Line parser for the interactive studio.

use crate::artifacts::ArtifactKind;
use crate::gateway::Voice;
use crate::pipeline::StageRequest;
use std::path::PathBuf;

/// A parsed studio command.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Stage(StageRequest),
    Status,
    Show(ArtifactKind),
    Reset,
    Help,
    Quit,
    /// Blank input
    Nothing,
}

pub const HELP: &str = "\
Commands:
  script [prompt]      generate a script (no prompt: rewrite the current one)
  audio [voice]        narrate the script (alloy, female, male)
  upload <path>        use a recorded narration instead
  transcribe           timestamped transcription of the audio
  storyboard           one visual prompt per segment
  metadata             title, description and thumbnail prompt
  video                assemble the slides over the narration
  status               list artifacts
  show <artifact>      print an artifact (script, audio, timestamps, storyboard, metadata, video)
  reset                start a new session
  help                 show this help
  quit                 leave the studio";

/// Parse one input line.
///
/// # Errors
///
/// A message suitable for showing the user as-is.
pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Nothing);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "script" => ReplCommand::Stage(StageRequest::Script {
            prompt: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "audio" | "narrate" => {
            let voice = if rest.is_empty() {
                Voice::default()
            } else {
                rest.parse()?
            };
            ReplCommand::Stage(StageRequest::SynthesizeAudio { voice })
        }
        "upload" => {
            if rest.is_empty() {
                return Err("usage: upload <path>".to_string());
            }
            ReplCommand::Stage(StageRequest::UploadAudio {
                path: PathBuf::from(unquote(rest)),
            })
        }
        "transcribe" | "transcription" => no_args(rest, ReplCommand::Stage(StageRequest::Transcribe))?,
        "storyboard" => no_args(rest, ReplCommand::Stage(StageRequest::Storyboard))?,
        "metadata" => no_args(rest, ReplCommand::Stage(StageRequest::Metadata))?,
        "video" => no_args(rest, ReplCommand::Stage(StageRequest::Video))?,
        "status" => ReplCommand::Status,
        "show" => {
            if rest.is_empty() {
                return Err("usage: show <artifact>".to_string());
            }
            ReplCommand::Show(rest.parse()?)
        }
        "reset" => ReplCommand::Reset,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(command)
}

fn no_args(rest: &str, command: ReplCommand) -> Result<ReplCommand, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(format!("unexpected argument '{rest}'"))
    }
}

/// Strip one pair of matching quotes, as left by a dropped file path.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

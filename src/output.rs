//! Terminal rendering for the studio and the `run` command.

use crate::artifacts::{ArtifactKind, Session};
use crate::error::StudioError;
use crate::media::wav;
use crate::pipeline::Stage;
use owo_colors::OwoColorize;

/// Print a gating notice or a failure, whichever the error is.
///
/// Missing inputs are guidance, not failures, so they render as a yellow
/// notice.
pub fn report_error(err: &StudioError) {
    if err.is_validation() {
        eprintln!("{} {}", "notice:".yellow().bold(), err);
    } else {
        eprintln!("{} {}", "error:".red().bold(), err);
    }
}

pub fn report_done(stage: Stage, session: &Session) {
    let detail = summarize(session, stage.output()).unwrap_or_default();
    eprintln!("{} {} {}", "✓".green(), stage.title(), detail.dimmed());
}

/// One line per artifact: present or missing, with a short summary.
pub fn format_status(session: &Session) -> String {
    let mut out = String::new();
    for kind in ArtifactKind::ALL {
        let line = match summarize(session, kind) {
            Some(detail) => format!("  {} {:<11} {}", "●".green(), kind.label(), detail),
            None => format!("  {} {:<11} {}", "○".dimmed(), kind.label(), "missing".dimmed()),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Short description of an artifact, or `None` when absent.
pub fn summarize(session: &Session, kind: ArtifactKind) -> Option<String> {
    if !session.has(kind) {
        return None;
    }
    let summary = match kind {
        ArtifactKind::ScriptText => {
            let script = session.script_text()?;
            format!("{} words", script.split_whitespace().count())
        }
        ArtifactKind::AudioPath => {
            let path = session.audio_path()?;
            match wav::inspect_file(path) {
                Some(info) => format!(
                    "{} ({:.1}s)",
                    path.display(),
                    info.duration.as_secs_f64()
                ),
                None => path.display().to_string(),
            }
        }
        ArtifactKind::Timestamps => plural(session.timestamps()?.len(), "segment"),
        ArtifactKind::Storyboard => plural(session.storyboard()?.len(), "scene"),
        ArtifactKind::Metadata => {
            let metadata = session.metadata()?;
            metadata.lines().next().unwrap_or_default().to_string()
        }
        ArtifactKind::VideoPath => session.video_path()?.display().to_string(),
    };
    Some(summary)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Full rendering of an artifact for `show`.
///
/// Timestamps and storyboard render as pretty JSON, the same shape a caller
/// would persist them in.
pub fn format_artifact(session: &Session, kind: ArtifactKind) -> Option<String> {
    if !session.has(kind) {
        return None;
    }
    match kind {
        ArtifactKind::ScriptText => session.script_text().map(str::to_string),
        ArtifactKind::AudioPath => session.audio_path().map(|p| p.display().to_string()),
        ArtifactKind::Timestamps => session
            .timestamps()
            .and_then(|s| serde_json::to_string_pretty(s).ok()),
        ArtifactKind::Storyboard => session
            .storyboard()
            .and_then(|s| serde_json::to_string_pretty(s).ok()),
        ArtifactKind::Metadata => session.metadata().map(str::to_string),
        ArtifactKind::VideoPath => session.video_path().map(|p| p.display().to_string()),
    }
}

/// Names of the stages that may run now, for the prompt hint.
pub fn format_runnable(stages: &[Stage]) -> String {
    stages
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

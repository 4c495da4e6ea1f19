//! Application entry points: wiring, the one-shot run, and the studio loop.

use crate::artifacts::ArtifactKind;
use crate::config::Config;
use crate::error::{Result, StudioError, ValidationError};
use crate::gateway::{OpenAiGateway, Voice};
use crate::media::{FfmpegAssembler, ResourceStore};
use crate::output;
use crate::pipeline::{Pipeline, StageRequest};
use crate::repl::{self, ReplCommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Wire the HTTP gateway, the ffmpeg assembler and the scratch store.
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let gateway = OpenAiGateway::new(&config.service, &config.voices)?;
    let assembler = FfmpegAssembler::new(&config.video);
    let resources = ResourceStore::new(config.storage.resolve_dir())?;
    debug!(scratch = %resources.dir().display(), "pipeline wired");
    Ok(Pipeline::new(
        Box::new(gateway),
        Box::new(assembler),
        resources,
    ))
}

/// Where the narration for a one-shot run comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Narration {
    Synthesize(Voice),
    Upload(PathBuf),
}

/// Stage requests for a full production, in dependency order.
pub fn production_plan(topic: &str, narration: Narration, include_video: bool) -> Vec<StageRequest> {
    let audio = match narration {
        Narration::Synthesize(voice) => StageRequest::SynthesizeAudio { voice },
        Narration::Upload(path) => StageRequest::UploadAudio { path },
    };
    let mut plan = vec![
        StageRequest::Script {
            prompt: Some(topic.to_string()),
        },
        audio,
        StageRequest::Transcribe,
        StageRequest::Storyboard,
        StageRequest::Metadata,
    ];
    if include_video {
        plan.push(StageRequest::Video);
    }
    plan
}

/// Run every stage of `plan` in order, stopping at the first error.
pub fn run_production(pipeline: &mut Pipeline, plan: Vec<StageRequest>, quiet: bool) -> Result<()> {
    for request in plan {
        run_with_spinner(pipeline, request, quiet)?;
    }

    let session = pipeline.session();
    if let Some(metadata) = session.metadata() {
        println!("{metadata}");
    }
    if let Some(video) = session.video_path() {
        println!("{}", video.display());
    }
    Ok(())
}

fn run_with_spinner(pipeline: &mut Pipeline, request: StageRequest, quiet: bool) -> Result<()> {
    let stage = request.stage();
    let spinner = spinner(quiet, stage.title());
    let result = pipeline.run(request);
    spinner.finish_and_clear();

    match result {
        Ok(stage) => {
            if !quiet {
                output::report_done(stage, pipeline.session());
            }
            Ok(())
        }
        Err(e) => {
            output::report_error(&e);
            Err(e)
        }
    }
}

fn spinner(quiet: bool, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    // SAFETY: hardcoded template string, always valid
    #[allow(clippy::expect_used)]
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} ({elapsed})")
        .expect("hardcoded spinner template");
    pb.set_style(style);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Interactive studio on stdin.
pub fn run_studio(pipeline: &mut Pipeline, quiet: bool) -> Result<()> {
    if !quiet {
        eprintln!("TL;DR Studio. Type 'help' for commands.");
        eprintln!("{}", pipeline.describe());
    }
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    studio_loop(pipeline, stdin.lock(), &mut stdout, quiet)
}

/// The studio read-eval loop over any line source.
///
/// Stage errors are reported and the loop continues; only I/O errors on the
/// terminal itself end it.
pub fn studio_loop<R: BufRead, W: Write>(
    pipeline: &mut Pipeline,
    input: R,
    out: &mut W,
    quiet: bool,
) -> Result<()> {
    let mut lines = input.lines();
    loop {
        if !quiet {
            write!(
                out,
                "[{}] studio> ",
                output::format_runnable(&pipeline.runnable())
            )?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match repl::parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };

        match command {
            ReplCommand::Nothing => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => writeln!(out, "{}", repl::HELP)?,
            ReplCommand::Status => write!(out, "{}", output::format_status(pipeline.session()))?,
            ReplCommand::Show(kind) => show(pipeline, kind, out)?,
            ReplCommand::Reset => {
                pipeline.reset();
                writeln!(out, "Session cleared.")?;
            }
            ReplCommand::Stage(request) => {
                // Reported inside; the studio keeps going.
                if let Err(e) = run_with_spinner(pipeline, request, quiet) {
                    debug!(error = %e, "studio stage failed");
                }
            }
        }
    }
    Ok(())
}

fn show<W: Write>(pipeline: &Pipeline, kind: ArtifactKind, out: &mut W) -> Result<()> {
    match output::format_artifact(pipeline.session(), kind) {
        Some(text) => writeln!(out, "{text}")?,
        None => {
            let missing = StudioError::from(ValidationError::MissingArtifact { artifact: kind });
            output::report_error(&missing);
        }
    }
    Ok(())
}

//! Video assembly through the `ffmpeg` binary.
//!
//! Each slide is a solid-colour `lavfi` source with the slide label drawn in
//! the centre. Slides are concatenated in order, the audio track is mapped on
//! top, and the output is cut at the plan's nominal duration so the video
//! length never depends on the audio length.

use crate::config::VideoConfig;
use crate::error::AssemblyError;
use crate::media::assembler::{VideoAssembler, VideoPlan};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info};

/// Lines of encoder stderr kept in an error.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct FfmpegAssembler {
    binary: String,
    width: u32,
    height: u32,
    background: String,
    font_color: String,
    font_size: u32,
    font_file: Option<PathBuf>,
    wrap_width: usize,
}

impl FfmpegAssembler {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            binary: config.ffmpeg.clone(),
            width: config.width,
            height: config.height,
            background: config.background.clone(),
            font_color: config.font_color.clone(),
            font_size: config.font_size,
            font_file: config.font_file.clone(),
            wrap_width: config.wrap_width,
        }
    }

    /// Build the full ffmpeg argument list.
    ///
    /// `label_files` holds one text file per slide, in slide order.
    fn build_args(&self, plan: &VideoPlan, label_files: &[PathBuf], output: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel", "error"]
            .map(String::from)
            .to_vec();

        for slide in &plan.slides {
            args.extend([
                "-f".to_string(),
                "lavfi".to_string(),
                "-t".to_string(),
                format_secs(slide.duration),
                "-i".to_string(),
                format!(
                    "color=c={}:s={}x{}:r={}",
                    self.background, self.width, self.height, plan.fps
                ),
            ]);
        }
        args.extend(["-i".to_string(), plan.audio.display().to_string()]);

        args.extend([
            "-filter_complex".to_string(),
            self.filter_graph(label_files),
            "-map".to_string(),
            "[v]".to_string(),
            "-map".to_string(),
            format!("{}:a:0", plan.slides.len()),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-r".to_string(),
            plan.fps.to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-t".to_string(),
            format_secs(plan.nominal_duration()),
            output.display().to_string(),
        ]);
        args
    }

    fn filter_graph(&self, label_files: &[PathBuf]) -> String {
        let font = self
            .font_file
            .as_ref()
            .map(|f| format!(":fontfile={}", quote_filter_value(&f.display().to_string())))
            .unwrap_or_default();

        let mut chains: Vec<String> = label_files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                format!(
                    "[{i}:v]drawtext=textfile={}{font}:expansion=none:fontcolor={}:fontsize={}:\
                     line_spacing=10:x=(w-text_w)/2:y=(h-text_h)/2[s{i}]",
                    quote_filter_value(&file.display().to_string()),
                    self.font_color,
                    self.font_size,
                )
            })
            .collect();

        let inputs: String = (0..label_files.len()).map(|i| format!("[s{i}]")).collect();
        chains.push(format!(
            "{inputs}concat=n={}:v=1:a=0[v]",
            label_files.len()
        ));
        chains.join(";")
    }
}

impl VideoAssembler for FfmpegAssembler {
    fn assemble(&self, plan: &VideoPlan, output: &Path) -> Result<(), AssemblyError> {
        if plan.slides.is_empty() {
            return Err(AssemblyError::EmptyPlan);
        }
        if !plan.audio.is_file() {
            return Err(AssemblyError::AudioUnavailable {
                path: plan.audio.display().to_string(),
            });
        }

        // Labels go through files with expansion off, so `%`, `\` and `:` stay literal
        let labels_dir = tempfile::tempdir()?;
        let mut label_files = Vec::with_capacity(plan.slides.len());
        for (i, slide) in plan.slides.iter().enumerate() {
            let path = labels_dir.path().join(format!("slide-{i:03}.txt"));
            fs::write(&path, wrap_label(&slide.label, self.wrap_width))?;
            label_files.push(path);
        }

        let args = self.build_args(plan, &label_files, output);
        debug!(binary = %self.binary, ?args, "running encoder");

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output();
        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssemblyError::EncoderNotFound {
                    binary: self.binary.clone(),
                });
            }
            Err(e) => return Err(AssemblyError::Io(e)),
        };

        if !out.status.success() {
            return Err(AssemblyError::EncoderFailed {
                status: out.status.to_string(),
                stderr: stderr_tail(&String::from_utf8_lossy(&out.stderr)),
            });
        }

        info!(
            slides = plan.slides.len(),
            seconds = plan.nominal_duration().as_secs(),
            output = %output.display(),
            "video encoded"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} ({}x{})", self.binary, self.width, self.height)
    }
}

/// Seconds as ffmpeg accepts them: `5`, `2.5`.
fn format_secs(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    format!("{secs}")
}

/// Single-quote a filter option value.
fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap_label(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

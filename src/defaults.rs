//! Default configuration constants for tldr-studio.
//!
//! Shared by the config types and the pipeline stages so both agree on
//! model names, persona prompts and video geometry.

use std::time::Duration;

/// Base URL of the OpenAI-compatible API.
pub const BASE_URL: &str = "https://api.openai.com/v1";

/// Chat model used for scripts, storyboard prompts and metadata.
pub const COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Speech synthesis model.
pub const SPEECH_MODEL: &str = "tts-1";

/// Speech-to-text model.
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Sampling temperature for every completion call.
pub const TEMPERATURE: f32 = 0.7;

/// Audio encoding requested from speech synthesis.
pub const SPEECH_FORMAT: &str = "wav";

/// Length of each synthetic transcript window and of each video slide.
pub const SEGMENT_SECS: u32 = 5;

/// Frame rate of the assembled video.
pub const VIDEO_FPS: u32 = 24;

pub const VIDEO_WIDTH: u32 = 1280;
pub const VIDEO_HEIGHT: u32 = 720;
pub const VIDEO_BACKGROUND: &str = "black";
pub const VIDEO_FONT_COLOR: &str = "white";
pub const VIDEO_FONT_SIZE: u32 = 42;

/// Characters per line before a slide label wraps.
pub const LABEL_WRAP_WIDTH: usize = 40;

pub const FFMPEG_BINARY: &str = "ffmpeg";

/// Persona for the script stage.
pub const SCRIPT_SYSTEM_PROMPT: &str = "You are a scriptwriter for short explainer videos. \
Write a clear, engaging narration script of about 60 to 90 seconds on the topic you are given. \
Put each spoken sentence on its own line. Output only the narration, without stage directions, \
headings or speaker labels.";

/// Persona for the storyboard stage.
pub const STORYBOARD_SYSTEM_PROMPT: &str = "You write prompts for an image generator. \
Given a line of narration, describe one vivid, concrete visual for that scene in a single \
sentence. Output only the prompt.";

/// Persona for the metadata stage.
pub const METADATA_SYSTEM_PROMPT: &str = "You are a YouTube growth strategist. \
Given a video script, write a catchy title (under 70 characters), a description of two short \
paragraphs with relevant hashtags, and a prompt for an eye-catching thumbnail image. \
Label the three parts 'Title:', 'Description:' and 'Thumbnail prompt:'.";

/// Prefix of every per-segment storyboard request.
pub const STORYBOARD_REQUEST_PREFIX: &str = "Create an image prompt for a video scene: ";

/// Duration of one slide / transcript window.
pub fn segment_duration() -> Duration {
    Duration::from_secs(u64::from(SEGMENT_SECS))
}

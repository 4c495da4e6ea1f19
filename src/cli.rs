//! Command-line interface for tldr-studio
//!
//! Provides argument parsing using clap derive macros.

use crate::gateway::Voice;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Turn a topic into a narrated explainer video
#[derive(Parser, Debug)]
#[command(
    name = "tldr-studio",
    version,
    about = "Turn a topic into a narrated explainer video"
)]
pub struct Cli {
    /// Subcommand to execute (default: interactive studio)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Request timeout for service calls. Examples: 90s, 2m
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,
}

/// Parse a timeout string.
///
/// Supports any duration format accepted by `humantime`, plus bare numbers
/// as seconds.
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive studio: run stages one at a time
    Studio,

    /// Produce a whole video from a topic, stopping at the first error
    Run {
        /// Topic or prompt for the script
        #[arg(long, short = 't', value_name = "TEXT")]
        topic: String,

        /// Narration voice
        #[arg(long, value_enum, default_value_t = Voice::Alloy, conflicts_with = "audio")]
        voice: Voice,

        /// Use this recording instead of synthesizing narration
        #[arg(long, value_name = "PATH")]
        audio: Option<PathBuf>,

        /// Stop after metadata; skip video assembly
        #[arg(long)]
        no_video: bool,
    },

    /// List narration voices and the provider voice each maps to
    Voices,

    /// Check ffmpeg and service credentials
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (API key redacted)
    Show,
    /// Print the default configuration file path
    Path,
    /// Dump the default configuration
    Dump,
}

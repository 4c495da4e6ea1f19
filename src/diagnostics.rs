//! System diagnostics and dependency checking.
//!
//! Verifies that ffmpeg is usable and that the service credentials and
//! scratch directory are in place before a long production run.

use crate::config::Config;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Dependency is installed and working
    Ok,
    /// Dependency is not found
    NotFound,
    /// Dependency is found but has issues (e.g., missing filter)
    Warning(String),
}

/// Check if a command exists and runs. ffmpeg takes a single-dash `-version`.
fn check_command(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but {} failed", command, version_flag)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Check that ffmpeg was built with the `drawtext` filter (needs libfreetype).
fn check_drawtext(ffmpeg: &str) -> CheckResult {
    match Command::new(ffmpeg)
        .args(["-hide_banner", "-filters"])
        .output()
    {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.contains("drawtext") {
                CheckResult::Ok
            } else {
                CheckResult::Warning(
                    "ffmpeg lacks the drawtext filter; rebuild it with --enable-libfreetype"
                        .to_string(),
                )
            }
        }
        Ok(_) => CheckResult::Warning("ffmpeg -filters failed".to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking ffmpeg filters: {}", e)),
    }
}

fn check_api_key(config: &Config) -> CheckResult {
    match config.service.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => CheckResult::Ok,
        _ => CheckResult::NotFound,
    }
}

fn check_scratch_dir(config: &Config) -> CheckResult {
    let dir = config.storage.resolve_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        return CheckResult::Warning(format!("cannot create {}: {}", dir.display(), e));
    }
    match tempfile::tempfile_in(&dir) {
        Ok(_) => CheckResult::Ok,
        Err(e) => CheckResult::Warning(format!("{} is not writable: {}", dir.display(), e)),
    }
}

/// Run all dependency checks and print results.
///
/// Returns `true` when a full production run can succeed.
pub fn check_dependencies(config: &Config) -> bool {
    println!("Checking dependencies...\n");

    let ffmpeg = config.video.ffmpeg.as_str();
    print!("ffmpeg ({}): ", ffmpeg);
    let ffmpeg_ok = match check_command(ffmpeg, "-version") {
        CheckResult::Ok => match check_drawtext(ffmpeg) {
            CheckResult::Ok => {
                println!("✓ OK");
                true
            }
            CheckResult::Warning(msg) => {
                println!("⚠ WARNING: {}", msg);
                false
            }
            CheckResult::NotFound => {
                println!("✗ NOT FOUND");
                false
            }
        },
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            println!("  Install: sudo apt install ffmpeg  (Debian/Ubuntu)");
            println!("           brew install ffmpeg      (macOS)");
            println!("  Or point [video] ffmpeg / TLDR_STUDIO_FFMPEG at a binary.");
            false
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {}", msg);
            false
        }
    };

    print!("API key: ");
    let key_ok = match check_api_key(config) {
        CheckResult::Ok => {
            println!("✓ OK ({})", config.service.base_url);
            true
        }
        _ => {
            println!("✗ NOT SET");
            println!("  Export OPENAI_API_KEY or set [service] api_key in the config file.");
            false
        }
    };

    print!("Scratch directory: ");
    let scratch_ok = match check_scratch_dir(config) {
        CheckResult::Ok => {
            println!("✓ OK ({})", config.storage.resolve_dir().display());
            true
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {}", msg);
            false
        }
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            false
        }
    };

    println!();
    if !key_ok {
        println!("⚠ Script, audio, transcription, storyboard and metadata need an API key.");
    }
    if !ffmpeg_ok {
        println!("⚠ Video assembly will fail until ffmpeg with drawtext is available.");
    }
    let ready = ffmpeg_ok && key_ok && scratch_ok;
    if ready {
        println!("✓ Ready to produce videos.");
    }
    ready
}

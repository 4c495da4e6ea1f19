use crate::defaults;
use crate::error::{Result, StudioError};
use crate::gateway::Voice;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub voices: VoiceConfig,
    pub video: VideoConfig,
    pub storage: StorageConfig,
}

/// Generative service endpoint and models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub completion_model: String,
    pub speech_model: String,
    pub transcription_model: String,
    /// Transport-level timeout per request. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

/// Provider voice id for each voice selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    pub alloy: String,
    pub female: String,
    pub male: String,
}

/// Slide rendering and encoder settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    pub ffmpeg: String,
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub font_color: String,
    pub font_size: u32,
    /// Font for slide labels; fontconfig's default when unset.
    pub font_file: Option<PathBuf>,
    pub wrap_width: usize,
}

/// Where session audio and video files are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            api_key: None,
            completion_model: defaults::COMPLETION_MODEL.to_string(),
            speech_model: defaults::SPEECH_MODEL.to_string(),
            transcription_model: defaults::TRANSCRIPTION_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            alloy: "alloy".to_string(),
            female: "nova".to_string(),
            male: "onyx".to_string(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::FFMPEG_BINARY.to_string(),
            width: defaults::VIDEO_WIDTH,
            height: defaults::VIDEO_HEIGHT,
            background: defaults::VIDEO_BACKGROUND.to_string(),
            font_color: defaults::VIDEO_FONT_COLOR.to_string(),
            font_size: defaults::VIDEO_FONT_SIZE,
            font_file: None,
            wrap_width: defaults::LABEL_WRAP_WIDTH,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl VoiceConfig {
    /// Provider voice id for a selector.
    pub fn provider_id(&self, voice: Voice) -> &str {
        match voice {
            Voice::Alloy => &self.alloy,
            Voice::Female => &self.female,
            Voice::Male => &self.male,
        }
    }
}

impl StorageConfig {
    /// Scratch directory for session resources.
    ///
    /// Defaults to `$TMPDIR/tldr-studio`.
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("tldr-studio"))
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or defaults if the file doesn't exist.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(StudioError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - OPENAI_API_KEY → service.api_key
    /// - TLDR_STUDIO_API_KEY → service.api_key (wins over OPENAI_API_KEY)
    /// - TLDR_STUDIO_BASE_URL → service.base_url
    /// - TLDR_STUDIO_MODEL → service.completion_model
    /// - TLDR_STUDIO_FFMPEG → video.ffmpeg
    pub fn with_env_overrides(mut self) -> Self {
        for key in ["OPENAI_API_KEY", "TLDR_STUDIO_API_KEY"] {
            if let Ok(api_key) = std::env::var(key)
                && !api_key.is_empty()
            {
                self.service.api_key = Some(api_key);
            }
        }

        if let Ok(base_url) = std::env::var("TLDR_STUDIO_BASE_URL")
            && !base_url.is_empty()
        {
            self.service.base_url = base_url;
        }

        if let Ok(model) = std::env::var("TLDR_STUDIO_MODEL")
            && !model.is_empty()
        {
            self.service.completion_model = model;
        }

        if let Ok(ffmpeg) = std::env::var("TLDR_STUDIO_FFMPEG")
            && !ffmpeg.is_empty()
        {
            self.video.ffmpeg = ffmpeg;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/tldr-studio/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("tldr-studio")
            .join("config.toml")
    }

    /// Effective configuration as TOML, with the API key masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if let Some(key) = shown.service.api_key.as_mut() {
            *key = redact(key);
        }
        toml::to_string_pretty(&shown).map_err(|e| StudioError::ConfigRender {
            message: e.to_string(),
        })
    }

    /// Default configuration as a TOML template.
    pub fn template() -> Result<String> {
        Self::default().to_redacted_toml()
    }
}

fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_TRIGGER_FRAME: u64 = 10_000;
pub const DEFAULT_CAPTURE_DIR: &str = "captures";
pub const DEFAULT_FILE_PATTERN: &str = "ShadertoyOutput{frame}_{method}.png";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeederConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Testbed window settings handed to the render host.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub create_window: bool,
    pub show_ui: bool,
}

/// One-shot capture performed when the frame counter reaches `trigger_frame`.
///
/// `file_pattern` is expanded per capture method; `{frame}` receives the
/// trigger frame and `{method}` either `native` or `manual`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub enabled: bool,
    pub trigger_frame: u64,
    pub directory: PathBuf,
    pub file_pattern: String,
    pub output_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_shader: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            window: WindowConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            create_window: true,
            show_ui: true,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger_frame: DEFAULT_TRIGGER_FRAME,
            directory: PathBuf::from(DEFAULT_CAPTURE_DIR),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            output_index: 0,
            next_shader: None,
        }
    }
}

impl FeederConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FeederConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.window.width, self.window.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window dimensions must be greater than zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }

        let capture = &self.capture;
        if capture.trigger_frame == 0 {
            return Err(ConfigError::Invalid(
                "capture.trigger_frame must be >= 1; the first frame is 1".into(),
            ));
        }

        if capture.file_pattern.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "capture.file_pattern may not be empty".into(),
            ));
        }

        for placeholder in ["{frame}", "{method}"] {
            if !capture.file_pattern.contains(placeholder) {
                return Err(ConfigError::Invalid(format!(
                    "capture.file_pattern '{}' must contain {placeholder}",
                    capture.file_pattern
                )));
            }
        }

        if let Some(shader) = &capture.next_shader {
            if shader.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "capture.next_shader may not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

//! Test plan file format and operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thdmeter_analysis::Window;

use crate::error::ConfigError;

/// On-disk encoding of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipFormat {
    /// RIFF WAV file; sample rate and channels come from the header.
    Wav,
    /// Headerless interleaved signed 16-bit little-endian PCM.
    Raw,
}

impl ClipFormat {
    /// Guess the format from a file extension: `.wav` is WAV, anything else raw.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => ClipFormat::Wav,
            _ => ClipFormat::Raw,
        }
    }
}

/// One capture to measure.
///
/// Optional fields fall back to the plan-level defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipConfig {
    /// Capture file, relative to the plan file's directory unless absolute.
    pub path: PathBuf,

    /// Expected tone frequency in Hz.
    pub fundamental_hz: f32,

    /// Display name (defaults to the file name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Pass threshold override in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_percent: Option<f32>,

    /// Frequency margin override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_margin: Option<f32>,

    /// Channel to analyze (0-based); all channels are mixed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u16>,

    /// Capture encoding; guessed from the extension when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ClipFormat>,

    /// Interleaved channel count of a raw capture (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,

    /// Sample rate override for raw captures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

impl ClipConfig {
    /// Create a clip with no overrides.
    pub fn new(path: impl Into<PathBuf>, fundamental_hz: f32) -> Self {
        Self {
            path: path.into(),
            fundamental_hz,
            label: None,
            threshold_percent: None,
            frequency_margin: None,
            channel: None,
            format: None,
            channels: None,
            sample_rate: None,
        }
    }

    /// Set the display name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Override the pass threshold.
    pub fn with_threshold(mut self, threshold_percent: f32) -> Self {
        self.threshold_percent = Some(threshold_percent);
        self
    }

    /// Override the frequency margin.
    pub fn with_margin(mut self, frequency_margin: f32) -> Self {
        self.frequency_margin = Some(frequency_margin);
        self
    }

    /// Analyze a single channel.
    pub fn with_channel(mut self, channel: u16) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Display name: the label, or the file name.
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }
}

/// A clip with every default applied and its path resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSettings {
    /// Display name.
    pub label: String,
    /// Capture file.
    pub path: PathBuf,
    /// Capture encoding.
    pub format: ClipFormat,
    /// Expected tone frequency in Hz.
    pub fundamental_hz: f32,
    /// Fractional band width.
    pub frequency_margin: f32,
    /// Pass threshold in percent.
    pub threshold_percent: f32,
    /// Spectral window.
    pub window: Window,
    /// Channel to analyze; `None` mixes all channels.
    pub channel: Option<u16>,
    /// Interleaved channel count for raw captures.
    pub raw_channels: u16,
    /// Sample rate assumed for raw captures.
    pub raw_sample_rate: u32,
}

/// Test plan: a batch of captures and the thresholds they are held to.
///
/// # TOML Format
///
/// ```toml
/// name = "speaker loopback"
/// sample_rate = 44100
/// frequency_margin = 0.02
/// threshold_percent = 1.0
/// window = "hann"
///
/// [[clips]]
/// path = "left_1k.wav"
/// fundamental_hz = 1000.0
/// channel = 0
///
/// [[clips]]
/// path = "mic_440.raw"
/// fundamental_hz = 440.0
/// threshold_percent = 3.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestPlan {
    /// Name of the plan.
    pub name: String,

    /// Optional description of the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate of raw captures (defaults to 44100).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Default frequency margin (defaults to 0.02).
    #[serde(default = "default_frequency_margin")]
    pub frequency_margin: f32,

    /// Default pass threshold in percent (defaults to 1.0).
    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: f32,

    /// Window function name (defaults to "hann").
    #[serde(default = "default_window")]
    pub window: String,

    /// Captures to measure.
    #[serde(default)]
    pub clips: Vec<ClipConfig>,

    /// Directory relative clip paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_frequency_margin() -> f32 {
    0.02
}

fn default_threshold_percent() -> f32 {
    1.0
}

fn default_window() -> String {
    Window::Hann.name().to_string()
}

impl TestPlan {
    /// Create a new empty plan with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            frequency_margin: default_frequency_margin(),
            threshold_percent: default_threshold_percent(),
            window: default_window(),
            clips: Vec::new(),
            base_dir: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default pass threshold.
    pub fn with_threshold(mut self, threshold_percent: f32) -> Self {
        self.threshold_percent = threshold_percent;
        self
    }

    /// Set the default frequency margin.
    pub fn with_margin(mut self, frequency_margin: f32) -> Self {
        self.frequency_margin = frequency_margin;
        self
    }

    /// Add a clip.
    pub fn with_clip(mut self, clip: ClipConfig) -> Self {
        self.clips.push(clip);
        self
    }

    /// Load a plan from a TOML file.
    ///
    /// Relative clip paths resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut plan = Self::from_toml(&content)?;
        plan.base_dir = path.parent().map(Path::to_path_buf);
        Ok(plan)
    }

    /// Load a plan from a TOML string.
    ///
    /// Relative clip paths resolve against the current directory.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize the plan to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the plan to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::create_dir(parent, e))?;
            }
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Directory relative clip paths resolve against, if loaded from a file.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Check every default and override.
    ///
    /// Reports the first problem found. Nyquist limits are checked at
    /// measurement time, once the capture's sample rate is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const DEFAULTS: &str = "plan defaults";

        if self.sample_rate == 0 {
            return Err(ConfigError::invalid(DEFAULTS, "sample_rate", "must be positive"));
        }
        check_margin(DEFAULTS, self.frequency_margin)?;
        check_threshold(DEFAULTS, self.threshold_percent)?;
        self.parsed_window()?;

        for clip in &self.clips {
            let context = format!("clip '{}'", clip.display_name());
            if !(clip.fundamental_hz.is_finite() && clip.fundamental_hz > 0.0) {
                return Err(ConfigError::invalid(
                    context,
                    "fundamental_hz",
                    format!("{} is not a positive frequency", clip.fundamental_hz),
                ));
            }
            if let Some(margin) = clip.frequency_margin {
                check_margin(&context, margin)?;
            }
            if let Some(threshold) = clip.threshold_percent {
                check_threshold(&context, threshold)?;
            }
            if clip.channels == Some(0) {
                return Err(ConfigError::invalid(context, "channels", "must be at least 1"));
            }
            if clip.sample_rate == Some(0) {
                return Err(ConfigError::invalid(context, "sample_rate", "must be positive"));
            }
        }

        Ok(())
    }

    /// Apply defaults to a clip and resolve its path.
    pub fn resolve(&self, clip: &ClipConfig) -> Result<ClipSettings, ConfigError> {
        let path = match &self.base_dir {
            Some(base) if clip.path.is_relative() => base.join(&clip.path),
            _ => clip.path.clone(),
        };

        Ok(ClipSettings {
            label: clip.display_name(),
            format: clip.format.unwrap_or_else(|| ClipFormat::from_path(&clip.path)),
            path,
            fundamental_hz: clip.fundamental_hz,
            frequency_margin: clip.frequency_margin.unwrap_or(self.frequency_margin),
            threshold_percent: clip.threshold_percent.unwrap_or(self.threshold_percent),
            window: self.parsed_window()?,
            channel: clip.channel,
            raw_channels: clip.channels.unwrap_or(1),
            raw_sample_rate: clip.sample_rate.unwrap_or(self.sample_rate),
        })
    }

    /// Resolve every clip in plan order.
    pub fn resolve_all(&self) -> Result<Vec<ClipSettings>, ConfigError> {
        self.clips.iter().map(|clip| self.resolve(clip)).collect()
    }

    fn parsed_window(&self) -> Result<Window, ConfigError> {
        self.window
            .parse::<Window>()
            .map_err(|e| ConfigError::invalid("plan defaults", "window", e.to_string()))
    }
}

fn check_margin(context: &str, margin: f32) -> Result<(), ConfigError> {
    if margin > 0.0 && margin < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            context,
            "frequency_margin",
            format!("{margin} must be between 0 and 1 (exclusive)"),
        ))
    }
}

fn check_threshold(context: &str, threshold: f32) -> Result<(), ConfigError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            context,
            "threshold_percent",
            format!("{threshold} must be a non-negative percentage"),
        ))
    }
}

//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use serde::Serialize;
use thdmeter_analysis::{Evaluation, ThdEstimator, ThdReport, evaluate};
use thdmeter_config::{ClipFormat, ClipSettings};
use thdmeter_io::{ChannelSelect, read_raw_pcm16, read_wav_with};

/// One measured capture, ready to print or serialize.
#[derive(Debug, Serialize)]
pub struct Measurement {
    /// Display name of the capture.
    pub label: String,
    /// Capture file path.
    pub path: String,
    /// Sample rate the capture was analyzed at.
    pub sample_rate: u32,
    /// Expected tone frequency in Hz.
    pub fundamental_hz: f32,
    /// Verdict and the numbers behind it.
    #[serde(flatten)]
    pub evaluation: Evaluation,
    /// Estimator internals.
    pub report: ThdReport,
}

/// Load the capture a clip points at and return mono samples plus sample rate.
pub fn load_capture(settings: &ClipSettings) -> anyhow::Result<(Vec<f32>, u32)> {
    let select = settings
        .channel
        .map_or(ChannelSelect::Mix, ChannelSelect::Channel);

    match settings.format {
        ClipFormat::Wav => {
            let (samples, spec) = read_wav_with(&settings.path, select)
                .with_context(|| format!("reading {}", settings.path.display()))?;
            Ok((samples, spec.sample_rate))
        }
        ClipFormat::Raw => {
            let samples = read_raw_pcm16(&settings.path, settings.raw_channels, select)
                .with_context(|| format!("reading {}", settings.path.display()))?;
            Ok((samples, settings.raw_sample_rate))
        }
    }
}

/// Load, analyze and evaluate one capture.
pub fn measure_clip(settings: &ClipSettings) -> anyhow::Result<Measurement> {
    let (samples, sample_rate) = load_capture(settings)?;

    let estimator =
        ThdEstimator::new(sample_rate, settings.frequency_margin).with_window(settings.window);
    let report = estimator
        .analyze(&samples, settings.fundamental_hz)
        .with_context(|| format!("analyzing {}", settings.path.display()))?;

    if report.is_mismatch() {
        tracing::warn!(
            clip = %settings.label,
            expected_bin = report.expected_bin,
            peak_bin = report.peak_bin,
            "spectrum peak does not match the expected tone"
        );
    }

    Ok(Measurement {
        label: settings.label.clone(),
        path: settings.path.display().to_string(),
        sample_rate,
        fundamental_hz: settings.fundamental_hz,
        evaluation: evaluate(report.ratio, settings.threshold_percent),
        report,
    })
}

/// Format a THD ratio as a percentage, or `n/a` for the mismatch sentinel.
pub fn format_thd(report: &ThdReport) -> String {
    if report.is_mismatch() {
        "n/a".to_string()
    } else {
        format!("{:.4}%", report.percent())
    }
}

/// Parse an `order:amplitude` harmonic spec for clap's `value_parser`.
pub fn parse_harmonic(s: &str) -> Result<(u32, f32), String> {
    let (order, amplitude) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid harmonic '{s}' (expected order:amplitude, e.g. 3:0.1)"))?;

    let order: u32 = order
        .trim()
        .parse()
        .map_err(|_| format!("Invalid harmonic order '{order}'"))?;
    if order < 2 {
        return Err(format!("Harmonic order must be at least 2, got {order}"));
    }

    let amplitude: f32 = amplitude
        .trim()
        .parse()
        .map_err(|_| format!("Invalid harmonic amplitude '{amplitude}'"))?;

    Ok((order, amplitude))
}

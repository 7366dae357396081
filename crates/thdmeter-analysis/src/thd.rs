//! Total harmonic distortion (THD) estimation
//!
//! Measures how much of a recorded test tone's energy lands on the harmonics
//! of a known fundamental. The waveform is windowed and transformed as a
//! whole, the fundamental is located near its expected bin, and the energy in
//! a band around each integer multiple of that bin is compared against the
//! energy around the fundamental itself.
//!
//! The returned value is an energy ratio `P_others / P0`; multiply by 100 for
//! a percentage. When the strongest bin in the spectrum is not the located
//! fundamental, the recording does not contain the expected tone and the
//! estimator returns [`MISMATCH_RATIO`] instead of a measurement.
//!
//! # Bin arithmetic
//!
//! All bin positions use floor division:
//!
//! ```text
//! half_len          = len / 2
//! expected_bin      = floor(half_len * f0 * 2 / sample_rate)
//! search_half_width = floor(floor(expected_bin * margin) / 2)
//! half_width        = floor(floor(fundamental_bin * margin) / 2)
//! ```
//!
//! The fundamental is searched for around `expected_bin`; the fundamental and
//! harmonic bands are then sized from the bin actually found. Every band is
//! the inclusive range `center - w ..= center + w`, clipped to `0..half_len`.

use crate::fft::Window;
use crate::spectrum::{BinWindow, argmax, magnitude_spectrum};
use serde::Serialize;

/// Ratio returned when the spectrum peak is not at the expected fundamental.
///
/// Any ratio at or above this value is a failed capture, not a measurement.
pub const MISMATCH_RATIO: f32 = 1.0;

/// Invalid analysis inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThdError {
    /// The waveform has no samples.
    #[error("waveform is empty")]
    EmptyWaveform,

    /// The sample rate is zero.
    #[error("sample rate must be positive")]
    InvalidSampleRate,

    /// The fundamental is not a positive frequency below Nyquist.
    #[error("fundamental {frequency} Hz must be positive and below Nyquist ({nyquist} Hz)")]
    InvalidFundamental {
        /// Requested fundamental in Hz.
        frequency: f32,
        /// Nyquist frequency of the capture in Hz.
        nyquist: f32,
    },

    /// The frequency margin is outside `(0, 1)`.
    #[error("frequency margin {0} must be between 0 and 1 (exclusive)")]
    InvalidMargin(f32),

    /// The waveform is too short to place the fundamental above bin 0.
    #[error(
        "fundamental {fundamental} Hz is below the bin spacing of {bin_width} Hz; capture a longer waveform"
    )]
    Unresolvable {
        /// Requested fundamental in Hz.
        fundamental: f32,
        /// Spacing between spectrum bins in Hz.
        bin_width: f32,
    },
}

/// Convenience result type for THD analysis.
pub type Result<T> = std::result::Result<T, ThdError>;

/// Outcome of one THD analysis, with the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThdReport {
    /// Harmonic-to-fundamental energy ratio, or [`MISMATCH_RATIO`].
    pub ratio: f32,
    /// Bin predicted from the fundamental frequency.
    pub expected_bin: usize,
    /// Strongest bin inside the search band around `expected_bin`.
    pub fundamental_bin: usize,
    /// Strongest bin of the whole positive half-spectrum.
    pub peak_bin: usize,
    /// Bins on each side of `expected_bin` searched for the fundamental.
    pub search_half_width: usize,
    /// Bins on each side of the fundamental and every harmonic center.
    pub half_width: usize,
    /// Energy around the fundamental (`P0`).
    pub fundamental_energy: f32,
    /// Energy summed over all harmonic bands (`P_others`).
    pub harmonic_energy: f32,
    /// Number of harmonic bands summed.
    pub harmonics: usize,
    /// True when the spectrum peak did not match the fundamental.
    pub mismatch: bool,
}

impl ThdReport {
    /// THD as a percentage.
    pub fn percent(&self) -> f32 {
        self.ratio * 100.0
    }

    /// THD as a power ratio in dB.
    pub fn db(&self) -> f32 {
        10.0 * self.ratio.max(1e-12).log10()
    }

    /// True when the sentinel was returned instead of a measurement.
    pub fn is_mismatch(&self) -> bool {
        self.mismatch
    }
}

/// THD estimator for captures at a fixed sample rate.
///
/// Holds only value parameters; a single estimator can be shared across
/// threads and reused for any number of captures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThdEstimator {
    sample_rate: u32,
    frequency_margin: f32,
    window: Window,
}

impl ThdEstimator {
    /// Create a new THD estimator
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `frequency_margin` - Band width as a fraction of the fundamental bin (e.g. 0.02)
    pub fn new(sample_rate: u32, frequency_margin: f32) -> Self {
        Self {
            sample_rate,
            frequency_margin,
            window: Window::Hann,
        }
    }

    /// Set the window function (Hann by default)
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Fractional band width.
    pub fn frequency_margin(&self) -> f32 {
        self.frequency_margin
    }

    /// Window function applied before the transform.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Estimate the THD ratio of `waveform` for a tone at `fundamental` Hz.
    pub fn estimate(&self, waveform: &[f32], fundamental: f32) -> Result<f32> {
        self.analyze(waveform, fundamental).map(|report| report.ratio)
    }

    /// Run the full analysis and return the ratio with its diagnostics.
    pub fn analyze(&self, waveform: &[f32], fundamental: f32) -> Result<ThdReport> {
        self.validate(waveform, fundamental)?;

        let half_len = waveform.len() / 2;
        let expected_bin = expected_bin(half_len, fundamental, self.sample_rate);
        if expected_bin == 0 {
            return Err(ThdError::Unresolvable {
                fundamental,
                bin_width: self.sample_rate as f32 / waveform.len() as f32,
            });
        }
        let search_half_width = self.half_width(expected_bin);

        let spectrum = magnitude_spectrum(waveform, self.window);
        let usable = &spectrum[..half_len];

        // 0 < expected_bin < half_len and search_half_width < expected_bin, so
        // the search band is non-empty and never reaches the zeroed DC bin.
        let fundamental_bin = BinWindow::new(expected_bin, search_half_width)
            .peak(usable)
            .unwrap_or(expected_bin);
        let half_width = self.half_width(fundamental_bin);
        let peak_bin = argmax(usable).unwrap_or(0);

        tracing::debug!(
            expected_bin,
            search_half_width,
            fundamental_bin,
            half_width,
            peak_bin,
            "thd: located fundamental"
        );

        let mut report = ThdReport {
            ratio: MISMATCH_RATIO,
            expected_bin,
            fundamental_bin,
            peak_bin,
            search_half_width,
            half_width,
            fundamental_energy: 0.0,
            harmonic_energy: 0.0,
            harmonics: 0,
            mismatch: true,
        };

        if fundamental_bin != peak_bin {
            tracing::debug!(fundamental_bin, peak_bin, "thd: peak mismatch");
            return Ok(report);
        }

        let fundamental_energy = BinWindow::new(fundamental_bin, half_width).energy(usable);
        if fundamental_energy <= 0.0 || fundamental_energy.is_nan() {
            tracing::debug!(fundamental_energy, "thd: no energy at fundamental");
            return Ok(report);
        }

        let mut harmonic_energy = 0.0;
        let mut harmonics = 0;
        let mut center = fundamental_bin * 2;
        while center < half_len {
            harmonic_energy += BinWindow::new(center, half_width).energy(usable);
            harmonics += 1;
            center += fundamental_bin;
        }

        report.fundamental_energy = fundamental_energy;
        report.harmonic_energy = harmonic_energy;
        report.harmonics = harmonics;
        report.ratio = harmonic_energy / fundamental_energy;
        report.mismatch = false;

        tracing::debug!(
            fundamental_energy,
            harmonic_energy,
            harmonics,
            ratio = report.ratio,
            "thd: measured"
        );

        Ok(report)
    }

    /// Band half-width for a band centered on `bin`.
    fn half_width(&self, bin: usize) -> usize {
        (bin as f32 * self.frequency_margin).floor() as usize / 2
    }

    fn validate(&self, waveform: &[f32], fundamental: f32) -> Result<()> {
        if waveform.is_empty() {
            return Err(ThdError::EmptyWaveform);
        }
        if self.sample_rate == 0 {
            return Err(ThdError::InvalidSampleRate);
        }
        if !(self.frequency_margin > 0.0 && self.frequency_margin < 1.0) {
            return Err(ThdError::InvalidMargin(self.frequency_margin));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if !(fundamental > 0.0 && fundamental < nyquist) {
            return Err(ThdError::InvalidFundamental {
                frequency: fundamental,
                nyquist,
            });
        }
        Ok(())
    }
}

/// Bin of `fundamental` in a half-spectrum of `half_len` bins.
fn expected_bin(half_len: usize, fundamental: f32, sample_rate: u32) -> usize {
    (half_len as f64 * f64::from(fundamental) * 2.0 / f64::from(sample_rate)).floor() as usize
}

/// Estimate the THD ratio of a Hann-windowed capture.
///
/// # Arguments
/// * `waveform` - Captured samples
/// * `fundamental_frequency` - Expected tone frequency in Hz, below Nyquist
/// * `sample_rate` - Sample rate in Hz
/// * `frequency_margin` - Band width as a fraction of the fundamental bin
///
/// Returns [`MISMATCH_RATIO`] when the capture's spectral peak is not the
/// expected tone.
pub fn estimate_thd(
    waveform: &[f32],
    fundamental_frequency: f32,
    sample_rate: u32,
    frequency_margin: f32,
) -> Result<f32> {
    ThdEstimator::new(sample_rate, frequency_margin).estimate(waveform, fundamental_frequency)
}

//! Spectral analysis utilities

use crate::fft::{Fft, Window};
use std::ops::RangeInclusive;

/// Compute the magnitude spectrum of a whole signal.
///
/// The transform length equals the signal length. The window is applied
/// before the transform and the DC bin is zeroed afterwards. Returns
/// `len / 2 + 1` bins (DC to Nyquist); an empty signal yields an empty
/// spectrum.
pub fn magnitude_spectrum(signal: &[f32], window: Window) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }

    let fft = Fft::new(signal.len());

    let mut windowed = signal.to_vec();
    window.apply(&mut windowed);

    let mut magnitudes: Vec<f32> = fft.forward(&windowed).iter().map(|c| c.norm()).collect();
    magnitudes[0] = 0.0;
    magnitudes
}

/// Index of the largest value.
///
/// Ties resolve to the lowest index. NaN values are never selected unless
/// every value is NaN. Returns `None` for an empty slice.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        let replace = match best {
            None => true,
            Some((_, b)) => v > b || (b.is_nan() && !v.is_nan()),
        };
        if replace {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// A contiguous band of bins centered on a target bin.
///
/// The band spans `center - half_width ..= center + half_width`, clipped to
/// the spectrum. The same half-width is used for the fundamental and every
/// harmonic so their energies are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinWindow {
    /// Center bin index
    pub center: usize,
    /// Bins on each side of the center
    pub half_width: usize,
}

impl BinWindow {
    /// Create a window around `center`.
    pub fn new(center: usize, half_width: usize) -> Self {
        Self { center, half_width }
    }

    /// Inclusive bin range clipped to `0..limit`.
    ///
    /// Returns `None` when the center itself lies outside the spectrum.
    pub fn range(&self, limit: usize) -> Option<RangeInclusive<usize>> {
        if self.center >= limit {
            return None;
        }
        let start = self.center.saturating_sub(self.half_width);
        let end = (self.center + self.half_width).min(limit - 1);
        Some(start..=end)
    }

    /// Squared L2 norm of the magnitudes inside the window.
    pub fn energy(&self, magnitudes: &[f32]) -> f32 {
        self.range(magnitudes.len())
            .map(|r| magnitudes[r].iter().map(|m| m * m).sum())
            .unwrap_or(0.0)
    }

    /// Index of the largest magnitude inside the window.
    pub fn peak(&self, magnitudes: &[f32]) -> Option<usize> {
        let range = self.range(magnitudes.len())?;
        let start = *range.start();
        argmax(&magnitudes[range]).map(|i| i + start)
    }
}

//! Reference test signals
//!
//! Generators for the captures a THD run is validated against: clean tones,
//! tones with known harmonic content, and deterministic white noise.

use std::f64::consts::PI;

/// Generate a sine tone
///
/// # Arguments
/// * `sample_rate` - Sample rate in Hz
/// * `frequency` - Tone frequency in Hz
/// * `duration_secs` - Duration in seconds
/// * `amplitude` - Peak amplitude (0.0 to 1.0)
pub fn tone(sample_rate: u32, frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    tone_with_harmonics(sample_rate, frequency, duration_secs, amplitude, &[])
}

/// Generate a sine tone with added harmonics
///
/// Each `(order, relative_amplitude)` pair adds a sine at `order * frequency`
/// with amplitude `amplitude * relative_amplitude`. Harmonics at or above
/// Nyquist are skipped.
///
/// Phase is computed in double precision so long captures stay free of the
/// phase-rounding spurs that single precision would add.
pub fn tone_with_harmonics(
    sample_rate: u32,
    frequency: f32,
    duration_secs: f32,
    amplitude: f32,
    harmonics: &[(u32, f32)],
) -> Vec<f32> {
    if sample_rate == 0 {
        return Vec::new();
    }

    let sr = f64::from(sample_rate);
    let f0 = f64::from(frequency);
    let nyquist = sr / 2.0;
    let num_samples = (f64::from(duration_secs) * sr) as usize;

    let partials: Vec<(f64, f64)> = std::iter::once((1, 1.0))
        .chain(harmonics.iter().copied())
        .map(|(order, rel)| (f0 * f64::from(order), f64::from(amplitude * rel)))
        .filter(|&(freq, _)| freq > 0.0 && freq < nyquist)
        .collect();

    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sr;
            partials
                .iter()
                .map(|&(freq, amp)| amp * (2.0 * PI * freq * t).sin())
                .sum::<f64>() as f32
        })
        .collect()
}

/// Generate uniform white noise in `[-amplitude, amplitude]`
///
/// Uses a xorshift generator so the same seed always yields the same
/// samples. A zero seed is replaced by a fixed non-zero one.
pub fn white_noise(num_samples: usize, amplitude: f32, seed: u32) -> Vec<f32> {
    let mut state = if seed == 0 { 0x12345678 } else { seed };
    (0..num_samples)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            amplitude * (state as i32 as f32) / (i32::MAX as f32)
        })
        .collect()
}

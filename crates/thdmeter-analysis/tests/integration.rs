//! Integration tests for thdmeter-analysis.
//!
//! Exercise the public THD API with synthetic captures whose distortion is
//! known in advance: clean tones, tones with added harmonics, clipped tones,
//! noise, and tones at the wrong frequency.

use thdmeter_analysis::signal::{tone, tone_with_harmonics, white_noise};
use thdmeter_analysis::{
    MISMATCH_RATIO, ThdError, ThdEstimator, Verdict, Window, estimate_thd, evaluate,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Hard-clip a signal symmetrically.
fn clip(signal: &[f32], limit: f32) -> Vec<f32> {
    signal.iter().map(|s| s.clamp(-limit, limit)).collect()
}

// ===========================================================================
// 1. Clean tones
// ===========================================================================

#[test]
fn pure_tone_has_negligible_thd() {
    let cases = [
        (44100, 1000.0),
        (48000, 1000.0),
        (48000, 440.0),
        (48000, 997.0),
        (16000, 1234.5),
    ];

    for (sample_rate, freq) in cases {
        let signal = tone(sample_rate, freq, 1.0, 0.5);
        let ratio = estimate_thd(&signal, freq, sample_rate, 0.02).unwrap();
        assert!(
            ratio < 1e-3,
            "pure {freq} Hz tone at {sample_rate} Hz should have ratio < 1e-3, got {ratio}"
        );
    }
}

#[test]
fn off_bin_tone_is_still_located() {
    // 8192 samples at 48 kHz: bin spacing ~5.86 Hz, 1000 Hz sits at bin ~170.7
    let signal: Vec<f32> = tone(48000, 1000.0, 1.0, 0.5).into_iter().take(8192).collect();
    let report = ThdEstimator::new(48000, 0.02)
        .analyze(&signal, 1000.0)
        .unwrap();

    assert_eq!(report.expected_bin, 170);
    assert_eq!(report.fundamental_bin, 171);
    assert!(!report.mismatch);
    assert!(report.ratio < 1e-3, "ratio {}", report.ratio);
}

// ===========================================================================
// 2. Known harmonic content
// ===========================================================================

#[test]
fn third_harmonic_ratio_matches_energy() {
    for a in [0.03f32, 0.1, 0.3] {
        let signal = tone_with_harmonics(44100, 1000.0, 1.0, 0.5, &[(3, a)]);
        let ratio = estimate_thd(&signal, 1000.0, 44100, 0.02).unwrap();
        let expected = a * a;
        assert!(
            (ratio - expected).abs() < expected * 0.05,
            "harmonic amplitude {a}: expected ratio ~{expected}, got {ratio}"
        );
    }
}

#[test]
fn multiple_harmonics_add_up() {
    let signal = tone_with_harmonics(48000, 500.0, 1.0, 0.4, &[(2, 0.1), (3, 0.05), (5, 0.02)]);
    let ratio = estimate_thd(&signal, 500.0, 48000, 0.02).unwrap();
    let expected = 0.1f32.powi(2) + 0.05f32.powi(2) + 0.02f32.powi(2);
    assert!(
        (ratio - expected).abs() < expected * 0.05,
        "expected ~{expected}, got {ratio}"
    );
}

#[test]
fn clipping_raises_thd() {
    let clean = tone(48000, 1000.0, 1.0, 1.0);
    let clipped = clip(&clean, 0.5);

    let estimator = ThdEstimator::new(48000, 0.02);
    let clean_ratio = estimator.estimate(&clean, 1000.0).unwrap();
    let clipped_ratio = estimator.estimate(&clipped, 1000.0).unwrap();

    assert!(clean_ratio < 1e-3);
    assert!(
        clipped_ratio > 0.01 && clipped_ratio < MISMATCH_RATIO,
        "hard clipping should give measurable THD, got {clipped_ratio}"
    );
    assert_eq!(evaluate(clipped_ratio, 1.0).verdict, Verdict::Fail);
    assert_eq!(evaluate(clean_ratio, 1.0).verdict, Verdict::Pass);
}

#[test]
fn other_windows_measure_the_same_harmonic() {
    let signal = tone_with_harmonics(48000, 1000.0, 1.0, 0.5, &[(2, 0.1)]);
    for window in [Window::Hamming, Window::Blackman, Window::BlackmanHarris] {
        let ratio = ThdEstimator::new(48000, 0.02)
            .with_window(window)
            .estimate(&signal, 1000.0)
            .unwrap();
        assert!(
            (ratio - 0.01).abs() < 0.001,
            "{window} window: expected ~0.01, got {ratio}"
        );
    }
}

// ===========================================================================
// 3. Peak mismatch
// ===========================================================================

#[test]
fn white_noise_is_mismatch() {
    let noise = white_noise(44100, 0.5, 0x2545F491);
    let ratio = estimate_thd(&noise, 1000.0, 44100, 0.02).unwrap();
    assert_eq!(ratio, MISMATCH_RATIO);
}

#[test]
fn wrong_frequency_is_mismatch() {
    let signal = tone(48000, 3000.0, 1.0, 0.5);
    let report = ThdEstimator::new(48000, 0.02)
        .analyze(&signal, 1000.0)
        .unwrap();

    assert!(report.mismatch);
    assert_eq!(report.ratio, MISMATCH_RATIO);
    assert_eq!(report.peak_bin, 3000);
    assert_ne!(report.fundamental_bin, report.peak_bin);
}

#[test]
fn loud_interferer_is_mismatch() {
    // A stronger tone elsewhere in the band outranks the fundamental
    let signal = tone_with_harmonics(48000, 1000.0, 1.0, 0.2, &[(7, 2.0)]);
    let ratio = estimate_thd(&signal, 1000.0, 48000, 0.02).unwrap();
    assert_eq!(ratio, MISMATCH_RATIO);
    assert_eq!(evaluate(ratio, 1000.0).verdict, Verdict::Fail);
}

// ===========================================================================
// 4. Determinism, errors, threading
// ===========================================================================

#[test]
fn identical_inputs_identical_outputs() {
    let signal = clip(&tone(44100, 1000.0, 0.5, 1.0), 0.7);
    let a = estimate_thd(&signal, 1000.0, 44100, 0.02).unwrap();
    let b = estimate_thd(&signal, 1000.0, 44100, 0.02).unwrap();
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn empty_waveform_is_an_error() {
    assert_eq!(
        estimate_thd(&[], 1000.0, 44100, 0.02),
        Err(ThdError::EmptyWaveform)
    );
}

#[test]
fn fundamental_at_nyquist_is_an_error() {
    let signal = tone(44100, 1000.0, 0.1, 0.5);
    let err = estimate_thd(&signal, 22050.0, 44100, 0.02).unwrap_err();
    assert!(matches!(err, ThdError::InvalidFundamental { .. }));
    assert!(err.to_string().contains("Nyquist"));
}

#[test]
fn estimator_is_shareable_across_threads() {
    let estimator = ThdEstimator::new(48000, 0.02);
    let captures: Vec<Vec<f32>> = [0.0f32, 0.05, 0.1, 0.2]
        .iter()
        .map(|&a| tone_with_harmonics(48000, 1000.0, 0.5, 0.5, &[(2, a)]))
        .collect();

    let sequential: Vec<f32> = captures
        .iter()
        .map(|c| estimator.estimate(c, 1000.0).unwrap())
        .collect();

    let parallel: Vec<f32> = std::thread::scope(|s| {
        let handles: Vec<_> = captures
            .iter()
            .map(|c| s.spawn(move || estimator.estimate(c, 1000.0).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

// ===========================================================================
// 5. Margin monotonicity
// ===========================================================================

#[test]
fn wider_margin_never_loses_harmonic_energy() {
    let signal = clip(&tone(48000, 1000.0, 1.0, 1.0), 0.6);

    let mut margin = 0.01f32;
    let mut previous = ThdEstimator::new(48000, margin)
        .analyze(&signal, 1000.0)
        .unwrap();
    assert!(!previous.mismatch);

    while margin * 2.0 < 1.0 {
        margin *= 2.0;
        let report = ThdEstimator::new(48000, margin)
            .analyze(&signal, 1000.0)
            .unwrap();
        assert!(!report.mismatch);
        assert!(report.half_width >= previous.half_width);
        assert!(
            report.harmonic_energy >= previous.harmonic_energy,
            "margin {margin}: {} < {}",
            report.harmonic_energy,
            previous.harmonic_energy
        );
        previous = report;
    }
}

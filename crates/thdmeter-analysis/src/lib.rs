//! thdmeter Analysis - Harmonic distortion measurement for test-tone captures
//!
//! This crate provides the numerical side of an audio THD test harness:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`spectrum`] - Magnitude spectrum, peak search and band energy
//! - [`thd`] - THD estimation against a known fundamental
//! - [`verdict`] - Pass/fail evaluation against a threshold
//! - [`signal`] - Reference tones and noise
//!
//! Everything here is pure computation: no files, no global state. Loading
//! captures lives in `thdmeter-io`.
//!
//! ## Example
//!
//! ```rust
//! use thdmeter_analysis::{ThdEstimator, evaluate, signal};
//!
//! // A 1 kHz tone with 10% third harmonic
//! let capture = signal::tone_with_harmonics(48000, 1000.0, 1.0, 0.5, &[(3, 0.1)]);
//!
//! let estimator = ThdEstimator::new(48000, 0.02);
//! let ratio = estimator.estimate(&capture, 1000.0).unwrap();
//! assert!((ratio - 0.01).abs() < 1e-3);
//!
//! let result = evaluate(ratio, 5.0);
//! println!("{result}");
//! assert!(result.verdict.is_pass());
//! ```

pub mod fft;
pub mod signal;
pub mod spectrum;
pub mod thd;
pub mod verdict;

// Re-export main types
pub use fft::{Fft, ParseWindowError, Window};
pub use spectrum::{BinWindow, argmax, magnitude_spectrum};
pub use thd::{MISMATCH_RATIO, ThdError, ThdEstimator, ThdReport, estimate_thd};
pub use verdict::{Evaluation, Verdict, evaluate};

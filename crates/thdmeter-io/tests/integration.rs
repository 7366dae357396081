//! Integration tests for thdmeter-io capture loading.
//!
//! Each test writes a capture to a temporary file in one of the supported
//! formats, loads it back and checks that THD measured on the loaded samples
//! matches the signal that was written.

use std::io::Write;
use tempfile::NamedTempFile;
use thdmeter_analysis::signal::{tone, tone_with_harmonics};
use thdmeter_analysis::{MISMATCH_RATIO, estimate_thd};
use thdmeter_io::{
    ChannelSelect, Error, WavSpec, read_raw_pcm16, read_wav, read_wav_channel,
    read_wav_info, write_wav,
};

/// Interleave two equally long channels.
fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    left.iter().zip(right).flat_map(|(&l, &r)| [l, r]).collect()
}

// ---------------------------------------------------------------------------
// WAV captures
// ---------------------------------------------------------------------------

#[test]
fn wav_capture_i16_measures_like_source() {
    let source = tone_with_harmonics(44100, 1000.0, 1.0, 0.5, &[(3, 0.1)]);
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
    };

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &source, spec).unwrap();

    let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
    assert_eq!(loaded.len(), source.len());

    let ratio = estimate_thd(&loaded, 1000.0, loaded_spec.sample_rate, 0.02).unwrap();
    assert!((ratio - 0.01).abs() < 5e-4, "ratio {ratio}");
}

#[test]
fn wav_capture_i24_clean_tone() {
    let source = tone(48000, 997.0, 1.0, 0.8);
    let spec = WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 24,
    };

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &source, spec).unwrap();

    let (loaded, _) = read_wav(file.path()).unwrap();
    for (a, b) in source.iter().zip(loaded.iter()) {
        assert!((a - b).abs() < 1e-6);
    }

    let ratio = estimate_thd(&loaded, 997.0, 48000, 0.02).unwrap();
    assert!(ratio < 1e-3, "ratio {ratio}");
}

#[test]
fn stereo_capture_channels_measure_independently() {
    // Left carries the tone, right carries a different tone
    let left = tone(48000, 1000.0, 0.5, 0.5);
    let right = tone(48000, 2500.0, 0.5, 0.5);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 32,
    };

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &interleave(&left, &right), spec).unwrap();

    let (l, _) = read_wav_channel(file.path(), 0).unwrap();
    let (r, _) = read_wav_channel(file.path(), 1).unwrap();

    assert!(estimate_thd(&l, 1000.0, 48000, 0.02).unwrap() < 1e-3);
    assert_eq!(estimate_thd(&r, 1000.0, 48000, 0.02).unwrap(), MISMATCH_RATIO);
}

#[test]
fn wav_info_reports_header() {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
    };
    let samples = vec![0.0f32; 44100 * 2];

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, spec).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.spec, spec);
    assert!(!info.float);
    assert_eq!(info.frames, 44100);
    assert_eq!(info.duration_secs(), 1.0);
    assert_eq!(info.bin_width_hz(), Some(1.0));
}

#[test]
fn out_of_range_channel_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &[0.0; 16], WavSpec::default()).unwrap();

    let err = read_wav_channel(file.path(), 1).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidChannel {
            channel: 1,
            channels: 1
        }
    ));
}

#[test]
fn reference_writer_rejects_unsupported_depth() {
    let file = NamedTempFile::new().unwrap();
    let spec = WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 0,
    };

    let err = write_wav(file.path(), &[0.1, 0.2], spec).unwrap_err();
    assert!(matches!(err, Error::UnsupportedBitDepth(0)));
    assert_eq!(
        err.to_string(),
        "unsupported bit depth 0 (expected 16, 24 or 32)"
    );
}

// ---------------------------------------------------------------------------
// Raw PCM captures
// ---------------------------------------------------------------------------

#[test]
fn raw_pcm16_capture_measures_like_source() {
    let source = tone_with_harmonics(44100, 1000.0, 1.0, 0.5, &[(2, 0.2)]);
    let bytes: Vec<u8> = source
        .iter()
        .flat_map(|&s| ((s * 32767.0) as i16).to_le_bytes())
        .collect();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let loaded = read_raw_pcm16(file.path(), 1, ChannelSelect::Mix).unwrap();
    assert_eq!(loaded.len(), source.len());

    let ratio = estimate_thd(&loaded, 1000.0, 44100, 0.02).unwrap();
    assert!((ratio - 0.04).abs() < 2e-3, "ratio {ratio}");
}

#[test]
fn raw_pcm16_missing_file_is_io_error() {
    let err = read_raw_pcm16("/nonexistent/capture.raw", 1, ChannelSelect::Mix).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

//! WAV captures.
//!
//! Captures are decoded to `f32` in `[-1.0, 1.0)` and reduced to the single
//! channel under test. Reference tones are written as 16 or 24-bit integer
//! PCM, or as 32-bit float.

use crate::{ChannelSelect, Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Sample layout of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Interleaved channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth: 16 or 24 for integer PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl WavSpec {
    /// Encoding to write this spec with, or why it cannot be written.
    fn writer_spec(self) -> Result<hound::WavSpec> {
        if self.channels == 0 {
            return Err(Error::NoChannels);
        }
        let sample_format = match self.bits_per_sample {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            bits => return Err(Error::UnsupportedBitDepth(bits)),
        };
        Ok(hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format,
        })
    }
}

/// Header of a capture, read without decoding samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Sample layout.
    pub spec: WavSpec,
    /// True for IEEE float samples, false for integer PCM.
    pub float: bool,
    /// Samples per channel.
    pub frames: u64,
}

impl WavInfo {
    /// Capture length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.spec.sample_rate)
    }

    /// Highest frequency the capture can represent.
    pub fn nyquist_hz(&self) -> f64 {
        f64::from(self.spec.sample_rate) / 2.0
    }

    /// Bin spacing of a transform over the whole capture, as the THD
    /// estimator computes it. `None` for an empty capture.
    pub fn bin_width_hz(&self) -> Option<f64> {
        (self.frames > 0).then(|| f64::from(self.spec.sample_rate) / self.frames as f64)
    }

    /// Short encoding name: `PCM` or `IEEE Float`.
    pub fn encoding(&self) -> &'static str {
        if self.float { "IEEE Float" } else { "PCM" }
    }
}

/// Read the header of a WAV capture.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let header = reader.spec();

    Ok(WavInfo {
        spec: WavSpec::from(header),
        float: header.sample_format == SampleFormat::Float,
        frames: u64::from(reader.duration()),
    })
}

/// Read a WAV capture with all channels averaged.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    read_wav_with(path, ChannelSelect::Mix)
}

/// Read one channel (0-based) of a WAV capture.
pub fn read_wav_channel<P: AsRef<Path>>(path: P, channel: u16) -> Result<(Vec<f32>, WavSpec)> {
    read_wav_with(path, ChannelSelect::Channel(channel))
}

/// Read a WAV capture, reducing it to one channel as `select` describes.
///
/// Integer samples are divided by `2^(bits - 1)`. The returned spec
/// describes the file, not the reduced signal.
pub fn read_wav_with<P: AsRef<Path>>(
    path: P,
    select: ChannelSelect,
) -> Result<(Vec<f32>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let header = reader.spec();
    let spec = WavSpec::from(header);

    let interleaved: Vec<f32> = match header.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = full_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };
    let samples = select.extract(interleaved, spec.channels)?;

    tracing::info!(
        path = %path.display(),
        frames = samples.len(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        "loaded WAV capture"
    );

    Ok((samples, spec))
}

/// Write interleaved samples as a WAV capture.
///
/// Integer depths are quantized with clamping at full scale. Fails with
/// [`Error::UnsupportedBitDepth`] for depths other than 16, 24 or 32 and
/// with [`Error::NoChannels`] for a zero channel count.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let header = spec.writer_spec()?;
    let mut writer = WavWriter::create(path, header)?;

    match header.sample_format {
        SampleFormat::Float => samples.iter().try_for_each(|&s| writer.write_sample(s))?,
        SampleFormat::Int => {
            let scale = full_scale(spec.bits_per_sample);
            samples.iter().try_for_each(|&s| {
                writer.write_sample((s * scale).clamp(-scale, scale - 1.0) as i32)
            })?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Integer value that maps to 1.0 at the given bit depth.
fn full_scale(bits: u16) -> f32 {
    (1i64 << (bits.clamp(1, 32) - 1)) as f32
}

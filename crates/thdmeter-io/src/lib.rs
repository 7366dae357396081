//! Capture loading for the thdmeter THD test harness.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`], [`read_wav_channel`] and [`write_wav`]
//! - **Raw PCM captures**: [`read_raw_pcm16`] for headerless 16-bit recordings
//!
//! Every reader returns a single channel of `f32` samples normalized to
//! `[-1.0, 1.0]`, ready for `thdmeter_analysis::estimate_thd`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use thdmeter_io::read_wav;
//! use thdmeter_analysis::estimate_thd;
//!
//! let (samples, spec) = read_wav("capture.wav")?;
//! let ratio = estimate_thd(&samples, 1000.0, spec.sample_rate, 0.02)?;
//! ```

mod raw;
mod wav;

pub use raw::{decode_pcm16, read_raw_pcm16};
pub use wav::{
    WavInfo, WavSpec, read_wav, read_wav_channel, read_wav_info, read_wav_with, write_wav,
};

/// How multi-channel audio is reduced to the single channel under test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelSelect {
    /// Average all channels.
    #[default]
    Mix,
    /// Take one channel (0-based).
    Channel(u16),
}

impl ChannelSelect {
    /// Reduce interleaved samples to one channel.
    pub(crate) fn extract(self, interleaved: Vec<f32>, channels: u16) -> Result<Vec<f32>> {
        if channels == 0 {
            return Err(Error::NoChannels);
        }
        let n = channels as usize;
        match self {
            ChannelSelect::Channel(ch) if ch >= channels => Err(Error::InvalidChannel {
                channel: ch,
                channels,
            }),
            _ if n == 1 => Ok(interleaved),
            ChannelSelect::Mix => Ok(interleaved
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()),
            ChannelSelect::Channel(ch) => Ok(interleaved
                .chunks_exact(n)
                .map(|frame| frame[ch as usize])
                .collect()),
        }
    }
}

/// Error types for capture I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested channel does not exist in the capture.
    #[error("channel {channel} out of range (capture has {channels} channel(s))")]
    InvalidChannel {
        /// Requested channel index.
        channel: u16,
        /// Channels present in the capture.
        channels: u16,
    },

    /// A channel count of zero was given or found.
    #[error("capture must have at least one channel")]
    NoChannels,

    /// WAV bit depth other than 16, 24 or 32.
    #[error("unsupported bit depth {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Raw PCM data ends in the middle of a frame.
    #[error("raw PCM length {len} is not a multiple of the {frame_bytes}-byte frame size")]
    TruncatedPcm {
        /// Length of the data in bytes.
        len: usize,
        /// Bytes per interleaved frame.
        frame_bytes: usize,
    },
}

/// Convenience result type for capture I/O.
pub type Result<T> = std::result::Result<T, Error>;

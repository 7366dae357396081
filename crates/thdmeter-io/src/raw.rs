//! Headerless 16-bit PCM captures.
//!
//! Loopback recorders often dump the capture buffer straight to disk as
//! interleaved signed 16-bit little-endian samples with no header. The
//! sample rate and channel count travel out of band.

use crate::{ChannelSelect, Error, Result};
use std::path::Path;

const FULL_SCALE: f32 = 32768.0;

/// Decode interleaved little-endian i16 PCM bytes to one channel of f32.
pub fn decode_pcm16(bytes: &[u8], channels: u16, select: ChannelSelect) -> Result<Vec<f32>> {
    if channels == 0 {
        return Err(Error::NoChannels);
    }
    let frame_bytes = 2 * channels as usize;
    if bytes.len() % frame_bytes != 0 {
        return Err(Error::TruncatedPcm {
            len: bytes.len(),
            frame_bytes,
        });
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / FULL_SCALE)
        .collect();

    select.extract(samples, channels)
}

/// Read a headerless 16-bit PCM capture from disk.
pub fn read_raw_pcm16<P: AsRef<Path>>(
    path: P,
    channels: u16,
    select: ChannelSelect,
) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let samples = decode_pcm16(&bytes, channels, select)?;

    tracing::info!(
        path = %path.display(),
        frames = samples.len(),
        channels,
        "loaded raw PCM capture"
    );

    Ok(samples)
}

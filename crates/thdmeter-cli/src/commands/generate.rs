//! Reference signal generation command.

use super::common::parse_harmonic;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use thdmeter_analysis::signal::{tone_with_harmonics, white_noise};
use thdmeter_io::{WavSpec, write_wav};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand, Debug)]
enum GenerateCommand {
    /// Generate a sine tone, optionally with added harmonics or clipping
    Tone {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Frequency in Hz
        #[arg(long, default_value = "1000.0")]
        freq: f32,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f32,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Amplitude (0-1)
        #[arg(long, default_value = "0.5")]
        amplitude: f32,

        /// Add a harmonic as order:relative_amplitude (repeatable, e.g. 3:0.1)
        #[arg(long, value_parser = parse_harmonic, number_of_values = 1)]
        harmonic: Vec<(u32, f32)>,

        /// Hard-clip the waveform at this absolute level
        #[arg(long)]
        clip: Option<f32>,

        /// Bit depth (16 or 24 for integer PCM, 32 for float)
        #[arg(long, default_value = "32")]
        bits: u16,
    },

    /// Generate white noise
    Noise {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f32,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Amplitude (0-1)
        #[arg(long, default_value = "0.5")]
        amplitude: f32,

        /// Generator seed
        #[arg(long, default_value = "1")]
        seed: u32,

        /// Bit depth (16 or 24 for integer PCM, 32 for float)
        #[arg(long, default_value = "32")]
        bits: u16,
    },
}

/// Run the generate command.
pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    match args.command {
        GenerateCommand::Tone {
            output,
            freq,
            duration,
            sample_rate,
            amplitude,
            harmonic,
            clip,
            bits,
        } => {
            let nyquist = sample_rate as f32 / 2.0;
            if freq <= 0.0 || freq >= nyquist {
                anyhow::bail!("Frequency {freq} Hz must be between 0 and {nyquist} Hz");
            }

            println!("Generating {freq} Hz tone...");
            for (order, level) in &harmonic {
                println!("  harmonic {order} at {level} x fundamental");
            }

            let mut samples = tone_with_harmonics(sample_rate, freq, duration, amplitude, &harmonic);

            if let Some(level) = clip {
                let level = level.abs();
                println!("  clipped at +/-{level}");
                for s in &mut samples {
                    *s = s.clamp(-level, level);
                }
            }

            write(&output, &samples, sample_rate, bits)?;
        }

        GenerateCommand::Noise {
            output,
            duration,
            sample_rate,
            amplitude,
            seed,
            bits,
        } => {
            println!("Generating white noise...");
            println!("  {:.2}s at {} Hz", duration, sample_rate);

            let num_samples = (duration * sample_rate as f32) as usize;
            let samples = white_noise(num_samples, amplitude, seed);

            write(&output, &samples, sample_rate, bits)?;
        }
    }

    Ok(())
}

fn write(output: &Path, samples: &[f32], sample_rate: u32, bits: u16) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: bits,
    };

    write_wav(output, samples, spec)?;
    println!("Wrote {} samples to {}", samples.len(), output.display());
    Ok(())
}

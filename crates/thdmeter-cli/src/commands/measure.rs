//! Single-capture THD measurement.

use super::common::{Measurement, format_thd, measure_clip};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use thdmeter_analysis::Window;
use thdmeter_config::{ClipFormat, ClipSettings};

#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// Capture file (WAV, or headerless 16-bit PCM with --raw)
    input: PathBuf,

    /// Expected tone frequency in Hz
    #[arg(short, long)]
    freq: f32,

    /// Band width as a fraction of the fundamental bin (0-1)
    #[arg(short, long, default_value = "0.02")]
    margin: f32,

    /// Maximum THD in percent for a pass
    #[arg(short, long, default_value = "1.0")]
    threshold: f32,

    /// Window function (rectangular, hann, hamming, blackman, blackman-harris)
    #[arg(short, long, default_value = "hann")]
    window: Window,

    /// Treat the input as headerless little-endian 16-bit PCM
    #[arg(long)]
    raw: bool,

    /// Sample rate of a raw capture
    #[arg(long, default_value = "44100")]
    sample_rate: u32,

    /// Interleaved channel count of a raw capture
    #[arg(long, default_value = "1")]
    channels: u16,

    /// Channel to analyze (0-based); all channels are mixed if omitted
    #[arg(long)]
    channel: Option<u16>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl MeasureArgs {
    fn settings(&self) -> ClipSettings {
        ClipSettings {
            label: self.input.display().to_string(),
            path: self.input.clone(),
            format: if self.raw {
                ClipFormat::Raw
            } else {
                ClipFormat::Wav
            },
            fundamental_hz: self.freq,
            frequency_margin: self.margin,
            threshold_percent: self.threshold,
            window: self.window,
            channel: self.channel,
            raw_channels: self.channels,
            raw_sample_rate: self.sample_rate,
        }
    }
}

/// Run the measure command.
pub fn run(args: MeasureArgs) -> anyhow::Result<ExitCode> {
    let measurement = measure_clip(&args.settings())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&measurement)?);
    } else {
        print_measurement(&measurement);
    }

    Ok(if measurement.evaluation.verdict.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_measurement(m: &Measurement) {
    let report = &m.report;

    println!("File:        {}", m.path);
    println!("Sample Rate: {} Hz", m.sample_rate);
    println!(
        "Fundamental: {:.1} Hz (expected bin {}, found bin {})",
        m.fundamental_hz, report.expected_bin, report.fundamental_bin
    );

    if report.peak_bin == 0 {
        println!("Spectrum:    no energy in spectrum");
    } else if report.is_mismatch() {
        println!(
            "Spectrum:    strongest bin {} is outside the fundamental band",
            report.peak_bin
        );
    } else {
        println!(
            "Harmonics:   {} bands of {} bins",
            report.harmonics,
            2 * report.half_width + 1
        );
        println!(
            "THD:         {} ({:.1} dB)",
            format_thd(report),
            report.db()
        );
    }

    println!("{}", m.evaluation);
}

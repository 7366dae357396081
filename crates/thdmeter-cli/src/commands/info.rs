//! Display WAV file metadata.

use clap::Args;
use thdmeter_io::read_wav_info;

/// Display WAV file information.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: std::path::PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;
    let spec = info.spec;

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", info.encoding(), spec.bits_per_sample);
    println!("Channels:    {}", spec.channels);
    println!("Sample Rate: {} Hz", spec.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs(),
        info.frames
    );
    println!("Nyquist:     {:.1} Hz", info.nyquist_hz());
    if let Some(width) = info.bin_width_hz() {
        println!("Resolution:  {width:.4} Hz/bin");
    }

    Ok(())
}

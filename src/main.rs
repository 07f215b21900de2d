mod app;
mod settings;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use iq_pipeline::{SampleFormat, WindowFunction};

use app::IqPlotApp;
use settings::{Overrides, ViewerSettings};

#[derive(Parser, Debug)]
#[command(name = "iqplot")]
#[command(version)]
#[command(about = "Plot raw IQ recordings as time series, PSD and spectrogram", long_about = None)]
struct Args {
    /// Sample file to open on startup
    path: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,

    /// Record format, e.g. complex64, int16, uint8
    #[arg(long)]
    format: Option<SampleFormat>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// FFT size, a power of two from 128 to 8192
    #[arg(long)]
    fft_size: Option<usize>,

    /// Window function, e.g. blackman, hann, flattop
    #[arg(long)]
    window: Option<WindowFunction>,

    /// JSON file with default settings
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

impl Args {
    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            format: self.format,
            sample_rate: self.sample_rate,
            fft_size: self.fft_size,
            window_function: self.window,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .init();

    let settings = ViewerSettings::resolve(args.settings.as_deref(), args.overrides())?;
    log::info!(
        "Starting IQ Plot Desktop ({}, {} Hz, FFT {} {})",
        settings.format,
        settings.sample_rate,
        settings.fft_size,
        settings.window_function
    );
    let app = IqPlotApp::new(&settings, args.path.as_deref())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("IQ Plot Desktop"),
        ..Default::default()
    };

    eframe::run_native("IQ Plot Desktop", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("GUI exited with an error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let quiet = Args::parse_from(["iqplot", "-q"]);
        assert_eq!(quiet.log_level(), log::LevelFilter::Error);

        let normal = Args::parse_from(["iqplot"]);
        assert_eq!(normal.log_level(), log::LevelFilter::Info);

        let verbose = Args::parse_from(["iqplot", "--verbose"]);
        assert_eq!(verbose.log_level(), log::LevelFilter::Debug);

        assert!(Args::try_parse_from(["iqplot", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_typed_flags() {
        let args = Args::parse_from([
            "iqplot",
            "capture.bin",
            "--format",
            "int16",
            "--fft-size",
            "256",
            "--window",
            "hann",
            "--sample-rate",
            "48000",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("capture.bin")));

        let overrides = args.overrides();
        assert_eq!(overrides.format, Some("int16".parse().unwrap()));
        assert_eq!(overrides.fft_size, Some(256));
        assert_eq!(overrides.window_function, Some(WindowFunction::Hann));
        assert_eq!(overrides.sample_rate, Some(48000.0));
    }

    #[test]
    fn test_unknown_window_rejected() {
        assert!(Args::try_parse_from(["iqplot", "--window", "kaiser"]).is_err());
    }
}

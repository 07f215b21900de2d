//! Startup settings.
//!
//! Defaults can come from an optional JSON file; command-line flags override
//! whatever the file says. Nothing is written back.
//!
//! ```json
//! {
//!   "format": "int16",
//!   "sample_rate": 2400000.0,
//!   "fft_size": 2048,
//!   "window_function": "hann"
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use iq_pipeline::{FftConfig, SampleFormat, WindowFunction};
use serde::{Deserialize, Serialize};

/// Default sample rate, in Hz. Axes read as normalized frequency until the
/// user sets the real rate.
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

/// Initial viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerSettings {
    pub format: SampleFormat,
    pub sample_rate: f64,
    pub fft_size: usize,
    pub window_function: WindowFunction,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            format: SampleFormat::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            fft_size: FftConfig::DEFAULT_SIZE,
            window_function: WindowFunction::default(),
        }
    }
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub format: Option<SampleFormat>,
    pub sample_rate: Option<f64>,
    pub fft_size: Option<usize>,
    pub window_function: Option<WindowFunction>,
}

impl ViewerSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// File settings (or defaults) with `overrides` applied.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let settings = settings.apply(overrides);
        settings.fft_config()?;
        Ok(settings)
    }

    #[must_use]
    pub fn apply(self, overrides: Overrides) -> Self {
        Self {
            format: overrides.format.unwrap_or(self.format),
            sample_rate: overrides.sample_rate.unwrap_or(self.sample_rate),
            fft_size: overrides.fft_size.unwrap_or(self.fft_size),
            window_function: overrides.window_function.unwrap_or(self.window_function),
        }
    }

    pub fn fft_config(&self) -> Result<FftConfig> {
        FftConfig::new(self.fft_size, self.window_function).context("Invalid FFT settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_pipeline::ElementType;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.format.element(), ElementType::Complex64);
        assert_eq!(settings.fft_size, 1024);
        assert_eq!(settings.window_function, WindowFunction::Blackman);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            ViewerSettings::from_json_str(r#"{"format": "uint8", "window_function": "flattop"}"#)
                .unwrap();
        assert_eq!(settings.format.element(), ElementType::UInt8);
        assert_eq!(settings.window_function, WindowFunction::FlatTop);
        assert_eq!(settings.fft_size, 1024);
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(ViewerSettings::from_json_str(r#"{"window_function": "kaiser"}"#).is_err());
        assert!(ViewerSettings::from_json_str(r#"{"fft": 1024}"#).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sample_rate": 48000.0, "fft_size": 256}}"#).unwrap();
        file.flush().unwrap();

        let settings = ViewerSettings::resolve(
            Some(file.path()),
            Overrides {
                fft_size: Some(512),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert!((settings.sample_rate - 48000.0).abs() < f64::EPSILON);
        assert_eq!(settings.fft_size, 512);
    }

    #[test]
    fn test_unsupported_fft_size_rejected() {
        let overrides = Overrides {
            fft_size: Some(1000),
            ..Overrides::default()
        };
        assert!(ViewerSettings::resolve(None, overrides).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = Path::new("/nonexistent/iqplot.json");
        let err = ViewerSettings::resolve(Some(path), Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/iqplot.json"));
    }
}

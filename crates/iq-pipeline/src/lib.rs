// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Windowed loading and spectral analysis of raw IQ recordings.
//!
//! The library is split into layers that can be used on their own or wired
//! together through [`Session`]:
//!
//! - **Format layer**: record layouts of headerless sample files
//! - **Source layer**: a `[start, end)` window of decoded samples over a file,
//!   with commit-on-success updates and an injected [`LoadObserver`]
//! - **Spectral layer**: time axis, Welch PSD and spectrogram for a window
//!
//! # Quick Start
//!
//! ```no_run
//! use iq_pipeline::{FftConfig, LogObserver, SampleFormat, Session};
//!
//! let mut session = Session::new(
//!     SampleFormat::default(),
//!     FftConfig::default(),
//!     2_000_000.0,
//!     Box::new(LogObserver),
//! )?;
//! session.open_file("capture.cf32")?;
//! session.set_window(0, 65_536)?;
//!
//! let product = session.product()?;
//! println!("{} PSD bins", product.psd.frequencies.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Using Individual Layers
//!
//! ```no_run
//! use iq_pipeline::source::WindowedSampleSource;
//! use iq_pipeline::spectral::{FftConfig, SpectralTransformEngine, WindowFunction};
//! use iq_pipeline::format::{ElementType, SampleFormat};
//!
//! let source = WindowedSampleSource::open("capture.s16", SampleFormat::new(ElementType::Int16))?;
//! let engine = SpectralTransformEngine::new(FftConfig::new(256, WindowFunction::Hann)?);
//! let psd = engine.power_spectral_density(source.samples(), 48_000.0)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod format;
pub mod source;
pub mod spectral;

use std::fmt;
use std::path::Path;

use log::debug;
use thiserror::Error;

pub use format::{ElementType, SampleFormat};
pub use source::{
    LoadEvent, LoadObserver, LogObserver, RecordingObserver, SourceError, WindowBounds,
    WindowedSampleSource,
};
pub use spectral::{
    FftConfig, Placement, PsdCurve, SpectralProduct, SpectralTransformEngine, Spectrogram,
    TransformError, WindowFunction, FFT_SIZES,
};

/// Invalid user-facing configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported FFT size {0}, expected a power of two from 128 to 8192")]
    UnsupportedFftSize(usize),

    #[error("unknown window function '{0}'")]
    UnknownWindowFunction(String),

    #[error("unknown sample format '{0}'")]
    UnknownSampleFormat(String),
}

/// What the status display shows about the loaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub file_name: String,
    /// File size in bytes.
    pub file_len: u64,
    pub total_records: u64,
    pub window_start: u64,
    pub window_end: u64,
    /// Hz.
    pub sample_rate: f64,
}

impl fmt::Display for SourceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} bytes, {} records, showing [{}, {}) at {} Hz",
            self.file_name,
            self.file_len,
            self.total_records,
            self.window_start,
            self.window_end,
            self.sample_rate
        )
    }
}

/// A source and an engine wired together with the current sample rate.
///
/// The first file opened in a session is loaded whole. Files opened after
/// that keep the current window, clamped to the new file.
#[derive(Debug)]
pub struct Session {
    source: WindowedSampleSource,
    engine: SpectralTransformEngine,
    sample_rate: f64,
    opened_any: bool,
}

impl Session {
    pub fn new(
        format: SampleFormat,
        fft_config: FftConfig,
        sample_rate: f64,
        observer: Box<dyn LoadObserver>,
    ) -> Result<Self, TransformError> {
        spectral::check_sample_rate(sample_rate)?;
        Ok(Self {
            source: WindowedSampleSource::with_observer(format, observer),
            engine: SpectralTransformEngine::new(fft_config),
            sample_rate,
            opened_any: false,
        })
    }

    /// Load `path`, resetting the window only for the first file.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<(), SourceError> {
        let reset = !self.opened_any;
        self.source.load(path, reset)?;
        self.opened_any = true;
        debug!("Opened {:?} (reset: {reset})", self.source.file_name());
        Ok(())
    }

    /// Whether a file has been opened successfully.
    #[must_use]
    pub fn has_file(&self) -> bool {
        self.opened_any
    }

    pub fn set_window(&mut self, start: u64, end: u64) -> Result<(), SourceError> {
        self.source.try_set_window(start, end)
    }

    pub fn set_format(&mut self, format: SampleFormat) -> Result<(), SourceError> {
        self.source.set_format(format)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<(), TransformError> {
        spectral::check_sample_rate(sample_rate)?;
        self.sample_rate = sample_rate;
        Ok(())
    }

    pub fn set_fft_size(&mut self, size: usize) -> Result<(), ConfigError> {
        self.engine.config_mut().set_size(size)
    }

    pub fn set_window_function(&mut self, window_function: WindowFunction) {
        self.engine.config_mut().set_window_function(window_function);
    }

    #[must_use]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[must_use]
    pub fn source(&self) -> &WindowedSampleSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut WindowedSampleSource {
        &mut self.source
    }

    #[must_use]
    pub fn engine(&self) -> &SpectralTransformEngine {
        &self.engine
    }

    /// Recompute every plot product for the current window.
    pub fn product(&self) -> Result<SpectralProduct, TransformError> {
        self.engine.compute(
            self.source.samples(),
            self.source.window_start(),
            self.source.window_end(),
            self.sample_rate,
        )
    }

    /// `None` until a file has been loaded.
    #[must_use]
    pub fn summary(&self) -> Option<SourceSummary> {
        let file_name = self.source.file_name()?;
        Some(SourceSummary {
            file_name,
            file_len: self.source.file_len(),
            total_records: self.source.total_records(),
            window_start: self.source.window_start(),
            window_end: self.source.window_end(),
            sample_rate: self.sample_rate,
        })
    }
}

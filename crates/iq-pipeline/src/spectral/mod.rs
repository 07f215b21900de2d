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

//! Spectral transforms over a window of samples.

mod transform;
mod window;

pub use transform::{Placement, PsdCurve, SpectralProduct, Spectrogram, TransformError};
pub use window::WindowFunction;

pub(crate) use transform::check_sample_rate;

use log::debug;
use num_complex::Complex64;

use crate::ConfigError;

/// FFT sizes offered to the user.
pub const FFT_SIZES: [usize; 7] = [128, 256, 512, 1024, 2048, 4096, 8192];

/// FFT segment length and taper.
///
/// The taper coefficients are cached and recomputed whenever the size or the
/// window function changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FftConfig {
    size: usize,
    window_function: WindowFunction,
    coefficients: Vec<f64>,
}

impl FftConfig {
    pub const DEFAULT_SIZE: usize = 1024;

    /// Create a config, rejecting sizes outside [`FFT_SIZES`].
    pub fn new(size: usize, window_function: WindowFunction) -> Result<Self, ConfigError> {
        check_size(size)?;
        Ok(Self {
            size,
            window_function,
            coefficients: window_function.coefficients(size),
        })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn window_function(&self) -> WindowFunction {
        self.window_function
    }

    /// Taper coefficients, `size` of them.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Samples shared by consecutive segments.
    #[must_use]
    pub fn noverlap(&self) -> usize {
        self.size / 4
    }

    pub fn set_size(&mut self, size: usize) -> Result<(), ConfigError> {
        check_size(size)?;
        if size != self.size {
            self.size = size;
            self.recompute();
        }
        Ok(())
    }

    pub fn set_window_function(&mut self, window_function: WindowFunction) {
        if window_function != self.window_function {
            self.window_function = window_function;
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        debug!("Recomputing {} taper for FFT size {}", self.window_function, self.size);
        self.coefficients = self.window_function.coefficients(self.size);
    }
}

impl Default for FftConfig {
    fn default() -> Self {
        let window_function = WindowFunction::default();
        Self {
            size: Self::DEFAULT_SIZE,
            window_function,
            coefficients: window_function.coefficients(Self::DEFAULT_SIZE),
        }
    }
}

fn check_size(size: usize) -> Result<(), ConfigError> {
    if FFT_SIZES.contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedFftSize(size))
    }
}

/// Turns a sample window into plot-ready products.
///
/// Holds only the [`FftConfig`]; every call recomputes from scratch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectralTransformEngine {
    config: FftConfig,
}

impl SpectralTransformEngine {
    #[must_use]
    pub fn new(config: FftConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut FftConfig {
        &mut self.config
    }

    /// Evenly spaced timestamps for a window of `len` samples.
    pub fn time_axis(
        &self,
        len: usize,
        window_start: u64,
        window_end: u64,
        sample_rate: f64,
    ) -> Result<Vec<f64>, TransformError> {
        transform::time_axis(len, window_start, window_end, sample_rate)
    }

    pub fn power_spectral_density(
        &self,
        samples: &[Complex64],
        sample_rate: f64,
    ) -> Result<PsdCurve, TransformError> {
        transform::power_spectral_density(samples, sample_rate, &self.config)
    }

    pub fn spectrogram(
        &self,
        samples: &[Complex64],
        sample_rate: f64,
    ) -> Result<Spectrogram, TransformError> {
        transform::spectrogram(samples, sample_rate, &self.config)
    }

    /// All three products for `samples`, the decoded window `[start, end)`.
    pub fn compute(
        &self,
        samples: &[Complex64],
        window_start: u64,
        window_end: u64,
        sample_rate: f64,
    ) -> Result<SpectralProduct, TransformError> {
        Ok(SpectralProduct {
            time_axis: self.time_axis(samples.len(), window_start, window_end, sample_rate)?,
            psd: self.power_spectral_density(samples, sample_rate)?,
            spectrogram: self.spectrogram(samples, sample_rate)?,
        })
    }
}

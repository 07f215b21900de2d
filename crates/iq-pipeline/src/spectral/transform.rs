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

//! Time axis, Welch PSD and STFT spectrogram.
//!
//! Both spectral estimates cut the buffer into segments of `fft_size`
//! samples advancing by `fft_size - fft_size / 4`, drop any trailing partial
//! segment, remove each segment's mean, apply the taper and take a complex
//! FFT. The spectrum is two-sided and shifted so the most negative frequency
//! comes first.
//!
//! A buffer shorter than `fft_size` forms a single segment of its own length:
//! the mean is taken over the real samples, the taper is generated at that
//! length, and only then is the result zero-padded to `fft_size` for the FFT.
//!
//! Powers are converted with `10·log10(p)`; a bin with zero power comes out
//! as negative infinity and is passed through as-is.

use ndarray::Array2;
use num_complex::Complex64;
use rustfft::FftPlanner;
use thiserror::Error;

use super::FftConfig;

/// Errors from the spectral transforms.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("sample buffer is empty")]
    EmptyBuffer,

    #[error("sample rate must be a positive finite number of Hz, got {0}")]
    InvalidSampleRate(f64),
}

/// Power spectral density curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PsdCurve {
    /// Frequency of each bin in Hz, ascending, zero-centered.
    pub frequencies: Vec<f64>,
    /// Density in dB relative to 1 unit²/Hz.
    pub magnitude_db: Vec<f64>,
}

/// Affine placement of a spectrogram image on frequency/time axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// `(frequencies[0], times[0])`.
    pub origin: (f64, f64),
    /// Width of one pixel along frequency and time.
    pub scale: (f64, f64),
}

/// Short-time power spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Frequency of each row in Hz, ascending, zero-centered.
    pub frequencies: Vec<f64>,
    /// Center time of each segment in seconds from the start of the buffer.
    pub times: Vec<f64>,
    /// Power in dB, indexed `[frequency, segment]`.
    pub magnitude_db: Array2<f64>,
    pub placement: Placement,
}

/// All three products for one sample window.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralProduct {
    pub time_axis: Vec<f64>,
    pub psd: PsdCurve,
    pub spectrogram: Spectrogram,
}

/// How a segment's `|X|²` is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scaling {
    /// Per Hz: `1 / (fs · Σw²)`.
    Density,
    /// Per bin: `1 / (Σw)²`.
    Spectrum,
}

pub(crate) fn check_sample_rate(sample_rate: f64) -> Result<(), TransformError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(TransformError::InvalidSampleRate(sample_rate))
    }
}

#[allow(clippy::cast_precision_loss, reason = "sample counts well below 2^52")]
fn as_f64(n: usize) -> f64 {
    n as f64
}

/// `len` timestamps evenly spaced over `[start, end]` and scaled by the
/// sample period.
///
/// This is the record index treated as time, not a measured duration.
pub fn time_axis(
    len: usize,
    start: u64,
    end: u64,
    sample_rate: f64,
) -> Result<Vec<f64>, TransformError> {
    check_sample_rate(sample_rate)?;

    #[allow(clippy::cast_precision_loss, reason = "record indices well below 2^52")]
    let (start, end) = (start as f64, end as f64);

    let axis = match len {
        0 => Vec::new(),
        1 => vec![start / sample_rate],
        _ => {
            let step = (end - start) / as_f64(len - 1);
            (0..len)
                .map(|i| (start + step * as_f64(i)) / sample_rate)
                .collect()
        }
    };
    Ok(axis)
}

/// Welch power spectral density estimate.
pub fn power_spectral_density(
    samples: &[Complex64],
    sample_rate: f64,
    config: &FftConfig,
) -> Result<PsdCurve, TransformError> {
    check_sample_rate(sample_rate)?;
    let segments = segment_powers(samples, sample_rate, config, Scaling::Density)?;

    let n = config.size();
    let count = as_f64(segments.len());
    let mut mean = vec![0.0; n];
    for segment in &segments {
        for (acc, p) in mean.iter_mut().zip(segment) {
            *acc += p / count;
        }
    }

    Ok(PsdCurve {
        frequencies: shifted_frequencies(n, sample_rate),
        magnitude_db: fft_shift(&mean).into_iter().map(to_db).collect(),
    })
}

/// STFT power spectrogram with its display placement.
pub fn spectrogram(
    samples: &[Complex64],
    sample_rate: f64,
    config: &FftConfig,
) -> Result<Spectrogram, TransformError> {
    check_sample_rate(sample_rate)?;
    let segments = segment_powers(samples, sample_rate, config, Scaling::Spectrum)?;

    let n = config.size();
    let segment_len = samples.len().min(n);
    let step = n - config.noverlap();
    let frequencies = shifted_frequencies(n, sample_rate);
    let times: Vec<f64> = (0..segments.len())
        .map(|k| (as_f64(segment_len) / 2.0 + as_f64(k * step)) / sample_rate)
        .collect();

    let mut magnitude_db = Array2::<f64>::zeros((n, segments.len()));
    for (k, segment) in segments.iter().enumerate() {
        for (row, p) in fft_shift(segment).into_iter().enumerate() {
            magnitude_db[[row, k]] = to_db(p);
        }
    }

    let placement = placement(&frequencies, &times);
    Ok(Spectrogram {
        frequencies,
        times,
        magnitude_db,
        placement,
    })
}

fn placement(frequencies: &[f64], times: &[f64]) -> Placement {
    let span = |axis: &[f64]| match (axis.first(), axis.last()) {
        (Some(first), Some(last)) => (*first, (last - first) / as_f64(axis.len())),
        _ => (0.0, 0.0),
    };
    let (f0, df) = span(frequencies);
    let (t0, dt) = span(times);
    Placement {
        origin: (f0, t0),
        scale: (df, dt),
    }
}

/// Scaled `|X|²` for every full segment, in FFT (unshifted) bin order.
fn segment_powers(
    samples: &[Complex64],
    sample_rate: f64,
    config: &FftConfig,
    scaling: Scaling,
) -> Result<Vec<Vec<f64>>, TransformError> {
    if samples.is_empty() {
        return Err(TransformError::EmptyBuffer);
    }

    let n = config.size();
    let short_window;
    let (segment_len, window) = if samples.len() < n {
        short_window = config.window_function().coefficients(samples.len());
        (samples.len(), &short_window[..])
    } else {
        (n, config.coefficients())
    };
    let scale = match scaling {
        Scaling::Density => 1.0 / (sample_rate * window.iter().map(|w| w * w).sum::<f64>()),
        Scaling::Spectrum => 1.0 / window.iter().sum::<f64>().powi(2),
    };

    let step = n - config.noverlap();
    let count = (samples.len() - segment_len) / step + 1;
    let fft = FftPlanner::<f64>::new().plan_fft_forward(n);

    let powers = (0..count)
        .map(|k| {
            let segment = &samples[k * step..k * step + segment_len];
            let mean = segment.iter().sum::<Complex64>() / as_f64(segment_len);
            let mut buf: Vec<Complex64> = segment
                .iter()
                .zip(window)
                .map(|(s, w)| (s - mean) * *w)
                .collect();
            buf.resize(n, Complex64::new(0.0, 0.0));
            fft.process(&mut buf);
            buf.iter().map(|x| x.norm_sqr() * scale).collect()
        })
        .collect();
    Ok(powers)
}

/// `fftfreq(n, 1/fs)` reordered so negative frequencies come first.
fn shifted_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    let df = sample_rate / as_f64(n);
    let unshifted: Vec<f64> = (0..n)
        .map(|i| {
            if i < n.div_ceil(2) {
                as_f64(i) * df
            } else {
                -(as_f64(n - i)) * df
            }
        })
        .collect();
    fft_shift(&unshifted)
}

/// Move the zero-frequency bin to the middle, as `numpy.fft.fftshift` does.
fn fft_shift<T: Copy>(values: &[T]) -> Vec<T> {
    let n = values.len();
    let half = n / 2;
    (0..n).map(|i| values[(i + n - half) % n]).collect()
}

fn to_db(power: f64) -> f64 {
    10.0 * power.abs().log10()
}

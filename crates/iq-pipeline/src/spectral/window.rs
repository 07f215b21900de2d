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

//! Tapering windows applied to each FFT segment.
//!
//! | Window           | Sidelobe level | Notes                          |
//! |------------------|----------------|--------------------------------|
//! | `boxcar`         | -13 dB         | No tapering                    |
//! | `triang`         | -27 dB         | Non-zero end points            |
//! | `bartlett`       | -27 dB         | Zero end points                |
//! | `hann`           | -32 dB         | General purpose                |
//! | `hamming`        | -43 dB         | General purpose                |
//! | `barthann`       | -36 dB         | Bartlett/Hann hybrid           |
//! | `bohman`         | -46 dB         |                                |
//! | `parzen`         | -53 dB         |                                |
//! | `blackman`       | -58 dB         | Default                        |
//! | `flattop`        | -93 dB         | Accurate tone amplitudes       |
//! | `blackmanharris` | -92 dB         | High dynamic range             |
//! | `nuttall`        | -98 dB         | High dynamic range             |
//!
//! Coefficients are the periodic form used for spectral analysis: the
//! symmetric window of length `n + 1` with its last point dropped.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Supported tapering windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    Boxcar,
    Triang,
    #[default]
    Blackman,
    Hamming,
    Hann,
    Bartlett,
    FlatTop,
    Parzen,
    Bohman,
    BlackmanHarris,
    Nuttall,
    BartHann,
}

/// One row of the window lookup table.
struct WindowEntry {
    function: WindowFunction,
    name: &'static str,
    symmetric: fn(usize) -> Vec<f64>,
}

/// Indexed by `WindowFunction as usize`.
static WINDOWS: [WindowEntry; 12] = [
    WindowEntry {
        function: WindowFunction::Boxcar,
        name: "boxcar",
        symmetric: boxcar,
    },
    WindowEntry {
        function: WindowFunction::Triang,
        name: "triang",
        symmetric: triang,
    },
    WindowEntry {
        function: WindowFunction::Blackman,
        name: "blackman",
        symmetric: blackman,
    },
    WindowEntry {
        function: WindowFunction::Hamming,
        name: "hamming",
        symmetric: hamming,
    },
    WindowEntry {
        function: WindowFunction::Hann,
        name: "hann",
        symmetric: hann,
    },
    WindowEntry {
        function: WindowFunction::Bartlett,
        name: "bartlett",
        symmetric: bartlett,
    },
    WindowEntry {
        function: WindowFunction::FlatTop,
        name: "flattop",
        symmetric: flattop,
    },
    WindowEntry {
        function: WindowFunction::Parzen,
        name: "parzen",
        symmetric: parzen,
    },
    WindowEntry {
        function: WindowFunction::Bohman,
        name: "bohman",
        symmetric: bohman,
    },
    WindowEntry {
        function: WindowFunction::BlackmanHarris,
        name: "blackmanharris",
        symmetric: blackman_harris,
    },
    WindowEntry {
        function: WindowFunction::Nuttall,
        name: "nuttall",
        symmetric: nuttall,
    },
    WindowEntry {
        function: WindowFunction::BartHann,
        name: "barthann",
        symmetric: barthann,
    },
];

impl WindowFunction {
    /// Every supported window, in menu order.
    pub const ALL: [Self; 12] = [
        Self::Boxcar,
        Self::Triang,
        Self::Blackman,
        Self::Hamming,
        Self::Hann,
        Self::Bartlett,
        Self::FlatTop,
        Self::Parzen,
        Self::Bohman,
        Self::BlackmanHarris,
        Self::Nuttall,
        Self::BartHann,
    ];

    fn entry(self) -> &'static WindowEntry {
        &WINDOWS[self as usize]
    }

    /// Canonical lowercase name, e.g. `"blackmanharris"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Periodic coefficients of length `size`. A single-point window is `[1.0]`.
    #[must_use]
    pub fn coefficients(self, size: usize) -> Vec<f64> {
        if size <= 1 {
            return vec![1.0; size];
        }
        let mut w = (self.entry().symmetric)(size + 1);
        w.truncate(size);
        w
    }
}

impl fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowFunction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        WINDOWS
            .iter()
            .find(|entry| entry.name == wanted)
            .map(|entry| entry.function)
            .ok_or_else(|| ConfigError::UnknownWindowFunction(s.to_string()))
    }
}

#[allow(clippy::cast_precision_loss, reason = "window lengths are at most a few thousand")]
fn as_f64(n: usize) -> f64 {
    n as f64
}

fn boxcar(m: usize) -> Vec<f64> {
    vec![1.0; m]
}

/// Sum of cosines `Σ a[k]·cos(k·x)` with `x` running from -π to π.
fn general_cosine(m: usize, a: &[f64]) -> Vec<f64> {
    if m <= 1 {
        return vec![1.0; m];
    }
    let last = as_f64(m - 1);
    (0..m)
        .map(|n| {
            let x = -PI + 2.0 * PI * as_f64(n) / last;
            a.iter()
                .enumerate()
                .map(|(k, &ak)| ak * (as_f64(k) * x).cos())
                .sum()
        })
        .collect()
}

fn hann(m: usize) -> Vec<f64> {
    general_cosine(m, &[0.5, 0.5])
}

fn hamming(m: usize) -> Vec<f64> {
    general_cosine(m, &[0.54, 0.46])
}

fn blackman(m: usize) -> Vec<f64> {
    general_cosine(m, &[0.42, 0.50, 0.08])
}

fn blackman_harris(m: usize) -> Vec<f64> {
    general_cosine(m, &[0.358_75, 0.488_29, 0.141_28, 0.011_68])
}

fn nuttall(m: usize) -> Vec<f64> {
    general_cosine(m, &[0.363_581_9, 0.489_177_5, 0.136_599_5, 0.010_641_1])
}

fn flattop(m: usize) -> Vec<f64> {
    general_cosine(
        m,
        &[
            0.215_578_95,
            0.416_631_58,
            0.277_263_158,
            0.083_578_947,
            0.006_947_368,
        ],
    )
}

fn triang(m: usize) -> Vec<f64> {
    let half = (m + 1) / 2;
    let rising: Vec<f64> = (1..=half)
        .map(|n| {
            if m % 2 == 0 {
                (2.0 * as_f64(n) - 1.0) / as_f64(m)
            } else {
                2.0 * as_f64(n) / as_f64(m + 1)
            }
        })
        .collect();

    let mut w = rising.clone();
    // Odd lengths share the peak between the two halves.
    let skip = m % 2;
    w.extend(rising.iter().rev().skip(skip));
    w
}

fn bartlett(m: usize) -> Vec<f64> {
    if m <= 1 {
        return vec![1.0; m];
    }
    let last = as_f64(m - 1);
    (0..m)
        .map(|n| {
            let n = as_f64(n);
            if n <= last / 2.0 {
                2.0 * n / last
            } else {
                2.0 - 2.0 * n / last
            }
        })
        .collect()
}

fn parzen(m: usize) -> Vec<f64> {
    let half_width = as_f64(m) / 2.0;
    let centre = (as_f64(m) - 1.0) / 2.0;
    (0..m)
        .map(|n| {
            let r = (as_f64(n) - centre).abs();
            let x = r / half_width;
            if r <= (as_f64(m) - 1.0) / 4.0 {
                1.0 - 6.0 * x.powi(2) + 6.0 * x.powi(3)
            } else {
                2.0 * (1.0 - x).powi(3)
            }
        })
        .collect()
}

fn bohman(m: usize) -> Vec<f64> {
    if m <= 1 {
        return vec![1.0; m];
    }
    let last = as_f64(m - 1);
    (0..m)
        .map(|n| {
            if n == 0 || n == m - 1 {
                return 0.0;
            }
            let fac = (-1.0 + 2.0 * as_f64(n) / last).abs();
            (1.0 - fac) * (PI * fac).cos() + (PI * fac).sin() / PI
        })
        .collect()
}

fn barthann(m: usize) -> Vec<f64> {
    if m <= 1 {
        return vec![1.0; m];
    }
    let last = as_f64(m - 1);
    (0..m)
        .map(|n| {
            let fac = (as_f64(n) / last - 0.5).abs();
            0.62 - 0.48 * fac + 0.38 * (2.0 * PI * fac).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_table_matches_enum() {
        for (i, function) in WindowFunction::ALL.iter().enumerate() {
            assert_eq!(*function as usize, i);
            assert_eq!(WINDOWS[i].function, *function);
        }
    }

    #[test]
    fn test_names_parse_back() {
        for function in WindowFunction::ALL {
            assert_eq!(function.name().parse::<WindowFunction>().unwrap(), function);
        }
        assert_eq!("Hann".parse::<WindowFunction>().unwrap(), WindowFunction::Hann);
        assert!(matches!(
            "kaiser".parse::<WindowFunction>(),
            Err(ConfigError::UnknownWindowFunction(_))
        ));
    }

    #[test]
    fn test_short_lengths() {
        for function in WindowFunction::ALL {
            assert!(function.coefficients(0).is_empty());
            assert_eq!(function.coefficients(1), vec![1.0], "{function}");
            let w = function.coefficients(100);
            assert!(w.iter().sum::<f64>() > 0.0, "{function}");
        }
    }

    #[test]
    fn test_every_window_every_size() {
        for function in WindowFunction::ALL {
            for size in crate::spectral::FFT_SIZES {
                let w = function.coefficients(size);
                assert_eq!(w.len(), size, "{function} at {size}");
                assert!(w.iter().all(|c| c.is_finite()), "{function} at {size}");
            }
        }
    }

    #[test]
    fn test_periodic_hann() {
        assert_close(&WindowFunction::Hann.coefficients(4), &[0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_periodic_triang() {
        assert_close(
            &WindowFunction::Triang.coefficients(4),
            &[1.0 / 3.0, 2.0 / 3.0, 1.0, 2.0 / 3.0],
        );
        assert_close(&triang(4), &[0.25, 0.75, 0.75, 0.25]);
    }

    #[test]
    fn test_symmetric_shapes() {
        assert_close(&bartlett(5), &[0.0, 0.5, 1.0, 0.5, 0.0]);
        assert_close(&boxcar(3), &[1.0, 1.0, 1.0]);

        let b = blackman(9);
        assert!(b[0].abs() < 1e-12);
        assert!((b[4] - 1.0).abs() < 1e-12);

        let p = parzen(5);
        assert!((p[2] - 1.0).abs() < 1e-12);
        assert!((p[0] - p[4]).abs() < 1e-12);

        let bh = bohman(5);
        assert_eq!(bh[0], 0.0);
        assert!((bh[2] - 1.0).abs() < 1e-12);

        let bt = barthann(5);
        assert!((bt[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_flattop_peak_is_unity() {
        let w = flattop(101);
        assert!((w[50] - 1.0).abs() < 1e-6);
    }
}

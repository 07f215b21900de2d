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

//! Record layouts for headerless sample files.
//!
//! A recording is a flat sequence of fixed-width records with no header.
//! The caller picks the [`SampleFormat`]; nothing here tries to detect it.
//! Picking the wrong one is not an error, it just decodes to garbage.
//!
//! All records are little-endian. Complex types hold an interleaved `(re, im)`
//! pair, real types decode to `re` with a zero imaginary part. Integers are
//! converted to `f64` as raw counts without normalization.

use std::fmt;
use std::io;
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Element type of a single on-disk record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Interleaved `f32` I/Q pair (GNU Radio `gr_complex`).
    #[default]
    Complex64,
    /// Interleaved `f64` I/Q pair.
    Complex128,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
}

impl ElementType {
    /// Every supported element type, in menu order.
    pub const ALL: [Self; 12] = [
        Self::Complex64,
        Self::Complex128,
        Self::Float32,
        Self::Float64,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
    ];

    /// Size of one record in bytes.
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Float32 | Self::Int32 | Self::UInt32 => 4,
            Self::Complex64 | Self::Float64 | Self::Int64 | Self::UInt64 => 8,
            Self::Complex128 => 16,
        }
    }

    /// Canonical lowercase name, e.g. `"complex64"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
        }
    }

    /// Whether a record carries both I and Q.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "64-bit integer samples are displayed as f64; precision loss is accepted"
    )]
    fn read_one(self, mut rdr: &[u8]) -> io::Result<Complex64> {
        let sample = match self {
            Self::Complex64 => {
                let re = rdr.read_f32::<LittleEndian>()?;
                let im = rdr.read_f32::<LittleEndian>()?;
                Complex64::new(f64::from(re), f64::from(im))
            }
            Self::Complex128 => {
                let re = rdr.read_f64::<LittleEndian>()?;
                let im = rdr.read_f64::<LittleEndian>()?;
                Complex64::new(re, im)
            }
            Self::Float32 => Complex64::from(f64::from(rdr.read_f32::<LittleEndian>()?)),
            Self::Float64 => Complex64::from(rdr.read_f64::<LittleEndian>()?),
            Self::Int8 => Complex64::from(f64::from(rdr.read_i8()?)),
            Self::Int16 => Complex64::from(f64::from(rdr.read_i16::<LittleEndian>()?)),
            Self::Int32 => Complex64::from(f64::from(rdr.read_i32::<LittleEndian>()?)),
            Self::Int64 => Complex64::from(rdr.read_i64::<LittleEndian>()? as f64),
            Self::UInt8 => Complex64::from(f64::from(rdr.read_u8()?)),
            Self::UInt16 => Complex64::from(f64::from(rdr.read_u16::<LittleEndian>()?)),
            Self::UInt32 => Complex64::from(f64::from(rdr.read_u32::<LittleEndian>()?)),
            Self::UInt64 => Complex64::from(rdr.read_u64::<LittleEndian>()? as f64),
        };
        Ok(sample)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|element| element.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownSampleFormat(s.to_string()))
    }
}

/// On-disk record layout of a sample file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleFormat {
    element: ElementType,
}

impl SampleFormat {
    /// Create a format for the given element type.
    #[must_use]
    pub const fn new(element: ElementType) -> Self {
        Self { element }
    }

    /// The element type.
    #[must_use]
    pub const fn element(&self) -> ElementType {
        self.element
    }

    /// Record width in bytes. Always greater than zero.
    #[must_use]
    pub const fn record_width(&self) -> usize {
        self.element.byte_width()
    }

    /// Decode whole records from `bytes`.
    ///
    /// Any trailing partial record is ignored; callers that care about it
    /// check the length themselves before reading.
    pub fn decode(&self, bytes: &[u8]) -> io::Result<Vec<Complex64>> {
        bytes
            .chunks_exact(self.record_width())
            .map(|record| self.element.read_one(record))
            .collect()
    }
}

impl From<ElementType> for SampleFormat {
    fn from(element: ElementType) -> Self {
        Self::new(element)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} B/record)", self.element, self.record_width())
    }
}

impl FromStr for SampleFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ElementType>().map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_widths() {
        let widths: Vec<usize> = ElementType::ALL.iter().map(|e| e.byte_width()).collect();
        assert_eq!(widths, vec![8, 16, 4, 8, 1, 2, 4, 8, 1, 2, 4, 8]);
        assert!(ElementType::ALL.iter().all(|e| e.byte_width() > 0));
    }

    #[test]
    fn test_names_parse_back() {
        for element in ElementType::ALL {
            assert_eq!(element.name().parse::<ElementType>().unwrap(), element);
        }
        assert_eq!("  Complex64 ".parse::<ElementType>().unwrap(), ElementType::Complex64);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "cf32".parse::<SampleFormat>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownSampleFormat("cf32".to_string()));
    }

    #[test]
    fn test_decode_complex64() {
        let mut bytes = Vec::new();
        for v in [1.0f32, -1.0, 0.5, 2.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let samples = SampleFormat::new(ElementType::Complex64).decode(&bytes).unwrap();
        assert_eq!(samples, vec![Complex64::new(1.0, -1.0), Complex64::new(0.5, 2.0)]);
    }

    #[test]
    fn test_decode_real_integers() {
        let mut bytes = Vec::new();
        for v in [-300i16, 7] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let samples = SampleFormat::new(ElementType::Int16).decode(&bytes).unwrap();
        assert_eq!(samples, vec![Complex64::new(-300.0, 0.0), Complex64::new(7.0, 0.0)]);

        let samples = SampleFormat::new(ElementType::UInt8).decode(&[0, 128, 255]).unwrap();
        assert_eq!(samples.len(), 3);
        assert!((samples[2].re - 255.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_ignores_partial_record() {
        let bytes = [0u8; 9];
        let samples = SampleFormat::default().decode(&bytes).unwrap();
        assert_eq!(samples.len(), 1);
    }
}

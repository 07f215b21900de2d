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

//! Windowed access to a fixed-record sample file.
//!
//! [`WindowedSampleSource`] keeps a `[start, end)` record window over a file
//! and the decoded samples for that window. Every load resolves the requested
//! window against the current file length, reads just that slice, and only
//! then commits the new path, window and samples together. A load that fails
//! at any step leaves the previous state exactly as it was.
//!
//! Window resolution:
//!
//! - a reset load always takes the whole file, `[0, total_records)`;
//! - otherwise `start >= total_records` becomes `total_records - 1` and
//!   `end > total_records` becomes `total_records`, reported to the observer
//!   as [`LoadEvent::RangeAdjusted`];
//! - a window whose start is still past its end is rejected with
//!   [`SourceError::InvalidWindow`]. An empty window (`start == end`) is fine.

mod observer;

pub use observer::{LoadEvent, LoadObserver, LogObserver, RecordingObserver};

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use num_complex::Complex64;
use thiserror::Error;

use crate::format::SampleFormat;

/// Errors from loading a sample window.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "file is too short: {} has {byte_len} bytes, needed at least {record_width}",
        path.display()
    )]
    InsufficientData {
        path: PathBuf,
        byte_len: u64,
        record_width: usize,
    },

    #[error("no source file has been loaded")]
    NoSourceConfigured,

    #[error("window start {start} is past window end {end}")]
    InvalidWindow { start: u64, end: u64 },
}

/// A `[start, end)` range of record indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowBounds {
    pub start: u64,
    pub end: u64,
}

impl WindowBounds {
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of records in the window, zero if it is inverted.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a requested window against a file of `total_records` records.
    ///
    /// `total_records` must be non-zero; the caller has already rejected
    /// shorter files.
    #[must_use]
    pub fn resolve(self, total_records: u64, reset: bool) -> Self {
        if reset {
            return Self::new(0, total_records);
        }

        let mut resolved = self;
        if resolved.start >= total_records {
            resolved.start = total_records - 1;
        }
        if resolved.end > total_records {
            resolved.end = total_records;
        }
        resolved
    }
}

impl fmt::Display for WindowBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A window of decoded samples backed by a file on disk.
#[derive(Debug)]
pub struct WindowedSampleSource {
    source_path: Option<PathBuf>,
    format: SampleFormat,
    window: WindowBounds,
    total_records: u64,
    file_len: u64,
    samples: Vec<Complex64>,
    observer: Box<dyn LoadObserver>,
}

/// Everything a successful read produces, committed in one step.
///
/// Warnings raised while reading are held here and only reported on commit.
struct LoadedWindow {
    path: PathBuf,
    format: SampleFormat,
    window: WindowBounds,
    total_records: u64,
    file_len: u64,
    samples: Vec<Complex64>,
    warnings: Vec<LoadEvent>,
}

impl WindowedSampleSource {
    /// Create an empty source that logs its notifications.
    #[must_use]
    pub fn new(format: SampleFormat) -> Self {
        Self::with_observer(format, Box::new(LogObserver))
    }

    /// Create an empty source reporting to `observer`.
    #[must_use]
    pub fn with_observer(format: SampleFormat, observer: Box<dyn LoadObserver>) -> Self {
        Self {
            source_path: None,
            format,
            window: WindowBounds::default(),
            total_records: 0,
            file_len: 0,
            samples: Vec::new(),
            observer,
        }
    }

    /// Create a source and load the whole of `path`.
    pub fn open(path: impl AsRef<Path>, format: SampleFormat) -> Result<Self, SourceError> {
        let mut source = Self::new(format);
        source.load(path, true)?;
        Ok(source)
    }

    /// Load `path`, either the whole file (`reset`) or the current window
    /// clamped to the file.
    pub fn load(&mut self, path: impl AsRef<Path>, reset: bool) -> Result<(), SourceError> {
        let loaded = Self::read_window(path.as_ref(), self.format, self.window, reset)?;
        self.commit(loaded);
        Ok(())
    }

    /// Load the current window again from the current path.
    pub fn reload(&mut self) -> Result<(), SourceError> {
        let path = self.loaded_path()?;
        self.load(path, false)
    }

    /// Move the window to `[start, end)` and load it.
    ///
    /// The bounds are clamped like any other non-reset load. Nothing changes
    /// unless the read succeeds.
    pub fn try_set_window(&mut self, start: u64, end: u64) -> Result<(), SourceError> {
        let path = self.loaded_path()?;
        let loaded = Self::read_window(&path, self.format, WindowBounds::new(start, end), false)?;
        self.commit(loaded);
        Ok(())
    }

    /// Move the start of the window and reload.
    pub fn set_window_start(&mut self, start: u64) -> Result<(), SourceError> {
        self.try_set_window(start, self.window.end)
    }

    /// Move the end of the window and reload.
    pub fn set_window_end(&mut self, end: u64) -> Result<(), SourceError> {
        self.try_set_window(self.window.start, end)
    }

    /// Change the record format, re-reading the current file if there is one.
    pub fn set_format(&mut self, format: SampleFormat) -> Result<(), SourceError> {
        match self.source_path.clone() {
            Some(path) => {
                let loaded = Self::read_window(&path, format, self.window, false)?;
                self.commit(loaded);
            }
            None => self.format = format,
        }
        Ok(())
    }

    /// Path of the last successful load.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// File name component of the current path, for display.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.source_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    #[must_use]
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    #[must_use]
    pub fn window(&self) -> WindowBounds {
        self.window
    }

    #[must_use]
    pub fn window_start(&self) -> u64 {
        self.window.start
    }

    #[must_use]
    pub fn window_end(&self) -> u64 {
        self.window.end
    }

    /// Whole records in the file as of the last load.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// File size in bytes as of the last load.
    #[must_use]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Decoded samples for the current window.
    #[must_use]
    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn loaded_path(&self) -> Result<PathBuf, SourceError> {
        self.source_path
            .clone()
            .ok_or(SourceError::NoSourceConfigured)
    }

    fn commit(&mut self, loaded: LoadedWindow) {
        for warning in &loaded.warnings {
            self.observer.notify(warning);
        }
        self.observer.notify(&LoadEvent::Loaded {
            path: loaded.path.clone(),
            window: loaded.window,
            total_records: loaded.total_records,
        });
        self.source_path = Some(loaded.path);
        self.format = loaded.format;
        self.window = loaded.window;
        self.total_records = loaded.total_records;
        self.file_len = loaded.file_len;
        self.samples = loaded.samples;
    }

    /// Count whole records, noting any trailing partial record in `warnings`.
    fn record_count(
        path: &Path,
        byte_len: u64,
        format: SampleFormat,
        warnings: &mut Vec<LoadEvent>,
    ) -> Result<u64, SourceError> {
        let width = format.record_width() as u64;
        let excess = byte_len % width;
        if excess != 0 {
            warnings.push(LoadEvent::TrailingBytesDropped {
                path: path.to_path_buf(),
                byte_len,
                record_width: format.record_width(),
                excess,
            });
        }

        let total_records = byte_len / width;
        if total_records == 0 {
            return Err(SourceError::InsufficientData {
                path: path.to_path_buf(),
                byte_len,
                record_width: format.record_width(),
            });
        }
        Ok(total_records)
    }

    /// Resolve `requested` against the file and read it, without touching `self`.
    fn read_window(
        path: &Path,
        format: SampleFormat,
        requested: WindowBounds,
        reset: bool,
    ) -> Result<LoadedWindow, SourceError> {
        let io_err = |source: io::Error| SourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let file_len = file.metadata().map_err(io_err)?.len();
        let mut warnings = Vec::new();
        let total_records = Self::record_count(path, file_len, format, &mut warnings)?;

        let window = requested.resolve(total_records, reset);
        if !reset && window != requested {
            warnings.push(LoadEvent::RangeAdjusted {
                requested,
                resolved: window,
            });
        }
        if window.start > window.end {
            return Err(SourceError::InvalidWindow {
                start: window.start,
                end: window.end,
            });
        }

        let width = format.record_width() as u64;
        let byte_count = usize::try_from(window.len() * width)
            .map_err(|err| io_err(io::Error::new(io::ErrorKind::OutOfMemory, err)))?;

        file.seek(SeekFrom::Start(window.start * width))
            .map_err(io_err)?;
        let mut bytes = vec![0u8; byte_count];
        file.read_exact(&mut bytes).map_err(io_err)?;
        let samples = format.decode(&bytes).map_err(io_err)?;

        Ok(LoadedWindow {
            path: path.to_path_buf(),
            format,
            window,
            total_records,
            file_len,
            samples,
            warnings,
        })
    }
}

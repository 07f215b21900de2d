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

//! Load notifications.
//!
//! The source never configures logging itself. Anything worth telling the
//! user about a load (dropped bytes, clamped bounds) goes to the
//! [`LoadObserver`] it was built with.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use super::WindowBounds;

/// Something observable that happened during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// The file length is not a whole number of records; the tail was ignored.
    TrailingBytesDropped {
        path: PathBuf,
        byte_len: u64,
        record_width: usize,
        excess: u64,
    },
    /// The requested window did not fit the file and was clamped.
    RangeAdjusted {
        requested: WindowBounds,
        resolved: WindowBounds,
    },
    /// A window was read and committed.
    Loaded {
        path: PathBuf,
        window: WindowBounds,
        total_records: u64,
    },
}

impl LoadEvent {
    /// Whether this event should be surfaced as a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Loaded { .. })
    }
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrailingBytesDropped {
                path,
                byte_len,
                record_width,
                excess,
            } => write!(
                f,
                "Unexpected file length: {byte_len} bytes in {} is not a multiple of the \
                 {record_width} byte record size, ignoring the last {excess} bytes",
                path.display()
            ),
            Self::RangeAdjusted {
                requested,
                resolved,
            } => write!(f, "Limits out of range {requested} adjusted to {resolved}"),
            Self::Loaded {
                path,
                window,
                total_records,
            } => write!(
                f,
                "Loaded records {window} of {total_records} from {}",
                path.display()
            ),
        }
    }
}

/// Receiver of load notifications.
pub trait LoadObserver: fmt::Debug + Send {
    /// Called synchronously from inside the load that produced `event`.
    fn notify(&self, event: &LoadEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn notify(&self, event: &LoadEvent) {
        if event.is_warning() {
            warn!("{event}");
        } else {
            debug!("{event}");
        }
    }
}

/// Keeps every event it receives. Clones share the same list.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<LoadEvent>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<LoadEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Remove and return the events received so far.
    pub fn drain(&self) -> Vec<LoadEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl LoadObserver for RecordingObserver {
    fn notify(&self, event: &LoadEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_shares_events() {
        let observer = RecordingObserver::new();
        let handle = observer.clone();
        observer.notify(&LoadEvent::RangeAdjusted {
            requested: WindowBounds::new(10, 101),
            resolved: WindowBounds::new(10, 100),
        });

        assert_eq!(handle.events().len(), 1);
        assert_eq!(handle.drain().len(), 1);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_event_display() {
        let event = LoadEvent::RangeAdjusted {
            requested: WindowBounds::new(10, 101),
            resolved: WindowBounds::new(10, 100),
        };
        assert!(event.is_warning());
        assert_eq!(
            event.to_string(),
            "Limits out of range [10, 101) adjusted to [10, 100)"
        );
    }
}

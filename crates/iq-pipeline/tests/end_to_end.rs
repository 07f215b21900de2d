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

//! File on disk to plot products, through the public API only.

use std::io::Write;

use iq_pipeline::{
    ElementType, FftConfig, LoadEvent, RecordingObserver, SampleFormat, Session, WindowBounds,
    WindowFunction,
};
use tempfile::NamedTempFile;

fn write_complex64(samples: &[(f32, f32)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    for (re, im) in samples {
        file.write_all(&re.to_le_bytes()).expect("write re");
        file.write_all(&im.to_le_bytes()).expect("write im");
    }
    file.flush().expect("flush");
    file
}

fn ramp(count: u16) -> Vec<(f32, f32)> {
    (0..count)
        .map(|i| {
            let phase = f32::from(i) * 0.7;
            (phase.cos(), phase.sin())
        })
        .collect()
}

fn session(size: usize, window: WindowFunction) -> (Session, RecordingObserver) {
    let observer = RecordingObserver::new();
    let session = Session::new(
        SampleFormat::default(),
        FftConfig::new(size, window).expect("valid fft config"),
        1.0,
        Box::new(observer.clone()),
    )
    .expect("valid sample rate");
    (session, observer)
}

#[test]
fn hundred_samples_at_fft_256() {
    let file = write_complex64(&ramp(100));
    let (mut session, observer) = session(256, WindowFunction::Blackman);
    session.open_file(file.path()).expect("open");

    let product = session.product().expect("product");
    assert_eq!(product.time_axis.len(), 100);
    assert_eq!(product.psd.frequencies.len(), 256);
    assert_eq!(product.psd.magnitude_db.len(), 256);

    let freqs = &product.psd.frequencies;
    assert!((freqs[0] + 0.5).abs() < 1e-12);
    assert!(freqs[128].abs() < 1e-12);
    for k in 1..128 {
        assert!((freqs[128 + k] + freqs[128 - k]).abs() < 1e-12);
    }

    assert!(observer.events().iter().all(|e| !e.is_warning()));
}

#[test]
fn hundred_constant_samples_have_no_power() {
    let file = write_complex64(&[(1.0, 1.0); 100]);
    let (mut session, _) = session(256, WindowFunction::Blackman);
    session.open_file(file.path()).expect("open");

    let product = session.product().expect("product");
    assert_eq!(product.psd.magnitude_db.len(), 256);
    assert!(product
        .psd
        .magnitude_db
        .iter()
        .all(|db| *db == f64::NEG_INFINITY));
    assert!(product
        .spectrogram
        .magnitude_db
        .iter()
        .all(|db| *db == f64::NEG_INFINITY));
}

#[test]
fn window_edits_flow_through_to_products() {
    let file = write_complex64(&ramp(2048));
    let (mut session, observer) = session(128, WindowFunction::Hann);
    session.open_file(file.path()).expect("open");

    session.set_window(1024, 4096).expect("clamped window");
    assert_eq!(session.source().window(), WindowBounds::new(1024, 2048));
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, LoadEvent::RangeAdjusted { .. })));

    let product = session.product().expect("product");
    assert_eq!(product.time_axis.len(), 1024);
    assert!((product.time_axis[0] - 1024.0).abs() < 1e-9);
    // step 96: (1024 - 128) / 96 + 1 = 10
    assert_eq!(product.spectrogram.magnitude_db.dim(), (128, 10));

    let summary = session.summary().expect("summary");
    assert_eq!(summary.total_records, 2048);
    assert_eq!(summary.file_len, 2048 * 8);
}

#[test]
fn format_change_reinterprets_file() {
    let file = write_complex64(&ramp(64));
    let (mut session, _) = session(128, WindowFunction::Boxcar);
    session.open_file(file.path()).expect("open");

    session
        .set_format(SampleFormat::new(ElementType::Float32))
        .expect("float32");
    assert_eq!(session.source().total_records(), 128);
    assert_eq!(session.source().window(), WindowBounds::new(0, 64));

    let product = session.product().expect("product");
    assert_eq!(product.psd.frequencies.len(), 128);
}

//! Spectrogram tab.
//!
//! The dB matrix is rendered once into a texture and drawn as a plot image
//! placed on frequency/time axes, so the plot's zoom and hover readouts work
//! in Hz and seconds.

use egui::{Color32, ColorImage, TextureHandle, TextureOptions};
use egui_plot::{Plot, PlotImage, PlotPoint};
use iq_pipeline::Spectrogram;
use ndarray::Array2;

/// Cached texture for the spectrogram currently on screen.
#[derive(Default)]
pub struct SpectrogramView {
    texture: Option<TextureHandle>,
    dirty: bool,
}

impl std::fmt::Debug for SpectrogramView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrogramView")
            .field("has_texture", &self.texture.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl SpectrogramView {
    /// Rebuild the texture on the next frame.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn show(&mut self, ui: &mut egui::Ui, spectrogram: &Spectrogram, segment_duration: f64) {
        if self.dirty || self.texture.is_none() {
            let image = spectrogram_image(&spectrogram.magnitude_db);
            if let Some(tex) = &mut self.texture {
                tex.set(image, TextureOptions::NEAREST);
            } else {
                self.texture =
                    Some(ui.ctx().load_texture("spectrogram", image, TextureOptions::NEAREST));
            }
            self.dirty = false;
        }

        let Some(texture) = &self.texture else {
            return;
        };
        let (center, size) = image_extent(spectrogram, segment_duration);

        Plot::new("spectrogram_plot")
            .x_axis_label("Frequency (Hz)")
            .y_axis_label("Time (s)")
            .show(ui, |plot_ui| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "plot extents only need f32 precision"
                )]
                let size = egui::vec2(size[0] as f32, size[1] as f32);
                plot_ui.image(PlotImage::new(
                    "Spectrogram",
                    texture.id(),
                    PlotPoint::new(center[0], center[1]),
                    size,
                ));
            });
    }
}

/// Center and size of the image in plot coordinates.
///
/// A single segment has no time span of its own, so it is drawn
/// `segment_duration` tall.
pub fn image_extent(spectrogram: &Spectrogram, segment_duration: f64) -> ([f64; 2], [f64; 2]) {
    let (rows, cols) = spectrogram.magnitude_db.dim();
    let (f0, t0) = spectrogram.placement.origin;
    let (df, dt) = spectrogram.placement.scale;

    #[allow(clippy::cast_precision_loss, reason = "matrix dimensions well below 2^52")]
    let (rows, cols) = (rows as f64, cols as f64);
    let width = df * rows;
    let height = if dt > 0.0 { dt * cols } else { segment_duration };

    ([f0 + width / 2.0, t0 + height / 2.0], [width, height])
}

/// Render a `[frequency, segment]` matrix with frequency across and the
/// first segment at the bottom.
pub fn spectrogram_image(magnitude_db: &Array2<f64>) -> ColorImage {
    let (rows, cols) = magnitude_db.dim();
    let (min_db, max_db) = finite_range(magnitude_db);

    let mut pixels = Vec::with_capacity(rows * cols);
    for segment in (0..cols).rev() {
        for bin in 0..rows {
            pixels.push(db_to_color(magnitude_db[[bin, segment]], min_db, max_db));
        }
    }

    #[allow(clippy::cast_precision_loss, reason = "texture dimensions are small")]
    let source_size = egui::vec2(rows as f32, cols as f32);
    ColorImage {
        size: [rows, cols],
        source_size,
        pixels,
    }
}

/// Smallest and largest finite value, `(0, 0)` if there are none.
fn finite_range(values: &Array2<f64>) -> (f64, f64) {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min <= max {
        (min, max)
    } else {
        (0.0, 0.0)
    }
}

/// Convert a dB value to a blue→green→yellow→red gradient.
///
/// Non-finite values and an empty range map to the bottom of the scale.
pub fn db_to_color(db: f64, min_db: f64, max_db: f64) -> Color32 {
    let range = max_db - min_db;
    let normalized = if db.is_finite() && range > 0.0 {
        ((db - min_db) / range).clamp(0.0, 1.0)
    } else if db == f64::INFINITY {
        1.0
    } else {
        0.0
    };

    let stops = [
        (0.0, (0u8, 0u8, 128u8)),
        (0.25, (0, 128, 255)),
        (0.5, (0, 255, 0)),
        (0.75, (255, 255, 0)),
        (1.0, (255, 0, 0)),
    ];

    for pair in stops.windows(2) {
        let (t1, (r1, g1, b1)) = pair[0];
        let (t2, (r2, g2, b2)) = pair[1];

        if normalized >= t1 && normalized <= t2 {
            let t = (normalized - t1) / (t2 - t1);
            let lerp = |a: u8, b: u8| {
                let v = f64::from(a) + t * (f64::from(b) - f64::from(a));
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "interpolated between two u8 values"
                )]
                let v = v.round() as u8;
                v
            };
            return Color32::from_rgb(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2));
        }
    }

    Color32::from_rgb(255, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_pipeline::Placement;

    #[test]
    fn test_db_to_color() {
        assert_eq!(db_to_color(-100.0, -100.0, 0.0), Color32::from_rgb(0, 0, 128));
        assert_eq!(db_to_color(0.0, -100.0, 0.0), Color32::from_rgb(255, 0, 0));
        assert!(db_to_color(-50.0, -100.0, 0.0).g() > 128);
    }

    #[test]
    fn test_db_to_color_degenerate_inputs() {
        let floor = Color32::from_rgb(0, 0, 128);
        assert_eq!(db_to_color(f64::NEG_INFINITY, -100.0, 0.0), floor);
        assert_eq!(db_to_color(f64::NAN, -100.0, 0.0), floor);
        assert_eq!(db_to_color(-3.0, -3.0, -3.0), floor);
    }

    #[test]
    fn test_image_orientation() {
        // Two bins, three segments; segment 2 is hottest and should be the top row.
        let mut db = Array2::<f64>::zeros((2, 3));
        db[[0, 2]] = 10.0;
        db[[1, 0]] = f64::NEG_INFINITY;

        let image = spectrogram_image(&db);
        assert_eq!(image.size, [2, 3]);
        assert_eq!(image.pixels[0], Color32::from_rgb(255, 0, 0));
        assert_eq!(image.pixels[5], Color32::from_rgb(0, 0, 128));
    }

    #[test]
    fn test_all_infinite_matrix() {
        let db = Array2::from_elem((4, 2), f64::NEG_INFINITY);
        let image = spectrogram_image(&db);
        assert!(image.pixels.iter().all(|p| *p == Color32::from_rgb(0, 0, 128)));
    }

    #[test]
    fn test_image_extent() {
        let spectrogram = Spectrogram {
            frequencies: vec![-2.0, -1.0, 0.0, 1.0],
            times: vec![0.5, 1.5],
            magnitude_db: Array2::zeros((4, 2)),
            placement: Placement {
                origin: (-2.0, 0.5),
                scale: (0.75, 0.5),
            },
        };
        let (center, size) = image_extent(&spectrogram, 1.0);
        assert_eq!(size, [3.0, 1.0]);
        assert_eq!(center, [-0.5, 1.0]);

        let single = Spectrogram {
            times: vec![0.5],
            magnitude_db: Array2::zeros((4, 1)),
            placement: Placement {
                origin: (-2.0, 0.5),
                scale: (0.75, 0.0),
            },
            ..spectrogram
        };
        let (_, size) = image_extent(&single, 4.0);
        assert_eq!(size, [0.75 * 4.0, 4.0]);
    }
}

//! Time-domain and PSD line plots.

use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use iq_pipeline::PsdCurve;
use num_complex::Complex64;

const I_COLOR: Color32 = Color32::from_rgb(100, 180, 255);
const Q_COLOR: Color32 = Color32::from_rgb(255, 150, 80);

/// `(t, re)` and `(t, im)` point lists.
pub fn iq_points(time_axis: &[f64], samples: &[Complex64]) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    time_axis
        .iter()
        .zip(samples)
        .map(|(&t, s)| ([t, s.re], [t, s.im]))
        .unzip()
}

/// PSD points, skipping bins with no power.
pub fn psd_points(psd: &PsdCurve) -> Vec<[f64; 2]> {
    psd.frequencies
        .iter()
        .zip(&psd.magnitude_db)
        .filter(|(_, db)| db.is_finite())
        .map(|(&f, &db)| [f, db])
        .collect()
}

pub fn time_plot(ui: &mut egui::Ui, time_axis: &[f64], samples: &[Complex64]) {
    let (i_points, q_points) = iq_points(time_axis, samples);
    Plot::new("time_plot")
        .legend(Legend::default())
        .x_axis_label("Time (s)")
        .y_axis_label("Amplitude")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new("I", PlotPoints::from(i_points)).color(I_COLOR));
            plot_ui.line(Line::new("Q", PlotPoints::from(q_points)).color(Q_COLOR));
        });
}

pub fn psd_plot(ui: &mut egui::Ui, psd: &PsdCurve) {
    let points = psd_points(psd);
    Plot::new("psd_plot")
        .x_axis_label("Frequency (Hz)")
        .y_axis_label("Power (dB/Hz)")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new("PSD", PlotPoints::from(points)).color(I_COLOR));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iq_points_split() {
        let samples = [Complex64::new(1.0, -1.0), Complex64::new(2.0, 0.5)];
        let (i, q) = iq_points(&[0.0, 0.5], &samples);
        assert_eq!(i, vec![[0.0, 1.0], [0.5, 2.0]]);
        assert_eq!(q, vec![[0.0, -1.0], [0.5, 0.5]]);
    }

    #[test]
    fn test_psd_points_skip_empty_bins() {
        let psd = PsdCurve {
            frequencies: vec![-1.0, 0.0, 1.0],
            magnitude_db: vec![-20.0, f64::NEG_INFINITY, -10.0],
        };
        assert_eq!(psd_points(&psd), vec![[-1.0, -20.0], [1.0, -10.0]]);
    }
}

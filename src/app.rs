//! Main window: side panel controls, plot tabs, File menu and status bar.
//!
//! Every edit goes through the [`Session`]. Plots are recomputed only after
//! an edit succeeds, so a rejected edit leaves the previous plots on screen
//! with the error in the status bar.

use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui;
use iq_pipeline::{
    ElementType, LoadEvent, LoadObserver, LogObserver, RecordingObserver, SampleFormat, Session,
    SourceError, SpectralProduct, WindowFunction, FFT_SIZES,
};
use num_complex::Complex64;

use crate::settings::ViewerSettings;
use crate::ui::{plots, SpectrogramView, StatusBar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tab {
    #[default]
    Time,
    Psd,
    Spectrogram,
}

impl Tab {
    const ALL: [Self; 3] = [Self::Time, Self::Psd, Self::Spectrogram];

    fn label(self) -> &'static str {
        match self {
            Self::Time => "Time (iq)",
            Self::Psd => "PSD",
            Self::Spectrogram => "Spectrogram",
        }
    }
}

/// Logs load events and keeps them for the status bar.
#[derive(Debug, Clone, Default)]
struct StatusObserver {
    events: RecordingObserver,
}

impl LoadObserver for StatusObserver {
    fn notify(&self, event: &LoadEvent) {
        LogObserver.notify(event);
        self.events.notify(event);
    }
}

/// The plots on screen and the samples they were computed from.
#[derive(Debug)]
struct Displayed {
    product: SpectralProduct,
    samples: Vec<Complex64>,
    /// Seconds covered by one FFT segment.
    segment_duration: f64,
}

/// Side panel edit buffers, applied on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Controls {
    window_start: u64,
    window_end: u64,
    sample_rate: f64,
}

#[derive(Debug)]
pub struct IqPlotApp {
    session: Session,
    events: RecordingObserver,
    displayed: Option<Displayed>,
    controls: Controls,
    tab: Tab,
    spectrogram: SpectrogramView,
    status: StatusBar,
}

impl IqPlotApp {
    /// Build the app, opening `path` if given.
    ///
    /// A file that fails to open is reported in the status bar, not here.
    pub fn new(settings: &ViewerSettings, path: Option<&Path>) -> Result<Self> {
        let observer = StatusObserver::default();
        let events = observer.events.clone();
        let session = Session::new(
            settings.format,
            settings.fft_config()?,
            settings.sample_rate,
            Box::new(observer),
        )
        .context("Invalid sample rate")?;

        let mut app = Self {
            controls: Controls {
                window_start: 0,
                window_end: 0,
                sample_rate: session.sample_rate(),
            },
            session,
            events,
            displayed: None,
            tab: Tab::default(),
            spectrogram: SpectrogramView::default(),
            status: StatusBar::default(),
        };
        if let Some(path) = path {
            app.open_file(path);
        }
        Ok(app)
    }

    fn open_file(&mut self, path: &Path) {
        log::info!("Opening {}", path.display());
        let result = self.session.open_file(path);
        self.finish_load(result);
    }

    fn pick_file(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter(
                "IQ recordings",
                &[
                    "cf32", "cfile", "iq", "bin", "raw", "dat", "cs16", "cs8", "cu8",
                ],
            )
            .add_filter("All files", &["*"]);
        if let Some(home) = dirs::home_dir() {
            dialog = dialog.set_directory(home);
        }
        if let Some(path) = dialog.pick_file() {
            self.open_file(&path);
        }
    }

    fn apply_window(&mut self) {
        let result = self
            .session
            .set_window(self.controls.window_start, self.controls.window_end);
        self.finish_load(result);
    }

    fn show_full_file(&mut self) {
        self.controls.window_start = 0;
        self.controls.window_end = self.session.source().total_records();
        self.apply_window();
    }

    fn set_format(&mut self, format: SampleFormat) {
        let result = self.session.set_format(format);
        if self.session.has_file() {
            self.finish_load(result);
        }
    }

    fn apply_sample_rate(&mut self) {
        match self.session.set_sample_rate(self.controls.sample_rate) {
            Ok(()) => self.refresh(),
            Err(err) => {
                self.status.error(err.to_string());
                self.controls.sample_rate = self.session.sample_rate();
            }
        }
    }

    fn set_fft_size(&mut self, size: usize) {
        match self.session.set_fft_size(size) {
            Ok(()) => self.refresh(),
            Err(err) => self.status.error(err.to_string()),
        }
    }

    fn set_window_function(&mut self, window_function: WindowFunction) {
        self.session.set_window_function(window_function);
        self.refresh();
    }

    /// Report the outcome of a load and recompute on success.
    fn finish_load(&mut self, result: Result<(), SourceError>) {
        let events = self.events.drain();
        match result {
            Ok(()) => {
                if events.iter().any(LoadEvent::is_warning) {
                    self.status.absorb(&events);
                } else if let Some(event) = events.last() {
                    self.status.info(event.to_string());
                }
                self.refresh();
            }
            Err(err) => self.status.error(err.to_string()),
        }
        self.sync_controls();
    }

    fn sync_controls(&mut self) {
        let source = self.session.source();
        self.controls = Controls {
            window_start: source.window_start(),
            window_end: source.window_end(),
            sample_rate: self.session.sample_rate(),
        };
    }

    fn refresh(&mut self) {
        if !self.session.has_file() {
            return;
        }
        match self.session.product() {
            Ok(product) => {
                #[allow(clippy::cast_precision_loss, reason = "FFT sizes are at most 8192")]
                let segment_duration =
                    self.session.engine().config().size() as f64 / self.session.sample_rate();
                self.displayed = Some(Displayed {
                    product,
                    samples: self.session.source().samples().to_vec(),
                    segment_duration,
                });
                self.spectrogram.invalidate();
            }
            Err(err) => self.status.error(format!("Cannot compute plots: {err}")),
        }
    }

    fn render_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open…").clicked() {
                        self.pick_file();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let total = self.session.source().total_records();
        let has_file = self.session.has_file();

        ui.heading("Window");
        egui::Grid::new("window_grid").num_columns(2).show(ui, |ui| {
            ui.label("Start:");
            ui.add(egui::DragValue::new(&mut self.controls.window_start).range(0..=total));
            ui.end_row();

            ui.label("End:");
            ui.add(egui::DragValue::new(&mut self.controls.window_end).range(0..=total));
            ui.end_row();
        });
        ui.horizontal(|ui| {
            if ui.add_enabled(has_file, egui::Button::new("Apply")).clicked() {
                self.apply_window();
            }
            if ui.add_enabled(has_file, egui::Button::new("Full file")).clicked() {
                self.show_full_file();
            }
        });

        ui.separator();
        ui.heading("Signal");

        ui.horizontal(|ui| {
            ui.label("Sample rate:");
            let response = ui.add(
                egui::DragValue::new(&mut self.controls.sample_rate)
                    .speed(1000.0)
                    .range(f64::MIN_POSITIVE..=f64::MAX)
                    .suffix(" Hz"),
            );
            if response.drag_stopped() || response.lost_focus() {
                self.apply_sample_rate();
            }
        });

        let current_format = self.session.source().format().element();
        let mut format = current_format;
        ui.horizontal(|ui| {
            ui.label("Format:");
            egui::ComboBox::from_id_salt("sample_format")
                .selected_text(format.name())
                .show_ui(ui, |ui| {
                    for option in ElementType::ALL {
                        ui.selectable_value(&mut format, option, option.name());
                    }
                });
        });
        if format != current_format {
            self.set_format(SampleFormat::new(format));
        }

        ui.separator();
        ui.heading("FFT");

        let config = self.session.engine().config();
        let (current_size, current_window) = (config.size(), config.window_function());
        let (mut size, mut window) = (current_size, current_window);
        ui.horizontal(|ui| {
            ui.label("Size:");
            egui::ComboBox::from_id_salt("fft_size")
                .selected_text(format!("{size}"))
                .show_ui(ui, |ui| {
                    for option in FFT_SIZES {
                        ui.selectable_value(&mut size, option, format!("{option}"));
                    }
                });
        });
        ui.horizontal(|ui| {
            ui.label("Window:");
            egui::ComboBox::from_id_salt("window_function")
                .selected_text(window.name())
                .show_ui(ui, |ui| {
                    for option in WindowFunction::ALL {
                        ui.selectable_value(&mut window, option, option.name());
                    }
                });
        });
        if size != current_size {
            self.set_fft_size(size);
        }
        if window != current_window {
            self.set_window_function(window);
        }
    }

    fn render_plots(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, tab.label());
            }
        });
        ui.separator();

        let Some(displayed) = &self.displayed else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("Open a recording from the File menu")
                        .italics()
                        .color(egui::Color32::GRAY),
                );
            });
            return;
        };

        match self.tab {
            Tab::Time => {
                plots::time_plot(ui, &displayed.product.time_axis, &displayed.samples);
            }
            Tab::Psd => plots::psd_plot(ui, &displayed.product.psd),
            Tab::Spectrogram => self.spectrogram.show(
                ui,
                &displayed.product.spectrogram,
                displayed.segment_duration,
            ),
        }
    }
}

impl eframe::App for IqPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_menu(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status.render(ui, self.session.summary().as_ref());
        });

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| self.render_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.render_plots(ui));
    }
}

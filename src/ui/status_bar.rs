use egui::{Color32, RichText};
use iq_pipeline::{LoadEvent, SourceSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

impl StatusLevel {
    fn color(self) -> Color32 {
        match self {
            Self::Info => Color32::from_rgb(150, 200, 220),
            Self::Warning => Color32::from_rgb(255, 200, 80),
            Self::Error => Color32::from_rgb(230, 90, 90),
        }
    }
}

/// Bottom bar: file summary on the left, last message on the right.
#[derive(Debug, Default)]
pub struct StatusBar {
    message: Option<(StatusLevel, String)>,
}

impl StatusBar {
    pub fn message(&self) -> Option<(StatusLevel, &str)> {
        self.message.as_ref().map(|(level, text)| (*level, text.as_str()))
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some((StatusLevel::Info, text.into()));
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.message = Some((StatusLevel::Warning, text.into()));
    }

    /// Show an error. Also logged, since the message is replaced by the next one.
    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{text}");
        self.message = Some((StatusLevel::Error, text));
    }

    /// Surface the warnings from a batch of load events; the last one wins.
    pub fn absorb(&mut self, events: &[LoadEvent]) {
        if let Some(event) = events.iter().rev().find(|e| e.is_warning()) {
            self.warn(event.to_string());
        }
    }

    pub fn render(&self, ui: &mut egui::Ui, summary: Option<&SourceSummary>) {
        ui.horizontal(|ui| {
            match summary {
                Some(summary) => ui.label(summary.to_string()),
                None => ui.label(RichText::new("No file loaded").italics().color(Color32::GRAY)),
            };

            if let Some((level, text)) = self.message() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(text).color(level.color()));
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_pipeline::WindowBounds;
    use std::path::PathBuf;

    #[test]
    fn test_absorb_keeps_last_warning() {
        let mut bar = StatusBar::default();
        bar.absorb(&[
            LoadEvent::RangeAdjusted {
                requested: WindowBounds::new(0, 200),
                resolved: WindowBounds::new(0, 100),
            },
            LoadEvent::Loaded {
                path: PathBuf::from("a.bin"),
                window: WindowBounds::new(0, 100),
                total_records: 100,
            },
        ]);
        assert_eq!(
            bar.message(),
            Some((StatusLevel::Warning, "Limits out of range [0, 200) adjusted to [0, 100)"))
        );
    }

    #[test]
    fn test_absorb_without_warnings_keeps_message() {
        let mut bar = StatusBar::default();
        bar.info("ready");
        bar.absorb(&[]);
        assert_eq!(bar.message(), Some((StatusLevel::Info, "ready")));
    }
}

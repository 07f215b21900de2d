//! UI components for IQ Plot Desktop.
//!
//! Each tab's plot and the status bar live here; the app wires them to the
//! session.

pub mod plots;
pub mod spectrogram_view;
pub mod status_bar;

pub use spectrogram_view::SpectrogramView;
pub use status_bar::StatusBar;

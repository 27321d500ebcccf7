//! Topolink Application
//!
//! Application shell wiring configuration, in-memory collaborators, the
//! editor and the display-list renderer into a scripted session.

mod app;

pub use app::{App, AppConfig, AppError, SessionReport, demo_collaborators};

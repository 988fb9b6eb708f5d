//! Egui-based native viewer for the dashboard (feature = "egui").
//!
//! Construct a [`DashboardApp`] from an open session and hand it to
//! `eframe::run_native`, or call [`run`] to do both.

#![cfg(feature = "egui")]

mod render;
mod state;
mod ui;

pub use render::{EguiSceneRenderer, rgb_to_color32};
pub use state::DashboardApp;

use anyhow::Result;
use eframe::egui;

use crate::session::DashboardSession;
use crate::source::ContentSource;

/// Open a maximized window showing `session` and block until it closes.
pub fn run<S: ContentSource + 'static>(session: DashboardSession<S>) -> Result<()> {
    let title = session
        .canvas()
        .layout()
        .meta
        .title
        .clone()
        .unwrap_or_else(|| "runboard".to_string());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_maximized(true),
        ..Default::default()
    };
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

#![cfg(feature = "egui")]

use std::time::Instant;

use eframe::egui;

use crate::compare::DeltaSummary;
use crate::session::DashboardSession;
use crate::source::ContentSource;

/// Interactive egui application showing one dashboard session.
pub struct DashboardApp<S: ContentSource> {
    pub session: DashboardSession<S>,
    /// Cached comparison; recomputed when `compare_dirty` is set.
    pub delta: DeltaSummary,
    pub compare_dirty: bool,
    /// Node under the pointer in the last frame.
    pub hovered: Option<String>,
    pub show_side_panel: bool,
}

impl<S: ContentSource> DashboardApp<S> {
    pub fn new(mut session: DashboardSession<S>) -> Self {
        session.start_polling(Instant::now());
        Self {
            session,
            delta: DeltaSummary::not_applicable(),
            compare_dirty: true,
            hovered: None,
            show_side_panel: true,
        }
    }

    /// Re-read every document now.
    pub fn refresh_all(&mut self) {
        let now = Instant::now();
        self.session.refresh_runtime();
        self.session.refresh_history();
        self.session.refresh_job(now);
        self.compare_dirty = true;
    }

    pub(crate) fn ensure_comparison(&mut self) {
        if self.compare_dirty {
            self.delta = self.session.comparison();
            self.compare_dirty = false;
        }
    }
}

impl<S: ContentSource> eframe::App for DashboardApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if self.session.tick(now) {
            self.compare_dirty = true;
        }
        if let Some(wait) = self.session.poll().time_until_due(now) {
            ctx.request_repaint_after(wait);
        }
        super::ui::update(self, ctx);
    }
}
